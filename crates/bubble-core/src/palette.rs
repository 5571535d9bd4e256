// File: crates/bubble-core/src/palette.rs
// Summary: Nationality -> color mapping with a required "Unknown" fallback entry.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use skia_safe as skia;

use crate::types::UNKNOWN_NATIONALITY;

/// One configured legend entry as it appears in config files: `{ "name": "Polish", "color": "#2ca02c" }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub name: String,
    pub color: String,
}

/// Ordered nationality palette. Order is the legend order.
/// Contract: always contains an `"Unknown"` entry.
#[derive(Clone, Debug)]
pub struct Palette {
    entries: Vec<(String, skia::Color)>,
}

impl Palette {
    pub fn nationalities() -> Self {
        Self {
            entries: vec![
                ("English".to_string(), skia::Color::from_rgb(0x1f, 0x77, 0xb4)),
                ("Indian".to_string(), skia::Color::from_rgb(0xff, 0x7f, 0x0e)),
                ("Polish".to_string(), skia::Color::from_rgb(0x2c, 0xa0, 0x2c)),
                ("Russian".to_string(), skia::Color::from_rgb(0xd6, 0x27, 0x28)),
                ("Arabic".to_string(), skia::Color::from_rgb(0x94, 0x67, 0xbd)),
                (UNKNOWN_NATIONALITY.to_string(), default_fallback()),
            ],
        }
    }

    /// Build from configured entries. Names must be unique; a missing fallback gets the default grey.
    pub fn from_entries(entries: &[PaletteEntry]) -> Result<Self> {
        let mut out: Vec<(String, skia::Color)> = Vec::with_capacity(entries.len() + 1);
        for e in entries {
            let name = e.name.trim();
            if name.is_empty() {
                bail!("palette entry with empty name");
            }
            if out.iter().any(|(n, _)| n == name) {
                bail!("palette entry `{name}` listed twice");
            }
            let color = parse_hex(&e.color).with_context(|| format!("palette entry `{name}`: bad color `{}`", e.color))?;
            out.push((name.to_string(), color));
        }
        if !out.iter().any(|(n, _)| n == UNKNOWN_NATIONALITY) {
            out.push((UNKNOWN_NATIONALITY.to_string(), default_fallback()));
        }
        Ok(Self { entries: out })
    }

    pub fn to_entries(&self) -> Vec<PaletteEntry> {
        self.entries
            .iter()
            .map(|(name, c)| PaletteEntry { name: name.clone(), color: to_hex(*c) })
            .collect()
    }

    pub fn fallback(&self) -> skia::Color {
        self.lookup(UNKNOWN_NATIONALITY).unwrap_or_else(default_fallback)
    }

    pub fn lookup(&self, nationality: &str) -> Option<skia::Color> {
        self.entries.iter().find(|(n, _)| n == nationality).map(|(_, c)| *c)
    }

    /// Entry color, or the fallback when the nationality is not listed.
    pub fn color_for(&self, nationality: &str) -> skia::Color {
        self.lookup(nationality).unwrap_or_else(|| self.fallback())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, skia::Color)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), *c))
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl Default for Palette {
    fn default() -> Self { Self::nationalities() }
}

fn default_fallback() -> skia::Color {
    skia::Color::from_rgb(0x7f, 0x7f, 0x7f)
}

/// Parse `#rrggbb` or `#rgb` (leading `#` optional).
pub fn parse_hex(s: &str) -> Option<skia::Color> {
    let h = s.trim().trim_start_matches('#');
    if !h.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match h.len() {
        6 => {
            let v = u32::from_str_radix(h, 16).ok()?;
            Some(skia::Color::from_rgb((v >> 16) as u8, (v >> 8) as u8, v as u8))
        }
        3 => {
            let v = u32::from_str_radix(h, 16).ok()?;
            let expand = |n: u32| ((n & 0xf) * 0x11) as u8;
            Some(skia::Color::from_rgb(expand(v >> 8), expand(v >> 4), expand(v)))
        }
        _ => None,
    }
}

/// Lowercase `#rrggbb`; alpha is dropped.
pub fn to_hex(c: skia::Color) -> String {
    format!("#{:02x}{:02x}{:02x}", c.r(), c.g(), c.b())
}

/// Per-channel linear blend, `t` clamped to [0, 1].
pub fn lerp_color(a: skia::Color, b: skia::Color, t: f32) -> skia::Color {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    skia::Color::from_argb(mix(a.a(), b.a()), mix(a.r(), b.r()), mix(a.g(), b.g()), mix(a.b(), b.b()))
}
