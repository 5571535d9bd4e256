// File: crates/bubble-core/src/config.rs
// Summary: Visualization settings with defaults, loadable from a JSON file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::loader::{FrameLoader, DEFAULT_TEMPLATE, GEN_PLACEHOLDER};
use crate::palette::{Palette, PaletteEntry};
use crate::types::{
    BUBBLE_AREA_FRACTION, COLLIDE_PADDING, FRAME_INTERVAL_MS, GENERATIONS, HEIGHT, LAYOUT_TICKS, RADIUS_MAX,
    RADIUS_MIN, TRANSITION_MS, WIDTH,
};

/// What the driver does when a generation fails to load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadFailurePolicy {
    /// Log and move on to the next generation.
    Skip,
    /// Log, wait, and try the same generation again; skip once retries run out.
    Retry,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VizConfig {
    pub data_dir: PathBuf,
    /// Path under `data_dir`; `{gen}` becomes the zero-padded generation index.
    pub file_template: String,
    pub generations: usize,
    pub interval_ms: u64,
    pub transition_ms: u64,
    pub layout_ticks: usize,
    pub radius_min: f32,
    pub radius_max: f32,
    pub collide_padding: f32,
    pub width: i32,
    pub height: i32,
    pub bubble_area_fraction: f32,
    /// `None` waits on a read forever.
    pub load_timeout_ms: Option<u64>,
    pub on_load_error: LoadFailurePolicy,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    /// Legend order; an `Unknown` entry is appended when missing.
    pub palette: Vec<PaletteEntry>,
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            file_template: DEFAULT_TEMPLATE.to_string(),
            generations: GENERATIONS,
            interval_ms: FRAME_INTERVAL_MS,
            transition_ms: TRANSITION_MS,
            layout_ticks: LAYOUT_TICKS,
            radius_min: RADIUS_MIN,
            radius_max: RADIUS_MAX,
            collide_padding: COLLIDE_PADDING,
            width: WIDTH,
            height: HEIGHT,
            bubble_area_fraction: BUBBLE_AREA_FRACTION,
            load_timeout_ms: None,
            on_load_error: LoadFailurePolicy::Retry,
            max_retries: 3,
            retry_backoff_ms: 500,
            palette: Palette::default().to_entries(),
        }
    }
}

impl VizConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s).context("invalid visualization config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.generations > 0, "generations must be at least 1");
        anyhow::ensure!(
            self.file_template.contains(GEN_PLACEHOLDER),
            "file_template `{}` has no {GEN_PLACEHOLDER} placeholder",
            self.file_template
        );
        anyhow::ensure!(
            self.radius_min >= 0.0 && self.radius_min <= self.radius_max,
            "radius range [{}, {}] is invalid",
            self.radius_min,
            self.radius_max
        );
        anyhow::ensure!(self.width > 0 && self.height > 0, "surface size must be positive");
        anyhow::ensure!(
            self.bubble_area_fraction > 0.0 && self.bubble_area_fraction <= 1.0,
            "bubble_area_fraction must be in (0, 1]"
        );
        Palette::from_entries(&self.palette)?;
        Ok(())
    }

    pub fn palette(&self) -> Result<Palette> {
        Palette::from_entries(&self.palette)
    }

    pub fn loader(&self) -> FrameLoader {
        FrameLoader::new(&self.data_dir)
            .with_template(self.file_template.clone())
            .with_timeout(self.load_timeout_ms.map(Duration::from_millis))
    }

    pub fn interval(&self) -> Duration { Duration::from_millis(self.interval_ms) }
    pub fn transition(&self) -> Duration { Duration::from_millis(self.transition_ms) }
    pub fn retry_backoff(&self) -> Duration { Duration::from_millis(self.retry_backoff_ms) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_animation() {
        let cfg = VizConfig::default();
        assert_eq!(cfg.generations, 50);
        assert_eq!(cfg.interval(), Duration::from_millis(1000));
        assert_eq!(cfg.transition(), Duration::from_millis(800));
        assert_eq!(cfg.layout_ticks, 120);
        assert_eq!((cfg.radius_min, cfg.radius_max), (2.0, 40.0));
        assert_eq!(cfg.palette.len(), 6);
        cfg.validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg = VizConfig::from_json_str(r#"{ "generations": 5, "on_load_error": "skip" }"#).unwrap();
        assert_eq!(cfg.generations, 5);
        assert_eq!(cfg.on_load_error, LoadFailurePolicy::Skip);
        assert_eq!(cfg.interval_ms, 1000);
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        assert!(VizConfig::from_json_str(r#"{ "generatons": 5 }"#).is_err());
        assert!(VizConfig::from_json_str(r#"{ "generations": 0 }"#).is_err());
        assert!(VizConfig::from_json_str(r#"{ "file_template": "gen.csv" }"#).is_err());
        assert!(VizConfig::from_json_str(r#"{ "palette": [{ "name": "X", "color": "nope" }] }"#).is_err());
    }

    #[test]
    fn loader_uses_dir_and_template() {
        let cfg = VizConfig { data_dir: "out".into(), file_template: "g{gen}.csv".into(), ..VizConfig::default() };
        assert_eq!(cfg.loader().resource_path(4), PathBuf::from("out/g04.csv"));
    }
}
