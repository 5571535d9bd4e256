// File: crates/bubble-core/src/text.rs
// Summary: Single-style caption shaping (generation label, legend, trend axes) via Skia textlayout.

use skia_safe as skia;
use skia::textlayout::{FontCollection, Paragraph, ParagraphBuilder, ParagraphStyle, TextStyle};

const FAMILIES: &[&str] = &["Segoe UI", "Arial", "Helvetica", "Roboto", "DejaVu Sans", "sans-serif"];

/// Horizontal anchor of a caption relative to its `x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

pub struct TextShaper {
    fonts: FontCollection,
}

impl TextShaper {
    pub fn new() -> Self {
        let mut fonts = FontCollection::new();
        fonts.set_default_font_manager(skia::FontMgr::default(), None);
        Self { fonts }
    }

    fn shape(&self, text: &str, size: f32, color: skia::Color) -> Paragraph {
        let mut ts = TextStyle::new();
        ts.set_font_size(size.max(1.0));
        ts.set_color(color);
        ts.set_font_families(FAMILIES);
        let mut builder = ParagraphBuilder::new(&ParagraphStyle::new(), &self.fonts);
        builder.push_style(&ts);
        builder.add_text(text);
        let mut paragraph = builder.build();
        paragraph.layout(10_000.0);
        paragraph
    }

    pub fn measure_width(&self, text: &str, size: f32) -> f32 {
        self.shape(text, size, skia::Color::TRANSPARENT).longest_line()
    }

    /// Draw `text` with its alphabetic baseline on `baseline`, anchored at `x`.
    pub fn draw(&self, canvas: &skia::Canvas, text: &str, (x, baseline): (f32, f32), size: f32, color: skia::Color, anchor: Anchor) {
        let mut p = self.shape(text, size, color);
        let width = p.longest_line();
        let left = match anchor {
            Anchor::Start => x,
            Anchor::Middle => x - width * 0.5,
            Anchor::End => x - width,
        };
        p.paint(canvas, (left, baseline - p.alphabetic_baseline()));
    }
}

impl Default for TextShaper {
    fn default() -> Self { Self::new() }
}
