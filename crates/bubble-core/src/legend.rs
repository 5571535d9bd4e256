// File: crates/bubble-core/src/legend.rs
// Summary: Static nationality legend: one swatch + caption per palette entry, laid out left to right.

use skia_safe as skia;

use crate::text::{Anchor, TextShaper};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LegendStyle {
    pub font_size: f32,
    pub swatch: f32,
    /// Gap between swatch and caption.
    pub gap: f32,
    /// Gap between items.
    pub spacing: f32,
    pub padding: f32,
}

impl Default for LegendStyle {
    fn default() -> Self {
        Self { font_size: 14.0, swatch: 14.0, gap: 6.0, spacing: 18.0, padding: 12.0 }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LegendItem {
    pub name: String,
    pub color: skia::Color,
    pub swatch: skia::Rect,
    pub text_x: f32,
    pub baseline: f32,
}

impl LegendStyle {
    pub fn row_height(&self) -> f32 {
        self.swatch.max(self.font_size) + self.gap
    }
}

/// Flow `entries` across `area`, wrapping to a new row when the next item would not fit.
/// `measure` returns the caption width in pixels.
pub fn layout_legend<'a>(
    entries: impl IntoIterator<Item = (&'a str, skia::Color)>,
    area: skia::Rect,
    style: &LegendStyle,
    measure: impl Fn(&str) -> f32,
) -> Vec<LegendItem> {
    let row_h = style.row_height();
    let mut x = area.left + style.padding;
    let mut y = area.top + style.padding;
    let mut out = Vec::new();

    for (name, color) in entries {
        let width = style.swatch + style.gap + measure(name);
        if x + width > area.right - style.padding && x > area.left + style.padding {
            x = area.left + style.padding;
            y += row_h;
        }
        let swatch = skia::Rect::from_xywh(x, y, style.swatch, style.swatch);
        out.push(LegendItem {
            name: name.to_string(),
            color,
            swatch,
            text_x: x + style.swatch + style.gap,
            baseline: y + style.swatch * 0.85,
        });
        x += width + style.spacing;
    }
    out
}

/// Height needed to show `items` laid out from `top`, bottom padding included.
pub fn legend_height(items: &[LegendItem], top: f32, style: &LegendStyle) -> f32 {
    let last_row = items.iter().map(|i| i.swatch.top).fold(top + style.padding, f32::max);
    last_row + style.row_height() - style.gap + style.padding - top
}

/// Swatches always; captions only when a shaper is given.
pub fn draw_legend(
    canvas: &skia::Canvas,
    shaper: Option<&TextShaper>,
    items: &[LegendItem],
    style: &LegendStyle,
    text_color: skia::Color,
) {
    let mut fill = skia::Paint::default();
    fill.set_anti_alias(true);
    fill.set_style(skia::paint::Style::Fill);

    for item in items {
        fill.set_color(item.color);
        canvas.draw_rect(item.swatch, &fill);
        if let Some(shaper) = shaper {
            shaper.draw(canvas, &item.name, (item.text_x, item.baseline), style.font_size, text_color, Anchor::Start);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Palette;

    fn fixed_width(s: &str) -> f32 { s.len() as f32 * 8.0 }

    #[test]
    fn one_item_per_palette_entry_in_order() {
        let palette = Palette::default();
        let items = layout_legend(palette.iter(), skia::Rect::from_xywh(0.0, 0.0, 2000.0, 100.0), &LegendStyle::default(), fixed_width);
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["English", "Indian", "Polish", "Russian", "Arabic", "Unknown"]);
        assert!(items.windows(2).all(|w| w[0].swatch.left < w[1].swatch.left));
        assert!(items.iter().all(|i| i.swatch.top == items[0].swatch.top));
    }

    #[test]
    fn narrow_area_wraps_rows() {
        let palette = Palette::default();
        let items = layout_legend(palette.iter(), skia::Rect::from_xywh(0.0, 0.0, 200.0, 400.0), &LegendStyle::default(), fixed_width);
        assert_eq!(items.len(), 6);
        assert!(items.last().unwrap().swatch.top > items[0].swatch.top);
        assert!(items.iter().all(|i| i.swatch.left >= 12.0));
    }

    #[test]
    fn height_covers_every_row() {
        let palette = Palette::default();
        let style = LegendStyle::default();
        let one_row = layout_legend(palette.iter(), skia::Rect::from_xywh(0.0, 0.0, 2000.0, 0.0), &style, fixed_width);
        // padding + swatch + padding
        assert_eq!(legend_height(&one_row, 0.0, &style), 38.0);

        let wrapped = layout_legend(palette.iter(), skia::Rect::from_xywh(0.0, 0.0, 200.0, 0.0), &style, fixed_width);
        let h = legend_height(&wrapped, 0.0, &style);
        assert!(h > 38.0);
        assert!(wrapped.iter().all(|i| i.swatch.bottom <= h - style.padding));
    }
}
