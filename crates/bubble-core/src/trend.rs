// File: crates/bubble-core/src/trend.rs
// Summary: Line chart of total population and unique surnames per simulated generation.

use anyhow::Result;
use skia_safe as skia;

use crate::chart::{encode_png, raster_surface, read_rgba8, write_file};
use crate::legend::{draw_legend, layout_legend, LegendStyle};
use crate::simulate::GenerationSummary;
use crate::text::{Anchor, TextShaper};
use crate::types::Insets;

pub const TREND_TITLE: &str = "Unique Surnames and Population Over Generations";

#[derive(Clone, Debug, PartialEq)]
pub struct Axis {
    pub label: String,
    pub min: f64,
    pub max: f64,
}

impl Axis {
    pub fn new(label: impl Into<String>, min: f64, max: f64) -> Self {
        Self { label: label.into(), min, max }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Square,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineSeries {
    pub label: String,
    pub color: skia::Color,
    pub marker: Marker,
    pub points: Vec<(f64, f64)>,
}

#[derive(Clone)]
pub struct TrendOptions {
    pub width: i32,
    pub height: i32,
    pub insets: Insets,
    pub background: skia::Color,
    pub grid: skia::Color,
    pub axis: skia::Color,
    pub text_color: skia::Color,
    pub font_size: f32,
    pub legend: LegendStyle,
    pub draw_labels: bool,
}

impl Default for TrendOptions {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 640,
            insets: Insets::default(),
            background: skia::Color::from_argb(255, 250, 250, 252),
            grid: skia::Color::from_argb(255, 228, 228, 234),
            axis: skia::Color::from_argb(255, 120, 120, 130),
            text_color: skia::Color::from_argb(255, 20, 20, 30),
            font_size: 13.0,
            legend: LegendStyle::default(),
            draw_labels: true,
        }
    }
}

pub struct TrendChart {
    pub title: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub series: Vec<LineSeries>,
}

impl TrendChart {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_axis: Axis::new("Generation", 0.0, 1.0),
            y_axis: Axis::new("Count (same scale)", 0.0, 1.0),
            series: Vec::new(),
        }
    }

    /// Unique surnames and total population, one point per generation, on a shared y axis.
    pub fn from_summaries(summaries: &[GenerationSummary]) -> Self {
        let mut chart = Self::new(TREND_TITLE);
        let points = |f: fn(&GenerationSummary) -> usize| -> Vec<(f64, f64)> {
            summaries.iter().map(|s| (s.generation as f64, f(s) as f64)).collect()
        };
        chart.add_series(LineSeries {
            label: "Unique Surnames".to_string(),
            color: skia::Color::from_rgb(0x1f, 0x77, 0xb4),
            marker: Marker::Circle,
            points: points(|s| s.unique_surnames),
        });
        chart.add_series(LineSeries {
            label: "Total Population".to_string(),
            color: skia::Color::from_rgb(0xd6, 0x27, 0x28),
            marker: Marker::Square,
            points: points(|s| s.population),
        });
        chart.autoscale_axes();
        chart
    }

    pub fn add_series(&mut self, series: LineSeries) {
        self.series.push(series);
    }

    /// X spans the data exactly (at least one unit); Y runs from 0 to a rounded-up maximum.
    pub fn autoscale_axes(&mut self) {
        let all = || self.series.iter().flat_map(|s| s.points.iter().copied());
        let (mut x0, mut x1, mut y1) = (f64::INFINITY, f64::NEG_INFINITY, 0.0f64);
        for (x, y) in all() {
            x0 = x0.min(x);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        if !x0.is_finite() {
            (x0, x1) = (0.0, 1.0);
        }
        self.x_axis.min = x0;
        self.x_axis.max = x1.max(x0 + 1.0);
        self.y_axis.min = 0.0;
        self.y_axis.max = nice_ceil(y1);
    }

    /// Pixel position of data point `(x, y)` for `opts`.
    pub fn to_px(&self, opts: &TrendOptions, (x, y): (f64, f64)) -> (f32, f32) {
        let (l, t, r, b) = opts.insets.plot_area(opts.width, opts.height);
        let xspan = (self.x_axis.max - self.x_axis.min).max(1e-9);
        let yspan = (self.y_axis.max - self.y_axis.min).max(1e-9);
        let px = l + ((x - self.x_axis.min) / xspan) as f32 * (r - l);
        let py = b - ((y - self.y_axis.min) / yspan) as f32 * (b - t);
        (px, py)
    }

    fn draw(&self, canvas: &skia::Canvas, opts: &TrendOptions) {
        canvas.clear(opts.background);
        let (l, t, r, b) = opts.insets.plot_area(opts.width, opts.height);
        let shaper = opts.draw_labels.then(TextShaper::new);

        let mut line = skia::Paint::default();
        line.set_anti_alias(true);
        line.set_style(skia::paint::Style::Stroke);
        line.set_stroke_width(1.0);

        // Grid + y ticks
        line.set_color(opts.grid);
        let y_ticks = linspace(self.y_axis.min, self.y_axis.max, 6);
        for &v in &y_ticks {
            let (_, y) = self.to_px(opts, (self.x_axis.min, v));
            canvas.draw_line((l, y), (r, y), &line);
        }
        let x_ticks = generation_ticks(self.x_axis.min, self.x_axis.max, 10);
        for &g in &x_ticks {
            let (x, _) = self.to_px(opts, (g, self.y_axis.min));
            canvas.draw_line((x, t), (x, b), &line);
        }

        // Axes
        line.set_color(opts.axis);
        line.set_stroke_width(1.5);
        canvas.draw_line((l, b), (r, b), &line);
        canvas.draw_line((l, t), (l, b), &line);

        // Series: lines first, markers on top
        let mut stroke = skia::Paint::default();
        stroke.set_anti_alias(true);
        stroke.set_style(skia::paint::Style::Stroke);
        stroke.set_stroke_width(2.0);
        let mut fill = skia::Paint::default();
        fill.set_anti_alias(true);
        fill.set_style(skia::paint::Style::Fill);

        for s in &self.series {
            let pts: Vec<(f32, f32)> = s.points.iter().map(|&p| self.to_px(opts, p)).collect();
            if let Some((&first, rest)) = pts.split_first() {
                let mut path = skia::Path::new();
                path.move_to(first);
                for &p in rest {
                    path.line_to(p);
                }
                stroke.set_color(s.color);
                canvas.draw_path(&path, &stroke);
            }
            fill.set_color(s.color);
            for &(x, y) in &pts {
                match s.marker {
                    Marker::Circle => canvas.draw_circle((x, y), 3.5, &fill),
                    Marker::Square => canvas.draw_rect(skia::Rect::from_xywh(x - 3.5, y - 3.5, 7.0, 7.0), &fill),
                };
            }
        }

        // Legend in the top-left corner of the plot
        let style = opts.legend;
        let entries = || self.series.iter().map(|s| (s.label.as_str(), s.color));
        let area = skia::Rect::from_ltrb(l, t, r, b);
        let items = match &shaper {
            Some(sh) => layout_legend(entries(), area, &style, |c| sh.measure_width(c, style.font_size)),
            None => layout_legend(entries(), area, &style, |c| c.len() as f32 * style.font_size * 0.6),
        };
        draw_legend(canvas, shaper.as_ref(), &items, &style, opts.text_color);

        let Some(sh) = shaper else { return };
        let size = opts.font_size;
        sh.draw(canvas, &self.title, ((l + r) * 0.5, t - size * 1.6), size * 1.3, opts.text_color, Anchor::Middle);
        for &v in &y_ticks {
            let (_, y) = self.to_px(opts, (self.x_axis.min, v));
            sh.draw(canvas, &format!("{v:.0}"), (l - 8.0, y + size * 0.35), size, opts.text_color, Anchor::End);
        }
        for &g in &x_ticks {
            let (x, _) = self.to_px(opts, (g, self.y_axis.min));
            sh.draw(canvas, &format!("{g:.0}"), (x, b + size * 1.4), size, opts.text_color, Anchor::Middle);
        }
        sh.draw(canvas, &self.x_axis.label, ((l + r) * 0.5, b + size * 3.2), size, opts.text_color, Anchor::Middle);
        sh.draw(canvas, &self.y_axis.label, (l, t - size * 0.5), size, opts.text_color, Anchor::Start);
    }

    pub fn render_to_rgba8(&self, opts: &TrendOptions) -> Result<(Vec<u8>, u32, u32, usize)> {
        let mut surface = raster_surface(opts.width, opts.height)?;
        self.draw(surface.canvas(), opts);
        read_rgba8(&mut surface)
    }

    pub fn render_to_png_bytes(&self, opts: &TrendOptions) -> Result<Vec<u8>> {
        let (px, w, h, _) = self.render_to_rgba8(opts)?;
        encode_png(px, w, h)
    }

    pub fn render_to_png(&self, opts: &TrendOptions, output_png_path: impl AsRef<std::path::Path>) -> Result<()> {
        write_file(output_png_path.as_ref(), &self.render_to_png_bytes(opts)?)
    }
}

fn linspace(start: f64, end: f64, steps: usize) -> Vec<f64> {
    if steps < 2 {
        return vec![start, end];
    }
    let step = (end - start) / (steps as f64 - 1.0);
    (0..steps).map(|i| start + step * i as f64).collect()
}

/// Whole-generation ticks, at most `max_ticks` of them, always including `min`.
fn generation_ticks(min: f64, max: f64, max_ticks: usize) -> Vec<f64> {
    let span = (max - min).max(1.0);
    let step = (span / max_ticks.max(1) as f64).ceil().max(1.0);
    let mut out = Vec::new();
    let mut g = min;
    while g <= max + 1e-9 {
        out.push(g);
        g += step;
    }
    out
}

/// Smallest of 1, 2, 5 or 10 times a power of ten that is >= `v` (1 for non-positive input).
pub fn nice_ceil(v: f64) -> f64 {
    if v <= 0.0 || !v.is_finite() {
        return 1.0;
    }
    let mag = 10f64.powf(v.log10().floor());
    [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|m| m * mag)
        .find(|&c| c >= v * (1.0 - 1e-12))
        .unwrap_or(10.0 * mag)
}
