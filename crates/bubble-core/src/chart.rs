// File: crates/bubble-core/src/chart.rs
// Summary: BubbleChart frame and headless PNG/RGBA rendering pipeline using Skia CPU raster surfaces.

use std::time::Duration;

use anyhow::{Context, Result};
use skia_safe as skia;

use crate::legend::{draw_legend, layout_legend, legend_height, LegendItem, LegendStyle};
use crate::palette::Palette;
use crate::scene::{BubbleState, Scene};
use crate::text::{Anchor, TextShaper};
use crate::types::{Viewport, BUBBLE_AREA_FRACTION, HEIGHT, WIDTH};

#[derive(Clone)]
pub struct RenderOptions {
    pub width: i32,
    pub height: i32,
    /// Share of the height used by bubbles; the legend strip gets the rest.
    pub bubble_area_fraction: f32,
    pub background: skia::Color,
    pub text_color: skia::Color,
    pub label_size: f32,
    pub legend: LegendStyle,
    /// Text rendering varies across platforms; tests switch it off.
    pub draw_labels: bool,
    pub draw_legend: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            bubble_area_fraction: BUBBLE_AREA_FRACTION,
            background: skia::Color::from_argb(255, 250, 250, 252),
            text_color: skia::Color::from_argb(255, 20, 20, 30),
            label_size: 24.0,
            legend: LegendStyle::default(),
            draw_labels: true,
            draw_legend: true,
        }
    }
}

impl RenderOptions {
    pub fn viewport(&self) -> Viewport {
        Viewport::for_surface(self.width, self.height, self.bubble_area_fraction)
    }
}

/// One still frame: the label plus every bubble's state at a single instant.
pub struct BubbleChart {
    pub label: String,
    pub bubbles: Vec<BubbleState>,
    pub palette: Palette,
}

impl BubbleChart {
    pub fn new(palette: Palette) -> Self {
        Self { label: String::new(), bubbles: Vec::new(), palette }
    }

    /// Snapshot `scene` `elapsed` into its current transition.
    pub fn from_scene(scene: &Scene, palette: &Palette, elapsed: Duration) -> Self {
        Self { label: scene.label().to_string(), bubbles: scene.sample(elapsed), palette: palette.clone() }
    }

    fn draw(&self, canvas: &skia::Canvas, opts: &RenderOptions) {
        canvas.clear(opts.background);
        let area = opts.viewport();
        let shaper = (opts.draw_labels).then(TextShaper::new);

        // Bubbles
        let mut fill = skia::Paint::default();
        fill.set_anti_alias(true);
        fill.set_style(skia::paint::Style::Fill);
        let mut stroke = skia::Paint::default();
        stroke.set_anti_alias(true);
        stroke.set_style(skia::paint::Style::Stroke);
        stroke.set_stroke_width(1.0);
        stroke.set_color(skia::Color::from_argb(160, 255, 255, 255));

        canvas.save();
        canvas.clip_rect(skia::Rect::from_wh(area.width, area.height), skia::ClipOp::Intersect, true);
        for b in &self.bubbles {
            if b.radius <= 0.0 {
                continue;
            }
            fill.set_color(b.color);
            canvas.draw_circle((b.x, b.y), b.radius, &fill);
            canvas.draw_circle((b.x, b.y), b.radius, &stroke);
        }
        canvas.restore();

        // Label
        if let (Some(shaper), false) = (&shaper, self.label.is_empty()) {
            let baseline = 16.0 + opts.label_size;
            shaper.draw(canvas, &self.label, (16.0, baseline), opts.label_size, opts.text_color, Anchor::Start);
        }

        // Legend strip
        if opts.draw_legend {
            let strip = skia::Rect::from_ltrb(0.0, area.height, opts.width as f32, opts.height as f32);
            let style = opts.legend;
            let items = legend_items(&self.palette, shaper.as_ref(), strip, &style);
            draw_legend(canvas, shaper.as_ref(), &items, &style, opts.text_color);
        }
    }

    /// Render into a tightly packed RGBA8 buffer. Returns (pixels, width, height, stride).
    pub fn render_to_rgba8(&self, opts: &RenderOptions) -> Result<(Vec<u8>, u32, u32, usize)> {
        let mut surface = raster_surface(opts.width, opts.height)?;
        self.draw(surface.canvas(), opts);
        read_rgba8(&mut surface)
    }

    /// PNG-encoded frame. Pixels come back from Skia as RGBA and are encoded with `image`.
    pub fn render_to_png_bytes(&self, opts: &RenderOptions) -> Result<Vec<u8>> {
        let (px, w, h, _) = self.render_to_rgba8(opts)?;
        encode_png(px, w, h)
    }

    /// Render the frame to a PNG at `output_png_path`, creating parent directories.
    pub fn render_to_png(&self, opts: &RenderOptions, output_png_path: impl AsRef<std::path::Path>) -> Result<()> {
        write_file(output_png_path.as_ref(), &self.render_to_png_bytes(opts)?)
    }
}

/// Legend items for `palette` in `area`; without a shaper captions get an estimated width.
fn legend_items(palette: &Palette, shaper: Option<&TextShaper>, area: skia::Rect, style: &LegendStyle) -> Vec<LegendItem> {
    match shaper {
        Some(s) => layout_legend(palette.iter(), area, style, |t| s.measure_width(t, style.font_size)),
        None => layout_legend(palette.iter(), area, style, |t| t.len() as f32 * style.font_size * 0.6),
    }
}

/// Standalone legend image: full width, just tall enough for its rows.
pub fn render_legend_png(palette: &Palette, opts: &RenderOptions, output_png_path: impl AsRef<std::path::Path>) -> Result<()> {
    let (px, w, h, _) = render_legend_rgba8(palette, opts)?;
    write_file(output_png_path.as_ref(), &encode_png(px, w, h)?)
}

pub fn render_legend_rgba8(palette: &Palette, opts: &RenderOptions) -> Result<(Vec<u8>, u32, u32, usize)> {
    let shaper = opts.draw_labels.then(TextShaper::new);
    let style = opts.legend;
    let area = skia::Rect::from_xywh(0.0, 0.0, opts.width as f32, 0.0);
    let items = legend_items(palette, shaper.as_ref(), area, &style);
    let height = legend_height(&items, 0.0, &style).ceil() as i32;

    let mut surface = raster_surface(opts.width, height)?;
    let canvas = surface.canvas();
    canvas.clear(opts.background);
    draw_legend(canvas, shaper.as_ref(), &items, &style, opts.text_color);
    read_rgba8(&mut surface)
}

// ---- raster helpers ---------------------------------------------------------

pub(crate) fn raster_surface(width: i32, height: i32) -> Result<skia::Surface> {
    skia::surfaces::raster_n32_premul((width, height))
        .ok_or_else(|| anyhow::anyhow!("failed to create {width}x{height} raster surface"))
}

pub(crate) fn read_rgba8(surface: &mut skia::Surface) -> Result<(Vec<u8>, u32, u32, usize)> {
    let (w, h) = (surface.width(), surface.height());
    let info = skia::ImageInfo::new((w, h), skia::ColorType::RGBA8888, skia::AlphaType::Unpremul, None);
    let stride = w as usize * 4;
    let mut px = vec![0u8; stride * h as usize];
    if !surface.read_pixels(&info, &mut px, stride, (0, 0)) {
        anyhow::bail!("reading back raster pixels failed");
    }
    Ok((px, w as u32, h as u32, stride))
}

pub(crate) fn encode_png(px: Vec<u8>, w: u32, h: u32) -> Result<Vec<u8>> {
    let img = image::RgbaImage::from_raw(w, h, px)
        .ok_or_else(|| anyhow::anyhow!("pixel buffer does not match {w}x{h}"))?;
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).context("encode PNG failed")?;
    Ok(out.into_inner())
}

pub(crate) fn write_file(path: &std::path::Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}
