// File: crates/bubble-core/src/types.rs
// Summary: Shared types and constants (surface size, timing, radius range, layout tuning, plot insets).

/// Default surface width in pixels.
pub const WIDTH: i32 = 1280;
/// Default surface height in pixels.
pub const HEIGHT: i32 = 800;
/// Share of the surface height given to the bubble area; the legend strip takes the rest.
pub const BUBBLE_AREA_FRACTION: f32 = 0.85;

/// Number of generation files in one animation cycle.
pub const GENERATIONS: usize = 50;
/// Delay between frames, in milliseconds.
pub const FRAME_INTERVAL_MS: u64 = 1000;
/// Enter/update transition duration, in milliseconds.
pub const TRANSITION_MS: u64 = 800;
/// Collision relaxation iterations per frame.
pub const LAYOUT_TICKS: usize = 120;

/// Smallest bubble radius, in pixels.
pub const RADIUS_MIN: f32 = 2.0;
/// Largest bubble radius, in pixels.
pub const RADIUS_MAX: f32 = 40.0;
/// Gap added to each radius when resolving overlaps.
pub const COLLIDE_PADDING: f32 = 1.0;

/// Name of the fallback palette entry; also the nationality given to rows without one.
pub const UNKNOWN_NATIONALITY: &str = "Unknown";

/// Pixel size of the bubble area and its center.
/// Contract: width and height are positive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Bubble area for a surface: full width, `fraction` of the height.
    pub fn for_surface(width: i32, height: i32, fraction: f32) -> Self {
        let fraction = fraction.clamp(0.1, 1.0);
        Self::new(width.max(1) as f32, (height.max(1) as f32 * fraction).floor().max(1.0))
    }

    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.width * 0.5, self.height * 0.5)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::for_surface(WIDTH, HEIGHT, BUBBLE_AREA_FRACTION)
    }
}

/// Margins around a plot area, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Insets {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Insets {
    pub const fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self { left, right, top, bottom }
    }

    /// Plot rectangle `(left, top, right, bottom)` inside a `width` x `height` surface.
    pub fn plot_area(&self, width: i32, height: i32) -> (f32, f32, f32, f32) {
        let (w, h) = (width as f32, height as f32);
        let right = (w - self.right).max(self.left + 1.0);
        let bottom = (h - self.bottom).max(self.top + 1.0);
        (self.left, self.top, right, bottom)
    }
}

impl Default for Insets {
    fn default() -> Self {
        Self::new(80.0, 32.0, 56.0, 64.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bubble_area_is_85_percent_of_height() {
        let v = Viewport::for_surface(1000, 800, BUBBLE_AREA_FRACTION);
        assert_eq!(v.width, 1000.0);
        assert_eq!(v.height, 680.0);
        assert_eq!(v.center(), (500.0, 340.0));
    }

    #[test]
    fn plot_area_never_inverts() {
        assert_eq!(Insets::default().plot_area(1024, 640), (80.0, 56.0, 992.0, 576.0));
        let (l, t, r, b) = Insets::default().plot_area(10, 10);
        assert!(r > l && b > t);
    }
}
