// File: crates/bubble-core/src/scale.rs
// Summary: Square-root scale mapping surname counts to bubble radii.

use crate::types::{RADIUS_MAX, RADIUS_MIN};

/// Maps a domain to a pixel range through `sqrt`, so area (not radius) grows
/// linearly with the input. Output is clamped to the range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SqrtScale {
    // domain endpoints, already square-rooted
    d0: f64,
    d1: f64,
    pub range_min: f32,
    pub range_max: f32,
}

impl SqrtScale {
    pub fn new(domain: (f64, f64), range: (f32, f32)) -> Self {
        Self {
            d0: domain.0.max(0.0).sqrt(),
            d1: domain.1.max(0.0).sqrt(),
            range_min: range.0,
            range_max: range.1,
        }
    }

    /// Radius scale for a dataset whose largest count is `max_count`: `[1, max] -> [2, 40]`.
    pub fn for_counts(max_count: u64) -> Self {
        Self::counts(max_count, (RADIUS_MIN, RADIUS_MAX))
    }

    /// Count scale over `[1, max_count]`. A `max_count` of 0 or 1 collapses the domain
    /// onto 1, so every count gets the range midpoint.
    pub fn counts(max_count: u64, range: (f32, f32)) -> Self {
        Self::new((1.0, max_count.max(1) as f64), range)
    }

    #[inline]
    pub fn apply(&self, v: f64) -> f32 {
        let span = self.d1 - self.d0;
        // a collapsed domain maps everything to the middle of the range
        let t = if span.abs() < 1e-12 { 0.5 } else { (v.max(0.0).sqrt() - self.d0) / span };
        let px = self.range_min + (t as f32) * (self.range_max - self.range_min);
        let (lo, hi) = if self.range_min <= self.range_max {
            (self.range_min, self.range_max)
        } else {
            (self.range_max, self.range_min)
        };
        px.clamp(lo, hi)
    }

    #[inline]
    pub fn radius(&self, count: u64) -> f32 {
        self.apply(count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_hit_range_bounds() {
        let s = SqrtScale::for_counts(100);
        assert!((s.radius(1) - 2.0).abs() < 1e-5);
        assert!((s.radius(100) - 40.0).abs() < 1e-5);
    }

    #[test]
    fn compresses_large_counts() {
        let s = SqrtScale::for_counts(10_000);
        let quarter = s.radius(2_500) - s.radius(1);
        let full = s.radius(10_000) - s.radius(1);
        // sqrt: a quarter of the count gives roughly half the radius growth
        assert!(quarter > full * 0.45 && quarter < full * 0.55, "quarter={quarter} full={full}");
    }

    #[test]
    fn monotone_and_bounded() {
        let s = SqrtScale::for_counts(977);
        let mut prev = f32::MIN;
        for c in 0..=1200u64 {
            let r = s.radius(c);
            assert!(r >= prev, "radius decreased at count {c}");
            assert!((RADIUS_MIN..=RADIUS_MAX).contains(&r));
            prev = r;
        }
    }

    #[test]
    fn collapsed_domain_uses_midpoint() {
        let s = SqrtScale::for_counts(1);
        assert_eq!(s.radius(1), 21.0);
    }

    #[test]
    fn all_zero_counts_use_midpoint() {
        let s = SqrtScale::for_counts(0);
        assert_eq!(s.radius(0), 21.0);
        // zero next to real counts still clamps to the minimum
        assert_eq!(SqrtScale::for_counts(5).radius(0), RADIUS_MIN);
    }
}
