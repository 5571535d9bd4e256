// File: crates/bubble-core/src/layout.rs
// Summary: Fixed-iteration collision relaxation that packs circles around a center point.
//
// Per tick: every overlapping pair is pushed apart (smaller circles move
// more), velocities decay, positions integrate, and the whole set is
// translated so its centroid sits on the center. The pass stops after
// `ticks` iterations whether or not it has settled.

/// Tuning for one layout pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    pub ticks: usize,
    pub center: (f32, f32),
    /// Overlap correction per tick, 0..=1.
    pub strength: f32,
    /// Fraction of velocity kept after each tick.
    pub velocity_retain: f32,
}

impl LayoutParams {
    pub fn new(center: (f32, f32), ticks: usize) -> Self {
        Self { ticks, center, strength: 1.0, velocity_retain: 0.6 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Body {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    r: f32,
}

/// Deterministic stand-in for randomness when two centers coincide exactly.
struct Jiggle(u32);

impl Jiggle {
    fn next(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        ((self.0 as f64 / 4_294_967_296.0 - 0.5) * 1e-6) as f32
    }
}

/// Place circles with the given collision radii. Output order matches input order.
pub fn pack(radii: &[f32], params: &LayoutParams) -> Vec<(f32, f32)> {
    let n = radii.len();
    if n == 0 {
        return Vec::new();
    }

    // phyllotaxis seed so the first ticks start from a compact, non-degenerate spread
    let golden = std::f32::consts::PI * (3.0 - 5f32.sqrt());
    let mut bodies: Vec<Body> = radii
        .iter()
        .enumerate()
        .map(|(i, &r)| {
            let dist = 10.0 * (0.5 + i as f32).sqrt();
            let angle = i as f32 * golden;
            Body { x: dist * angle.cos(), y: dist * angle.sin(), vx: 0.0, vy: 0.0, r: r.max(0.0) }
        })
        .collect();

    let mut jiggle = Jiggle(1);
    for _ in 0..params.ticks {
        collide(&mut bodies, params.strength, &mut jiggle);
        for b in &mut bodies {
            b.vx *= params.velocity_retain;
            b.vy *= params.velocity_retain;
            b.x += b.vx;
            b.y += b.vy;
        }
        recenter(&mut bodies, params.center);
    }

    if params.ticks == 0 {
        recenter(&mut bodies, params.center);
    }
    bodies.into_iter().map(|b| (b.x, b.y)).collect()
}

fn collide(bodies: &mut [Body], strength: f32, jiggle: &mut Jiggle) {
    let n = bodies.len();
    for i in 0..n {
        let (xi, yi, ri) = {
            let b = &bodies[i];
            (b.x + b.vx, b.y + b.vy, b.r)
        };
        let ri2 = ri * ri;
        for j in (i + 1)..n {
            let bj = bodies[j];
            let r = ri + bj.r;
            let mut dx = xi - bj.x - bj.vx;
            let mut dy = yi - bj.y - bj.vy;
            let mut l = dx * dx + dy * dy;
            if l >= r * r {
                continue;
            }
            if dx == 0.0 {
                dx = jiggle.next();
                l += dx * dx;
            }
            if dy == 0.0 {
                dy = jiggle.next();
                l += dy * dy;
            }
            let dist = l.sqrt();
            let push = (r - dist) / dist * strength;
            dx *= push;
            dy *= push;
            let rj2 = bj.r * bj.r;
            // share of the correction taken by i: bigger j, bigger share
            let wi = if ri2 + rj2 > 0.0 { rj2 / (ri2 + rj2) } else { 0.5 };
            let wj = 1.0 - wi;
            bodies[i].vx += dx * wi;
            bodies[i].vy += dy * wi;
            bodies[j].vx -= dx * wj;
            bodies[j].vy -= dy * wj;
        }
    }
}

fn recenter(bodies: &mut [Body], center: (f32, f32)) {
    let n = bodies.len() as f32;
    let (sx, sy) = bodies.iter().fold((0.0f32, 0.0f32), |(sx, sy), b| (sx + b.x, sy + b.y));
    let (dx, dy) = (sx / n - center.0, sy / n - center.1);
    for b in bodies {
        b.x -= dx;
        b.y -= dy;
    }
}

/// Largest pairwise overlap, in pixels, between circles at `positions` with `radii`.
pub fn max_overlap(positions: &[(f32, f32)], radii: &[f32]) -> f32 {
    let mut worst = 0.0f32;
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let (dx, dy) = (positions[i].0 - positions[j].0, positions[i].1 - positions[j].1);
            let overlap = radii[i] + radii[j] - (dx * dx + dy * dy).sqrt();
            worst = worst.max(overlap);
        }
    }
    worst
}
