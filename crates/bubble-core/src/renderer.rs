// File: crates/bubble-core/src/renderer.rs
// Summary: Bubble renderer; turns a generation's records into sized, colored, packed targets and reconciles the scene.

use std::time::Duration;

use tracing::debug;

use crate::layout::{pack, LayoutParams};
use crate::palette::Palette;
use crate::record::SurnameRecord;
use crate::scale::SqrtScale;
use crate::scene::{BubbleState, BubbleTarget, ReconcileReport, Scene};
use crate::types::{Viewport, COLLIDE_PADDING, LAYOUT_TICKS, RADIUS_MAX, RADIUS_MIN};

pub fn generation_label(generation: usize) -> String {
    format!("Generation {generation}")
}

pub struct BubbleRenderer {
    palette: Palette,
    viewport: Viewport,
    radius_range: (f32, f32),
    collide_padding: f32,
    ticks: usize,
    scene: Scene,
}

impl BubbleRenderer {
    pub fn new(palette: Palette, viewport: Viewport, transition: Duration) -> Self {
        Self {
            palette,
            viewport,
            radius_range: (RADIUS_MIN, RADIUS_MAX),
            collide_padding: COLLIDE_PADDING,
            ticks: LAYOUT_TICKS,
            scene: Scene::new(viewport.center(), transition),
        }
    }

    pub fn with_radius_range(mut self, min: f32, max: f32) -> Self {
        self.radius_range = (min, max);
        self
    }

    pub fn with_layout(mut self, ticks: usize, collide_padding: f32) -> Self {
        self.ticks = ticks;
        self.collide_padding = collide_padding;
        self
    }

    pub fn scene(&self) -> &Scene { &self.scene }
    pub fn palette(&self) -> &Palette { &self.palette }
    pub fn viewport(&self) -> Viewport { self.viewport }

    /// Radius, color and packed position for every record, in record order.
    /// An empty dataset has no scale domain and yields no targets.
    pub fn targets(&self, records: &[SurnameRecord]) -> Vec<BubbleTarget> {
        let Some(max_count) = records.iter().map(|r| r.count).max() else {
            return Vec::new();
        };
        let scale = SqrtScale::counts(max_count, self.radius_range);
        let radii: Vec<f32> = records.iter().map(|r| scale.radius(r.count)).collect();
        let collide: Vec<f32> = radii.iter().map(|r| r + self.collide_padding).collect();
        let positions = pack(&collide, &LayoutParams::new(self.viewport.center(), self.ticks));

        records
            .iter()
            .zip(radii)
            .zip(positions)
            .map(|((rec, radius), (x, y))| BubbleTarget {
                surname: rec.surname.clone(),
                nationality: rec.nationality.clone(),
                count: rec.count,
                state: BubbleState { radius, x, y, color: self.palette.color_for(&rec.nationality) },
            })
            .collect()
    }

    /// Show `records` as generation `generation`. `elapsed` is the time since the previous render.
    pub fn render(&mut self, records: &[SurnameRecord], generation: usize, elapsed: Duration) -> ReconcileReport {
        let targets = self.targets(records);
        self.scene.set_label(generation_label(generation));
        let report = self.scene.reconcile(targets, elapsed);
        debug!(
            generation,
            entered = report.entered.len(),
            updated = report.updated.len(),
            exited = report.exited.len(),
            "reconciled bubbles"
        );
        report
    }
}
