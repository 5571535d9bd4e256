// File: crates/bubble-core/src/sink.rs
// Summary: Frame sinks; PNG image sequence sampled along each frame's transition timeline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use crate::chart::{BubbleChart, RenderOptions};
use crate::driver::{Frame, FrameSink};

/// Writes `frame_NNNNN.png` files covering every frame interval at `fps`.
/// With `fps == 0` only the settled state of each generation is written.
pub struct PngSequenceSink {
    dir: PathBuf,
    opts: RenderOptions,
    fps: f32,
    written: u64,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>, opts: RenderOptions, fps: f32) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        Ok(Self { dir, opts, fps: fps.max(0.0), written: 0 })
    }

    pub fn dir(&self) -> &Path { &self.dir }
    pub fn written(&self) -> u64 { self.written }

    /// Sample times within one interval: `interval * k / n` for k in 1..=n.
    pub fn sample_times(&self, interval: Duration) -> Vec<Duration> {
        let n = (interval.as_secs_f32() * self.fps).round().max(1.0) as u32;
        (1..=n).map(|k| interval.mul_f64(k as f64 / n as f64)).collect()
    }
}

impl FrameSink for PngSequenceSink {
    fn present(&mut self, frame: &Frame<'_>) -> Result<()> {
        let times = if self.fps == 0.0 {
            vec![frame.scene.transition()]
        } else {
            self.sample_times(frame.interval)
        };
        for at in times {
            let chart = BubbleChart::from_scene(frame.scene, frame.palette, at);
            let path = self.dir.join(format!("frame_{:05}.png", self.written));
            chart.render_to_png(&self.opts, &path).with_context(|| format!("writing {}", path.display()))?;
            self.written += 1;
        }
        debug!(generation = frame.generation, total = self.written, "wrote frame images");
        Ok(())
    }
}
