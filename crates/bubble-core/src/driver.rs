// File: crates/bubble-core/src/driver.rs
// Summary: Animation driver; serial load -> render -> present -> advance -> wait loop with a stop signal.

use std::time::Duration;

use anyhow::{bail, Result};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::{LoadFailurePolicy, VizConfig};
use crate::loader::FrameLoader;
use crate::palette::Palette;
use crate::renderer::BubbleRenderer;
use crate::scene::{ReconcileReport, Scene};
use crate::types::Viewport;

/// Where the loop is. Owned by the driver; nothing else mutates it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationState {
    pub generation_index: usize,
    pub running: bool,
}

impl AnimationState {
    pub fn start() -> Self {
        Self { generation_index: 0, running: true }
    }

    /// Step to the next generation, wrapping after `generations`.
    pub fn advance(&mut self, generations: usize) {
        self.generation_index = (self.generation_index + 1) % generations.max(1);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames: u64,
    pub load_failures: u64,
    pub skipped: u64,
}

/// What a sink receives after each successful render.
pub struct Frame<'a> {
    pub generation: usize,
    /// 0-based count of frames presented before this one.
    pub sequence: u64,
    pub scene: &'a Scene,
    pub palette: &'a Palette,
    pub report: &'a ReconcileReport,
    /// Time until the next frame is requested.
    pub interval: Duration,
}

pub trait FrameSink {
    fn present(&mut self, frame: &Frame<'_>) -> Result<()>;
}

/// Requests a stop. Dropping it does not stop the loop.
#[derive(Clone, Debug)]
pub struct StopHandle(std::sync::Arc<watch::Sender<bool>>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.send_replace(true);
    }
}

#[derive(Clone, Debug)]
pub struct StopSignal(watch::Receiver<bool>);

impl StopSignal {
    pub fn is_stopped(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once a stop is requested; pending forever if every handle is dropped first.
    pub async fn stopped(&mut self) {
        loop {
            if *self.0.borrow_and_update() {
                return;
            }
            if self.0.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle(std::sync::Arc::new(tx)), StopSignal(rx))
}

#[derive(Clone, Debug, PartialEq)]
pub struct DriverOptions {
    pub generations: usize,
    pub interval: Duration,
    pub on_load_error: LoadFailurePolicy,
    pub max_retries: u32,
    pub retry_backoff: Duration,
    /// Stop after presenting this many frames.
    pub max_frames: Option<u64>,
}

impl DriverOptions {
    pub fn from_config(cfg: &VizConfig) -> Self {
        Self {
            generations: cfg.generations,
            interval: cfg.interval(),
            on_load_error: cfg.on_load_error,
            max_retries: cfg.max_retries,
            retry_backoff: cfg.retry_backoff(),
            max_frames: None,
        }
    }
}

pub struct Animator<S: FrameSink> {
    loader: FrameLoader,
    renderer: BubbleRenderer,
    sink: S,
    opts: DriverOptions,
}

impl<S: FrameSink> Animator<S> {
    pub fn new(loader: FrameLoader, renderer: BubbleRenderer, sink: S, opts: DriverOptions) -> Self {
        Self { loader, renderer, sink, opts }
    }

    pub fn from_config(cfg: &VizConfig, sink: S) -> Result<Self> {
        cfg.validate()?;
        let viewport = Viewport::for_surface(cfg.width, cfg.height, cfg.bubble_area_fraction);
        let renderer = BubbleRenderer::new(cfg.palette()?, viewport, cfg.transition())
            .with_radius_range(cfg.radius_min, cfg.radius_max)
            .with_layout(cfg.layout_ticks, cfg.collide_padding);
        Ok(Self::new(cfg.loader(), renderer, sink, DriverOptions::from_config(cfg)))
    }

    pub fn with_max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.opts.max_frames = max_frames;
        self
    }

    pub fn sink(&self) -> &S { &self.sink }
    pub fn into_sink(self) -> S { self.sink }
    pub fn renderer(&self) -> &BubbleRenderer { &self.renderer }

    /// Run until stopped, `max_frames` is reached, or a sink fails.
    /// Fails as well when a whole cycle of generations went by without a single successful load.
    pub async fn run(&mut self, mut stop: StopSignal) -> Result<(AnimationState, RunStats)> {
        let generations = self.opts.generations.max(1);
        let mut state = AnimationState::start();
        let mut stats = RunStats::default();
        let mut attempts = 0u32;
        let mut consecutive_skips = 0usize;
        let mut since_render = Duration::ZERO;

        info!(generations, interval_ms = self.opts.interval.as_millis() as u64, "animation started");

        while state.running {
            if stop.is_stopped() {
                break;
            }
            let generation = state.generation_index;

            let loaded = tokio::select! {
                res = self.loader.load(generation) => res,
                _ = stop.stopped() => break,
            };

            let wait = match loaded {
                Ok(records) => {
                    attempts = 0;
                    consecutive_skips = 0;
                    let report = self.renderer.render(&records, generation, since_render);
                    since_render = Duration::ZERO;
                    let frame = Frame {
                        generation,
                        sequence: stats.frames,
                        scene: self.renderer.scene(),
                        palette: self.renderer.palette(),
                        report: &report,
                        interval: self.opts.interval,
                    };
                    self.sink.present(&frame)?;
                    stats.frames += 1;
                    info!(generation, bubbles = records.len(), frame = stats.frames, "presented frame");

                    state.advance(generations);
                    if self.opts.max_frames.is_some_and(|max| stats.frames >= max) {
                        break;
                    }
                    self.opts.interval
                }
                Err(err) => {
                    stats.load_failures += 1;
                    let retry = self.opts.on_load_error == LoadFailurePolicy::Retry && attempts < self.opts.max_retries;
                    if retry {
                        attempts += 1;
                        warn!(generation, attempt = attempts, error = %err, "load failed; retrying");
                        self.opts.retry_backoff
                    } else {
                        attempts = 0;
                        stats.skipped += 1;
                        consecutive_skips += 1;
                        warn!(generation, error = %err, "load failed; skipping generation");
                        if consecutive_skips >= generations {
                            bail!("no generation could be loaded in a full cycle; last error: {err}");
                        }
                        state.advance(generations);
                        self.opts.interval
                    }
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(wait) => since_render += wait,
                _ = stop.stopped() => break,
            }
        }

        state.running = false;
        info!(frames = stats.frames, failures = stats.load_failures, skipped = stats.skipped, "animation stopped");
        Ok((state, stats))
    }
}
