// File: crates/bubble-core/src/lib.rs
// Summary: Core library entry point; exports loading, layout, reconciliation, rendering, the animation driver and the simulator trend chart.

pub mod chart;
pub mod config;
pub mod driver;
pub mod error;
pub mod layout;
pub mod legend;
pub mod loader;
pub mod palette;
pub mod record;
pub mod renderer;
pub mod scale;
pub mod scene;
pub mod simulate;
pub mod sink;
pub mod text;
pub mod trend;
pub mod types;

pub use chart::{render_legend_png, render_legend_rgba8, BubbleChart, RenderOptions};
pub use config::{LoadFailurePolicy, VizConfig};
pub use driver::{stop_channel, AnimationState, Animator, Frame, FrameSink, RunStats, StopHandle, StopSignal};
pub use error::{DataError, LoadError};
pub use loader::{generation_tag, FrameLoader};
pub use palette::Palette;
pub use record::SurnameRecord;
pub use renderer::{generation_label, BubbleRenderer};
pub use scale::SqrtScale;
pub use scene::{BubbleState, DisplayedBubble, ReconcileReport, Scene};
pub use sink::PngSequenceSink;
pub use text::{Anchor, TextShaper};
pub use trend::{TrendChart, TrendOptions};
pub use types::{Insets, Viewport};
