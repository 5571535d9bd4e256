// File: crates/bubble-cli/src/main.rs
// Summary: `surname-bubbles` CLI; plays the generation animation to PNG frames, writes the legend, runs the simulator and charts its trend.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bubble_core::simulate::{load_immigrant_pool, load_native_surnames, SimulationConfig, Simulator};
use bubble_core::{
    render_legend_png, stop_channel, Animator, LoadFailurePolicy, PngSequenceSink, RenderOptions, TrendChart, TrendOptions,
    VizConfig,
};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "surname-bubbles", version, about = "Animated bubble chart of surname frequency across generations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cycle through the generation files and write the animation as PNG frames.
    Play(PlayArgs),
    /// Render the nationality legend on its own.
    Legend(LegendArgs),
    /// Simulate a population and write one CSV per generation.
    Simulate(SimulateArgs),
}

#[derive(Args, Debug)]
struct ViewArgs {
    /// JSON visualization config; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    width: Option<i32>,
    #[arg(long)]
    height: Option<i32>,
}

impl ViewArgs {
    fn load(&self) -> Result<VizConfig> {
        let mut cfg = match &self.config {
            Some(path) => VizConfig::load(path)?,
            None => VizConfig::default(),
        };
        if let Some(w) = self.width {
            cfg.width = w;
        }
        if let Some(h) = self.height {
            cfg.height = h;
        }
        Ok(cfg)
    }
}

#[derive(Args, Debug)]
struct PlayArgs {
    #[command(flatten)]
    view: ViewArgs,
    /// Directory the file template is resolved against.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[arg(long, default_value = "frames")]
    out: PathBuf,
    /// Stop after this many generation frames; runs until Ctrl-C otherwise.
    #[arg(long)]
    frames: Option<u64>,
    /// Images written per second of animation; 0 writes one settled image per generation.
    #[arg(long, default_value_t = 0.0)]
    fps: f32,
    #[arg(long)]
    interval_ms: Option<u64>,
    /// Skip unreadable generations immediately instead of retrying.
    #[arg(long)]
    skip_failures: bool,
    #[arg(long)]
    no_labels: bool,
    #[arg(long)]
    no_legend: bool,
}

#[derive(Args, Debug)]
struct LegendArgs {
    #[command(flatten)]
    view: ViewArgs,
    #[arg(long, default_value = "legend.png")]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// Native surnames CSV (`Name`, `Frequency`).
    #[arg(long)]
    native: PathBuf,
    /// Immigrant pool CSV (`nationality`, `name`, `ZipfPopularity`).
    #[arg(long)]
    immigrants: PathBuf,
    /// JSON simulation config.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output directory; files follow the default generation template.
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,
    #[arg(long)]
    generations: Option<usize>,
    #[arg(long)]
    population: Option<usize>,
    /// Fraction of the population added as immigrants each generation; 0 disables immigration.
    #[arg(long)]
    immigration: Option<f64>,
    #[arg(long)]
    seed: Option<u64>,
    /// Also write a line chart of population and unique surnames per generation.
    #[arg(long)]
    chart: Option<PathBuf>,
}

fn render_options(cfg: &VizConfig) -> RenderOptions {
    RenderOptions {
        width: cfg.width,
        height: cfg.height,
        bubble_area_fraction: cfg.bubble_area_fraction,
        ..RenderOptions::default()
    }
}

async fn play(args: PlayArgs) -> Result<()> {
    let mut cfg = args.view.load()?;
    if let Some(dir) = args.data_dir {
        cfg.data_dir = dir;
    }
    if let Some(ms) = args.interval_ms {
        cfg.interval_ms = ms;
    }
    if args.skip_failures {
        cfg.on_load_error = LoadFailurePolicy::Skip;
    }

    let mut opts = render_options(&cfg);
    opts.draw_labels = !args.no_labels;
    opts.draw_legend = !args.no_legend;

    let sink = PngSequenceSink::new(&args.out, opts, args.fps)?;
    let mut animator = Animator::from_config(&cfg, sink)?.with_max_frames(args.frames);

    let (handle, signal) = stop_channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupt received; stopping");
                handle.stop();
            }
            Err(e) => warn!(error = %e, "cannot listen for Ctrl-C"),
        }
    });

    let (state, stats) = animator.run(signal).await?;
    println!(
        "Wrote {} images for {} frames to {} (next generation {}, {} load failures, {} skipped)",
        animator.sink().written(),
        stats.frames,
        animator.sink().dir().display(),
        state.generation_index,
        stats.load_failures,
        stats.skipped
    );
    Ok(())
}

fn legend(args: LegendArgs) -> Result<()> {
    let cfg = args.view.load()?;
    let palette = cfg.palette()?;
    render_legend_png(&palette, &render_options(&cfg), &args.out)
        .with_context(|| format!("writing legend {}", args.out.display()))?;
    println!("Wrote {}", args.out.display());
    Ok(())
}

fn simulate(args: SimulateArgs) -> Result<()> {
    let mut cfg = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(g) = args.generations {
        cfg.generations = g;
    }
    if let Some(p) = args.population {
        cfg.initial_population = p;
    }
    if let Some(f) = args.immigration {
        cfg.immigration_fraction = f;
    }
    if let Some(s) = args.seed {
        cfg.seed = s;
    }

    let natives = load_native_surnames(&args.native)?;
    let pool = load_immigrant_pool(&args.immigrants)?;
    let out = VizConfig { data_dir: args.data_dir, ..VizConfig::default() }.loader();

    let summaries = Simulator::new(cfg).run(&natives, &pool, &out)?;
    if let Some(last) = summaries.last() {
        println!(
            "Simulated {} generations; final population {} with {} surnames",
            summaries.len(),
            last.population,
            last.unique_surnames
        );
    }
    if let Some(path) = &args.chart {
        TrendChart::from_summaries(&summaries)
            .render_to_png(&TrendOptions::default(), path)
            .with_context(|| format!("writing chart {}", path.display()))?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    match Cli::parse().command {
        Command::Play(args) => play(args).await,
        Command::Legend(args) => legend(args),
        Command::Simulate(args) => simulate(args),
    }
}
