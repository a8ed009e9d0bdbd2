use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "famflow", version, about = "Family tree diagrams and reveal animations")]
struct Cli {
    /// TOML configuration (defaults to ./config.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw the whole family as a still image.
    Render(RenderArgs),
    /// Reveal generations one by one with crossfades (requires `ffmpeg` on PATH).
    Animate(AnimateArgs),
    /// Grow the tree person by person, drawing every line (requires `ffmpeg` on PATH).
    AnimateFlow(FlowArgs),
    /// Render one instant of the line-drawing animation as a PNG.
    Frame(FrameArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// Rasterized by famflow.
    Png,
    /// Drawn by Graphviz itself.
    Svg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    /// Couples, then their children, generation by generation.
    Generational,
    /// One person per step in input order.
    Enumeration,
}

impl From<PolicyArg> for famflow::SchedulePolicy {
    fn from(p: PolicyArg) -> Self {
        match p {
            PolicyArg::Generational => Self::Generational,
            PolicyArg::Enumeration => Self::Enumeration,
        }
    }
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input family JSON.
    #[arg(long = "in", visible_alias = "input")]
    in_path: PathBuf,

    /// Output image path.
    #[arg(long, visible_alias = "output")]
    out: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Png)]
    format: OutputFormat,
}

#[derive(Parser, Debug)]
struct AnimateArgs {
    /// Input family JSON.
    #[arg(long = "in", visible_alias = "input")]
    in_path: PathBuf,

    /// Output MP4 path.
    #[arg(long, visible_alias = "output")]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct FlowArgs {
    /// Input family JSON.
    #[arg(long = "in", visible_alias = "input")]
    in_path: PathBuf,

    /// Output MP4 path.
    #[arg(long, visible_alias = "output")]
    out: PathBuf,

    /// Seconds per line-drawing step (overrides the config).
    #[arg(long)]
    line_duration: Option<f64>,

    /// How people are grouped into steps.
    #[arg(long, value_enum, default_value_t = PolicyArg::Generational)]
    policy: PolicyArg,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Render chunk size (parallel mode only).
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input family JSON.
    #[arg(long = "in", visible_alias = "input")]
    in_path: PathBuf,

    /// Timestamp in seconds.
    #[arg(long)]
    time: f64,

    /// Output PNG path.
    #[arg(long, visible_alias = "output")]
    out: PathBuf,

    /// How people are grouped into steps.
    #[arg(long, value_enum, default_value_t = PolicyArg::Generational)]
    policy: PolicyArg,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = famflow::load_config(cli.config.as_deref())?;
    init_logging(&config.logging);
    match cli.cmd {
        Command::Render(args) => cmd_render(args, &config),
        Command::Animate(args) => cmd_animate(args, &config),
        Command::AnimateFlow(args) => cmd_animate_flow(args, config),
        Command::Frame(args) => cmd_frame(args, &config),
    }
}

fn init_logging(cfg: &famflow::LoggingConfig) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn load_family(path: &Path) -> anyhow::Result<famflow::FamilyGraph> {
    famflow::FamilyGraph::from_path(path)
        .with_context(|| format!("load family '{}'", path.display()))
}

fn cmd_render(args: RenderArgs, config: &famflow::AppConfig) -> anyhow::Result<()> {
    let graph = load_family(&args.in_path)?;
    let solver = config.solver();
    match args.format {
        OutputFormat::Png => {
            let frame = famflow::render_still(&graph, &solver, config)?;
            frame.save_png(&args.out)?;
        }
        OutputFormat::Svg => {
            let generations = famflow::resolve_generations(&graph);
            let everyone: BTreeSet<famflow::PersonId> = graph.ids().into_iter().collect();
            let request = famflow::LayoutRequest::for_family(&graph, &generations, &everyone);
            solver.render_to_file(&request, &config.layout_params().hints, "svg", &args.out)?;
        }
    }
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_animate(args: AnimateArgs, config: &famflow::AppConfig) -> anyhow::Result<()> {
    let graph = load_family(&args.in_path)?;
    let mut sink = ffmpeg_sink(&args.out, config);
    famflow::render_generation_reveal(&graph, &config.solver(), config, &mut sink)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_animate_flow(args: FlowArgs, mut config: famflow::AppConfig) -> anyhow::Result<()> {
    if let Some(d) = args.line_duration {
        config.animation.line_duration = d;
    }
    let graph = load_family(&args.in_path)?;
    let anim =
        famflow::FlowAnimation::prepare(&graph, &config.solver(), &config, args.policy.into())?;
    let threading = famflow::RenderThreading {
        parallel: args.parallel,
        chunk_size: args.chunk_size,
        threads: args.threads,
    };
    let mut sink = ffmpeg_sink(&args.out, &config);
    famflow::render_flow(&anim, &mut sink, &threading)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frame(args: FrameArgs, config: &famflow::AppConfig) -> anyhow::Result<()> {
    let graph = load_family(&args.in_path)?;
    let anim =
        famflow::FlowAnimation::prepare(&graph, &config.solver(), config, args.policy.into())?;
    let frame = famflow::render_flow_frame(&anim, args.time)?;
    frame.save_png(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn ffmpeg_sink(out: &Path, config: &famflow::AppConfig) -> famflow::FfmpegSink {
    famflow::FfmpegSink::new(famflow::FfmpegSinkOpts {
        out_path: out.to_path_buf(),
        overwrite: true,
        background: config.style.colors.background,
    })
}
