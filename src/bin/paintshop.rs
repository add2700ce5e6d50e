use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "paintshop", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enumerate all valid variants and persist them as JSON.
    Enumerate(EnumerateArgs),
    /// Render a body-filtered subset of the enumerated variants to PNGs.
    Render(RenderArgs),
    /// Transform a raw template into the prepared all-off baseline.
    Prepare(PrepareArgs),
}

#[derive(Parser, Debug)]
struct EnumerateArgs {
    /// Option catalog JSON.
    #[arg(long, default_value = "options.json")]
    options: PathBuf,

    /// Output enumeration artifact.
    #[arg(long, default_value = "variants.json")]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Enumeration artifact written by `enumerate`.
    #[arg(long, default_value = "variants.json")]
    variants: PathBuf,

    /// Prepared template markup written by `prepare`.
    #[arg(long, default_value = "prepared.svg")]
    template: PathBuf,

    /// Body style display name to render.
    #[arg(long)]
    body: String,

    /// Variants per chunk; one surface is acquired per chunk.
    #[arg(long, default_value_t = 50)]
    chunk_size: usize,

    /// Output directory for PNG artifacts.
    #[arg(long, default_value = "output")]
    out_dir: PathBuf,

    /// Override worker thread count.
    #[arg(long)]
    threads: Option<usize>,

    /// Surface backend to use.
    #[arg(long, value_enum, default_value_t = BackendChoice::Cpu)]
    backend: BackendChoice,
}

#[derive(Parser, Debug)]
struct PrepareArgs {
    /// Option catalog JSON.
    #[arg(long, default_value = "options.json")]
    options: PathBuf,

    /// Raw template markup.
    #[arg(long = "in", default_value = "input.svg")]
    in_path: PathBuf,

    /// Output path for the prepared markup.
    #[arg(long, default_value = "prepared.svg")]
    out: PathBuf,

    /// Surface backend to use.
    #[arg(long, value_enum, default_value_t = BackendChoice::Cpu)]
    backend: BackendChoice,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Cpu,
}

impl BackendChoice {
    fn kind(self) -> paintshop::BackendKind {
        match self {
            BackendChoice::Cpu => paintshop::BackendKind::Cpu,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Enumerate(args) => cmd_enumerate(args),
        Command::Render(args) => cmd_render(args),
        Command::Prepare(args) => cmd_prepare(args),
    }
}

fn cmd_enumerate(args: EnumerateArgs) -> anyhow::Result<()> {
    let catalog = paintshop::OptionCatalog::from_json_file(&args.options)?;
    let variants = paintshop::enumerate_variants(&catalog);
    paintshop::write_variants(&args.out, &variants)?;
    eprintln!("wrote {} variants to {}", variants.len(), args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let variants = paintshop::read_variants(&args.variants)?;
    let template = read_markup(&args.template)?;

    let filtered = paintshop::filter_by_body(&variants, &args.body);
    if filtered.is_empty() {
        anyhow::bail!(
            "no variants match body '{}' in {}",
            args.body,
            args.variants.display()
        );
    }

    let pool = paintshop::SurfacePool::new(args.backend.kind());
    let opts = paintshop::RenderOpts {
        chunk_size: args.chunk_size,
        out_dir: args.out_dir,
        threads: args.threads,
    };
    let stats = paintshop::render_batch(&filtered, &template, &pool, &opts)?;

    eprintln!(
        "done: {} variants ({} rendered, {} skipped)",
        stats.total, stats.rendered, stats.skipped
    );
    Ok(())
}

fn cmd_prepare(args: PrepareArgs) -> anyhow::Result<()> {
    let catalog = paintshop::OptionCatalog::from_json_file(&args.options)?;
    let raw = read_markup(&args.in_path)?;

    let mut surface = paintshop::create_surface(args.backend.kind())?;
    let prepared = paintshop::prepare_template(&raw, &catalog, surface.as_mut())?;

    std::fs::write(&args.out, prepared)
        .with_context(|| format!("write prepared template '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn read_markup(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read template '{}'", path.display()))
}
