use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "vizlet", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render descriptors against an execution-result tree into a scene JSON.
    Render(RenderArgs),
    /// Validate a descriptor list without rendering.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input visualization descriptors JSON (array).
    #[arg(long)]
    descriptors: PathBuf,

    /// Input execution-results JSON tree.
    #[arg(long)]
    results: PathBuf,

    /// Output scene JSON path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input visualization descriptors JSON (array).
    #[arg(long)]
    descriptors: PathBuf,
}

fn main() -> anyhow::Result<()> {
    // Scene JSON goes to files/stdout; diagnostics stay on stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn read_descriptors(path: &Path) -> anyhow::Result<Vec<vizlet::VisualizationDescriptor>> {
    let f = File::open(path).with_context(|| format!("open descriptors '{}'", path.display()))?;
    let descriptors: Vec<vizlet::VisualizationDescriptor> =
        serde_json::from_reader(BufReader::new(f)).with_context(|| "parse descriptors JSON")?;
    Ok(descriptors)
}

fn read_results(path: &Path) -> anyhow::Result<serde_json::Value> {
    let f = File::open(path).with_context(|| format!("open results '{}'", path.display()))?;
    let tree = serde_json::from_reader(BufReader::new(f)).with_context(|| "parse results JSON")?;
    Ok(tree)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let descriptors = read_descriptors(&args.descriptors)?;
    for d in &descriptors {
        d.validate()?;
    }
    let tree = read_results(&args.results)?;

    let mut manager = vizlet::VisualizationManager::with_builtin_renderers();
    let mut target = vizlet::RenderTarget::new();
    manager.render_all(&descriptors, &tree, &mut target);

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let scene = serde_json::to_string_pretty(&target.to_value())?;
    std::fs::write(&args.out, scene)
        .with_context(|| format!("write scene '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let descriptors = read_descriptors(&args.descriptors)?;
    for d in &descriptors {
        d.validate()
            .with_context(|| format!("descriptor '{}'", d.id))?;
    }
    eprintln!("ok: {} descriptors", descriptors.len());
    Ok(())
}
