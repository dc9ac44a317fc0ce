use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tabjoin::{
    join::DuplicatePolicy,
    mapping::{load_mapping, Preset},
    pipeline::{self, JoinOutput},
    present::{copy_grid, FileSink, NoticeKind, Presenter, TextGrid},
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Tab-delimited, ready to paste into a spreadsheet
    Tsv,
    /// Column-aligned view
    Grid,
    /// Rows plus the join report
    Json,
}

/// Join two pasted tab-delimited tables by identifier and event time.
#[derive(Parser, Debug)]
#[command(name = "tabjoin", version)]
struct Args {
    /// Primary table file, or `-` for stdin
    #[arg(long)]
    primary: String,

    /// Secondary table file, or `-` for stdin
    #[arg(long)]
    secondary: String,

    /// Built-in column layout
    #[arg(long, value_enum, default_value_t = Preset::Basic)]
    preset: Preset,

    /// YAML or JSON field mapping; overrides --preset
    #[arg(long)]
    mapping: Option<PathBuf>,

    /// Handling of repeated identifiers in the secondary table
    #[arg(long, value_enum, default_value_t = DuplicatePolicy::LastWins)]
    duplicates: DuplicatePolicy,

    #[arg(long, value_enum, default_value_t = OutputFormat::Tsv)]
    format: OutputFormat,

    /// Also copy the tab-delimited result into this file
    #[arg(long)]
    copy_to: Option<PathBuf>,
}

#[derive(Serialize)]
struct JsonOut<'a> {
    ok: bool,
    data: &'a JoinOutput,
}

fn main() -> Result<()> {
    // stdout carries the table, logs go to stderr
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.primary == "-" && args.secondary == "-" {
        bail!("only one of --primary and --secondary can read stdin");
    }

    let mapping = match &args.mapping {
        Some(path) => load_mapping(path)?,
        None => args.preset.mapping(),
    };
    info!(preset = %args.preset, custom = args.mapping.is_some(), columns = mapping.width(), "field mapping ready");

    let primary_text = pipeline::read_input(&args.primary)?;
    let secondary_text = pipeline::read_input(&args.secondary)?;
    let out = pipeline::run(&primary_text, &secondary_text, &mapping, args.duplicates)?;

    let mut grid = TextGrid::new();
    grid.render(&out.table());

    match args.format {
        OutputFormat::Tsv => print!("{}", grid.serialize()),
        OutputFormat::Grid => print!("{}", grid.to_aligned_string()),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut {
                ok: true,
                data: &out
            })?
        ),
    }

    if let Some(path) = &args.copy_to {
        let notice = copy_grid(&grid, &mut FileSink::new(path));
        let label = match notice.kind {
            NoticeKind::Success => "copied",
            NoticeKind::Failure => "copy failed",
        };
        eprintln!("[{}] {}", label, notice.message);
    }

    Ok(())
}
