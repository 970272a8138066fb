use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use tinspect_core::{
    cast, inspect, render_exported, render_head, render_json, render_size, render_summary,
    Config, InspectOptions, PartitionSpec,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_delimiter(s: &str) -> Result<u8, String> {
    let c = match s {
        "\\t" | "tab" => '\t',
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => return Err(format!("delimiter must be a single character, got {s:?}")),
            }
        }
    };
    if c.is_ascii() { Ok(c as u8) } else { Err(format!("delimiter must be ASCII, got {c:?}")) }
}

#[derive(Parser, Debug)]
#[command(
    name = "tinspect",
    version,
    about = "Table inspection tool. Shows columns, types, row counts and sizes of .csv and .parquet files"
)]
struct Cli {
    /// file or directory path
    path: PathBuf,
    /// copy the dataset to this path, casting to the format of its extension (.csv or .parquet)
    #[arg(short = 'c', long, value_name = "PATH")]
    cast: Option<PathBuf>,
    /// make N partitions; requires --cast and wins over --partition-rows
    #[arg(short = 'p', long, value_name = "N", requires = "cast", allow_negative_numbers = true)]
    partitions: Option<i64>,
    /// partition with at most R rows each; requires --cast
    #[arg(short = 'r', long, value_name = "R", requires = "cast", allow_negative_numbers = true)]
    partition_rows: Option<i64>,
    /// print the top rows (head)
    #[arg(short = 't', long)]
    head: bool,
    /// count unique values and nulls per column
    #[arg(short = 'u', long)]
    unique: bool,
    /// field separator for text input; skips detection
    #[arg(short = 'd', long, value_parser = parse_delimiter)]
    delimiter: Option<u8>,
    /// print the report as JSON
    #[arg(long)]
    json: bool,
    /// config file (default: $TINSPECT_CONFIG or the user config dir)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// more log output on stderr (-v info, -vv debug)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tinspect_core={level},tinspect_cli={level}")));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let options = InspectOptions {
        cast: cli.cast,
        partition: PartitionSpec::from_options(cli.partitions, cli.partition_rows)?,
        show_head: cli.head,
        show_unique: cli.unique,
        delimiter: cli.delimiter,
    };
    tracing::debug!(?options, "parsed options");

    let inspection = inspect(&cli.path, &options, &config)?;
    if cli.json {
        let exported = cast(&inspection, &options, &config)?;
        println!("{}", render_json(&inspection.report(exported))?);
        return Ok(());
    }

    print!("{}", render_summary(&inspection.report(Vec::new())));
    if let Some(head) = &inspection.head {
        println!("{}", render_head(head)?);
    }
    let exported = cast(&inspection, &options, &config)?;
    for (i, file) in exported.iter().enumerate() {
        println!("{}", render_exported(file, exported.len(), i));
    }
    println!("{}", render_size(inspection.size_bytes));
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
