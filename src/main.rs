use anyhow::{Context, Result};
use clap::Parser;
use pgn_evals::chess::pipeline::{
    DEFAULT_PROGRESS_INTERVAL, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS,
};
use pgn_evals::chess::reader::{self, CompressionMode};
use pgn_evals::{PipelineConfig, run_pipeline};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

const LOG_ENV: &str = "PGN_EVALS_LOG";

/// Reads PGN games and prints every position evaluated with a centipawn score
/// as `FEN;score`, score in centipawns from White's point of view.
/// Mate scores and unevaluated games are dropped.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// PGN files or glob patterns, read back to back; stdin when omitted or `-`
    input: Vec<String>,

    /// Write positions to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of parsing workers
    #[arg(short = 'j', long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Capacity of the work and result queues
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,

    /// Games between two progress updates on stderr
    #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL)]
    progress_interval: u64,

    /// Do not print progress on stderr
    #[arg(long)]
    no_progress: bool,

    /// Input compression: `zstd`, or `auto` to decompress `*.zst` files only
    #[arg(long, default_value = "auto", value_parser = CompressionMode::parse)]
    compression: CompressionMode,

    /// Log skipped games and other details
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    env_logger::Builder::from_env(env_logger::Env::default().filter_or(LOG_ENV, default_level))
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .write_style(env_logger::WriteStyle::Never)
        .target(env_logger::Target::Stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    let config = PipelineConfig {
        num_workers: args.workers,
        queue_capacity: args.queue_capacity,
        progress_interval: args.progress_interval,
    };
    config.validate()?;

    let sources = reader::resolve_inputs(&args.input)?;
    let input = reader::buffered(reader::open_inputs(&sources, args.compression)?);

    let output: Box<dyn Write + Send> = match &args.output {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("Failed to create output file '{}'", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    };
    let output = BufWriter::with_capacity(1 << 16, output);
    let progress = (!args.no_progress).then(io::stderr);

    run_pipeline(input, output, progress, config)?;
    Ok(())
}

/// A closed stdout (`pgn-evals | head`) ends the run, it is not a failure.
fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|io_err| io_err.kind() == io::ErrorKind::BrokenPipe)
    })
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(err) = run(args) {
        if is_broken_pipe(&err) {
            return;
        }
        log::error!("{err:#}");
        std::process::exit(1);
    }
}
