//! Squash CLI - arithmetic-coding file compressor
//!
//! Compresses single files with a static-model 32-bit arithmetic coder.

mod commands;
mod utils;

use clap::{ArgAction, Parser, Subcommand};
use commands::{Precision, cmd_bench, cmd_compress, cmd_decompress, cmd_info};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "squash")]
#[command(author, version, about = "Static-model arithmetic coding file compressor")]
#[command(long_about = "
Squash compresses a file with a static-model arithmetic coder. The
compressed file starts with the byte frequency table (256 big-endian u32
counts) followed by the coded bit stream.

Examples:
  squash compress lorem.txt             # writes lorem.txt.AE
  squash decompress lorem.txt.AE        # writes decompressed_lorem.txt
  squash bench lorem.txt                # time, ratio and digest check
  squash info lorem.txt.AE --json
")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Width of the coder state; files only decode at the width they were written with
    #[arg(short, long, value_enum, default_value = "32", global = true)]
    precision: Precision,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file
    #[command(alias = "c")]
    Compress {
        /// File to compress
        input: PathBuf,

        /// Output file (default: <input>.AE)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing output file
        #[arg(short, long)]
        force: bool,

        /// Show a progress spinner
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// Decompress a file
    #[command(alias = "d")]
    Decompress {
        /// Compressed file
        input: PathBuf,

        /// Output file (default: decompressed_<input without .AE>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing output file
        #[arg(short, long)]
        force: bool,

        /// Show a progress spinner
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// Compress, decompress and verify a file, reporting timings
    #[command(alias = "b")]
    Bench {
        /// File to benchmark
        input: PathBuf,

        /// Overwrite existing output files
        #[arg(short, long)]
        force: bool,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Show the frequency model stored in a compressed file
    #[command(alias = "i")]
    Info {
        /// Compressed file to inspect
        input: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let precision = cli.precision;
    let result = match cli.command {
        Commands::Compress {
            input,
            output,
            force,
            progress,
        } => cmd_compress(&input, output.as_deref(), precision, force, progress),
        Commands::Decompress {
            input,
            output,
            force,
            progress,
        } => cmd_decompress(&input, output.as_deref(), precision, force, progress),
        Commands::Bench { input, force, json } => cmd_bench(&input, precision, force, json),
        Commands::Info { input, json } => cmd_info(&input, precision, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
