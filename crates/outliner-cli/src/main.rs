mod commands;
mod output;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "outliner",
    version,
    about = "Extract a title and heading outline from PDF documents"
)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Default)]
pub struct Settings {
    /// More log output on stderr (-v info, -vv debug). RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// JSON config file
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Clustering seed
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Number of clustering restarts
    #[arg(long, global = true)]
    pub restarts: Option<usize>,

    /// Embedding backend: hashing or onnx
    #[arg(long, value_name = "KIND", global = true)]
    pub embedder: Option<String>,

    /// Directory with model.onnx and tokenizer/tokenizer.json
    #[arg(long, value_name = "DIR", global = true)]
    pub model_dir: Option<PathBuf>,

    /// Level assignment: cluster or size-rank
    #[arg(long, global = true)]
    pub strategy: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Outline every PDF in a directory, one JSON file per document
    Batch {
        /// Directory containing *.pdf files
        input_dir: PathBuf,

        /// Directory for the JSON outlines (created if missing)
        #[arg(short, long = "output", value_name = "DIR", default_value = "output")]
        output_dir: PathBuf,

        /// Documents processed in parallel
        #[arg(short, long, default_value_t = 1)]
        jobs: usize,
    },
    /// Outline a single document (PDF or pre-extracted JSON spans)
    Outline {
        /// Path to PDF or JSON spans file
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        format: String,

        /// Write the outline to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Show how the title was scored
        #[arg(long)]
        explain: bool,
    },
    /// Dump the text spans extracted from a PDF as JSON
    Spans {
        /// Path to PDF file
        pdf_file: PathBuf,

        /// Write spans to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.settings.verbose);

    let result = match cli.command {
        Commands::Batch {
            input_dir,
            output_dir,
            jobs,
        } => commands::batch::run(&input_dir, &output_dir, jobs, &cli.settings),
        Commands::Outline {
            input_file,
            format,
            out,
            explain,
        } => commands::outline::run(&input_file, &format, out, explain, &cli.settings),
        Commands::Spans { pdf_file, out } => commands::spans::run(&pdf_file, out),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
