use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use torrent_magnet::{convert_files, decode, utils::BtResult, Magnet};

#[derive(Debug, Parser)]
#[command(version, about = "Convert .torrent files into magnet links", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert torrent files into magnet links.
    Convert {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Number of files converted at the same time.
        #[arg(short, long, default_value_t = 4)]
        jobs: usize,

        /// Print the whole report as json.
        #[arg(long, conflicts_with = "links_only")]
        json: bool,

        /// Only print the magnet links, one per line.
        #[arg(long)]
        links_only: bool,
    },

    /// Decode a bencoded value and print it as json.
    Decode { value: String },

    /// Print the info hash and name of a magnet link.
    Parse { magnet: String },
}

async fn run_convert(files: Vec<PathBuf>, jobs: usize, json: bool, links_only: bool) -> BtResult<bool> {
    let report = convert_files(files, jobs).await;

    if json {
        let out = serde_json::to_string_pretty(&report.to_json()).context("failed to render json")?;
        println!("{out}");
    } else if links_only {
        if !report.successes.is_empty() {
            println!("{}", report.links());
        }
    } else {
        for (idx, result) in report.successes.iter().enumerate() {
            if idx > 0 {
                println!();
            }
            result.print_info();
        }
    }

    if !json {
        for failure in report.failures.iter() {
            eprintln!("Failed to parse {}: {}", failure.file_name, failure.reason);
        }
    }

    Ok(report.failures.is_empty())
}

#[tokio::main]
async fn main() -> BtResult<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            files,
            jobs,
            json,
            links_only,
        } => {
            if !run_convert(files, jobs, json, links_only).await? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Decode { value } => {
            let decoded_value = decode(value.as_bytes()).context("failed to decode value")?;
            println!("{}", decoded_value.to_json());
        }
        Commands::Parse { magnet } => {
            let magnet = Magnet::parse(&magnet).context("failed to parse magnet link")?;
            magnet.print_info();
        }
    }

    Ok(ExitCode::SUCCESS)
}
