use anyhow::Result;
use clap::Parser;
use freelex::config::{ASSET_BASE_URL, DUMP_URL};
use freelex::http::HttpFetcher;
use freelex::pipeline::{self, Outcome, PipelineConfig, SkipList};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "freelex")]
#[command(about = "Build NZSL app data files and images from the Freelex lexicon")]
struct Cli {
    /// Location of the iOS app root
    #[arg(short, long, value_name = "IOS_PATH")]
    ios: Option<PathBuf>,

    /// Location of the Android app root
    #[arg(short, long, value_name = "ANDROID_PATH")]
    android: Option<PathBuf>,

    /// Clean up downloaded and generated files after execution
    #[arg(short = 'c', long)]
    cleanup: bool,

    /// Print each command before running it (-vv for debug logs)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Comma-separated step numbers to skip (e.g. 1,6b)
    #[arg(long, value_name = "STEPS")]
    skip: Option<String>,

    /// Directory holding the dump, data files and image folders
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,

    /// Freelex XML dump endpoint
    #[arg(long, default_value = DUMP_URL)]
    dump_url: String,

    /// Freelex asset endpoint (asset names are appended)
    #[arg(long, default_value = ASSET_BASE_URL)]
    asset_url: String,

    /// Directory searched first for mogrify, convert and optipng
    #[arg(long, value_name = "DIR")]
    tool_dir: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> PipelineConfig {
        PipelineConfig {
            work_dir: self.work_dir,
            ios: self.ios,
            android: self.android,
            cleanup: self.cleanup,
            verbose: self.verbose > 0,
            skip: self.skip.as_deref().map(SkipList::parse).unwrap_or_default(),
            dump_url: self.dump_url,
            asset_base_url: self.asset_url,
            tool_dir: self.tool_dir,
        }
    }
}

fn run(config: PipelineConfig) -> Result<()> {
    let start = Instant::now();
    let fetcher = HttpFetcher::new()?;

    match pipeline::run(&config, &fetcher)? {
        Outcome::UpToDate => {
            println!("You're all up to date, no changes were made");
        }
        Outcome::Completed(stats) => {
            stats.print_summary();
            println!("Total time:          {:.2}s", start.elapsed().as_secs_f64());
            println!("Done");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    match run(cli.into_config()) {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
