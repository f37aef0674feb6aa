use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use hackathon_finder::aggregate::DEFAULT_PAUSE;
use hackathon_finder::browser::DEFAULT_NAVIGATION_TIMEOUT;
use hackathon_finder::logging::{setup_logging, LogFormat};
use hackathon_finder::output::{CSV_OUTPUT_FILE, RAW_CSV_OUTPUT_FILE};
use hackathon_finder::{
    load, print_summary, print_upcoming, run_pipeline, save, save_raw, CollectOptions, HttpBrowser,
    PipelineOptions, Source,
};

#[derive(Parser)]
#[command(name = "hackathon_finder", version, about = "Collects upcoming hackathons into one CSV")]
struct Cli {
    /// Log line format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape every source and write the canonical CSV
    Run(RunArgs),
    /// Print a summary of a previously written CSV
    Show(ShowArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Canonical output file
    #[arg(short, long, default_value = CSV_OUTPUT_FILE)]
    output: PathBuf,

    /// Also write the deduplicated, unclassified records here
    #[arg(long, num_args = 0..=1, default_missing_value = RAW_CSV_OUTPUT_FILE)]
    raw_output: Option<PathBuf>,

    /// Only visit these sources (repeatable): devpost, mlh, hackathon.com, eventbrite, angelhack
    #[arg(short, long = "source")]
    sources: Vec<Source>,

    /// Page cap applied to every source instead of its own default
    #[arg(long)]
    max_pages: Option<u32>,

    /// Wait after each page load, in milliseconds
    #[arg(long, default_value_t = DEFAULT_PAUSE.as_millis() as u64)]
    pause_ms: u64,

    /// Per-navigation timeout, in seconds
    #[arg(long, default_value_t = DEFAULT_NAVIGATION_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Treat this day as today (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// MLH season to list
    #[arg(long)]
    mlh_season: Option<i32>,

    /// Number of upcoming events to print
    #[arg(long, default_value_t = 5)]
    top: usize,
}

#[derive(Args)]
struct ShowArgs {
    /// Canonical file to read
    #[arg(short, long, default_value = CSV_OUTPUT_FILE)]
    input: PathBuf,

    /// Number of upcoming events to print
    #[arg(long, default_value_t = 5)]
    top: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    setup_logging(cli.log_format);

    match cli.command {
        Command::Run(args) => run(args).await,
        Command::Show(args) => {
            let records = load(&args.input)?;
            print_summary(&records);
            print_upcoming(&records, args.top);
            Ok(())
        }
    }
}

async fn run(args: RunArgs) -> Result<(), Box<dyn Error>> {
    let mut options = PipelineOptions {
        collect: CollectOptions {
            pause: Duration::from_millis(args.pause_ms),
            max_pages: args.max_pages,
        },
        mlh_season: args.mlh_season,
        ..PipelineOptions::default()
    };
    if !args.sources.is_empty() {
        options.sources = args.sources;
    }
    if let Some(today) = args.today {
        options.reference_date = today;
    }

    let browser = HttpBrowser::new(Duration::from_secs(args.timeout_secs))?;
    let run = run_pipeline(&browser, &options).await;

    for report in &run.reports {
        match &report.failure {
            Some(failure) => warn!(source = %report.source, collected = report.collected, %failure, "source incomplete"),
            None => info!(source = %report.source, collected = report.collected, "source complete"),
        }
    }

    if let Some(raw_path) = &args.raw_output {
        save_raw(&run.raw, raw_path)?;
    }
    save(&run.canonical, &args.output)?;

    print_summary(&run.canonical);
    print_upcoming(&run.canonical, args.top);
    Ok(())
}
