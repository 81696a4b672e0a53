use anyhow::Result;
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use suumofinder::config::CrawlConfig;
use suumofinder::crawler::run_crawl;
use suumofinder::fetcher::HttpFetcher;
use suumofinder::logging;
use suumofinder::output::render_summary;
use suumofinder::progress::CrawlProgress;
use tracing::info;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Suumofinder - SUUMO listings crawler for 高砂市, 加古川市 and 明石市")]
struct Args {
    /// Path to output CSV file (defaults to data/suumo_listings.csv)
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// JSON file overriding cities, property types and crawl settings
    #[clap(long)]
    config: Option<PathBuf>,

    /// Maximum number of pages to fetch per city and property type
    #[clap(short, long)]
    max_pages: Option<usize>,

    /// Seconds to wait between two requests
    #[clap(long)]
    delay_secs: Option<f64>,

    /// Request timeout in seconds
    #[clap(long)]
    timeout_secs: Option<u64>,

    /// Only crawl this city (repeatable, by name)
    #[clap(long = "city")]
    cities: Vec<String>,

    /// Only crawl this property type (repeatable, by name)
    #[clap(long = "property-type")]
    property_types: Vec<String>,

    /// Show a progress bar
    #[clap(short, long)]
    progress: bool,

    /// Enable debug output
    #[clap(short, long)]
    debug: bool,
}

fn build_config(args: &Args) -> Result<CrawlConfig> {
    let mut config = match &args.config {
        Some(path) => CrawlConfig::load(path)?,
        None => CrawlConfig::default(),
    };

    if let Some(output) = &args.output {
        config.output = output.clone();
    }
    if let Some(max_pages) = args.max_pages {
        config.max_pages = max_pages;
    }
    if let Some(delay) = args.delay_secs {
        config.set_delay_secs(delay)?;
    }
    if let Some(timeout) = args.timeout_secs {
        config.timeout_secs = timeout;
    }
    config.retain_cities(&args.cities)?;
    config.retain_property_types(&args.property_types)?;
    config.validate()?;

    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.debug);

    let config = build_config(&args)?;
    info!(
        date = %Local::now().date_naive(),
        output = %config.output.display(),
        pairs = config.targets().len(),
        "starting SUUMO crawl"
    );

    let fetcher = HttpFetcher::new(config.timeout())?;
    let mut progress = args
        .progress
        .then(|| CrawlProgress::new(config.targets().len()));

    let outcome = run_crawl(&fetcher, &config, progress.as_mut())?;

    if !outcome.written {
        println!("No listings were gathered; {} left unchanged.", config.output.display());
        return Ok(());
    }

    println!("\n=== Summary ===");
    if outcome.removed_by_filter > 0 {
        println!(
            "Location filter removed {} listings from other cities",
            outcome.removed_by_filter
        );
    }
    println!("Total listings saved: {}", outcome.listings.len());
    println!("Saved to: {}\n", config.output.display());
    print!("{}", render_summary(&outcome.summary));

    Ok(())
}
