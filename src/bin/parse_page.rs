use anyhow::{Context, Result};
use clap::Parser;
use scraper::Html;
use std::path::PathBuf;
use suumofinder::config::DEFAULT_BASE_URL;
use suumofinder::filter::matches_city;
use suumofinder::logging;
use suumofinder::models::{City, CrawlTarget, PropertyKind};
use suumofinder::page_parser::PageParser;

/// Parses a result page saved from the browser, to check the markup
/// selectors without hitting the site.
#[derive(Parser, Debug)]
#[clap(author, version, about = "Parse a saved SUUMO result page")]
struct Args {
    /// Saved HTML file
    file: PathBuf,

    /// City the page was searched for
    #[clap(long, default_value = "高砂市")]
    city: String,

    /// Property type the page was searched for
    #[clap(long, default_value = "マンション")]
    property_type: String,

    /// Origin used to absolutize relative listing links
    #[clap(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Enable debug output
    #[clap(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.debug);

    let body = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let document = Html::parse_document(&body);

    let target = CrawlTarget {
        city: City::new(&args.city, ""),
        kind: PropertyKind::new(&args.property_type, ""),
    };
    let parser = PageParser::new(&args.base_url)?;

    let mut count = 0;
    let mut mismatched = 0;
    for listing in parser.parse_listings(&document, &target) {
        count += 1;
        let marker = if matches_city(&listing) {
            " "
        } else {
            mismatched += 1;
            "x"
        };
        println!(
            "{} {:>8}万円  {}  {}  {}",
            marker, listing.price, listing.layout, listing.address, listing.title
        );
        if !listing.url.is_empty() {
            println!("    {}", listing.url);
        }
    }

    println!("\nListings: {} ({} outside {})", count, mismatched, args.city);
    println!("Next page link: {}", if parser.has_next_page(&document) { "yes" } else { "no" });

    Ok(())
}
