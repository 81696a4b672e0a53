use crate::config::CrawlConfig;
use crate::fetcher::PageFetcher;
use crate::filter::apply_location_filter;
use crate::models::{CrawlTarget, Listing};
use crate::output::{summarize, write_listings_csv, PriceSummary};
use crate::page_parser::PageParser;
use crate::pagination::{crawl_pair, pause, StopReason};
use crate::progress::CrawlProgress;
use anyhow::{Context, Result};
use tracing::{info, warn};

#[derive(Debug)]
pub struct PairReport {
    pub target: CrawlTarget,
    pub listings: usize,
    pub pages_fetched: usize,
    pub stop_reason: StopReason,
}

/// Everything one run gathered, before the location filter.
#[derive(Debug, Default)]
pub struct CrawlReport {
    pub listings: Vec<Listing>,
    pub pairs: Vec<PairReport>,
}

/// Crawls every configured (city, type) pair in order, one request at a
/// time. A pair that yields nothing or fails midway never aborts the run.
pub fn crawl_all<F: PageFetcher>(
    fetcher: &F,
    parser: &PageParser,
    config: &CrawlConfig,
    mut progress: Option<&mut CrawlProgress>,
) -> CrawlReport {
    let targets = config.targets();
    let mut report = CrawlReport::default();

    for (i, target) in targets.iter().enumerate() {
        if i > 0 {
            pause(config.delay());
        }
        if let Some(progress) = progress.as_deref() {
            progress.start_pair(target);
        }

        let outcome = crawl_pair(fetcher, parser, config, target);
        let found = outcome.listings.len();
        info!(
            city = %target.city.name,
            property_type = %target.kind.name,
            records = found,
            pages = outcome.pages_fetched,
            stop = ?outcome.stop_reason,
            "pair finished"
        );

        if let Some(progress) = progress.as_deref_mut() {
            progress.finish_pair(found);
        }

        report.listings.extend(outcome.listings);
        report.pairs.push(PairReport {
            target: target.clone(),
            listings: found,
            pages_fetched: outcome.pages_fetched,
            stop_reason: outcome.stop_reason,
        });
    }

    if let Some(progress) = progress.as_deref() {
        progress.finish();
    }
    info!(total = report.listings.len(), pairs = report.pairs.len(), "crawl finished");

    report
}

/// Result of a full run: what was written and how it broke down.
#[derive(Debug)]
pub struct RunOutcome {
    pub crawled: usize,
    pub removed_by_filter: usize,
    pub listings: Vec<Listing>,
    pub summary: Vec<PriceSummary>,
    pub pairs: Vec<PairReport>,
    /// False when the crawl gathered nothing and the output file was left
    /// untouched. A run whose listings were all filtered out still writes a
    /// header-only table.
    pub written: bool,
}

/// Crawl, filter, persist. Only a failed write is an error; everything
/// upstream degrades to fewer listings.
pub fn run_crawl<F: PageFetcher>(
    fetcher: &F,
    config: &CrawlConfig,
    progress: Option<&mut CrawlProgress>,
) -> Result<RunOutcome> {
    let parser = PageParser::new(&config.base_url)?;
    let report = crawl_all(fetcher, &parser, config, progress);
    let crawled = report.listings.len();

    if crawled == 0 {
        warn!("no listings gathered, leaving output file untouched");
        return Ok(RunOutcome {
            crawled,
            removed_by_filter: 0,
            listings: Vec::new(),
            summary: Vec::new(),
            pairs: report.pairs,
            written: false,
        });
    }

    let filtered = apply_location_filter(report.listings);
    let listings = filtered.kept;
    if listings.is_empty() {
        warn!(crawled, "every listing was outside its city, writing an empty table");
    }

    write_listings_csv(&listings, &config.output)
        .with_context(|| format!("Failed to save listings to {}", config.output.display()))?;

    let summary = summarize(&listings);
    Ok(RunOutcome {
        crawled,
        removed_by_filter: filtered.removed,
        listings,
        summary,
        pairs: report.pairs,
        written: true,
    })
}
