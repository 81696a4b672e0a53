use crate::config::CrawlConfig;
use crate::fetcher::PageFetcher;
use crate::models::{CrawlTarget, Listing};
use crate::page_parser::PageParser;
use scraper::Html;
use std::time::Duration;
use tracing::{info, warn};

/// Why pagination for a pair ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A fetch failed; listings from earlier pages are kept.
    TransportFailure,
    EmptyPage,
    NoNextPage,
    PageCeiling,
}

#[derive(Debug)]
pub struct PairOutcome {
    pub listings: Vec<Listing>,
    pub pages_fetched: usize,
    pub stop_reason: StopReason,
}

enum PageState {
    Requesting(usize),
    Parsed {
        page: usize,
        records: Vec<Listing>,
        has_next: bool,
    },
    Continue(usize),
    Stop(StopReason),
}

pub(crate) fn pause(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}

/// Walks the result pages of one (city, type) pair until a stop condition
/// is hit. Never fetches more than `config.max_pages` pages.
pub fn crawl_pair<F: PageFetcher>(
    fetcher: &F,
    parser: &PageParser,
    config: &CrawlConfig,
    target: &CrawlTarget,
) -> PairOutcome {
    let city = target.city.name.as_str();
    let property_type = target.kind.name.as_str();

    let mut listings = Vec::new();
    let mut pages_fetched = 0;
    let mut state = PageState::Requesting(1);

    let stop_reason = loop {
        state = match state {
            PageState::Requesting(page) => {
                let url = config.page_url(target, page);
                info!(city, property_type, page, "fetching result page");

                match fetcher.fetch(&url) {
                    Ok(body) => {
                        pages_fetched += 1;
                        let document = Html::parse_document(&body);
                        let records: Vec<Listing> =
                            parser.parse_listings(&document, target).collect();
                        let has_next = parser.has_next_page(&document);
                        PageState::Parsed {
                            page,
                            records,
                            has_next,
                        }
                    }
                    Err(e) => {
                        warn!(city, property_type, page, error = %e, "request failed, ending pagination for this pair");
                        PageState::Stop(StopReason::TransportFailure)
                    }
                }
            }
            PageState::Parsed {
                page,
                records,
                has_next,
            } => {
                if records.is_empty() {
                    if page == 1 {
                        warn!(city, property_type, page, "no listings on first page; none for sale or the markup changed");
                    } else {
                        info!(city, property_type, page, "empty page, stopping");
                    }
                    PageState::Stop(StopReason::EmptyPage)
                } else {
                    let count = records.len();
                    listings.extend(records);
                    info!(city, property_type, page, records = count, total = listings.len(), "parsed result page");

                    if !has_next {
                        PageState::Stop(StopReason::NoNextPage)
                    } else if page >= config.max_pages {
                        info!(city, property_type, page, "page ceiling reached");
                        PageState::Stop(StopReason::PageCeiling)
                    } else {
                        PageState::Continue(page + 1)
                    }
                }
            }
            PageState::Continue(page) => {
                pause(config.delay());
                PageState::Requesting(page)
            }
            PageState::Stop(reason) => break reason,
        };
    };

    PairOutcome {
        listings,
        pages_fetched,
        stop_reason,
    }
}
