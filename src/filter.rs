use crate::models::Listing;
use tracing::info;

#[derive(Debug)]
pub struct FilterReport {
    pub kept: Vec<Listing>,
    pub removed: usize,
}

fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether the listing's address mentions the city it was searched under.
pub fn matches_city(listing: &Listing) -> bool {
    normalize(&listing.address).contains(&normalize(&listing.city))
}

/// Drops listings the site injected from other municipalities (recommended
/// ads show up in every city's results). Run once over the merged result set.
pub fn apply_location_filter(listings: Vec<Listing>) -> FilterReport {
    let before = listings.len();
    let kept: Vec<Listing> = listings.into_iter().filter(matches_city).collect();
    let removed = before - kept.len();

    if removed > 0 {
        info!(removed, kept = kept.len(), "location filter dropped listings from other cities");
    }

    FilterReport { kept, removed }
}
