use crate::models::CrawlTarget;
use indicatif::{ProgressBar, ProgressStyle};

/// Terminal progress over (city, type) pairs. Purely cosmetic: the tracing
/// log carries the same information.
pub struct CrawlProgress {
    bar: ProgressBar,
    listings: usize,
}

impl CrawlProgress {
    pub fn new(total_pairs: usize) -> Self {
        let bar = ProgressBar::new(total_pairs as u64);
        let style = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} pairs  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        Self { bar, listings: 0 }
    }

    pub fn start_pair(&self, target: &CrawlTarget) {
        self.bar
            .set_message(format!("{} ({} listings so far)", target, self.listings));
    }

    pub fn finish_pair(&mut self, found: usize) {
        self.listings += found;
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar
            .finish_with_message(format!("done, {} listings gathered", self.listings));
    }
}
