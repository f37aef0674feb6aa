pub mod adapter;
pub mod aggregate;
pub mod browser;
pub mod classify;
pub mod dedupe;
pub mod extract;
pub mod logging;
pub mod output;
pub mod record;
pub mod sites;
pub mod utils;

use chrono::{Datelike, Local, NaiveDate};
use tracing::info;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================
pub use adapter::{AdapterFailure, Fallback, FieldRule, Pagination, SiteAdapter};
pub use aggregate::{run_all, CollectOptions, Collection, SourceReport};
pub use browser::{Browser, BrowserError, HttpBrowser, StaticBrowser};
pub use classify::{classify, classify_location, parse_event_date, upcoming};
pub use dedupe::dedupe;
pub use extract::{extract, Extracted, Lookup};
pub use output::{load, print_summary, print_upcoming, save, save_raw, StoreError};
pub use record::{CanonicalEventRecord, Mode, RawEventRecord, Source, SENTINEL};

// ============================================================================
// PIPELINE
// ============================================================================

/// Settings for one full run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Sources to visit, in this order
    pub sources: Vec<Source>,
    pub collect: CollectOptions,
    /// Events before this day are dropped; `days_left` counts from it
    pub reference_date: NaiveDate,
    /// MLH season to list; the reference year when unset
    pub mlh_season: Option<i32>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            sources: Source::ALL.to_vec(),
            collect: CollectOptions::default(),
            reference_date: Local::now().date_naive(),
            mlh_season: None,
        }
    }
}

impl PipelineOptions {
    /// Adapters for the selected sources, duplicates removed
    pub fn adapters(&self) -> Vec<SiteAdapter> {
        let season = self.mlh_season.unwrap_or_else(|| self.reference_date.year());
        let mut seen = Vec::new();
        self.sources
            .iter()
            .filter(|source| {
                if seen.contains(*source) {
                    false
                } else {
                    seen.push(**source);
                    true
                }
            })
            .map(|&source| sites::adapter_for(source, season))
            .collect()
    }
}

/// Result of one run: the deduplicated raw set and the canonical set derived from it
#[derive(Debug)]
pub struct PipelineRun {
    pub raw: Vec<RawEventRecord>,
    pub canonical: Vec<CanonicalEventRecord>,
    pub reports: Vec<SourceReport>,
}

/// Collects from every selected source, dedupes and classifies.
/// Never fails: source failures are recorded in `reports`.
pub async fn run_pipeline(browser: &dyn Browser, options: &PipelineOptions) -> PipelineRun {
    let adapters = options.adapters();
    let collection = run_all(&adapters, browser, &options.collect).await;
    info!(collected = collection.records.len(), "records before dedupe");

    let raw = dedupe(collection.records);
    info!(unique = raw.len(), "records after dedupe");

    let canonical = classify(raw.clone(), options.reference_date);
    info!(upcoming = canonical.len(), reference_date = %options.reference_date, "records after date filter");

    PipelineRun {
        raw,
        canonical,
        reports: collection.reports,
    }
}
