use std::time::Duration;
use tracing::{info, warn};

use crate::adapter::SiteAdapter;
use crate::browser::Browser;
use crate::record::{RawEventRecord, Source};

/// Settle time after each navigation when none is configured
pub const DEFAULT_PAUSE: Duration = Duration::from_secs(3);

/// Knobs shared by every adapter in a run
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Fixed wait after each navigation so client-side rendering can finish
    pub pause: Duration,
    /// Overrides every adapter's own page cap when set
    pub max_pages: Option<u32>,
}

impl Default for CollectOptions {
    fn default() -> Self {
        CollectOptions {
            pause: DEFAULT_PAUSE,
            max_pages: None,
        }
    }
}

/// Outcome of one adapter within a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub source: Source,
    pub collected: usize,
    pub failure: Option<String>,
}

/// Everything one run collected, in adapter order
#[derive(Debug, Default)]
pub struct Collection {
    pub records: Vec<RawEventRecord>,
    pub reports: Vec<SourceReport>,
}

/// Runs every adapter one after another. A failing adapter is logged and
/// whatever it collected before failing is kept; the run always continues.
pub async fn run_all(
    adapters: &[SiteAdapter],
    browser: &dyn Browser,
    options: &CollectOptions,
) -> Collection {
    let mut collection = Collection::default();

    for adapter in adapters {
        let max_pages = options.max_pages.unwrap_or(adapter.default_max_pages);
        info!(source = %adapter.source, max_pages, "starting source");

        let (records, failure) = match adapter.collect(browser, max_pages, options.pause).await {
            Ok(records) => (records, None),
            Err(failure) => {
                warn!(
                    source = %failure.site,
                    kept = failure.partial.len(),
                    error = %failure.error,
                    "source failed, keeping partial results"
                );
                let message = failure.error.to_string();
                (failure.partial, Some(message))
            }
        };

        collection.reports.push(SourceReport {
            source: adapter.source,
            collected: records.len(),
            failure,
        });
        collection.records.extend(records);
    }

    info!(total = collection.records.len(), "collection finished");
    collection
}
