use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::browser::{Browser, BrowserError};
use crate::extract::{extract, Extracted, Lookup};
use crate::record::{is_present, RawEventRecord, Source, SENTINEL};
use crate::utils::{resolve_link, with_query_param};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// What a field becomes when none of its lookups found anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Sentinel,
    Fixed(&'static str),
    /// The URL of the page the card was found on
    PageUrl,
}

/// Lookup chain and fallback for one field of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub lookups: &'static [Lookup],
    pub fallback: Fallback,
}

impl FieldRule {
    pub const fn extract(lookups: &'static [Lookup]) -> Self {
        FieldRule { lookups, fallback: Fallback::Sentinel }
    }

    pub const fn extract_or(lookups: &'static [Lookup], fallback: Fallback) -> Self {
        FieldRule { lookups, fallback }
    }

    /// A field that is never read from the page
    pub const fn fixed(value: &'static str) -> Self {
        FieldRule { lookups: &[], fallback: Fallback::Fixed(value) }
    }

    fn apply(&self, card: ElementRef<'_>, page_url: &str) -> String {
        match extract(card, self.lookups) {
            Extracted::Value(value) => value,
            Extracted::Sentinel => match self.fallback {
                Fallback::Sentinel => SENTINEL.to_string(),
                Fallback::Fixed(value) => value.to_string(),
                Fallback::PageUrl => page_url.to_string(),
            },
        }
    }
}

/// How a source moves from one listing page to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// One page only
    Single,
    /// Page N lives at `start_url?param=N`
    Query { param: &'static str },
    /// Follow a "next" anchor; build `?param=N` when it is missing and a
    /// fallback parameter is known, otherwise stop
    NextLink {
        labels: &'static [&'static str],
        fallback_query: Option<&'static str>,
    },
}

/// Collection logic for one listing site
#[derive(Debug, Clone)]
pub struct SiteAdapter {
    pub source: Source,
    pub start_url: String,
    /// Card container selectors, most specific first
    pub containers: &'static [&'static str],
    pub title: FieldRule,
    pub date: FieldRule,
    pub location: FieldRule,
    pub link: FieldRule,
    pub pagination: Pagination,
    pub default_max_pages: u32,
}

/// An adapter that stopped early. Records read before the failure are kept.
#[derive(Debug, thiserror::Error)]
#[error("{site} stopped after {} records: {error}", .partial.len())]
pub struct AdapterFailure {
    pub site: Source,
    pub partial: Vec<RawEventRecord>,
    #[source]
    pub error: BrowserError,
}

/// Records read from one page and where the page says to go next
#[derive(Debug, Default)]
pub struct PageScan {
    pub records: Vec<RawEventRecord>,
    pub next_href: Option<String>,
}

// ============================================================================
// COLLECTION
// ============================================================================

impl SiteAdapter {
    /// Visits up to `max_pages` pages, waiting `pause` after each navigation
    pub async fn collect(
        &self,
        browser: &dyn Browser,
        max_pages: u32,
        pause: Duration,
    ) -> Result<Vec<RawEventRecord>, AdapterFailure> {
        let mut records = Vec::new();
        let mut next_url = Some(self.first_page_url());
        let mut page = 1;

        while let Some(url) = next_url.take() {
            if page > max_pages {
                break;
            }
            info!(source = %self.source, page, url = %url, "scraping page");

            let html = match browser.navigate(&url).await {
                Ok(html) => html,
                Err(error) => {
                    return Err(AdapterFailure { site: self.source, partial: records, error });
                }
            };
            tokio::time::sleep(pause).await;

            let scan = self.scan_page(&html, &url);
            debug!(source = %self.source, page, cards = scan.records.len(), "page scanned");
            records.extend(scan.records);

            page += 1;
            next_url = self.next_page_url(&url, page, scan.next_href);
        }

        info!(source = %self.source, count = records.len(), "source done");
        Ok(records)
    }

    fn first_page_url(&self) -> String {
        match self.pagination {
            Pagination::Query { param } => with_query_param(&self.start_url, param, 1),
            _ => self.start_url.clone(),
        }
    }

    fn next_page_url(&self, current: &str, page: u32, next_href: Option<String>) -> Option<String> {
        match self.pagination {
            Pagination::Single => None,
            Pagination::Query { param } => Some(with_query_param(&self.start_url, param, page)),
            Pagination::NextLink { fallback_query, .. } => match next_href {
                Some(href) => Some(resolve_link(current, &href)),
                None => fallback_query.map(|param| with_query_param(&self.start_url, param, page)),
            },
        }
    }

    /// Reads every card on one rendered page
    pub fn scan_page(&self, html: &str, page_url: &str) -> PageScan {
        let document = Html::parse_document(html);

        let cards = find_cards(&document, self.containers);
        if cards.is_empty() {
            warn!(source = %self.source, url = %page_url, "no cards found, layout may have changed");
        }

        let scraped_at = Utc::now();
        let records = cards
            .into_iter()
            .map(|card| {
                let mut link = self.link.apply(card, page_url);
                if is_present(&link) {
                    link = resolve_link(page_url, &link);
                }
                RawEventRecord {
                    title: self.title.apply(card, page_url),
                    date_text: self.date.apply(card, page_url),
                    location_text: self.location.apply(card, page_url),
                    link,
                    source: self.source,
                    scraped_at,
                }
            })
            .collect();

        PageScan {
            records,
            next_href: self.find_next_href(&document),
        }
    }

    fn find_next_href(&self, document: &Html) -> Option<String> {
        let Pagination::NextLink { labels, .. } = self.pagination else {
            return None;
        };

        let mut lookups: Vec<Lookup> = labels.iter().map(|&label| Lookup::LinkText(label)).collect();
        lookups.push(Lookup::Attr("a[rel='next']", "href"));

        match extract(document.root_element(), &lookups) {
            Extracted::Value(href) => Some(href),
            Extracted::Sentinel => None,
        }
    }
}

/// First container selector with at least one match wins
fn find_cards<'a>(document: &'a Html, containers: &[&str]) -> Vec<ElementRef<'a>> {
    for container in containers {
        let Ok(selector) = Selector::parse(container) else {
            continue;
        };
        let cards: Vec<ElementRef<'a>> = document.select(&selector).collect();
        if !cards.is_empty() {
            return cards;
        }
    }
    Vec::new()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::StaticBrowser;

    const TITLE: FieldRule = FieldRule::extract(&[Lookup::Text("h3"), Lookup::Text("h2")]);
    const DATE: FieldRule = FieldRule::extract(&[Lookup::Text(".date")]);
    const LINK: FieldRule = FieldRule::extract_or(&[Lookup::Attr("a[href]", "href")], Fallback::PageUrl);

    fn adapter(pagination: Pagination) -> SiteAdapter {
        SiteAdapter {
            source: Source::Devpost,
            start_url: "https://example.com/events".to_string(),
            containers: &[".tile", ".card"],
            title: TITLE,
            date: DATE,
            location: FieldRule::fixed("Online"),
            link: LINK,
            pagination,
            default_max_pages: 3,
        }
    }

    fn page(titles: &[&str], extra: &str) -> String {
        let cards: String = titles
            .iter()
            .map(|t| format!("<div class=\"card\"><h2>{}</h2><a href=\"/e/{}\">go</a></div>", t, t))
            .collect();
        format!("<html><body>{}{}</body></html>", cards, extra)
    }

    #[test]
    fn test_scan_page_uses_container_fallback_and_field_rules() {
        let adapter = adapter(Pagination::Single);
        let html = "<div class=\"card\"><h2>Alpha</h2><span class=\"date\">Jan 5, 2099</span><a href=\"/e/alpha\">x</a></div>\
                    <div class=\"card\"><p>no title</p></div>";
        let scan = adapter.scan_page(html, "https://example.com/events");

        assert_eq!(scan.records.len(), 2);
        let first = &scan.records[0];
        assert_eq!(first.title, "Alpha");
        assert_eq!(first.date_text, "Jan 5, 2099");
        assert_eq!(first.location_text, "Online");
        assert_eq!(first.link, "https://example.com/e/alpha");

        let second = &scan.records[1];
        assert_eq!(second.title, SENTINEL);
        assert_eq!(second.date_text, SENTINEL);
        assert_eq!(second.link, "https://example.com/events");
        assert!(scan.next_href.is_none());

        let no_link_fallback = SiteAdapter {
            link: FieldRule::extract(&[Lookup::Attr("a[href]", "href")]),
            ..adapter
        };
        let scan = no_link_fallback.scan_page(html, "https://example.com/events");
        assert_eq!(scan.records[0].link, "https://example.com/e/alpha");
        assert_eq!(scan.records[1].link, SENTINEL);
    }

    #[test]
    fn test_unrecognized_layout_is_an_empty_page() {
        let adapter = adapter(Pagination::Single);
        let scan = adapter.scan_page("<div class=\"other\">x</div>", "https://example.com/events");
        assert!(scan.records.is_empty());
    }

    #[tokio::test]
    async fn test_query_pagination_respects_page_cap() {
        let adapter = adapter(Pagination::Query { param: "page" });
        let browser = StaticBrowser::new()
            .with_page("https://example.com/events?page=1", page(&["a", "b"], ""))
            .with_page("https://example.com/events?page=2", page(&["c"], ""))
            .with_page("https://example.com/events?page=3", page(&["d"], ""));

        let records = adapter.collect(&browser, 2, Duration::ZERO).await.unwrap();
        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_next_link_pagination_stops_when_control_missing() {
        let adapter = adapter(Pagination::NextLink { labels: &["Next »"], fallback_query: None });
        let browser = StaticBrowser::new()
            .with_page("https://example.com/events", page(&["a"], "<a href=\"/events/p2\">Next »</a>"))
            .with_page("https://example.com/events/p2", page(&["b"], ""));

        let records = adapter.collect(&browser, 10, Duration::ZERO).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].title, "b");
    }

    #[tokio::test]
    async fn test_next_link_falls_back_to_query_param() {
        let adapter = adapter(Pagination::NextLink { labels: &["Next »"], fallback_query: Some("page") });
        let browser = StaticBrowser::new()
            .with_page("https://example.com/events", page(&["a"], ""))
            .with_page("https://example.com/events?page=2", page(&["b"], "<a rel=\"next\" href=\"/events?page=3\">›</a>"))
            .with_page("https://example.com/events?page=3", page(&["c"], ""));

        let records = adapter.collect(&browser, 3, Duration::ZERO).await.unwrap();
        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_navigation_failure_keeps_collected_records() {
        let adapter = adapter(Pagination::Query { param: "page" });
        let browser = StaticBrowser::new()
            .with_page("https://example.com/events?page=1", page(&["a", "b"], ""))
            .with_failure("https://example.com/events?page=2");

        let failure = adapter.collect(&browser, 3, Duration::ZERO).await.unwrap_err();
        assert_eq!(failure.site, Source::Devpost);
        assert_eq!(failure.partial.len(), 2);
        assert!(matches!(failure.error, BrowserError::Session(_)));
    }
}
