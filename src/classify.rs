use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::record::{is_present, CanonicalEventRecord, Mode, RawEventRecord};

const MONTHS: [&str; 12] = [
    "january", "february", "march", "april", "may", "june",
    "july", "august", "september", "october", "november", "december",
];

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})").unwrap());
static NUMERIC_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").unwrap());
static MONTH_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z]{3,9})\.?\s+(\d{1,2})(?:st|nd|rd|th)?\b(?:,?\s+(\d{4})\b)?").unwrap()
});
static DAY_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?(?:\s*[-–]\s*\d{1,2}(?:st|nd|rd|th)?)?\s+([a-z]{3,9})\b\.?(?:,?\s+(\d{4})\b)?",
    )
    .unwrap()
});
static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{4})\b").unwrap());

// ============================================================================
// DATE PARSING
// ============================================================================

/// Month number for an English month name or abbreviation ("Sep", "Sept", "September")
fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    if name.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|month| month.starts_with(&name))
        .map(|idx| idx as u32 + 1)
}

/// Date for a matched month and day. An explicit year wins; otherwise the
/// first year later in the text is borrowed, else the reference year.
fn complete_date(
    text: &str,
    match_end: usize,
    year: Option<&str>,
    month: u32,
    day: u32,
    reference_date: NaiveDate,
) -> Option<NaiveDate> {
    if let Some(year) = year {
        return NaiveDate::from_ymd_opt(year.parse().ok()?, month, day);
    }

    let rest = &text[match_end..];
    let Some(year) = YEAR.captures(rest).and_then(|caps| caps[1].parse::<i32>().ok()) else {
        return NaiveDate::from_ymd_opt(reference_date.year(), month, day);
    };

    let start = NaiveDate::from_ymd_opt(year, month, day)?;
    // "Dec 28 - Jan 3, 2100" ends in the borrowed year and starts the year before
    match parse_event_date(rest, reference_date) {
        Some(range_end) if start > range_end => NaiveDate::from_ymd_opt(year - 1, month, day),
        _ => Some(start),
    }
}

/// Best-effort free text to calendar date.
///
/// The first date in the text wins, so a range like `"Oct 10 - Nov 12, 2099"`
/// or `"10 - 12 March 2099"` yields its start.
pub fn parse_event_date(text: &str, reference_date: NaiveDate) -> Option<NaiveDate> {
    if !is_present(text) {
        return None;
    }

    if let Some(caps) = ISO_DATE.captures(text) {
        return NaiveDate::from_ymd_opt(caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?);
    }

    if let Some(caps) = NUMERIC_DATE.captures(text) {
        return NaiveDate::from_ymd_opt(caps[3].parse().ok()?, caps[1].parse().ok()?, caps[2].parse().ok()?);
    }

    for caps in MONTH_FIRST.captures_iter(text) {
        let Some(month) = month_number(&caps[1]) else {
            continue;
        };
        let day: u32 = caps[2].parse().ok()?;
        let year = caps.get(3).map(|y| y.as_str());
        return complete_date(text, caps.get(0)?.end(), year, month, day, reference_date);
    }

    for caps in DAY_FIRST.captures_iter(text) {
        let Some(month) = month_number(&caps[2]) else {
            continue;
        };
        let day: u32 = caps[1].parse().ok()?;
        let year = caps.get(3).map(|y| y.as_str());
        return complete_date(text, caps.get(0)?.end(), year, month, day, reference_date);
    }

    None
}

// ============================================================================
// MODE CLASSIFICATION
// ============================================================================

/// Online when the location mentions "online" or "virtual" anywhere,
/// Offline for any other real location, Unknown when there is none.
pub fn classify_location(location: Option<&str>) -> Mode {
    match location {
        Some(loc) if is_present(loc) => {
            let loc = loc.to_lowercase();
            if loc.contains("online") || loc.contains("virtual") {
                Mode::Online
            } else {
                Mode::Offline
            }
        }
        _ => Mode::Unknown,
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

/// Turns deduplicated raw records into canonical ones. Records with an
/// unparseable date or a date before `reference_date` are dropped.
pub fn classify(records: Vec<RawEventRecord>, reference_date: NaiveDate) -> Vec<CanonicalEventRecord> {
    let total = records.len();
    let mut undated = 0usize;
    let mut past = 0usize;

    let canonical: Vec<CanonicalEventRecord> = records
        .into_iter()
        .filter_map(|record| {
            let Some(date) = parse_event_date(&record.date_text, reference_date) else {
                debug!(title = %record.title, date_text = %record.date_text, "dropping record without a usable date");
                undated += 1;
                return None;
            };
            if date < reference_date {
                past += 1;
                return None;
            }

            let mode = classify_location(Some(&record.location_text));
            Some(CanonicalEventRecord {
                year: date.year(),
                month_name: date.format("%B").to_string(),
                days_left: (date - reference_date).num_days(),
                date,
                mode,
                title: record.title,
                date_text: record.date_text,
                location_text: record.location_text,
                link: record.link,
                source: record.source,
                scraped_at: record.scraped_at,
            })
        })
        .collect();

    debug!(total, undated, past, kept = canonical.len(), "classified records");
    canonical
}

/// The `n` soonest events, stable among equal dates
pub fn upcoming(records: &[CanonicalEventRecord], n: usize) -> Vec<&CanonicalEventRecord> {
    let mut sorted: Vec<&CanonicalEventRecord> = records.iter().collect();
    sorted.sort_by_key(|record| record.date);
    sorted.truncate(n);
    sorted
}

// ============================================================================
// TESTS
// ============================================================================
