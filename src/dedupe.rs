use std::collections::HashSet;
use tracing::debug;

use crate::record::RawEventRecord;

/// Drops exact duplicates, then later records repeating an earlier
/// (title, link) pair. Survivors keep their original order.
pub fn dedupe(records: Vec<RawEventRecord>) -> Vec<RawEventRecord> {
    let before = records.len();

    let mut seen_exact = HashSet::new();
    let unique: Vec<RawEventRecord> = records
        .into_iter()
        .filter(|record| seen_exact.insert(record.clone()))
        .collect();
    let exact_dropped = before - unique.len();

    let mut seen_identity: HashSet<(String, String)> = HashSet::new();
    let deduped: Vec<RawEventRecord> = unique
        .into_iter()
        .filter(|record| seen_identity.insert((record.title.clone(), record.link.clone())))
        .collect();

    debug!(
        before,
        exact_dropped,
        identity_dropped = before - exact_dropped - deduped.len(),
        "deduplicated records"
    );
    deduped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Source;
    use chrono::{TimeZone, Utc};

    fn record(title: &str, link: &str, source: Source, second: u32) -> RawEventRecord {
        RawEventRecord {
            title: title.to_string(),
            date_text: "Jan 5, 2099".to_string(),
            location_text: "Online".to_string(),
            link: link.to_string(),
            source,
            scraped_at: Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, second).unwrap(),
        }
    }

    #[test]
    fn test_exact_duplicates_collapse() {
        let a = record("HackX", "https://a/1", Source::Devpost, 0);
        let out = dedupe(vec![a.clone(), a.clone(), a]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_first_title_link_pair_wins() {
        let first = record("HackX", "https://a/1", Source::Devpost, 0);
        let later = record("HackX", "https://a/1", Source::Mlh, 5);
        let other = record("HackY", "https://a/1", Source::Mlh, 5);

        let out = dedupe(vec![first.clone(), later, other.clone()]);
        assert_eq!(out, vec![first, other]);
    }

    #[test]
    fn test_idempotent_and_unique() {
        let input = vec![
            record("A", "1", Source::Devpost, 0),
            record("B", "2", Source::Devpost, 0),
            record("A", "1", Source::Eventbrite, 1),
            record("B", "3", Source::Eventbrite, 1),
            record("B", "2", Source::Devpost, 0),
        ];

        let once = dedupe(input);
        let twice = dedupe(once.clone());
        assert_eq!(once, twice);

        let keys: HashSet<(&str, &str)> = once.iter().map(|r| r.identity()).collect();
        assert_eq!(keys.len(), once.len());
        assert_eq!(once.len(), 3);
    }
}
