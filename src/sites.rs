//! Per-site selector tables.
//!
//! Each listing site is described by data only: where its cards live, how each
//! field is looked up (most specific selector first), what to use when a field
//! is missing, and how to reach the next page. Selectors follow the markup the
//! sites served when these tables were written; when a site changes layout the
//! fallbacks keep older markup working until the table is updated.

use crate::adapter::{Fallback, FieldRule, Pagination, SiteAdapter};
use crate::extract::Lookup;
use crate::record::Source;

const ANCHOR_HREF: Lookup = Lookup::Attr("a[href]", "href");

// ============================================================================
// DEVPOST
// ============================================================================

pub fn devpost() -> SiteAdapter {
    SiteAdapter {
        source: Source::Devpost,
        start_url: "https://devpost.com/hackathons".to_string(),
        containers: &[".hackathon-tile", ".challenge-card", ".project-card"],
        title: FieldRule::extract(&[Lookup::Text("h3"), Lookup::Text("h2")]),
        date: FieldRule::extract(&[Lookup::Text(".submission-period"), Lookup::Text(".dates")]),
        location: FieldRule::extract(&[
            Lookup::Text(".challenge-location"),
            Lookup::Text(".location"),
            Lookup::Text(".info-with-icon .info span"),
        ]),
        link: FieldRule::extract(&[ANCHOR_HREF]),
        pagination: Pagination::NextLink {
            labels: &["Next »", "Next ›", "Next"],
            fallback_query: Some("page"),
        },
        default_max_pages: 5,
    }
}

// ============================================================================
// MAJOR LEAGUE HACKING
// ============================================================================

/// MLH lists events per season; `season` is usually the current year
pub fn mlh(season: i32) -> SiteAdapter {
    SiteAdapter {
        source: Source::Mlh,
        start_url: format!("https://mlh.io/seasons/{}/events", season),
        containers: &[".event-wrapper", ".event", ".event-card"],
        title: FieldRule::extract(&[Lookup::Text("h3"), Lookup::Text(".event-name")]),
        date: FieldRule::extract(&[Lookup::Text(".event-date"), Lookup::Attr("meta[itemprop='startDate']", "content")]),
        location: FieldRule::extract(&[
            Lookup::Text(".event-location"),
            Lookup::Text(".event-hybrid-notes"),
        ]),
        link: FieldRule::extract(&[ANCHOR_HREF]),
        pagination: Pagination::Single,
        default_max_pages: 1,
    }
}

// ============================================================================
// HACKATHON.COM
// ============================================================================

pub fn hackathon_com() -> SiteAdapter {
    SiteAdapter {
        source: Source::HackathonDotCom,
        start_url: "https://www.hackathon.com/city/online".to_string(),
        containers: &[".event-item", ".event-card", ".event-card__details", ".card"],
        title: FieldRule::extract(&[
            Lookup::Text(".event-title"),
            Lookup::Text("h3"),
            Lookup::Text("h2"),
        ]),
        date: FieldRule::extract(&[Lookup::Text(".event-date"), Lookup::Text(".event-card__date")]),
        // listing is the online city page
        location: FieldRule::extract_or(&[Lookup::Text(".event-location")], Fallback::Fixed("Online")),
        link: FieldRule::extract(&[ANCHOR_HREF]),
        pagination: Pagination::Query { param: "page" },
        default_max_pages: 3,
    }
}

// ============================================================================
// EVENTBRITE
// ============================================================================

pub fn eventbrite() -> SiteAdapter {
    SiteAdapter {
        source: Source::Eventbrite,
        start_url: "https://www.eventbrite.com/d/online/hackathon/".to_string(),
        containers: &[
            "div[data-testid='event-card']",
            ".search-event-card-wrapper",
            ".eds-event-card-content__primary-content",
            ".eds-event-card-content__content",
        ],
        title: FieldRule::extract(&[
            Lookup::Text("div.eds-event-card__formatted-name--is-clamped"),
            Lookup::Text("div[data-spec='event-card__formatted-name']"),
            Lookup::Text("h3"),
            Lookup::Text("h2"),
        ]),
        date: FieldRule::extract(&[
            Lookup::Text("div.eds-event-card-content__sub-title"),
            Lookup::Text("div[data-spec='event-card__date']"),
        ]),
        location: FieldRule::fixed("Online"),
        link: FieldRule::extract(&[ANCHOR_HREF]),
        pagination: Pagination::Query { param: "page" },
        default_max_pages: 2,
    }
}

// ============================================================================
// ANGELHACK
// ============================================================================

pub fn angelhack() -> SiteAdapter {
    SiteAdapter {
        source: Source::AngelHack,
        start_url: "https://angelhack.com/events/".to_string(),
        containers: &[".elementor-post", ".elementor-widget-container", ".event"],
        title: FieldRule::extract(&[Lookup::Text("h3"), Lookup::Text("h2"), Lookup::OwnText]),
        // the events page carries no per-card dates
        date: FieldRule::fixed("See website"),
        location: FieldRule::fixed("Varies"),
        link: FieldRule::extract_or(&[ANCHOR_HREF], Fallback::PageUrl),
        pagination: Pagination::Single,
        default_max_pages: 1,
    }
}

/// Adapter for a source
pub fn adapter_for(source: Source, mlh_season: i32) -> SiteAdapter {
    match source {
        Source::Devpost => devpost(),
        Source::Mlh => mlh(mlh_season),
        Source::HackathonDotCom => hackathon_com(),
        Source::Eventbrite => eventbrite(),
        Source::AngelHack => angelhack(),
    }
}
