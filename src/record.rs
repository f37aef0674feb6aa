use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder stored in any field that could not be extracted
pub const SENTINEL: &str = "N/A";

// ============================================================================
// SOURCES
// ============================================================================

/// Listing site an event was collected from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    Devpost,
    #[serde(rename = "MLH")]
    Mlh,
    #[serde(rename = "Hackathon.com")]
    HackathonDotCom,
    Eventbrite,
    AngelHack,
}

impl Source {
    /// All sources in the order the aggregator runs them
    pub const ALL: [Source; 5] = [
        Source::Devpost,
        Source::Mlh,
        Source::HackathonDotCom,
        Source::Eventbrite,
        Source::AngelHack,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Source::Devpost => "Devpost",
            Source::Mlh => "MLH",
            Source::HackathonDotCom => "Hackathon.com",
            Source::Eventbrite => "Eventbrite",
            Source::AngelHack => "AngelHack",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "devpost" => Ok(Source::Devpost),
            "mlh" => Ok(Source::Mlh),
            "hackathon.com" | "hackathon_com" | "hackathondotcom" => Ok(Source::HackathonDotCom),
            "eventbrite" => Ok(Source::Eventbrite),
            "angelhack" => Ok(Source::AngelHack),
            other => Err(format!("Unknown source: {}", other)),
        }
    }
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// One event card as read off a listing page. Every field is always present;
/// fields that could not be read hold [`SENTINEL`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawEventRecord {
    pub title: String,
    pub date_text: String,
    pub location_text: String,
    pub link: String,
    pub source: Source,
    pub scraped_at: DateTime<Utc>,
}

impl RawEventRecord {
    /// Key used for cross-source deduplication
    pub fn identity(&self) -> (&str, &str) {
        (&self.title, &self.link)
    }
}

/// Delivery mode derived from the location text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Online,
    Offline,
    Unknown,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Online => "Online",
            Mode::Offline => "Offline",
            Mode::Unknown => "Unknown",
        };
        f.pad(name)
    }
}

/// An upcoming event with a valid date and its derived fields.
/// Records whose date could not be parsed never reach this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEventRecord {
    pub title: String,
    pub date_text: String,
    pub location_text: String,
    pub link: String,
    pub source: Source,
    pub scraped_at: DateTime<Utc>,
    pub date: NaiveDate,
    pub year: i32,
    pub month_name: String,
    pub days_left: i64,
    pub mode: Mode,
}

/// True when a field holds a real value rather than the placeholder
pub fn is_present(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != SENTINEL
}
