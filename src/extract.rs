use scraper::{ElementRef, Selector};

use crate::record::SENTINEL;
use crate::utils::clean_text;

// ============================================================================
// LOOKUP STRATEGIES
// ============================================================================

/// One way of reading a value out of a card. A field is described by an
/// ordered slice of these, tried until one yields non-empty text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Text of the first descendant matching a CSS selector
    Text(&'static str),
    /// Attribute of the first descendant matching a CSS selector
    Attr(&'static str, &'static str),
    /// `href` of the first anchor whose text equals the label
    LinkText(&'static str),
    /// All text inside the card itself
    OwnText,
}

impl Lookup {
    /// Resolves against an element. Invalid selectors and missing elements
    /// both resolve to `None`.
    fn resolve(&self, element: ElementRef<'_>) -> Option<String> {
        let value = match *self {
            Lookup::Text(selector) => {
                let selector = Selector::parse(selector).ok()?;
                let found = element.select(&selector).next()?;
                found.text().collect::<String>()
            }
            Lookup::Attr(selector, name) => {
                let selector = Selector::parse(selector).ok()?;
                let found = element.select(&selector).next()?;
                found.value().attr(name)?.to_string()
            }
            Lookup::LinkText(label) => {
                let selector = Selector::parse("a[href]").ok()?;
                let found = element
                    .select(&selector)
                    .find(|a| clean_text(&a.text().collect::<String>()) == label)?;
                found.value().attr("href")?.to_string()
            }
            Lookup::OwnText => element.text().collect::<String>(),
        };

        let value = clean_text(&value);
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

// ============================================================================
// EXTRACTION RESULT
// ============================================================================

/// Outcome of reading one field. Missing values are a normal branch, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    Value(String),
    Sentinel,
}

impl Extracted {
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Extracted::Sentinel)
    }

    /// The value, or `fallback` when nothing was found
    pub fn unwrap_or(self, fallback: impl Into<String>) -> String {
        match self {
            Extracted::Value(value) => value,
            Extracted::Sentinel => fallback.into(),
        }
    }

    /// The value, or the `"N/A"` placeholder
    pub fn into_string(self) -> String {
        self.unwrap_or(SENTINEL)
    }
}

/// Tries each lookup in order; first non-empty value wins.
pub fn extract(element: ElementRef<'_>, lookups: &[Lookup]) -> Extracted {
    lookups
        .iter()
        .find_map(|lookup| lookup.resolve(element))
        .map(Extracted::Value)
        .unwrap_or(Extracted::Sentinel)
}

// ============================================================================
// TESTS
// ============================================================================
