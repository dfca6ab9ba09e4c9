//! Dated cache keys with a dateless fallback prefix

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;

/// Separator between key segments
pub const SEGMENT_SEPARATOR: char = '-';

/// chrono's formatter is locale-independent, so keys are byte-identical
/// across every runner in the fleet.
const DATE_FORMAT: &str = "%d/%m/%Y";

/// Keys derived for a single restore attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheKey {
    /// Exact key, including today's date
    pub primary: String,
    /// Primary key with the date removed, trailing separator kept
    pub fallback_prefix: String,
}

impl CacheKey {
    /// Build a key from its segments and the current instant
    pub fn new(segments: &[&str], now: DateTime<Utc>) -> Self {
        let mut fallback_prefix = String::new();
        for segment in segments {
            fallback_prefix.push_str(segment);
            fallback_prefix.push(SEGMENT_SEPARATOR);
        }
        let primary = format!("{}{}", fallback_prefix, format_date(now.date_naive()));

        Self {
            primary,
            fallback_prefix,
        }
    }

    /// The date segment that distinguishes `primary` from the prefix
    pub fn date_suffix(&self) -> &str {
        &self.primary[self.fallback_prefix.len()..]
    }

    /// Whether `key` is a dated key under this key's fallback prefix
    pub fn is_fallback_of(&self, key: &str) -> bool {
        date_after_prefix(key, &self.fallback_prefix).is_some()
    }

    /// Fallback prefixes in the order the store should try them
    pub fn fallback_prefixes(&self) -> Vec<String> {
        vec![self.fallback_prefix.clone()]
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.primary)
    }
}

/// Format a calendar date as `DD/MM/YYYY`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// The date of `key` when it is exactly `prefix` followed by a date
///
/// A bare `starts_with` is not enough: anything left over after the prefix
/// must be the date segment, or the key belongs to another identity.
pub fn date_after_prefix(key: &str, prefix: &str) -> Option<NaiveDate> {
    let rest = key.strip_prefix(prefix)?;
    NaiveDate::parse_from_str(rest, DATE_FORMAT)
        .ok()
        .filter(|date| format_date(*date) == rest)
}
