//! Normalization shared by every provider adapter: string trimming, paging
//! bounds, title selection and alternate-title de-duplication.

use std::collections::HashSet;

pub const UNTITLED: &str = "Untitled";

/// Trimmed copy of `value`, or `None` when nothing is left.
#[must_use]
pub fn trimmed(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[must_use]
pub fn trimmed_opt(value: Option<&str>) -> Option<String> {
    value.and_then(trimmed)
}

/// First candidate that is non-empty after trimming.
#[must_use]
pub fn first_non_empty(candidates: &[Option<&str>]) -> Option<String> {
    candidates.iter().find_map(|value| trimmed_opt(*value))
}

/// Trimmed, lower-cased form used for case-insensitive comparisons.
#[must_use]
pub fn lower(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Provider-specific paging limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl PageBounds {
    pub const DEFAULT_PAGE: u32 = 1;

    #[must_use]
    pub const fn new(default_limit: u32, max_limit: u32) -> Self {
        Self {
            default_limit,
            max_limit,
        }
    }

    /// Pages below 1 fall back to 1.
    #[must_use]
    pub fn page(&self, requested: i64) -> u32 {
        if requested < 1 {
            return Self::DEFAULT_PAGE;
        }
        u32::try_from(requested).unwrap_or(u32::MAX)
    }

    /// Limits below 1 fall back to the default; limits above the maximum
    /// clamp to it.
    #[must_use]
    pub fn limit(&self, requested: i64) -> u32 {
        if requested < 1 {
            return self.default_limit;
        }
        u32::try_from(requested)
            .unwrap_or(u32::MAX)
            .min(self.max_limit)
    }
}

/// Preferred and original title chosen from upstream variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedTitles {
    pub preferred: String,
    pub original: Option<String>,
}

/// Picks the preferred title from `preferred_order` and the original title
/// from `original_order`.
///
/// The preferred title falls back to [`UNTITLED`]. The original title skips
/// any candidate equal (case-insensitively) to the preferred one.
#[must_use]
pub fn pick_titles(preferred_order: &[Option<&str>], original_order: &[Option<&str>]) -> PickedTitles {
    let preferred = first_non_empty(preferred_order).unwrap_or_else(|| UNTITLED.to_string());
    let original = original_order
        .iter()
        .filter_map(|value| trimmed_opt(*value))
        .find(|value| lower(value) != lower(&preferred));

    PickedTitles {
        preferred,
        original,
    }
}

/// Collects alternate titles in upstream order.
///
/// Blank values, values equal to the preferred or original title, and
/// case-insensitive duplicates are dropped; the first spelling seen wins.
#[derive(Debug)]
pub struct AltTitles {
    excluded: Vec<String>,
    seen: HashSet<String>,
    out: Vec<String>,
}

impl AltTitles {
    #[must_use]
    pub fn new(titles: &PickedTitles) -> Self {
        let mut excluded = vec![lower(&titles.preferred)];
        if let Some(original) = &titles.original {
            excluded.push(lower(original));
        }
        Self {
            excluded,
            seen: HashSet::new(),
            out: Vec::new(),
        }
    }

    pub fn push(&mut self, value: &str) {
        let Some(value) = trimmed(value) else {
            return;
        };
        let key = lower(&value);
        if self.excluded.contains(&key) {
            return;
        }
        if self.seen.insert(key) {
            self.out.push(value);
        }
    }

    pub fn push_opt(&mut self, value: Option<&str>) {
        if let Some(value) = value {
            self.push(value);
        }
    }

    pub fn extend<'a>(&mut self, values: impl IntoIterator<Item = &'a str>) {
        for value in values {
            self.push(value);
        }
    }

    #[must_use]
    pub fn finish(self) -> Vec<String> {
        self.out
    }
}

/// Formats a `YYYY-MM-DD` date from separate components.
///
/// The date is present only when all three components are.
#[must_use]
pub fn ymd(year: Option<i32>, month: Option<i32>, day: Option<i32>) -> Option<String> {
    match (year, month, day) {
        (Some(year), Some(month), Some(day)) => Some(format!("{year:04}-{month:02}-{day:02}")),
        _ => None,
    }
}

/// UTC calendar date of a Unix timestamp; non-positive timestamps are absent.
#[must_use]
pub fn unix_date(timestamp: Option<i64>) -> Option<String> {
    let timestamp = timestamp.filter(|value| *value > 0)?;
    chrono::DateTime::from_timestamp(timestamp, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}
