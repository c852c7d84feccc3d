//! Date-range filtering, ordering and display selection
//!
//! Dates are compared as plain strings. That is only correct because every
//! date in the feed is a fixed-width `YYYY-MM-DD` string, which is also what
//! [`validate_range`] requires of the bounds.

use crate::constants::DISPLAY_CAP;
use crate::error::{ApodError, Result};
use crate::types::Entry;
use chrono::NaiveDate;

pub const RANGE_ORDER_MESSAGE: &str = "Start date must be before or equal to end date.";
pub const RANGE_FORMAT_MESSAGE: &str = "Dates must use the YYYY-MM-DD format.";

/// Validated, inclusive date bounds. An empty bound is open on that side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Check user-entered bounds before any filtering happens.
pub fn validate_range(start: &str, end: &str) -> Result<DateRange> {
    let start = start.trim();
    let end = end.trim();

    for bound in [start, end] {
        if !bound.is_empty() && !is_iso_date(bound) {
            return Err(ApodError::InvalidRange(RANGE_FORMAT_MESSAGE.to_string()));
        }
    }

    if !start.is_empty() && !end.is_empty() && start > end {
        return Err(ApodError::InvalidRange(RANGE_ORDER_MESSAGE.to_string()));
    }

    Ok(DateRange {
        start: start.to_string(),
        end: end.to_string(),
    })
}

/// Fixed-width calendar date, e.g. `2024-01-31`
fn is_iso_date(s: &str) -> bool {
    s.len() == 10 && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Newest first. Missing dates compare as "" and end up last; ties keep feed order.
pub fn sort_by_date_desc(entries: &mut [Entry]) {
    entries.sort_by(|a, b| b.date_key().cmp(a.date_key()));
}

/// Entries whose date lies in `[start, end]`, in their original order.
/// With both bounds empty every entry is returned, dated or not.
pub fn filter_by_range<'a>(items: &'a [Entry], start: &str, end: &str) -> Vec<&'a Entry> {
    if start.is_empty() && end.is_empty() {
        return items.iter().collect();
    }

    items
        .iter()
        .filter(|item| {
            let date = item.date_key();
            if date.is_empty() {
                return false;
            }
            if !start.is_empty() && date < start {
                return false;
            }
            if !end.is_empty() && date > end {
                return false;
            }
            true
        })
        .collect()
}

/// Cards to render: images only, first [`DISPLAY_CAP`] of them, minus any
/// without a usable URL. The cap is applied before the URL check.
pub fn select_for_display<'a, I>(items: I) -> Vec<Entry>
where
    I: IntoIterator<Item = &'a Entry>,
{
    items
        .into_iter()
        .filter(|item| item.is_image())
        .take(DISPLAY_CAP)
        .filter(|item| item.has_media())
        .cloned()
        .collect()
}
