//! Common types and data structures

use serde::{Deserialize, Serialize};

/// One day of the APOD feed
///
/// Every field is optional in the remote data. `date` is a fixed-width
/// `YYYY-MM-DD` string and is only ever compared as a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entry {
    pub date: Option<String>,
    pub title: Option<String>,
    pub explanation: Option<String>,
    pub url: Option<String>,
    pub hdurl: Option<String>,
    pub media_type: Option<String>,
}

impl Entry {
    /// Date key used for sorting and filtering, empty when absent
    pub fn date_key(&self) -> &str {
        self.date.as_deref().unwrap_or("")
    }

    pub fn title_or_untitled(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }

    /// Preferred media location: `hdurl` first, then `url`
    pub fn image_url(&self) -> Option<&str> {
        non_empty(self.hdurl.as_deref()).or_else(|| non_empty(self.url.as_deref()))
    }

    pub fn has_media(&self) -> bool {
        self.image_url().is_some()
    }

    /// Absent media type counts as an image
    pub fn is_image(&self) -> bool {
        matches!(self.media_type.as_deref(), None | Some("image"))
    }

    pub fn is_video(&self) -> bool {
        self.media_type.as_deref() == Some("video")
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Result of parsing the feed body
#[derive(Debug)]
pub enum Feed {
    Entries(Vec<Entry>),
    NotAnArray,
}
