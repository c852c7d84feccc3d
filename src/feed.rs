//! Remote dataset access and parsing

use crate::constants::APOD_DATA_URL;
use crate::error::{ApodError, Result};
use crate::types::{Entry, Feed};
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};
use tracing::{debug, info};

/// Anything that can produce the APOD dataset
pub trait FeedSource {
    fn fetch(&self) -> Result<Feed>;
}

/// Blocking HTTP source for the feed
pub struct HttpFeed {
    client: reqwest::blocking::Client,
    url: String,
    bypass_cache: bool,
}

impl HttpFeed {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("apod-gallery/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
            bypass_cache: false,
        })
    }

    /// Feed at the default endpoint
    pub fn apod() -> Result<Self> {
        Self::new(APOD_DATA_URL)
    }

    /// Ask intermediaries for a fresh copy instead of a cached one
    pub fn bypass_cache(mut self) -> Self {
        self.bypass_cache = true;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl FeedSource for HttpFeed {
    fn fetch(&self) -> Result<Feed> {
        let mut headers = HeaderMap::new();
        if self.bypass_cache {
            headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
            headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        }

        debug!(url = %self.url, bypass_cache = self.bypass_cache, "Fetching feed");
        let response = self.client.get(&self.url).headers(headers).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApodError::Fetch(format!("HTTP {}", status)));
        }

        let body = response.text()?;
        let feed = parse_feed(&body)?;
        if let Feed::Entries(entries) = &feed {
            info!(count = entries.len(), "Feed loaded");
        }
        Ok(feed)
    }
}

/// Parse a feed body. Array elements that are not entry objects are skipped.
pub fn parse_feed(body: &str) -> Result<Feed> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ApodError::Parse(e.to_string()))?;

    let serde_json::Value::Array(items) = value else {
        return Ok(Feed::NotAnArray);
    };

    let total = items.len();
    let entries: Vec<Entry> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Entry>(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(error = %e, "Skipping malformed feed item");
                None
            }
        })
        .collect();

    if entries.len() != total {
        debug!(kept = entries.len(), total, "Some feed items were skipped");
    }
    Ok(Feed::Entries(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_array_of_entries() {
        let body = r#"[
            {"date":"2024-01-01","title":"A","media_type":"image","url":"http://x/a.jpg"},
            {"date":"2024-01-02","media_type":"video","url":"http://x/b"}
        ]"#;
        match parse_feed(body).unwrap() {
            Feed::Entries(entries) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0].title.as_deref(), Some("A"));
                assert!(entries[1].is_video());
            }
            Feed::NotAnArray => panic!("expected entries"),
        }
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(parse_feed("{not json"), Err(ApodError::Parse(_))));
    }

    #[test]
    fn object_body_is_not_an_array() {
        assert!(matches!(
            parse_feed(r#"{"date":"2024-01-01"}"#).unwrap(),
            Feed::NotAnArray
        ));
    }

    #[test]
    fn non_object_items_are_skipped() {
        let body = r#"[1, "two", {"date":"2024-01-03"}, {"date": 5}]"#;
        match parse_feed(body).unwrap() {
            Feed::Entries(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].date_key(), "2024-01-03");
            }
            Feed::NotAnArray => panic!("expected entries"),
        }
    }
}
