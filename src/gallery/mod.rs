//! Gallery controller - owns the dataset cache and drives the display surface

mod filters;
mod overlay;

pub use filters::{
    filter_by_range, select_for_display, sort_by_date_desc, validate_range, DateRange,
    RANGE_FORMAT_MESSAGE, RANGE_ORDER_MESSAGE,
};
pub use overlay::{Dismiss, Overlay, OverlayMedia, OverlaySlot};

use crate::constants::LOAD_ERROR_MESSAGE;
use crate::error::{ApodError, Result};
use crate::feed::FeedSource;
use crate::types::{Entry, Feed};
use tracing::{debug, error, info, warn};

/// Render instructions the controller emits
pub trait GallerySurface {
    fn show_loading(&mut self);
    fn show_error(&mut self, message: &str);
    fn show_empty(&mut self);
    fn show_grid(&mut self, entries: Vec<Entry>);
}

/// What the display area currently shows
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DisplayState {
    #[default]
    Idle,
    Loading,
    Populated(Vec<Entry>),
    Empty,
    Error(String),
}

impl GallerySurface for DisplayState {
    fn show_loading(&mut self) {
        *self = DisplayState::Loading;
    }

    fn show_error(&mut self, message: &str) {
        *self = DisplayState::Error(message.to_string());
    }

    fn show_empty(&mut self) {
        *self = DisplayState::Empty;
    }

    fn show_grid(&mut self, entries: Vec<Entry>) {
        *self = DisplayState::Populated(entries);
    }
}

/// What a request needs from the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Shown straight from the cache
    Rendered,
    /// No dataset yet; the caller must fetch it and hand it to [`Gallery::complete`]
    NeedsFetch,
    /// A fetch is already outstanding; this range is shown when it lands
    Pending,
}

pub struct Gallery<S: GallerySurface> {
    cache: Option<Vec<Entry>>,
    surface: S,
    // Outstanding fetch and the range to show once it completes
    fetching: bool,
    pending: Option<DateRange>,
}

impl<S: GallerySurface> Gallery<S> {
    pub fn new(surface: S) -> Self {
        Self {
            cache: None,
            surface,
            fetching: false,
            pending: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn cached(&self) -> Option<&[Entry]> {
        self.cache.as_deref()
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    /// Validate the bounds and enter `Loading`. On invalid bounds the message
    /// is shown and nothing else changes.
    pub fn begin_request(&mut self, start: &str, end: &str) -> Result<DateRange> {
        match validate_range(start, end) {
            Ok(range) => {
                self.surface.show_loading();
                Ok(range)
            }
            Err(e) => {
                debug!(start, end, error = %e, "Rejected date range");
                self.surface.show_error(&e.to_string());
                Err(e)
            }
        }
    }

    /// Cache a freshly fetched feed, newest first. Only the first store sticks.
    pub fn store(&mut self, feed: Feed) {
        if self.cache.is_some() {
            warn!("Dataset already cached, ignoring new feed");
            return;
        }
        let mut entries = match feed {
            Feed::Entries(entries) => entries,
            Feed::NotAnArray => {
                warn!("Feed is not an array, caching empty dataset");
                Vec::new()
            }
        };
        sort_by_date_desc(&mut entries);
        info!(count = entries.len(), "Dataset cached");
        self.cache = Some(entries);
    }

    /// Fetch through `source` unless the dataset is already cached.
    pub fn ensure_loaded<F: FeedSource + ?Sized>(&mut self, source: &F) -> Result<()> {
        if self.cache.is_some() {
            debug!("Using cached dataset");
            return Ok(());
        }
        let feed = source.fetch()?;
        self.store(feed);
        Ok(())
    }

    /// Filter the cached dataset and show the selection.
    pub fn render(&mut self, range: &DateRange) {
        let Some(cache) = self.cache.as_deref() else {
            self.surface.show_empty();
            return;
        };
        let filtered = filter_by_range(cache, &range.start, &range.end);
        let shown = select_for_display(filtered);
        debug!(start = %range.start, end = %range.end, shown = shown.len(), "Rendering gallery");
        if shown.is_empty() {
            self.surface.show_empty();
        } else {
            self.surface.show_grid(shown);
        }
    }

    /// Report a fetch or parse failure. The cause is logged, the user sees a
    /// generic message.
    pub fn fail(&mut self, err: &ApodError) {
        error!(error = %err, "Error fetching APOD data");
        self.surface.show_error(LOAD_ERROR_MESSAGE);
    }

    /// Request a range when the dataset arrives asynchronously.
    ///
    /// At most one fetch is outstanding. Requests made while it is in flight
    /// only replace the pending range; the latest one is shown on completion.
    pub fn request(&mut self, start: &str, end: &str) -> Result<RequestOutcome> {
        let range = self.begin_request(start, end)?;
        if self.cache.is_some() {
            self.render(&range);
            return Ok(RequestOutcome::Rendered);
        }

        self.pending = Some(range);
        if self.fetching {
            debug!("Dataset fetch already in flight");
            return Ok(RequestOutcome::Pending);
        }
        self.fetching = true;
        Ok(RequestOutcome::NeedsFetch)
    }

    /// Apply the result of the fetch started by [`Gallery::request`].
    pub fn complete(&mut self, result: Result<Feed>) {
        self.fetching = false;
        let range = self.pending.take().unwrap_or_default();
        match result {
            Ok(feed) => {
                self.store(feed);
                self.render(&range);
            }
            Err(e) => self.fail(&e),
        }
    }

    /// Full pipeline: validate, load (cached after the first success),
    /// filter, select and show.
    pub fn display_range<F: FeedSource + ?Sized>(
        &mut self,
        source: &F,
        start: &str,
        end: &str,
    ) -> Result<()> {
        let range = self.begin_request(start, end)?;
        if let Err(e) = self.ensure_loaded(source) {
            self.fail(&e);
            return Err(e);
        }
        self.render(&range);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Debug, Clone, PartialEq)]
    enum Shown {
        Loading,
        Error(String),
        Empty,
        Grid(Vec<String>),
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<Shown>,
    }

    impl GallerySurface for Recorder {
        fn show_loading(&mut self) {
            self.events.push(Shown::Loading);
        }
        fn show_error(&mut self, message: &str) {
            self.events.push(Shown::Error(message.to_string()));
        }
        fn show_empty(&mut self) {
            self.events.push(Shown::Empty);
        }
        fn show_grid(&mut self, entries: Vec<Entry>) {
            self.events
                .push(Shown::Grid(entries.iter().map(|e| e.date_key().to_string()).collect()));
        }
    }

    struct FakeFeed {
        calls: Cell<usize>,
        responses: RefCell<Vec<Result<Feed>>>,
    }

    impl FakeFeed {
        fn new(responses: Vec<Result<Feed>>) -> Self {
            Self {
                calls: Cell::new(0),
                responses: RefCell::new(responses),
            }
        }
    }

    impl FeedSource for FakeFeed {
        fn fetch(&self) -> Result<Feed> {
            self.calls.set(self.calls.get() + 1);
            self.responses.borrow_mut().remove(0)
        }
    }

    fn scenario() -> Vec<Entry> {
        serde_json::from_str(
            r#"[
                {"date":"2024-01-01","media_type":"image","url":"http://x/a.jpg"},
                {"date":"2024-01-03","media_type":"video","url":"http://x/b"},
                {"date":"2024-01-02","media_type":"image","hdurl":"http://x/c.jpg"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn first_request_fetches_and_sorts() {
        let feed = FakeFeed::new(vec![Ok(Feed::Entries(scenario()))]);
        let mut gallery = Gallery::new(Recorder::default());

        gallery.display_range(&feed, "", "").unwrap();

        let cached: Vec<&str> = gallery.cached().unwrap().iter().map(|e| e.date_key()).collect();
        assert_eq!(cached, vec!["2024-01-03", "2024-01-02", "2024-01-01"]);
        assert_eq!(
            gallery.surface().events,
            vec![
                Shown::Loading,
                Shown::Grid(vec!["2024-01-02".into(), "2024-01-01".into()])
            ]
        );
    }

    #[test]
    fn cached_dataset_skips_network() {
        let feed = FakeFeed::new(vec![Ok(Feed::Entries(scenario()))]);
        let mut gallery = Gallery::new(Recorder::default());

        gallery.display_range(&feed, "", "").unwrap();
        gallery.display_range(&feed, "2024-01-01", "2024-01-02").unwrap();
        gallery.display_range(&feed, "2024-01-03", "").unwrap();

        assert_eq!(feed.calls.get(), 1);
        let events = &gallery.surface().events;
        assert_eq!(events[3], Shown::Grid(vec!["2024-01-02".into(), "2024-01-01".into()]));
        // Only the video falls in range
        assert_eq!(events[5], Shown::Empty);
    }

    #[test]
    fn reversed_range_leaves_cache_untouched() {
        let feed = FakeFeed::new(vec![Ok(Feed::Entries(scenario()))]);
        let mut gallery = Gallery::new(Recorder::default());

        let err = gallery
            .display_range(&feed, "2024-01-03", "2024-01-01")
            .unwrap_err();

        assert!(matches!(err, ApodError::InvalidRange(_)));
        assert_eq!(feed.calls.get(), 0);
        assert!(!gallery.is_cached());
        assert_eq!(
            gallery.surface().events,
            vec![Shown::Error(RANGE_ORDER_MESSAGE.to_string())]
        );
    }

    #[test]
    fn fetch_failure_shows_generic_message_and_retries_later() {
        let feed = FakeFeed::new(vec![
            Err(ApodError::Fetch("HTTP 503 Service Unavailable".into())),
            Ok(Feed::Entries(scenario())),
        ]);
        let mut gallery = Gallery::new(Recorder::default());

        assert!(gallery.display_range(&feed, "", "").is_err());
        assert!(!gallery.is_cached());
        assert_eq!(
            gallery.surface().events,
            vec![Shown::Loading, Shown::Error(LOAD_ERROR_MESSAGE.to_string())]
        );

        gallery.display_range(&feed, "", "").unwrap();
        assert_eq!(feed.calls.get(), 2);
        assert!(gallery.is_cached());
    }

    #[test]
    fn parse_failure_is_not_cached() {
        let feed = FakeFeed::new(vec![Err(ApodError::Parse("expected value".into()))]);
        let mut gallery = Gallery::new(DisplayState::default());

        assert!(gallery.display_range(&feed, "", "").is_err());
        assert!(!gallery.is_cached());
        assert_eq!(
            gallery.surface(),
            &DisplayState::Error(LOAD_ERROR_MESSAGE.to_string())
        );
    }

    #[test]
    fn non_array_feed_caches_empty_dataset() {
        let feed = FakeFeed::new(vec![Ok(Feed::NotAnArray)]);
        let mut gallery = Gallery::new(DisplayState::default());

        gallery.display_range(&feed, "", "").unwrap();
        assert_eq!(gallery.cached().map(|c| c.len()), Some(0));
        assert_eq!(gallery.surface(), &DisplayState::Empty);
    }

    #[test]
    fn second_store_is_ignored() {
        let mut gallery = Gallery::new(DisplayState::default());
        gallery.store(Feed::Entries(scenario()));
        gallery.store(Feed::Entries(Vec::new()));
        assert_eq!(gallery.cached().map(|c| c.len()), Some(3));
    }

    #[test]
    fn requests_during_fetch_share_it_and_latest_range_wins() {
        let mut gallery = Gallery::new(Recorder::default());

        assert_eq!(gallery.request("", "").unwrap(), RequestOutcome::NeedsFetch);
        assert!(gallery.is_fetching());
        assert_eq!(
            gallery.request("2024-01-03", "2024-01-03").unwrap(),
            RequestOutcome::Pending
        );
        assert_eq!(
            gallery.request("2024-01-01", "2024-01-02").unwrap(),
            RequestOutcome::Pending
        );

        gallery.complete(Ok(Feed::Entries(scenario())));

        assert!(!gallery.is_fetching());
        assert!(gallery.is_cached());
        assert_eq!(
            gallery.surface().events,
            vec![
                Shown::Loading,
                Shown::Loading,
                Shown::Loading,
                Shown::Grid(vec!["2024-01-02".into(), "2024-01-01".into()])
            ]
        );

        // Cached now: rendered immediately, no further fetch
        assert_eq!(gallery.request("2024-01-02", "").unwrap(), RequestOutcome::Rendered);
    }

    #[test]
    fn invalid_range_during_fetch_keeps_pending_range() {
        let mut gallery = Gallery::new(Recorder::default());

        assert_eq!(gallery.request("2024-01-02", "").unwrap(), RequestOutcome::NeedsFetch);
        assert!(gallery.request("2024-01-03", "2024-01-01").is_err());
        assert!(gallery.is_fetching());

        gallery.complete(Ok(Feed::Entries(scenario())));
        assert_eq!(
            gallery.surface().events.last(),
            Some(&Shown::Grid(vec!["2024-01-02".into()]))
        );
    }

    #[test]
    fn failed_completion_shows_generic_message_and_allows_refetch() {
        let mut gallery = Gallery::new(Recorder::default());

        assert_eq!(gallery.request("", "").unwrap(), RequestOutcome::NeedsFetch);
        gallery.complete(Err(ApodError::Fetch("connection reset".into())));

        assert!(!gallery.is_fetching());
        assert!(!gallery.is_cached());
        assert_eq!(
            gallery.surface().events.last(),
            Some(&Shown::Error(LOAD_ERROR_MESSAGE.to_string()))
        );

        assert_eq!(gallery.request("", "").unwrap(), RequestOutcome::NeedsFetch);
        gallery.complete(Ok(Feed::Entries(scenario())));
        assert!(gallery.is_cached());
    }

    #[test]
    fn display_state_tracks_transitions() {
        let mut gallery = Gallery::new(DisplayState::default());
        assert_eq!(gallery.surface(), &DisplayState::Idle);

        let range = gallery.begin_request("", "").unwrap();
        assert_eq!(gallery.surface(), &DisplayState::Loading);

        gallery.store(Feed::Entries(scenario()));
        gallery.render(&range);
        match gallery.surface() {
            DisplayState::Populated(entries) => assert_eq!(entries.len(), 2),
            other => panic!("unexpected state: {other:?}"),
        }
    }
}
