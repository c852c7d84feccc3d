//! Detail overlay for a single entry

use crate::types::Entry;
use tracing::debug;

/// What the overlay shows in its media slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayMedia {
    Video(String),
    Image(String),
    Missing,
}

/// Ways the overlay can be dismissed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismiss {
    CloseButton,
    Backdrop,
    Escape,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub entry: Entry,
    pub media: OverlayMedia,
}

impl Overlay {
    pub fn open(entry: Entry) -> Self {
        let media = if entry.is_video() {
            match entry.url.as_deref().filter(|u| !u.is_empty()) {
                Some(url) => OverlayMedia::Video(url.to_string()),
                None => image_media(&entry),
            }
        } else {
            image_media(&entry)
        };
        Self { entry, media }
    }

    pub fn title(&self) -> &str {
        self.entry.title_or_untitled()
    }

    pub fn date(&self) -> &str {
        self.entry.date_key()
    }

    pub fn explanation(&self) -> &str {
        self.entry.explanation.as_deref().unwrap_or("")
    }
}

fn image_media(entry: &Entry) -> OverlayMedia {
    entry
        .image_url()
        .map(|u| OverlayMedia::Image(u.to_string()))
        .unwrap_or(OverlayMedia::Missing)
}

/// Slot holding at most one open overlay
#[derive(Debug, Default)]
pub struct OverlaySlot {
    current: Option<Overlay>,
}

impl OverlaySlot {
    /// Open an overlay, replacing any that is already open
    pub fn open(&mut self, entry: Entry) -> &Overlay {
        self.current.insert(Overlay::open(entry))
    }

    pub fn dismiss(&mut self, reason: Dismiss) -> Option<Overlay> {
        let closed = self.current.take();
        if let Some(overlay) = &closed {
            debug!(?reason, date = overlay.date(), "Overlay dismissed");
        }
        closed
    }

    pub fn current(&self) -> Option<&Overlay> {
        self.current.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }
}
