//! Dataset requests - validation, background fetch and result polling

use super::{App, FetchSlot, FetchTask};
use apod_gallery::feed::{FeedSource, HttpFeed};
use apod_gallery::gallery::RequestOutcome;
use eframe::egui;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

impl App {
    /// Run the display pipeline for the current date fields.
    pub fn request_range(&mut self, ctx: &egui::Context) {
        match self.gallery.request(&self.start_date, &self.end_date) {
            Ok(RequestOutcome::Rendered) => self.request_visible_images(ctx),
            Ok(RequestOutcome::NeedsFetch) => self.spawn_fetch(ctx),
            Ok(RequestOutcome::Pending) | Err(_) => {}
        }
    }

    fn spawn_fetch(&mut self, ctx: &egui::Context) {
        let slot: FetchSlot = Arc::new(Mutex::new(None));
        let worker_slot = slot.clone();
        let ctx = ctx.clone();

        info!("Fetching APOD dataset");
        let handle = std::thread::spawn(move || {
            let result = HttpFeed::apod().and_then(|feed| feed.bypass_cache().fetch());
            if let Ok(mut guard) = worker_slot.lock() {
                *guard = Some(result);
            }
            ctx.request_repaint();
        });
        self.fetch_task = Some(FetchTask { slot, handle });
    }

    /// Apply a finished background fetch, if any.
    pub fn poll_fetch(&mut self, ctx: &egui::Context) {
        let Some(task) = &self.fetch_task else {
            return;
        };
        let Some(result) = task.try_take() else {
            ctx.request_repaint_after(Duration::from_millis(250));
            return;
        };
        self.fetch_task = None;

        self.gallery.complete(result);
        self.request_visible_images(ctx);
    }
}
