//! App module - contains the main application state and logic

mod images;
mod modals;
mod requests;
mod views;

use crate::settings::Settings;
use crate::theme;
use apod_gallery::constants::SPACE_FACTS;
use apod_gallery::gallery::{DisplayState, Gallery, OverlaySlot};
use apod_gallery::utils::get_cache_dir;
use apod_gallery::{ApodError, Feed};
use eframe::egui;
use rand::seq::SliceRandom;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::error;

pub(crate) use images::ImageLoad;

/// Shared slot a background fetch writes its result into
pub(crate) type FetchSlot = Arc<Mutex<Option<apod_gallery::Result<Feed>>>>;

/// Dataset fetch running on a worker thread
pub(crate) struct FetchTask {
    pub slot: FetchSlot,
    pub handle: std::thread::JoinHandle<()>,
}

impl FetchTask {
    /// The fetch result once the worker is done. A worker that exits without
    /// writing one (it panicked) yields a fetch error.
    pub fn try_take(&self) -> Option<apod_gallery::Result<Feed>> {
        // Checked before the slot: a finished worker has already written its result
        let finished = self.handle.is_finished();
        let result = match self.slot.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        match result {
            Some(result) => Some(result),
            None if finished => {
                error!("Dataset fetch worker exited without a result");
                Some(Err(ApodError::Fetch("fetch worker stopped".into())))
            }
            None => None,
        }
    }
}

/// Decoded textures for one image URL
pub(crate) struct LoadedImage {
    pub thumb: egui::TextureHandle,
    pub full: egui::TextureHandle,
}

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    pub(crate) gallery: Gallery<DisplayState>,
    // Date range inputs
    pub(crate) start_date: String,
    pub(crate) end_date: String,
    // Dataset fetch in flight
    pub(crate) fetch_task: Option<FetchTask>,
    // Detail overlay
    pub(crate) overlay: OverlaySlot,
    // Card/overlay images
    pub(crate) runtime: tokio::runtime::Runtime,
    pub(crate) http: reqwest::Client,
    pub(crate) image_loads: Arc<Mutex<HashMap<String, ImageLoad>>>,
    pub(crate) images: HashMap<String, LoadedImage>,
    pub(crate) failed_images: HashSet<String>,
    pub(crate) requested_images: HashSet<String>,
    pub(crate) cache_dir: PathBuf,
    // Decoration
    pub(crate) logo_texture: Option<egui::TextureHandle>,
    pub(crate) fact: &'static str,
    // Window
    pub(crate) window_pos: Option<egui::Pos2>,
    pub(crate) window_size: Option<egui::Vec2>,
    pub(crate) needs_center: bool,
    pub(crate) data_dir: PathBuf,
}

// ============================================================================
// APP INITIALIZATION & HELPERS
// ============================================================================

impl App {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: Settings,
        data_dir: PathBuf,
        runtime: tokio::runtime::Runtime,
    ) -> Self {
        // Force dark theme
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        // Add Phosphor icons font
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        // Apply theme from theme.rs
        theme::apply_visuals(&cc.egui_ctx);

        let cache_dir = get_cache_dir();
        std::fs::create_dir_all(cache_dir.join("images")).ok();

        Self {
            gallery: Gallery::new(DisplayState::default()),
            start_date: settings.start_date,
            end_date: settings.end_date,
            fetch_task: None,
            overlay: OverlaySlot::default(),
            runtime,
            http: reqwest::Client::new(),
            image_loads: Arc::new(Mutex::new(HashMap::new())),
            images: HashMap::new(),
            failed_images: HashSet::new(),
            requested_images: HashSet::new(),
            cache_dir,
            logo_texture: None,
            fact: pick_fact(),
            window_pos: None,
            window_size: None,
            needs_center: false,
            data_dir,
        }
    }

    pub fn save_settings(&self) {
        let settings = Settings {
            window_x: self.window_pos.map(|p| p.x),
            window_y: self.window_pos.map(|p| p.y),
            window_w: self.window_size.map(|s| s.x),
            window_h: self.window_size.map(|s| s.y),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
        };
        settings.save(&self.data_dir);
    }
}

/// Random "Did You Know?" fact; empty if none can be picked
fn pick_fact() -> &'static str {
    SPACE_FACTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(worker: impl FnOnce(FetchSlot) + Send + 'static) -> FetchTask {
        let slot: FetchSlot = Arc::new(Mutex::new(None));
        let worker_slot = slot.clone();
        let handle = std::thread::spawn(move || worker(worker_slot));
        FetchTask { slot, handle }
    }

    fn wait(task: &FetchTask) {
        while !task.handle.is_finished() {
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
    }

    #[test]
    fn finished_fetch_hands_over_its_result() {
        let task = task(|slot| {
            *slot.lock().unwrap() = Some(Ok(Feed::Entries(Vec::new())));
        });
        wait(&task);
        assert!(matches!(task.try_take(), Some(Ok(Feed::Entries(_)))));
    }

    #[test]
    fn panicked_worker_reports_fetch_error() {
        let task = task(|_| panic!("worker died"));
        wait(&task);
        assert!(matches!(task.try_take(), Some(Err(ApodError::Fetch(_)))));
    }

    #[test]
    fn running_worker_has_no_result_yet() {
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        let task = task(move |_| {
            rx.recv().ok();
        });
        assert!(task.try_take().is_none());
        tx.send(()).unwrap();
    }

    #[test]
    fn fact_comes_from_the_list() {
        for _ in 0..20 {
            assert!(SPACE_FACTS.contains(&pick_fact()));
        }
    }
}
