//! Card and overlay image loading

use super::{App, LoadedImage};
use apod_gallery::constants::IMAGE_FETCH_PERMITS;
use apod_gallery::downloader::safe_filename;
use apod_gallery::gallery::DisplayState;
use apod_gallery::Entry;
use eframe::egui;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

const THUMB_MAX: u32 = 640;
const FULL_MAX: u32 = 2048;

/// Card thumbnail and size-capped full image
type Decoded = (egui::ColorImage, egui::ColorImage);

/// Progress of one image in the background
pub(crate) enum ImageLoad {
    Loading,
    Ready {
        thumb: egui::ColorImage,
        full: egui::ColorImage,
    },
    Failed,
}

/// Decode image bytes into a card thumbnail and a size-capped full image.
pub(crate) fn decode_image(bytes: &[u8]) -> Option<Decoded> {
    let img = image::load_from_memory(bytes).ok()?;
    let full = shrink_to(img, FULL_MAX);
    let thumb = shrink_to(full.clone(), THUMB_MAX);
    Some((to_color_image(&thumb), to_color_image(&full)))
}

/// Scale down to fit `max` on both sides; never scales up
fn shrink_to(img: image::DynamicImage, max: u32) -> image::DynamicImage {
    if img.width() > max || img.height() > max {
        img.thumbnail(max, max)
    } else {
        img
    }
}

fn to_color_image(img: &image::DynamicImage) -> egui::ColorImage {
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw())
}

/// Decode on the blocking pool, handing the bytes back for caching
async fn decode_off_thread(bytes: Vec<u8>) -> Option<(Decoded, Vec<u8>)> {
    tokio::task::spawn_blocking(move || decode_image(&bytes).map(|decoded| (decoded, bytes)))
        .await
        .ok()
        .flatten()
}

/// Load one image, preferring the disk cache. Only bytes that decode are cached.
async fn load_image(client: &reqwest::Client, url: &str, cache_path: &Path) -> Option<Decoded> {
    if let Ok(bytes) = tokio::fs::read(cache_path).await {
        if let Some((decoded, _)) = decode_off_thread(bytes).await {
            return Some(decoded);
        }
        debug!(path = %cache_path.display(), "Discarding unreadable cached image");
        if let Err(e) = tokio::fs::remove_file(cache_path).await {
            debug!(error = %e, path = %cache_path.display(), "Could not remove cached image");
        }
    }

    let bytes = fetch_bytes(client, url).await?;
    let (decoded, bytes) = decode_off_thread(bytes).await?;
    if let Err(e) = tokio::fs::write(cache_path, &bytes).await {
        debug!(error = %e, path = %cache_path.display(), "Could not cache image");
    }
    Some(decoded)
}

async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Option<Vec<u8>> {
    let response = match client.get(url).send().await {
        Ok(r) if r.status().is_success() => r,
        Ok(r) => {
            warn!(url, status = %r.status(), "Image request failed");
            return None;
        }
        Err(e) => {
            warn!(url, error = %e, "Image request failed");
            return None;
        }
    };
    response.bytes().await.ok().map(|b| b.to_vec())
}

impl App {
    /// Start loading images for the cards currently on screen.
    pub fn request_visible_images(&mut self, ctx: &egui::Context) {
        let DisplayState::Populated(entries) = self.gallery.surface() else {
            return;
        };
        let wanted: Vec<(String, PathBuf)> = entries
            .iter()
            .filter_map(|entry| {
                let url = entry.image_url()?;
                if self.requested_images.contains(url) {
                    return None;
                }
                Some((url.to_string(), self.image_cache_path(entry, url)))
            })
            .collect();

        if wanted.is_empty() {
            return;
        }
        debug!(count = wanted.len(), "Loading card images");
        self.spawn_image_loads(wanted, ctx);
    }

    /// Start loading a single entry's image (used by the overlay).
    pub fn request_image(&mut self, entry: &Entry, ctx: &egui::Context) {
        let Some(url) = entry.image_url() else {
            return;
        };
        if self.requested_images.contains(url) {
            return;
        }
        let path = self.image_cache_path(entry, url);
        self.spawn_image_loads(vec![(url.to_string(), path)], ctx);
    }

    fn image_cache_path(&self, entry: &Entry, url: &str) -> PathBuf {
        self.cache_dir.join("images").join(safe_filename(entry, url))
    }

    fn spawn_image_loads(&mut self, wanted: Vec<(String, PathBuf)>, ctx: &egui::Context) {
        if let Ok(mut loads) = self.image_loads.lock() {
            for (url, _) in &wanted {
                loads.insert(url.clone(), ImageLoad::Loading);
            }
        }
        for (url, _) in &wanted {
            self.requested_images.insert(url.clone());
        }

        let client = self.http.clone();
        let loads = self.image_loads.clone();
        let ctx = ctx.clone();

        self.runtime.spawn(async move {
            let semaphore = Arc::new(tokio::sync::Semaphore::new(IMAGE_FETCH_PERMITS));
            let mut handles = vec![];

            for (url, cache_path) in wanted {
                let sem = semaphore.clone();
                let client = client.clone();
                let loads = loads.clone();
                let ctx = ctx.clone();

                handles.push(tokio::spawn(async move {
                    let _permit = sem.acquire().await.ok();
                    let state = match load_image(&client, &url, &cache_path).await {
                        Some((thumb, full)) => ImageLoad::Ready { thumb, full },
                        None => {
                            warn!(url = %url, "Image could not be loaded");
                            ImageLoad::Failed
                        }
                    };
                    if let Ok(mut loads) = loads.lock() {
                        loads.insert(url, state);
                    }
                    ctx.request_repaint();
                }));
            }

            for handle in handles {
                handle.await.ok();
            }
        });
    }

    /// Upload finished images as textures.
    pub fn poll_images(&mut self, ctx: &egui::Context) {
        let finished: Vec<(String, ImageLoad)> = match self.image_loads.lock() {
            Ok(mut loads) => {
                let done: Vec<String> = loads
                    .iter()
                    .filter(|(_, state)| !matches!(state, ImageLoad::Loading))
                    .map(|(url, _)| url.clone())
                    .collect();
                done.into_iter()
                    .filter_map(|url| loads.remove_entry(&url))
                    .collect()
            }
            Err(_) => return,
        };

        for (url, state) in finished {
            match state {
                ImageLoad::Ready { thumb, full } => {
                    let thumb = ctx.load_texture(format!("{url}#thumb"), thumb, egui::TextureOptions::LINEAR);
                    let full = ctx.load_texture(format!("{url}#full"), full, egui::TextureOptions::LINEAR);
                    self.images.insert(url, LoadedImage { thumb, full });
                }
                ImageLoad::Failed => {
                    self.failed_images.insert(url);
                }
                ImageLoad::Loading => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn small_images_keep_full_size() {
        let (thumb, full) = decode_image(&png(40, 20)).unwrap();
        assert_eq!(full.size, [40, 20]);
        assert_eq!(thumb.size, [40, 20]);
    }

    #[test]
    fn large_images_are_scaled_down() {
        let (thumb, full) = decode_image(&png(4096, 1024)).unwrap();
        assert_eq!(full.size, [2048, 512]);
        assert_eq!(thumb.size, [640, 160]);
    }

    #[test]
    fn garbage_does_not_decode() {
        assert!(decode_image(b"definitely not an image").is_none());
    }

    // Nothing listens on the discard port, so a network fallback fails fast
    const UNREACHABLE: &str = "http://127.0.0.1:9/missing.png";

    #[tokio::test]
    async fn cached_image_is_used_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2024-01-01_cached.png");
        std::fs::write(&path, png(40, 20)).unwrap();

        let (thumb, _) = load_image(&reqwest::Client::new(), UNREACHABLE, &path).await.unwrap();
        assert_eq!(thumb.size, [40, 20]);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn unreadable_cache_file_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2024-01-01_broken.jpg");
        std::fs::write(&path, b"<html>502 Bad Gateway</html>").unwrap();

        assert!(load_image(&reqwest::Client::new(), UNREACHABLE, &path).await.is_none());
        assert!(!path.exists());
    }
}
