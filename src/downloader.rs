//! Batch download of APOD images to a local directory
//!
//! Downloads are strictly sequential. A failed item is logged and skipped;
//! only successes count toward the cap.

use crate::error::{ApodError, Result};
use crate::feed::FeedSource;
use crate::types::{Entry, Feed};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

lazy_static! {
    static ref RE_HTTP: Regex = Regex::new(r"(?i)^https?://").unwrap();
    static ref RE_UNSAFE: Regex = Regex::new(r"[^A-Za-z0-9\-_. ]").unwrap();
    static ref RE_SPACE: Regex = Regex::new(r"\s+").unwrap();
}

const TITLE_CHARS: usize = 40;
const DEFAULT_EXT: &str = ".jpg";

/// Writes the body behind a URL to a file
pub trait FileFetcher {
    /// Returns the number of bytes written
    fn download_to(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Blocking reqwest fetcher; redirects are followed by the client
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("apod-gallery/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl FileFetcher for HttpFetcher {
    fn download_to(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| ApodError::Download(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApodError::Download(format!("HTTP {} for {}", status, url)));
        }

        let mut file = File::create(dest).map_err(|e| ApodError::Download(e.to_string()))?;
        response
            .copy_to(&mut file)
            .map_err(|e| ApodError::Download(e.to_string()))
    }
}

/// Outcome of a batch run
#[derive(Debug)]
pub struct Report {
    pub downloaded: usize,
    pub attempted: usize,
    pub candidates: usize,
    pub out_dir: PathBuf,
}

/// Image entries with a usable http(s) URL, in feed order.
/// The URL is the first of `hdurl`, `url` that is http(s).
pub fn select_downloadable(entries: &[Entry]) -> Vec<(&Entry, &str)> {
    entries
        .iter()
        .filter(|e| e.media_type.as_deref() == Some("image"))
        .filter_map(|e| {
            [e.hdurl.as_deref(), e.url.as_deref()]
                .into_iter()
                .flatten()
                .find(|u| RE_HTTP.is_match(u))
                .map(|u| (e, u))
        })
        .collect()
}

/// `<date>_<title><ext>` with the title reduced to safe characters
pub fn safe_filename(entry: &Entry, url: &str) -> String {
    let date = entry.date.as_deref().filter(|d| !d.is_empty()).unwrap_or("unknown");
    let title = entry.title.as_deref().filter(|t| !t.is_empty()).unwrap_or("apod");
    format!("{}_{}{}", date, safe_title(title), url_extension(url))
}

fn safe_title(title: &str) -> String {
    let stripped = RE_UNSAFE.replace_all(title, "");
    let underscored = RE_SPACE.replace_all(&stripped, "_");
    underscored.chars().take(TITLE_CHARS).collect()
}

/// Extension (with dot) of the last path segment, `.jpg` when there is none
fn url_extension(url: &str) -> String {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return DEFAULT_EXT.to_string();
    };
    let name = parsed.path().rsplit('/').next().unwrap_or("");
    match name.rfind('.') {
        Some(i) if i > 0 => name[i..].to_string(),
        _ => DEFAULT_EXT.to_string(),
    }
}

/// Fetch the feed and download up to `cap` images into `out_dir`.
///
/// Fails only when the directory cannot be created or the feed cannot be
/// fetched or parsed as an array.
pub fn run<F, D>(source: &F, fetcher: &D, out_dir: &Path, cap: usize) -> Result<Report>
where
    F: FeedSource + ?Sized,
    D: FileFetcher + ?Sized,
{
    std::fs::create_dir_all(out_dir)?;

    let entries = match source.fetch()? {
        Feed::Entries(entries) => entries,
        Feed::NotAnArray => return Err(ApodError::NotAnArray),
    };

    let candidates = select_downloadable(&entries);
    info!(
        found = candidates.len(),
        cap,
        "Found {} image entries; will download up to {}",
        candidates.len(),
        cap
    );

    let mut report = Report {
        downloaded: 0,
        attempted: 0,
        candidates: candidates.len(),
        out_dir: out_dir.to_path_buf(),
    };

    for (entry, url) in candidates {
        if report.downloaded >= cap {
            break;
        }
        let dest = out_dir.join(safe_filename(entry, url));
        report.attempted += 1;
        info!(url, dest = %dest.display(), "Downloading ({})", report.downloaded + 1);

        match fetcher.download_to(url, &dest) {
            Ok(bytes) => {
                debug!(bytes, dest = %dest.display(), "Download complete");
                report.downloaded += 1;
            }
            Err(e) => {
                warn!(url, error = %e, "Failed to download");
                if dest.exists() {
                    if let Err(e) = std::fs::remove_file(&dest) {
                        debug!(error = %e, dest = %dest.display(), "Failed to remove partial file");
                    }
                }
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::tempdir;

    struct StaticFeed(RefCell<Option<Result<Feed>>>);

    impl StaticFeed {
        fn entries(entries: Vec<Entry>) -> Self {
            Self(RefCell::new(Some(Ok(Feed::Entries(entries)))))
        }
        fn failing(err: ApodError) -> Self {
            Self(RefCell::new(Some(Err(err))))
        }
        fn not_array() -> Self {
            Self(RefCell::new(Some(Ok(Feed::NotAnArray))))
        }
    }

    impl FeedSource for StaticFeed {
        fn fetch(&self) -> Result<Feed> {
            self.0.borrow_mut().take().expect("feed fetched twice")
        }
    }

    /// Writes the URL into the file; URLs containing "unreachable" fail
    /// after leaving a partial file behind.
    #[derive(Default)]
    struct FakeFetcher {
        requested: RefCell<Vec<String>>,
    }

    impl FileFetcher for FakeFetcher {
        fn download_to(&self, url: &str, dest: &Path) -> Result<u64> {
            self.requested.borrow_mut().push(url.to_string());
            std::fs::write(dest, url.as_bytes())?;
            if url.contains("unreachable") {
                return Err(ApodError::Download(format!("connection refused for {url}")));
            }
            Ok(url.len() as u64)
        }
    }

    fn image(date: &str, url: &str) -> Entry {
        Entry {
            date: Some(date.into()),
            title: Some(format!("Image {date}")),
            media_type: Some("image".into()),
            url: Some(url.into()),
            ..Default::default()
        }
    }

    fn video(date: &str) -> Entry {
        Entry {
            date: Some(date.into()),
            media_type: Some("video".into()),
            url: Some(format!("https://youtube.com/embed/{date}")),
            ..Default::default()
        }
    }

    fn file_count(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn downloads_cap_and_skips_videos() {
        let mut entries = Vec::new();
        for i in 1..=8 {
            if i % 3 == 1 {
                entries.push(video(&format!("2024-02-{i:02}")));
            }
            entries.push(image(&format!("2024-01-{i:02}"), &format!("https://x/{i}.jpg")));
        }
        assert_eq!(entries.iter().filter(|e| e.is_video()).count(), 3);

        let dir = tempdir().unwrap();
        let out = dir.path().join("apod");
        let fetcher = FakeFetcher::default();
        let report = run(&StaticFeed::entries(entries), &fetcher, &out, 6).unwrap();

        assert_eq!(report.downloaded, 6);
        assert_eq!(report.candidates, 8);
        assert_eq!(file_count(&out), 6);
        assert!(fetcher.requested.borrow().iter().all(|u| !u.contains("youtube")));
        assert_eq!(fetcher.requested.borrow()[0], "https://x/1.jpg");
    }

    #[test]
    fn failed_item_does_not_count() {
        let mut entries: Vec<Entry> = (1..=6)
            .map(|i| image(&format!("2024-01-{i:02}"), &format!("https://x/{i}.jpg")))
            .collect();
        entries[2].url = Some("https://unreachable.invalid/3.jpg".into());

        let dir = tempdir().unwrap();
        let fetcher = FakeFetcher::default();
        let report = run(&StaticFeed::entries(entries), &fetcher, dir.path(), 6).unwrap();

        assert_eq!(report.downloaded, 5);
        assert_eq!(report.attempted, 6);
        // Partial file from the failed item is removed
        assert_eq!(file_count(dir.path()), 5);
    }

    #[test]
    fn failure_is_replaced_by_next_candidate() {
        let mut entries: Vec<Entry> = (1..=8)
            .map(|i| image(&format!("2024-01-{i:02}"), &format!("https://x/{i}.jpg")))
            .collect();
        entries[0].url = Some("https://unreachable.invalid/1.jpg".into());

        let dir = tempdir().unwrap();
        let fetcher = FakeFetcher::default();
        let report = run(&StaticFeed::entries(entries), &fetcher, dir.path(), 6).unwrap();

        assert_eq!(report.downloaded, 6);
        assert_eq!(report.attempted, 7);
    }

    #[test]
    fn feed_errors_abort_the_run() {
        let dir = tempdir().unwrap();
        let fetcher = FakeFetcher::default();

        let err = run(
            &StaticFeed::failing(ApodError::Fetch("HTTP 404 Not Found".into())),
            &fetcher,
            dir.path(),
            6,
        )
        .unwrap_err();
        assert!(matches!(err, ApodError::Fetch(_)));

        let err = run(&StaticFeed::not_array(), &fetcher, dir.path(), 6).unwrap_err();
        assert!(matches!(err, ApodError::NotAnArray));
        assert!(fetcher.requested.borrow().is_empty());
    }

    #[test]
    fn selection_requires_explicit_image_and_http_url() {
        let mut untyped = image("2024-01-01", "https://x/a.jpg");
        untyped.media_type = None;
        let mut ftp_only = image("2024-01-02", "ftp://x/b.jpg");
        ftp_only.hdurl = None;
        let mut hd_ftp = image("2024-01-03", "HTTPS://x/c.jpg");
        hd_ftp.hdurl = Some("ftp://x/c-hd.jpg".into());
        let mut hd = image("2024-01-04", "https://x/d.jpg");
        hd.hdurl = Some("http://x/d-hd.png".into());
        let mut none = image("2024-01-05", "");
        none.url = None;

        let entries = vec![untyped, ftp_only, hd_ftp, hd, none];
        let picked: Vec<&str> = select_downloadable(&entries).into_iter().map(|(_, u)| u).collect();
        assert_eq!(picked, vec!["HTTPS://x/c.jpg", "http://x/d-hd.png"]);
    }

    #[test]
    fn filenames_are_sanitized() {
        let entry = Entry {
            date: Some("2024-03-05".into()),
            title: Some("M31: The Andromeda   Galaxy (wide-field) & friends!".into()),
            ..Default::default()
        };
        assert_eq!(
            safe_filename(&entry, "https://apod.nasa.gov/apod/image/2403/m31_big.png"),
            "2024-03-05_M31_The_Andromeda_Galaxy_wide-field_frie.png"
        );
    }

    #[test]
    fn filenames_are_ascii_only() {
        let entry = Entry {
            date: Some("2024-01-01".into()),
            title: Some("5000\u{212A} \u{017F}tar \u{e9}".into()),
            ..Default::default()
        };
        let name = safe_filename(&entry, "https://x/a");
        assert_eq!(name, "2024-01-01_5000_tar_.jpg");
        assert!(name.is_ascii());
    }

    #[test]
    fn filename_fallbacks() {
        let entry = Entry::default();
        assert_eq!(safe_filename(&entry, "https://x/path/noext"), "unknown_apod.jpg");
        assert_eq!(safe_filename(&entry, "https://x/.hidden"), "unknown_apod.jpg");
        assert_eq!(safe_filename(&entry, "https://x/a.b/c.jpeg?size=hd"), "unknown_apod.jpeg");
        assert_eq!(safe_filename(&entry, "not a url"), "unknown_apod.jpg");
    }
}
