//! fetch-apod - download a few APOD images into img/apod

use apod_gallery::constants::{DOWNLOAD_DIR, MAX_DOWNLOAD};
use apod_gallery::downloader::{self, HttpFetcher};
use apod_gallery::feed::HttpFeed;
use mimalloc::MiMalloc;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,apod_gallery=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() -> ExitCode {
    init_logging();

    let out_dir = PathBuf::from(DOWNLOAD_DIR);

    let result = HttpFeed::apod().and_then(|feed| {
        info!(url = feed.url(), "Fetching APOD JSON");
        let fetcher = HttpFetcher::new()?;
        downloader::run(&feed, &fetcher, &out_dir, MAX_DOWNLOAD)
    });

    match result {
        Ok(report) => {
            info!(
                downloaded = report.downloaded,
                attempted = report.attempted,
                candidates = report.candidates,
                "Batch finished"
            );
            println!(
                "Done. Downloaded {} files into {}",
                report.downloaded,
                report.out_dir.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Failed to fetch JSON");
            ExitCode::FAILURE
        }
    }
}
