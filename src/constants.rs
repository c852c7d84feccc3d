//! Application constants and configuration

pub const APOD_DATA_URL: &str = "https://cdn.jsdelivr.net/gh/GCA-Classroom/apod/data.json";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "APOD Gallery";

/// Maximum number of cards rendered in the gallery grid (3x3)
pub const DISPLAY_CAP: usize = 9;

/// Caption length on gallery cards before truncation
pub const CAPTION_CHARS: usize = 140;

/// Number of successful downloads the batch downloader stops at
pub const MAX_DOWNLOAD: usize = 6;

/// Output directory of the batch downloader, relative to the working directory
pub const DOWNLOAD_DIR: &str = "img/apod";

/// Concurrent card image fetches in the gallery
pub const IMAGE_FETCH_PERMITS: usize = 4;

pub const LOAD_ERROR_MESSAGE: &str = "Sorry, could not load images. Try again later.";
pub const EMPTY_MESSAGE: &str = "No images found.";

pub const SPACE_FACTS: [&str; 8] = [
    "A day on Venus is longer than a year on Venus. It rotates very slowly.",
    "There are more stars in the observable universe than grains of sand on all Earth's beaches.",
    "Neutron stars can spin hundreds of times per second and are so dense a teaspoon would weigh billions of tons.",
    "A spoonful of a white dwarf would weigh about a million tons on Earth.",
    "Saturn could float in water because it's mostly made of gas and is less dense than water.",
    "Jupiter's Great Red Spot is a storm larger than Earth that has been raging for centuries.",
    "Space is not completely empty. It contains tiny amounts of gas, dust, and cosmic rays.",
    "The footprints left on the Moon will likely remain for millions of years because there is no wind to erase them.",
];
