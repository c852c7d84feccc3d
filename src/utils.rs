//! Utility functions

use crate::constants::APP_NAME;
use std::path::PathBuf;

// Telescope over a starfield, with stroke - for sidebar logo (large display)
pub const LOGO_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 240 160"><defs><style>.c1{fill:#fff;stroke:#09090b;stroke-width:1px}.c2{fill:#818cf8;stroke:#09090b;stroke-width:1px}</style></defs><circle class="c2" cx="120" cy="80" r="58"/><path class="c1" d="M62 112 L168 54 L178 72 L72 130 Z"/><path class="c1" d="M112 104 L92 156 L102 156 L120 112 L138 156 L148 156 L128 104 Z"/><circle class="c1" cx="24" cy="28" r="5"/><circle class="c1" cx="214" cy="22" r="4"/><circle class="c1" cx="206" cy="132" r="6"/><circle class="c1" cx="34" cy="120" r="3"/></svg>"##;

// No stroke, square viewBox - for window/taskbar icons
pub const ICON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 240 240"><defs><style>.c1{fill:#fff}.c2{fill:#818cf8}</style></defs><g transform="translate(0,40)"><circle class="c2" cx="120" cy="80" r="58"/><path class="c1" d="M62 112 L168 54 L178 72 L72 130 Z"/><path class="c1" d="M112 104 L92 156 L102 156 L120 112 L138 156 L148 156 L128 104 Z"/></g></svg>"##;

/// Rasterize the logo SVG at the given width, preserving aspect ratio.
pub fn rasterize_logo(width: u32) -> Option<(Vec<u8>, u32, u32)> {
    let tree = resvg::usvg::Tree::from_str(LOGO_SVG, &resvg::usvg::Options::default()).ok()?;
    let svg_size = tree.size();
    let scale = width as f32 / svg_size.width();
    let height = (svg_size.height() * scale).ceil() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)?;
    resvg::render(
        &tree,
        resvg::usvg::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Some((premul_to_straight(&pixmap), width, height))
}

/// Rasterize the icon SVG to a square image (for window/taskbar icons).
pub fn rasterize_logo_square(size: u32) -> Option<(Vec<u8>, u32, u32)> {
    let tree = resvg::usvg::Tree::from_str(ICON_SVG, &resvg::usvg::Options::default()).ok()?;
    let scale = size as f32 / tree.size().width();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size, size)?;
    resvg::render(
        &tree,
        resvg::usvg::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Some((premul_to_straight(&pixmap), size, size))
}

fn premul_to_straight(pixmap: &resvg::tiny_skia::Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let a = p.alpha();
            if a == 0 {
                [0, 0, 0, 0]
            } else {
                let r = (p.red() as u16 * 255 / a as u16) as u8;
                let g = (p.green() as u16 * 255 / a as u16) as u8;
                let b = (p.blue() as u16 * 255 / a as u16) as u8;
                [r, g, b, a]
            }
        })
        .collect()
}

/// Per-user application data directory (settings, logs)
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the cache directory path
pub fn get_cache_dir() -> PathBuf {
    get_data_dir().join("cache")
}

/// Shorten text to `max` characters, appending an ellipsis when cut
pub fn truncate_caption(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}
