//! Font registration for chart text.
//!
//! Plotters draws text only with fonts registered at runtime. The first call
//! registers one TrueType file as `sans-serif`; if none can be loaded, charts
//! are drawn without captions or labels.

use crate::config::ChartSettings;
use plotters::style::{FontStyle, register_font};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const FONT_FAMILY: &str = "sans-serif";

const SYSTEM_FONTS: [&str; 9] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static TEXT_AVAILABLE: OnceLock<bool> = OnceLock::new();

/// Registers the chart font once; returns whether text can be drawn.
pub fn ensure_registered(settings: &ChartSettings) -> bool {
    *TEXT_AVAILABLE.get_or_init(|| {
        let candidates: Vec<PathBuf> = settings
            .font_path
            .iter()
            .cloned()
            .chain(SYSTEM_FONTS.iter().map(PathBuf::from))
            .collect();

        for path in candidates {
            if register(&path) {
                tracing::debug!(font = %path.display(), "Registered chart font");
                return true;
            }
        }
        tracing::warn!("No usable TrueType font found; charts will be drawn without text");
        false
    })
}

fn register(path: &Path) -> bool {
    let Ok(bytes) = std::fs::read(path) else {
        return false;
    };
    // Registered fonts live for the whole process.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
        Ok(()) => true,
        Err(_) => {
            tracing::debug!(font = %path.display(), "Font file could not be parsed");
            false
        }
    }
}
