use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Photoshop curves preset applied by the color-boost step: a gentle S on
/// the composite channel, identity on the four channel curves. Big-endian
/// u16 layout: version, curve count, then per curve a point count followed
/// by (output, input) pairs.
pub const CURVES_PRESET: [u8; 58] = [
    0x00, 0x04, // version
    0x00, 0x05, // curve count
    0x00, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x88, 0x00, 0x78, 0x00, 0xFF, 0x00, 0xFF,
    0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x00, 0xFF,
    0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x00, 0xFF,
    0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x00, 0xFF,
    0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x00, 0xFF,
];

pub const CURVES_FILE_NAME: &str = "vibrant.acv";

/// Where the preset lives between sessions.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("video_converter")
}

/// Writes the preset once; an existing file is left untouched.
pub fn ensure_curves_file(dir: &Path) -> Result<PathBuf> {
    let path = dir.join(CURVES_FILE_NAME);
    if !path.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create {}", dir.display()))?;
        fs::write(&path, CURVES_PRESET)
            .with_context(|| format!("cannot write {}", path.display()))?;
    }
    Ok(path)
}

/// Escapes a path for a single-quoted filter option; `:` separates filter
/// options and `\` is the graph escape character.
pub fn escape_filter_path(path: &Path) -> String {
    path.display()
        .to_string()
        .replace('\\', "/")
        .replace(':', "\\:")
}
