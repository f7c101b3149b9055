use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"];

pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// A numbered frame sequence detected from one of its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSequence {
    /// printf-style input pattern, e.g. `/shots/frame_%04d.png`.
    pub pattern: String,
    pub start: u32,
    pub frame_count: u32,
}

fn split_stem<'a>(re: &Regex, stem: &'a str) -> Option<(&'a str, &'a str)> {
    let caps = re.captures(stem)?;
    Some((caps.get(1).unwrap().as_str(), caps.get(2).unwrap().as_str()))
}

/// Counts the contiguous run of same-prefix files starting at `path`'s own
/// number. A gap ends the sequence even when higher numbers exist on disk.
pub fn scan_sequence(path: &Path) -> Result<Option<ImageSequence>> {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return Ok(None);
    };
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();

    let re = Regex::new(r"^(.*?)(\d+)$").unwrap();
    let Some((prefix, digits)) = split_stem(&re, stem) else {
        return Ok(None);
    };
    let start: u32 = digits.parse().context("sequence number out of range")?;

    let dir = path.parent().unwrap_or(Path::new("."));
    let mut numbers = HashSet::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("cannot read {}", dir.display()))?
    {
        let name = entry?.file_name();
        let Some(name) = name.to_str() else { continue };
        let candidate = Path::new(name);
        let same_ext = candidate
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext));
        if !same_ext {
            continue;
        }
        let Some(candidate_stem) = candidate.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if let Some((candidate_prefix, candidate_digits)) = split_stem(&re, candidate_stem)
            && candidate_prefix == prefix
            && let Ok(number) = candidate_digits.parse::<u32>()
        {
            numbers.insert(number);
        }
    }

    let mut last = start;
    while numbers.contains(&(last + 1)) {
        last += 1;
    }

    let pattern = dir
        .join(format!("{prefix}%0{}d.{ext}", digits.len()))
        .display()
        .to_string();
    Ok(Some(ImageSequence {
        pattern,
        start,
        frame_count: last - start + 1,
    }))
}
