use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// One audio stream as enumerated by the probe, in stream order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioTrack {
    pub index: u32,
    pub codec: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid timecode: `{0}`")]
pub struct TimecodeError(pub String);

/// Everything the session knows about the input.
///
/// `duration`, `fps` and `suffix` are rewritten while decisions are made;
/// anything derived from them (`total_frames`, `output_path`) is recomputed
/// on every read, never cached.
#[derive(Debug, Clone)]
pub struct MediaInfo {
    path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub duration: f64,
    pub pixel_format: Option<String>,
    pub color_space: Option<String>,
    pub video_track: u32,
    pub audio_tracks: Vec<AudioTrack>,
    suffix: String,
}

impl MediaInfo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            width: 0,
            height: 0,
            fps: 0,
            duration: 0.0,
            pixel_format: None,
            color_space: None,
            video_track: 0,
            audio_tracks: Vec::new(),
            suffix: String::new(),
        }
    }

    /// Descriptor for a numbered image sequence; there is nothing to probe.
    pub fn for_sequence(path: impl Into<PathBuf>, fps: u32, frame_count: u32) -> Self {
        let mut info = Self::new(path);
        info.fps = fps;
        info.duration = f64::from(frame_count) / f64::from(fps);
        info
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn total_frames(&self) -> u64 {
        (self.duration * f64::from(self.fps)).floor() as u64
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn set_suffix(&mut self, suffix: &str) {
        self.suffix = suffix.to_string();
    }

    pub fn push_suffix(&mut self, tag: &str) {
        self.suffix.push_str(tag);
    }

    /// Output lands next to the input, suffix inserted before a fixed `.mp4`
    /// extension.
    pub fn output_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or("output");
        let parent = self.path.parent().unwrap_or(Path::new("."));
        parent.join(format!("{stem}{}.mp4", self.suffix))
    }

    /// Canonical ratio label when width/height lands within 0.01 of a known
    /// ratio, else `"{ratio:.2}:1"`. Absent without video dimensions.
    pub fn aspect_label(&self) -> Option<String> {
        if self.height == 0 {
            return None;
        }
        let ratio = f64::from(self.width) / f64::from(self.height);
        for (value, label) in [(1.78, "16:9"), (1.60, "16:10"), (1.33, "4:3")] {
            if (ratio - value).abs() < 0.01 {
                return Some(label.to_string());
            }
        }
        Some(format!("{ratio:.2}:1"))
    }
}

/// Strips the trailing-zero noise ffprobe puts on duration strings
/// (`"12.340000"` -> `"12.34"`, `"5."` -> `"5"`).
pub fn clean_duration(raw: &str) -> &str {
    raw.trim_end_matches('0').trim_end_matches('.')
}

/// Parses `[h:]m:s[.frac]` timecodes or bare floating-point seconds, picked
/// by the presence of a colon.
pub fn parse_seconds(value: &str) -> Result<f64, TimecodeError> {
    let value = value.trim();
    if !value.contains(':') {
        return value
            .parse()
            .map_err(|_| TimecodeError(value.to_string()));
    }
    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() > 3 {
        return Err(TimecodeError(value.to_string()));
    }
    let mut seconds = 0.0;
    for part in parts {
        let field: f64 = part
            .parse()
            .map_err(|_| TimecodeError(value.to_string()))?;
        seconds = seconds * 60.0 + field;
    }
    Ok(seconds)
}
