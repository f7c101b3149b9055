use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use thiserror::Error;

use crate::ffmpeg::Tools;
use crate::media::{AudioTrack, MediaInfo, TimecodeError, clean_duration, parse_seconds};

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe output is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("stream {index} is missing `{field}`")]
    MissingField { index: u32, field: &'static str },
    #[error("invalid frame rate: `{0}`")]
    FrameRate(String),
    #[error(transparent)]
    Timecode(#[from] TimecodeError),
}

#[derive(Debug, Deserialize)]
struct ProbeDoc {
    format: ProbeFormat,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    filename: String,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    index: u32,
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
    pix_fmt: Option<String>,
    color_space: Option<String>,
    #[serde(default)]
    tags: ProbeTags,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeTags {
    #[serde(rename = "DURATION")]
    duration: Option<String>,
}

/// Runs ffprobe over `path` and folds its stream list into a `MediaInfo`.
pub fn probe_media(tools: &Tools, path: &Path) -> Result<MediaInfo> {
    let out = Command::new(&tools.ffprobe)
        .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
        .arg(path)
        .output()
        .context("failed to run ffprobe")?;
    if !out.status.success() {
        bail!("ffprobe error (status {})", out.status);
    }
    let raw = String::from_utf8_lossy(&out.stdout);
    Ok(parse_probe_output(&raw)?)
}

/// The pure half of the probe, separated so fixture text can drive it.
pub fn parse_probe_output(raw: &str) -> Result<MediaInfo, ProbeError> {
    let doc: ProbeDoc = serde_json::from_str(raw)?;
    let mut info = MediaInfo::new(doc.format.filename);

    for stream in &doc.streams {
        match stream.codec_type.as_str() {
            // Every video-typed entry overwrites the previous one; the last
            // stream in the list wins.
            "video" => apply_video_stream(&mut info, stream)?,
            "audio" => info.audio_tracks.push(AudioTrack {
                index: stream.index,
                codec: stream
                    .codec_name
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
            }),
            _ => {}
        }
    }
    Ok(info)
}

fn apply_video_stream(info: &mut MediaInfo, stream: &ProbeStream) -> Result<(), ProbeError> {
    let missing = |field| ProbeError::MissingField { index: stream.index, field };

    info.video_track = stream.index;
    info.width = stream.width.ok_or_else(|| missing("width"))?;
    info.height = stream.height.ok_or_else(|| missing("height"))?;
    info.pixel_format = stream.pix_fmt.clone();
    info.color_space = stream.color_space.clone();

    // Only the numerator of "N/D" is read; the denominator is ignored.
    let rate = stream
        .r_frame_rate
        .as_deref()
        .ok_or_else(|| missing("r_frame_rate"))?;
    info.fps = rate
        .split('/')
        .next()
        .unwrap_or(rate)
        .parse()
        .map_err(|_| ProbeError::FrameRate(rate.to_string()))?;

    // Per-stream duration field first, container tag as fallback.
    let raw = stream.duration.as_deref().or(stream.tags.duration.as_deref());
    if let Some(raw) = raw {
        info.duration = parse_seconds(clean_duration(raw))?;
    }
    Ok(())
}
