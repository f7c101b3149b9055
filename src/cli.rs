use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueHint};

/// Interactive remux/convert assistant: probes the input, walks a few
/// keystroke prompts, then builds and supervises the ffmpeg invocation.
#[derive(Parser, Debug)]
#[command(
    name = "video_converter",
    version,
    about = "Interactive remux/convert assistant for a single media file"
)]
pub struct Cli {
    /// Input media file (prompted for when omitted)
    #[arg(value_hint = ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    /// Encode with NVENC instead of libx264
    #[arg(long, action = ArgAction::SetTrue)]
    pub hwaccel: bool,

    /// Path to ffmpeg binary (overrides PATH lookup)
    #[arg(long, value_hint = ValueHint::ExecutablePath)]
    pub ffmpeg: Option<PathBuf>,

    /// Path to ffprobe binary (overrides PATH lookup)
    #[arg(long, value_hint = ValueHint::ExecutablePath)]
    pub ffprobe: Option<PathBuf>,
}
