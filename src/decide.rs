use std::path::PathBuf;

use anyhow::Result;

use crate::args::ArgList;
use crate::curves;
use crate::media::{MediaInfo, parse_seconds};
use crate::tui::{PromptKey, Prompter};

// Total output bit budgets for the size tiers. Not derived from the tier
// labels; do not recompute them.
const CAP_FULL_BITS: u64 = 400_000_000;
const CAP_HALF_BITS: u64 = 200_000_000;
const CAP_FIFTH_BITS: u64 = 80_000_000;
const CAP_8MB_BITS: u64 = 64_000_000;

const VIBRANCE_INTENSITY: f64 = 0.35;

/// Walks the fixed tree of session decisions, appending argument fragments
/// and rewriting the descriptor's duration, fps and suffix as it goes.
///
/// The step order inside the convert branch is load-bearing: later steps
/// read the duration and suffix earlier steps wrote, and the single `-vf`
/// fragment must land after every per-step flag.
pub struct DecisionEngine<'a> {
    media: &'a mut MediaInfo,
    args: &'a mut ArgList,
    prompter: &'a mut dyn Prompter,
    hwaccel: bool,
    data_dir: PathBuf,
    filters: Vec<String>,
}

impl<'a> DecisionEngine<'a> {
    pub fn new(
        media: &'a mut MediaInfo,
        args: &'a mut ArgList,
        prompter: &'a mut dyn Prompter,
        hwaccel: bool,
        data_dir: PathBuf,
    ) -> Self {
        Self {
            media,
            args,
            prompter,
            hwaccel,
            data_dir,
            filters: Vec::new(),
        }
    }

    pub fn run(mut self) -> Result<()> {
        match self.prompter.key("Remux (R) or Convert (C)? [C]: ")? {
            PromptKey::Char('r') => self.remux()?,
            PromptKey::Char('c') | PromptKey::Enter => self.convert()?,
            _ => {}
        }
        Ok(())
    }

    fn remux(&mut self) -> Result<()> {
        self.args.push("-c copy");
        self.media.set_suffix(".remux");

        let tracks = self.media.audio_tracks.len();
        if tracks > 1 {
            let answer = self
                .prompter
                .line(&format!("Map All (A) or Audio Track [1-{tracks}]: "))?;
            let answer = answer.trim().to_string();
            if answer.eq_ignore_ascii_case("a") {
                self.args.push("-map 0");
                self.media.push_suffix("Mapped");
            } else if let Ok(track) = answer.parse::<usize>()
                && (1..=tracks).contains(&track)
            {
                self.push_track_map(track);
                self.media.push_suffix(&format!("-a{track}"));
            }
        }
        Ok(())
    }

    fn convert(&mut self) -> Result<()> {
        self.media.set_suffix(".conv");
        self.push_codecs();
        self.choose_audio()?;
        self.cut_or_speed()?;
        self.choose_crop()?;
        self.choose_bitrate_cap()?;
        self.choose_quality()?;
        self.choose_color_boost()?;
        if !self.filters.is_empty() {
            self.args.push(format!("-vf \"{}\"", self.filters.join(",")));
        }
        Ok(())
    }

    fn push_codecs(&mut self) {
        if self.hwaccel {
            self.args.push("-c:v h264_nvenc");
        } else {
            self.args.push("-c:v libx264");
        }
        self.args.push("-c:a aac -ac 2");
    }

    fn push_track_map(&mut self, track: usize) {
        self.args.push(format!("-map 0:v:{}", self.media.video_track));
        self.args.push(format!("-map 0:a:{}", track - 1));
    }

    fn choose_audio(&mut self) -> Result<()> {
        match self.media.audio_tracks.len() {
            0 => {}
            1 => {
                if self.yes("Mute Audio? (Y/N) [N]: ")? {
                    self.args.push("-an");
                }
            }
            tracks => {
                let answer = self
                    .prompter
                    .line(&format!("Audio Track [1-{tracks}] or Mute (M): "))?;
                let answer = answer.trim().to_string();
                if answer.eq_ignore_ascii_case("m") {
                    self.args.push("-an");
                } else if let Ok(track) = answer.parse::<usize>()
                    && (1..=tracks).contains(&track)
                {
                    self.push_track_map(track);
                }
            }
        }
        Ok(())
    }

    // Cut and speed are mutually exclusive in one pass; both rewrite the
    // duration the following steps read.
    fn cut_or_speed(&mut self) -> Result<()> {
        if self.yes("Cut Video? (Y/N) [N]: ")? {
            self.cut()
        } else if self.yes("Change Speed? (Y/N) [N]: ")? {
            self.speed()
        } else {
            Ok(())
        }
    }

    fn cut(&mut self) -> Result<()> {
        let raw_start = self.prompter.line("Start Time: ")?;
        let raw_start = raw_start.trim().to_string();
        // Empty or unreadable start means the top of the file.
        let (start_text, start_s) = match parse_seconds(&raw_start) {
            Ok(seconds) => (raw_start, seconds),
            Err(_) => ("0".to_string(), 0.0),
        };
        self.args.push(format!("-ss {start_text}"));

        let raw_end = self.prompter.line("End Time: ")?;
        let raw_end = raw_end.trim().to_string();
        // Empty or unreadable end means "to end of file": no trim flag.
        match parse_seconds(&raw_end) {
            Ok(end_s) => {
                self.args.push(format!("-to {raw_end}"));
                self.media.duration = end_s - start_s;
            }
            Err(_) => {
                self.media.duration -= start_s;
            }
        }
        self.media.set_suffix(".cut");
        Ok(())
    }

    fn speed(&mut self) -> Result<()> {
        let raw = self.prompter.line("Speed Multiplier [1]: ")?;
        let multiplier: f64 = raw.trim().parse().unwrap_or(1.0);
        let multiplier = if multiplier > 0.0 { multiplier } else { 1.0 };

        let default_fps = f64::from(self.media.fps) * multiplier;
        let raw_fps = self.prompter.line(&format!("Output FPS [{default_fps}]: "))?;
        // The fps field only changes when an explicit rate is given.
        let out_fps = match raw_fps.trim().parse::<u32>() {
            Ok(explicit) if explicit > 0 => {
                self.media.fps = explicit;
                f64::from(explicit)
            }
            _ => default_fps,
        };

        self.filters.push(format!("setpts=PTS/{multiplier}"));
        self.filters.push(format!("fps={out_fps}"));
        self.args.push(format!("-af atempo={multiplier}"));
        self.media.duration /= multiplier;
        self.media.set_suffix(&format!(".{multiplier}x"));
        Ok(())
    }

    fn choose_crop(&mut self) -> Result<()> {
        match self.prompter.key("Crop? Square (S) / 4:3 (F) / None [N]: ")? {
            PromptKey::Char('s') => {
                let h = self.media.height;
                self.filters.push(format!("crop={h}:{h}"));
                self.media.push_suffix(".sqr");
            }
            PromptKey::Char('f') => {
                let h = self.media.height;
                self.filters.push(format!("crop={}:{h}", h * 4 / 3));
                self.media.push_suffix(".4x3");
            }
            _ => {}
        }
        Ok(())
    }

    fn choose_bitrate_cap(&mut self) -> Result<()> {
        let bits = match self
            .prompter
            .key("Bitrate Cap: 50MB (1) / 25MB (2) / 10MB (3) / 8MB (4) / None [N]: ")?
        {
            PromptKey::Char('1') => CAP_FULL_BITS,
            PromptKey::Char('2') => CAP_HALF_BITS,
            PromptKey::Char('3') => CAP_FIFTH_BITS,
            PromptKey::Char('4') => CAP_8MB_BITS,
            _ => return Ok(()),
        };
        let rate = bits / (self.media.duration.ceil().max(1.0) as u64);
        self.args.push(format!("-maxrate {rate}"));
        self.args.push(format!("-bufsize {rate}"));
        Ok(())
    }

    fn choose_quality(&mut self) -> Result<()> {
        if self.hwaccel {
            self.args.push("-preset p5 -rc vbr -cq 21");
            return Ok(());
        }
        let preset = match self
            .prompter
            .key("Quality: Fast (F) / Medium (M) / Slow (S) / Veryslow (V) [M]: ")?
        {
            PromptKey::Char('f') => "fast",
            PromptKey::Char('s') => "slow",
            PromptKey::Char('v') => "veryslow",
            _ => "medium",
        };
        self.args.push(format!("-preset {preset}"));
        Ok(())
    }

    fn choose_color_boost(&mut self) -> Result<()> {
        if !self.yes("Boost Colors? (Y/N) [N]: ")? {
            return Ok(());
        }
        let curves_path = curves::ensure_curves_file(&self.data_dir)?;
        self.filters
            .push(format!("vibrance=intensity={VIBRANCE_INTENSITY}"));
        self.filters.push(format!(
            "curves=psfile='{}'",
            curves::escape_filter_path(&curves_path)
        ));
        // Carry the probed pixel format and color space through so the
        // filtered output keeps them.
        if let Some(pix_fmt) = self.media.pixel_format.clone() {
            self.args.push(format!("-pix_fmt {pix_fmt}"));
        }
        if let Some(color_space) = self.media.color_space.clone() {
            self.args.push(format!("-colorspace {color_space}"));
        }
        self.media.push_suffix(".vibrant");
        Ok(())
    }

    fn yes(&mut self, message: &str) -> Result<bool> {
        Ok(matches!(
            self.prompter.key(message)?,
            PromptKey::Char('y')
        ))
    }
}
