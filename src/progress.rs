use std::io::{BufReader, Read};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

/// Decides whether a completed diagnostic line means the run failed.
///
/// The default is a bare substring scan. It misfires on lines that merely
/// mention an "error"-containing path, and stays a pluggable predicate for
/// that reason.
pub type FailureClassifier = Box<dyn Fn(&str) -> bool + Send>;

pub fn substring_classifier(needle: &'static str) -> FailureClassifier {
    Box::new(move |line| line.to_ascii_lowercase().contains(needle))
}

/// Incremental parser for ffmpeg's diagnostic stream. Progress updates end
/// in `\r` and overwrite in place, so input arrives one byte at a time with
/// no line buffering assumed.
pub struct ProgressMonitor {
    total_frames: u64,
    line: String,
    failed: bool,
    classifier: FailureClassifier,
}

impl ProgressMonitor {
    pub fn new(total_frames: u64) -> Self {
        Self {
            total_frames,
            line: String::new(),
            failed: false,
            classifier: substring_classifier("error"),
        }
    }

    pub fn with_classifier(mut self, classifier: FailureClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Feeds one byte; returns a fresh percentage when a `\r` progress
    /// update carrying a frame counter completes.
    pub fn feed(&mut self, byte: u8) -> Option<u64> {
        match byte {
            b'\n' => {
                if (self.classifier)(&self.line) {
                    self.failed = true;
                }
                self.line.clear();
                None
            }
            b'\r' => {
                let percent = self.percent_from_line();
                self.line.clear();
                percent
            }
            other => {
                self.line.push(char::from(other));
                None
            }
        }
    }

    fn percent_from_line(&self) -> Option<u64> {
        let at = self.line.find("frame=")?;
        let after = &self.line[at + "frame=".len()..];
        let frame_text = match after.find('f') {
            Some(end) => &after[..end],
            None => after,
        };
        let frame: u64 = frame_text.trim().parse().ok()?;
        if self.total_frames == 0 {
            return None;
        }
        Some(frame * 100 / self.total_frames)
    }
}

pub struct MonitorUi {
    bar: ProgressBar,
}

impl MonitorUi {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template(
                "[{elapsed_precise}]  [{bar:60.cyan/bright-black}] {percent:>3}%  {msg}",
            )
            .unwrap()
            .progress_chars("#>-"),
        );
        Self { bar }
    }

    fn set_percent(&self, percent: u64) {
        self.bar.set_position(percent.min(100));
    }

    fn finish(&self, failed: bool) {
        if failed {
            self.bar.abandon_with_message("transcode reported errors");
        } else {
            self.bar.finish_with_message("done");
        }
    }
}

/// Reads the stream to end-of-input, driving the bar; the caller then waits
/// for the child process itself.
pub fn pump<R: Read>(reader: R, monitor: &mut ProgressMonitor, ui: &MonitorUi) -> Result<()> {
    let reader = BufReader::new(reader);
    for byte in reader.bytes() {
        if let Some(percent) = monitor.feed(byte?) {
            ui.set_percent(percent);
        }
    }
    ui.finish(monitor.failed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_text(monitor: &mut ProgressMonitor, text: &str) -> Vec<u64> {
        text.bytes().filter_map(|b| monitor.feed(b)).collect()
    }

    #[test]
    fn test_frame_update_computes_percent() {
        let mut monitor = ProgressMonitor::new(100);
        let updates = feed_text(&mut monitor, "frame=   50 fps= 30 q=28.0 size=512KiB\r");
        assert_eq!(updates, vec![50]);
        assert!(!monitor.failed());
    }

    #[test]
    fn test_integer_division_percent() {
        let mut monitor = ProgressMonitor::new(3);
        let updates = feed_text(&mut monitor, "frame=2 fps=1\r");
        assert_eq!(updates, vec![66]);
    }

    #[test]
    fn test_zero_total_frames_never_divides() {
        let mut monitor = ProgressMonitor::new(0);
        let updates = feed_text(&mut monitor, "frame=  50 fps= 30\r");
        assert!(updates.is_empty());
    }

    #[test]
    fn test_buffer_resets_between_updates() {
        let mut monitor = ProgressMonitor::new(200);
        let updates = feed_text(
            &mut monitor,
            "frame=   50 fps=30\rframe=  100 fps=30\rframe=  200 fps=30\r",
        );
        assert_eq!(updates, vec![25, 50, 100]);
    }

    #[test]
    fn test_newline_lines_do_not_report_progress() {
        let mut monitor = ProgressMonitor::new(100);
        let updates = feed_text(&mut monitor, "frame= 50 fps=30\n");
        assert!(updates.is_empty());
    }

    #[test]
    fn test_error_line_sets_flag() {
        let mut monitor = ProgressMonitor::new(100);
        feed_text(&mut monitor, "[matroska @ 0x55] Error writing trailer\n");
        assert!(monitor.failed());

        let mut monitor = ProgressMonitor::new(100);
        feed_text(&mut monitor, "Press [q] to stop\nframe=  10 fps=30\r");
        assert!(!monitor.failed());
    }

    #[test]
    fn test_classifier_is_replaceable() {
        let mut monitor =
            ProgressMonitor::new(100).with_classifier(substring_classifier("conversion failed"));
        feed_text(&mut monitor, "some error text\n");
        assert!(!monitor.failed());
        feed_text(&mut monitor, "Conversion failed!\n");
        assert!(monitor.failed());
    }

    #[test]
    fn test_carriage_return_without_frame_token() {
        let mut monitor = ProgressMonitor::new(100);
        let updates = feed_text(&mut monitor, "size=  1024KiB time=00:00:10\r");
        assert!(updates.is_empty());
    }
}
