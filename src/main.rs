mod args;
mod cli;
mod curves;
mod decide;
mod ffmpeg;
mod media;
mod probe;
mod progress;
mod sequence;
mod tui;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::args::ArgList;
use crate::cli::Cli;
use crate::decide::DecisionEngine;
use crate::media::MediaInfo;
use crate::progress::{MonitorUi, ProgressMonitor, pump};
use crate::tui::{ConsolePrompter, Prompter, pause, prompt_input_path, write_separator};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            let _ = pause("Press Enter to exit...");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let tools = ffmpeg::resolve_tools(cli.ffmpeg, cli.ffprobe)?;

    let input = match cli.input {
        Some(path) if path.exists() => path,
        Some(path) => bail!("input not found: {}", path.display()),
        None => prompt_input_path()?,
    };

    let mut args = ArgList::new();
    let mut prompter = ConsolePrompter::new(&input);

    let mut media = if sequence::is_image_path(&input) {
        synthesize_sequence(&input, &mut args, &mut prompter)?
    } else {
        let media = probe::probe_media(&tools, &input)?;
        args.push(format!("-i \"{}\"", media.path().display()));
        media
    };

    print_summary(&media);
    write_separator();

    DecisionEngine::new(
        &mut media,
        &mut args,
        &mut prompter,
        cli.hwaccel,
        curves::default_data_dir(),
    )
    .run()?;

    args.push(format!("\"{}\"", media.output_path().display()));

    write_separator();
    println!("{}", console::style(preview_line(&args)).dim());
    println!("{}", args.join());

    // Read once, after every duration/fps rewrite has happened.
    let total_frames = media.total_frames();

    let session = ffmpeg::spawn_transcode(&tools, &args)?;
    let mut monitor = ProgressMonitor::new(total_frames);
    let ui = MonitorUi::new();
    pump(session.stderr, &mut monitor, &ui)?;
    ffmpeg::wait_for_exit(session.child)?;

    if monitor.failed() {
        pause("Transcode reported errors. Press Enter to exit...")?;
    }
    Ok(())
}

fn print_summary(media: &MediaInfo) {
    println!("{}", media.file_name());
    if media.height > 0 {
        let aspect = media.aspect_label().unwrap_or_default();
        println!(
            "{}x{} ({aspect})  {} fps  {:.2}s",
            media.width, media.height, media.fps, media.duration
        );
    }
    for track in &media.audio_tracks {
        println!("audio {}: {}", track.index, track.codec);
    }
}

/// Numbered-image inputs skip the probe: the frame count comes from the
/// contiguous run of files on disk and the rate from a prompt.
fn synthesize_sequence(
    input: &Path,
    args: &mut ArgList,
    prompter: &mut dyn Prompter,
) -> Result<MediaInfo> {
    let seq = sequence::scan_sequence(input)?
        .with_context(|| format!("not a numbered image sequence: {}", input.display()))?;

    let raw = prompter.line("Sequence FPS [30]: ")?;
    let fps = raw
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|fps| *fps > 0)
        .unwrap_or(30);

    args.push(format!("-framerate {fps}"));
    args.push(format!("-start_number {}", seq.start));
    args.push(format!("-i \"{}\"", seq.pattern));
    println!("{} frames starting at {}", seq.frame_count, seq.start);

    Ok(MediaInfo::for_sequence(input, fps, seq.frame_count))
}

/// Condensed echo of the command: encoder and pixel-format fragments
/// stripped so the mapping and filter decisions stand out.
fn preview_line(args: &ArgList) -> String {
    let mut preview = args.clone();
    preview.remove_matching(|fragment| {
        fragment.starts_with("-c:v")
            || fragment.starts_with("-pix_fmt")
            || fragment.starts_with("-colorspace")
    });
    preview.join()
}
