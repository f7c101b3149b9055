use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use console::{Key, Term};
use dialoguer::{Input, theme::ColorfulTheme};

/// One keystroke answer. `Enter` selects the prompt's default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKey {
    Char(char),
    Enter,
}

/// The decision walk reads all user input through this, so tests can drive
/// it with scripted answers instead of a live terminal.
pub trait Prompter {
    fn key(&mut self, message: &str) -> Result<PromptKey>;
    fn line(&mut self, message: &str) -> Result<String>;
}

/// Live prompter. Esc at any keystroke prompt relaunches the program
/// against the current source path and exits this process, discarding every
/// decision made so far.
pub struct ConsolePrompter {
    term: Term,
    source: PathBuf,
}

impl ConsolePrompter {
    pub fn new(source: &Path) -> Self {
        Self {
            term: Term::stdout(),
            source: source.to_path_buf(),
        }
    }

    fn restart(&self) -> Result<()> {
        let exe = std::env::current_exe().context("cannot locate current executable")?;
        Command::new(exe)
            .arg(&self.source)
            .spawn()
            .context("failed to relaunch")?;
        std::process::exit(0);
    }
}

impl Prompter for ConsolePrompter {
    fn key(&mut self, message: &str) -> Result<PromptKey> {
        self.term.write_str(message)?;
        loop {
            match self.term.read_key()? {
                Key::Char(c) => {
                    self.term.write_line(&c.to_string())?;
                    return Ok(PromptKey::Char(c.to_ascii_lowercase()));
                }
                Key::Enter => {
                    self.term.write_line("")?;
                    return Ok(PromptKey::Enter);
                }
                Key::Escape => self.restart()?,
                _ => {}
            }
        }
    }

    fn line(&mut self, message: &str) -> Result<String> {
        self.term.write_str(message)?;
        Ok(self.term.read_line()?)
    }
}

/// Loops until an existing path is supplied; used when no positional
/// argument was given.
pub fn prompt_input_path() -> Result<PathBuf> {
    let theme = ColorfulTheme::default();
    loop {
        let raw: String = Input::with_theme(&theme)
            .with_prompt("Input file path")
            .interact_text()?;
        let path = PathBuf::from(raw.trim());
        if path.exists() {
            return Ok(path);
        }
        println!("Path not found, please try again.");
    }
}

pub fn write_separator() {
    println!(
        "{}",
        console::style("---------------------------------------------").dim()
    );
}

/// Keeps the console alive until the user acknowledges; used for fatal
/// errors and failed runs so the window never vanishes mid-message.
pub fn pause(message: &str) -> Result<()> {
    let term = Term::stdout();
    term.write_str(message)?;
    term.read_line()?;
    Ok(())
}
