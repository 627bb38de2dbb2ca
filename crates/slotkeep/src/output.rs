//! Terminal output for slotkeep commands
//!
//! Status lines go to stdout and problems to stderr. In quiet mode only
//! problems are printed; slot data written by `load` is never affected.

use console::{style, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

static QUIET: AtomicBool = AtomicBool::new(false);

pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Done,
    Note,
    Warn,
    Fail,
}

impl Tone {
    fn marker(self) -> StyledObject<&'static str> {
        match self {
            Tone::Done => style("ok").green().bold(),
            Tone::Note => style("--").cyan(),
            Tone::Warn => style("warn").yellow().bold(),
            Tone::Fail => style("fail").red().bold(),
        }
    }

    fn line(self, msg: &str) -> String {
        format!("{} {}", self.marker(), msg)
    }
}

pub fn success(msg: &str) {
    if !is_quiet() {
        println!("{}", Tone::Done.line(msg));
    }
}

pub fn info(msg: &str) {
    if !is_quiet() {
        println!("{}", Tone::Note.line(msg));
    }
}

pub fn warning(msg: &str) {
    eprintln!("{}", Tone::Warn.line(msg));
}

pub fn error(msg: &str) {
    eprintln!("{}", Tone::Fail.line(msg));
}

/// Heading above a block of [`field`] lines
pub fn section(title: &str) {
    if !is_quiet() {
        println!("\n{}", style(title).bold());
    }
}

pub fn field(name: &str, value: &str) {
    if !is_quiet() {
        println!("{}", field_line(name, value));
    }
}

fn field_line(name: &str, value: &str) -> String {
    format!("  {:<14} {}", format!("{}:", name), value)
}

/// Whether a slot or backup is stored
pub fn presence(present: bool) -> String {
    if present {
        style("stored").green().to_string()
    } else {
        style("none").dim().to_string()
    }
}

/// Spinner shown while a slot operation runs; hidden in quiet mode
pub fn spinner(msg: &str) -> ProgressBar {
    if is_quiet() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(template);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
