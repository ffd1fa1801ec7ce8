//! Terminal output for the pipeline phases.
//!
//! - `log!` prints one line behind a colored phase prefix
//! - `debug!` does the same, but only with `--verbose`
//! - [`ProgressLine`] keeps a single line of per-kind counters at the
//!   bottom of the output while a phase runs
//!
//! ```ignore
//! log!("graph"; "{} references", count);
//!
//! let mut progress = ProgressLine::new("optimize", &[("css", 12), ("js", 4)]);
//! progress.inc("css");
//! progress.finish();
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, Ordering},
};

/// Set by `--verbose`.
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Rendered progress line currently on screen, if any.
static PROGRESS: Mutex<Option<String>> = Mutex::new(None);

pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Log a message with a colored phase prefix.
///
/// ```ignore
/// log!("depth"; "max depth {}", depth);
/// ```
#[macro_export]
macro_rules! log {
    ($phase:expr; $($arg:tt)*) => {{
        $crate::logger::log($phase, &format!($($arg)*))
    }};
}

/// Like `log!`, shown only when verbose output is on.
#[macro_export]
macro_rules! debug {
    ($phase:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($phase, &format!($($arg)*))
        }
    }};
}

/// Print `message` above the progress line, if one is showing.
pub fn log(phase: &str, message: &str) {
    let progress = PROGRESS.lock();
    let mut out = stdout().lock();
    execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
    writeln!(out, "{} {message}", prefix(phase)).ok();
    if let Some(line) = progress.as_deref() {
        write!(out, "{line}").ok();
    }
    out.flush().ok();
}

fn prefix(phase: &str) -> String {
    let tag = format!("[{phase}]");
    match phase.to_ascii_lowercase().as_str() {
        "discover" | "graph" | "depth" | "check" => tag.bright_blue().bold().to_string(),
        "optimize" | "rewrite" | "build" => tag.bright_green().bold().to_string(),
        "error" => tag.bright_red().bold().to_string(),
        "warning" | "unused" => tag.bright_magenta().bold().to_string(),
        _ => tag.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Progress line
// ============================================================================

/// One line of counters, redrawn in place:
///
/// `[optimize] image(30/31) css(4/12) js(1/4)`
pub struct ProgressLine {
    phase: &'static str,
    counters: Vec<Counter>,
}

struct Counter {
    name: &'static str,
    total: usize,
    done: usize,
}

impl ProgressLine {
    /// Start showing counters for `phase`; empty ones are left out.
    pub fn new(phase: &'static str, items: &[(&'static str, usize)]) -> Self {
        let counters = items
            .iter()
            .filter(|(_, total)| *total > 0)
            .map(|&(name, total)| Counter {
                name,
                total,
                done: 0,
            })
            .collect();
        let progress = Self { phase, counters };
        progress.draw();
        progress
    }

    pub fn inc(&mut self, name: &str) {
        if let Some(counter) = self.counters.iter_mut().find(|c| c.name == name) {
            counter.done += 1;
            self.draw();
        }
    }

    fn render(&self) -> String {
        self.counters
            .iter()
            .map(|c| format!("{}({}/{})", c.name, c.done, c.total))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn draw(&self) {
        let line = format!("{} {}", prefix(self.phase), self.render());
        *PROGRESS.lock() = Some(line.clone());
        let mut out = stdout().lock();
        execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        write!(out, "{line}").ok();
        out.flush().ok();
    }

    /// Keep the final counts on screen and release the line.
    pub fn finish(self) {
        let line = PROGRESS.lock().take();
        if let Some(line) = line {
            let mut out = stdout().lock();
            execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
            writeln!(out, "{line}").ok();
            out.flush().ok();
        }
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        // Cleared without a final line when a phase fails midway.
        let showing = PROGRESS.lock().take().is_some();
        if showing {
            let mut out = stdout().lock();
            execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
            out.flush().ok();
        }
    }
}
