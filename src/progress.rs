//! Terminal progress reporting.
//!
//! A single [`Progress`] reporter is shared by every component of a command run.
//! It owns the progress bar and serializes user-facing messages with it so that
//! bar redraws never interleave with printed lines.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::time::Duration;

const TICK_INTERVAL_MS: u64 = 80;

/// Progress reporter shared by downloads and long-running commands.
pub trait Progress: Send + Sync {
    /// Begin rendering. Calling it again is a no-op.
    fn start(&self);

    /// Stop rendering and clear any active bar.
    fn shutdown(&self);

    /// Print a message above the bar.
    fn printf(&self, message: &str);

    /// Print a highlighted message (errors, warnings) above the bar.
    fn color_printf(&self, message: &str);

    /// Show a byte-counting bar with the given total.
    fn init_bar(&self, total: u64);

    /// Advance the active bar.
    fn add_bar(&self, delta: u64);

    /// Remove the active bar.
    fn shutdown_bar(&self);
}

#[derive(Default)]
struct ConsoleState {
    started: bool,
    stopped: bool,
    bar: Option<ProgressBar>,
}

/// Progress rendered on stderr with `indicatif`.
pub struct ConsoleProgress {
    state: Mutex<ConsoleState>,
    hidden: bool,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ConsoleState::default()),
            hidden: false,
        }
    }

    /// Reporter that tracks bars but never draws them.
    pub fn hidden() -> Self {
        Self {
            state: Mutex::new(ConsoleState::default()),
            hidden: true,
        }
    }

    pub fn is_running(&self) -> bool {
        let state = self.state.lock();
        state.started && !state.stopped
    }

    /// Position of the active bar, if any.
    pub fn bar_position(&self) -> Option<u64> {
        self.state.lock().bar.as_ref().map(|bar| bar.position())
    }

    fn new_bar(&self, total: u64) -> ProgressBar {
        let bar = if self.hidden {
            ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::hidden())
        } else {
            ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr())
        };
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:30.cyan/dim}] {bytes}/{total_bytes} {bytes_per_sec} ({eta})")
        {
            bar.set_style(style.progress_chars("━╸━"));
        }
        bar.enable_steady_tick(Duration::from_millis(TICK_INTERVAL_MS));
        bar
    }

    fn emit(&self, line: String) {
        let state = self.state.lock();
        if self.hidden {
            return;
        }
        match &state.bar {
            Some(bar) => bar.println(line),
            None => eprintln!("{}", line),
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for ConsoleProgress {
    fn start(&self) {
        let mut state = self.state.lock();
        if !state.started {
            state.started = true;
            tracing::debug!("progress reporter started");
        }
    }

    fn shutdown(&self) {
        let mut state = self.state.lock();
        if let Some(bar) = state.bar.take() {
            bar.finish_and_clear();
        }
        state.stopped = true;
    }

    fn printf(&self, message: &str) {
        self.emit(message.to_string());
    }

    fn color_printf(&self, message: &str) {
        self.emit(message.yellow().to_string());
    }

    fn init_bar(&self, total: u64) {
        let bar = self.new_bar(total);
        let mut state = self.state.lock();
        if let Some(previous) = state.bar.replace(bar) {
            previous.finish_and_clear();
        }
    }

    fn add_bar(&self, delta: u64) {
        if let Some(bar) = &self.state.lock().bar {
            bar.inc(delta);
        }
    }

    fn shutdown_bar(&self) {
        if let Some(bar) = self.state.lock().bar.take() {
            bar.finish_and_clear();
        }
    }
}
