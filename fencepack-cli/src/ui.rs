//! Terminal feedback for fencepack.
//!
//! The busy indicator is a spinner on stderr. It is suppressed when:
//! - `--quiet` flag is passed
//! - `FENCEPACK_QUIET=1` environment variable is set
//! - stderr is not a TTY (piped output)

use std::io::IsTerminal;
use std::sync::OnceLock;
use std::time::Duration;

use fencepack_core::BusyIndicator;
use indicatif::{ProgressBar, ProgressStyle};

static QUIET_MODE: OnceLock<bool> = OnceLock::new();

/// Initialize quiet mode from flags and environment
///
/// Call this once at startup with the --quiet flag value.
pub fn init_quiet_mode(quiet_flag: bool) {
    let is_quiet = quiet_flag
        || std::env::var("FENCEPACK_QUIET").map(|v| v == "1").unwrap_or(false)
        || !std::io::stderr().is_terminal();

    QUIET_MODE.set(is_quiet).ok();
}

pub fn is_quiet() -> bool {
    *QUIET_MODE.get().unwrap_or(&false)
}

/// Create a spinner that respects quiet mode
pub fn spinner(msg: impl Into<String>) -> Option<ProgressBar> {
    if is_quiet() {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.cyan} {msg}")
            .expect("valid template"),
    );
    pb.set_message(msg.into());
    pb.enable_steady_tick(Duration::from_millis(80));
    Some(pb)
}

/// Busy indicator backed by a spinner, shown while `set_busy(true)` holds.
pub struct SpinnerIndicator {
    message: String,
    spinner: Option<ProgressBar>,
}

impl SpinnerIndicator {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            spinner: None,
        }
    }
}

impl BusyIndicator for SpinnerIndicator {
    fn set_busy(&mut self, busy: bool) {
        if busy {
            if self.spinner.is_none() {
                self.spinner = spinner(self.message.clone());
            }
        } else if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }
}
