//! Unified progress bar helpers
//!
//! Provides consistent progress bar styling across all stage helpers.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Standard spinner characters
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Standard tick interval for spinners
const TICK_INTERVAL_MS: u64 = 80;

const SPINNER_TEMPLATE: &str = "     {spinner:.cyan} {msg}";
const BYTES_TEMPLATE: &str = "     {spinner:.cyan} [{bar:30.cyan/dim}] {bytes}/{total_bytes} ({eta})";

/// Create a spinner progress bar with standard styling.
///
/// # Example
/// ```ignore
/// let pb = create_spinner("extracting 1.2.1.zip");
/// // ... do work ...
/// pb.finish_and_clear();
/// ```
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(SPINNER_TEMPLATE) {
        pb.set_style(style.tick_chars(SPINNER_CHARS));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(TICK_INTERVAL_MS));
    pb
}

/// Upgrade a spinner to a byte progress bar when content length becomes known.
pub fn upgrade_to_bytes(pb: &ProgressBar, total_bytes: u64) {
    pb.set_length(total_bytes);
    if let Ok(style) = ProgressStyle::default_bar().template(BYTES_TEMPLATE) {
        pb.set_style(style.progress_chars("━╸━"));
    }
}
