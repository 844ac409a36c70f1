//! Colored terminal output for stage
//!
//! Progress lines go to stderr so stdout only carries command results
//! (`--json` documents, `stage info` fields). Colors are applied only when
//! the target stream is a terminal and `NO_COLOR` is unset.
//!
//! Progress bars live in `helpers::internal::progress`.

use owo_colors::{OwoColorize, Stream, Style};

/// Print an action header (blue, bold)
/// Example: "==> Fetching transwarp 2.2.2"
pub fn action(message: &str) {
    eprintln!(
        "{} {}",
        "==>".if_supports_color(Stream::Stderr, |t| t.style(Style::new().blue().bold())),
        message.if_supports_color(Stream::Stderr, |t| t.bold())
    );
}

/// Print a sub-action (cyan arrow)
/// Example: "  -> source"
pub fn sub_action(step: &str) {
    eprintln!(
        "  {} {}",
        "->".if_supports_color(Stream::Stderr, |t| t.cyan()),
        step
    );
}

/// Print a detail line (dimmed)
/// Example: "     staged transwarp.h"
pub fn detail(message: &str) {
    eprintln!(
        "     {}",
        message.if_supports_color(Stream::Stderr, |t| t.dimmed())
    );
}

/// Print a success message (green)
pub fn success(message: &str) {
    eprintln!(
        "{} {}",
        "==>".if_supports_color(Stream::Stderr, |t| t.style(Style::new().green().bold())),
        message.if_supports_color(Stream::Stderr, |t| t.green())
    );
}

/// Print a warning message (yellow)
pub fn warning(message: &str) {
    eprintln!(
        "{} {}",
        "warning:".if_supports_color(Stream::Stderr, |t| t.style(Style::new().yellow().bold())),
        message.if_supports_color(Stream::Stderr, |t| t.yellow())
    );
}

/// Print an error message (red)
pub fn error(message: &str) {
    eprintln!(
        "{} {}",
        "error:".if_supports_color(Stream::Stderr, |t| t.style(Style::new().red().bold())),
        message.if_supports_color(Stream::Stderr, |t| t.red())
    );
}

/// Print an aligned key/value line for `stage info` (stdout)
pub fn field(key: &str, value: &str) {
    let key = format_key(key);
    println!(
        "  {} {}",
        key.if_supports_color(Stream::Stdout, |t| t.cyan()),
        value
    );
}

fn format_key(key: &str) -> String {
    format!("{:<12}", format!("{}:", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_key_is_padded() {
        assert_eq!(format_key("archive"), "archive:    ");
        assert_eq!(format_key("description").len(), 12);
    }

    #[test]
    fn test_printers_do_not_panic() {
        action("Fetching transwarp 2.2.2");
        sub_action("source");
        detail("downloaded 2.2.2.zip");
        success("transwarp staged");
        warning("insecure");
        error("failed");
        field("version", "2.2.2");
    }
}
