//! Logging with a timestamp and a colored module prefix.
//!
//! Every call writes exactly one line to standard output:
//!
//! ```text
//! 1700000000000	[build] Rebuilding...
//! ```
//!
//! The first column is the current Unix time in milliseconds.
//!
//! # Usage
//! ```ignore
//! log!("build"; "Reading {} posts...", count);
//! ```

use chrono::Utc;
use colored::{ColoredString, Colorize};
use std::io::{stdout, Write};

/// Log a message with a timestamp and a colored module prefix.
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Write one log line. Prefer the [`log!`](crate::log) macro.
pub fn log(module: &str, message: &str) {
    let line = format_line(Utc::now().timestamp_millis(), module, message);
    let mut stdout = stdout().lock();
    writeln!(stdout, "{}", line).ok();
    stdout.flush().ok();
}

fn format_line(millis: i64, module: &str, message: &str) -> String {
    // Keep each event on a single line.
    let message = message.replace('\n', " ");
    format!("{}\t{} {}", millis, colorize_prefix(module), message)
}

/// Apply color to a module prefix based on module type.
fn colorize_prefix(module: &str) -> ColoredString {
    let prefix = format!("[{}]", module);
    match module.to_ascii_lowercase().as_str() {
        "serve" => prefix.bright_blue().bold(),
        "watch" => prefix.bright_green().bold(),
        "error" => prefix.bright_red().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_format_line_is_single_line() {
        colored::control::set_override(false);
        let line = format_line(42, "build", "first\nsecond");
        assert_eq!(line, "42\t[build] first second");
    }
}
