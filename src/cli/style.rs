//! Terminal capabilities: colour, width, and word wrapping

use crossterm::style::Stylize;
use std::io::IsTerminal;
use std::sync::OnceLock;

/// Decided once per process: styling is on only for a real terminal with
/// NO_COLOR unset.
static COLOUR_ENABLED: OnceLock<bool> = OnceLock::new();

pub fn colour_enabled() -> bool {
    *COLOUR_ENABLED.get_or_init(|| {
        std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
    })
}

/// Error text, red when styling is on
pub fn error_text(text: &str) -> String {
    if colour_enabled() {
        text.red().to_string()
    } else {
        text.to_string()
    }
}

/// Section heading, bold when styling is on
pub fn heading(text: &str) -> String {
    if colour_enabled() {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

/// Width of the terminal in characters, defaulting to 80 if detection fails
pub fn terminal_width() -> usize {
    crossterm::terminal::size()
        .ok()
        .map(|(cols, _)| cols as usize)
        .filter(|&cols| cols > 0)
        .unwrap_or(80)
}

/// Print a horizontal rule the width of the terminal
pub fn print_rule() {
    println!("{}", "-".repeat(terminal_width()));
}

/// Re-break a paragraph at word boundaries so no line exceeds `width`.
///
/// Collapses all existing whitespace, including manual line breaks.
pub fn wrap_text(text: &str, width: usize) -> String {
    let mut wrapped = String::with_capacity(text.len());
    let mut line_length = 0usize;

    for word in text.split_whitespace() {
        if line_length > 0 && line_length + word.len() + 1 > width {
            wrapped.push('\n');
            line_length = 0;
        } else if line_length > 0 {
            wrapped.push(' ');
            line_length += 1;
        }
        wrapped.push_str(word);
        line_length += word.len();
    }
    wrapped
}

/// Print a paragraph wrapped to the terminal width
pub fn wrapped_println(text: &str) {
    println!("{}", wrap_text(text, terminal_width()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_breaks_before_width() {
        let wrapped = wrap_text("alpha beta gamma delta", 11);
        assert_eq!(wrapped, "alpha beta\ngamma delta");
        for line in wrapped.lines() {
            assert!(line.len() <= 11);
        }
    }

    #[test]
    fn test_wrap_collapses_existing_whitespace() {
        assert_eq!(wrap_text("one\n  two\tthree", 80), "one two three");
        assert_eq!(wrap_text("", 10), "");
    }

    #[test]
    fn test_long_word_kept_whole() {
        // A word longer than the width goes on its own line rather than
        // being split.
        let wrapped = wrap_text("tiny extraordinarily tiny", 8);
        assert_eq!(wrapped, "tiny\nextraordinarily\ntiny");
    }
}
