//! Line-oriented prompts driving the interactive session
//!
//! Every prompt shares one escape convention: an empty entry (or EOF) means
//! "go back / quit" and surfaces as `None` for the caller to unwind.

use super::style;
use std::io;
use std::str::FromStr;

/// Read one trimmed line from stdin; `None` on EOF or read failure
fn read_line() -> Option<String> {
    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input.trim().to_string()),
    }
}

/// Show a prompt and return the entered line; `None` when the user escapes
pub fn prompt_line(prompt: &str) -> Option<String> {
    println!("{prompt}");
    let line = read_line()?;
    if line.is_empty() {
        return None;
    }
    Some(line)
}

/// Prompt until the entry passes `is_valid` and parses as `T`, echoing
/// `error_message` otherwise; `None` when the user escapes.
pub fn prompt_validated<T, F>(prompt: &str, is_valid: F, error_message: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> bool,
{
    loop {
        println!("{prompt}");
        let input = read_line()?;
        if input.is_empty() {
            return None;
        }
        if !is_valid(&input) {
            eprintln!("{}", style::error_text(error_message));
            println!();
            continue;
        }
        match input.parse::<T>() {
            Ok(value) => return Some(value),
            Err(_) => {
                eprintln!("{}", style::error_text(error_message));
                println!();
            }
        }
    }
}

/// Entry is a positive integer: all digits with at least one non-zero
pub fn is_positive_integer(entry: &str) -> bool {
    !entry.is_empty()
        && entry.bytes().all(|b| b.is_ascii_digit())
        && entry.bytes().any(|b| b != b'0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_integer_validation() {
        assert!(is_positive_integer("1"));
        assert!(is_positive_integer("0010"));
        assert!(!is_positive_integer("0"));
        assert!(!is_positive_integer("000"));
        assert!(!is_positive_integer("-3"));
        assert!(!is_positive_integer("3.5"));
        assert!(!is_positive_integer(""));
    }
}
