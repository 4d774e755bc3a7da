//! Render action sequences and returns for terminal and CSV output

use crate::action::Action;
use thiserror::Error;

/// Errors from parsing a short-form action list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseActionError {
    #[error("empty action token")]
    EmptyToken,

    #[error("action \"{0}\" must start with 'b' (buy) or 'w' (wait)")]
    BadKind(String),

    #[error("action \"{0}\" needs a positive number of months")]
    BadLength(String),
}

/// Percentage return corresponding to a cumulative return factor
pub fn percentage_return(crf: f64) -> f64 {
    100.0 * crf - 100.0
}

/// Percentage return formatted to two decimal places, e.g. "4.10%"
pub fn format_percentage(crf: f64) -> String {
    format!("{:.2}%", percentage_return(crf))
}

/// Short form: `b<tenor>` / `w<length>` joined by commas, e.g. "b6,b3,w2"
pub fn render_short(actions: &[Action]) -> String {
    let tokens: Vec<String> = actions
        .iter()
        .map(|action| match action {
            Action::Buy { tenor, .. } => format!("b{tenor}"),
            Action::Wait { length, .. } => format!("w{length}"),
        })
        .collect();
    tokens.join(",")
}

/// Parse a short-form list back into actions.
///
/// Start months are implied: short form describes a gapless sequence from
/// month 0, so rendering and parsing round-trip engine output exactly.
pub fn parse_short(text: &str) -> Result<Vec<Action>, ParseActionError> {
    let mut actions = Vec::new();
    let mut month = 0u32;

    for raw in text.split(',') {
        let token = raw.trim();
        if token.is_empty() {
            return Err(ParseActionError::EmptyToken);
        }
        let (is_buy, digits) = match (token.strip_prefix('b'), token.strip_prefix('w')) {
            (Some(rest), _) => (true, rest),
            (_, Some(rest)) => (false, rest),
            _ => return Err(ParseActionError::BadKind(token.to_string())),
        };
        let length: u32 = digits
            .parse()
            .ok()
            .filter(|&l| l > 0)
            .ok_or_else(|| ParseActionError::BadLength(token.to_string()))?;

        let action = if is_buy {
            Action::buy(month, length)
        } else {
            Action::wait(month, length)
        };
        actions.push(action);
        month += length;
    }

    Ok(actions)
}

/// Verbose form: one "Month x: ..." line per action
pub fn render_verbose(actions: &[Action]) -> Vec<String> {
    actions.iter().map(Action::to_string).collect()
}
