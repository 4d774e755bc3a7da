//! Investment actions making up an optimised buying strategy

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single step of a buying strategy: purchase a bond of some tenor, or
/// wait with no purchase.
///
/// Sequences are chronological (non-decreasing start month) and adjacent
/// waits are always merged into one, so `w2` rather than `w1,w1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Buy a bond at `start_month`, maturing at `start_month + tenor`
    Buy { start_month: u32, tenor: u32 },
    /// Make no purchase for `length` months from `start_month`
    Wait { start_month: u32, length: u32 },
}

impl Action {
    /// A bond purchase; the tenor must be positive
    pub fn buy(start_month: u32, tenor: u32) -> Self {
        assert!(tenor > 0, "bond tenor must be positive");
        Action::Buy { start_month, tenor }
    }

    /// A wait; the length must be positive
    pub fn wait(start_month: u32, length: u32) -> Self {
        assert!(length > 0, "wait length must be positive");
        Action::Wait { start_month, length }
    }

    /// The month the action begins
    pub fn start_month(&self) -> u32 {
        match *self {
            Action::Buy { start_month, .. } | Action::Wait { start_month, .. } => start_month,
        }
    }

    /// Months the action spans: the tenor of the bond, or the wait length
    pub fn length(&self) -> u32 {
        match *self {
            Action::Buy { tenor, .. } => tenor,
            Action::Wait { length, .. } => length,
        }
    }
}

impl fmt::Display for Action {
    /// Verbose rendering: "Month x: buy y-month bond" / "Month x: wait for y months"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Action::Buy { start_month, tenor } => {
                write!(f, "Month {start_month}: buy {tenor}-month bond")
            }
            Action::Wait {
                start_month,
                length: 1,
            } => write!(f, "Month {start_month}: wait for 1 month"),
            Action::Wait {
                start_month,
                length,
            } => write!(f, "Month {start_month}: wait for {length} months"),
        }
    }
}
