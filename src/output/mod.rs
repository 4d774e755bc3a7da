//! Rendering and persistence of ranked optimisation results

pub mod render;
pub mod writer;

pub use render::{format_percentage, parse_short, percentage_return, render_short, ParseActionError};
pub use writer::{export_results, unique_results_path, WriteError};
