//! Interactive terminal layer: prompts, help text, and styling

mod messages;
mod prompts;
mod style;

pub use messages::print_file_help;
pub use prompts::{is_positive_integer, prompt_line, prompt_validated};
pub use style::{colour_enabled, error_text, heading, print_rule, terminal_width, wrap_text, wrapped_println};
