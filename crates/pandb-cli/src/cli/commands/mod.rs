//! CLI command handlers.

mod completions;
mod lookup;

pub use completions::print_completions;
pub use lookup::run_lookup;
