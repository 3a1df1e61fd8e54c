//! Command handlers for CLI subcommands
//!
//! Each subcommand lives in its own module; shared document and sample
//! loading is in `utils`.

mod check;
mod completions;
mod config;
mod corpus;
mod emit;
mod lint;
mod parity;
mod types;
mod utils;

pub use check::handle_check;
pub use completions::handle_completions;
pub use config::handle_config;
pub use corpus::handle_corpus;
pub use emit::handle_emit;
pub use lint::handle_lint;
pub use parity::handle_parity;
pub use types::handle_types;
