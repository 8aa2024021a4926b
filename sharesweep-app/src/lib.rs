//! Sharesweep command-line application.

pub mod cli;
pub mod logging;
pub mod summary;

pub use cli::Cli;
pub use logging::{init_logging, LogFormat};
