pub mod app;
pub mod config;
pub mod error;
pub mod export;
pub mod format;
pub mod logging;
pub mod notify;
pub mod prompt;
pub mod report;
pub mod system;

pub use error::{AnalyzerError, Result};
