//! Core utilities, configuration, and common functionality

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod process;

// Re-exports for convenience
pub use error::{AppError, AppResult, FailureKind, FetchError};
pub use logging::{init_logger, log_engine_configuration};
