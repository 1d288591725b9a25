//! Logging utilities.
//!
//! This module centralizes logger initialization and the one-shot diagnostics
//! used on the render path. Everything logs through the `log` facade;
//! `env_logger` is only wired up by [`init_logging`].

mod init;
mod once;

pub use init::{init_logging, LoggingConfig};
pub use once::WarnOnce;
