//! Logging utilities.
//!
//! Centralizes logger initialization. Library code only uses the `log` facade;
//! `env_logger` is installed by hosts through `init_logging`.

mod init;

pub use init::{LoggingConfig, init_logging};
