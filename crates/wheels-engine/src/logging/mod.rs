//! Logging setup.
//!
//! Engine code logs through the `log` facade; `init_logging` installs the
//! `env_logger` backend used by the samples.

mod init;

pub use init::{init_logging, LoggingConfig};
