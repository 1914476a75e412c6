//! # Logging
//!
//! The engine logs through the `log` facade. Hosts that do not bring their own
//! logger can call [`init_logging`] once at startup to install `env_logger`.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
