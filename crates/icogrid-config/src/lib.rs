//! Configuration system for the Icogrid viewer.
//!
//! Provides runtime-configurable settings that persist to disk as RON files,
//! with CLI overrides via clap, hot-reload detection, and forward/backward
//! compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, GridConfig, ViewConfig, WindowConfig, default_config_dir};
pub use error::ConfigError;
