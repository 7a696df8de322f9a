//! The binary entry point for the Icogrid viewer.

use clap::Parser;
use icogrid_config::{CliArgs, Config, default_config_dir};

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    let mut config = match Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    config.apply_cli_overrides(&args);

    let log_dir = dirs::cache_dir().map(|dir| dir.join("icogrid/logs"));
    icogrid_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    icogrid_app::run_with_config(config);
}
