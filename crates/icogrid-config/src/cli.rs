//! Command-line argument parsing for the Icogrid viewer.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Icogrid command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "icogrid", about = "Interactive geodesic grid refinement viewer")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start in fullscreen.
    #[arg(long)]
    pub fullscreen: Option<bool>,

    /// Highest refinement level to allow.
    #[arg(long)]
    pub max_level: Option<u8>,

    /// Refine with one atomic bisect+extend step per request.
    #[arg(long)]
    pub one_step: bool,

    /// Disable the progressive reveal animation.
    #[arg(long)]
    pub no_reveal: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(fs) = args.fullscreen {
            self.window.fullscreen = fs;
        }
        if let Some(max) = args.max_level {
            self.grid.max_level = max;
        }
        if args.one_step {
            self.grid.one_step_refine = true;
        }
        if args.no_reveal {
            self.grid.animated_reveal = false;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
