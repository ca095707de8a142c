//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use pultruder_traits::Direction;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "pultruder", version, about = "Filament pultruder operator console")]
pub struct Cli {
    /// Path to config TOML (built-in defaults when omitted)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print status and errors as JSON lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG wins when set
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Drive a simulated clock: waits and polls advance time instantly
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    pub simulated_time: bool,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the run parameters, start a run, and poll its status
    Run {
        /// Filament length to produce (m)
        #[arg(long, value_name = "M", allow_hyphen_values = true)]
        filament_length: String,
        /// Line speed (mm/min)
        #[arg(long, value_name = "MM_PER_MIN", allow_hyphen_values = true)]
        line_speed: String,
        /// Filament breaking force limit (N)
        #[arg(long, value_name = "N", allow_hyphen_values = true)]
        breaking_force: String,
        /// Pause the run after this many seconds of running time
        #[arg(long, value_name = "SECS")]
        max_seconds: Option<u64>,
    },
    /// Drive the motor manually for a short hold, then release
    TestDrive {
        /// Manual motor speed (mm/min); negative reverses the direction
        #[arg(long, value_name = "MM_PER_MIN", allow_hyphen_values = true)]
        speed: String,
        /// Drive direction: cw or ccw
        #[arg(long, default_value = "cw")]
        direction: Direction,
        /// How long to hold the drive (ms)
        #[arg(long, value_name = "MS", default_value_t = 1000)]
        hold_ms: u64,
    },
    /// Operate the machine from line commands on stdin
    Session,
    /// Quick health check (config + simulated drive)
    SelfCheck,
}
