#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the pultruder operator program.
//!
//! Every section is optional; missing sections and keys fall back to the
//! defaults below. `Config::validate` rejects out-of-range values after
//! parsing.
use eyre::WrapErr;
use serde::Deserialize;
use std::path::Path;

/// Production drive direction as written in TOML (`"cw"` / `"ccw"`).
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DriveDirection {
    #[default]
    Cw,
    Ccw,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunCfg {
    /// Direction commanded for production runs
    pub direction: DriveDirection,
    /// Status refresh cadence in Hz
    pub poll_hz: u32,
    /// Pause the run automatically once the target length is reached
    pub stop_at_target: bool,
}

impl Default for RunCfg {
    fn default() -> Self {
        Self {
            direction: DriveDirection::Cw,
            poll_hz: 1,
            stop_at_target: true,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ValidationCfg {
    /// Reject zero or negative filament length, line speed, and breaking force.
    /// Off by default: any finite number is accepted.
    pub require_positive: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MotorCfg {
    /// Stepper steps per millimetre of filament drawn
    pub steps_per_mm: f64,
    /// Fastest line speed the drive accepts (mm/min)
    pub max_speed_mm_per_min: f64,
}

impl Default for MotorCfg {
    fn default() -> Self {
        Self {
            steps_per_mm: 80.0,
            max_speed_mm_per_min: 5_000.0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub run: RunCfg,
    pub validation: ValidationCfg,
    pub motor: MotorCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse, and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("invalid configuration {:?}: {}", path, e))?;
    cfg.validate()
        .wrap_err_with(|| format!("invalid configuration {path:?}"))?;
    Ok(cfg)
}

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const ROTATIONS: [&str; 3] = ["never", "daily", "hourly"];

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Run
        if !(1..=50).contains(&self.run.poll_hz) {
            eyre::bail!("run.poll_hz must be in 1..=50");
        }

        // Motor
        if !(self.motor.steps_per_mm.is_finite() && self.motor.steps_per_mm > 0.0) {
            eyre::bail!("motor.steps_per_mm must be > 0");
        }
        if !(self.motor.max_speed_mm_per_min.is_finite() && self.motor.max_speed_mm_per_min > 0.0)
        {
            eyre::bail!("motor.max_speed_mm_per_min must be > 0");
        }

        // Logging
        if let Some(level) = &self.logging.level
            && !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
        {
            eyre::bail!("logging.level must be one of {}", LOG_LEVELS.join("|"));
        }
        if let Some(rotation) = &self.logging.rotation
            && !ROTATIONS.contains(&rotation.to_ascii_lowercase().as_str())
        {
            eyre::bail!("logging.rotation must be one of {}", ROTATIONS.join("|"));
        }

        // Validation: no extra checks; serde restricts to a bool

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        let cfg = load_toml("").unwrap();
        assert_eq!(cfg.run.poll_hz, 1);
        assert_eq!(cfg.run.direction, DriveDirection::Cw);
        assert!(cfg.run.stop_at_target);
        assert!(!cfg.validation.require_positive);
        assert_eq!(cfg.motor.steps_per_mm, 80.0);
        cfg.validate().unwrap();
    }

    #[test]
    fn unknown_direction_fails_to_parse() {
        assert!(load_toml("[run]\ndirection = \"sideways\"\n").is_err());
    }
}
