//! Runtime configuration for the controller and session.
//!
//! Separate from the TOML-deserialized config in `pultruder_config`; see
//! `conversions` for the bridge.

use pultruder_traits::Direction;

use crate::parameters::RangePolicy;

/// Control configuration applied when a session is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlCfg {
    /// Direction commanded for production runs.
    pub run_direction: Direction,
    /// Range checks on the run fields.
    pub range_policy: RangePolicy,
}

impl Default for ControlCfg {
    fn default() -> Self {
        Self {
            run_direction: Direction::Cw,
            range_policy: RangePolicy::Passthrough,
        }
    }
}

/// Polling configuration for callers that refresh a display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollCfg {
    /// Status refresh rate in Hz.
    pub poll_hz: u32,
    /// Pause automatically once the target length is reached.
    pub stop_at_target: bool,
}

impl Default for PollCfg {
    fn default() -> Self {
        Self {
            poll_hz: 1,
            stop_at_target: true,
        }
    }
}
