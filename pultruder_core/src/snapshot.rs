//! Point-in-time view of a run, as polled by the display.

use std::time::Duration;

use crate::parameters::ParameterSet;
use crate::state::MachineState;
use crate::util::format_hms;

/// Immutable result of `ProcessController::query`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub state: MachineState,
    /// Total Running time, excluding pauses.
    pub elapsed: Duration,
    pub length_produced_m: f64,
    /// Completion clamped to `[0, 100]` for display.
    pub percent_complete: f64,
    /// Unclamped completion ratio in percent; exceeds 100 when a run
    /// continues past its nominal length.
    pub raw_percent: f64,
}

impl Snapshot {
    pub(crate) fn derive(state: MachineState, elapsed: Duration, params: Option<&ParameterSet>) -> Self {
        let (length_produced_m, raw_percent) = match params {
            Some(p) => {
                let length = p.length_after(elapsed);
                // A zero-length target has no meaningful ratio.
                let raw = if p.filament_length_m == 0.0 {
                    0.0
                } else {
                    100.0 * length / p.filament_length_m
                };
                (length, raw)
            }
            None => (0.0, 0.0),
        };
        Self {
            state,
            elapsed,
            length_produced_m,
            percent_complete: raw_percent.clamp(0.0, 100.0),
            raw_percent,
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Elapsed time as the `HH:MM:SS` duration label.
    pub fn elapsed_hms(&self) -> String {
        format_hms(self.elapsed)
    }

    /// True once the produced length reaches the target length.
    pub fn target_reached(&self) -> bool {
        self.raw_percent >= 100.0
    }
}
