//! Process-control state machine.
//!
//! `ProcessController` is pure bookkeeping: every transition takes the
//! current instant from the caller and returns the `MotorCommand` the caller
//! should forward to the drive. It never reads a clock, sleeps, or touches
//! hardware, so it can be driven from any scheduling model.
//!
//! Run time accrues only while `Running`. Leaving `Running` folds the current
//! interval into the accumulated total; `query` adds the open interval on the
//! fly without mutating anything.

use std::time::{Duration, Instant};

use pultruder_traits::Direction;

use crate::error::{StateError, ValidationError, ValidationIssue};
use crate::parameters::{Field, ParameterSet};
use crate::snapshot::Snapshot;
use crate::state::{MachineState, Operation};

/// What the drive should do after a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotorCommand {
    Drive {
        speed_mm_per_min: f64,
        direction: Direction,
    },
    Stop,
}

// Parameters live inside the phase so "bound iff started" and "start time iff
// running" hold by construction.
#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Inactive,
    Running {
        since: Instant,
        params: ParameterSet,
    },
    Paused {
        params: ParameterSet,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessController {
    phase: Phase,
    accumulated: Duration,
    run_direction: Direction,
}

impl Default for ProcessController {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessController {
    /// A fresh controller: `Inactive`, zero run time, no parameters.
    pub fn new() -> Self {
        Self {
            phase: Phase::Inactive,
            accumulated: Duration::ZERO,
            run_direction: Direction::Cw,
        }
    }

    /// Direction commanded for production runs.
    pub fn with_run_direction(mut self, direction: Direction) -> Self {
        self.run_direction = direction;
        self
    }

    pub fn run_direction(&self) -> Direction {
        self.run_direction
    }

    pub fn state(&self) -> MachineState {
        match self.phase {
            Phase::Inactive => MachineState::Inactive,
            Phase::Running { .. } => MachineState::Running,
            Phase::Paused { .. } => MachineState::Paused,
        }
    }

    /// Run time folded in from completed Running intervals.
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Start of the open Running interval, if any.
    pub fn run_started_at(&self) -> Option<Instant> {
        match self.phase {
            Phase::Running { since, .. } => Some(since),
            _ => None,
        }
    }

    pub fn active_parameters(&self) -> Option<&ParameterSet> {
        match &self.phase {
            Phase::Inactive => None,
            Phase::Running { params, .. } | Phase::Paused { params } => Some(params),
        }
    }

    /// Begin a run from `Inactive`, or resume from `Paused`.
    ///
    /// On resume `params` is ignored: the parameters bound when the run first
    /// started stay authoritative until `restart`.
    pub fn start(&mut self, params: ParameterSet, now: Instant) -> Result<MotorCommand, StateError> {
        let bound = match &self.phase {
            Phase::Inactive => {
                tracing::info!(
                    filament_length_m = params.filament_length_m,
                    line_speed_mm_per_min = params.line_speed_mm_per_min,
                    breaking_force_limit_n = params.breaking_force_limit_n,
                    "run start"
                );
                params
            }
            Phase::Paused { params: bound } => {
                if *bound != params {
                    tracing::debug!("resume ignores re-entered parameters");
                }
                tracing::info!(accumulated_s = self.accumulated.as_secs_f64(), "run resume");
                *bound
            }
            Phase::Running { .. } => return Err(self.reject(Operation::Start)),
        };
        self.phase = Phase::Running {
            since: now,
            params: bound,
        };
        Ok(self.drive_command(&bound))
    }

    /// Resume a paused run with its bound parameters.
    pub fn resume(&mut self, now: Instant) -> Result<MotorCommand, StateError> {
        match self.phase {
            Phase::Paused { params } => self.start(params, now),
            _ => Err(self.reject(Operation::Resume)),
        }
    }

    /// Close the open Running interval and hold.
    pub fn pause(&mut self, now: Instant) -> Result<MotorCommand, StateError> {
        let Phase::Running { since, params } = self.phase else {
            return Err(self.reject(Operation::Pause));
        };
        // A clock that stepped backwards contributes nothing.
        let interval = now.saturating_duration_since(since);
        self.accumulated = self.accumulated.saturating_add(interval);
        self.phase = Phase::Paused { params };
        tracing::info!(
            interval_s = interval.as_secs_f64(),
            accumulated_s = self.accumulated.as_secs_f64(),
            "run pause"
        );
        Ok(MotorCommand::Stop)
    }

    /// Drop the run entirely and return to the initial state. Always allowed.
    pub fn restart(&mut self) -> MotorCommand {
        tracing::info!(from = %self.state(), "run restart");
        self.phase = Phase::Inactive;
        self.accumulated = Duration::ZERO;
        MotorCommand::Stop
    }

    /// Total Running time as of `now`.
    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.phase {
            Phase::Running { since, .. } => self
                .accumulated
                .saturating_add(now.saturating_duration_since(since)),
            _ => self.accumulated,
        }
    }

    /// Side-effect-free view of the run as of `now`.
    pub fn query(&self, now: Instant) -> Snapshot {
        Snapshot::derive(self.state(), self.elapsed(now), self.active_parameters())
    }

    /// Validate a momentary manual drive. Independent of the run state; a
    /// negative speed drives the opposite way at the same magnitude.
    pub fn test_drive(
        &self,
        manual_speed_mm_per_min: f64,
        direction: Direction,
    ) -> Result<MotorCommand, ValidationError> {
        if !manual_speed_mm_per_min.is_finite() {
            return Err(ValidationError::new(
                Field::ManualTestSpeed,
                ValidationIssue::NotNumeric(manual_speed_mm_per_min.to_string()),
            ));
        }
        let direction = if manual_speed_mm_per_min < 0.0 {
            direction.reversed()
        } else {
            direction
        };
        tracing::debug!(
            speed_mm_per_min = manual_speed_mm_per_min.abs(),
            %direction,
            "test drive"
        );
        Ok(MotorCommand::Drive {
            speed_mm_per_min: manual_speed_mm_per_min.abs(),
            direction,
        })
    }

    /// The production drive command for the current run, if running.
    pub fn production_command(&self) -> Option<MotorCommand> {
        match &self.phase {
            Phase::Running { params, .. } => Some(self.drive_command(params)),
            _ => None,
        }
    }

    fn drive_command(&self, params: &ParameterSet) -> MotorCommand {
        MotorCommand::Drive {
            speed_mm_per_min: params.line_speed_mm_per_min,
            direction: self.run_direction,
        }
    }

    fn reject(&self, attempted: Operation) -> StateError {
        let err = StateError {
            attempted,
            current: self.state(),
        };
        tracing::debug!(error = %err, "transition rejected");
        err
    }
}
