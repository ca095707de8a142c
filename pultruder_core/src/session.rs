//! Clocked operator session: a `ProcessController` wired to a time source
//! and a motor driver.
//!
//! Each operation reads `now` from the clock, applies the transition to a
//! copy of the controller, forwards the resulting command to the motor, and
//! commits the copy only if the motor accepted it. A failed transition or a
//! rejected motor command leaves the session exactly as it was, except for
//! `restart`, which resets unconditionally before stopping the motor.

use std::sync::Arc;
use std::time::Instant;

use pultruder_traits::clock::{Clock, MonotonicClock};
use pultruder_traits::{Direction, Motor};

use crate::config::ControlCfg;
use crate::controller::{MotorCommand, ProcessController};
use crate::error::{PultruderError, StateError};
use crate::hw_error::map_hw_error;
use crate::parameters::{ParameterSet, RangePolicy, RawFields, parse_manual_test_speed};
use crate::snapshot::Snapshot;

pub struct Session<M: Motor> {
    controller: ProcessController,
    motor: M,
    clock: Arc<dyn Clock + Send + Sync>,
    range_policy: RangePolicy,
    test_drive_held: bool,
}

impl<M: Motor> core::fmt::Debug for Session<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("controller", &self.controller)
            .field("range_policy", &self.range_policy)
            .field("test_drive_held", &self.test_drive_held)
            .finish()
    }
}

impl<M: Motor> Session<M> {
    pub fn controller(&self) -> &ProcessController {
        &self.controller
    }

    pub fn motor(&self) -> &M {
        &self.motor
    }

    pub fn range_policy(&self) -> RangePolicy {
        self.range_policy
    }

    pub fn test_drive_held(&self) -> bool {
        self.test_drive_held
    }

    /// Current snapshot, read against the session clock.
    pub fn status(&self) -> Snapshot {
        self.controller.query(self.clock.now())
    }

    /// Validate the run fields and start (or resume) the run.
    ///
    /// Fields are validated even when resuming, matching the panel's START
    /// button; the originally bound parameters still win on resume.
    pub fn start(&mut self, raw: &RawFields) -> Result<Snapshot, PultruderError> {
        let params = ParameterSet::parse_with_policy(raw, self.range_policy)?;
        self.start_with(params)
    }

    /// Start (or resume) with already validated parameters.
    pub fn start_with(&mut self, params: ParameterSet) -> Result<Snapshot, PultruderError> {
        self.transition(|c, now| c.start(params, now))
    }

    pub fn resume(&mut self) -> Result<Snapshot, PultruderError> {
        self.transition(|c, now| c.resume(now))
    }

    pub fn pause(&mut self) -> Result<Snapshot, PultruderError> {
        self.transition(|c, now| c.pause(now))
    }

    /// Reset to Inactive, then stop the motor. The reset always sticks; a
    /// refused stop is reported afterwards.
    pub fn restart(&mut self) -> Result<Snapshot, PultruderError> {
        let cmd = self.controller.restart();
        self.test_drive_held = false;
        self.send(cmd)?;
        Ok(self.status())
    }

    /// Drive the motor manually until `release_test_drive`. Allowed in any
    /// state; the run bookkeeping is untouched.
    pub fn test_drive(&mut self, raw: &RawFields, direction: Direction) -> Result<MotorCommand, PultruderError> {
        let speed = parse_manual_test_speed(raw)?;
        let cmd = self.controller.test_drive(speed, direction)?;
        self.send(cmd)?;
        self.test_drive_held = true;
        Ok(cmd)
    }

    /// Release a held test drive. A running production run gets its own
    /// drive command back; otherwise the motor stops.
    pub fn release_test_drive(&mut self) -> Result<MotorCommand, PultruderError> {
        let cmd = self
            .controller
            .production_command()
            .unwrap_or(MotorCommand::Stop);
        self.send(cmd)?;
        self.test_drive_held = false;
        Ok(cmd)
    }

    fn transition<F>(&mut self, f: F) -> Result<Snapshot, PultruderError>
    where
        F: FnOnce(&mut ProcessController, Instant) -> Result<MotorCommand, StateError>,
    {
        let now = self.clock.now();
        let mut next = self.controller.clone();
        let cmd = f(&mut next, now)?;
        self.send(cmd)?;
        self.controller = next;
        self.test_drive_held = false;
        Ok(self.controller.query(now))
    }

    fn send(&mut self, cmd: MotorCommand) -> Result<(), PultruderError> {
        let res = match cmd {
            MotorCommand::Drive {
                speed_mm_per_min,
                direction,
            } => self.motor.drive(speed_mm_per_min, direction),
            MotorCommand::Stop => self.motor.stop(),
        };
        res.map_err(|e| {
            let mapped = map_hw_error(&*e);
            tracing::warn!(error = %mapped, ?cmd, "motor rejected command");
            mapped
        })
    }
}

// ── Builder ──────────────────────────────────────────────────────────────────

/// Type-state marker for a builder that has no motor yet.
#[derive(Debug, Default)]
pub struct Missing;

/// Builds a `Session`. `build()` only exists once a motor is provided.
pub struct SessionBuilder<M> {
    motor: M,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    control: ControlCfg,
}

impl Default for SessionBuilder<Missing> {
    fn default() -> Self {
        Self {
            motor: Missing,
            clock: None,
            control: ControlCfg::default(),
        }
    }
}

impl SessionBuilder<Missing> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M> SessionBuilder<M> {
    pub fn with_motor<N: Motor>(self, motor: N) -> SessionBuilder<N> {
        SessionBuilder {
            motor,
            clock: self.clock,
            control: self.control,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_control(mut self, control: ControlCfg) -> Self {
        self.control = control;
        self
    }

    pub fn with_run_direction(mut self, direction: Direction) -> Self {
        self.control.run_direction = direction;
        self
    }

    pub fn with_range_policy(mut self, policy: RangePolicy) -> Self {
        self.control.range_policy = policy;
        self
    }
}

impl<M: Motor> SessionBuilder<M> {
    pub fn build(self) -> Session<M> {
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()) as Arc<dyn Clock + Send + Sync>);
        Session {
            controller: ProcessController::new().with_run_direction(self.control.run_direction),
            motor: self.motor,
            clock,
            range_policy: self.control.range_policy,
            test_drive_held: false,
        }
    }
}
