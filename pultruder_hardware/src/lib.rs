//! Motor drivers for the pultruder puller.
//!
//! Only a simulated driver ships here: it validates commands against a
//! `StepperProfile`, logs the resulting step rate, and records every command
//! so callers and tests can observe what the drive was told to do.

pub mod error;
pub mod stepper;

use pultruder_traits::{Direction, Motor};
use std::sync::{Arc, Mutex};

pub use error::HwError;
pub use stepper::StepperProfile;

/// A command as seen by the drive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriveEvent {
    Drive {
        speed_mm_per_min: f64,
        direction: Direction,
        step_rate_hz: u32,
    },
    Stop,
}

#[derive(Debug, Default)]
struct DriveLog {
    events: Vec<DriveEvent>,
}

/// Read-only view of a `SimulatedMotor`, usable after the motor has been
/// moved into a session.
#[derive(Debug, Clone)]
pub struct MotorProbe {
    log: Arc<Mutex<DriveLog>>,
}

impl MotorProbe {
    pub fn events(&self) -> Vec<DriveEvent> {
        self.log.lock().map(|l| l.events.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<DriveEvent> {
        self.log.lock().ok().and_then(|l| l.events.last().copied())
    }

    /// True when the last accepted command was a drive at non-zero speed.
    pub fn is_driving(&self) -> bool {
        matches!(self.last(), Some(DriveEvent::Drive { step_rate_hz, .. }) if step_rate_hz > 0)
    }
}

/// Simulated motor implementation
#[derive(Debug)]
pub struct SimulatedMotor {
    profile: StepperProfile,
    log: Arc<Mutex<DriveLog>>,
}

impl Default for SimulatedMotor {
    fn default() -> Self {
        Self::new(StepperProfile::default())
    }
}

impl SimulatedMotor {
    pub fn new(profile: StepperProfile) -> Self {
        Self {
            profile,
            log: Arc::new(Mutex::new(DriveLog::default())),
        }
    }

    pub fn profile(&self) -> &StepperProfile {
        &self.profile
    }

    pub fn probe(&self) -> MotorProbe {
        MotorProbe {
            log: Arc::clone(&self.log),
        }
    }

    fn record(&self, event: DriveEvent) {
        if let Ok(mut log) = self.log.lock() {
            log.events.push(event);
        }
    }
}

impl Motor for SimulatedMotor {
    fn drive(
        &mut self,
        speed_mm_per_min: f64,
        direction: Direction,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let step_rate_hz = self.profile.step_rate_hz(speed_mm_per_min).map_err(|e| {
            tracing::error!(error = %e, "drive command rejected");
            Box::new(e) as Box<dyn std::error::Error + Send + Sync>
        })?;
        tracing::debug!(
            speed_mm_per_min,
            %direction,
            step_rate_hz,
            "motor drive (simulated)"
        );
        self.record(DriveEvent::Drive {
            speed_mm_per_min,
            direction,
            step_rate_hz,
        });
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::debug!("motor stop (simulated)");
        self.record(DriveEvent::Stop);
        Ok(())
    }
}
