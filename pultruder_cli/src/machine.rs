//! Machine assembly: config mapping, time source, and the simulated drive.

use std::sync::Arc;

use pultruder_config::Config;
use pultruder_core::{ControlCfg, Session, SessionBuilder};
use pultruder_hardware::{MotorProbe, SimulatedMotor, StepperProfile};
use pultruder_traits::{Clock, ManualClock, MonotonicClock};

pub type SharedClock = Arc<dyn Clock + Send + Sync>;

pub struct Machine {
    pub session: Session<SimulatedMotor>,
    pub clock: SharedClock,
    pub probe: MotorProbe,
}

pub fn make_clock(simulated: bool) -> SharedClock {
    if simulated {
        Arc::new(ManualClock::new())
    } else {
        Arc::new(MonotonicClock::new())
    }
}

pub fn stepper_profile(cfg: &Config) -> StepperProfile {
    StepperProfile {
        steps_per_mm: cfg.motor.steps_per_mm,
        max_speed_mm_per_min: cfg.motor.max_speed_mm_per_min,
    }
}

/// Wire config, clock, and motor into a ready session.
pub fn assemble(cfg: &Config, clock: SharedClock) -> Machine {
    let motor = SimulatedMotor::new(stepper_profile(cfg));
    let probe = motor.probe();
    let control: ControlCfg = cfg.into();
    tracing::debug!(
        run_direction = %control.run_direction,
        range_policy = ?control.range_policy,
        "assembling session"
    );
    let session = SessionBuilder::new()
        .with_motor(motor)
        .with_clock(Arc::clone(&clock))
        .with_control(control)
        .build();
    Machine {
        session,
        clock,
        probe,
    }
}
