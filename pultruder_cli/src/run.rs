//! One-shot commands: production run, manual test drive, self-check.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use pultruder_config::Config;
use pultruder_core::util::period_ms;
use pultruder_core::{Field, PollCfg, RawFields, Snapshot};
use pultruder_hardware::DriveEvent;
use pultruder_traits::Direction;

use crate::display;
use crate::machine::{self, Machine};

/// Why the run loop handed control back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    TargetReached,
    TimeLimit,
    Interrupted,
}

impl RunEnd {
    fn describe(self) -> &'static str {
        match self {
            RunEnd::TargetReached => "target length reached",
            RunEnd::TimeLimit => "time limit reached",
            RunEnd::Interrupted => "interrupted",
        }
    }
}

pub struct RunArgs {
    pub filament_length: String,
    pub line_speed: String,
    pub breaking_force: String,
    pub max_seconds: Option<u64>,
    pub simulated_time: bool,
    pub json: bool,
}

pub fn run_fields(args: &RunArgs) -> RawFields {
    RawFields::new()
        .with(Field::FilamentLength, args.filament_length.as_str())
        .with(Field::LineSpeed, args.line_speed.as_str())
        .with(Field::BreakingForce, args.breaking_force.as_str())
}

/// Start a run and poll it until the target, the time limit, or Ctrl-C.
/// The run is always left paused.
pub fn run(cfg: &Config, args: &RunArgs, shutdown: &Arc<AtomicBool>) -> eyre::Result<Snapshot> {
    let poll: PollCfg = (&cfg.run).into();
    let Machine {
        mut session, clock, ..
    } = machine::assemble(cfg, machine::make_clock(args.simulated_time));

    let first = session.start(&run_fields(args))?;
    display::emit(&first, args.json);

    // The drive refuses negative speeds at start, so only a stopped line or a
    // non-positive target can stall a simulated run.
    if args.simulated_time && args.max_seconds.is_none() {
        let progresses = session
            .controller()
            .active_parameters()
            .is_some_and(|p| p.line_speed_mm_per_min != 0.0 && p.filament_length_m > 0.0);
        if !(poll.stop_at_target && progresses) {
            session.pause()?;
            eyre::bail!("simulated run would never finish; pass --max-seconds");
        }
    }

    let period = Duration::from_millis(period_ms(poll.poll_hz));
    let limit = args.max_seconds.map(Duration::from_secs);
    let end = loop {
        clock.sleep(period);
        if shutdown.load(Ordering::Relaxed) {
            break RunEnd::Interrupted;
        }
        let snap = session.status();
        display::emit(&snap, args.json);
        if poll.stop_at_target && snap.target_reached() {
            break RunEnd::TargetReached;
        }
        if limit.is_some_and(|l| snap.elapsed >= l) {
            break RunEnd::TimeLimit;
        }
    };

    let last = session.pause()?;
    tracing::info!(reason = end.describe(), elapsed_s = last.elapsed_secs(), "run stopped");
    if args.json {
        display::emit(&last, true);
    } else {
        println!(
            "Run paused ({}): {} elapsed, {:.3} m produced, {:.1} % complete",
            end.describe(),
            last.elapsed_hms(),
            last.length_produced_m,
            last.percent_complete
        );
    }
    Ok(last)
}

/// Hold a manual drive for `hold`, then release it.
pub fn test_drive(
    cfg: &Config,
    speed: &str,
    direction: Direction,
    hold: Duration,
    simulated_time: bool,
) -> eyre::Result<()> {
    let Machine {
        mut session,
        clock,
        probe,
    } = machine::assemble(cfg, machine::make_clock(simulated_time));
    let raw = RawFields::new().with(Field::ManualTestSpeed, speed);
    session.test_drive(&raw, direction)?;
    if let Some(DriveEvent::Drive {
        speed_mm_per_min,
        direction,
        step_rate_hz,
    }) = probe.last()
    {
        println!("Test drive {direction} at {speed_mm_per_min} mm/min ({step_rate_hz} steps/s)");
    }
    clock.sleep(hold);
    session.release_test_drive()?;
    println!("Test drive released after {} ms", hold.as_millis());
    Ok(())
}

/// Load-independent health check of the configured drive chain.
pub fn self_check(cfg: &Config) -> eyre::Result<()> {
    let Machine {
        mut session, probe, ..
    } = machine::assemble(cfg, machine::make_clock(true));
    let raw = RawFields::new().with(Field::ManualTestSpeed, "0");
    session.test_drive(&raw, Direction::Cw)?;
    session.release_test_drive()?;
    eyre::ensure!(
        probe.events().len() == 2 && !probe.is_driving(),
        "simulated drive did not record drive/stop"
    );
    println!(
        "ok: steps_per_mm={} max_speed_mm_per_min={} poll_hz={}",
        cfg.motor.steps_per_mm, cfg.motor.max_speed_mm_per_min, cfg.run.poll_hz
    );
    Ok(())
}
