//! `From` implementations bridging `pultruder_config` types to core types.

use pultruder_traits::Direction;

use crate::config::{ControlCfg, PollCfg};
use crate::parameters::RangePolicy;

fn drive_direction(d: pultruder_config::DriveDirection) -> Direction {
    match d {
        pultruder_config::DriveDirection::Cw => Direction::Cw,
        pultruder_config::DriveDirection::Ccw => Direction::Ccw,
    }
}

impl From<&pultruder_config::ValidationCfg> for RangePolicy {
    fn from(c: &pultruder_config::ValidationCfg) -> Self {
        if c.require_positive {
            RangePolicy::RequirePositive
        } else {
            RangePolicy::Passthrough
        }
    }
}

impl From<&pultruder_config::Config> for ControlCfg {
    fn from(c: &pultruder_config::Config) -> Self {
        Self {
            run_direction: drive_direction(c.run.direction),
            range_policy: (&c.validation).into(),
        }
    }
}

impl From<&pultruder_config::RunCfg> for PollCfg {
    fn from(c: &pultruder_config::RunCfg) -> Self {
        Self {
            poll_hz: c.poll_hz,
            stop_at_target: c.stop_at_target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_config_sections() {
        let cfg = pultruder_config::load_toml(
            r#"
[run]
direction = "ccw"
poll_hz = 4
stop_at_target = false

[validation]
require_positive = true
"#,
        )
        .unwrap();
        let control = ControlCfg::from(&cfg);
        assert_eq!(control.run_direction, Direction::Ccw);
        assert_eq!(control.range_policy, RangePolicy::RequirePositive);
        let poll = PollCfg::from(&cfg.run);
        assert_eq!(poll.poll_hz, 4);
        assert!(!poll.stop_at_target);
    }

    #[test]
    fn drive_direction_maps_both_ways() {
        assert_eq!(drive_direction(pultruder_config::DriveDirection::Cw), Direction::Cw);
        assert_eq!(drive_direction(pultruder_config::DriveDirection::Ccw), Direction::Ccw);
    }

    #[test]
    fn defaults_match_core_defaults() {
        let cfg = pultruder_config::Config::default();
        assert_eq!(ControlCfg::from(&cfg), ControlCfg::default());
        assert_eq!(PollCfg::from(&cfg.run), PollCfg::default());
    }
}
