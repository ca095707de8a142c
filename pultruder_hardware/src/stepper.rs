//! Line speed to stepper pulse-rate conversion.

use crate::error::{HwError, Result};

/// Mechanical profile of the puller's stepper drive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepperProfile {
    /// Steps per millimetre of filament drawn.
    pub steps_per_mm: f64,
    /// Fastest line speed the drive accepts (mm/min).
    pub max_speed_mm_per_min: f64,
}

impl Default for StepperProfile {
    fn default() -> Self {
        Self {
            steps_per_mm: 80.0,
            max_speed_mm_per_min: 5_000.0,
        }
    }
}

impl StepperProfile {
    /// Step rate in Hz for a line speed, rounded to nearest and saturating at
    /// `u32::MAX`. Rejects negative, non-finite, and over-limit speeds.
    pub fn step_rate_hz(&self, speed_mm_per_min: f64) -> Result<u32> {
        if !speed_mm_per_min.is_finite() || speed_mm_per_min < 0.0 {
            return Err(HwError::InvalidSpeed(speed_mm_per_min));
        }
        if speed_mm_per_min > self.max_speed_mm_per_min {
            return Err(HwError::SpeedLimit {
                requested: speed_mm_per_min,
                max: self.max_speed_mm_per_min,
            });
        }
        let hz = (speed_mm_per_min * self.steps_per_mm / 60.0).round();
        if hz >= f64::from(u32::MAX) {
            Ok(u32::MAX)
        } else {
            Ok(hz as u32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0)]
    #[case(600.0, 800)]
    #[case(45.0, 60)]
    #[case(5_000.0, 6_667)]
    fn converts_line_speed(#[case] mm_per_min: f64, #[case] hz: u32) {
        let p = StepperProfile::default();
        assert_eq!(p.step_rate_hz(mm_per_min).unwrap(), hz);
    }

    #[test]
    fn rejects_bad_speeds() {
        let p = StepperProfile::default();
        assert!(matches!(p.step_rate_hz(-1.0), Err(HwError::InvalidSpeed(_))));
        assert!(matches!(p.step_rate_hz(f64::INFINITY), Err(HwError::InvalidSpeed(_))));
        assert!(matches!(
            p.step_rate_hz(5_000.5),
            Err(HwError::SpeedLimit { .. })
        ));
    }
}
