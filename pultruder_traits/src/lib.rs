pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Rotation direction of the puller drive, as seen from the operator panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Clockwise; the production draw direction on the reference machine.
    Cw,
    /// Counter-clockwise.
    Ccw,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Cw => Direction::Ccw,
            Direction::Ccw => Direction::Cw,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Cw => "cw",
            Direction::Ccw => "ccw",
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cw" => Ok(Direction::Cw),
            "ccw" => Ok(Direction::Ccw),
            other => Err(format!("unknown direction '{other}' (expected cw or ccw)")),
        }
    }
}

/// Puller motor driver. Speeds are line speeds in mm/min; the driver owns the
/// conversion to its native step rate.
pub trait Motor {
    fn drive(
        &mut self,
        speed_mm_per_min: f64,
        direction: Direction,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<M: Motor + ?Sized> Motor for Box<M> {
    fn drive(
        &mut self,
        speed_mm_per_min: f64,
        direction: Direction,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).drive(speed_mm_per_min, direction)
    }

    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).stop()
    }
}
