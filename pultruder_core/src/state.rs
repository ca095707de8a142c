//! Machine lifecycle states and the operations that move between them.

use core::fmt;

/// Lifecycle state of the pultruder. There is no terminal state; `restart`
/// always returns to `Inactive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MachineState {
    #[default]
    Inactive,
    Running,
    Paused,
}

impl MachineState {
    /// Upper-case label shown on the operator status line.
    pub fn label(self) -> &'static str {
        match self {
            MachineState::Inactive => "INACTIVE",
            MachineState::Running => "RUNNING",
            MachineState::Paused => "PAUSED",
        }
    }

    pub fn is_running(self) -> bool {
        matches!(self, MachineState::Running)
    }
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MachineState::Inactive => "inactive",
            MachineState::Running => "running",
            MachineState::Paused => "paused",
        })
    }
}

/// Operator-level operations, used to name the attempted action in errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Start,
    Resume,
    Pause,
    Restart,
    TestDrive,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Start => "start",
            Operation::Resume => "resume",
            Operation::Pause => "pause",
            Operation::Restart => "restart",
            Operation::TestDrive => "test-drive",
        })
    }
}
