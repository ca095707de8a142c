use thiserror::Error;

use crate::parameters::Field;
use crate::state::{MachineState, Operation};

/// Why a raw operator field was rejected.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationIssue {
    #[error("a value is required")]
    Missing,
    #[error("'{0}' is not a number")]
    NotNumeric(String),
    #[error("must be greater than zero (got {0})")]
    NotPositive(f64),
}

/// A raw operator field failed to parse. Carries the first offending field.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{field}: {issue}")]
pub struct ValidationError {
    pub field: Field,
    pub issue: ValidationIssue,
}

impl ValidationError {
    pub fn new(field: Field, issue: ValidationIssue) -> Self {
        Self { field, issue }
    }
}

/// A transition was requested from a state that forbids it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("cannot {attempted} while {current}")]
pub struct StateError {
    pub attempted: Operation,
    pub current: MachineState,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PultruderError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("invalid state: {0}")]
    State(#[from] StateError),
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
}
