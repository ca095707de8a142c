#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Process-control core for the filament pultruder (hardware-agnostic).
//!
//! The core is a synchronous state machine. Callers pass the current instant
//! into every transition and forward the returned `MotorCommand` to the
//! drive; nothing here reads a clock or touches hardware on its own.
//!
//! ## Architecture
//!
//! - **Parameters**: raw operator text → validated `ParameterSet` (`parameters`)
//! - **Controller**: Inactive / Running / Paused with pause-aware run time (`controller`)
//! - **Snapshot**: elapsed time, length produced, percent complete (`snapshot`)
//! - **Session**: controller + clock + motor with all-or-nothing commits (`session`)
//! - **Configuration**: runtime config structs and TOML bridges (`config`, `conversions`)
//!
//! Length produced models constant-speed production:
//! `length_m = (line_speed_mm_per_min / 1000) * (elapsed_s / 60)`.

pub mod config;
pub mod controller;
pub mod conversions;
pub mod error;
pub mod hw_error;
pub mod parameters;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod util;

pub use config::{ControlCfg, PollCfg};
pub use controller::{MotorCommand, ProcessController};
pub use error::{PultruderError, StateError, ValidationError, ValidationIssue};
pub use parameters::{Field, ParameterSet, RangePolicy, RawFields, parse_manual_test_speed};
pub use session::{Session, SessionBuilder};
pub use snapshot::Snapshot;
pub use state::{MachineState, Operation};
pub use util::format_hms;

pub use pultruder_traits::Direction;
