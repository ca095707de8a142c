//! Human-readable error descriptions and structured JSON error formatting.

use pultruder_core::{Field, MachineState, Operation, PultruderError, ValidationError, ValidationIssue};
use serde_json::json;

pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_VALIDATION: i32 = 3;
pub const EXIT_STATE: i32 = 4;
pub const EXIT_HARDWARE: i32 = 5;

fn domain_error(err: &eyre::Report) -> Option<PultruderError> {
    if let Some(pe) = err.downcast_ref::<PultruderError>() {
        return Some(pe.clone());
    }
    err.downcast_ref::<ValidationError>()
        .map(|ve| PultruderError::Validation(ve.clone()))
}

fn field_hint(field: Field) -> &'static str {
    match field {
        Field::FilamentLength => "--filament-length (or `set filament_length <m>`)",
        Field::LineSpeed => "--line-speed (or `set line_speed <mm/min>`)",
        Field::BreakingForce => "--breaking-force (or `set breaking_force <N>`)",
        Field::ManualTestSpeed => "--speed (or `set manual_test_speed <mm/min>`)",
    }
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(de) = domain_error(err) {
        return match de {
            PultruderError::Validation(ve) => match &ve.issue {
                ValidationIssue::Missing => format!(
                    "What happened: {} is empty.\nLikely causes: The field was not filled in.\nHow to fix: Provide a number via {}.",
                    ve.field,
                    field_hint(ve.field)
                ),
                ValidationIssue::NotNumeric(text) => format!(
                    "What happened: {} is not a number ('{text}').\nLikely causes: A typo, a unit suffix, or a decimal comma.\nHow to fix: Enter a plain number such as 600 or 2.5 via {}.",
                    ve.field,
                    field_hint(ve.field)
                ),
                ValidationIssue::NotPositive(v) => format!(
                    "What happened: {} must be greater than zero (got {v}).\nLikely causes: validation.require_positive is enabled in the config.\nHow to fix: Enter a positive value, or disable require_positive.",
                    ve.field
                ),
            },
            PultruderError::State(se) => {
                let fix = match (se.attempted, se.current) {
                    (Operation::Start, MachineState::Running) => "The run is already going; pause it first or restart.",
                    (Operation::Pause, _) => "Only a running machine can be paused; start the run first.",
                    (Operation::Resume, _) => "Only a paused run can be resumed; use start for a new run.",
                    _ => "Check the machine state with `status` and pick an allowed operation.",
                };
                format!(
                    "What happened: Cannot {} while the machine is {}.\nLikely causes: The command does not apply in the current state.\nHow to fix: {fix}",
                    se.attempted, se.current
                )
            }
            PultruderError::HardwareFault(msg) => format!(
                "What happened: The motor driver refused the command ({msg}).\nLikely causes: Speed above motor.max_speed_mm_per_min, or an invalid speed.\nHow to fix: Lower the speed or raise the limit in the [motor] config section."
            ),
            PultruderError::Hardware(msg) => format!(
                "What happened: The motor driver reported an error ({msg}).\nLikely causes: Driver not connected or not powered.\nHow to fix: Check the driver, then re-run with --log-level=debug for details."
            ),
        };
    }

    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("invalid configuration") || lower.contains("read config") {
        let detail = err
            .chain()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(": ");
        return format!(
            "What happened: Configuration could not be loaded ({detail}).\nLikely causes: Wrong path, TOML syntax error, or out-of-range values.\nHow to fix: Check the file passed to --config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable process exit codes per error class.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match domain_error(err) {
        Some(PultruderError::Validation(_)) => EXIT_VALIDATION,
        Some(PultruderError::State(_)) => EXIT_STATE,
        Some(PultruderError::Hardware(_) | PultruderError::HardwareFault(_)) => EXIT_HARDWARE,
        None => EXIT_FAILURE,
    }
}

fn reason_name(err: &PultruderError) -> &'static str {
    match err {
        PultruderError::Validation(_) => "Validation",
        PultruderError::State(_) => "State",
        PultruderError::Hardware(_) => "Hardware",
        PultruderError::HardwareFault(_) => "HardwareFault",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    let msg = humanize(err);
    match domain_error(err) {
        Some(PultruderError::Validation(ve)) => json!({
            "reason": "Validation",
            "field": ve.field.key(),
            "message": msg,
        }),
        Some(PultruderError::State(se)) => json!({
            "reason": "State",
            "attempted": se.attempted.to_string(),
            "state": se.current.to_string(),
            "message": msg,
        }),
        Some(other) => json!({ "reason": reason_name(&other), "message": msg }),
        None => json!({ "reason": "Error", "message": msg }),
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pultruder_core::StateError;

    fn report(e: PultruderError) -> eyre::Report {
        eyre::Report::new(e)
    }

    #[test]
    fn validation_maps_to_exit_3_and_names_field() {
        let e = report(PultruderError::Validation(ValidationError::new(
            Field::LineSpeed,
            ValidationIssue::NotNumeric("abc".into()),
        )));
        assert_eq!(exit_code_for_error(&e), EXIT_VALIDATION);
        assert!(humanize(&e).contains("Line Speed (mm/min) is not a number ('abc')"));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&e)).unwrap();
        assert_eq!(v["reason"], "Validation");
        assert_eq!(v["field"], "line_speed");
    }

    #[test]
    fn state_maps_to_exit_4() {
        let e = report(PultruderError::State(StateError {
            attempted: Operation::Pause,
            current: MachineState::Inactive,
        }));
        assert_eq!(exit_code_for_error(&e), EXIT_STATE);
        assert!(humanize(&e).starts_with("What happened: Cannot pause while the machine is inactive."));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&e)).unwrap();
        assert_eq!(v["state"], "inactive");
    }

    #[test]
    fn hardware_fault_maps_to_exit_5() {
        let e = report(PultruderError::HardwareFault("too fast".into()));
        assert_eq!(exit_code_for_error(&e), EXIT_HARDWARE);
    }

    #[test]
    fn wrapped_domain_error_is_still_found() {
        use eyre::WrapErr;
        let r: eyre::Result<()> = Err(PultruderError::HardwareFault("x".into())).wrap_err("drive");
        let e = r.unwrap_err();
        // wrap_err keeps the typed error reachable by downcast
        assert_eq!(exit_code_for_error(&e), EXIT_HARDWARE);
    }

    #[test]
    fn unknown_errors_fall_back_to_generic() {
        let e = eyre::eyre!("boom");
        assert_eq!(exit_code_for_error(&e), EXIT_FAILURE);
        assert!(humanize(&e).contains("Original: boom"));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&e)).unwrap();
        assert_eq!(v["reason"], "Error");
    }
}
