//! Operator parameters: raw text fields and their validated numeric form.
//!
//! Parsing never defaults a value. A field that is absent, blank, or not a
//! finite number is reported as a `ValidationError` naming that field. Range
//! checks are opt-in through `RangePolicy`; by default non-positive values
//! pass through untouched.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{ValidationError, ValidationIssue};
use crate::util::{MM_PER_M, SECS_PER_MIN};

/// Operator input fields, in the order they are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    FilamentLength,
    LineSpeed,
    BreakingForce,
    ManualTestSpeed,
}

impl Field {
    /// Fields required to start a run, in validation order.
    pub const RUN: [Field; 3] = [Field::FilamentLength, Field::LineSpeed, Field::BreakingForce];

    /// Machine-readable key (`set <key> <value>`, JSON output).
    pub fn key(self) -> &'static str {
        match self {
            Field::FilamentLength => "filament_length",
            Field::LineSpeed => "line_speed",
            Field::BreakingForce => "breaking_force",
            Field::ManualTestSpeed => "manual_test_speed",
        }
    }

    /// Panel label including the unit.
    pub fn label(self) -> &'static str {
        match self {
            Field::FilamentLength => "Filament Length (m)",
            Field::LineSpeed => "Line Speed (mm/min)",
            Field::BreakingForce => "Filament Breaking Force (N)",
            Field::ManualTestSpeed => "Manual Motor Speed (mm/min)",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace('-', "_");
        [
            Field::FilamentLength,
            Field::LineSpeed,
            Field::BreakingForce,
            Field::ManualTestSpeed,
        ]
        .into_iter()
        .find(|f| f.key() == norm)
        .ok_or_else(|| format!("unknown field '{}'", s.trim()))
    }
}

/// Raw operator text keyed by field, as collected from the input panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields {
    values: BTreeMap<Field, String>,
}

impl RawFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: Field, text: impl Into<String>) -> Self {
        self.set(field, text);
        self
    }

    pub fn set(&mut self, field: Field, text: impl Into<String>) {
        self.values.insert(field, text.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn clear(&mut self, field: Field) {
        self.values.remove(&field);
    }
}

impl<S: Into<String>> FromIterator<(Field, S)> for RawFields {
    fn from_iter<I: IntoIterator<Item = (Field, S)>>(iter: I) -> Self {
        let mut raw = RawFields::new();
        for (field, text) in iter {
            raw.set(field, text);
        }
        raw
    }
}

/// Range checks applied on top of numeric parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangePolicy {
    /// Accept any finite number, including zero and negatives.
    #[default]
    Passthrough,
    /// Reject values `<= 0` for the run fields.
    RequirePositive,
}

/// Validated parameters bound to a run.
///
/// `breaking_force_limit_n` is carried as data only; enforcing it belongs to
/// tension monitoring outside this crate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSet {
    pub filament_length_m: f64,
    pub line_speed_mm_per_min: f64,
    pub breaking_force_limit_n: f64,
}

impl ParameterSet {
    pub fn new(filament_length_m: f64, line_speed_mm_per_min: f64, breaking_force_limit_n: f64) -> Self {
        Self {
            filament_length_m,
            line_speed_mm_per_min,
            breaking_force_limit_n,
        }
    }

    /// Parse the run fields with the default passthrough range policy.
    pub fn parse_and_validate(raw: &RawFields) -> Result<Self, ValidationError> {
        Self::parse_with_policy(raw, RangePolicy::Passthrough)
    }

    /// Parse the run fields in `Field::RUN` order, stopping at the first failure.
    pub fn parse_with_policy(raw: &RawFields, policy: RangePolicy) -> Result<Self, ValidationError> {
        let filament_length_m = parse_ranged(raw, Field::FilamentLength, policy)?;
        let line_speed_mm_per_min = parse_ranged(raw, Field::LineSpeed, policy)?;
        let breaking_force_limit_n = parse_ranged(raw, Field::BreakingForce, policy)?;
        Ok(Self::new(
            filament_length_m,
            line_speed_mm_per_min,
            breaking_force_limit_n,
        ))
    }

    /// Line speed in metres per second.
    #[inline]
    pub fn line_speed_m_per_s(&self) -> f64 {
        self.line_speed_mm_per_min / MM_PER_M / SECS_PER_MIN
    }

    /// Filament produced after `elapsed` of running at constant line speed.
    #[inline]
    pub fn length_after(&self, elapsed: Duration) -> f64 {
        (self.line_speed_mm_per_min / MM_PER_M) * (elapsed.as_secs_f64() / SECS_PER_MIN)
    }
}

/// Parse the manual test-drive speed. Any finite number is accepted; the sign
/// is interpreted by the test drive itself.
pub fn parse_manual_test_speed(raw: &RawFields) -> Result<f64, ValidationError> {
    parse_number(raw, Field::ManualTestSpeed)
}

fn parse_ranged(raw: &RawFields, field: Field, policy: RangePolicy) -> Result<f64, ValidationError> {
    let value = parse_number(raw, field)?;
    if policy == RangePolicy::RequirePositive && value <= 0.0 {
        return Err(ValidationError::new(field, ValidationIssue::NotPositive(value)));
    }
    Ok(value)
}

fn parse_number(raw: &RawFields, field: Field) -> Result<f64, ValidationError> {
    let text = raw
        .get(field)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ValidationError::new(field, ValidationIssue::Missing))?;
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ValidationError::new(
            field,
            ValidationIssue::NotNumeric(text.to_string()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_fields(len: &str, speed: &str, force: &str) -> RawFields {
        RawFields::new()
            .with(Field::FilamentLength, len)
            .with(Field::LineSpeed, speed)
            .with(Field::BreakingForce, force)
    }

    #[test]
    fn parses_trimmed_numbers() {
        let p = ParameterSet::parse_and_validate(&run_fields(" 10 ", "600", "2.5e1")).unwrap();
        assert_eq!(p, ParameterSet::new(10.0, 600.0, 25.0));
    }

    #[test]
    fn reports_first_failing_field() {
        let err = ParameterSet::parse_and_validate(&run_fields("10", "", "abc")).unwrap_err();
        assert_eq!(err.field, Field::LineSpeed);
        assert_eq!(err.issue, ValidationIssue::Missing);
    }

    #[test]
    fn non_finite_text_is_not_numeric() {
        for bad in ["NaN", "inf", "-infinity"] {
            let err = ParameterSet::parse_and_validate(&run_fields(bad, "1", "1")).unwrap_err();
            assert_eq!(err.field, Field::FilamentLength);
            assert!(matches!(err.issue, ValidationIssue::NotNumeric(_)));
        }
    }

    #[test]
    fn field_keys_round_trip_through_from_str() {
        for f in [
            Field::FilamentLength,
            Field::LineSpeed,
            Field::BreakingForce,
            Field::ManualTestSpeed,
        ] {
            assert_eq!(f.key().parse::<Field>(), Ok(f));
        }
        assert_eq!("line-speed".parse::<Field>(), Ok(Field::LineSpeed));
        assert!("tension".parse::<Field>().is_err());
    }

    #[test]
    fn length_after_one_minute_at_600() {
        let p = ParameterSet::new(10.0, 600.0, 5.0);
        assert!((p.length_after(Duration::from_secs(60)) - 0.6).abs() < 1e-12);
        assert!((p.line_speed_m_per_s() - 0.01).abs() < 1e-12);
    }
}
