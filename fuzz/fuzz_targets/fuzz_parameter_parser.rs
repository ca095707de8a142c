#![no_main]
use libfuzzer_sys::fuzz_target;
use pultruder_core::{Field, ParameterSet, RangePolicy, RawFields, parse_manual_test_speed};

fuzz_target!(|input: (&str, &str, &str, &str)| {
    let (len, speed, force, manual) = input;
    let raw = RawFields::new()
        .with(Field::FilamentLength, len)
        .with(Field::LineSpeed, speed)
        .with(Field::BreakingForce, force)
        .with(Field::ManualTestSpeed, manual);
    for policy in [RangePolicy::Passthrough, RangePolicy::RequirePositive] {
        if let Ok(p) = ParameterSet::parse_with_policy(&raw, policy) {
            assert!(p.filament_length_m.is_finite());
            assert!(p.line_speed_mm_per_min.is_finite());
            assert!(p.breaking_force_limit_n.is_finite());
            if policy == RangePolicy::RequirePositive {
                assert!(p.line_speed_mm_per_min > 0.0);
            }
        }
    }
    if let Ok(v) = parse_manual_test_speed(&raw) {
        assert!(v.is_finite());
    }
});
