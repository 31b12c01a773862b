use proptest::prelude::*;
use unit_converter::convert::ConversionTable;
use unit_converter::domain::{ConversionOutcome, ConversionRequest, RejectReason, SessionState};
use unit_converter::gate::{DEFAULT_GUEST_LIMIT, Gate};

/// Pairs whose published factors were rounded independently, so
/// `forward * inverse` is not exactly 1.
const ROUNDED_PAIRS: &[(&str, &str)] = &[
    ("Length", "Kilometers to Miles"),
    ("Length", "Miles to Kilometers"),
    ("Length", "Meters to Feet"),
    ("Length", "Feet to Meters"),
    ("Length", "Centimeters to Inches"),
    ("Length", "Inches to Centimeters"),
    ("Length", "Millimeters to Inches"),
    ("Length", "Inches to Millimeters"),
    ("Length", "Yards to Meters"),
    ("Length", "Meters to Yards"),
    ("Mass", "Kilograms to Pounds"),
    ("Mass", "Pounds to Kilograms"),
    ("Mass", "Grams to Ounces"),
    ("Mass", "Ounces to Grams"),
    ("Mass", "Tons to Kilograms"),
    ("Mass", "Kilograms to Tons"),
    ("Speed", "Kilometers per Hour to Miles per Hour"),
    ("Speed", "Miles per Hour to Kilometers per Hour"),
];

fn entries() -> Vec<(&'static str, &'static str)> {
    ConversionTable::standard()
        .entries()
        .map(|(c, d, _)| (c, d))
        .collect()
}

fn any_entry() -> impl Strategy<Value = (&'static str, &'static str)> {
    proptest::sample::select(entries())
}

fn relative_tolerance(category: &str, direction: &str) -> f64 {
    if ROUNDED_PAIRS
        .iter()
        .any(|&(c, d)| c == category && d == direction)
    {
        1e-5
    } else {
        1e-9
    }
}

proptest! {
    #[test]
    fn every_entry_gives_finite_output(
        (category, direction) in any_entry(),
        v in -1.0e9_f64..1.0e9,
    ) {
        let out = ConversionTable::standard()
            .lookup_and_apply(category, direction, v)
            .unwrap();
        prop_assert!(out.is_finite(), "{category}/{direction}({v}) = {out}");
    }

    #[test]
    fn round_trip_returns_close_to_input(
        (category, direction) in any_entry(),
        v in -1.0e6_f64..1.0e6,
    ) {
        let table = ConversionTable::standard();
        let inverse = table.inverse_of(category, direction).unwrap();
        let there = table.lookup_and_apply(category, direction, v).unwrap();
        let back = table.lookup_and_apply(category, inverse, there).unwrap();

        let tol = relative_tolerance(category, direction);
        let scale = v.abs().max(1.0);
        prop_assert!(
            (back - v).abs() <= tol * scale,
            "{category}: {direction} then {inverse}: {v} -> {there} -> {back}"
        );
    }

    #[test]
    fn guest_is_never_allowed_more_than_the_limit(
        requests in proptest::collection::vec((any_entry(), any::<bool>(), -1.0e3_f64..1.0e3), 0..20),
    ) {
        let gate = Gate::default();
        let mut state = SessionState::new();
        let mut allowed = 0u32;

        for ((category, direction), valid, value) in requests {
            let request = if valid {
                ConversionRequest::new(category, direction, value)
            } else {
                ConversionRequest::new(category, "Bogus", value)
            };
            let before = state.guest_count().unwrap();
            let (next, attempt) = gate.attempt_conversion(state, &request);
            prop_assert!(attempt.record.is_none());

            match attempt.outcome {
                ConversionOutcome::Allowed(_) => {
                    allowed += 1;
                    prop_assert_eq!(next.guest_count(), Some(before + 1));
                }
                ConversionOutcome::Rejected(RejectReason::QuotaExceeded) => {
                    prop_assert_eq!(before, DEFAULT_GUEST_LIMIT);
                    prop_assert_eq!(next.guest_count(), Some(before));
                }
                ConversionOutcome::Rejected(_) => {
                    prop_assert!(!valid);
                    prop_assert_eq!(next.guest_count(), Some(before));
                }
            }
            state = next;
        }

        prop_assert!(allowed <= DEFAULT_GUEST_LIMIT);
    }

    #[test]
    fn authenticated_records_echo_the_request(
        (category, direction) in any_entry(),
        v in -1.0e6_f64..1.0e6,
    ) {
        let gate = Gate::default();
        let state = SessionState::new().login("alice");
        let (next, attempt) = gate.attempt_conversion(state.clone(), &ConversionRequest::new(category, direction, v));
        prop_assert_eq!(next, state);

        let record = attempt.record.unwrap();
        prop_assert_eq!(record.username.as_str(), "alice");
        prop_assert_eq!(record.category.as_str(), category);
        prop_assert_eq!(record.direction.as_str(), direction);
        prop_assert_eq!(record.input, v);
        prop_assert_eq!(attempt.outcome, ConversionOutcome::Allowed(record.output));
    }

    #[test]
    fn logout_resets_any_guest_count(n in 0u32..100) {
        let state = SessionState::Anonymous { guest_count: n }.logout();
        prop_assert_eq!(state, SessionState::Anonymous { guest_count: 0 });
    }
}
