//! # Execution Module Unit Tests / Execution 模块单元测试
//!
//! This module tests the outcome classification of single invocations and the
//! per-declaration execution, including data-provider aggregation.
//!
//! 此模块测试单次调用的结果分类以及每个声明的执行，包括数据提供者聚合。

mod common;

use common::*;
use predicates::prelude::*;
use std::time::Duration;
use trial_runner::core::execution::{PANIC_ERROR_NAME, classify, run_declaration};
use trial_runner::core::models::{
    ErrorExpectation, Expectation, ExpectedResult, FailureReason, ProviderCase, TestDeclaration,
};
use trial_runner::core::value::{Completion, ThrownError, Value};
use trial_runner::infra::clock::ScriptedClock;

fn expect_value(value: impl Into<Value>) -> Expectation {
    Expectation {
        result: ExpectedResult::from_value(value.into()),
        error: None,
    }
}

fn expect_error(error: ErrorExpectation) -> Expectation {
    Expectation {
        result: ExpectedResult::Unspecified,
        error: Some(error),
    }
}

#[cfg(test)]
mod classify_nothing_returned_tests {
    use super::*;

    #[test]
    fn test_passes_when_no_value_expected() {
        let outcome = classify(Completion::nothing(), &expect_value(()), Duration::ZERO).unwrap();
        assert!(outcome.passed);
        assert!(outcome.reason.is_none());
    }

    #[test]
    fn test_fails_when_value_expected() {
        let outcome = classify(Completion::nothing(), &expect_value(3), Duration::ZERO).unwrap();
        assert!(!outcome.passed);
        assert_eq!(outcome.reason, Some(FailureReason::ReturnedUndefined));
        assert_eq!(outcome.reason.unwrap().to_string(), "Test returned undefined.");
    }

    #[test]
    fn test_fails_when_error_expected_but_nothing_happened() {
        let outcome = classify(
            Completion::nothing(),
            &expect_error(ErrorExpectation::named("RangeError")),
            Duration::ZERO,
        )
        .unwrap();
        assert_eq!(outcome.reason, Some(FailureReason::ReturnedUndefined));
    }

    #[test]
    fn test_unspecified_expectation_is_not_no_value() {
        let outcome =
            classify(Completion::nothing(), &Expectation::default(), Duration::ZERO).unwrap();
        assert_eq!(outcome.reason, Some(FailureReason::ReturnedUndefined));
    }
}

#[cfg(test)]
mod classify_thrown_tests {
    use super::*;

    fn range_error(message: &str) -> Completion {
        Completion::threw(ThrownError::new("RangeError", message))
    }

    #[test]
    fn test_unexpected_error_names_the_kind() {
        let outcome = classify(range_error("oops"), &expect_value(1), Duration::ZERO).unwrap();
        assert!(!outcome.passed);
        let diagnosis = outcome.reason.unwrap().to_string();
        assert!(predicate::str::contains("RangeError").eval(&diagnosis));
        assert!(predicate::str::contains("no error was expected").eval(&diagnosis));
    }

    #[test]
    fn test_matching_kind_without_prefix_passes() {
        let outcome = classify(
            range_error("anything"),
            &expect_error(ErrorExpectation::named("RangeError")),
            Duration::ZERO,
        )
        .unwrap();
        assert!(outcome.passed);
        assert_eq!(outcome.thrown.unwrap().message, "anything");
        assert!(outcome.observed.is_undefined());
    }

    #[test]
    fn test_matching_prefix_passes() {
        let expected = ErrorExpectation::named("RangeError").with_message_prefix("bad index");
        let outcome =
            classify(range_error("bad index 7"), &expect_error(expected), Duration::ZERO).unwrap();
        assert!(outcome.passed);
    }

    #[test]
    fn test_prefix_must_match_from_the_start() {
        let expected = ErrorExpectation::named("RangeError").with_message_prefix("index");
        let outcome =
            classify(range_error("bad index 7"), &expect_error(expected), Duration::ZERO).unwrap();
        assert_eq!(outcome.reason, Some(FailureReason::ErrorMessageMismatch));
        assert_eq!(
            outcome.reason.unwrap().to_string(),
            "Correct error type was thrown, but error message was unexpected."
        );
    }

    #[test]
    fn test_prefix_matching_is_case_sensitive_and_unicode_aware() {
        let expected = ErrorExpectation::named("RangeError").with_message_prefix("Bad");
        let outcome =
            classify(range_error("bad index"), &expect_error(expected), Duration::ZERO).unwrap();
        assert!(!outcome.passed);

        let expected = ErrorExpectation::named("RangeError").with_message_prefix("índice");
        let outcome = classify(
            range_error("índice inválido"),
            &expect_error(expected),
            Duration::ZERO,
        )
        .unwrap();
        assert!(outcome.passed);
    }

    #[test]
    fn test_kind_mismatch_names_both_kinds() {
        let outcome = classify(
            Completion::threw(ThrownError::new("TypeError", "bad index 7")),
            &expect_error(ErrorExpectation::named("RangeError").with_message_prefix("bad")),
            Duration::ZERO,
        )
        .unwrap();
        assert_eq!(
            outcome.reason,
            Some(FailureReason::ErrorTypeMismatch {
                expected: "RangeError".to_string(),
                thrown: "TypeError".to_string(),
            })
        );
        assert_eq!(
            outcome.reason.unwrap().to_string(),
            "Expected RangeError to be thrown, but TypeError was thrown."
        );
    }
}

#[cfg(test)]
mod classify_returned_tests {
    use super::*;

    #[test]
    fn test_equal_value_passes() {
        let outcome = classify(Completion::returned(3), &expect_value(3), Duration::ZERO).unwrap();
        assert!(outcome.passed);
        assert_eq!(outcome.observed, Value::from(3));
    }

    #[test]
    fn test_value_when_no_value_expected() {
        let outcome = classify(Completion::returned(3), &expect_value(()), Duration::ZERO).unwrap();
        assert_eq!(
            outcome.reason,
            Some(FailureReason::UnexpectedValue {
                observed_type: "number".to_string()
            })
        );
        assert_eq!(
            outcome.reason.unwrap().to_string(),
            "Test returned a value of type number, but undefined was expected."
        );
    }

    #[test]
    fn test_type_mismatch_names_both_types() {
        let outcome =
            classify(Completion::returned("3"), &expect_value(3), Duration::ZERO).unwrap();
        let diagnosis = outcome.reason.unwrap().to_string();
        assert_eq!(
            diagnosis,
            "Test returned a value of type string, but a value of type number was expected."
        );
    }

    #[test]
    fn test_value_mismatch() {
        let outcome = classify(Completion::returned(2), &expect_value(3), Duration::ZERO).unwrap();
        assert_eq!(outcome.reason, Some(FailureReason::ValueMismatch));
        assert_eq!(
            outcome.reason.unwrap().to_string(),
            "Test return value was different from expected value."
        );
    }

    #[test]
    fn test_null_against_object_is_a_value_mismatch() {
        let outcome = classify(
            Completion::returned(Value::Null),
            &expect_value(Value::object([("a", 1)])),
            Duration::ZERO,
        )
        .unwrap();
        assert_eq!(outcome.reason, Some(FailureReason::ValueMismatch));
    }

    #[test]
    fn test_structurally_equal_arrays_do_not_match() {
        let outcome = classify(
            Completion::returned(Value::array([1, 2])),
            &expect_value(Value::array([1, 2])),
            Duration::ZERO,
        )
        .unwrap();
        assert_eq!(outcome.reason, Some(FailureReason::ValueMismatch));
    }

    #[test]
    fn test_value_returned_when_error_expected() {
        let outcome = classify(
            Completion::returned(1),
            &expect_error(ErrorExpectation::named("RangeError")),
            Duration::ZERO,
        )
        .unwrap();
        assert_eq!(
            outcome.reason,
            Some(FailureReason::TypeMismatch {
                expected: "undefined".to_string(),
                observed: "number".to_string(),
            })
        );
    }

    #[test]
    fn test_elapsed_is_carried_through() {
        let outcome = classify(Completion::returned(3), &expect_value(3), ms(4)).unwrap();
        assert_eq!(outcome.elapsed, ms(4));
    }
}

#[cfg(test)]
mod rig_fault_tests {
    use super::*;

    #[test]
    fn test_return_and_throw_is_a_rig_fault() {
        let fault = classify(returns_and_throws(&Value::Undefined), &expect_value(5), Duration::ZERO)
            .unwrap_err();
        assert_eq!(fault.value, Value::from(5));
        assert_eq!(fault.thrown.name, "Error");
    }

    #[test]
    fn test_run_declaration_surfaces_rig_fault() {
        let declaration = TestDeclaration::expect_result("faulty", returns_and_throws, 5);
        let clock = ScriptedClock::default();

        let err = run_declaration(&declaration, &clock).unwrap_err();
        assert!(err.downcast_ref::<trial_runner::RigFault>().is_some());
        assert!(err.to_string().contains("faulty"));
    }

    #[test]
    fn test_rig_fault_with_composite_value_converts_to_anyhow() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<trial_runner::RigFault>();

        let completion = Completion {
            value: Value::array([1, 2]),
            thrown: Some(ThrownError::new("Error", "boom")),
        };
        let fault = classify(completion, &expect_value(5), Duration::ZERO).unwrap_err();

        let err = anyhow::Error::new(fault);
        let fault = err.downcast_ref::<trial_runner::RigFault>().unwrap();
        assert_eq!(fault.value.type_of(), "object");
        assert_eq!(
            err.to_string(),
            "test function returned [1, 2] and threw Error: boom in the same invocation"
        );
    }
}

#[cfg(test)]
mod panic_tests {
    use super::*;

    fn indexes_empty_vec(_: &Value) -> Value {
        let items: Vec<i32> = Vec::new();
        let index = items.len() + 3;
        Value::from(items[index])
    }

    #[test]
    fn test_panic_is_classified_as_thrown_error() {
        let declaration = TestDeclaration::expect_result("out of bounds", indexes_empty_vec, 1);
        let result = run_declaration(&declaration, &ScriptedClock::new([ms(2)])).unwrap();

        assert!(!result.passed);
        assert_eq!(
            result.reason,
            Some(FailureReason::UnexpectedError {
                thrown: PANIC_ERROR_NAME.to_string()
            })
        );
        assert_eq!(
            result.diagnosis.as_deref(),
            Some("Test threw panic, but no error was expected.")
        );
        let thrown = result.thrown_error.unwrap();
        assert!(predicate::str::contains("index out of bounds").eval(&thrown.message));
        assert_eq!(result.duration, ms(2));
    }

    #[test]
    fn test_expected_panic_passes_on_message_prefix() {
        let declaration = TestDeclaration::expect_throw(
            "explicit panic",
            |_: &Value| -> Value { panic!("invalid state: {}", 7) },
            ErrorExpectation::named(PANIC_ERROR_NAME).with_message_prefix("invalid state"),
        );
        let result = run_declaration(&declaration, &ScriptedClock::default()).unwrap();

        assert!(result.passed);
        assert_eq!(result.thrown_error.unwrap().message, "invalid state: 7");
    }

    #[test]
    fn test_panicking_provider_case_reports_its_position() {
        let declaration = TestDeclaration::with_provider(
            "panics on two",
            |input: &Value| {
                if input.as_number() == Some(2.0) {
                    panic!("two is not allowed");
                }
                double(input)
            },
            [(1, 2), (2, 4), (3, 6)],
        );
        let result = run_declaration(&declaration, &ScriptedClock::default()).unwrap();

        assert_eq!(
            result.diagnosis.as_deref(),
            Some("(Test 2 of 3): Test threw panic, but no error was expected.")
        );
    }
}

#[cfg(test)]
mod run_declaration_tests {
    use super::*;

    #[test]
    fn test_plain_declaration_gets_no_input() {
        let declaration = TestDeclaration::expect_result(
            "sees undefined",
            |input: &Value| Value::from(input.is_undefined()),
            true,
        );
        let result = run_declaration(&declaration, &ScriptedClock::default()).unwrap();
        assert!(result.passed);
    }

    #[test]
    fn test_add_one_with_no_input_scenario() {
        let declaration = TestDeclaration::expect_result("always two", |_: &Value| 2, 3);
        let result = run_declaration(&declaration, &ScriptedClock::default()).unwrap();

        assert!(!result.passed);
        assert_eq!(
            result.diagnosis.as_deref(),
            Some("Test return value was different from expected value.")
        );
        assert_eq!(result.observed_result, Value::from(2));
        assert_eq!(result.expected_result, ExpectedResult::Value(Value::from(3)));
        assert_eq!(result.description, "always two");
    }

    #[test]
    fn test_add_one_receives_undefined_and_yields_nan() {
        let declaration = TestDeclaration::expect_result("x + 1", add_one, 3);
        let result = run_declaration(&declaration, &ScriptedClock::default()).unwrap();
        assert_eq!(result.reason, Some(FailureReason::ValueMismatch));
    }

    #[test]
    fn test_expect_throw_passes_on_prefix_match() {
        let declaration = TestDeclaration::expect_throw(
            "range error",
            throws_range_error,
            ErrorExpectation::named("RangeError").with_message_prefix("bad index"),
        );
        let result = run_declaration(&declaration, &ScriptedClock::new([ms(3)])).unwrap();

        assert!(result.passed);
        assert!(result.diagnosis.is_none());
        assert_eq!(result.thrown_error.unwrap().message, "bad index 7");
        assert_eq!(result.expected_error.unwrap().name, "RangeError");
        assert_eq!(result.expected_result, ExpectedResult::Unspecified);
        assert_eq!(result.duration, ms(3));
    }

    #[test]
    fn test_provider_stops_at_first_failure() {
        let declaration = TestDeclaration::with_provider(
            "doubles",
            double,
            [(1, 2), (2, 5), (3, 6)],
        );
        let clock = ScriptedClock::new([ms(2), ms(3), ms(100)]);
        let result = run_declaration(&declaration, &clock).unwrap();

        assert!(!result.passed);
        assert_eq!(
            result.diagnosis.as_deref(),
            Some("(Test 2 of 3): Test return value was different from expected value.")
        );
        assert_eq!(result.description, "[3 tests] doubles");
        assert_eq!(result.duration, ms(5));
        assert_eq!(result.observed_result, Value::from(4));
        assert_eq!(result.expected_result, ExpectedResult::Value(Value::from(5)));
        assert_eq!(clock.invocations(), 2);
    }

    #[test]
    fn test_provider_all_pass_reports_last_case() {
        let declaration = TestDeclaration::with_provider(
            "doubles",
            double,
            vec![ProviderCase::new(1, 2), ProviderCase::new(2, 4), ProviderCase::new(5, 10)],
        );
        let clock = ScriptedClock::new([ms(1), ms(2), ms(4)]);
        let result = run_declaration(&declaration, &clock).unwrap();

        assert!(result.passed);
        assert!(result.diagnosis.is_none());
        assert!(result.reason.is_none());
        assert_eq!(result.description, "[3 tests] doubles");
        assert_eq!(result.duration, ms(7));
        assert_eq!(result.observed_result, Value::from(10));
    }

    #[test]
    fn test_provider_case_expecting_no_value() {
        let declaration = TestDeclaration::with_provider(
            "only odd numbers echo",
            |input: &Value| match input.as_number() {
                Some(n) if n % 2.0 == 1.0 => Value::from(n),
                _ => Value::Undefined,
            },
            [(Value::from(1), Value::from(1)), (Value::from(2), Value::Undefined)],
        );
        let result = run_declaration(&declaration, &ScriptedClock::default()).unwrap();
        assert!(result.passed);
        assert_eq!(result.expected_result, ExpectedResult::NoValue);
    }

    #[test]
    fn test_provider_first_case_failure_prefix() {
        let declaration = TestDeclaration::with_provider("throws", throws_range_error, [(1, 1)]);
        let result = run_declaration(&declaration, &ScriptedClock::default()).unwrap();
        assert_eq!(
            result.diagnosis.as_deref(),
            Some("(Test 1 of 1): Test threw RangeError, but no error was expected.")
        );
    }

    #[test]
    fn test_empty_provider_fails() {
        let declaration =
            TestDeclaration::with_provider("nothing", double, Vec::<ProviderCase>::new());
        let result = run_declaration(&declaration, &ScriptedClock::default()).unwrap();

        assert!(!result.passed);
        assert_eq!(result.reason, Some(FailureReason::EmptyDataProvider));
        assert_eq!(result.description, "[0 tests] nothing");
        assert_eq!(result.duration, Duration::ZERO);
    }
}
