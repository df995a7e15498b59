// Shared test helpers for integration tests
#![allow(dead_code)]

use std::time::Duration;
use trial_runner::core::value::{Completion, ThrownError, Value};

/// `x => x + 1`
pub fn add_one(input: &Value) -> Value {
    Value::from(input.as_number().unwrap_or(f64::NAN) + 1.0)
}

/// `x => x * 2`
pub fn double(input: &Value) -> Value {
    Value::from(input.as_number().unwrap_or(f64::NAN) * 2.0)
}

/// Always throws `RangeError: bad index 7`.
pub fn throws_range_error(_: &Value) -> Completion {
    Completion::threw(ThrownError::new("RangeError", "bad index 7"))
}

/// Returns 5 and throws at the same time.
pub fn returns_and_throws(_: &Value) -> Completion {
    Completion {
        value: Value::from(5),
        thrown: Some(ThrownError::new("Error", "boom")),
    }
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}
