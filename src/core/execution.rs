//! # Test Execution Engine Module / 测试执行引擎模块
//!
//! This module provides the core functionality for executing tests.
//! It invokes a test function once, times the call, and classifies what came
//! back against the expectation. It also drives a whole declaration through
//! its planned invocations, accumulating the duration and stopping at the
//! first failing data-provider case.
//!
//! 此模块为执行测试提供核心功能。
//! 它调用一次测试函数，计时，并根据期望对返回内容进行分类。
//! 它还驱动整个声明完成其计划的调用，累加持续时间，并在第一个失败的数据提供者用例处停止。

use anyhow::Result;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use crate::{
    core::{
        models::{
            ErrorExpectation, ExecutionOutcome, Expectation, ExpectedResult, FailureReason,
            RigFault, TestDeclaration, TestFn, TestResult,
        },
        planner::plan_declaration,
        value::{Completion, ThrownError, Value},
    },
    infra::clock::Clock,
};

/// The error name reported when a test function panics.
pub const PANIC_ERROR_NAME: &str = "panic";

/// The main entry point for running a single declaration.
///
/// Plain declarations run once with no input. Data-provider declarations run
/// case by case and produce a single result: the first failing case, or the
/// last case when all of them pass. The returned duration is the sum of every
/// invocation that ran.
///
/// # Arguments
/// * `declaration` - The declaration to execute
/// * `clock` - The time source used to measure each invocation
///
/// # Returns
/// A `TestResult`, or an error wrapping a [`RigFault`] when the test function
/// both returned and threw.
pub fn run_declaration<C: Clock + ?Sized>(
    declaration: &TestDeclaration,
    clock: &C,
) -> Result<TestResult> {
    let plan = plan_declaration(declaration);
    let total = plan.invocations.len();
    let mut duration = Duration::ZERO;
    let mut last = None;

    for (index, invocation) in plan.invocations.iter().enumerate() {
        let outcome = run_invocation(&plan.test, &invocation.input, &invocation.expectation, clock)
            .map_err(|fault| {
                anyhow::Error::new(fault)
                    .context(format!("Rig fault in test '{}'", plan.description))
            })?;
        duration += outcome.elapsed;

        let failed = !outcome.passed;
        last = Some((index + 1, invocation, outcome));
        if failed {
            break;
        }
    }

    let Some((position, invocation, outcome)) = last else {
        return Ok(TestResult::empty_provider(plan.description));
    };

    Ok(TestResult::from_outcome(
        plan.description,
        &invocation.expectation,
        outcome,
        duration,
        plan.is_data_driven.then_some((position, total)),
    ))
}

/// Invokes the test function once and classifies the completion.
///
/// Only the call itself is timed; classification happens after the second
/// clock reading. A panic inside the test function counts as a thrown
/// `panic` error and is classified like any other throw.
pub fn run_invocation<C: Clock + ?Sized>(
    test: &TestFn,
    input: &Value,
    expectation: &Expectation,
    clock: &C,
) -> Result<ExecutionOutcome, RigFault> {
    let started = clock.now();
    // Catch panics so a single test doesn't abort the entire run
    let completion = panic::catch_unwind(AssertUnwindSafe(|| test(input)))
        .unwrap_or_else(|payload| Completion::threw(panic_error(payload.as_ref())));
    let elapsed = clock.now().saturating_sub(started);

    classify(completion, expectation, elapsed)
}

/// Turns a panic payload into the error a test function is said to have thrown.
fn panic_error(payload: &(dyn Any + Send)) -> ThrownError {
    let message = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::new()
    };
    ThrownError::new(PANIC_ERROR_NAME, message)
}

/// Classifies a completion against an expectation.
///
/// Precedence: nothing returned and nothing thrown, then thrown, then
/// returned. A completion that both returned a value and threw is a
/// [`RigFault`].
///
/// 根据期望对调用结果进行分类。同时返回值并抛出错误的调用结果是 [`RigFault`]。
pub fn classify(
    completion: Completion,
    expectation: &Expectation,
    elapsed: Duration,
) -> Result<ExecutionOutcome, RigFault> {
    let Completion { value, thrown } = completion;

    let reason = match (value.is_undefined(), &thrown) {
        (true, None) => {
            if expectation.result.is_no_value() {
                None
            } else {
                Some(FailureReason::ReturnedUndefined)
            }
        }
        (true, Some(error)) => check_thrown(error, expectation.error.as_ref()),
        (false, None) => check_returned(&value, &expectation.result),
        (false, Some(error)) => {
            return Err(RigFault {
                value,
                thrown: error.clone(),
            });
        }
    };

    Ok(ExecutionOutcome::new(reason, value, thrown, elapsed))
}

fn check_thrown(error: &ThrownError, expected: Option<&ErrorExpectation>) -> Option<FailureReason> {
    let Some(expected) = expected else {
        return Some(FailureReason::UnexpectedError {
            thrown: error.name.clone(),
        });
    };

    if error.name != expected.name {
        return Some(FailureReason::ErrorTypeMismatch {
            expected: expected.name.clone(),
            thrown: error.name.clone(),
        });
    }

    match &expected.message_prefix {
        Some(prefix) if !error.message.starts_with(prefix.as_str()) => {
            Some(FailureReason::ErrorMessageMismatch)
        }
        _ => None,
    }
}

fn check_returned(value: &Value, expected: &ExpectedResult) -> Option<FailureReason> {
    if expected.is_no_value() {
        return Some(FailureReason::UnexpectedValue {
            observed_type: value.type_of().to_string(),
        });
    }

    if value.type_of() != expected.type_of() {
        return Some(FailureReason::TypeMismatch {
            expected: expected.type_of().to_string(),
            observed: value.type_of().to_string(),
        });
    }

    match expected {
        ExpectedResult::Value(expected) if value.strict_equals(expected) => None,
        _ => Some(FailureReason::ValueMismatch),
    }
}
