//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the runner.
//! It includes test declarations, normalized expectations, per-invocation
//! outcomes, the result records handed back to the caller, and the rig fault
//! raised when a test function contradicts itself.
//!
//! 此模块定义了整个运行器中使用的核心数据结构。
//! 它包括测试声明、规范化的期望、单次调用结果、返回给调用者的结果记录，
//! 以及测试函数自相矛盾时抛出的装置故障。

use crate::core::value::{Completion, ThrownError, Value};
use crate::infra::t;
use anyhow::Result;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// A test function: one input in, one completion out.
pub type TestFn = Rc<dyn Fn(&Value) -> Completion>;

fn test_fn<F, R>(test: F) -> TestFn
where
    F: Fn(&Value) -> R + 'static,
    R: Into<Completion>,
{
    Rc::new(move |input: &Value| -> Completion { test(input).into() })
}

/// The error a test expects its function to throw.
/// 测试期望其函数抛出的错误。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorExpectation {
    /// The exact error kind, e.g. `"RangeError"` / 精确的错误类型
    pub name: String,
    /// When set, the thrown message must start with this text.
    /// 设置后，抛出的消息必须以此文本开头。
    #[serde(default)]
    pub message_prefix: Option<String>,
}

impl ErrorExpectation {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message_prefix: None,
        }
    }

    pub fn with_message_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.message_prefix = Some(prefix.into());
        self
    }
}

/// One row of a data-provider table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderCase {
    pub input: Value,
    pub expected_output: Value,
}

impl ProviderCase {
    pub fn new(input: impl Into<Value>, expected_output: impl Into<Value>) -> Self {
        Self {
            input: input.into(),
            expected_output: expected_output.into(),
        }
    }
}

impl<I: Into<Value>, O: Into<Value>> From<(I, O)> for ProviderCase {
    fn from((input, expected_output): (I, O)) -> Self {
        ProviderCase::new(input, expected_output)
    }
}

/// A declared test, as provided by the caller.
///
/// Declarations are read-only: running them never changes them, so the same
/// list can be run any number of times.
///
/// 调用者提供的测试声明。声明是只读的，同一列表可以运行任意多次。
#[derive(Clone)]
pub enum TestDeclaration {
    /// The function, called with no input, must return `expected`.
    /// `Value::Undefined` means the function must return nothing.
    ExpectResult {
        description: String,
        test: TestFn,
        expected: Value,
    },
    /// The function, called with no input, must throw a matching error.
    ExpectThrow {
        description: String,
        test: TestFn,
        error: ErrorExpectation,
    },
    /// The function is called once per case, in order, until one fails.
    WithProvider {
        description: String,
        test: TestFn,
        cases: Vec<ProviderCase>,
    },
}

impl TestDeclaration {
    pub fn expect_result<F, R>(
        description: impl Into<String>,
        test: F,
        expected: impl Into<Value>,
    ) -> Self
    where
        F: Fn(&Value) -> R + 'static,
        R: Into<Completion>,
    {
        TestDeclaration::ExpectResult {
            description: description.into(),
            test: test_fn(test),
            expected: expected.into(),
        }
    }

    pub fn expect_throw<F, R>(
        description: impl Into<String>,
        test: F,
        error: ErrorExpectation,
    ) -> Self
    where
        F: Fn(&Value) -> R + 'static,
        R: Into<Completion>,
    {
        TestDeclaration::ExpectThrow {
            description: description.into(),
            test: test_fn(test),
            error,
        }
    }

    pub fn with_provider<F, R, I, C>(description: impl Into<String>, test: F, cases: I) -> Self
    where
        F: Fn(&Value) -> R + 'static,
        R: Into<Completion>,
        I: IntoIterator<Item = C>,
        C: Into<ProviderCase>,
    {
        TestDeclaration::WithProvider {
            description: description.into(),
            test: test_fn(test),
            cases: cases.into_iter().map(Into::into).collect(),
        }
    }

    /// The description exactly as declared.
    pub fn description(&self) -> &str {
        match self {
            TestDeclaration::ExpectResult { description, .. }
            | TestDeclaration::ExpectThrow { description, .. }
            | TestDeclaration::WithProvider { description, .. } => description,
        }
    }

    /// The description shown in results.
    ///
    /// Data-provider declarations are prefixed with their case count,
    /// e.g. `"[3 tests] doubles numbers"`.
    ///
    /// 结果中显示的描述。数据提供者声明会以用例数量作为前缀。
    pub fn display_description(&self) -> String {
        match self {
            TestDeclaration::WithProvider {
                description, cases, ..
            } => format!("[{} tests] {}", cases.len(), description),
            _ => self.description().to_string(),
        }
    }

    pub fn test(&self) -> &TestFn {
        match self {
            TestDeclaration::ExpectResult { test, .. }
            | TestDeclaration::ExpectThrow { test, .. }
            | TestDeclaration::WithProvider { test, .. } => test,
        }
    }

    pub fn is_data_driven(&self) -> bool {
        matches!(self, TestDeclaration::WithProvider { .. })
    }
}

impl fmt::Debug for TestDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestDeclaration::ExpectResult {
                description,
                expected,
                ..
            } => f
                .debug_struct("ExpectResult")
                .field("description", description)
                .field("expected", expected)
                .finish_non_exhaustive(),
            TestDeclaration::ExpectThrow {
                description, error, ..
            } => f
                .debug_struct("ExpectThrow")
                .field("description", description)
                .field("error", error)
                .finish_non_exhaustive(),
            TestDeclaration::WithProvider {
                description, cases, ..
            } => f
                .debug_struct("WithProvider")
                .field("description", description)
                .field("cases", cases)
                .finish_non_exhaustive(),
        }
    }
}

/// What a test expects its function to return.
///
/// `Unspecified` and `NoValue` differ: only `NoValue` lets a function that
/// returns nothing pass.
///
/// 测试期望其函数返回的内容。只有 `NoValue` 允许不返回任何内容的函数通过。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ExpectedResult {
    /// No expected result was declared.
    #[default]
    Unspecified,
    /// The function must return nothing.
    NoValue,
    /// The function must return this value.
    Value(Value),
}

impl ExpectedResult {
    /// Maps a declared value onto an expectation, `Undefined` meaning "no value".
    pub fn from_value(value: Value) -> Self {
        if value.is_undefined() {
            ExpectedResult::NoValue
        } else {
            ExpectedResult::Value(value)
        }
    }

    /// The dynamic type tag the returned value must carry.
    pub fn type_of(&self) -> &'static str {
        match self {
            ExpectedResult::Unspecified | ExpectedResult::NoValue => "undefined",
            ExpectedResult::Value(value) => value.type_of(),
        }
    }

    pub fn is_no_value(&self) -> bool {
        matches!(self, ExpectedResult::NoValue)
    }
}

/// A normalized expectation for a single invocation.
/// 单次调用的规范化期望。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expectation {
    pub result: ExpectedResult,
    pub error: Option<ErrorExpectation>,
}

/// Enumerates the reasons an invocation can fail.
/// The `Display` form of each reason is the diagnosis shown to the user.
///
/// 枚举调用失败的可能原因。每个原因的 `Display` 形式即展示给用户的诊断信息。
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub enum FailureReason {
    /// Nothing was returned and nothing was thrown, but no "no value" result was expected.
    ReturnedUndefined,
    /// An error was thrown but none was expected.
    UnexpectedError { thrown: String },
    /// The thrown error kind differs from the expected one.
    ErrorTypeMismatch { expected: String, thrown: String },
    /// The error kind matched but the message did not start with the expected prefix.
    ErrorMessageMismatch,
    /// A value was returned but the test expected no value.
    UnexpectedValue { observed_type: String },
    /// The returned value has a different type tag than the expected value.
    TypeMismatch { expected: String, observed: String },
    /// Same type tag, different value.
    ValueMismatch,
    /// A data provider had no rows, so nothing could be checked.
    EmptyDataProvider,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::ReturnedUndefined => write!(f, "Test returned undefined."),
            FailureReason::UnexpectedError { thrown } => {
                write!(f, "Test threw {}, but no error was expected.", thrown)
            }
            FailureReason::ErrorTypeMismatch { expected, thrown } => write!(
                f,
                "Expected {} to be thrown, but {} was thrown.",
                expected, thrown
            ),
            FailureReason::ErrorMessageMismatch => write!(
                f,
                "Correct error type was thrown, but error message was unexpected."
            ),
            FailureReason::UnexpectedValue { observed_type } => write!(
                f,
                "Test returned a value of type {}, but undefined was expected.",
                observed_type
            ),
            FailureReason::TypeMismatch { expected, observed } => write!(
                f,
                "Test returned a value of type {}, but a value of type {} was expected.",
                observed, expected
            ),
            FailureReason::ValueMismatch => {
                write!(f, "Test return value was different from expected value.")
            }
            FailureReason::EmptyDataProvider => {
                write!(f, "Data provider contained no test cases.")
            }
        }
    }
}

/// The classified outcome of one invocation of a test function.
/// 单次调用测试函数的分类结果。
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    pub passed: bool,
    pub reason: Option<FailureReason>,
    pub observed: Value,
    pub thrown: Option<ThrownError>,
    /// Time spent inside the test function only.
    pub elapsed: Duration,
}

impl ExecutionOutcome {
    pub fn new(
        reason: Option<FailureReason>,
        observed: Value,
        thrown: Option<ThrownError>,
        elapsed: Duration,
    ) -> Self {
        Self {
            passed: reason.is_none(),
            reason,
            observed,
            thrown,
            elapsed,
        }
    }
}

/// The result record produced for one declaration.
///
/// For data-provider declarations it describes the first failing case, or the
/// last case when every case passed, and `duration` covers every case that ran.
///
/// 为一个声明生成的结果记录。
/// 对于数据提供者声明，它描述第一个失败的用例（全部通过时为最后一个用例），
/// `duration` 覆盖所有已运行的用例。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    pub passed: bool,
    /// Structured failure reason, `None` on pass.
    pub reason: Option<FailureReason>,
    /// Human-readable diagnosis, `None` on pass.
    pub diagnosis: Option<String>,
    pub description: String,
    pub expected_result: ExpectedResult,
    pub observed_result: Value,
    pub expected_error: Option<ErrorExpectation>,
    pub thrown_error: Option<ThrownError>,
    /// Cumulative time spent inside the test function.
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}

impl TestResult {
    /// Builds a result from the outcome of the invocation it represents.
    ///
    /// `position` is `(index, total)` for data-provider cases (1-based index);
    /// a failing case gets its diagnosis prefixed with `"(Test i of N): "`.
    pub fn from_outcome(
        description: String,
        expectation: &Expectation,
        outcome: ExecutionOutcome,
        duration: Duration,
        position: Option<(usize, usize)>,
    ) -> Self {
        let diagnosis = outcome.reason.as_ref().map(|reason| match position {
            Some((index, total)) => format!("(Test {} of {}): {}", index, total, reason),
            None => reason.to_string(),
        });

        Self {
            passed: outcome.passed,
            reason: outcome.reason,
            diagnosis,
            description,
            expected_result: expectation.result.clone(),
            observed_result: outcome.observed,
            expected_error: expectation.error.clone(),
            thrown_error: outcome.thrown,
            duration,
        }
    }

    /// The result of a data-provider declaration with no cases.
    pub fn empty_provider(description: String) -> Self {
        let reason = FailureReason::EmptyDataProvider;
        Self {
            passed: false,
            diagnosis: Some(reason.to_string()),
            reason: Some(reason),
            description,
            expected_result: ExpectedResult::Unspecified,
            observed_result: Value::Undefined,
            expected_error: None,
            thrown_error: None,
            duration: Duration::ZERO,
        }
    }

    pub fn is_failure(&self) -> bool {
        !self.passed
    }

    /// Gets the duration in milliseconds.
    /// 以毫秒为单位获取持续时间。
    pub fn duration_ms(&self) -> f64 {
        self.duration.as_secs_f64() * 1000.0
    }

    /// Gets the status of the test result as a string for display.
    /// 以字符串形式获取测试结果的状态以供显示。
    pub fn get_status_str(&self, locale: &str) -> String {
        if self.passed {
            t!("report.status_passed", locale = locale).to_string()
        } else {
            t!("report.status_failed", locale = locale).to_string()
        }
    }

    /// Serializes the record for an external UI layer.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.diagnosis {
            Some(diagnosis) => write!(f, "FAILED {}: {}", self.description, diagnosis),
            None => write!(f, "ok {}", self.description),
        }
    }
}

/// A test function both returned a value and threw an error in the same call.
///
/// The runner cannot classify such an invocation, so it stops the whole run
/// instead of producing a result.
///
/// 测试函数在同一次调用中既返回了值又抛出了错误。运行器无法对其分类，因此中止整个运行。
#[derive(Debug, Clone, PartialEq)]
pub struct RigFault {
    pub value: Value,
    pub thrown: ThrownError,
}

impl fmt::Display for RigFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "test function returned {} and threw {} in the same invocation",
            self.value, self.thrown
        )
    }
}

impl std::error::Error for RigFault {}
