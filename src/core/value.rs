//! # Value Model Module / 值模型模块
//!
//! This module defines the dynamic values that flow through a test run:
//! the inputs handed to a test function, the values it returns, and the
//! errors it throws. Type comparisons use the `type_of` tag of a value and
//! equality is strict: no coercion between tags.
//!
//! 此模块定义了测试运行中流转的动态值：
//! 传递给测试函数的输入、其返回的值以及其抛出的错误。
//! 类型比较使用值的 `type_of` 标签，相等性是严格的：不同标签之间不做转换。

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A dynamically typed value.
///
/// `Undefined` doubles as the "no value" marker: a test function that returns
/// nothing returns `Undefined`, and plain declarations are invoked with
/// `Undefined` as their input.
///
/// Serializes as plain JSON; `Undefined` and `Null` both become `null`.
///
/// 动态类型的值。`Undefined` 同时作为"无值"标记。
#[derive(Debug, Clone, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// The absent value / 缺失值
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    /// Arrays compare by identity, not by contents.
    Array(Arc<Vec<Value>>),
    /// Objects compare by identity, not by contents.
    Object(Arc<BTreeMap<String, Value>>),
}

impl Value {
    /// Builds an array value from anything convertible into values.
    pub fn array<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Array(Arc::new(items.into_iter().map(Into::into).collect()))
    }

    /// Builds an object value from key/value pairs.
    pub fn object<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Object(Arc::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    /// Returns the dynamic type tag of this value.
    ///
    /// `null`, arrays and objects all report `"object"`.
    ///
    /// 返回此值的动态类型标签。
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "object",
            Value::Object(_) => "object",
        }
    }

    /// Strict equality: same variant and same value, without coercion.
    ///
    /// Numbers follow IEEE 754 (`NaN` is never equal to itself, `0.0` equals `-0.0`).
    /// Arrays and objects are equal only when they are the same allocation.
    ///
    /// 严格相等：相同变体且相同值，不做类型转换。
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) if n.is_infinite() => {
                write!(f, "{}Infinity", if *n < 0.0 { "-" } else { "" })
            }
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {}: {}", key, value)?;
                }
                if entries.is_empty() {
                    write!(f, "}}")
                } else {
                    write!(f, " }}")
                }
            }
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Undefined
    }
}

/// An error raised by a test function.
///
/// `name` is the error kind (for example `"RangeError"`), matched exactly
/// against an expectation; `message` is matched by prefix.
///
/// 测试函数抛出的错误。`name` 是错误类型，`message` 按前缀匹配。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThrownError {
    pub name: String,
    pub message: String,
}

impl ThrownError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ThrownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}: {}", self.name, self.message)
        }
    }
}

impl std::error::Error for ThrownError {}

/// Everything a single invocation of a test function produced.
///
/// A well-behaved function either returns a value or throws, never both.
/// The type can still represent both at once so the runner can detect a
/// misbehaving function and abort instead of misclassifying it.
///
/// 单次调用测试函数所产生的全部内容。
/// 正常的函数要么返回值，要么抛出错误，不会两者兼有。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    /// The returned value, `Undefined` when nothing was returned.
    pub value: Value,
    /// The thrown error, if any.
    pub thrown: Option<ThrownError>,
}

impl Completion {
    pub fn returned(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            thrown: None,
        }
    }

    pub fn threw(error: ThrownError) -> Self {
        Self {
            value: Value::Undefined,
            thrown: Some(error),
        }
    }

    /// A completion that returned nothing and threw nothing.
    pub fn nothing() -> Self {
        Self::default()
    }
}

impl From<Value> for Completion {
    fn from(value: Value) -> Self {
        Completion::returned(value)
    }
}

impl From<ThrownError> for Completion {
    fn from(error: ThrownError) -> Self {
        Completion::threw(error)
    }
}

impl<T: Into<Value>> From<Result<T, ThrownError>> for Completion {
    fn from(result: Result<T, ThrownError>) -> Self {
        match result {
            Ok(value) => Completion::returned(value),
            Err(error) => Completion::threw(error),
        }
    }
}

impl From<()> for Completion {
    fn from(_: ()) -> Self {
        Completion::nothing()
    }
}

impl From<f64> for Completion {
    fn from(n: f64) -> Self {
        Completion::returned(n)
    }
}

impl From<i32> for Completion {
    fn from(n: i32) -> Self {
        Completion::returned(n)
    }
}

impl From<bool> for Completion {
    fn from(b: bool) -> Self {
        Completion::returned(b)
    }
}

impl From<&str> for Completion {
    fn from(s: &str) -> Self {
        Completion::returned(s)
    }
}

impl From<String> for Completion {
    fn from(s: String) -> Self {
        Completion::returned(s)
    }
}
