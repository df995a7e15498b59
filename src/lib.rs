//! # Trial Runner Library / Trial Runner 库
//!
//! This library runs declared tests and classifies their outcomes.
//! A declaration pairs a test function with an expected result, an expected
//! error, or a data-provider table of input/output cases; the runner yields
//! one result record per declaration, lazily.
//!
//! 此库运行声明的测试并对其结果进行分类。
//! 每个声明将测试函数与期望结果、期望错误或输入/输出用例的数据提供者表配对；
//! 运行器为每个声明惰性地产出一条结果记录。
//!
//! ## Modules / 模块
//!
//! - `core` - Value model, data models, planning, execution and the sequence driver
//! - `infra` - Infrastructure services like the injectable clock and i18n
//!
//! - `core` - 值模型、数据模型、执行计划、执行逻辑和序列驱动
//! - `infra` - 基础设施服务，如可注入时钟和国际化

pub mod core;
pub mod infra;

// Re-export commonly used items
pub use crate::core::models::{
    ErrorExpectation, ExpectedResult, FailureReason, ProviderCase, RigFault, TestDeclaration,
    TestResult,
};
pub use crate::core::runner::{TestResults, TestRunner, run_tests};
pub use crate::core::value::{Completion, ThrownError, Value};
pub use crate::core::config::RunnerConfig;

/// Initializes the library's internationalization (i18n) based on the system locale.
///
/// Runs whose `RunnerConfig` sets no language log in the locale chosen here.
pub fn init() {
    rust_i18n::set_locale(&crate::core::config::detect_locale());
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
