//! # Core Module / 核心模块
//!
//! This module contains the core functionality of the runner,
//! including the value model, data models, configuration, planning,
//! test execution logic and the lazy sequence driver.
//!
//! 此模块包含运行器的核心功能，
//! 包括值模型、数据模型、配置、执行计划、测试执行逻辑和惰性序列驱动。

pub mod config;
pub mod execution;
pub mod models;
pub mod planner;
pub mod runner;
pub mod value;

// Re-exports
pub use config::RunnerConfig;
pub use execution::run_declaration;
pub use models::{TestDeclaration, TestResult};
pub use runner::{TestResults, TestRunner, run_tests};
pub use value::{Completion, ThrownError, Value};
