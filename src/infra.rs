//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for the runner:
//! the injectable clock and i18n support for log messages.
//!
//! 此模块为运行器提供基础设施服务：可注入的时钟以及日志消息的国际化支持。

pub mod clock;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
