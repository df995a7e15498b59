//! # Configuration Module / 配置模块
//!
//! Runner settings, loaded from a TOML file or built in code.
//!
//! 运行器设置，可从 TOML 文件加载或在代码中构建。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::infra::t;

/// Settings that shape how a run reports progress.
/// They never change how tests are classified.
///
/// 决定运行如何报告进度的设置。它们不会改变测试的分类方式。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RunnerConfig {
    /// The language for log messages (e.g., "en", "zh-CN").
    /// Falls back to the process-wide locale (see `trial_runner::init`) when not specified.
    ///
    /// 日志消息的语言（例如 "en", "zh-CN"）。未指定时使用进程级区域设置。
    #[serde(default)]
    pub language: Option<String>,

    /// Print a progress line per declaration while running.
    /// 运行时为每个声明打印一行进度。
    #[serde(default)]
    pub verbose: bool,
}

impl RunnerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| t!("config_parse_failed", locale = "en"))
    }

    /// The locale used for log messages and status strings.
    pub fn locale(&self) -> String {
        match &self.language {
            Some(language) if !language.is_empty() => language.clone(),
            _ => rust_i18n::locale().to_string(),
        }
    }
}

/// Reads and parses a runner configuration file.
pub fn load_runner_config(path: &Path) -> Result<RunnerConfig> {
    // For config parsing, we don't have the locale yet. Use English as a default.
    let content = fs::read_to_string(path)
        .with_context(|| t!("config_read_failed_path", locale = "en", path = path.display()))?;
    RunnerConfig::from_toml_str(&content)
}

/// Matches the system locale against the available translations.
///
/// It attempts to match the full locale (e.g., "zh-CN"), then just the
/// language code (e.g., "en"), and finally falls back to "en".
pub fn detect_locale() -> String {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    let available_locales = rust_i18n::available_locales!();

    if available_locales.contains(&locale.as_str()) {
        locale
    } else {
        locale
            .split('-')
            .next()
            .filter(|lang_code| available_locales.contains(lang_code))
            .unwrap_or("en")
            .to_string()
    }
}
