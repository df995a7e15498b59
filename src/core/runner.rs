//! # Sequence Driver Module / 序列驱动模块
//!
//! Runs a list of declarations lazily. Each call to `next` executes exactly
//! one declaration and yields its result; nothing runs until the consumer
//! asks for it, and dropping the iterator leaves the rest unexecuted.
//!
//! 惰性地运行一系列声明。每次调用 `next` 只执行一个声明并产出其结果；
//! 在消费者请求之前不会运行任何内容，丢弃迭代器则剩余声明不会执行。

use anyhow::Result;
use colored::*;
use futures::stream;
use std::iter::FusedIterator;
use std::slice;

use crate::{
    core::{
        config::RunnerConfig,
        execution::run_declaration,
        models::{TestDeclaration, TestResult},
    },
    infra::{
        clock::{Clock, MonotonicClock},
        t,
    },
};

/// Executes declarations with a given configuration and clock.
#[derive(Debug, Clone, Default)]
pub struct TestRunner<C = MonotonicClock> {
    config: RunnerConfig,
    clock: C,
}

impl TestRunner<MonotonicClock> {
    pub fn new(config: RunnerConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl<C: Clock + Clone> TestRunner<C> {
    pub fn with_clock(config: RunnerConfig, clock: C) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Starts a run over `declarations`.
    ///
    /// The returned iterator is single-pass; call `run` again to re-run the
    /// same declarations.
    pub fn run<'a>(&self, declarations: &'a [TestDeclaration]) -> TestResults<'a, C> {
        let locale = self.config.locale();
        if self.config.verbose {
            println!(
                "{}",
                t!("run.starting", locale = locale.as_str(), count = declarations.len()).bold()
            );
        }

        TestResults {
            declarations: declarations.iter(),
            clock: self.clock.clone(),
            locale,
            verbose: self.config.verbose,
            halted: false,
        }
    }
}

/// Runs `declarations` with the default configuration and a monotonic clock.
pub fn run_tests(declarations: &[TestDeclaration]) -> TestResults<'_, MonotonicClock> {
    TestRunner::new(RunnerConfig::default()).run(declarations)
}

/// The lazy sequence of results for one run.
///
/// Yields one `Ok(TestResult)` per declaration. A rig fault is yielded once as
/// `Err` and ends the sequence.
///
/// 一次运行的惰性结果序列。装置故障以 `Err` 形式产出一次并结束序列。
pub struct TestResults<'a, C> {
    declarations: slice::Iter<'a, TestDeclaration>,
    clock: C,
    locale: String,
    verbose: bool,
    halted: bool,
}

impl<C: Clock> TestResults<'_, C> {
    /// Adapts the sequence into a `Stream` for async consumers.
    /// Declarations still run one at a time, when the stream is polled.
    pub fn into_stream(self) -> stream::Iter<Self> {
        stream::iter(self)
    }

    /// Whether a rig fault stopped the run.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    fn log_start(&self, declaration: &TestDeclaration) {
        if !self.verbose {
            return;
        }
        println!(
            "{}",
            t!(
                "run.running_test",
                locale = self.locale.as_str(),
                name = declaration.display_description()
            )
            .blue()
        );
    }

    fn log_result(&self, result: &TestResult) {
        if !self.verbose {
            return;
        }
        let status = result.get_status_str(&self.locale);
        let status_colored = if result.passed {
            status.green()
        } else {
            status.red()
        };
        println!(
            "  - {}",
            t!(
                "run.result_row",
                locale = self.locale.as_str(),
                status = status_colored,
                name = &result.description,
                duration = format!("{:.3}", result.duration_ms())
            )
        );
        if let Some(diagnosis) = &result.diagnosis {
            println!(
                "    {}",
                t!("run.diagnosis", locale = self.locale.as_str(), diagnosis = diagnosis).yellow()
            );
        }
    }
}

impl<C: Clock> Iterator for TestResults<'_, C> {
    type Item = Result<TestResult>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted {
            return None;
        }
        let declaration = self.declarations.next()?;
        self.log_start(declaration);

        match run_declaration(declaration, &self.clock) {
            Ok(result) => {
                self.log_result(&result);
                Some(Ok(result))
            }
            Err(e) => {
                self.halted = true;
                if self.verbose {
                    eprintln!(
                        "{}",
                        t!(
                            "run.rig_fault",
                            locale = self.locale.as_str(),
                            name = declaration.display_description(),
                            fault = format!("{:#}", e)
                        )
                        .red()
                        .bold()
                    );
                }
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.halted {
            (0, Some(0))
        } else {
            (0, Some(self.declarations.len()))
        }
    }
}

impl<C: Clock> FusedIterator for TestResults<'_, C> {}
