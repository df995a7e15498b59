//! # Clock Module / 时钟模块
//!
//! The runner measures the time spent inside each test function through the
//! [`Clock`] trait, so the host can inject its own time source.
//! [`MonotonicClock`] is the default; [`ScriptedClock`] replays fixed
//! durations for reproducible runs.
//!
//! 运行器通过 [`Clock`] trait 测量每个测试函数内部花费的时间，宿主可以注入自己的时间源。

use std::cell::Cell;
use std::time::{Duration, Instant};

/// A monotonic time source.
///
/// `now` returns the time elapsed since an arbitrary, fixed origin. The runner
/// calls it exactly twice per invocation: right before and right after the
/// test function runs.
pub trait Clock {
    fn now(&self) -> Duration;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Wall-clock time from [`Instant`], measured from the clock's creation.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A clock that makes the n-th measured invocation last `spans[n]`.
///
/// Readings come in (start, end) pairs; every second reading advances the
/// clock by the next span. Once the spans run out, invocations take no time.
///
/// 一个让第 n 次被测量的调用持续 `spans[n]` 的时钟。
#[derive(Debug, Clone, Default)]
pub struct ScriptedClock {
    spans: Vec<Duration>,
    readings: Cell<usize>,
    current: Cell<Duration>,
}

impl ScriptedClock {
    pub fn new(spans: impl IntoIterator<Item = Duration>) -> Self {
        Self {
            spans: spans.into_iter().collect(),
            readings: Cell::new(0),
            current: Cell::new(Duration::ZERO),
        }
    }

    /// Every invocation lasts `span`.
    pub fn repeating(span: Duration, invocations: usize) -> Self {
        Self::new(std::iter::repeat_n(span, invocations))
    }

    /// Number of invocations measured so far.
    pub fn invocations(&self) -> usize {
        self.readings.get() / 2
    }
}

impl Clock for ScriptedClock {
    fn now(&self) -> Duration {
        let reading = self.readings.get();
        self.readings.set(reading + 1);
        if reading % 2 == 1 {
            let span = self.spans.get(reading / 2).copied().unwrap_or_default();
            self.current.set(self.current.get() + span);
        }
        self.current.get()
    }
}
