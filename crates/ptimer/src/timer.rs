//! Scoped timers
//!
//! A [`Timer`] is configured up front, entered once, and reports when the
//! [`TimerGuard`] returned by [`Timer::enter`] is dropped. Dropping happens on
//! every exit path, including early `?` returns and panics, so the report is
//! always written and whatever was propagating keeps propagating.

use crate::config::TimerConfig;
use crate::error::TimerResult;
use crate::format::TimeFmt;
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Prefix used for timers without a name.
pub const UNNAMED_EXPLAINER: &str = "Elapsed time: ";

/// Default prefix for a named timer.
pub fn default_explainer(name: &str) -> String {
    format!("Elapsed time for {name}: ")
}

/// Lifecycle of a [`Timer`]. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Constructed, scope not entered yet
    Unstarted,
    /// Scope entered, `start` captured
    Running,
    /// Scope released, `end` and `elapsed` captured
    Finished,
}

/// A single-use wall-clock timer.
///
/// # Example
///
/// ```rust
/// use ptimer::Timer;
///
/// let mut timer = Timer::named("parse");
/// let total: u64 = timer.time(|| (0..1_000u64).sum());
/// // prints "Elapsed time for parse: <n> ms"
///
/// assert_eq!(total, 499_500);
/// assert!(timer.elapsed().unwrap() >= 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Timer {
    name: Option<String>,
    explainer: String,
    time_fmt: TimeFmt,
    start: Option<Instant>,
    end: Option<Instant>,
    elapsed: Option<f64>,
}

impl Timer {
    /// Create an unnamed timer with the millisecond formatter.
    pub fn new() -> Self {
        Self::from_parts(None, None, TimeFmt::default())
    }

    /// Create a named timer with the default explainer and formatter.
    pub fn named(name: impl Into<String>) -> Self {
        Self::from_parts(Some(name.into()), None, TimeFmt::default())
    }

    /// Create a named timer with an already resolved formatter.
    pub fn with_fmt(name: impl Into<String>, time_fmt: TimeFmt) -> Self {
        Self::from_parts(Some(name.into()), None, time_fmt)
    }

    /// Start configuring a timer.
    pub fn builder() -> TimerBuilder {
        TimerBuilder::new()
    }

    fn from_parts(name: Option<String>, explainer: Option<String>, time_fmt: TimeFmt) -> Self {
        let explainer = explainer.unwrap_or_else(|| match &name {
            Some(name) => default_explainer(name),
            None => UNNAMED_EXPLAINER.to_string(),
        });
        Self {
            name,
            explainer,
            time_fmt,
            start: None,
            end: None,
            elapsed: None,
        }
    }

    /// Name of the timed section, if any.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Text printed before the formatted duration.
    #[inline]
    pub fn explainer(&self) -> &str {
        &self.explainer
    }

    /// The resolved formatter.
    #[inline]
    pub fn time_fmt(&self) -> &TimeFmt {
        &self.time_fmt
    }

    /// Instant captured when the scope was entered.
    #[inline]
    pub fn start(&self) -> Option<Instant> {
        self.start
    }

    /// Instant captured when the scope was released.
    #[inline]
    pub fn end(&self) -> Option<Instant> {
        self.end
    }

    /// Elapsed seconds, available once the scope has been released.
    #[inline]
    pub fn elapsed(&self) -> Option<f64> {
        self.elapsed
    }

    /// Elapsed time as a [`Duration`], available once finished.
    pub fn elapsed_duration(&self) -> Option<Duration> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(end.saturating_duration_since(start)),
            _ => None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TimerState {
        match (self.start, self.elapsed) {
            (None, _) => TimerState::Unstarted,
            (Some(_), None) => TimerState::Running,
            (Some(_), Some(_)) => TimerState::Finished,
        }
    }

    /// Enter the timed scope.
    ///
    /// The timer stops and reports when the returned guard is dropped.
    pub fn enter(&mut self) -> TimerGuard<'_> {
        self.begin();
        TimerGuard { timer: self }
    }

    /// Time a closure.
    ///
    /// The closure's return value is passed through untouched, so an `Err`
    /// comes back to the caller as-is. A panic unwinds through after the
    /// report has been written.
    pub fn time<T>(&mut self, f: impl FnOnce() -> T) -> T {
        let _guard = self.enter();
        f()
    }

    /// The report line for a finished timer.
    ///
    /// Unnamed timers always use [`UNNAMED_EXPLAINER`]. Named timers use
    /// the explainer verbatim.
    pub fn report(&self) -> Option<String> {
        let elapsed = self.elapsed?;
        let formatted = self.time_fmt.apply(elapsed);
        Some(match self.name {
            None => format!("{UNNAMED_EXPLAINER}{formatted}"),
            Some(_) => format!("{}{}", self.explainer, formatted),
        })
    }

    /// Write the report line, newline-terminated, to `out`.
    ///
    /// Writes nothing if the timer has not finished.
    pub fn write_report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self.report() {
            Some(line) => writeln!(out, "{line}"),
            None => Ok(()),
        }
    }

    fn begin(&mut self) {
        if self.state() != TimerState::Unstarted {
            tracing::warn!(
                target: "ptimer",
                name = self.name.as_deref(),
                "timer entered more than once; restarting measurement"
            );
            self.end = None;
            self.elapsed = None;
        }
        self.start = Some(Instant::now());
    }

    fn finish(&mut self) {
        let end = Instant::now();
        let start = *self.start.get_or_insert(end);
        let elapsed = end.saturating_duration_since(start).as_secs_f64();

        self.end = Some(end);
        self.elapsed = Some(elapsed);

        tracing::trace!(
            target: "ptimer",
            name = self.name.as_deref(),
            elapsed_s = elapsed,
            "timer completed"
        );

        if let Err(err) = self.write_report(&mut io::stdout().lock()) {
            tracing::warn!(target: "ptimer", error = %err, "failed to write timer report");
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard for a running [`Timer`].
///
/// Dropping the guard, or calling [`TimerGuard::finish`], captures the end
/// instant and prints the report.
#[must_use = "the timer stops as soon as the guard is dropped"]
pub struct TimerGuard<'a> {
    timer: &'a mut Timer,
}

impl TimerGuard<'_> {
    /// Name of the running timer.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.timer.name()
    }

    /// Time spent in the scope so far.
    pub fn elapsed_so_far(&self) -> Duration {
        self.timer
            .start
            .map(|start| start.elapsed())
            .unwrap_or_default()
    }

    /// Stop the timer now instead of at the end of the scope.
    pub fn finish(self) {
        drop(self);
    }
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        self.timer.finish();
    }
}

enum FmtChoice {
    Resolved(TimeFmt),
    Named(String),
}

/// Builder for [`Timer`].
///
/// A formatter selected by name is looked up in [`TimerBuilder::build`], so
/// an unknown name fails before the timer can be entered.
#[derive(Default)]
pub struct TimerBuilder {
    name: Option<String>,
    explainer: Option<String>,
    time_fmt: Option<FmtChoice>,
}

impl TimerBuilder {
    /// Create a builder with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name of the timed section.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Override the report prefix.
    pub fn explainer(mut self, explainer: impl Into<String>) -> Self {
        self.explainer = Some(explainer.into());
        self
    }

    /// Use a resolved formatter.
    pub fn time_fmt(mut self, time_fmt: TimeFmt) -> Self {
        self.time_fmt = Some(FmtChoice::Resolved(time_fmt));
        self
    }

    /// Select a built-in formatter by its selector name.
    pub fn time_fmt_name(mut self, name: impl Into<String>) -> Self {
        self.time_fmt = Some(FmtChoice::Named(name.into()));
        self
    }

    /// Use a closure as the formatter.
    pub fn custom_fmt<F>(self, f: F) -> Self
    where
        F: Fn(f64) -> String + Send + Sync + 'static,
    {
        self.time_fmt(TimeFmt::custom(f))
    }

    /// Apply the fields set in a [`TimerConfig`]. Unset fields leave the
    /// builder unchanged.
    pub fn config(mut self, config: TimerConfig) -> Self {
        if let Some(explainer) = config.explainer {
            self = self.explainer(explainer);
        }
        if let Some(name) = config.time_fmt {
            self = self.time_fmt_name(name);
        }
        self
    }

    /// Resolve the formatter and create the timer.
    pub fn build(self) -> TimerResult<Timer> {
        let time_fmt = match self.time_fmt {
            None => TimeFmt::default(),
            Some(FmtChoice::Resolved(time_fmt)) => time_fmt,
            Some(FmtChoice::Named(name)) => name.parse()?,
        };
        Ok(Timer::from_parts(self.name, self.explainer, time_fmt))
    }
}

/// Time the rest of the enclosing block.
///
/// Creates a named timer and a guard that lives until the end of the scope.
///
/// # Example
///
/// ```rust
/// use ptimer::{time_scope, TimeFmt};
///
/// fn do_work() {
///     time_scope!("work");
///     // ... work ...
/// } // prints "Elapsed time for work: <n> ms"
///
/// fn do_slow_work() {
///     time_scope!("slow work", TimeFmt::Minutes);
///     // ... work ...
/// }
/// # do_work();
/// # do_slow_work();
/// ```
#[macro_export]
macro_rules! time_scope {
    ($name:expr) => {
        let mut _ptimer = $crate::Timer::named($name);
        let _ptimer_guard = _ptimer.enter();
    };
    ($name:expr, $fmt:expr) => {
        let mut _ptimer = $crate::Timer::with_fmt($name, $fmt);
        let _ptimer_guard = _ptimer.enter();
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimerError;
    use std::sync::Arc;
    use std::thread::sleep;

    #[test]
    fn test_unnamed_defaults() {
        let mut timer = Timer::new();
        timer.time(|| sleep(Duration::from_millis(1)));

        assert_eq!(timer.name(), None);
        assert_eq!(timer.time_fmt(), &TimeFmt::Milliseconds);
        assert_eq!(timer.explainer(), UNNAMED_EXPLAINER);
        assert!(timer.report().unwrap().starts_with("Elapsed time: "));
    }

    #[test]
    fn test_named_default_explainer() {
        let timer = Timer::named("load");
        assert_eq!(timer.explainer(), "Elapsed time for load: ");
    }

    #[test]
    fn test_explainer_kept_verbatim() {
        let mut timer = Timer::builder()
            .name("test")
            .explainer("Time taken")
            .build()
            .unwrap();
        timer.time(|| ());

        assert_eq!(timer.name(), Some("test"));
        assert_eq!(timer.explainer(), "Time taken");
        let report = timer.report().unwrap();
        assert!(report.starts_with("Time taken"));
        assert!(!report.contains("test"));
    }

    #[test]
    fn test_unnamed_ignores_explainer_in_report() {
        let mut timer = Timer::builder().explainer("Custom: ").build().unwrap();
        timer.time(|| ());

        assert_eq!(timer.explainer(), "Custom: ");
        assert!(timer.report().unwrap().starts_with("Elapsed time: "));
    }

    #[test]
    fn test_state_transitions() {
        let mut timer = Timer::named("states");
        assert_eq!(timer.state(), TimerState::Unstarted);
        assert!(timer.elapsed().is_none());
        assert!(timer.report().is_none());

        {
            let guard = timer.enter();
            assert_eq!(guard.name(), Some("states"));
            sleep(Duration::from_millis(2));
            assert!(guard.elapsed_so_far() >= Duration::from_millis(1));
        }

        assert_eq!(timer.state(), TimerState::Finished);
        assert!(timer.start().is_some());
        assert!(timer.end().is_some());
        assert!(timer.end().unwrap() >= timer.start().unwrap());
    }

    #[test]
    fn test_running_state_inside_scope() {
        let mut timer = Timer::new();
        let guard = timer.enter();
        assert_eq!(guard.timer.state(), TimerState::Running);
        assert!(guard.timer.elapsed().is_none());
        guard.finish();
        assert_eq!(timer.state(), TimerState::Finished);
    }

    #[test]
    fn test_elapsed_matches_sleep() {
        let mut timer = Timer::named("sleep");
        timer.time(|| sleep(Duration::from_millis(10)));

        let elapsed = timer.elapsed().unwrap();
        assert!(elapsed >= 0.009, "elapsed should be at least 9ms, got {}", elapsed);
        assert!(elapsed < 1.0, "elapsed should be well under 1s, got {}", elapsed);

        let duration = timer.elapsed_duration().unwrap();
        assert!((duration.as_secs_f64() - elapsed).abs() < 1e-9);
    }

    #[test]
    fn test_report_uses_formatter() {
        let mut timer = Timer::with_fmt("fmt", TimeFmt::custom(|_| "fixed".to_string()));
        timer.time(|| ());
        assert_eq!(timer.report().unwrap(), "Elapsed time for fmt: fixed");
    }

    #[test]
    fn test_builder_custom_identity() {
        let f: crate::format::FormatFn = Arc::new(|secs| format!("{secs} seconds"));
        let mut timer = Timer::builder()
            .time_fmt(TimeFmt::Custom(f.clone()))
            .build()
            .unwrap();
        timer.time(|| ());

        match timer.time_fmt() {
            TimeFmt::Custom(inner) => assert!(Arc::ptr_eq(inner, &f)),
            other => panic!("expected custom formatter, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_format_by_name() {
        let timer = Timer::builder().time_fmt_name("time_fmt_s").build().unwrap();
        assert_eq!(timer.time_fmt(), &TimeFmt::Seconds);

        let timer = Timer::builder().time_fmt_name("time_fmt_m").build().unwrap();
        assert_eq!(timer.time_fmt(), &TimeFmt::Minutes);
    }

    #[test]
    fn test_builder_unknown_format() {
        let err = Timer::builder()
            .name("bad")
            .time_fmt_name("not_a_real_name")
            .build()
            .unwrap_err();
        assert!(matches!(err, TimerError::UnknownFormat(ref name) if name == "not_a_real_name"));
    }

    #[test]
    fn test_builder_last_format_wins() {
        let timer = Timer::builder()
            .time_fmt_name("not_a_real_name")
            .time_fmt(TimeFmt::Seconds)
            .build()
            .unwrap();
        assert_eq!(timer.time_fmt(), &TimeFmt::Seconds);
    }

    #[test]
    fn test_builder_applies_config() {
        let config = TimerConfig::new()
            .with_explainer("Took ")
            .with_time_fmt("time_fmt_s");
        let timer = Timer::builder().name("cfg").config(config).build().unwrap();
        assert_eq!(timer.explainer(), "Took ");
        assert_eq!(timer.time_fmt(), &TimeFmt::Seconds);

        let err = Timer::builder()
            .config(TimerConfig::new().with_time_fmt("time_fmt_x"))
            .build()
            .unwrap_err();
        assert!(matches!(err, TimerError::UnknownFormat(_)));
    }

    #[test]
    fn test_write_report_single_line() {
        let mut timer = Timer::with_fmt("out", TimeFmt::custom(|_| "12 ms".to_string()));
        let mut buf = Vec::new();
        timer.write_report(&mut buf).unwrap();
        assert!(buf.is_empty(), "unfinished timer should write nothing");

        timer.time(|| ());
        timer.write_report(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Elapsed time for out: 12 ms\n");
    }

    #[test]
    fn test_guard_finish_releases_once() {
        let mut timer = Timer::named("explicit");
        let guard = timer.enter();
        guard.finish();
        let end = timer.end().unwrap();
        assert_eq!(timer.state(), TimerState::Finished);

        // Nothing left to release later
        sleep(Duration::from_millis(2));
        assert_eq!(timer.end(), Some(end));
    }

    #[test]
    fn test_reentry_restarts() {
        let mut timer = Timer::named("twice");
        timer.time(|| ());
        let first_end = timer.end().unwrap();

        timer.time(|| sleep(Duration::from_millis(1)));
        assert_eq!(timer.state(), TimerState::Finished);
        assert!(timer.start().unwrap() >= first_end);
    }

    #[test]
    fn test_time_scope_macro() {
        fn scoped() -> u32 {
            time_scope!("macro");
            41 + 1
        }
        fn scoped_with_fmt() -> u32 {
            time_scope!("macro fmt", TimeFmt::Minutes);
            7
        }
        assert_eq!(scoped(), 42);
        assert_eq!(scoped_with_fmt(), 7);
    }
}
