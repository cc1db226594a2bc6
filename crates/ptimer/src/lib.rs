//! Scoped Code Timing
//!
//! This crate measures how long a block of code takes and prints one report
//! line to stdout when the block ends:
//! - RAII scope timing through [`Timer::enter`], [`Timer::time`] and [`time_scope!`]
//! - Built-in millisecond, second and minute formatters, or a custom closure
//! - Configuration through a builder or a JSON [`TimerConfig`]
//!
//! Each release also emits a `tracing` event with target `"ptimer"` at the
//! `TRACE` level.
//!
//! # Example
//!
//! ```rust
//! use ptimer::{Timer, TimeFmt};
//!
//! let mut timer = Timer::builder()
//!     .name("checksum")
//!     .explainer("Checksum took ")
//!     .time_fmt_name("time_fmt_s")
//!     .build()?;
//!
//! {
//!     let _guard = timer.enter();
//!     let _sum: u64 = (0..10_000u64).sum();
//! } // prints "Checksum took <n> s"
//!
//! assert_eq!(timer.time_fmt(), &TimeFmt::Seconds);
//! assert!(timer.elapsed().is_some());
//! # Ok::<(), ptimer::TimerError>(())
//! ```

mod config;
mod error;
mod format;
mod timer;

pub use config::TimerConfig;
pub use error::{TimerError, TimerResult};
pub use format::*;
pub use timer::*;

/// Re-export for convenience
pub use std::time::{Duration, Instant};
