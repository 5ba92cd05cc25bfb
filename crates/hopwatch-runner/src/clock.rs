//! Time seams for the scheduler.
//!
//! The scheduler never reads the wall clock or sleeps directly; it goes
//! through [`Clock`] and [`Sleeper`] so tests can pin capture timestamps and
//! run a handful of cycles without waiting.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Source of capture timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock UTC time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Waits out the interval between cycles.
pub trait Sleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
