//! Calendar date providers.

use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;

/// Supplies the current calendar date.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Returns today's date.
    fn today(&self) -> NaiveDate;
}

/// The system clock, reading the current UTC date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// A clock pinned to a settable date.
#[derive(Debug)]
pub struct FixedClock {
    today: Mutex<NaiveDate>,
}

impl FixedClock {
    /// Creates a clock reporting `today`.
    #[must_use]
    pub const fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    /// Moves the clock to `today`.
    pub fn set(&self, today: NaiveDate) {
        *self.today.lock() = today;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock()
    }
}
