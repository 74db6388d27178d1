//! Weekly schedule gate
//!
//! Pure predicate over the local wall clock. An external per-minute trigger
//! (cron, Task Scheduler) is expected to call this repeatedly; there is no
//! tolerance window.

use chrono::{Datelike, Local, Timelike};

/// Weekly send slot. `day` uses 0 = Monday .. 6 = Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl Schedule {
    pub fn new(day: u32, hour: u32, minute: u32) -> Self {
        Self { day, hour, minute }
    }

    /// True iff weekday, hour and minute all match the targets exactly.
    pub fn matches<T: Datelike + Timelike>(&self, now: &T) -> bool {
        now.weekday().num_days_from_monday() == self.day
            && now.hour() == self.hour
            && now.minute() == self.minute
    }

    /// Evaluate the gate against the current local time.
    pub fn is_send_time(&self) -> bool {
        self.matches(&Local::now())
    }
}
