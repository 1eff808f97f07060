//! Wall-clock adapter.

use chrono::{DateTime, Utc};

use crate::ports::clock_port::Clock;

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
