// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use std::collections::HashSet;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// The default minimum time between two repeated transport error logs.
pub const DEFAULT_LOG_THROTTLE: Duration = Duration::from_secs(5);

/// Remembers which warnings have been emitted so that each is only logged once.
#[derive(Default)]
pub struct WarnOnce {
    seen: Mutex<HashSet<String>>,
}

impl WarnOnce {
    pub fn new() -> WarnOnce {
        WarnOnce::default()
    }

    /// Returns true the first time a key is seen.
    pub fn first(&self, key: &str) -> bool {
        let mut seen = self.seen.lock();
        if seen.contains(key) {
            return false;
        }
        seen.insert(key.to_string());
        true
    }

    /// Forgets a key so that it can be reported again.
    pub fn reset(&self, key: &str) {
        self.seen.lock().remove(key);
    }
}

/// Limits how often a recurring condition is logged.
#[derive(Debug, Clone)]
pub struct LogThrottle {
    interval: Duration,
    last_logged: Option<Instant>,
    suppressed: u64,
}

impl LogThrottle {
    pub fn new(interval: Duration) -> LogThrottle {
        LogThrottle {
            interval,
            last_logged: None,
            suppressed: 0,
        }
    }

    /// Records an occurrence. Returns the number of occurrences suppressed since
    /// the last log if this one should be logged.
    pub fn check(&mut self, now: Instant) -> Option<u64> {
        let due = match self.last_logged {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        };
        if !due {
            self.suppressed += 1;
            return None;
        }

        self.last_logged = Some(now);
        Some(std::mem::take(&mut self.suppressed))
    }

    /// Clears the throttle so the next occurrence is logged immediately.
    pub fn reset(&mut self) {
        self.last_logged = None;
        self.suppressed = 0;
    }
}
