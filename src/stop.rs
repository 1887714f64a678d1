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
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A stop handle is shared between the routing engine and whatever drives it.
/// Once stopped, no new packets are sent. A send that is already underway is
/// allowed to complete.
#[derive(Clone, Default)]
pub struct StopHandle {
    /// Set to true once the engine should stop sending.
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    /// Creates a new stop handle.
    pub fn new() -> StopHandle {
        StopHandle::default()
    }

    /// Returns true if the engine has been stopped.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Stops the engine. Stopping twice is harmless.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }
}
