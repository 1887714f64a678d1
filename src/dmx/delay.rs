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

use std::collections::VecDeque;

/// Number of frames needed to delay output by `delay_ms` at `fps`.
pub fn capacity_for(delay_ms: u32, fps: f64) -> usize {
    if !fps.is_finite() || fps <= 0.0 {
        return 0;
    }
    (f64::from(delay_ms) / 1000.0 * fps).round() as usize
}

/// A fixed size frame delay. A line of capacity `n` holds `n - 1` frames, so a
/// frame pushed now comes out `n - 1` pushes later. Until the line has filled,
/// nothing comes out and the caller is expected to output darkness.
#[derive(Debug, Clone)]
pub struct DelayLine<T> {
    capacity: usize,
    frames: VecDeque<T>,
}

impl<T> DelayLine<T> {
    pub fn new(capacity: usize) -> DelayLine<T> {
        DelayLine {
            capacity,
            frames: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Changes the delay. Shrinking drops the oldest frames; growing darkens
    /// the output until the line has filled again.
    pub fn resize(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.frames.len() >= capacity.max(1) {
            self.frames.pop_front();
        }
    }

    /// Pushes the newest frame and returns the one that is due, if any.
    pub fn push(&mut self, frame: T) -> Option<T> {
        self.frames.push_back(frame);
        if self.frames.len() >= self.capacity {
            self.frames.pop_front()
        } else {
            None
        }
    }

    /// Returns true if the next push will release a frame.
    pub fn is_primed(&self) -> bool {
        self.frames.len() + 1 >= self.capacity
    }
}
