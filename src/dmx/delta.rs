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

use super::universe::DmxFrame;
use crate::output::DeltaConfig;

/// Where the encoder is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaState {
    /// Nothing has been sent yet (or the last send failed); the next frame is sent in full.
    AwaitingFirstFrame,
    Steady,
}

/// Decides which universes of an output need to be retransmitted.
///
/// ArtNet can't update part of a universe, so a universe with any changed
/// channel is resent whole and a universe with none is skipped.
#[derive(Debug, Clone)]
pub struct DeltaEncoder {
    config: DeltaConfig,
    state: DeltaState,
    frame_index: u64,
    snapshot: DmxFrame,
}

impl DeltaEncoder {
    pub fn new(config: DeltaConfig) -> DeltaEncoder {
        DeltaEncoder {
            config,
            state: DeltaState::AwaitingFirstFrame,
            frame_index: 0,
            snapshot: DmxFrame::new(),
        }
    }

    /// Updates the configuration. Toggling delta encoding forces a full frame.
    pub fn set_config(&mut self, config: DeltaConfig) {
        if config.enabled != self.config.enabled {
            self.invalidate();
        }
        self.config = config;
    }

    pub fn state(&self) -> DeltaState {
        self.state
    }

    /// The index of the next frame to be encoded.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Forgets what was last sent so the next frame goes out in full.
    pub fn invalidate(&mut self) {
        self.state = DeltaState::AwaitingFirstFrame;
    }

    /// Returns the universes of `frame` that must be sent, in ascending order,
    /// and records `frame` as the latest snapshot.
    pub fn select(&mut self, frame: &DmxFrame) -> Vec<u16> {
        let full = !self.config.enabled
            || self.state == DeltaState::AwaitingFirstFrame
            || self.is_full_frame_index();

        let universes = if full {
            frame.universe_ids().collect()
        } else {
            let threshold = self.config.threshold.max(1);
            frame
                .iter()
                .filter(|(universe, data)| match self.snapshot.universe(*universe) {
                    Some(previous) => data
                        .iter()
                        .zip(previous.iter())
                        .any(|(current, last)| current.abs_diff(*last) >= threshold),
                    None => true,
                })
                .map(|(universe, _)| universe)
                .collect()
        };

        self.snapshot = frame.clone();
        self.state = DeltaState::Steady;
        self.frame_index += 1;
        universes
    }

    fn is_full_frame_index(&self) -> bool {
        let interval = u64::from(self.config.full_frame_interval);
        interval > 0 && self.frame_index % interval == 0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dmx::universe::ChannelAddress;

    fn config(threshold: u8, full_frame_interval: u32) -> DeltaConfig {
        DeltaConfig {
            enabled: true,
            threshold,
            full_frame_interval,
        }
    }

    fn frame(values: &[(u16, u8)]) -> DmxFrame {
        let mut frame = DmxFrame::new();
        for (universe, value) in values {
            frame.write(
                ChannelAddress {
                    universe: *universe,
                    channel: 1,
                },
                &[*value],
            );
        }
        frame
    }

    #[test]
    fn test_identical_frames() {
        let mut encoder = DeltaEncoder::new(config(8, 30));
        let frame = frame(&[(1, 100), (2, 50)]);

        assert_eq!(DeltaState::AwaitingFirstFrame, encoder.state());
        assert_eq!(vec![1, 2], encoder.select(&frame));
        assert_eq!(DeltaState::Steady, encoder.state());

        for _ in 1..30 {
            assert!(encoder.select(&frame).is_empty());
        }

        // Frame 30 is a multiple of the interval: everything goes out.
        assert_eq!(30, encoder.frame_index());
        assert_eq!(vec![1, 2], encoder.select(&frame));
        assert!(encoder.select(&frame).is_empty());
    }

    #[test]
    fn test_threshold() {
        let mut encoder = DeltaEncoder::new(config(8, 0));
        encoder.select(&frame(&[(1, 100), (2, 100)]));

        // 7 is under the threshold, 8 is not.
        assert_eq!(vec![2], encoder.select(&frame(&[(1, 107), (2, 108)])));

        // Comparison is against the latest snapshot, not the last transmitted value.
        assert_eq!(vec![1], encoder.select(&frame(&[(1, 115), (2, 108)])));
        assert!(encoder.select(&frame(&[(1, 110), (2, 104)])).is_empty());
    }

    #[test]
    fn test_zero_threshold_still_requires_a_change() {
        let mut encoder = DeltaEncoder::new(config(0, 0));
        encoder.select(&frame(&[(1, 100)]));
        assert!(encoder.select(&frame(&[(1, 100)])).is_empty());
        assert_eq!(vec![1], encoder.select(&frame(&[(1, 101)])));
    }

    #[test]
    fn test_new_universe_is_sent() {
        let mut encoder = DeltaEncoder::new(config(8, 0));
        encoder.select(&frame(&[(1, 100)]));
        assert_eq!(vec![2], encoder.select(&frame(&[(1, 100), (2, 0)])));
    }

    #[test]
    fn test_disabled_sends_everything() {
        let mut encoder = DeltaEncoder::new(DeltaConfig {
            enabled: false,
            threshold: 8,
            full_frame_interval: 30,
        });
        let frame = frame(&[(1, 100), (2, 50)]);
        for _ in 0..5 {
            assert_eq!(vec![1, 2], encoder.select(&frame));
        }
    }

    #[test]
    fn test_invalidate() {
        let mut encoder = DeltaEncoder::new(config(8, 0));
        let frame = frame(&[(1, 100)]);
        encoder.select(&frame);
        assert!(encoder.select(&frame).is_empty());

        encoder.invalidate();
        assert_eq!(DeltaState::AwaitingFirstFrame, encoder.state());
        assert_eq!(vec![1], encoder.select(&frame));
    }

    #[test]
    fn test_enabling_forces_full_frame() {
        let mut encoder = DeltaEncoder::new(config(8, 0));
        let frame = frame(&[(1, 100)]);
        encoder.select(&frame);

        encoder.set_config(config(16, 0));
        assert!(encoder.select(&frame).is_empty());

        encoder.set_config(DeltaConfig {
            enabled: false,
            ..config(16, 0)
        });
        encoder.set_config(config(16, 0));
        assert_eq!(vec![1], encoder.select(&frame));
    }
}
