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

use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};

use super::artnet;
use super::client::ArtNetClient;
use super::delay::{capacity_for, DelayLine};
use super::delta::{DeltaEncoder, DeltaState};
use super::universe::DmxFrame;
use crate::output::Output;
use crate::stop::StopHandle;
use crate::util::LogThrottle;

/// What happened to an output during one engine tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TransmitOutcome {
    /// The output is switched off.
    Inactive,
    /// The engine was stopped before (or while) sending.
    Stopped,
    /// Too soon after the previous frame.
    Throttled,
    /// Delta encoding found nothing worth resending.
    Unchanged,
    /// These universes were sent.
    Sent { universes: Vec<u16> },
    /// Sending failed after `sent` packets went out.
    Failed { error: String, sent: usize },
}

/// Counters for a single output.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransmitStats {
    pub frames_sent: u64,
    pub packets_sent: u64,
    pub frames_throttled: u64,
    pub frames_unchanged: u64,
    pub failures: u64,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
}

/// Frames and sends one output's DMX data: throttling, delay, delta encoding
/// and ArtNet packet sequencing.
pub struct OutputTransmitter {
    output_id: String,
    target: SocketAddr,
    frame_interval: Duration,
    last_send: Option<Instant>,
    sequence: u8,
    delta: DeltaEncoder,
    delay: DelayLine<DmxFrame>,
    stats: TransmitStats,
    log_throttle: LogThrottle,
}

impl OutputTransmitter {
    pub fn new(output: &Output, log_interval: Duration) -> OutputTransmitter {
        OutputTransmitter {
            output_id: output.id().to_string(),
            target: output.target(),
            frame_interval: output.frame_interval(),
            last_send: None,
            sequence: 0,
            delta: DeltaEncoder::new(*output.delta()),
            delay: DelayLine::new(capacity_for(output.delay_ms(), output.fps())),
            stats: TransmitStats::default(),
            log_throttle: LogThrottle::new(log_interval),
        }
    }

    /// Applies new output settings while keeping delay and delta state.
    pub fn reconfigure(&mut self, output: &Output) {
        if self.target != output.target() {
            // A new receiver has never seen our data.
            self.delta.invalidate();
        }
        self.target = output.target();
        self.frame_interval = output.frame_interval();
        self.delta.set_config(*output.delta());
        self.delay
            .resize(capacity_for(output.delay_ms(), output.fps()));
    }

    /// Returns true if enough time has passed since the last send.
    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_send {
            Some(last) => now.saturating_duration_since(last) >= self.frame_interval,
            None => true,
        }
    }

    /// Records a skipped tick.
    pub fn record_throttled(&mut self) {
        self.stats.frames_throttled += 1;
    }

    /// Delays, delta encodes and sends a frame. The delay line runs first, so
    /// delta encoding compares the frames that actually go out.
    pub fn transmit(
        &mut self,
        frame: DmxFrame,
        client: &dyn ArtNetClient,
        stop_handle: &StopHandle,
        now: Instant,
    ) -> TransmitOutcome {
        let dark = (!self.delay.is_primed()).then(|| frame.dark());
        let outgoing = match self.delay.push(frame) {
            Some(frame) => frame,
            None => dark.unwrap_or_default(),
        };

        let universes = self.delta.select(&outgoing);
        if universes.is_empty() {
            self.last_send = Some(now);
            self.stats.frames_unchanged += 1;
            return TransmitOutcome::Unchanged;
        }

        let mut sent = 0;
        for universe in universes.iter().copied() {
            let Some(data) = outgoing.universe(universe) else {
                continue;
            };
            if stop_handle.is_stopped() {
                return TransmitOutcome::Stopped;
            }

            let sequence = next_sequence(self.sequence);
            let packet = artnet::encode(sequence, 0, universe, data);
            if let Err(e) = client.send(&packet, self.target) {
                return self.fail(e, sent, now);
            }
            self.sequence = sequence;
            self.stats.packets_sent += 1;
            sent += 1;
        }

        if self.stats.consecutive_failures > 0 {
            info!(
                output = self.output_id.as_str(),
                target = %self.target,
                failures = self.stats.consecutive_failures,
                "ArtNet output recovered."
            );
            self.log_throttle.reset();
        }
        self.stats.consecutive_failures = 0;
        self.stats.frames_sent += 1;
        self.last_send = Some(now);
        TransmitOutcome::Sent { universes }
    }

    fn fail(&mut self, e: io::Error, sent: usize, now: Instant) -> TransmitOutcome {
        // The receiver may have missed part of this frame, so resync with a full one.
        self.delta.invalidate();
        self.stats.failures += 1;
        self.stats.consecutive_failures += 1;
        self.stats.last_error = Some(e.to_string());

        if let Some(suppressed) = self.log_throttle.check(now) {
            warn!(
                output = self.output_id.as_str(),
                target = %self.target,
                err = %e,
                suppressed,
                "Error sending ArtNet packet."
            );
        }

        TransmitOutcome::Failed {
            error: e.to_string(),
            sent,
        }
    }

    pub fn stats(&self) -> &TransmitStats {
        &self.stats
    }

    /// The sequence number of the last packet sent, 0 if none.
    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    pub fn delta_state(&self) -> DeltaState {
        self.delta.state()
    }

    pub fn delay_capacity(&self) -> usize {
        self.delay.capacity()
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

/// Sequence numbers run 1 to 255; 0 means sequencing is disabled.
fn next_sequence(sequence: u8) -> u8 {
    if sequence == u8::MAX {
        1
    } else {
        sequence + 1
    }
}
