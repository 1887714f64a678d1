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

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use serde::Serialize;

use crate::color::ColorCorrection;
use crate::dmx::artnet::ARTNET_PORT;

/// The default output refresh rate.
pub const DEFAULT_FPS: f64 = 30.0;
/// The default delta threshold.
pub const DEFAULT_DELTA_THRESHOLD: u8 = 8;
/// The default number of frames between forced full frames.
pub const DEFAULT_FULL_FRAME_INTERVAL: u32 = 30;
/// The default subnet mask.
pub const DEFAULT_SUBNET_MASK: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

/// Delta encoding settings for an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeltaConfig {
    pub enabled: bool,
    /// The smallest per-channel change that counts as a change.
    pub threshold: u8,
    /// Every Nth frame is sent in full regardless of content. 0 disables this.
    pub full_frame_interval: u32,
}

impl Default for DeltaConfig {
    fn default() -> Self {
        DeltaConfig {
            enabled: false,
            threshold: DEFAULT_DELTA_THRESHOLD,
            full_frame_interval: DEFAULT_FULL_FRAME_INTERVAL,
        }
    }
}

/// An ArtNet destination and the fixtures it drives.
#[derive(Debug, Clone)]
pub struct Output {
    id: String,
    name: String,
    address: Ipv4Addr,
    subnet_mask: Ipv4Addr,
    port: u16,
    start_universe: u16,
    fps: f64,
    delay_ms: u32,
    correction: ColorCorrection,
    delta: DeltaConfig,
    fixture_ids: Vec<String>,
    active: bool,
}

impl Output {
    /// Creates an active output with default settings.
    pub fn new(id: &str, name: &str, address: Ipv4Addr) -> Output {
        Output {
            id: id.to_string(),
            name: name.to_string(),
            address,
            subnet_mask: DEFAULT_SUBNET_MASK,
            port: ARTNET_PORT,
            start_universe: 0,
            fps: DEFAULT_FPS,
            delay_ms: 0,
            correction: ColorCorrection::default(),
            delta: DeltaConfig::default(),
            fixture_ids: Vec::new(),
            active: true,
        }
    }

    pub fn with_subnet_mask(mut self, subnet_mask: Ipv4Addr) -> Self {
        self.subnet_mask = subnet_mask;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_start_universe(mut self, start_universe: u16) -> Self {
        self.start_universe = start_universe;
        self
    }

    /// Sets the target refresh rate. Anything that isn't a positive number
    /// falls back to the default.
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = if fps.is_finite() && fps > 0.0 {
            fps
        } else {
            DEFAULT_FPS
        };
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_correction(mut self, correction: ColorCorrection) -> Self {
        self.correction = correction;
        self
    }

    pub fn with_delta(mut self, delta: DeltaConfig) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_fixtures<S: AsRef<str>>(mut self, fixture_ids: &[S]) -> Self {
        self.fixture_ids = fixture_ids.iter().map(|id| id.as_ref().to_string()).collect();
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Assigns a fixture to the end of this output. Assigning twice is a no-op.
    pub fn assign(&mut self, fixture_id: &str) {
        if !self.fixture_ids.iter().any(|id| id == fixture_id) {
            self.fixture_ids.push(fixture_id.to_string());
        }
    }

    /// Removes a fixture assignment. Returns true if it was assigned.
    pub fn unassign(&mut self, fixture_id: &str) -> bool {
        let before = self.fixture_ids.len();
        self.fixture_ids.retain(|id| id != fixture_id);
        before != self.fixture_ids.len()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    pub fn subnet_mask(&self) -> Ipv4Addr {
        self.subnet_mask
    }

    /// The socket address packets are sent to.
    pub fn target(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.address, self.port))
    }

    /// Returns true if the address is the limited broadcast address or the
    /// directed broadcast address of its subnet.
    pub fn is_broadcast(&self) -> bool {
        let address = u32::from(self.address);
        let host_bits = !u32::from(self.subnet_mask);
        self.address.is_broadcast() || (host_bits != 0 && address & host_bits == host_bits)
    }

    pub fn start_universe(&self) -> u16 {
        self.start_universe
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// The minimum time between two frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps)
    }

    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    pub fn correction(&self) -> &ColorCorrection {
        &self.correction
    }

    pub fn delta(&self) -> &DeltaConfig {
        &self.delta
    }

    pub fn fixture_ids(&self) -> &[String] {
        &self.fixture_ids
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) -> {}, universe {}, {} fps, {} fixtures",
            self.name,
            self.id,
            self.target(),
            self.start_universe,
            self.fps,
            self.fixture_ids.len()
        )
    }
}
