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

use std::net::Ipv4Addr;

use serde::Deserialize;
use tracing::warn;

use super::error::ConfigError;
use super::fixture::Correction;
use crate::dmx::artnet::ARTNET_PORT;
use crate::output::{
    self, DeltaConfig, DEFAULT_DELTA_THRESHOLD, DEFAULT_FPS, DEFAULT_FULL_FRAME_INTERVAL,
    DEFAULT_SUBNET_MASK,
};

/// An output as it appears in the configuration file.
#[derive(Deserialize, Clone, Debug)]
pub struct Output {
    id: String,

    /// Display name. Defaults to the id.
    name: Option<String>,

    /// The IPv4 address packets are sent to.
    address: String,

    subnet_mask: Option<String>,

    /// The UDP port. Defaults to the ArtNet port.
    port: Option<u16>,

    /// The universe the first fixture starts at.
    start_universe: Option<u16>,

    fps: Option<f64>,

    /// Output delay in milliseconds.
    delay_ms: Option<u32>,

    correction: Option<Correction>,

    delta: Option<Delta>,

    /// Fixture ids, in layout order.
    fixtures: Option<Vec<String>>,

    active: Option<bool>,
}

#[derive(Deserialize, Clone, Copy, Debug, Default)]
pub(super) struct Delta {
    enabled: Option<bool>,
    threshold: Option<u8>,
    full_frame_interval: Option<u32>,
}

impl Output {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn address(&self) -> Result<Ipv4Addr, ConfigError> {
        parse_address("address", &self.address)
    }

    pub fn subnet_mask(&self) -> Result<Ipv4Addr, ConfigError> {
        self.subnet_mask
            .as_deref()
            .map_or(Ok(DEFAULT_SUBNET_MASK), |mask| {
                parse_address("subnet_mask", mask)
            })
    }

    /// Gets the frame rate. Anything that isn't a positive number falls back to the default.
    pub fn fps(&self) -> f64 {
        match self.fps {
            Some(fps) if fps.is_finite() && fps > 0.0 => fps,
            Some(fps) => {
                warn!(
                    output = self.id.as_str(),
                    fps, "Invalid output frame rate, using the default."
                );
                DEFAULT_FPS
            }
            None => DEFAULT_FPS,
        }
    }

    pub fn delta(&self) -> DeltaConfig {
        let delta = self.delta.unwrap_or_default();
        DeltaConfig {
            enabled: delta.enabled.unwrap_or(false),
            threshold: delta.threshold.unwrap_or(DEFAULT_DELTA_THRESHOLD),
            full_frame_interval: delta
                .full_frame_interval
                .unwrap_or(DEFAULT_FULL_FRAME_INTERVAL),
        }
    }

    pub fn fixtures(&self) -> &[String] {
        self.fixtures.as_deref().unwrap_or_default()
    }

    /// Converts the configuration into an output.
    pub fn to_output(&self) -> Result<output::Output, ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::MissingIdentity { kind: "output" });
        }

        Ok(output::Output::new(
            &self.id,
            self.name.as_deref().unwrap_or(&self.id),
            self.address()?,
        )
        .with_subnet_mask(self.subnet_mask()?)
        .with_port(self.port.unwrap_or(ARTNET_PORT))
        .with_start_universe(self.start_universe.unwrap_or(0))
        .with_fps(self.fps())
        .with_delay_ms(self.delay_ms.unwrap_or(0))
        .with_correction(self.correction.unwrap_or_default().to_correction())
        .with_delta(self.delta())
        .with_fixtures(self.fixtures())
        .with_active(self.active.unwrap_or(true)))
    }
}

fn parse_address(field: &'static str, value: &str) -> Result<Ipv4Addr, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidAddress {
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use config::{Config, File, FileFormat};

    use super::*;

    fn parse(yaml: &str) -> Output {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let output = parse(
            r#"
            id: wall
            address: 192.168.1.50
            "#,
        )
        .to_output()
        .unwrap();

        assert_eq!("wall", output.name());
        assert_eq!(SocketAddr::from(([192, 168, 1, 50], 6454)), output.target());
        assert_eq!(Ipv4Addr::new(255, 255, 255, 0), output.subnet_mask());
        assert_eq!(0, output.start_universe());
        assert_eq!(30.0, output.fps());
        assert_eq!(0, output.delay_ms());
        assert_eq!(DeltaConfig::default(), *output.delta());
        assert!(output.fixture_ids().is_empty());
        assert!(output.is_active());
        assert!(!output.is_broadcast());
    }

    #[test]
    fn test_full_output() {
        let output = parse(
            r#"
            id: wall
            name: Back wall
            address: 10.0.0.255
            subnet_mask: 255.0.0.0
            port: 6455
            start_universe: 3
            fps: 44
            delay_ms: 120
            correction:
              contrast: 40
              green: -10
            delta:
              enabled: true
              threshold: 4
              full_frame_interval: 0
            fixtures: [left, right]
            active: false
            "#,
        )
        .to_output()
        .unwrap();

        assert_eq!("Back wall", output.name());
        assert_eq!(SocketAddr::from(([10, 0, 0, 255], 6455)), output.target());
        assert!(!output.is_broadcast());
        assert_eq!(3, output.start_universe());
        assert_eq!(44.0, output.fps());
        assert_eq!(120, output.delay_ms());
        assert_eq!(40, output.correction().contrast());
        assert_eq!(-10, output.correction().green());
        assert_eq!(
            DeltaConfig {
                enabled: true,
                threshold: 4,
                full_frame_interval: 0,
            },
            *output.delta()
        );
        assert_eq!(&["left", "right"], output.fixture_ids());
        assert!(!output.is_active());
    }

    #[test]
    fn test_invalid_values() {
        let output = parse(
            r#"
            id: wall
            address: 10.0.0.1
            fps: -3
            "#,
        );
        assert_eq!(DEFAULT_FPS, output.fps());

        let output = parse(
            r#"
            id: wall
            address: not-an-ip
            "#,
        );
        assert!(matches!(
            output.to_output(),
            Err(ConfigError::InvalidAddress {
                field: "address",
                ..
            })
        ));

        let output = parse(
            r#"
            id: wall
            address: 10.0.0.1
            subnet_mask: 255.0
            "#,
        );
        assert!(matches!(
            output.to_output(),
            Err(ConfigError::InvalidAddress {
                field: "subnet_mask",
                ..
            })
        ));

        let output = parse(
            r#"
            id: "  "
            address: 10.0.0.1
            "#,
        );
        assert!(matches!(
            output.to_output(),
            Err(ConfigError::MissingIdentity { kind: "output" })
        ));
    }
}
