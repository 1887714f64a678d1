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

use std::net::SocketAddr;
use std::time::Duration;

use duration_string::DurationString;
use serde::Deserialize;

use super::error::ConfigError;
use crate::engine::EngineSettings;
use crate::sampling::{Canvas, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use crate::util::DEFAULT_LOG_THROTTLE;

/// The default local address the ArtNet socket binds to.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:0";

/// Engine wide settings.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Engine {
    /// The canvas size fixture points were authored against.
    canvas: Option<CanvasConfig>,

    /// Minimum time between repeated transport error logs, e.g. "5s".
    log_throttle: Option<String>,

    /// The local address to send from.
    bind_address: Option<String>,
}

#[derive(Deserialize, Clone, Copy, Debug)]
pub(super) struct CanvasConfig {
    width: Option<f64>,
    height: Option<f64>,
}

impl Engine {
    pub fn canvas(&self) -> Canvas {
        match self.canvas {
            Some(canvas) => Canvas {
                width: canvas.width.unwrap_or(DEFAULT_CANVAS_WIDTH),
                height: canvas.height.unwrap_or(DEFAULT_CANVAS_HEIGHT),
            },
            None => Canvas::default(),
        }
    }

    /// Gets the transport error log interval.
    pub fn log_throttle(&self) -> Result<Duration, ConfigError> {
        self.log_throttle
            .as_ref()
            .map_or(Ok(DEFAULT_LOG_THROTTLE), |duration| {
                Ok(DurationString::from_string(duration.clone())?.into())
            })
    }

    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        let value = self.bind_address.as_deref().unwrap_or(DEFAULT_BIND_ADDRESS);
        value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidAddress {
                field: "bind_address",
                value: value.to_string(),
            })
    }

    pub fn settings(&self) -> Result<EngineSettings, ConfigError> {
        Ok(EngineSettings {
            canvas: self.canvas(),
            log_throttle: self.log_throttle()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use config::{Config, File, FileFormat};

    use super::*;

    fn parse(yaml: &str) -> Engine {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let engine = Engine::default();
        assert_eq!(Canvas::default(), engine.canvas());
        assert_eq!(Duration::from_secs(5), engine.log_throttle().unwrap());
        assert_eq!(
            "0.0.0.0:0".parse::<SocketAddr>().unwrap(),
            engine.bind_address().unwrap()
        );
    }

    #[test]
    fn test_settings() {
        let engine = parse(
            r#"
            canvas:
              width: 1280
            log_throttle: 500ms
            bind_address: 127.0.0.1:6000
            "#,
        );
        let settings = engine.settings().unwrap();
        assert_eq!(1280.0, settings.canvas.width);
        assert_eq!(1080.0, settings.canvas.height);
        assert_eq!(Duration::from_millis(500), settings.log_throttle);
        assert_eq!(
            "127.0.0.1:6000".parse::<SocketAddr>().unwrap(),
            engine.bind_address().unwrap()
        );
    }

    #[test]
    fn test_invalid_values() {
        let engine = parse("log_throttle: soon");
        assert!(matches!(
            engine.log_throttle(),
            Err(ConfigError::Duration(_))
        ));

        let engine = parse("bind_address: nowhere");
        assert!(matches!(
            engine.bind_address(),
            Err(ConfigError::InvalidAddress { .. })
        ));
    }
}
