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

use serde::Deserialize;
use tracing::warn;

use super::error::ConfigError;
use crate::color::{ChannelOrder, ColorCorrection};
use crate::fixture::{
    self, LedVariant, Point, WhiteBehavior, WhiteConfig, WhiteDetection,
    DEFAULT_COLOR_TEMPERATURE, DEFAULT_INPUT_LAYER, DEFAULT_WHITE_THRESHOLD,
};

/// A fixture as it appears in the configuration file.
#[derive(Deserialize, Clone, Debug)]
pub struct Fixture {
    id: String,

    /// Display name. Defaults to the id.
    name: Option<String>,

    /// The LED variant (RGB, RGBW, RGBAW, RGBWW, RGBCW, RGBCWW).
    variant: Option<String>,

    /// The channel order. Defaults to the variant's native order.
    channel_order: Option<String>,

    /// Explicit point coordinates.
    points: Option<Vec<PointConfig>>,

    /// Evenly spaced points along a line, used when `points` is absent.
    line: Option<Line>,

    white: Option<White>,

    correction: Option<Correction>,

    /// Timing delay in milliseconds.
    delay_ms: Option<u32>,

    /// The layer this fixture samples from.
    input_layer: Option<String>,

    /// The id of the fixture this one copies its colors from.
    master: Option<String>,
}

#[derive(Deserialize, Clone, Copy, Debug)]
pub(super) struct PointConfig {
    x: f64,
    y: f64,
}

#[derive(Deserialize, Clone, Copy, Debug)]
pub(super) struct Line {
    from: (f64, f64),
    to: (f64, f64),
    count: usize,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub(super) struct White {
    enabled: Option<bool>,
    detection: Option<String>,
    threshold: Option<u8>,
    behavior: Option<String>,
    color_temperature: Option<u32>,
}

/// Brightness, contrast and per channel offsets, each -255 to 255.
#[derive(Deserialize, Clone, Copy, Debug, Default)]
pub(crate) struct Correction {
    brightness: Option<i16>,
    contrast: Option<i16>,
    red: Option<i16>,
    green: Option<i16>,
    blue: Option<i16>,
}

impl Correction {
    pub(crate) fn to_correction(self) -> ColorCorrection {
        ColorCorrection::new(
            self.brightness.unwrap_or(0),
            self.contrast.unwrap_or(0),
            self.red.unwrap_or(0),
            self.green.unwrap_or(0),
            self.blue.unwrap_or(0),
        )
    }
}

impl White {
    fn to_white_config(&self, fixture_id: &str) -> WhiteConfig {
        let detection = match self.detection.as_deref() {
            None => WhiteDetection::Minimum,
            Some(name) => WhiteDetection::parse(name).unwrap_or_else(|| {
                warn!(
                    fixture = fixture_id,
                    detection = name,
                    "Unknown white detection mode, using minimum."
                );
                WhiteDetection::Minimum
            }),
        };
        let behavior = match self.behavior.as_deref() {
            None => WhiteBehavior::Replace,
            Some(name) => WhiteBehavior::parse(name).unwrap_or_else(|| {
                warn!(
                    fixture = fixture_id,
                    behavior = name,
                    "Unknown white behavior, using replace."
                );
                WhiteBehavior::Replace
            }),
        };

        WhiteConfig {
            enabled: self.enabled.unwrap_or(false),
            detection,
            threshold: self.threshold.unwrap_or(DEFAULT_WHITE_THRESHOLD),
            behavior,
            color_temperature: self.color_temperature.unwrap_or(DEFAULT_COLOR_TEMPERATURE),
        }
    }
}

impl Fixture {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Gets the LED variant. Unknown variants fall back to RGB.
    pub fn variant(&self) -> LedVariant {
        match self.variant.as_deref() {
            None => LedVariant::Rgb,
            Some(name) => LedVariant::parse(name).unwrap_or_else(|| {
                warn!(
                    fixture = self.id.as_str(),
                    variant = name,
                    "Unknown LED variant, treating the fixture as RGB."
                );
                LedVariant::Rgb
            }),
        }
    }

    /// Gets the channel order. Unknown orders fall back to the variant's native order.
    pub fn channel_order(&self, variant: LedVariant) -> ChannelOrder {
        let native = ChannelOrder::native(variant);
        let Some(name) = self.channel_order.as_deref() else {
            return native;
        };

        match ChannelOrder::parse(name) {
            Some(order) if order.fits(variant.channels_per_pixel()) => order,
            Some(order) => {
                warn!(
                    fixture = self.id.as_str(),
                    order = %order,
                    variant = %variant,
                    "Channel order doesn't match the LED variant, using the native order."
                );
                native
            }
            None => {
                warn!(
                    fixture = self.id.as_str(),
                    order = name,
                    "Unknown channel order, using the native order."
                );
                native
            }
        }
    }

    /// Gets the fixture's points, either listed or generated from a line.
    pub fn points(&self) -> Result<Vec<Point>, ConfigError> {
        if let Some(points) = &self.points {
            return Ok(Point::from_coordinates(
                points.iter().map(|point| (point.x, point.y)),
            ));
        }
        match self.line {
            Some(line) => Ok(Point::line(line.from, line.to, line.count)),
            None => Err(ConfigError::MissingPoints {
                fixture: self.id.clone(),
            }),
        }
    }

    pub fn input_layer(&self) -> &str {
        self.input_layer.as_deref().unwrap_or(DEFAULT_INPUT_LAYER)
    }

    /// Converts the configuration into a fixture.
    pub fn to_fixture(&self) -> Result<fixture::Fixture, ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::MissingIdentity { kind: "fixture" });
        }

        let variant = self.variant();
        let white = self.white.clone().unwrap_or_default();
        Ok(fixture::Fixture::new(
            &self.id,
            self.name.as_deref().unwrap_or(&self.id),
            variant,
            self.points()?,
        )
        .with_channel_order(self.channel_order(variant))
        .with_white(white.to_white_config(&self.id))
        .with_correction(self.correction.unwrap_or_default().to_correction())
        .with_delay_ms(self.delay_ms.unwrap_or(0))
        .with_input_layer(self.input_layer())
        .with_master(self.master.as_deref()))
    }
}
