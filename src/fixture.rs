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

use serde::Serialize;

use crate::color::{ChannelOrder, ColorCorrection};
use crate::dmx::universe;

/// The default white detection threshold.
pub const DEFAULT_WHITE_THRESHOLD: u8 = 200;
/// The default white color temperature in Kelvin.
pub const DEFAULT_COLOR_TEMPERATURE: u32 = 4000;
/// The layer name that refers to the main player output.
pub const DEFAULT_INPUT_LAYER: &str = "player";

/// A single LED position, in the canvas coordinates the fixture was authored in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    /// 1-based position of the LED along the fixture.
    pub index: usize,
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Generates `count` evenly spaced points from `from` to `to`, inclusive.
    pub fn line(from: (f64, f64), to: (f64, f64), count: usize) -> Vec<Point> {
        let steps = count.saturating_sub(1).max(1) as f64;
        (0..count)
            .map(|i| {
                let t = i as f64 / steps;
                Point {
                    index: i + 1,
                    x: from.0 + (to.0 - from.0) * t,
                    y: from.1 + (to.1 - from.1) * t,
                }
            })
            .collect()
    }

    /// Builds points from raw coordinates, numbering them from 1.
    pub fn from_coordinates(coordinates: impl IntoIterator<Item = (f64, f64)>) -> Vec<Point> {
        coordinates
            .into_iter()
            .enumerate()
            .map(|(i, (x, y))| Point { index: i + 1, x, y })
            .collect()
    }
}

/// The LED layout of a fixture's pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LedVariant {
    Rgb,
    Rgbw,
    /// RGB + amber + white.
    Rgbaw,
    /// RGB + warm white + cool white.
    Rgbww,
    /// RGB + cool white + warm white.
    Rgbcw,
    /// RGB + cool white + neutral white + warm white.
    Rgbcww,
}

impl LedVariant {
    pub const ALL: [LedVariant; 6] = [
        LedVariant::Rgb,
        LedVariant::Rgbw,
        LedVariant::Rgbaw,
        LedVariant::Rgbww,
        LedVariant::Rgbcw,
        LedVariant::Rgbcww,
    ];

    /// Parses a variant name (case insensitive).
    pub fn parse(name: &str) -> Option<LedVariant> {
        let name = name.trim();
        LedVariant::ALL
            .into_iter()
            .find(|variant| variant.name().eq_ignore_ascii_case(name))
    }

    pub fn name(&self) -> &'static str {
        match self {
            LedVariant::Rgb => "RGB",
            LedVariant::Rgbw => "RGBW",
            LedVariant::Rgbaw => "RGBAW",
            LedVariant::Rgbww => "RGBWW",
            LedVariant::Rgbcw => "RGBCW",
            LedVariant::Rgbcww => "RGBCWW",
        }
    }

    /// Number of channels beyond R, G and B.
    pub fn white_channels(&self) -> usize {
        match self {
            LedVariant::Rgb => 0,
            LedVariant::Rgbw => 1,
            LedVariant::Rgbaw | LedVariant::Rgbww | LedVariant::Rgbcw => 2,
            LedVariant::Rgbcww => 3,
        }
    }

    pub fn channels_per_pixel(&self) -> usize {
        3 + self.white_channels()
    }
}

impl fmt::Display for LedVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How the white component of a color is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WhiteDetection {
    Minimum,
    Average,
    Luminance,
}

impl WhiteDetection {
    pub fn parse(name: &str) -> Option<WhiteDetection> {
        match name.trim().to_ascii_lowercase().as_str() {
            "minimum" | "min" => Some(WhiteDetection::Minimum),
            "average" | "avg" => Some(WhiteDetection::Average),
            "luminance" => Some(WhiteDetection::Luminance),
            _ => None,
        }
    }
}

/// What happens to the RGB channels once white has been detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WhiteBehavior {
    /// Move the white component entirely into the white channel(s).
    Replace,
    /// Leave RGB alone and add the white channel(s) on top.
    Additive,
    /// Remove half of the white component from RGB.
    Hybrid,
}

impl WhiteBehavior {
    pub fn parse(name: &str) -> Option<WhiteBehavior> {
        match name.trim().to_ascii_lowercase().as_str() {
            "replace" => Some(WhiteBehavior::Replace),
            "additive" => Some(WhiteBehavior::Additive),
            "hybrid" => Some(WhiteBehavior::Hybrid),
            _ => None,
        }
    }
}

/// White channel generation settings for a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WhiteConfig {
    pub enabled: bool,
    pub detection: WhiteDetection,
    pub threshold: u8,
    pub behavior: WhiteBehavior,
    /// Color temperature in Kelvin, used to split white across multiple channels.
    pub color_temperature: u32,
}

impl Default for WhiteConfig {
    fn default() -> Self {
        WhiteConfig {
            enabled: false,
            detection: WhiteDetection::Minimum,
            threshold: DEFAULT_WHITE_THRESHOLD,
            behavior: WhiteBehavior::Replace,
            color_temperature: DEFAULT_COLOR_TEMPERATURE,
        }
    }
}

/// A logical LED device: an ordered set of points sampled from the canvas.
#[derive(Debug, Clone)]
pub struct Fixture {
    id: String,
    name: String,
    points: Vec<Point>,
    variant: LedVariant,
    channel_order: ChannelOrder,
    white: WhiteConfig,
    correction: ColorCorrection,
    delay_ms: u32,
    input_layer: String,
    master_id: Option<String>,

    // Derived from the variant and point count. Recomputed on every structural edit.
    channels_per_pixel: usize,
    universe_count: usize,
}

impl Fixture {
    /// Creates a new fixture using the variant's native channel order.
    pub fn new(id: &str, name: &str, variant: LedVariant, points: Vec<Point>) -> Fixture {
        let mut fixture = Fixture {
            id: id.to_string(),
            name: name.to_string(),
            points,
            variant,
            channel_order: ChannelOrder::native(variant),
            white: WhiteConfig::default(),
            correction: ColorCorrection::default(),
            delay_ms: 0,
            input_layer: DEFAULT_INPUT_LAYER.to_string(),
            master_id: None,
            channels_per_pixel: 0,
            universe_count: 0,
        };
        fixture.recalculate();
        fixture
    }

    pub fn with_channel_order(mut self, channel_order: ChannelOrder) -> Self {
        self.channel_order = channel_order;
        self
    }

    pub fn with_white(mut self, white: WhiteConfig) -> Self {
        self.white = white;
        self
    }

    pub fn with_correction(mut self, correction: ColorCorrection) -> Self {
        self.correction = correction;
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_input_layer(mut self, input_layer: &str) -> Self {
        self.input_layer = input_layer.to_string();
        self
    }

    pub fn with_master(mut self, master_id: Option<&str>) -> Self {
        self.master_id = master_id.map(str::to_string);
        self
    }

    /// Replaces the fixture's points.
    pub fn set_points(&mut self, points: Vec<Point>) {
        self.points = points;
        self.recalculate();
    }

    /// Changes the LED variant. The channel order is kept; a mismatched order
    /// is ignored during output.
    pub fn set_variant(&mut self, variant: LedVariant) {
        self.variant = variant;
        self.recalculate();
    }

    fn recalculate(&mut self) {
        self.channels_per_pixel = self.variant.channels_per_pixel();
        self.universe_count =
            universe::allocate(self.points.len(), self.channels_per_pixel, 0).universes_needed();
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn variant(&self) -> LedVariant {
        self.variant
    }

    pub fn channel_order(&self) -> ChannelOrder {
        self.channel_order
    }

    pub fn white(&self) -> &WhiteConfig {
        &self.white
    }

    pub fn correction(&self) -> &ColorCorrection {
        &self.correction
    }

    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    pub fn input_layer(&self) -> &str {
        &self.input_layer
    }

    pub fn master_id(&self) -> Option<&str> {
        self.master_id.as_deref()
    }

    pub fn channels_per_pixel(&self) -> usize {
        self.channels_per_pixel
    }

    /// The number of universes this fixture spans.
    pub fn universe_count(&self) -> usize {
        self.universe_count
    }

    /// The inclusive universe span when the fixture starts at `start_universe`.
    /// Returns None for a fixture without points.
    pub fn universe_span(&self, start_universe: u16) -> Option<(u16, u16)> {
        if self.universe_count == 0 {
            return None;
        }
        let end = usize::from(start_universe) + self.universe_count - 1;
        Some((start_universe, u16::try_from(end).unwrap_or(u16::MAX)))
    }
}

impl fmt::Display for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {} points, {}, {} channels/pixel",
            self.name,
            self.id,
            self.points.len(),
            self.variant,
            self.channels_per_pixel
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_channels_per_variant() {
        let expected = [3, 4, 5, 5, 5, 6];
        for (variant, channels) in LedVariant::ALL.into_iter().zip(expected) {
            assert_eq!(channels, variant.channels_per_pixel(), "{}", variant);
        }
    }

    #[test]
    fn test_parse_variant() {
        assert_eq!(Some(LedVariant::Rgbcww), LedVariant::parse("rgbcww"));
        assert_eq!(Some(LedVariant::Rgbw), LedVariant::parse(" RGBW "));
        assert_eq!(None, LedVariant::parse("RGBX"));
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!(Some(WhiteDetection::Luminance), WhiteDetection::parse("Luminance"));
        assert_eq!(Some(WhiteDetection::Average), WhiteDetection::parse("avg"));
        assert_eq!(None, WhiteDetection::parse("brightest"));
        assert_eq!(Some(WhiteBehavior::Hybrid), WhiteBehavior::parse("HYBRID"));
        assert_eq!(None, WhiteBehavior::parse("subtractive"));
    }

    #[test]
    fn test_line_points() {
        let points = Point::line((0.0, 10.0), (100.0, 10.0), 5);
        assert_eq!(5, points.len());
        assert_eq!(1, points[0].index);
        assert_eq!(5, points[4].index);
        assert_eq!(0.0, points[0].x);
        assert_eq!(25.0, points[1].x);
        assert_eq!(100.0, points[4].x);
        assert!(points.iter().all(|p| p.y == 10.0));

        let single = Point::line((3.0, 4.0), (10.0, 10.0), 1);
        assert_eq!(vec![Point { index: 1, x: 3.0, y: 4.0 }], single);
        assert!(Point::line((0.0, 0.0), (1.0, 1.0), 0).is_empty());
    }

    #[test]
    fn test_derived_fields_follow_edits() {
        let mut fixture = Fixture::new(
            "strip",
            "Strip",
            LedVariant::Rgb,
            Point::line((0.0, 0.0), (100.0, 0.0), 170),
        );
        assert_eq!(3, fixture.channels_per_pixel());
        assert_eq!(1, fixture.universe_count());
        assert_eq!(Some((4, 4)), fixture.universe_span(4));

        fixture.set_variant(LedVariant::Rgbw);
        assert_eq!(4, fixture.channels_per_pixel());
        assert_eq!(2, fixture.universe_count());
        assert_eq!(Some((4, 5)), fixture.universe_span(4));

        fixture.set_points(Point::line((0.0, 0.0), (100.0, 0.0), 400));
        assert_eq!(4, fixture.universe_count());

        fixture.set_points(Vec::new());
        assert_eq!(0, fixture.universe_count());
        assert_eq!(None, fixture.universe_span(1));
    }
}
