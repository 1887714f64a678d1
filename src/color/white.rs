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

use super::{PixelChannels, Rgb};
use crate::fixture::{LedVariant, WhiteBehavior, WhiteConfig, WhiteDetection};

/// Lower end of the supported color temperature range, in Kelvin.
pub const WARMEST_TEMPERATURE: f64 = 2700.0;
/// Upper end of the supported color temperature range, in Kelvin.
pub const COOLEST_TEMPERATURE: f64 = 6500.0;
/// At or below this temperature, RGBAW fixtures favor amber.
pub const AMBER_TEMPERATURE: u32 = 3000;

/// Expands RGB into RGB plus the variant's white channel(s).
///
/// Built once per fixture configuration so that the per-pixel path only
/// dispatches on already resolved enums.
#[derive(Debug, Clone, Copy)]
pub struct WhiteChannelSynthesizer {
    variant: LedVariant,
    enabled: bool,
    detection: WhiteDetection,
    behavior: WhiteBehavior,
    threshold: u8,
    /// Position on the warm (0.0) to cool (1.0) scale.
    coolness: f64,
    /// Amber share of white for RGBAW fixtures.
    amber_share: f64,
}

impl WhiteChannelSynthesizer {
    pub fn new(variant: LedVariant, config: &WhiteConfig) -> Self {
        let coolness = ((f64::from(config.color_temperature) - WARMEST_TEMPERATURE)
            / (COOLEST_TEMPERATURE - WARMEST_TEMPERATURE))
            .clamp(0.0, 1.0);
        let amber_share = if config.color_temperature <= AMBER_TEMPERATURE {
            0.7
        } else {
            0.3
        };

        Self {
            variant,
            enabled: config.enabled,
            detection: config.detection,
            behavior: config.behavior,
            threshold: config.threshold,
            coolness,
            amber_share,
        }
    }

    /// Estimates the white component of a color.
    pub fn detect(detection: WhiteDetection, rgb: Rgb) -> u8 {
        let (r, g, b) = (u16::from(rgb.r), u16::from(rgb.g), u16::from(rgb.b));
        match detection {
            WhiteDetection::Minimum => rgb.r.min(rgb.g).min(rgb.b),
            WhiteDetection::Average => ((r + g + b) / 3) as u8,
            WhiteDetection::Luminance => {
                let luminance =
                    0.2126 * f64::from(r) + 0.7152 * f64::from(g) + 0.0722 * f64::from(b);
                luminance.round().clamp(0.0, 255.0) as u8
            }
        }
    }

    /// Produces the full channel set for one pixel, in logical order.
    pub fn apply(&self, rgb: Rgb) -> PixelChannels {
        let white_channels = self.variant.white_channels();
        if white_channels == 0 {
            return PixelChannels::new(rgb, &[]);
        }

        let dark = [0u8; 3];
        if !self.enabled {
            return PixelChannels::new(rgb, &dark[..white_channels]);
        }

        let white = Self::detect(self.detection, rgb);
        if white < self.threshold {
            return PixelChannels::new(rgb, &dark[..white_channels]);
        }

        let subtract = match self.behavior {
            WhiteBehavior::Replace => white,
            WhiteBehavior::Additive => 0,
            WhiteBehavior::Hybrid => white / 2,
        };
        let rgb = Rgb {
            r: rgb.r.saturating_sub(subtract),
            g: rgb.g.saturating_sub(subtract),
            b: rgb.b.saturating_sub(subtract),
        };

        let split = self.split(white);
        PixelChannels::new(rgb, &split[..white_channels])
    }

    /// Splits a white value across the variant's white channels. Paired
    /// channels always add up to `white`.
    fn split(&self, white: u8) -> [u8; 3] {
        let share = |factor: f64| {
            (f64::from(white) * factor)
                .round()
                .clamp(0.0, f64::from(white)) as u8
        };
        let warm = share(1.0 - self.coolness);
        let cool = white - warm;

        match self.variant {
            LedVariant::Rgb => [0, 0, 0],
            LedVariant::Rgbw => [white, 0, 0],
            LedVariant::Rgbaw => {
                let amber = share(self.amber_share);
                [amber, white - amber, 0]
            }
            LedVariant::Rgbww => [warm, cool, 0],
            LedVariant::Rgbcw => [cool, warm, 0],
            LedVariant::Rgbcww => [cool, white, warm],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn config(detection: WhiteDetection, behavior: WhiteBehavior, threshold: u8) -> WhiteConfig {
        WhiteConfig {
            enabled: true,
            detection,
            threshold,
            behavior,
            color_temperature: 4000,
        }
    }

    #[test]
    fn test_detection_modes() {
        let rgb = Rgb::new(200, 180, 190);
        assert_eq!(180, WhiteChannelSynthesizer::detect(WhiteDetection::Minimum, rgb));
        assert_eq!(190, WhiteChannelSynthesizer::detect(WhiteDetection::Average, rgb));
        assert_eq!(185, WhiteChannelSynthesizer::detect(WhiteDetection::Luminance, rgb));
    }

    #[test]
    fn test_rgb_passthrough() {
        let synthesizer = WhiteChannelSynthesizer::new(
            LedVariant::Rgb,
            &config(WhiteDetection::Minimum, WhiteBehavior::Replace, 0),
        );
        assert_eq!(
            &[250, 250, 250],
            synthesizer.apply(Rgb::new(250, 250, 250)).as_slice()
        );
    }

    #[test]
    fn test_disabled_emits_dark_white_channels() {
        let synthesizer =
            WhiteChannelSynthesizer::new(LedVariant::Rgbcww, &WhiteConfig::default());
        assert_eq!(
            &[255, 255, 255, 0, 0, 0],
            synthesizer.apply(Rgb::new(255, 255, 255)).as_slice()
        );
    }

    #[test]
    fn test_below_threshold() {
        let synthesizer = WhiteChannelSynthesizer::new(
            LedVariant::Rgbw,
            &config(WhiteDetection::Minimum, WhiteBehavior::Replace, 200),
        );
        assert_eq!(
            &[250, 199, 220, 0],
            synthesizer.apply(Rgb::new(250, 199, 220)).as_slice()
        );
    }

    #[test]
    fn test_behaviors() {
        let rgb = Rgb::new(200, 200, 200);

        let replace = WhiteChannelSynthesizer::new(
            LedVariant::Rgbw,
            &config(WhiteDetection::Minimum, WhiteBehavior::Replace, 200),
        );
        assert_eq!(&[0, 0, 0, 200], replace.apply(rgb).as_slice());

        let additive = WhiteChannelSynthesizer::new(
            LedVariant::Rgbw,
            &config(WhiteDetection::Minimum, WhiteBehavior::Additive, 200),
        );
        assert_eq!(&[200, 200, 200, 200], additive.apply(rgb).as_slice());

        let hybrid = WhiteChannelSynthesizer::new(
            LedVariant::Rgbw,
            &config(WhiteDetection::Minimum, WhiteBehavior::Hybrid, 200),
        );
        assert_eq!(&[100, 100, 100, 200], hybrid.apply(rgb).as_slice());
    }

    #[test]
    fn test_replace_floors_at_zero() {
        // Average detection can exceed the smallest channel.
        let synthesizer = WhiteChannelSynthesizer::new(
            LedVariant::Rgbw,
            &config(WhiteDetection::Average, WhiteBehavior::Replace, 0),
        );
        assert_eq!(
            &[60, 0, 0, 190],
            synthesizer.apply(Rgb::new(250, 170, 150)).as_slice()
        );
    }

    #[test]
    fn test_temperature_split() {
        let mut white = config(WhiteDetection::Minimum, WhiteBehavior::Additive, 0);
        let rgb = Rgb::new(200, 200, 200);

        // Warmest: everything on the warm channel.
        white.color_temperature = 2700;
        let synthesizer = WhiteChannelSynthesizer::new(LedVariant::Rgbww, &white);
        assert_eq!(&[200, 200, 200, 200, 0], synthesizer.apply(rgb).as_slice());
        let synthesizer = WhiteChannelSynthesizer::new(LedVariant::Rgbcw, &white);
        assert_eq!(&[200, 200, 200, 0, 200], synthesizer.apply(rgb).as_slice());

        // Coolest (and beyond): everything on the cool channel.
        white.color_temperature = 9000;
        let synthesizer = WhiteChannelSynthesizer::new(LedVariant::Rgbww, &white);
        assert_eq!(&[200, 200, 200, 0, 200], synthesizer.apply(rgb).as_slice());

        // Midpoint: an even split.
        white.color_temperature = 4600;
        let synthesizer = WhiteChannelSynthesizer::new(LedVariant::Rgbcww, &white);
        assert_eq!(
            &[200, 200, 200, 100, 200, 100],
            synthesizer.apply(rgb).as_slice()
        );
    }

    #[test]
    fn test_split_never_exceeds_white() {
        let mut white = config(WhiteDetection::Minimum, WhiteBehavior::Additive, 0);
        white.color_temperature = 4600;
        let synthesizer = WhiteChannelSynthesizer::new(LedVariant::Rgbww, &white);
        assert_eq!(
            &[201, 201, 201, 101, 100],
            synthesizer.apply(Rgb::new(201, 201, 201)).as_slice()
        );

        white.color_temperature = 3000;
        let synthesizer = WhiteChannelSynthesizer::new(LedVariant::Rgbaw, &white);
        assert_eq!(&[5, 5, 5, 4, 1], synthesizer.apply(Rgb::new(5, 5, 5)).as_slice());

        for temperature in [2700, 3000, 3500, 4000, 4600, 5300, 6500] {
            white.color_temperature = temperature;
            for variant in [LedVariant::Rgbaw, LedVariant::Rgbww, LedVariant::Rgbcw] {
                let synthesizer = WhiteChannelSynthesizer::new(variant, &white);
                for value in (1..=255u8).step_by(2) {
                    let channels = synthesizer.apply(Rgb::new(value, value, value));
                    let shares: u16 = channels.as_slice()[3..].iter().map(|v| u16::from(*v)).sum();
                    assert_eq!(u16::from(value), shares, "{variant:?} at {temperature}K");
                }
            }
        }
    }

    #[test]
    fn test_amber_split() {
        let mut white = config(WhiteDetection::Minimum, WhiteBehavior::Replace, 0);
        white.color_temperature = 3000;
        let synthesizer = WhiteChannelSynthesizer::new(LedVariant::Rgbaw, &white);
        assert_eq!(&[0, 0, 0, 70, 30], synthesizer.apply(Rgb::new(100, 100, 100)).as_slice());

        white.color_temperature = 3001;
        let synthesizer = WhiteChannelSynthesizer::new(LedVariant::Rgbaw, &white);
        assert_eq!(&[0, 0, 0, 30, 70], synthesizer.apply(Rgb::new(100, 100, 100)).as_slice());
    }
}
