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

use serde::Serialize;

use super::Rgb;

/// Limit for every correction parameter, in both directions.
pub const CORRECTION_LIMIT: i16 = 255;

/// Brightness, contrast and per-channel offsets applied to a pixel.
///
/// Every parameter lives in `[-255, 255]`. The all-zero correction is the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ColorCorrection {
    brightness: i16,
    contrast: i16,
    red: i16,
    green: i16,
    blue: i16,
}

impl ColorCorrection {
    /// Creates a new correction. Out of range values are clamped.
    pub fn new(brightness: i16, contrast: i16, red: i16, green: i16, blue: i16) -> Self {
        let clamp = |v: i16| v.clamp(-CORRECTION_LIMIT, CORRECTION_LIMIT);
        Self {
            brightness: clamp(brightness),
            contrast: clamp(contrast),
            red: clamp(red),
            green: clamp(green),
            blue: clamp(blue),
        }
    }

    pub fn brightness(&self) -> i16 {
        self.brightness
    }

    pub fn contrast(&self) -> i16 {
        self.contrast
    }

    pub fn red(&self) -> i16 {
        self.red
    }

    pub fn green(&self) -> i16 {
        self.green
    }

    pub fn blue(&self) -> i16 {
        self.blue
    }

    /// Returns true if applying this correction cannot change a pixel.
    pub fn is_identity(&self) -> bool {
        *self == ColorCorrection::default()
    }

    /// Applies the correction: brightness, then contrast about 128, then the
    /// channel offset, then rounding and clamping. The order matters.
    pub fn apply(&self, rgb: Rgb) -> Rgb {
        if self.is_identity() {
            return rgb;
        }

        let contrast_factor = (f64::from(self.contrast) + 255.0) / 255.0;
        let channel = |value: u8, adjustment: i16| -> u8 {
            let mut c = f64::from(value) + f64::from(self.brightness);
            c = 128.0 + (c - 128.0) * contrast_factor;
            c += f64::from(adjustment);
            c.round().clamp(0.0, 255.0) as u8
        };

        Rgb {
            r: channel(rgb.r, self.red),
            g: channel(rgb.g, self.green),
            b: channel(rgb.b, self.blue),
        }
    }
}
