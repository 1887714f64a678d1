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

use super::PixelChannels;
use crate::fixture::LedVariant;

/// Known channel orders. `output[i] = input[permutation[i]]`, where the input is
/// in logical order (R, G, B, then the variant's white channels).
const CHANNEL_ORDERS: &[(&str, &[usize])] = &[
    ("RGB", &[0, 1, 2]),
    ("RBG", &[0, 2, 1]),
    ("GRB", &[1, 0, 2]),
    ("GBR", &[1, 2, 0]),
    ("BRG", &[2, 0, 1]),
    ("BGR", &[2, 1, 0]),
    ("RGBW", &[0, 1, 2, 3]),
    ("GRBW", &[1, 0, 2, 3]),
    ("BRGW", &[2, 0, 1, 3]),
    ("BGRW", &[2, 1, 0, 3]),
    ("WRGB", &[3, 0, 1, 2]),
    ("RGBAW", &[0, 1, 2, 3, 4]),
    ("GRBAW", &[1, 0, 2, 3, 4]),
    ("RGBWW", &[0, 1, 2, 3, 4]),
    ("GRBWW", &[1, 0, 2, 3, 4]),
    ("RGBCW", &[0, 1, 2, 3, 4]),
    ("GRBCW", &[1, 0, 2, 3, 4]),
    ("RGBCWW", &[0, 1, 2, 3, 4, 5]),
    ("GRBCWW", &[1, 0, 2, 3, 4, 5]),
];

/// A named permutation from logical color components to wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelOrder {
    name: &'static str,
    permutation: &'static [usize],
}

impl ChannelOrder {
    /// Looks up a channel order by name (case insensitive).
    pub fn parse(name: &str) -> Option<ChannelOrder> {
        let name = name.trim();
        CHANNEL_ORDERS
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|&(name, permutation)| ChannelOrder { name, permutation })
    }

    /// The identity order for the given variant.
    pub fn native(variant: LedVariant) -> ChannelOrder {
        ChannelOrder::parse(variant.name()).unwrap_or(ChannelOrder {
            name: "RGB",
            permutation: &[0, 1, 2],
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of channels this order permutes.
    pub fn len(&self) -> usize {
        self.permutation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permutation.is_empty()
    }

    /// Returns true if this order can be applied to a pixel of the given width.
    pub fn fits(&self, channels: usize) -> bool {
        self.permutation.len() == channels
    }

    /// Reorders the channels. A width mismatch leaves the pixel unchanged.
    pub fn apply(&self, channels: PixelChannels) -> PixelChannels {
        if !self.fits(channels.len()) {
            return channels;
        }

        let input = channels.as_slice();
        let mut output = [0u8; super::MAX_CHANNELS_PER_PIXEL];
        for (slot, &source) in output.iter_mut().zip(self.permutation) {
            *slot = input[source];
        }
        PixelChannels::from_slice(&output[..self.permutation.len()])
    }
}

impl fmt::Display for ChannelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn test_grb() {
        let order = ChannelOrder::parse("GRB").unwrap();
        let pixel = order.apply(PixelChannels::new(Rgb::new(255, 0, 0), &[]));
        assert_eq!(&[0, 255, 0], pixel.as_slice());
    }

    #[test]
    fn test_rotations() {
        let pixel = PixelChannels::new(Rgb::new(1, 2, 3), &[]);
        let cases = [
            ("rgb", [1, 2, 3]),
            ("RBG", [1, 3, 2]),
            ("GBR", [2, 3, 1]),
            ("BRG", [3, 1, 2]),
            ("bgr", [3, 2, 1]),
        ];
        for (name, expected) in cases {
            let order = ChannelOrder::parse(name).unwrap();
            assert_eq!(&expected, order.apply(pixel).as_slice(), "order {}", name);
        }
    }

    #[test]
    fn test_white_first() {
        let order = ChannelOrder::parse("WRGB").unwrap();
        let pixel = order.apply(PixelChannels::new(Rgb::new(1, 2, 3), &[4]));
        assert_eq!(&[4, 1, 2, 3], pixel.as_slice());
    }

    #[test]
    fn test_mismatched_width_is_a_no_op() {
        let order = ChannelOrder::parse("GRB").unwrap();
        let pixel = PixelChannels::new(Rgb::new(1, 2, 3), &[4]);
        assert_eq!(pixel, order.apply(pixel));

        let order = ChannelOrder::parse("GRBCWW").unwrap();
        let pixel = PixelChannels::new(Rgb::new(1, 2, 3), &[]);
        assert_eq!(pixel, order.apply(pixel));
    }

    #[test]
    fn test_unknown_order() {
        assert!(ChannelOrder::parse("XYZ").is_none());
        assert!(ChannelOrder::parse("").is_none());
    }

    #[test]
    fn test_native_orders_match_variant_width() {
        for variant in LedVariant::ALL {
            let order = ChannelOrder::native(variant);
            assert!(order.fits(variant.channels_per_pixel()), "{}", variant);
            assert_eq!(variant.name(), order.name());
        }
    }
}
