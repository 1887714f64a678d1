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

pub mod correction;
pub mod order;
pub mod white;

pub use correction::ColorCorrection;
pub use order::ChannelOrder;
pub use white::WhiteChannelSynthesizer;

/// The largest number of channels a single pixel can occupy (RGBCWW).
pub const MAX_CHANNELS_PER_PIXEL: usize = 6;

/// An 8 bit RGB color as read from a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(value: [u8; 3]) -> Self {
        Rgb::new(value[0], value[1], value[2])
    }
}

/// The DMX channel values of a single pixel, in logical order
/// (R, G, B followed by any white channels) until a channel order is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelChannels {
    values: [u8; MAX_CHANNELS_PER_PIXEL],
    len: usize,
}

impl PixelChannels {
    /// Creates the channels for a pixel with the given extra (white) channels.
    pub fn new(rgb: Rgb, extra: &[u8]) -> Self {
        let mut values = [0u8; MAX_CHANNELS_PER_PIXEL];
        values[0] = rgb.r;
        values[1] = rgb.g;
        values[2] = rgb.b;
        let extra = &extra[..extra.len().min(MAX_CHANNELS_PER_PIXEL - 3)];
        values[3..3 + extra.len()].copy_from_slice(extra);
        Self {
            values,
            len: 3 + extra.len(),
        }
    }

    /// Builds channels directly from a slice. Anything past the maximum pixel width is dropped.
    pub fn from_slice(channels: &[u8]) -> Self {
        let len = channels.len().min(MAX_CHANNELS_PER_PIXEL);
        let mut values = [0u8; MAX_CHANNELS_PER_PIXEL];
        values[..len].copy_from_slice(&channels[..len]);
        Self { values, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.values[..self.len]
    }
}
