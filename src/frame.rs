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

use std::path::Path;

use image::{Rgb as ImageRgb, RgbImage};

use crate::color::Rgb;

/// A rendered RGB frame, 8 bits per channel.
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// Creates a black frame.
    pub fn new(width: u32, height: u32) -> Frame {
        Frame {
            image: RgbImage::new(width, height),
        }
    }

    pub fn from_image(image: RgbImage) -> Frame {
        Frame { image }
    }

    /// Wraps a row-major, height x width x 3 buffer. Returns None if the buffer
    /// does not match the dimensions.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Frame> {
        RgbImage::from_raw(width, height, data).map(Frame::from_image)
    }

    /// Loads a still image from disk.
    pub fn open(path: &Path) -> Result<Frame, image::ImageError> {
        Ok(Frame::from_image(image::open(path)?.to_rgb8()))
    }

    /// A frame filled with a single color.
    pub fn solid(width: u32, height: u32, color: Rgb) -> Frame {
        Frame {
            image: RgbImage::from_pixel(width, height, ImageRgb([color.r, color.g, color.b])),
        }
    }

    /// A left to right gradient between two colors.
    pub fn horizontal_gradient(width: u32, height: u32, from: Rgb, to: Rgb) -> Frame {
        let span = f64::from(width.saturating_sub(1).max(1));
        let lerp =
            |a: u8, b: u8, t: f64| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Frame {
            image: RgbImage::from_fn(width, height, |x, _| {
                let t = f64::from(x) / span;
                ImageRgb([lerp(from.r, to.r, t), lerp(from.g, to.g, t), lerp(from.b, to.b, t)])
            }),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }

    /// Reads a pixel. The coordinates must be in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        Rgb::from(self.image.get_pixel(x, y).0)
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) {
        self.image.put_pixel(x, y, ImageRgb([color.r, color.g, color.b]));
    }
}
