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

pub mod master;

use serde::Serialize;

use crate::color::Rgb;
use crate::fixture::Point;
use crate::frame::Frame;

/// The default canvas width fixtures are authored against.
pub const DEFAULT_CANVAS_WIDTH: f64 = 1920.0;
/// The default canvas height fixtures are authored against.
pub const DEFAULT_CANVAS_HEIGHT: f64 = 1080.0;

/// The coordinate space fixture points were authored in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Canvas {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

/// Reads the color under each fixture point from a frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameSampler {
    canvas: Canvas,
}

impl FrameSampler {
    pub fn new(canvas: Canvas) -> Self {
        Self { canvas }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Samples one color per point, in point order.
    ///
    /// Points are scaled from canvas space into the frame, truncated and then
    /// clamped to the frame edges. An empty frame samples black.
    pub fn sample(&self, points: &[Point], frame: &Frame) -> Vec<Rgb> {
        if frame.is_empty() {
            return vec![Rgb::BLACK; points.len()];
        }

        points
            .iter()
            .map(|point| {
                let x = scale(point.x, self.canvas.width, frame.width());
                let y = scale(point.y, self.canvas.height, frame.height());
                frame.pixel(x, y)
            })
            .collect()
    }
}

/// Maps a canvas coordinate to a pixel index in `[0, buffer_dim - 1]`.
fn scale(coordinate: f64, canvas_dim: f64, buffer_dim: u32) -> u32 {
    let max = i64::from(buffer_dim) - 1;
    // NaN casts to 0 and infinities saturate, so degenerate canvases still clamp.
    let scaled = (f64::from(buffer_dim) * coordinate / canvas_dim) as i64;
    scaled.clamp(0, max) as u32
}
