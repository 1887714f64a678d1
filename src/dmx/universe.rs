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

use std::collections::BTreeMap;

use serde::Serialize;

use crate::fixture::Fixture;
use crate::output::Output;

/// A DMX universe is 512 channels.
pub const UNIVERSE_SIZE: usize = 512;

/// Channels per universe that pixels are allowed to occupy.
pub const USABLE_CHANNELS: usize = 510;

/// The highest universe an ArtNet port address can carry (15 bits).
pub const MAX_UNIVERSE: u16 = 0x7fff;

/// A 1-indexed DMX address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelAddress {
    pub universe: u16,
    /// The first channel of the pixel, starting at 1.
    pub channel: u16,
}

/// How a fixture's pixels are spread over universes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UniverseAllocation {
    start_universe: u16,
    point_count: usize,
    channels_per_pixel: usize,
    pixels_per_universe: usize,
    total_channels: usize,
    universes_needed: usize,
}

/// Allocates universes for `point_count` pixels of `channels_per_pixel` channels each.
pub fn allocate(
    point_count: usize,
    channels_per_pixel: usize,
    start_universe: u16,
) -> UniverseAllocation {
    let channels_per_pixel = channels_per_pixel.clamp(1, USABLE_CHANNELS);
    let total_channels = point_count * channels_per_pixel;
    UniverseAllocation {
        start_universe,
        point_count,
        channels_per_pixel,
        pixels_per_universe: USABLE_CHANNELS / channels_per_pixel,
        total_channels,
        universes_needed: total_channels.div_ceil(USABLE_CHANNELS),
    }
}

impl UniverseAllocation {
    pub fn start_universe(&self) -> u16 {
        self.start_universe
    }

    pub fn pixels_per_universe(&self) -> usize {
        self.pixels_per_universe
    }

    pub fn total_channels(&self) -> usize {
        self.total_channels
    }

    pub fn universes_needed(&self) -> usize {
        self.universes_needed
    }

    /// The last universe of the span, `start + universes_needed - 1`. An empty
    /// allocation reports its start universe.
    pub fn end_universe(&self) -> u16 {
        offset(self.start_universe, self.universes_needed.saturating_sub(1))
    }

    /// The address of a pixel. Pixels never straddle a universe boundary.
    pub fn address(&self, pixel: usize) -> ChannelAddress {
        let universe = offset(self.start_universe, pixel / self.pixels_per_universe);
        let channel = 1 + (pixel % self.pixels_per_universe) * self.channels_per_pixel;
        ChannelAddress {
            universe,
            channel: channel as u16,
        }
    }

    /// The last universe the pixel map writes to. This can exceed
    /// [`end_universe`](Self::end_universe) when the pixel width does not divide 510.
    pub fn last_mapped_universe(&self) -> u16 {
        match self.point_count {
            0 => self.start_universe,
            count => self.address(count - 1).universe,
        }
    }
}

fn offset(universe: u16, by: usize) -> u16 {
    u16::try_from(usize::from(universe) + by).unwrap_or(u16::MAX)
}

/// Where a fixture lands on an output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub fixture_id: String,
    pub allocation: UniverseAllocation,
}

impl Placement {
    pub fn first_universe(&self) -> u16 {
        self.allocation.start_universe()
    }

    pub fn last_universe(&self) -> u16 {
        self.allocation.last_mapped_universe()
    }

    /// Returns false if any of the fixture's pixels land past [`MAX_UNIVERSE`].
    pub fn is_addressable(&self) -> bool {
        self.last_universe() <= MAX_UNIVERSE
    }
}

/// Lays fixtures out back to back, each one starting at the universe after the
/// last universe the previous fixture wrote to. Fixtures without points take no space.
pub fn layout<'a>(
    start_universe: u16,
    fixtures: impl IntoIterator<Item = (&'a str, usize, usize)>,
) -> Vec<Placement> {
    let mut next = start_universe;
    fixtures
        .into_iter()
        .map(|(fixture_id, point_count, channels_per_pixel)| {
            let allocation = allocate(point_count, channels_per_pixel, next);
            if point_count > 0 {
                next = offset(allocation.last_mapped_universe(), 1);
            }
            Placement {
                fixture_id: fixture_id.to_string(),
                allocation,
            }
        })
        .collect()
}

/// Lays out an output's fixtures in assignment order. Fixture ids `lookup`
/// can't resolve take no space.
pub fn layout_output<'a>(
    output: &Output,
    lookup: impl Fn(&str) -> Option<&'a Fixture>,
) -> Vec<Placement> {
    layout(
        output.start_universe(),
        output
            .fixture_ids()
            .iter()
            .filter_map(|id| lookup(id.as_str()))
            .map(|fixture| {
                (
                    fixture.id(),
                    fixture.point_count(),
                    fixture.channels_per_pixel(),
                )
            }),
    )
}

/// The DMX data for every universe of one output frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DmxFrame {
    universes: BTreeMap<u16, Box<[u8; UNIVERSE_SIZE]>>,
}

impl DmxFrame {
    pub fn new() -> DmxFrame {
        DmxFrame::default()
    }

    /// Makes sure the universe is part of the frame, even if nothing is written to it.
    pub fn ensure_universe(&mut self, universe: u16) -> &mut [u8; UNIVERSE_SIZE] {
        self.universes
            .entry(universe)
            .or_insert_with(|| Box::new([0u8; UNIVERSE_SIZE]))
    }

    /// Writes channel values starting at the given address. Anything past the
    /// end of the universe is dropped.
    pub fn write(&mut self, address: ChannelAddress, values: &[u8]) {
        let start = usize::from(address.channel.max(1)) - 1;
        let data = self.ensure_universe(address.universe);
        if start >= UNIVERSE_SIZE {
            return;
        }
        let end = (start + values.len()).min(UNIVERSE_SIZE);
        data[start..end].copy_from_slice(&values[..end - start]);
    }

    pub fn universe(&self, universe: u16) -> Option<&[u8; UNIVERSE_SIZE]> {
        self.universes.get(&universe).map(|data| &**data)
    }

    /// Universe numbers in ascending order.
    pub fn universe_ids(&self) -> impl Iterator<Item = u16> + '_ {
        self.universes.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &[u8; UNIVERSE_SIZE])> {
        self.universes.iter().map(|(universe, data)| (*universe, &**data))
    }

    pub fn len(&self) -> usize {
        self.universes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.universes.is_empty()
    }

    /// A frame with the same universes, all channels at zero.
    pub fn dark(&self) -> DmxFrame {
        let mut dark = DmxFrame::new();
        for universe in self.universe_ids() {
            dark.ensure_universe(universe);
        }
        dark
    }
}
