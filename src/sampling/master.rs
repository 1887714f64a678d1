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

//! Derives a slave fixture's colors from its master's sampled colors.

use crate::color::Rgb;
use crate::fixture::Fixture;

/// The master pixel a slave pixel copies. Nearest-floor scaling, no interpolation.
pub fn master_index(slave_index: usize, slave_count: usize, master_count: usize) -> usize {
    if slave_count == master_count {
        return slave_index;
    }
    if slave_count == 0 || master_count == 0 {
        return 0;
    }
    (slave_index * master_count / slave_count).min(master_count - 1)
}

/// Produces one color per slave point from the master's colors.
///
/// `master_colors` is what the sampler read for the master on the master's own
/// input layer. A master without colors leaves the slave dark.
pub fn resolve(slave: &Fixture, master: &Fixture, master_colors: &[Rgb]) -> Vec<Rgb> {
    let slave_count = slave.point_count();
    let master_count = master.point_count().min(master_colors.len());
    if master_count == 0 {
        return vec![Rgb::BLACK; slave_count];
    }

    (0..slave_count)
        .map(|i| master_colors[master_index(i, slave_count, master_count)])
        .collect()
}
