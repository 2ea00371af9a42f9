// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Hydrostatic pressure by top-down sweep from the outermost shell inward

use crate::engine::core::coords::VoxelAddr;
use crate::engine::core::planet::Planet;

use super::constants::{GRAVITY, SURFACE_AIR_PRESSURE};

/// Recompute pressure shell-by-shell, outermost to innermost (spec §4.3). No lateral
/// smoothing: each voxel's pressure depends only on its outward radial neighbor.
pub fn step(planet: &mut Planet) {
    let surface = planet.surface_shell_index();

    for band in 0..planet.shell(surface).layout.lat_bands() {
        for lon in 0..planet.shell(surface).layout.lon_count(band) {
            planet.shell_mut(surface).voxel_mut(band, lon).pressure = SURFACE_AIR_PRESSURE;
        }
    }

    for s in (0..surface).rev() {
        let outer_mean_r = planet.shell(s + 1).mean_radius();
        let mean_r = planet.shell(s).mean_radius();
        let delta_r = (outer_mean_r - mean_r).abs();

        let addrs: Vec<VoxelAddr> = {
            let layout = &planet.shell(s).layout;
            (0..layout.lat_bands())
                .flat_map(|band| (0..layout.lon_count(band)).map(move |lon| VoxelAddr::new(s, band, lon)))
                .collect()
        };

        for addr in addrs {
            let neighbors = planet.neighbors(addr);
            let outer_addr = match neighbors.outward {
                Some(a) => a,
                None => continue,
            };
            let outer = planet.voxel(outer_addr);
            let outer_pressure = outer.pressure;
            let outer_density = outer.density;
            let new_pressure = outer_pressure + outer_density * GRAVITY * delta_r;
            planet.voxel_mut(addr).pressure = new_pressure;
        }
    }
}
