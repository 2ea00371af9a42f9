// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Surface water redistribution, coastal erosion, and the binary search that keeps
// ABOUTME: sea level consistent with the planet's conserved total water volume

use crate::engine::core::coords::VoxelAddr;
use crate::engine::core::planet::Planet;
use crate::engine::core::voxel::Material;

const FLOW_SMOOTHING: f64 = 0.1;
const COASTAL_EROSION_BAND_M: f64 = 10.0;
const COASTAL_EROSION_MIN_WATER_NEIGHBORS: usize = 5; // spec §4.12: "surrounded by >=5 water neighbors" of 8
const SEA_LEVEL_SEARCH_MIN_M: f64 = -11_000.0;
const SEA_LEVEL_SEARCH_MAX_M: f64 = 9_000.0;
const SEA_LEVEL_BISECTION_STEPS: usize = 60;

/// Redistribute surface water toward lower-elevation neighbors, a flat-bottom-fill
/// approximation (spec §4.12): adjacent water voxels relax their elevation difference each
/// tick rather than instantaneously equalizing.
fn flow(planet: &mut Planet) {
    let surface = planet.surface_shell_index();
    let layout = planet.shell(surface).layout.clone();
    let mut deltas: Vec<(VoxelAddr, f64)> = Vec::new();

    for band in 0..layout.lat_bands() {
        for lon in 0..layout.lon_count(band) {
            let addr = VoxelAddr::new(surface, band, lon);
            let v = planet.voxel(addr);
            if !matches!(v.material, Material::Water) {
                continue;
            }
            let own_elevation = v.elevation;
            for n_addr in planet.neighbors(addr).lateral() {
                let n = planet.voxel(n_addr);
                if !matches!(n.material, Material::Water) {
                    continue;
                }
                if n.elevation < own_elevation {
                    let delta = (own_elevation - n.elevation) * FLOW_SMOOTHING;
                    deltas.push((addr, -delta));
                    deltas.push((n_addr, delta));
                }
            }
        }
    }

    for (addr, delta) in deltas {
        planet.voxel_mut(addr).elevation += delta;
    }
}

/// Erode thin coastal land into water and expose raised ocean floor as sediment
/// (spec §4.12).
fn coastal_erosion(planet: &mut Planet) {
    let surface = planet.surface_shell_index();
    let layout = planet.shell(surface).layout.clone();
    let sea_level = planet.sea_level_m;
    let mut conversions: Vec<(VoxelAddr, Material)> = Vec::new();

    for band in 0..layout.lat_bands() {
        for lon in 0..layout.lon_count(band) {
            let addr = VoxelAddr::new(surface, band, lon);
            let v = planet.voxel(addr);
            if matches!(v.material, Material::Water | Material::Air) {
                if matches!(v.material, Material::Water) && v.elevation > sea_level {
                    conversions.push((addr, Material::Sediment));
                }
                continue;
            }
            if (v.elevation - sea_level).abs() >= COASTAL_EROSION_BAND_M {
                continue;
            }
            let water_neighbors = planet
                .surrounding8(addr)
                .into_iter()
                .filter(|&n| matches!(planet.voxel(n).material, Material::Water))
                .count();
            if water_neighbors >= COASTAL_EROSION_MIN_WATER_NEIGHBORS {
                conversions.push((addr, Material::Water));
            }
        }
    }

    for (addr, material) in conversions {
        let voxel = planet.voxel_mut(addr);
        voxel.material = material;
        voxel.density = material.properties().default_density;
    }
}

/// Total water-equivalent volume if sea level were `candidate_s`: water voxels plus land
/// columns on the surface shell submerged below it (spec §4.12 / §3 invariant 4).
fn total_volume_at_sea_level(planet: &Planet, candidate_s: f64) -> f64 {
    let surface = planet.surface_shell_index();
    let shell = planet.shell(surface);
    let mut total = 0.0;
    for band in 0..shell.layout.lat_bands() {
        let vol = shell.voxel_volume(band);
        for lon in 0..shell.layout.lon_count(band) {
            let v = shell.voxel(band, lon);
            match v.material {
                Material::Water => total += vol,
                Material::Air => {}
                _ => {
                    if v.elevation < candidate_s {
                        total += vol;
                    }
                }
            }
        }
    }
    total
}

/// Binary-search the sea level so total water-equivalent volume matches the conserved
/// `water_volume_m3` invariant (spec §4.12).
pub(crate) fn recompute_sea_level(planet: &mut Planet) {
    let target = planet.water_volume_m3;
    let mut lo = SEA_LEVEL_SEARCH_MIN_M;
    let mut hi = SEA_LEVEL_SEARCH_MAX_M;

    for _ in 0..SEA_LEVEL_BISECTION_STEPS {
        let mid = 0.5 * (lo + hi);
        let vol = total_volume_at_sea_level(planet, mid);
        if vol < target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    planet.sea_level_m = 0.5 * (lo + hi);
}

/// Run one water tick: flow, coastal erosion, then sea-level recomputation (spec §4.12).
/// Called at the `WATER_TICK_INTERVAL_YEARS` cadence by the scheduler.
///
/// `water_volume_m3` (Vw) is the conserved invariant (spec.md §3 invariant 4) and is never
/// reassigned here: only sea level moves to keep the water-voxel-plus-submerged-land total
/// matching it. Flow and erosion redistribute material; they do not create or destroy water.
pub fn step(planet: &mut Planet) {
    flow(planet);
    coastal_erosion(planet);
    recompute_sea_level(planet);
}
