// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Sub-cell positional accumulation, whole-cell carry/apply, plate gap-fill, and
// ABOUTME: shell-to-shell transfers for material that crosses a radial cell boundary

use crate::engine::core::coords::{self, VoxelAddr};
use crate::engine::core::grid::ShellLayout;
use crate::engine::core::planet::Planet;
use crate::engine::core::voxel::{Material, Voxel};
use rayon::prelude::*;

const COLLISION_STRESS: f64 = 1.0e7;
const COLLISION_UPLIFT_THRESHOLD: f64 = 5.0e7;
const COLLISION_UPLIFT: f64 = 10.0;
const COLLISION_STRETCH_FACTOR: f64 = 0.85;
const OCEANIC_QUEUED_SUBDUCTION_VR: f64 = -0.001;
const GAP_FILL_DEFORMATION_RATE: f64 = 0.01;
const SUBDUCTION_MELT_TEMP: f64 = 1400.0;
const SUBDUCTION_MELT_FRACTION: f64 = 0.1;
const RISING_COOLING_PER_SHELL: f64 = 50.0;
const RISING_SOLIDIFY_TEMP: f64 = 1200.0;
const GRANITE_SURFACE_ELEVATION_BONUS: f64 = 100.0;

struct LateralMove {
    source: VoxelAddr,
    target: VoxelAddr,
    /// The source voxel's `sub_lon`/`sub_lat` as accumulated before this phase split them
    /// into carry + remainder, so a blocked move in `apply()` can restore them verbatim
    /// (spec §4.10: "Source remains; its sub-offsets are restored (move failed)").
    orig_sub_lon: f64,
    orig_sub_lat: f64,
}

/// Phase 1: accumulate fractional displacement and elevation change for every mobile voxel
/// (spec §4.10). Each voxel only reads and writes its own state, so this runs on the
/// rayon worker pool.
fn accumulate(planet: &mut Planet, dt_seconds: f64) {
    let radius = planet.radius;
    for s in 0..planet.shell_count() {
        let thickness = planet.shell(s).thickness();
        let layout = planet.shell(s).layout.clone();
        let lat_bands = layout.lat_bands();
        planet
            .shell_mut(s)
            .buffer_mut()
            .par_iter_mut()
            .enumerate()
            .for_each(|(flat, v)| {
                if v.material.is_air() {
                    return;
                }
                let (band, _lon) = layout.band_lon_of(flat);
                let lat = coords::band_latitude_deg(band, lat_bands).to_radians();
                let m = layout.lon_count(band) as f64;
                let cos_lat = lat.cos().abs().max(1.0e-6);
                v.sub_lon += v.v_east * dt_seconds * m / (std::f64::consts::TAU * radius * cos_lat);
                v.sub_lat += v.v_north * dt_seconds * lat_bands as f64 / (std::f64::consts::PI * radius);
                v.sub_r += v.v_radial * dt_seconds / thickness.max(1.0);
                v.elevation += v.v_radial * dt_seconds;
            });
    }
}

/// Phase 2: split sub-offsets into an integer carry and a remainder (spec §4.10). Lateral
/// carries become queued moves; radial carries become shell-to-shell transfers (spec §4.11).
fn carry(planet: &mut Planet) -> (Vec<LateralMove>, Vec<(VoxelAddr, bool)>) {
    let mut moves = Vec::new();
    let mut radial_transfers = Vec::new();
    let addrs: Vec<VoxelAddr> = planet.all_addrs().collect();

    for addr in addrs {
        let v = *planet.voxel(addr);
        if v.material.is_air() {
            continue;
        }

        let shell = planet.shell(addr.shell);
        let own_m = shell.layout.lon_count(addr.band);
        let lat_bands = shell.layout.lat_bands();

        let mut sub_lon = v.sub_lon;
        let mut sub_lat = v.sub_lat;
        let mut sub_r = v.sub_r;
        let mut target_band = addr.band;
        let mut target_lon = addr.lon;
        let mut laterally_moved = false;

        if !(0.0..1.0).contains(&sub_lon) {
            let k = sub_lon.floor();
            sub_lon -= k;
            target_lon = ((addr.lon as i64 + k as i64).rem_euclid(own_m as i64)) as usize;
            laterally_moved = true;
        }
        if !(0.0..1.0).contains(&sub_lat) {
            let k = sub_lat.floor();
            sub_lat -= k;
            let new_band = addr.band as i64 + k as i64;
            if new_band < 0 {
                target_band = 0;
                sub_lat = 0.0;
            } else if new_band as usize >= lat_bands {
                target_band = lat_bands - 1;
                sub_lat = 0.0;
            } else {
                target_band = new_band as usize;
            }
            laterally_moved = true;
        }
        if !(0.0..1.0).contains(&sub_r) {
            let k = sub_r.floor();
            sub_r -= k;
            radial_transfers.push((addr, k > 0.0));
        }

        let voxel = planet.voxel_mut(addr);
        voxel.sub_lon = sub_lon.clamp(0.0, 0.999_999);
        voxel.sub_lat = sub_lat.clamp(0.0, 0.999_999);
        voxel.sub_r = sub_r.clamp(0.0, 0.999_999);

        if laterally_moved {
            let target_m = planet.shell(addr.shell).layout.lon_count(target_band);
            let target_lon = if target_band != addr.band {
                ShellLayout::remap_lon(target_lon, own_m, target_m)
            } else {
                target_lon % target_m
            };
            let target = VoxelAddr::new(addr.shell, target_band, target_lon);
            if target != addr {
                moves.push(LateralMove {
                    source: addr,
                    target,
                    orig_sub_lon: v.sub_lon,
                    orig_sub_lat: v.sub_lat,
                });
            }
        }
    }

    (moves, radial_transfers)
}

/// Phase 3: relocate into empty destinations, resolve collisions with occupied crust
/// (spec §4.10).
fn apply(planet: &mut Planet, moves: Vec<LateralMove>) {
    let lith = planet.lithosphere_shell_index();
    for mv in moves {
        let source = *planet.voxel(mv.source);
        let target = *planet.voxel(mv.target);

        if matches!(target.material, Material::Water | Material::Air) {
            *planet.voxel_mut(mv.target) = source;
            let refill_material = if mv.source.shell == lith {
                Material::Water
            } else {
                Material::Peridotite
            };
            *planet.voxel_mut(mv.source) =
                Voxel::new(refill_material, source.temperature, source.pressure);
            continue;
        }
        if target.material.is_fluid() {
            continue;
        }

        let target_mut = planet.voxel_mut(mv.target);
        target_mut.stress += COLLISION_STRESS;
        let target_stress = target_mut.stress;

        if matches!(source.material, Material::Granite) && matches!(target.material, Material::Granite) {
            let target_mut = planet.voxel_mut(mv.target);
            target_mut.stretch_factor = target_mut.stretch_factor.min(COLLISION_STRETCH_FACTOR);
            if target_stress > COLLISION_UPLIFT_THRESHOLD {
                target_mut.elevation += COLLISION_UPLIFT;
            }
            let source_mut = planet.voxel_mut(mv.source);
            source_mut.stretch_factor = source_mut.stretch_factor.min(COLLISION_STRETCH_FACTOR);
        } else if matches!(source.material, Material::Basalt) && matches!(target.material, Material::Granite) {
            planet.voxel_mut(mv.source).v_radial = OCEANIC_QUEUED_SUBDUCTION_VR;
        }

        // Move failed: the source stays put and its accumulated sub-cell offsets are
        // restored rather than discarded (spec §4.10).
        let source_mut = planet.voxel_mut(mv.source);
        source_mut.sub_lon = mv.orig_sub_lon;
        source_mut.sub_lat = mv.orig_sub_lat;
    }
}

/// After Phase 3, fill any empty cell whose 8-connected neighborhood has at least 4 members
/// sharing one plate id with a transient voxel inheriting that plate's properties (spec §4.10
/// "Plate gap-fill": "any empty cell whose ≥4 neighbors (of 8) share a single `plateId`").
const GAP_FILL_MIN_SHARED_NEIGHBORS: usize = 4;

fn gap_fill(planet: &mut Planet) {
    let lith = planet.lithosphere_shell_index();
    let layout = planet.shell(lith).layout.clone();
    let mut fills = Vec::new();

    for band in 0..layout.lat_bands() {
        for lon in 0..layout.lon_count(band) {
            let addr = VoxelAddr::new(lith, band, lon);
            let v = planet.voxel(addr);
            if !matches!(v.material, Material::Water | Material::Air) {
                continue;
            }
            let neighbors = planet.surrounding8(addr);
            if neighbors.is_empty() {
                continue;
            }

            let mut counts: std::collections::HashMap<u32, (usize, VoxelAddr)> =
                std::collections::HashMap::new();
            for &n in &neighbors {
                let pid = planet.voxel(n).plate_id;
                if pid == 0 {
                    continue;
                }
                let entry = counts.entry(pid).or_insert((0, n));
                entry.0 += 1;
            }
            let best = counts
                .values()
                .filter(|(count, _)| *count >= GAP_FILL_MIN_SHARED_NEIGHBORS)
                .max_by_key(|(count, _)| *count);
            if let Some(&(_, template_addr)) = best {
                fills.push((addr, template_addr));
            }
        }
    }

    for (addr, template_addr) in fills {
        let template = *planet.voxel(template_addr);
        let voxel = planet.voxel_mut(addr);
        *voxel = template;
        voxel.is_transient = true;
        voxel.source_plate_id = template.plate_id;
        voxel.stretch_factor = 1.0 + GAP_FILL_DEFORMATION_RATE;
        voxel.sub_lat = 0.0;
        voxel.sub_lon = 0.0;
        voxel.sub_r = 0.0;
    }
}

/// Shell-to-shell transfers for voxels whose radial sub-offset carried past a shell boundary
/// (spec §4.11).
fn transfer_shells(planet: &mut Planet, transfers: Vec<(VoxelAddr, bool)>) {
    let surface = planet.surface_shell_index();
    for (addr, rising) in transfers {
        let neighbors = planet.neighbors(addr);
        let source = *planet.voxel(addr);

        if !rising {
            let Some(target_addr) = neighbors.inward else {
                continue;
            };
            let target_mut = planet.voxel_mut(target_addr);
            if matches!(target_mut.material, Material::Peridotite) {
                target_mut.temperature = 0.7 * target_mut.temperature + 0.3 * source.temperature;
                if target_mut.temperature > SUBDUCTION_MELT_TEMP {
                    target_mut.melt_fraction = SUBDUCTION_MELT_FRACTION;
                }
            }
        } else {
            let Some(target_addr) = neighbors.outward else {
                continue;
            };
            let cooled = (source.temperature - RISING_COOLING_PER_SHELL).max(0.0);
            let target_mut = planet.voxel_mut(target_addr);
            target_mut.temperature = 0.7 * target_mut.temperature + 0.3 * cooled;
            if target_mut.temperature < RISING_SOLIDIFY_TEMP && target_addr.shell >= surface.saturating_sub(1) {
                target_mut.material = Material::Basalt;
                target_mut.density = Material::Basalt.properties().default_density;
            }
            if target_addr.shell == surface && matches!(source.material, Material::Granite) {
                target_mut.elevation += GRANITE_SURFACE_ELEVATION_BONUS;
            }
        }

        planet.voxel_mut(addr).sub_r = 0.0;
    }
}

/// Advance surface/subsurface advection by `dt_years` (spec §4.10, §4.11).
pub fn step(planet: &mut Planet, dt_years: f64) {
    let dt_seconds = dt_years * crate::engine::backend::SECONDS_PER_YEAR;
    accumulate(planet, dt_seconds);
    let (moves, radial_transfers) = carry(planet);
    apply(planet, moves);
    transfer_shells(planet, radial_transfers);
    gap_fill(planet);
}
