// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: The read-only renderer contract (spec.md §6): a packed voxel snapshot, a plate
// ABOUTME: snapshot, and simulation time/sea-level/dirty state. Renderers write nothing back.

use crate::engine::core::planet::Planet;
use crate::engine::physics::plates::{PlateRegistry, PlateType};

/// Per-shell offset table and per-band longitude-count table, the layout a GPU-friendly flat
/// buffer needs to interpret `VoxelFields` (spec.md §6 "per-shell offset table and per-band M
/// table").
#[derive(Debug, Clone)]
pub struct ShellOffsetTable {
    /// Flat index of each shell's first voxel, one entry per shell plus a trailing total.
    pub shell_offsets: Vec<usize>,
    /// `band_lon_counts[shell][band]`.
    pub band_lon_counts: Vec<Vec<usize>>,
}

/// Packed, struct-of-arrays voxel fields in shell-major flat order (spec.md §6: "material,
/// temperature, velocity, age, stress, plateId, isBoundary, elevation, subLat/subLon").
#[derive(Debug, Clone, Default)]
pub struct VoxelFields {
    pub material: Vec<u8>,
    pub temperature: Vec<f32>,
    pub v_north: Vec<f32>,
    pub v_east: Vec<f32>,
    pub v_radial: Vec<f32>,
    pub age: Vec<f32>,
    pub stress: Vec<f32>,
    pub plate_id: Vec<u32>,
    pub is_boundary: Vec<bool>,
    pub elevation: Vec<f32>,
    pub sub_lat: Vec<f32>,
    pub sub_lon: Vec<f32>,
}

/// One plate's published summary (spec.md §6: "per-plate Euler pole (lat, lon, omega), type,
/// member count, centroid").
#[derive(Debug, Clone)]
pub struct PlateSnapshot {
    pub id: u32,
    pub euler_pole_lat_deg: f64,
    pub euler_pole_lon_deg: f64,
    pub angular_velocity_rad_per_s: f64,
    pub plate_type: PlateType,
    pub member_count: usize,
    pub centroid_lat_deg: f64,
    pub centroid_lon_deg: f64,
}

/// The complete read-only view handed to a renderer each frame (spec.md §6).
#[derive(Debug, Clone)]
pub struct RenderSnapshot {
    pub offsets: ShellOffsetTable,
    pub voxels: VoxelFields,
    pub plates: Vec<PlateSnapshot>,
    pub elapsed_years: f64,
    pub sea_level_m: f64,
    pub mesh_dirty: bool,
}

/// Build a `RenderSnapshot` from the current planet and plate registry. Does not mutate
/// `planet.mesh_dirty` -- clearing it is the consumer's job (spec.md §6: "a `meshDirty` flag
/// cleared by the consumer"), performed through `Simulation::acknowledge_render`.
pub fn build_snapshot(planet: &Planet, registry: &PlateRegistry) -> RenderSnapshot {
    let mut shell_offsets = Vec::with_capacity(planet.shell_count() + 1);
    let mut band_lon_counts = Vec::with_capacity(planet.shell_count());
    let mut offset = 0usize;

    let mut voxels = VoxelFields::default();

    for s in 0..planet.shell_count() {
        shell_offsets.push(offset);
        let shell = planet.shell(s);
        let mut bands = Vec::with_capacity(shell.layout.lat_bands());
        for band in 0..shell.layout.lat_bands() {
            bands.push(shell.layout.lon_count(band));
            for lon in 0..shell.layout.lon_count(band) {
                let v = shell.voxel(band, lon);
                voxels.material.push(v.material.to_u8());
                voxels.temperature.push(v.temperature as f32);
                voxels.v_north.push(v.v_north as f32);
                voxels.v_east.push(v.v_east as f32);
                voxels.v_radial.push(v.v_radial as f32);
                voxels.age.push(v.age as f32);
                voxels.stress.push(v.stress as f32);
                voxels.plate_id.push(v.plate_id);
                voxels.is_boundary.push(v.is_boundary);
                voxels.elevation.push(v.elevation as f32);
                voxels.sub_lat.push(v.sub_lat as f32);
                voxels.sub_lon.push(v.sub_lon as f32);
            }
        }
        band_lon_counts.push(bands);
        offset += shell.layout.total_voxels();
    }
    shell_offsets.push(offset);

    let plates = registry
        .plates
        .iter()
        .map(|p| PlateSnapshot {
            id: p.id,
            euler_pole_lat_deg: p.euler_pole_lat_deg,
            euler_pole_lon_deg: p.euler_pole_lon_deg,
            angular_velocity_rad_per_s: p.angular_velocity,
            plate_type: p.plate_type,
            member_count: p.member_count(),
            centroid_lat_deg: p.centroid_lat_deg,
            centroid_lon_deg: p.centroid_lon_deg,
        })
        .collect();

    RenderSnapshot {
        offsets: ShellOffsetTable {
            shell_offsets,
            band_lon_counts,
        },
        voxels,
        plates,
        elapsed_years: planet.elapsed_years,
        sea_level_m: planet.sea_level_m,
        mesh_dirty: planet.mesh_dirty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_voxel_count_matches_planet() {
        let planet = Planet::new_uninitialized(6.371e6, 4, 6, 12).unwrap();
        let registry = PlateRegistry::default();
        let snapshot = build_snapshot(&planet, &registry);
        let total: usize = (0..planet.shell_count()).map(|s| planet.shell(s).layout.total_voxels()).sum();
        assert_eq!(snapshot.voxels.material.len(), total);
        assert_eq!(*snapshot.offsets.shell_offsets.last().unwrap(), total);
    }
}
