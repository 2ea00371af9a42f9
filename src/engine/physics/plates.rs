// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Plate identification by velocity-coherent flood-fill over the lithosphere shell
// ABOUTME: Plates are a registry keyed by id; voxels carry only the integer plate_id (spec §9)

use std::collections::VecDeque;

use crate::engine::core::coords::VoxelAddr;
use crate::engine::core::planet::Planet;
use crate::engine::core::voxel::Material;

use super::constants::{MIN_PLATE_MEMBERS, PLATE_VELOCITY_THRESHOLD};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlateType {
    Continental,
    Oceanic,
    Mixed,
}

#[derive(Debug, Clone)]
pub struct Plate {
    pub id: u32,
    pub centroid_lat_deg: f64,
    pub centroid_lon_deg: f64,
    pub euler_pole_lat_deg: f64,
    pub euler_pole_lon_deg: f64,
    pub angular_velocity: f64, // rad/s about the euler pole axis
    /// Full angular velocity vector (axis * speed); `euler_pole_*`/`angular_velocity` above
    /// are its published lat/lon/magnitude decomposition, refreshed by the force step.
    pub omega: crate::engine::core::math::Vec3,
    pub plate_type: PlateType,
    pub average_age_years: f64,
    pub thickness_m: f64,
    pub area_m2: f64,
    pub mass_kg: f64,
    pub members: Vec<VoxelAddr>,
    pub boundary: Vec<VoxelAddr>,
}

impl Plate {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// The live set of plates produced by the most recent identification pass (spec §9
/// "Plates are conceptually owned by a plate registry keyed by id").
#[derive(Debug, Clone, Default)]
pub struct PlateRegistry {
    pub plates: Vec<Plate>,
    pub last_identified_years: f64,
}

impl PlateRegistry {
    pub fn get(&self, id: u32) -> Option<&Plate> {
        self.plates.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Plate> {
        self.plates.iter_mut().find(|p| p.id == id)
    }
}

const DEFAULT_THICKNESS_M: f64 = 100_000.0;

fn velocity_close(a: (f64, f64), b: (f64, f64)) -> bool {
    (a.0 - b.0).abs() < PLATE_VELOCITY_THRESHOLD && (a.1 - b.1).abs() < PLATE_VELOCITY_THRESHOLD
}

/// Flood-fill the lithosphere shell into velocity-coherent components and promote components
/// at or above `MIN_PLATE_MEMBERS` to plates (spec §4.7). Clears every voxel's `plate_id`
/// first so no stale id can survive the transaction (invariant 5, spec §3).
pub fn identify(planet: &mut Planet, elapsed_years: f64) -> PlateRegistry {
    let lith = planet.lithosphere_shell_index();
    let layout = planet.shell(lith).layout.clone();

    for band in 0..layout.lat_bands() {
        for lon in 0..layout.lon_count(band) {
            planet.shell_mut(lith).voxel_mut(band, lon).plate_id = 0;
            planet.shell_mut(lith).voxel_mut(band, lon).is_boundary = false;
        }
    }

    let mut visited = vec![false; layout.total_voxels()];
    let mut plates = Vec::new();
    let mut next_id = 1u32;

    for band in 0..layout.lat_bands() {
        for lon in 0..layout.lon_count(band) {
            let flat = layout.flat_index(band, lon);
            if visited[flat] {
                continue;
            }
            let seed_addr = VoxelAddr::new(lith, band, lon);
            let seed = *planet.voxel(seed_addr);
            visited[flat] = true;
            if seed.material.is_fluid() || !seed.is_brittle {
                continue;
            }

            let seed_vel = (seed.v_north, seed.v_east);
            let mut members = vec![seed_addr];
            let mut queue = VecDeque::new();
            queue.push_back(seed_addr);

            while let Some(addr) = queue.pop_front() {
                for n_addr in planet.neighbors(addr).lateral() {
                    let n_flat = layout.flat_index(n_addr.band, n_addr.lon);
                    if visited[n_flat] {
                        continue;
                    }
                    let n = *planet.voxel(n_addr);
                    if n.material.is_fluid() || !n.is_brittle {
                        continue;
                    }
                    if !velocity_close((n.v_north, n.v_east), seed_vel) {
                        continue;
                    }
                    visited[n_flat] = true;
                    members.push(n_addr);
                    queue.push_back(n_addr);
                }
            }

            if members.len() < MIN_PLATE_MEMBERS {
                continue;
            }

            let id = next_id;
            next_id += 1;

            let mut sum_lat = 0.0;
            let mut sum_lon = 0.0;
            let mut sum_age = 0.0;
            let mut granite_count = 0usize;
            let mut basalt_count = 0usize;
            let mut area = 0.0;
            let mut mass = 0.0;

            for &addr in &members {
                planet.voxel_mut(addr).plate_id = id;
                let v = planet.voxel(addr);
                let shell = planet.shell(addr.shell);
                let latlon = crate::engine::core::coords::voxel_latlon(addr, &shell.layout);
                sum_lat += latlon.lat_deg;
                sum_lon += latlon.lon_deg;
                sum_age += v.age;
                match v.material {
                    Material::Granite => granite_count += 1,
                    Material::Basalt => basalt_count += 1,
                    _ => {}
                }
                let vol = shell.voxel_volume(addr.band);
                area += vol / shell.thickness();
                mass += vol * v.density;
            }

            let n = members.len() as f64;
            let plate_type = if granite_count as f64 > 2.0 * basalt_count as f64 {
                PlateType::Continental
            } else if basalt_count as f64 > 2.0 * granite_count as f64 {
                PlateType::Oceanic
            } else {
                PlateType::Mixed
            };

            let mut boundary = Vec::new();
            for &addr in &members {
                let is_boundary = planet
                    .neighbors(addr)
                    .lateral()
                    .any(|n_addr| planet.voxel(n_addr).plate_id != id);
                if is_boundary {
                    planet.voxel_mut(addr).is_boundary = true;
                    boundary.push(addr);
                }
            }

            plates.push(Plate {
                id,
                centroid_lat_deg: sum_lat / n,
                centroid_lon_deg: sum_lon / n,
                euler_pole_lat_deg: sum_lat / n,
                euler_pole_lon_deg: sum_lon / n,
                angular_velocity: 0.0,
                omega: crate::engine::core::math::Vec3::zero(),
                plate_type,
                average_age_years: sum_age / n,
                thickness_m: DEFAULT_THICKNESS_M,
                area_m2: area,
                mass_kg: mass,
                members,
                boundary,
            });
        }
    }

    PlateRegistry {
        plates,
        last_identified_years: elapsed_years,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::core::voxel::Voxel;

    #[test]
    fn uniform_velocity_lithosphere_forms_one_plate() {
        let mut planet = Planet::new_uninitialized(6.371e6, 6, 12, 24).unwrap();
        let lith = planet.lithosphere_shell_index();
        for v in planet.shell_mut(lith).iter_mut() {
            *v = Voxel::new(Material::Granite, 400.0, 0.0);
            v.is_brittle = true;
        }
        let registry = identify(&mut planet, 0.0);
        assert_eq!(registry.plates.len(), 1);
        assert!(registry.plates[0].member_count() >= MIN_PLATE_MEMBERS);
    }

    #[test]
    fn no_brittle_voxels_means_no_plates() {
        let mut planet = Planet::new_uninitialized(6.371e6, 6, 12, 24).unwrap();
        let registry = identify(&mut planet, 0.0);
        assert!(registry.plates.is_empty());
    }
}
