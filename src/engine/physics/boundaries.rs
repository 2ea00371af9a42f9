// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Classifies each cross-plate-boundary voxel pair as divergent/convergent/transform
// ABOUTME: and applies the corresponding spreading, subduction, collision, or shear process

use crate::engine::core::coords::VoxelAddr;
use crate::engine::core::planet::Planet;
use crate::engine::core::voxel::Material;

const NORMAL_VELOCITY_THRESHOLD: f64 = 1.0e-6;
const DIVERGENT_TEMP: f64 = 1500.0;
const DIVERGENT_UPWELLING_VR: f64 = 0.001;
const SUBDUCTION_FRICTION_HEATING: f64 = 10.0; // K per year
const SUBDUCTION_MAGMA_TEMP: f64 = 1200.0;
const SUBDUCTION_MAGMA_PRESSURE: f64 = 1.0e9;
const CONTINENTAL_THICKEN_DENSITY_FACTOR: f64 = 1.0001;
const CONTINENTAL_UPLIFT_PER_YEAR: f64 = 0.01; // m/year
const TRANSFORM_SHEAR_COEFF: f64 = 1.0e9;

enum Classification {
    None,
    Divergent,
    Convergent,
    Transform,
}

fn local_normal(planet: &Planet, a: VoxelAddr, b: VoxelAddr) -> (crate::engine::core::math::Vec3, crate::engine::core::math::Vec3, crate::engine::core::math::Vec3) {
    let shell_a = planet.shell(a.shell);
    let shell_b = planet.shell(b.shell);
    let ll_a = crate::engine::core::coords::voxel_latlon(a, &shell_a.layout);
    let ll_b = crate::engine::core::coords::voxel_latlon(b, &shell_b.layout);
    let pos_a = ll_a.to_cartesian(shell_a.mean_radius());
    let pos_b = ll_b.to_cartesian(shell_b.mean_radius());

    let lat = ll_a.lat_deg.to_radians();
    let lon = ll_a.lon_deg.to_radians();
    let east = crate::engine::core::math::Vec3::new(-lon.sin(), 0.0, lon.cos());
    let north = crate::engine::core::math::Vec3::new(-lat.sin() * lon.cos(), lat.cos(), -lat.sin() * lon.sin());

    let radial = pos_a.normalize();
    let raw = pos_b - pos_a;
    let tangential = raw - radial * raw.dot(&radial);
    let normal = if tangential.magnitude() > 0.0 {
        tangential.normalize()
    } else {
        east
    };
    (normal, north, east)
}

fn classify(v_n: f64, v_t: f64) -> Classification {
    if v_n.abs() < NORMAL_VELOCITY_THRESHOLD && v_t.abs() < NORMAL_VELOCITY_THRESHOLD {
        return Classification::None;
    }
    if v_n.abs() >= v_t.abs() {
        if v_n > 0.0 {
            Classification::Divergent
        } else {
            Classification::Convergent
        }
    } else {
        Classification::Transform
    }
}

fn apply_divergent(planet: &mut Planet, addr: VoxelAddr) {
    let v = planet.voxel_mut(addr);
    v.age = 0.0;
    v.temperature = DIVERGENT_TEMP;
    if matches!(v.material, Material::Water) {
        v.material = Material::Basalt;
        v.density = Material::Basalt.properties().default_density;
    }
    v.v_radial = v.v_radial.max(DIVERGENT_UPWELLING_VR);
}

fn apply_oceanic_subduction(planet: &mut Planet, addr: VoxelAddr, dt_years: f64) {
    let v = planet.voxel_mut(addr);
    v.v_radial = v.v_radial.min(-1.0e-4);
    v.temperature += SUBDUCTION_FRICTION_HEATING * dt_years;
    if v.temperature > SUBDUCTION_MAGMA_TEMP && v.pressure > SUBDUCTION_MAGMA_PRESSURE {
        v.material = Material::Magma;
        v.density = Material::Magma.properties().default_density;
    }
}

fn apply_continental_thicken(planet: &mut Planet, addr: VoxelAddr, dt_years: f64) {
    let v = planet.voxel_mut(addr);
    v.v_radial = v.v_radial.max(0.0);
    v.density *= CONTINENTAL_THICKEN_DENSITY_FACTOR;
    v.stretch_factor = v.stretch_factor.min(0.85);
    v.elevation += CONTINENTAL_UPLIFT_PER_YEAR * dt_years;
}

fn apply_transform(planet: &mut Planet, addr: VoxelAddr, shear: f64, dt_years: f64) {
    let v = planet.voxel_mut(addr);
    v.stress += shear * TRANSFORM_SHEAR_COEFF * dt_years;
    if v.stress > v.yield_strength {
        v.stress = 0.0;
        v.is_fractured = true;
    }
}

/// Classify and apply the boundary process for one cross-boundary pair (spec §4.9).
fn handle_pair(planet: &mut Planet, a: VoxelAddr, b: VoxelAddr, dt_years: f64) {
    let va = *planet.voxel(a);
    let vb = *planet.voxel(b);
    let (normal, north, east) = local_normal(planet, a, b);

    let vel_a = north * va.v_north + east * va.v_east;
    let vel_b = north * vb.v_north + east * vb.v_east;
    let rel = vel_b - vel_a;
    let v_n = rel.dot(&normal);
    let v_t = (rel.magnitude_squared() - v_n * v_n).max(0.0).sqrt();

    match classify(v_n, v_t) {
        Classification::None => {}
        Classification::Divergent => {
            apply_divergent(planet, a);
            apply_divergent(planet, b);
        }
        Classification::Convergent => {
            let a_oceanic = matches!(va.material, Material::Basalt);
            let b_oceanic = matches!(vb.material, Material::Basalt);
            let a_continental = matches!(va.material, Material::Granite);
            let b_continental = matches!(vb.material, Material::Granite);

            if a_continental && b_continental {
                apply_continental_thicken(planet, a, dt_years);
                apply_continental_thicken(planet, b, dt_years);
            } else if (a_oceanic && b_continental) || (a_continental && b_oceanic) {
                let oceanic_addr = if a_oceanic { a } else { b };
                apply_oceanic_subduction(planet, oceanic_addr, dt_years);
            } else if a_oceanic && b_oceanic {
                let subducting = if va.age >= vb.age { a } else { b };
                apply_oceanic_subduction(planet, subducting, dt_years);
            }
        }
        Classification::Transform => {
            apply_transform(planet, a, v_t, dt_years);
            apply_transform(planet, b, v_t, dt_years);
        }
    }
}

/// Walk every boundary voxel pair in the lithosphere shell and apply §4.9 (spec §4.9).
pub fn step(planet: &mut Planet, dt_years: f64) {
    let lith = planet.lithosphere_shell_index();
    let layout = planet.shell(lith).layout.clone();

    let mut pairs = Vec::new();
    for band in 0..layout.lat_bands() {
        for lon in 0..layout.lon_count(band) {
            let addr = VoxelAddr::new(lith, band, lon);
            let v = planet.voxel(addr);
            if !v.is_boundary {
                continue;
            }
            let pid = v.plate_id;
            let flat = layout.flat_index(band, lon);
            for n_addr in planet.neighbors(addr).lateral() {
                if n_addr.shell != lith {
                    continue;
                }
                let n_flat = layout.flat_index(n_addr.band, n_addr.lon);
                if n_flat <= flat {
                    continue;
                }
                if planet.voxel(n_addr).plate_id != pid {
                    pairs.push((addr, n_addr));
                }
            }
        }
    }

    for (a, b) in pairs {
        handle_pair(planet, a, b, dt_years);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::core::voxel::Voxel;

    #[test]
    fn parallel_equal_velocities_yield_no_boundary_event() {
        let mut planet = Planet::new_uninitialized(6.371e6, 6, 12, 24).unwrap();
        let lith = planet.lithosphere_shell_index();
        for v in planet.shell_mut(lith).iter_mut() {
            *v = Voxel::new(Material::Granite, 400.0, 0.0);
            v.v_north = 0.01;
            v.v_east = 0.01;
        }
        planet.shell_mut(lith).voxel_mut(0, 0).plate_id = 1;
        planet.shell_mut(lith).voxel_mut(0, 1).plate_id = 2;
        planet.shell_mut(lith).voxel_mut(0, 0).is_boundary = true;
        let before = *planet.shell(lith).voxel(0, 0);
        step(&mut planet, 1.0);
        let after = planet.shell(lith).voxel(0, 0);
        assert_eq!(before.temperature, after.temperature);
        assert_eq!(before.material, after.material);
    }

    #[test]
    fn separating_plates_spread_a_young_basalt_ridge() {
        let mut planet = Planet::new_uninitialized(6.371e6, 6, 12, 24).unwrap();
        let lith = planet.lithosphere_shell_index();
        for v in planet.shell_mut(lith).iter_mut() {
            *v = Voxel::new(Material::Water, 300.0, 0.0);
            v.age = 5.0e6;
        }
        planet.shell_mut(lith).voxel_mut(0, 0).v_east = -0.01;
        planet.shell_mut(lith).voxel_mut(0, 1).v_east = 0.01;
        planet.shell_mut(lith).voxel_mut(0, 0).plate_id = 1;
        planet.shell_mut(lith).voxel_mut(0, 1).plate_id = 2;
        planet.shell_mut(lith).voxel_mut(0, 0).is_boundary = true;
        planet.shell_mut(lith).voxel_mut(0, 1).is_boundary = true;

        step(&mut planet, 1.0);

        let a = planet.shell(lith).voxel(0, 0);
        assert_eq!(a.material, Material::Basalt);
        assert_eq!(a.age, 0.0);
        assert!(a.v_radial > 0.0);
        let b = planet.shell(lith).voxel(0, 1);
        assert_eq!(b.material, Material::Basalt);
        assert_eq!(b.age, 0.0);
    }
}
