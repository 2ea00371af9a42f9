// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Buoyancy-driven radial velocity, mantle plume pinning, and slab-pull seeding.
// ABOUTME: Horizontal velocities are owned by the plate system; convection only ever touches vR.

use crate::engine::core::coords::VoxelAddr;
use crate::engine::core::planet::Planet;
use crate::engine::core::voxel::Material;

use super::constants::{
    GRAVITY, RAYLEIGH_CONVECTION_THRESHOLD, THERMAL_DIFFUSIVITY, THERMAL_EXPANSION,
};
use super::rheology::base_viscosity;

const RADIAL_DECAY: f64 = 0.95;
const PLUME_TEMPERATURE: f64 = 5500.0;
const PLUME_MIN_RADIAL_SPEED: f64 = 0.001;
const SLAB_PULL_DENSITY_CONTRAST: f64 = 0.05;
const SLAB_PULL_COLD_TEMP: f64 = 800.0;

fn is_shallow_quarter(planet: &Planet, shell: usize) -> bool {
    shell >= planet.shell_count() - (planet.shell_count() + 3) / 4
}

/// Advance radial convective velocity by `dt_years` (spec §4.6).
pub fn step(planet: &mut Planet, dt_years: f64) {
    let dt_seconds = dt_years * crate::engine::backend::SECONDS_PER_YEAR;
    let addrs: Vec<VoxelAddr> = planet.all_addrs().collect();

    for addr in &addrs {
        let addr = *addr;
        let v = *planet.voxel(addr);
        if matches!(v.material, Material::Air | Material::Water) {
            continue;
        }

        let neighbors = planet.neighbors(addr);
        let Some(outward) = neighbors.outward else {
            continue;
        };
        let outer = *planet.voxel(outward);

        let delta_t_rad = v.temperature - outer.temperature;
        let mut delta_rho = v.density * THERMAL_EXPANSION * delta_t_rad;

        if matches!(v.material, Material::Granite) {
            let oceanic_ref = Material::Basalt.properties().default_density;
            delta_rho += (oceanic_ref - v.density) * GRAVITY / 100.0;
        }

        let shell = planet.shell(addr.shell);
        let length_scale = shell.thickness() / 10.0;
        let mu = base_viscosity(v.temperature);
        let force = delta_rho * GRAVITY;
        let stokes_v = force * length_scale * length_scale / (6.0 * std::f64::consts::PI * mu);
        let rayleigh = (delta_rho * GRAVITY * length_scale.powi(3) / (THERMAL_DIFFUSIVITY * mu)).abs();

        let mut new_vr = if rayleigh > RAYLEIGH_CONVECTION_THRESHOLD {
            stokes_v * dt_seconds
        } else {
            v.v_radial * RADIAL_DECAY
        };

        // spec.md §9 resolves the source's conflicting convection variants in favor of the
        // one that never touches horizontal velocity; plume and slab-pull both modulate vR
        // only, not vN/vE (plate motion owns those, §4.8).
        if v.temperature > PLUME_TEMPERATURE {
            new_vr = new_vr.max(PLUME_MIN_RADIAL_SPEED * dt_seconds);
        }

        if matches!(v.material, Material::Basalt)
            && v.temperature < SLAB_PULL_COLD_TEMP
            && is_shallow_quarter(planet, addr.shell)
        {
            if let Some(inward) = neighbors.inward {
                let below = planet.voxel(inward);
                if below.density > 0.0 && v.density >= below.density * (1.0 + SLAB_PULL_DENSITY_CONTRAST) {
                    let contrast = (v.density - below.density) / below.density;
                    new_vr -= contrast * dt_seconds;
                }
            }
        }

        planet.voxel_mut(addr).v_radial = new_vr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::core::voxel::Voxel;

    #[test]
    fn hot_interior_over_cool_exterior_develops_upward_velocity() {
        let mut planet = Planet::new_uninitialized(6.371e6, 10, 8, 16).unwrap();
        for s in 0..planet.shell_count() {
            for v in planet.shell_mut(s).iter_mut() {
                *v = Voxel::new(Material::Peridotite, 1500.0, 0.0);
            }
        }
        for v in planet.shell_mut(3).iter_mut() {
            v.temperature = 3500.0;
        }
        step(&mut planet, 1.0e4);
        let v = planet.shell(3).voxel(0, 0);
        assert!(v.v_radial.abs() > 0.0);
    }

    #[test]
    fn air_and_water_are_untouched() {
        let mut planet = Planet::new_uninitialized(6.371e6, 6, 8, 16).unwrap();
        let surface = planet.surface_shell_index();
        *planet.shell_mut(surface).voxel_mut(0, 0) = Voxel::new(Material::Air, 290.0, 101325.0);
        step(&mut planet, 1.0);
        assert_eq!(planet.shell(surface).voxel(0, 0).v_radial, 0.0);
    }
}
