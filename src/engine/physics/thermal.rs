// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Heat diffusion across the six-neighbor stencil, radiogenic heating in deep shells,
// ABOUTME: and the surface air temperature boundary condition

use crate::engine::core::coords::{self, VoxelAddr};
use crate::engine::core::grid::ShellBuffer;
use crate::engine::core::planet::Planet;
use crate::engine::core::voxel::Material;

use super::constants::{TEMPERATURE_MAX, TEMPERATURE_MIN};

const RADIOGENIC_HEATING: f64 = 1.0e-11; // K per second-equivalent, applied in deep shells only

/// Read-only snapshot of every shell's temperature field, used so neighbor reads during a
/// step never see values another voxel already advanced this same step.
fn snapshot_temperatures(planet: &Planet) -> Vec<ShellBuffer<f64>> {
    (0..planet.shell_count())
        .map(|s| {
            let shell = planet.shell(s);
            let mut buf = ShellBuffer::new(&shell.layout, 0.0);
            for (flat, v) in shell.buffer().iter().enumerate() {
                buf.set(flat, v.temperature);
            }
            buf
        })
        .collect()
}

fn temp_at(snapshot: &[ShellBuffer<f64>], planet: &Planet, addr: VoxelAddr) -> f64 {
    let flat = planet.layout_of(addr.shell).unwrap().flat_index(addr.band, addr.lon);
    *snapshot[addr.shell].get(flat)
}

fn interface_distance(planet: &Planet, from: VoxelAddr, to: VoxelAddr) -> f64 {
    if from.shell != to.shell {
        let a = planet.shell(from.shell).mean_radius();
        let b = planet.shell(to.shell).mean_radius();
        return (a - b).abs().max(1.0);
    }
    let shell = planet.shell(from.shell);
    let r_mid = shell.mean_radius();
    if from.band != to.band {
        let dlat = std::f64::consts::PI / shell.layout.lat_bands() as f64;
        return r_mid * dlat;
    }
    let lat = coords::band_latitude_deg(from.band, shell.layout.lat_bands()).to_radians();
    let dlon = std::f64::consts::TAU / shell.layout.lon_count(from.band) as f64;
    (r_mid * dlon * lat.cos().abs()).max(1.0)
}

/// Advance the temperature field by `dt_years` (spec §4.2).
pub fn step(planet: &mut Planet, dt_years: f64) {
    let dt_seconds = dt_years * crate::engine::backend::SECONDS_PER_YEAR;
    let snapshot = snapshot_temperatures(planet);
    let surface_shell = planet.surface_shell_index();

    let addrs: Vec<VoxelAddr> = planet.all_addrs().collect();
    let mut new_temps: Vec<(VoxelAddr, f64)> = Vec::with_capacity(addrs.len());

    for addr in addrs {
        let v = *planet.voxel(addr);
        if addr.shell == surface_shell && v.material.is_air() {
            let shell = planet.shell(addr.shell);
            let lat = coords::band_latitude_deg(addr.band, shell.layout.lat_bands());
            let boundary_temp = 288.0 - 50.0 * lat.abs() / 90.0;
            new_temps.push((addr, boundary_temp));
            continue;
        }

        let neighbors = planet.neighbors(addr);
        let own_k = v.material.properties().thermal_conductivity;
        let own_t = temp_at(&snapshot, planet, addr);

        let mut flux = 0.0;
        for n_addr in neighbors.iter() {
            let n_v = planet.voxel(n_addr);
            let n_t = temp_at(&snapshot, planet, n_addr);
            let k_interface = 0.5 * (own_k + n_v.material.properties().thermal_conductivity);
            let d = interface_distance(planet, addr, n_addr);
            flux += k_interface * (n_t - own_t) / (d * d);
        }

        let radiogenic = if planet.is_deep_shell(addr.shell) {
            RADIOGENIC_HEATING
        } else {
            0.0
        };

        let denom = v.density * v.material.properties().specific_heat;
        let dt_temp = if denom > 0.0 {
            (flux + radiogenic) * dt_seconds / denom
        } else {
            0.0
        };

        let mut new_t = own_t + dt_temp;
        if !new_t.is_finite() {
            new_t = own_t;
        }
        new_temps.push((addr, new_t.clamp(TEMPERATURE_MIN, TEMPERATURE_MAX)));
    }

    for (addr, t) in new_temps {
        planet.voxel_mut(addr).temperature = t;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::core::voxel::Voxel;

    #[test]
    fn surface_air_clamps_to_latitude_boundary_condition() {
        let mut planet = Planet::new_uninitialized(6.371e6, 4, 8, 16).unwrap();
        let surface = planet.surface_shell_index();
        for v in planet.shell_mut(surface).iter_mut() {
            *v = Voxel::new(Material::Air, 500.0, 101_325.0);
        }
        step(&mut planet, 1.0);
        let lat = coords::band_latitude_deg(0, planet.shell(surface).layout.lat_bands());
        let expect = 288.0 - 50.0 * lat.abs() / 90.0;
        let got = planet.shell(surface).voxel(0, 0).temperature;
        assert!((got - expect).abs() < 1e-9);
    }

    #[test]
    fn uniform_cold_planet_stays_uniform() {
        let mut planet = Planet::new_uninitialized(6.371e6, 6, 8, 16).unwrap();
        for s in 0..planet.shell_count() {
            for v in planet.shell_mut(s).iter_mut() {
                *v = Voxel::new(Material::Peridotite, 300.0, 0.0);
            }
        }
        step(&mut planet, 1.0);
        for v in planet.shell(2).iter() {
            assert!((v.temperature - 300.0).abs() < 1e-6);
        }
    }
}
