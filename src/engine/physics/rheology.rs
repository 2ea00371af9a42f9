// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Temperature/pressure-dependent yield strength and viscosity, strain accumulation,
// ABOUTME: Maxwell relaxation, brittle fracture and healing

use crate::engine::core::coords::VoxelAddr;
use crate::engine::core::planet::Planet;

use super::constants::{
    ARRHENIUS_ACTIVATION_ENERGY, ARRHENIUS_VISCOSITY_PREFACTOR, GAS_CONSTANT, VISCOSITY_MAX,
    VISCOSITY_MIN,
};

const BRITTLE_DUCTILE_CUTOFF: f64 = 0.4;
const FRACTURE_WEAKENING: f64 = 0.5;
const HEALING_RATE: f64 = 1.01;
const HEALING_CEILING: f64 = 1.0e9;
const POWER_LAW_STRESS_RATIO: f64 = 0.1;

fn yield_strength(temperature: f64, melting_point: f64, pressure: f64) -> f64 {
    let tau = (((temperature - 273.0) / (melting_point - 273.0)).clamp(0.0, 1.0)).max(0.0);
    let base = if tau < BRITTLE_DUCTILE_CUTOFF {
        1.0e9 * (1.0 - tau)
    } else {
        1.0e9 * (-5.0 * tau).exp()
    };
    base * (1.0 + pressure / 1.0e9)
}

/// Arrhenius-law viscosity at a given temperature, with no stress-dependent power-law term.
/// Shared with the convection and plate-force modules so the three never drift apart on the
/// base viscosity law.
pub fn base_viscosity(temperature: f64) -> f64 {
    let mu = ARRHENIUS_VISCOSITY_PREFACTOR
        * (ARRHENIUS_ACTIVATION_ENERGY / (GAS_CONSTANT * temperature.max(1.0))).exp();
    mu.clamp(VISCOSITY_MIN, VISCOSITY_MAX)
}

fn effective_viscosity(temperature: f64, stress: f64, yield_str: f64) -> f64 {
    let mut mu = base_viscosity(temperature);
    if yield_str > 0.0 && stress / yield_str > POWER_LAW_STRESS_RATIO {
        mu *= (stress / yield_str).powf(-1.0 / 3.0);
    }
    mu.clamp(VISCOSITY_MIN, VISCOSITY_MAX)
}

/// Advance rheological state by `dt_years` (spec §4.5).
pub fn step(planet: &mut Planet, dt_years: f64) {
    let dt_seconds = dt_years * crate::engine::backend::SECONDS_PER_YEAR;
    let addrs: Vec<VoxelAddr> = planet.all_addrs().collect();

    for addr in addrs {
        let v = *planet.voxel(addr);
        if v.material.is_fluid() {
            let voxel = planet.voxel_mut(addr);
            voxel.stress = 0.0;
            voxel.is_brittle = false;
            continue;
        }

        let melting_point = v.material.properties().melting_point;
        let y = yield_strength(v.temperature, melting_point, v.pressure);
        let tau = ((v.temperature - 273.0) / (melting_point - 273.0)).clamp(0.0, 1.0);
        let is_brittle = tau < BRITTLE_DUCTILE_CUTOFF;

        let neighbors = planet.neighbors(addr);
        let mut strain = 0.0;
        if let Some(outward) = neighbors.outward {
            let n = planet.voxel(outward);
            let d = (planet.shell(outward.shell).mean_radius() - planet.shell(addr.shell).mean_radius()).abs().max(1.0);
            strain += (n.v_radial - v.v_radial).abs() / d;
        }
        if let Some(east) = neighbors.east {
            let n = planet.voxel(east);
            let shell = planet.shell(addr.shell);
            let lat = crate::engine::core::coords::band_latitude_deg(addr.band, shell.layout.lat_bands()).to_radians();
            let dlon = std::f64::consts::TAU / shell.layout.lon_count(addr.band) as f64;
            let d = (shell.mean_radius() * dlon * lat.cos().abs()).max(1.0);
            strain += (n.v_east - v.v_east).abs() / d;
        }

        let mu = effective_viscosity(v.temperature, v.stress, y);
        let mut new_stress = v.stress + mu * strain * dt_seconds;
        if y > 0.0 {
            new_stress *= (-dt_seconds / (mu / y)).exp();
        }

        let mut new_y = y;
        let mut is_fractured = v.is_fractured;
        if is_brittle && new_stress > new_y {
            new_stress = 0.0;
            is_fractured = true;
            new_y *= FRACTURE_WEAKENING;
        } else if !is_fractured && new_y < HEALING_CEILING {
            new_y *= HEALING_RATE;
        }

        let voxel = planet.voxel_mut(addr);
        voxel.yield_strength = new_y;
        voxel.stress = new_stress;
        voxel.is_brittle = is_brittle;
        voxel.is_fractured = is_fractured;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::core::voxel::{Material, Voxel};

    #[test]
    fn fluids_never_carry_stress() {
        let mut planet = Planet::new_uninitialized(6.371e6, 4, 6, 12).unwrap();
        *planet.shell_mut(3).voxel_mut(0, 0) = Voxel::new(Material::Water, 290.0, 101325.0);
        planet.shell_mut(3).voxel_mut(0, 0).stress = 5.0e8;
        step(&mut planet, 1.0);
        assert_eq!(planet.shell(3).voxel(0, 0).stress, 0.0);
    }

    #[test]
    fn cold_brittle_voxel_gets_high_yield_strength() {
        let temp = 300.0;
        let y = yield_strength(temp, 1800.0, 0.0);
        assert!(y > 8.0e8);
    }
}
