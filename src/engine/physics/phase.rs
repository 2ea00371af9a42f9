// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Single-voxel melting and solidification transitions, no mass redistribution

use crate::engine::core::planet::Planet;
use crate::engine::core::voxel::Material;

const SOLIDUS: f64 = 1200.0;
const MELT_BAND: f64 = 200.0;
const MELT_FRACTION_THRESHOLD: f64 = 0.5;

/// Apply melting and solidification (spec §4.4).
pub fn step(planet: &mut Planet) {
    for s in 0..planet.shell_count() {
        for v in planet.shell_mut(s).iter_mut() {
            if v.material.is_fluid() && !matches!(v.material, Material::Magma) {
                continue;
            }
            match v.material {
                Material::Magma => {
                    if v.temperature < SOLIDUS {
                        v.material = Material::Basalt;
                        v.density = Material::Basalt.properties().default_density;
                        v.age = 0.0;
                    }
                }
                other => {
                    let melting_point = other.properties().melting_point;
                    if v.temperature > melting_point
                        && (v.temperature - melting_point) / MELT_BAND > MELT_FRACTION_THRESHOLD
                    {
                        v.material = Material::Magma;
                        v.density = Material::Magma.properties().default_density;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::core::voxel::Voxel;

    #[test]
    fn overheated_solid_melts_to_magma() {
        let mut planet = Planet::new_uninitialized(6.371e6, 4, 6, 12).unwrap();
        *planet.shell_mut(1).voxel_mut(0, 0) = Voxel::new(Material::Basalt, 2000.0, 0.0);
        step(&mut planet);
        assert_eq!(planet.shell(1).voxel(0, 0).material, Material::Magma);
    }

    #[test]
    fn cold_magma_solidifies_to_basalt() {
        let mut planet = Planet::new_uninitialized(6.371e6, 4, 6, 12).unwrap();
        *planet.shell_mut(1).voxel_mut(0, 0) = Voxel::new(Material::Magma, 900.0, 0.0);
        step(&mut planet);
        let v = planet.shell(1).voxel(0, 0);
        assert_eq!(v.material, Material::Basalt);
        assert_eq!(v.age, 0.0);
    }
}
