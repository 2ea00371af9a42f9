// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Cross-cutting invariants from spec.md §8 that must hold regardless of scenario:
// ABOUTME: sub-offset range, water conservation, fluid stress, pressure monotonicity, round-trips

use tectonika::engine::core::planet::Planet;
use tectonika::engine::physics::{pressure, thermal};
use tectonika::{Material, PlanetConfig, Simulation, Voxel};

fn graded_planet(shells: usize, lat_bands: usize, lon_base: usize) -> Planet {
    let mut planet = Planet::new_uninitialized(6.371e6, shells, lat_bands, lon_base).unwrap();
    let surface = planet.surface_shell_index();
    for s in 0..surface {
        let frac = s as f64 / surface as f64;
        let temperature = 300.0 + (1800.0 - 300.0) * (1.0 - frac);
        for v in planet.shell_mut(s).iter_mut() {
            *v = Voxel::new(Material::Peridotite, temperature, 0.0);
        }
    }
    for v in planet.shell_mut(surface).iter_mut() {
        *v = Voxel::new(Material::Air, 280.0, 101_325.0);
    }
    planet
}

#[test]
fn zero_dt_step_is_a_no_op() {
    let config = PlanetConfig {
        shell_count: 6,
        lat_bands: 8,
        lon_base: 16,
        seed: Some(1),
        ..PlanetConfig::default()
    };
    let mut sim = Simulation::new(config).unwrap();
    let before_elapsed = sim.planet().elapsed_years;
    let before_water = sim.planet().water_volume_m3;
    let before_mesh_dirty = sim.planet().mesh_dirty;

    sim.step(0.0).unwrap();

    assert_eq!(sim.planet().elapsed_years, before_elapsed);
    assert_eq!(sim.planet().water_volume_m3, before_water);
    assert_eq!(sim.planet().mesh_dirty, before_mesh_dirty);
}

#[test]
fn sub_offsets_stay_in_range_after_many_steps() {
    let config = PlanetConfig {
        shell_count: 6,
        lat_bands: 8,
        lon_base: 16,
        seed: Some(2),
        time_scale_years_per_second: 5.0e4,
        ..PlanetConfig::default()
    };
    let mut sim = Simulation::new(config).unwrap();
    for _ in 0..8 {
        sim.step(1.0).unwrap();
    }
    sim.planet().check_sub_offsets().expect("invariant 1 violated");
}

#[test]
fn water_volume_is_conserved_across_many_steps() {
    let config = PlanetConfig {
        shell_count: 6,
        lat_bands: 10,
        lon_base: 20,
        seed: Some(3),
        time_scale_years_per_second: 1.0e5,
        ..PlanetConfig::default()
    };
    let mut sim = Simulation::new(config).unwrap();
    let initial = sim.planet().water_volume_m3;
    assert!(initial > 0.0, "expected an ocean to seed a positive water volume");

    for _ in 0..12 {
        sim.step(1.0).unwrap();
    }

    let rel_err = (sim.planet().water_volume_m3 - initial).abs() / initial;
    assert!(rel_err < 1.0e-9, "water volume drifted by {rel_err}, expected an untouched conserved field");
}

#[test]
fn fluid_voxels_never_carry_stress_after_stepping() {
    let config = PlanetConfig {
        shell_count: 6,
        lat_bands: 8,
        lon_base: 16,
        seed: Some(4),
        ..PlanetConfig::default()
    };
    let mut sim = Simulation::new(config).unwrap();
    for _ in 0..5 {
        sim.step(1.0).unwrap();
    }
    sim.planet().check_fluid_stress_clear().expect("invariant 6 violated");
}

#[test]
fn pressure_is_monotonic_inward_in_a_stable_column() {
    let mut planet = graded_planet(10, 8, 16);
    // Flatten to a stable, convection-free column: uniform temperature, no velocity.
    for s in 0..planet.shell_count() {
        for v in planet.shell_mut(s).iter_mut() {
            v.temperature = 1200.0;
            v.v_radial = 0.0;
        }
    }
    let surface = planet.surface_shell_index();
    for v in planet.shell_mut(surface).iter_mut() {
        v.material = Material::Air;
    }

    pressure::step(&mut planet);

    let mut prev = planet.shell(surface).voxel(0, 0).pressure;
    for s in (0..surface).rev() {
        let p = planet.shell(s).voxel(0, 0).pressure;
        assert!(p >= prev, "pressure decreased going inward at shell {s}: {p} < {prev}");
        prev = p;
    }
}

#[test]
fn closed_mantle_column_cools_monotonically_toward_a_cold_surface() {
    // Invariant 3 (spec.md §8): no radiogenic heat, fixed cold surface, thermal energy only
    // ever decreases. Keep the hot gradient entirely out of the deep quarter (where
    // radiogenic heating would otherwise apply) so this is a genuinely closed system.
    let mut planet = Planet::new_uninitialized(6.371e6, 12, 8, 16).unwrap();
    let surface = planet.surface_shell_index();
    assert!(
        !planet.is_deep_shell(3),
        "test setup assumes shell 3 is outside the radiogenic deep quarter"
    );
    for s in 3..surface {
        let frac = (s - 3) as f64 / (surface - 3) as f64;
        let temperature = 2000.0 - 1000.0 * frac;
        for v in planet.shell_mut(s).iter_mut() {
            *v = Voxel::new(Material::Peridotite, temperature, 0.0);
        }
    }
    for v in planet.shell_mut(surface).iter_mut() {
        *v = Voxel::new(Material::Air, 260.0, 101_325.0);
    }

    let energy = |p: &Planet| -> f64 {
        let mut total = 0.0;
        for s in 0..p.surface_shell_index() {
            let shell = p.shell(s);
            for band in 0..shell.layout.lat_bands() {
                let vol = shell.voxel_volume(band);
                for lon in 0..shell.layout.lon_count(band) {
                    let v = shell.voxel(band, lon);
                    total += v.density * v.material.properties().specific_heat * v.temperature * vol;
                }
            }
        }
        total
    };

    let mut previous = energy(&planet);
    for _ in 0..6 {
        thermal::step(&mut planet, 1.0);
        let current = energy(&planet);
        assert!(
            current <= previous * (1.0 + 1.0e-12),
            "interior thermal energy increased: {current} > {previous}"
        );
        previous = current;
    }
}

#[test]
fn snapshot_round_trip_preserves_non_timestamp_state() {
    let config = PlanetConfig {
        shell_count: 5,
        lat_bands: 6,
        lon_base: 12,
        seed: Some(5),
        ..PlanetConfig::default()
    };
    let mut sim = Simulation::new(config).unwrap();
    sim.step(1.0).unwrap();

    let snapshot = sim.planet().to_snapshot();
    let restored = Planet::from_snapshot(&snapshot).unwrap();

    assert_eq!(restored.radius, sim.planet().radius);
    assert_eq!(restored.elapsed_years, sim.planet().elapsed_years);
    assert_eq!(restored.water_volume_m3, sim.planet().water_volume_m3);
    assert_eq!(restored.sea_level_m, sim.planet().sea_level_m);
    assert_eq!(restored.hotspots.len(), sim.planet().hotspots.len());
    assert_eq!(restored.shell_count(), sim.planet().shell_count());

    for s in 0..restored.shell_count() {
        let original_shell = sim.planet().shell(s);
        let restored_shell = restored.shell(s);
        assert_eq!(restored_shell.r_in, original_shell.r_in);
        assert_eq!(restored_shell.r_out, original_shell.r_out);
        for (a, b) in restored_shell.iter().zip(original_shell.iter()) {
            assert_eq!(a.material, b.material);
            assert_eq!(a.temperature, b.temperature);
            assert_eq!(a.plate_id, b.plate_id);
        }
    }
}
