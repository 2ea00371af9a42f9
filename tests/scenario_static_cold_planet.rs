// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: A uniform, cold, all-solid planet should stay thermally quiet and lithospherically
// ABOUTME: coherent: no convection, negligible temperature drift, and no spurious plate splitting

use tectonika::engine::core::planet::Planet;
use tectonika::engine::physics::plates;
use tectonika::{Material, PlanetConfig, Simulation, Voxel};

#[test]
fn static_cold_peridotite_planet_stays_thermally_and_tectonically_quiet() {
    let config = PlanetConfig {
        radius_m: 6.371e6,
        shell_count: 20,
        lat_bands: 12,
        lon_base: 24,
        seed: Some(11),
        time_scale_years_per_second: 1.0e6,
        ..PlanetConfig::default()
    };

    let mut planet = Planet::new_uninitialized(
        config.radius_m,
        config.shell_count,
        config.lat_bands,
        config.lon_base,
    )
    .unwrap();
    for s in 0..planet.shell_count() {
        for v in planet.shell_mut(s).iter_mut() {
            *v = Voxel::new(Material::Peridotite, 300.0, 0.0);
        }
    }

    let mut sim = Simulation::from_planet(config, planet).unwrap();
    sim.step(1.0).unwrap(); // one real second == 1e6 simulated years

    for s in 0..sim.planet().shell_count() {
        for v in sim.planet().shell(s).iter() {
            assert!(
                (v.temperature - 300.0).abs() < 1.0,
                "temperature drifted past 1 K: {}",
                v.temperature
            );
            assert_eq!(v.v_radial, 0.0, "a uniform-temperature interior should develop no convective velocity");
        }
    }

    let lith = sim.planet().lithosphere_shell_index();
    for v in sim.planet().shell(lith).iter() {
        assert_eq!(v.v_north, 0.0, "no differential motion expected with zero boundary forcing");
        assert_eq!(v.v_east, 0.0, "no differential motion expected with zero boundary forcing");
    }

    let mut diagnostic_planet = sim.planet().clone();
    let registry = plates::identify(&mut diagnostic_planet, sim.planet().elapsed_years);
    assert!(
        registry.plates.len() <= 1,
        "a uniformly brittle, uniformly static lithosphere must not fragment into multiple plates, got {}",
        registry.plates.len()
    );
    if let Some(plate) = registry.plates.first() {
        assert_eq!(plate.angular_velocity, 0.0);
    }
}
