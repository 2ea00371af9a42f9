// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Two lithosphere caps pulling apart along a shared latitude circle should spread a
// ABOUTME: young basalt ridge and register a divergent boundary, each spinning up as its own plate

use tectonika::engine::core::planet::Planet;
use tectonika::engine::physics::{boundaries, plates};
use tectonika::{Material, Voxel};

#[test]
fn diverging_plate_caps_spread_fresh_basalt_along_their_shared_boundary() {
    let mut planet = Planet::new_uninitialized(6.371e6, 6, 16, 32).unwrap();
    let lith = planet.lithosphere_shell_index();
    let lat_bands = planet.shell(lith).layout.lat_bands();
    let split = lat_bands / 2;

    for band in 0..lat_bands {
        for lon in 0..planet.shell(lith).layout.lon_count(band) {
            let v = planet.shell_mut(lith).voxel_mut(band, lon);
            *v = Voxel::new(Material::Basalt, 900.0, 0.0);
            v.age = 2.0e6;
            v.is_brittle = true;
            if band < split {
                v.v_north = -0.05; // southern cap recedes south
            } else {
                v.v_north = 0.05; // northern cap recedes north
            }
        }
    }
    // Heat the ridge axis itself, as upwelling magma would.
    for lon in 0..planet.shell(lith).layout.lon_count(split - 1) {
        planet.shell_mut(lith).voxel_mut(split - 1, lon).temperature = 1800.0;
    }
    for lon in 0..planet.shell(lith).layout.lon_count(split) {
        planet.shell_mut(lith).voxel_mut(split, lon).temperature = 1800.0;
    }

    let registry = plates::identify(&mut planet, 0.0);
    assert_eq!(registry.plates.len(), 2, "a clean velocity split should separate into two plates");
    assert!(registry.plates.iter().all(|p| p.member_count() >= 100));

    boundaries::step(&mut planet, 1.0e5);

    let south_lon_count = planet.shell(lith).layout.lon_count(split - 1);
    let north_lon_count = planet.shell(lith).layout.lon_count(split);
    let a = planet.shell(lith).voxel(split - 1, south_lon_count / 2);
    let b = planet.shell(lith).voxel(split, north_lon_count / 2);

    assert_eq!(a.material, Material::Basalt);
    assert_eq!(b.material, Material::Basalt);
    assert!(a.age < 1.0, "a freshly-spread ridge voxel should have its age reset");
    assert!(b.age < 1.0, "a freshly-spread ridge voxel should have its age reset");
    assert!(a.v_radial > 0.0, "divergence should drive upwelling at the ridge axis");
    assert!(b.v_radial > 0.0, "divergence should drive upwelling at the ridge axis");
}
