// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Two granite masses converging at a plate boundary should thicken rather than
// ABOUTME: subduct: stress-driven stretch-factor clamp, boundary uplift, no basalt or negative vR

use tectonika::engine::core::planet::Planet;
use tectonika::engine::physics::{boundaries, plates};
use tectonika::{Material, Voxel};

#[test]
fn converging_continental_masses_thicken_instead_of_subducting() {
    let mut planet = Planet::new_uninitialized(6.371e6, 6, 16, 32).unwrap();
    let lith = planet.lithosphere_shell_index();
    let lat_bands = planet.shell(lith).layout.lat_bands();
    let split = lat_bands / 2;

    for band in 0..lat_bands {
        for lon in 0..planet.shell(lith).layout.lon_count(band) {
            let v = planet.shell_mut(lith).voxel_mut(band, lon);
            *v = Voxel::new(Material::Granite, 400.0, 0.0);
            v.age = 5.0e8;
            v.is_brittle = true;
            // 5 cm/yr closing rate (spec.md §8 S3), both caps marching toward the shared
            // boundary at the equator-ward edge of their half.
            if band < split {
                v.v_north = 0.05;
            } else {
                v.v_north = -0.05;
            }
        }
    }

    let registry = plates::identify(&mut planet, 0.0);
    assert_eq!(registry.plates.len(), 2, "two opposing caps should split into two plates");
    assert!(registry.plates.iter().all(|p| p.member_count() >= 100));

    let dt_years = 2.0e7;
    boundaries::step(&mut planet, dt_years);

    let south_lon_count = planet.shell(lith).layout.lon_count(split - 1);
    let north_lon_count = planet.shell(lith).layout.lon_count(split);

    let mut thickened_contacts = 0usize;
    let mut total_contacts = 0usize;
    let mut elevation_rise_m = 0.0;

    for lon in 0..south_lon_count {
        let v = planet.shell(lith).voxel(split - 1, lon);
        total_contacts += 1;
        if v.stretch_factor <= 0.85 + 1.0e-9 {
            thickened_contacts += 1;
        }
        elevation_rise_m += v.elevation;
        assert_ne!(v.material, Material::Basalt, "continental crust must not convert to oceanic basalt");
        assert!(v.v_radial > -1.0e-4, "no subduction-scale downwelling expected in a continental collision");
    }
    for lon in 0..north_lon_count {
        let v = planet.shell(lith).voxel(split, lon);
        assert_ne!(v.material, Material::Basalt);
        assert!(v.v_radial > -1.0e-4);
    }

    let thickened_fraction = thickened_contacts as f64 / total_contacts as f64;
    assert!(
        thickened_fraction >= 0.30,
        "expected >=30% of contact voxels to show stretch_factor <= 0.85, got {thickened_fraction}"
    );

    let avg_elevation_rise = elevation_rise_m / total_contacts as f64;
    assert!(
        avg_elevation_rise >= 2000.0,
        "expected average contact elevation to rise by at least 2 km, got {avg_elevation_rise} m"
    );
}
