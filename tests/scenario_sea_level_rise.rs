// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Uplifting a submerged slice of continental crust must raise sea level to keep the
// ABOUTME: conserved water volume matched, without ever touching that conserved volume itself

use tectonika::engine::core::coords::VoxelAddr;
use tectonika::engine::core::planet::Planet;
use tectonika::engine::physics::water;
use tectonika::{Material, Voxel};

#[test]
fn uplifting_submerged_land_raises_sea_level_without_changing_water_volume() {
    let mut planet = Planet::new_uninitialized(6.371e6, 4, 10, 20).unwrap();
    let surface = planet.surface_shell_index();
    let layout = planet.shell(surface).layout.clone();

    let mut i = 0usize;
    for band in 0..layout.lat_bands() {
        for lon in 0..layout.lon_count(band) {
            let v = planet.shell_mut(surface).voxel_mut(band, lon);
            if i % 2 == 0 {
                *v = Voxel::new(Material::Water, 290.0, 101_325.0);
                v.elevation = -1000.0;
            } else {
                *v = Voxel::new(Material::Granite, 285.0, 90_000.0);
                // A gradient spanning well below and well above likely sea levels, so the
                // bisection search has land to trade against as the target volume moves.
                v.elevation = -400.0 + ((i % 40) as f64) * 20.0;
            }
            i += 1;
        }
    }

    // Pick a conserved volume that corresponds to a sea level cutting through the middle of
    // the land gradient, so there is submerged land to uplift and dry land left over above it.
    let target_sea_level = -50.0;
    let mut target_volume = 0.0;
    for band in 0..layout.lat_bands() {
        let vol = planet.shell(surface).voxel_volume(band);
        for lon in 0..layout.lon_count(band) {
            let v = planet.shell(surface).voxel(band, lon);
            match v.material {
                Material::Water => target_volume += vol,
                Material::Granite if v.elevation < target_sea_level => target_volume += vol,
                _ => {}
            }
        }
    }
    planet.water_volume_m3 = target_volume;
    water::step(&mut planet);
    let baseline_sea_level = planet.sea_level_m;
    let baseline_water_volume = planet.water_volume_m3;

    // Uplift every currently-submerged granite column by 500 m (spec.md §8 S4), leaving the
    // conserved water_volume_m3 field untouched.
    let mut raised = 0usize;
    for band in 0..layout.lat_bands() {
        for lon in 0..layout.lon_count(band) {
            let addr = VoxelAddr::new(surface, band, lon);
            let v = planet.voxel(addr);
            if matches!(v.material, Material::Granite) && v.elevation < baseline_sea_level {
                planet.voxel_mut(addr).elevation += 500.0;
                raised += 1;
            }
        }
    }
    assert!(raised > 0, "test setup should have produced at least one submerged land voxel");

    water::step(&mut planet);
    let new_sea_level = planet.sea_level_m;

    assert_eq!(
        planet.water_volume_m3, baseline_water_volume,
        "uplift must never mutate the conserved water_volume_m3 invariant directly"
    );
    assert!(
        new_sea_level > baseline_sea_level,
        "removing submerged land from the water-equivalent total should force sea level up to \
         re-match the conserved volume: {new_sea_level} <= {baseline_sea_level}"
    );
}
