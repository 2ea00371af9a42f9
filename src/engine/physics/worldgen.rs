// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Initial-condition generation: material layering, seeded continent placement,
// ABOUTME: hotspot seeding, and the starting water-volume invariant (spec.md §3, §6 "Environment")

use rand::rngs::StdRng;
use rand::Rng;

use crate::engine::core::config::PlanetConfig;
use crate::engine::core::planet::{Hotspot, Planet};
use crate::engine::core::voxel::{Material, Voxel};

use super::water;

const CORE_TEMPERATURE_K: f64 = 5000.0;
const SURFACE_MANTLE_TEMPERATURE_K: f64 = 1600.0;
const CONTINENT_ELEVATION_M: f64 = 840.0;
const OCEAN_FLOOR_ELEVATION_M: f64 = -4000.0;
const OCEAN_DEPTH_M: f64 = 4000.0;
const MIN_HOTSPOTS: usize = 3;
const MAX_HOTSPOTS: usize = 7;
const HOTSPOT_SHELLS_FROM_CORE: usize = 3;

/// One candidate continent center used to seed the lithosphere's granite/basalt split.
struct ContinentSeed {
    lat_deg: f64,
    lon_deg: f64,
}

fn angular_distance_deg(a_lat: f64, a_lon: f64, b_lat: f64, b_lon: f64) -> f64 {
    let lat1 = a_lat.to_radians();
    let lat2 = b_lat.to_radians();
    let dlon = (b_lon - a_lon).to_radians();
    let cos_d = (lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * dlon.cos()).clamp(-1.0, 1.0);
    cos_d.acos().to_degrees()
}

/// Build a fresh planet and fill it with a plausible starting state: a hot peridotite
/// mantle, a granite/basalt lithosphere seeded by `config.seed`, an ocean covering
/// `config.initial_ocean_fraction` of the surface, and a handful of core-mantle-boundary
/// hotspots (spec.md §3 "Entity lifecycles": hotspots are "created at planet init ... and
/// persist").
pub fn generate(config: &PlanetConfig, rng: &mut StdRng) -> crate::engine::core::error::PlanetResult<Planet> {
    let mut planet = Planet::new_uninitialized(
        config.radius_m,
        config.shell_count,
        config.lat_bands,
        config.lon_base,
    )?;

    seed_mantle(&mut planet);
    let continents = seed_continents(config.initial_ocean_fraction, rng);
    seed_lithosphere(&mut planet, &continents);
    seed_surface(&mut planet, &continents);
    seed_hotspots(&mut planet, rng);

    planet.water_volume_m3 = planet.total_water_voxel_volume();
    water::recompute_sea_level(&mut planet);
    planet.mesh_dirty = true;

    Ok(planet)
}

/// Fill every shell below the lithosphere with peridotite on a linear core-to-surface
/// temperature gradient (spec.md §4.2 operates on this as its starting condition).
fn seed_mantle(planet: &mut Planet) {
    let lith = planet.lithosphere_shell_index();
    let deepest = lith.max(1);
    for s in 0..lith {
        let frac = s as f64 / deepest as f64;
        let temperature = CORE_TEMPERATURE_K + (SURFACE_MANTLE_TEMPERATURE_K - CORE_TEMPERATURE_K) * frac;
        for v in planet.shell_mut(s).iter_mut() {
            *v = Voxel::new(Material::Peridotite, temperature, 0.0);
        }
    }
}

/// Scatter continent seed points so that, summed over their zones of influence, roughly
/// `1 - ocean_fraction` of the lithosphere ends up continental.
fn seed_continents(ocean_fraction: f64, rng: &mut StdRng) -> Vec<ContinentSeed> {
    let land_fraction = (1.0 - ocean_fraction).clamp(0.0, 1.0);
    let continent_count = (2 + (land_fraction * 6.0).round() as usize).max(1);
    (0..continent_count)
        .map(|_| ContinentSeed {
            lat_deg: rng.gen_range(-80.0..80.0),
            lon_deg: rng.gen_range(-180.0..180.0),
        })
        .collect()
}

fn nearest_continent_distance(continents: &[ContinentSeed], lat: f64, lon: f64) -> f64 {
    continents
        .iter()
        .map(|c| angular_distance_deg(lat, lon, c.lat_deg, c.lon_deg))
        .fold(f64::INFINITY, f64::min)
}

const CONTINENT_RADIUS_DEG: f64 = 35.0;

/// Fill the lithosphere shell: granite within `CONTINENT_RADIUS_DEG` of a continent seed,
/// basalt (oceanic crust) elsewhere, with an elevation matching each (spec.md §3, §4.7
/// "continental if granite>>2*basalt").
fn seed_lithosphere(planet: &mut Planet, continents: &[ContinentSeed]) {
    let lith = planet.lithosphere_shell_index();
    let layout = planet.shell(lith).layout.clone();
    for band in 0..layout.lat_bands() {
        let lat = crate::engine::core::coords::band_latitude_deg(band, layout.lat_bands());
        for lon in 0..layout.lon_count(band) {
            let lon_deg = crate::engine::core::coords::lon_longitude_deg(lon, layout.lon_count(band));
            let d = nearest_continent_distance(continents, lat, lon_deg);
            let voxel = planet.shell_mut(lith).voxel_mut(band, lon);
            if d < CONTINENT_RADIUS_DEG {
                *voxel = Voxel::new(Material::Granite, 400.0, 0.0);
                voxel.elevation = CONTINENT_ELEVATION_M;
                voxel.age = 5.0e8;
            } else {
                *voxel = Voxel::new(Material::Basalt, 600.0, 0.0);
                voxel.elevation = OCEAN_FLOOR_ELEVATION_M;
                voxel.age = 1.0e7;
            }
        }
    }
}

/// Fill the outermost (atmosphere-over-ocean) shell: water above oceanic lithosphere, air
/// above continental lithosphere (spec.md §3 "Shell"; the surface shell's Air voxels carry
/// the §4.2 boundary condition).
fn seed_surface(planet: &mut Planet, continents: &[ContinentSeed]) {
    let surface = planet.surface_shell_index();
    let layout = planet.shell(surface).layout.clone();
    for band in 0..layout.lat_bands() {
        let lat = crate::engine::core::coords::band_latitude_deg(band, layout.lat_bands());
        let boundary_temp = 288.0 - 50.0 * lat.abs() / 90.0;
        for lon in 0..layout.lon_count(band) {
            let lon_deg = crate::engine::core::coords::lon_longitude_deg(lon, layout.lon_count(band));
            let d = nearest_continent_distance(continents, lat, lon_deg);
            let is_land = d < CONTINENT_RADIUS_DEG;
            let voxel = planet.shell_mut(surface).voxel_mut(band, lon);
            if is_land {
                *voxel = Voxel::new(Material::Air, boundary_temp, super::constants::SURFACE_AIR_PRESSURE);
                voxel.elevation = CONTINENT_ELEVATION_M;
            } else {
                *voxel = Voxel::new(Material::Water, 290.0, super::constants::SURFACE_AIR_PRESSURE);
                voxel.elevation = OCEAN_FLOOR_ELEVATION_M + OCEAN_DEPTH_M;
            }
        }
    }
}

/// Place 3-7 mantle plumes at the core-mantle boundary at seeded lat/lon (spec.md §3
/// "Entity lifecycles": hotspots persist, age, never move laterally).
fn seed_hotspots(planet: &mut Planet, rng: &mut StdRng) {
    let count = rng.gen_range(MIN_HOTSPOTS..=MAX_HOTSPOTS);
    let hotspots: Vec<Hotspot> = (0..count)
        .map(|_| Hotspot {
            lat_deg: rng.gen_range(-90.0..90.0),
            lon_deg: rng.gen_range(-180.0..180.0),
            age_years: 0.0,
        })
        .collect();

    let shells_from_core = HOTSPOT_SHELLS_FROM_CORE.min(planet.shell_count());
    for hotspot in &hotspots {
        for s in 0..shells_from_core {
            let layout = planet.shell(s).layout.clone();
            for band in 0..layout.lat_bands() {
                let lat = crate::engine::core::coords::band_latitude_deg(band, layout.lat_bands());
                for lon in 0..layout.lon_count(band) {
                    let lon_deg = crate::engine::core::coords::lon_longitude_deg(lon, layout.lon_count(band));
                    let d = angular_distance_deg(lat, lon_deg, hotspot.lat_deg, hotspot.lon_deg);
                    if d < 15.0 {
                        let gaussian = (-0.5 * (d / 6.0).powi(2)).exp();
                        let voxel = planet.shell_mut(s).voxel_mut(band, lon);
                        voxel.temperature += (CORE_TEMPERATURE_K * 0.3) * gaussian;
                    }
                }
            }
        }
    }
    planet.hotspots = hotspots;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn generated_planet_has_hotspots_in_range() {
        let config = PlanetConfig {
            shell_count: 6,
            lat_bands: 8,
            lon_base: 16,
            ..PlanetConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(42);
        let planet = generate(&config, &mut rng).unwrap();
        assert!(planet.hotspots.len() >= MIN_HOTSPOTS);
        assert!(planet.hotspots.len() <= MAX_HOTSPOTS);
    }

    #[test]
    fn generated_planet_has_both_land_and_ocean() {
        let config = PlanetConfig {
            shell_count: 6,
            lat_bands: 16,
            lon_base: 32,
            initial_ocean_fraction: 0.6,
            ..PlanetConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let planet = generate(&config, &mut rng).unwrap();
        let surface = planet.surface_shell_index();
        let water = planet.shell(surface).iter().filter(|v| v.material == Material::Water).count();
        let air = planet.shell(surface).iter().filter(|v| v.material == Material::Air).count();
        assert!(water > 0, "expected some ocean coverage");
        assert!(air > 0, "expected some land coverage");
    }

    #[test]
    fn same_seed_generates_identical_planets() {
        let config = PlanetConfig {
            shell_count: 6,
            lat_bands: 8,
            lon_base: 16,
            ..PlanetConfig::default()
        };
        let mut rng_a = StdRng::seed_from_u64(123);
        let mut rng_b = StdRng::seed_from_u64(123);
        let a = generate(&config, &mut rng_a).unwrap();
        let b = generate(&config, &mut rng_b).unwrap();
        assert_eq!(a.hotspots.len(), b.hotspots.len());
        for (ha, hb) in a.hotspots.iter().zip(b.hotspots.iter()) {
            assert_eq!(ha.lat_deg, hb.lat_deg);
            assert_eq!(ha.lon_deg, hb.lon_deg);
        }
    }
}
