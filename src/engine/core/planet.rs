// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Planet and Shell data model: the process-wide simulation state and its immutable radii schedule
// ABOUTME: The planet exclusively owns all shells and voxels (spec.md §3 "Ownership")

use super::coords::{self, Neighbors, VoxelAddr};
use super::error::{PlanetError, PlanetResult};
use super::grid::{ShellBuffer, ShellLayout};
use super::math::constants;
use super::voxel::{Material, Voxel};

/// A mantle plume: created at planet init, persists for the planet's lifetime, ages but
/// never moves laterally (spec.md §3 "Entity lifecycles").
#[derive(Debug, Clone, Copy)]
pub struct Hotspot {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub age_years: f64,
}

/// A spherical annulus between two immutable radii (spec.md §3).
#[derive(Clone)]
pub struct Shell {
    pub r_in: f64,
    pub r_out: f64,
    pub layout: ShellLayout,
    voxels: ShellBuffer<Voxel>,
}

impl Shell {
    pub fn new(r_in: f64, r_out: f64, layout: ShellLayout, fill: Voxel) -> Self {
        assert!(r_out > r_in, "shell radii must be strictly increasing");
        let voxels = ShellBuffer::new(&layout, fill);
        Self {
            r_in,
            r_out,
            layout,
            voxels,
        }
    }

    #[inline]
    pub fn thickness(&self) -> f64 {
        self.r_out - self.r_in
    }

    #[inline]
    pub fn mean_radius(&self) -> f64 {
        0.5 * (self.r_in + self.r_out)
    }

    #[inline]
    pub fn voxel(&self, band: usize, lon: usize) -> &Voxel {
        self.voxels.get(self.layout.flat_index(band, lon))
    }

    #[inline]
    pub fn voxel_mut(&mut self, band: usize, lon: usize) -> &mut Voxel {
        let flat = self.layout.flat_index(band, lon);
        self.voxels.get_mut(flat)
    }

    #[inline]
    pub fn voxel_at(&self, addr: VoxelAddr) -> &Voxel {
        self.voxel(addr.band, addr.lon)
    }

    #[inline]
    pub fn voxel_at_mut(&mut self, addr: VoxelAddr) -> &mut Voxel {
        self.voxel_mut(addr.band, addr.lon)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Voxel> + '_ {
        self.voxels.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Voxel> + '_ {
        self.voxels.iter_mut()
    }

    pub(crate) fn buffer(&self) -> &ShellBuffer<Voxel> {
        &self.voxels
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut ShellBuffer<Voxel> {
        &mut self.voxels
    }

    /// Solid-angle-weighted voxel volume at a given latitude band (m^3), used for the
    /// water-volume and mass integrals (spec.md §3 invariant 4, §4.12).
    pub fn voxel_volume(&self, band: usize) -> f64 {
        let lat_bands = self.layout.lat_bands();
        let lon_count = self.layout.lon_count(band);
        let dlat = constants::deg_to_rad(180.0 / lat_bands as f64);
        let dlon = constants::TAU / lon_count as f64;
        let lat = constants::deg_to_rad(coords::band_latitude_deg(band, lat_bands));
        let solid_angle = dlat * dlon * lat.cos().abs();
        let r_mid = self.mean_radius();
        solid_angle * r_mid * r_mid * self.thickness()
    }
}

/// Construction parameters for the radii schedule. Radii are chosen on a non-uniform
/// schedule denser near the surface (spec.md §3) via `r(i) = R * (i/N)^EXPONENT`, an
/// exponent less than 1 so successive boundary spacing shrinks toward the surface.
const RADIUS_SCHEDULE_EXPONENT: f64 = 0.6;

/// Compute `shell_count + 1` strictly increasing boundary radii from the planet center
/// (0.0) to `planet_radius`.
pub fn radius_schedule(planet_radius: f64, shell_count: usize) -> Vec<f64> {
    (0..=shell_count)
        .map(|i| {
            let frac = (i as f64 / shell_count as f64).powf(RADIUS_SCHEDULE_EXPONENT);
            planet_radius * frac
        })
        .collect()
}

/// The process-wide simulation state (spec.md §3).
///
/// `Clone` backs the scheduler's pre-step snapshot: a numerical-excursion abort rolls back to
/// a clone taken before the step started (spec.md §7 "Numerical excursions").
#[derive(Clone)]
pub struct Planet {
    pub radius: f64,
    pub elapsed_years: f64,
    pub water_volume_m3: f64,
    pub sea_level_m: f64,
    pub mesh_dirty: bool,
    pub hotspots: Vec<Hotspot>,
    pub(crate) shells: Vec<Shell>,
}

impl Planet {
    /// Build an (empty, uninitialized-material) planet with the given radius, shell count,
    /// and per-shell grid resolution. Shell radii are immutable from this point on
    /// (spec.md §3).
    pub fn new_uninitialized(
        radius: f64,
        shell_count: usize,
        lat_bands: usize,
        lon_base: usize,
    ) -> PlanetResult<Self> {
        if radius <= 0.0 {
            return Err(PlanetError::Configuration {
                field: "radius",
                reason: "planet radius must be positive".to_string(),
            });
        }
        if shell_count < 2 {
            return Err(PlanetError::Configuration {
                field: "shell_count",
                reason: "a planet needs at least 2 shells (core and surface)".to_string(),
            });
        }
        if lat_bands < 2 {
            return Err(PlanetError::Configuration {
                field: "lat_bands",
                reason: "a shell needs at least 2 latitude bands".to_string(),
            });
        }

        let radii = radius_schedule(radius, shell_count);
        let default_voxel = Voxel::new(Material::Peridotite, 1600.0, 0.0);
        let mut shells = Vec::with_capacity(shell_count);
        for i in 0..shell_count {
            let layout = ShellLayout::equal_area(lat_bands, lon_base);
            shells.push(Shell::new(radii[i], radii[i + 1], layout, default_voxel));
        }

        Ok(Self {
            radius,
            elapsed_years: 0.0,
            water_volume_m3: 0.0,
            sea_level_m: 0.0,
            mesh_dirty: true,
            hotspots: Vec::new(),
            shells,
        })
    }

    #[inline]
    pub fn shell_count(&self) -> usize {
        self.shells.len()
    }

    #[inline]
    pub fn shell(&self, i: usize) -> &Shell {
        &self.shells[i]
    }

    #[inline]
    pub fn shell_mut(&mut self, i: usize) -> &mut Shell {
        &mut self.shells[i]
    }

    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }

    pub fn shells_mut(&mut self) -> &mut [Shell] {
        &mut self.shells
    }

    /// The outermost shell: atmosphere over ocean, spec.md §4.2's surface boundary condition.
    #[inline]
    pub fn surface_shell_index(&self) -> usize {
        self.shells.len() - 1
    }

    /// "the outermost solid shell" that plate identification and advection gap-fill operate
    /// on (spec.md §4.7).
    #[inline]
    pub fn lithosphere_shell_index(&self) -> usize {
        self.shells.len() - 2
    }

    /// Innermost 25% of shells by index, where radiogenic heating is nonzero (spec.md §4.2).
    #[inline]
    pub fn is_deep_shell(&self, shell: usize) -> bool {
        shell < (self.shells.len() + 3) / 4
    }

    pub fn voxel(&self, addr: VoxelAddr) -> &Voxel {
        self.shells[addr.shell].voxel_at(addr)
    }

    pub fn voxel_mut(&mut self, addr: VoxelAddr) -> &mut Voxel {
        self.shells[addr.shell].voxel_at_mut(addr)
    }

    pub fn neighbors(&self, addr: VoxelAddr) -> Neighbors {
        coords::neighbors_of(addr, |s| self.shells.get(s).map(|sh| &sh.layout))
    }

    /// The up-to-8 same-shell neighbors of `addr` (4 lateral + 4 diagonal), the "neighbors
    /// (of 8)" connectivity spec.md's plate gap-fill (§4.10) and coastal erosion (§4.12)
    /// count against.
    pub fn surrounding8(&self, addr: VoxelAddr) -> Vec<VoxelAddr> {
        let layout = &self.shells[addr.shell].layout;
        let mut out: Vec<VoxelAddr> = self.neighbors(addr).lateral().collect();
        out.extend(coords::diagonal_neighbors_same_shell(addr, layout));
        out
    }

    pub fn layout_of(&self, shell: usize) -> Option<&ShellLayout> {
        self.shells.get(shell).map(|s| &s.layout)
    }

    /// Iterate every voxel address in the planet, shell-major.
    pub fn all_addrs(&self) -> impl Iterator<Item = VoxelAddr> + '_ {
        self.shells.iter().enumerate().flat_map(|(s, shell)| {
            let layout = &shell.layout;
            (0..layout.lat_bands()).flat_map(move |band| {
                (0..layout.lon_count(band)).map(move |lon| VoxelAddr::new(s, band, lon))
            })
        })
    }

    /// Total volume (m^3) of water-material voxels across the whole planet, the first term
    /// of the water-conservation invariant (spec.md §3 invariant 4).
    pub fn total_water_voxel_volume(&self) -> f64 {
        let mut total = 0.0;
        for shell in &self.shells {
            for band in 0..shell.layout.lat_bands() {
                let vol = shell.voxel_volume(band);
                for lon in 0..shell.layout.lon_count(band) {
                    if shell.voxel(band, lon).material == Material::Water {
                        total += vol;
                    }
                }
            }
        }
        total
    }

    /// Invariant 1 (spec.md §3): every voxel's sub-offsets are in [0, 1).
    pub fn check_sub_offsets(&self) -> PlanetResult<()> {
        for shell in &self.shells {
            for v in shell.iter() {
                if !v.sub_offsets_in_range() {
                    return Err(PlanetError::InvariantViolation {
                        invariant: "sub_offsets_in_range",
                        details: format!(
                            "sub_lat={}, sub_lon={}, sub_r={}",
                            v.sub_lat, v.sub_lon, v.sub_r
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Invariant 6 (spec.md §3): fluid materials never carry stress at end of step.
    pub fn check_fluid_stress_clear(&self) -> PlanetResult<()> {
        for shell in &self.shells {
            for v in shell.iter() {
                if v.material.is_fluid() && v.stress != 0.0 {
                    return Err(PlanetError::InvariantViolation {
                        invariant: "fluid_stress_clear",
                        details: format!("{:?} voxel carries stress={}", v.material, v.stress),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_schedule_is_strictly_increasing_and_bounded() {
        let radii = radius_schedule(6.371e6, 20);
        assert_eq!(radii.len(), 21);
        assert_eq!(radii[0], 0.0);
        assert!((radii[20] - 6.371e6).abs() < 1.0);
        for w in radii.windows(2) {
            assert!(w[1] > w[0], "radii must be strictly increasing");
        }
    }

    #[test]
    fn radius_schedule_is_denser_near_surface() {
        let radii = radius_schedule(6.371e6, 20);
        let inner_gap = radii[1] - radii[0];
        let outer_gap = radii[20] - radii[19];
        assert!(
            outer_gap < inner_gap,
            "surface shells should be thinner than core shells: inner={inner_gap}, outer={outer_gap}"
        );
    }

    #[test]
    fn planet_construction_rejects_bad_config() {
        assert!(Planet::new_uninitialized(-1.0, 20, 60, 120).is_err());
        assert!(Planet::new_uninitialized(6.371e6, 1, 60, 120).is_err());
        assert!(Planet::new_uninitialized(6.371e6, 20, 1, 120).is_err());
    }

    #[test]
    fn fresh_planet_satisfies_sub_offset_invariant() {
        let planet = Planet::new_uninitialized(6.371e6, 6, 8, 16).unwrap();
        assert!(planet.check_sub_offsets().is_ok());
    }

    #[test]
    fn lithosphere_and_surface_indices() {
        let planet = Planet::new_uninitialized(6.371e6, 10, 8, 16).unwrap();
        assert_eq!(planet.surface_shell_index(), 9);
        assert_eq!(planet.lithosphere_shell_index(), 8);
    }
}
