// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: The step driver: fixed substep ordering, cadence control for plate re-identification
// ABOUTME: and water ticks, numerical-excursion clamping, and step-abort-with-rollback (spec.md §2, §7)

use std::sync::atomic::{AtomicU32, Ordering};

use rayon::prelude::*;

use crate::engine::backend::{ComputeBackend, StepContext};
use crate::engine::core::error::{PlanetError, PlanetResult};
use crate::engine::core::planet::Planet;
use crate::engine::physics::constants::{
    MAX_VOXEL_VELOCITY_M_PER_S, PLATE_REIDENTIFY_INTERVAL_YEARS, TEMPERATURE_MAX, TEMPERATURE_MIN,
    WATER_TICK_INTERVAL_YEARS,
};
use crate::engine::physics::{boundaries, phase, plate_forces, plates, pressure, rheology, water};
use crate::engine::physics::PlateRegistry;

/// Drives one simulation step through the fixed substep order (spec.md §2), owning the
/// cadence bookkeeping the scheduler needs beyond what's already on `Planet`/`PlateRegistry`.
#[derive(Debug, Clone)]
pub struct Scheduler {
    water_last_tick_years: f64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            water_last_tick_years: 0.0,
        }
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance `planet` by `dt_years` simulated years, re-identifying plates and ticking water
    /// flow on their own cadences (spec.md §2, §4.7, §4.12). On a numerical-excursion abort
    /// (spec.md §7), `planet` is rolled back to its pre-step state and `registry` is left
    /// untouched, so the caller may retry with a smaller `dt_years`.
    pub fn step(
        &mut self,
        planet: &mut Planet,
        registry: &mut PlateRegistry,
        backend: &dyn ComputeBackend,
        dt_years: f64,
    ) -> PlanetResult<()> {
        if dt_years <= 0.0 {
            return Ok(());
        }

        let rollback = planet.clone();
        let mut ctx = StepContext::new(dt_years);
        planet.elapsed_years += dt_years;

        backend.run_temperature_step(planet, &mut ctx);
        clamp_excursions(planet, &mut ctx);

        pressure::step(planet);
        clamp_excursions(planet, &mut ctx);

        phase::step(planet);
        rheology::step(planet, dt_years);
        clamp_excursions(planet, &mut ctx);

        backend.run_convection_step(planet, &mut ctx);
        clamp_excursions(planet, &mut ctx);

        let stale = registry.plates.is_empty()
            || planet.elapsed_years - registry.last_identified_years >= PLATE_REIDENTIFY_INTERVAL_YEARS;
        if stale {
            *registry = plates::identify(planet, planet.elapsed_years);
        }

        plate_forces::step(planet, registry, dt_years);
        boundaries::step(planet, dt_years);

        backend.run_advection_step(planet, &mut ctx);
        clamp_excursions(planet, &mut ctx);

        if planet.elapsed_years - self.water_last_tick_years >= WATER_TICK_INTERVAL_YEARS {
            water::step(planet);
            self.water_last_tick_years = planet.elapsed_years;
        }

        apply_aging(planet, dt_years);

        let threshold = excursion_threshold(planet);
        if ctx.excursion_count > threshold {
            *planet = rollback;
            return Err(PlanetError::StepAborted {
                excursion_count: ctx.excursion_count,
                threshold,
            });
        }

        planet.mesh_dirty = true;
        Ok(())
    }
}

/// Age every voxel and every hotspot by `dt_years` (spec.md §3 "Entity lifecycles": voxels and
/// hotspots both carry an age that only ever grows).
fn apply_aging(planet: &mut Planet, dt_years: f64) {
    for s in 0..planet.shell_count() {
        for v in planet.shell_mut(s).iter_mut() {
            v.age += dt_years;
        }
    }
    for hotspot in planet.hotspots.iter_mut() {
        hotspot.age_years += dt_years;
    }
}

/// Number of clamp events a step may accumulate before it's treated as diverged (spec.md §7:
/// "abort the step if the counter crosses a threshold"). Scaled to grid size so a clamp storm
/// on a fine grid isn't judged by a coarse-grid constant.
fn excursion_threshold(planet: &Planet) -> u32 {
    let total_voxels: usize = (0..planet.shell_count())
        .map(|s| planet.shell(s).layout.total_voxels())
        .sum();
    ((total_voxels / 200).max(10)) as u32
}

/// Clamp every voxel's temperature, pressure, and velocity back into a physical range,
/// recording one excursion per clamped field (spec.md §7 "Numerical excursions"). Each voxel
/// is independent, so this runs on the rayon worker pool (spec.md §5, B.5) one shell at a
/// time -- a single barrier per shell, never straddling into the next substep.
fn clamp_excursions(planet: &mut Planet, ctx: &mut StepContext) {
    let excursions = AtomicU32::new(0);
    for s in 0..planet.shell_count() {
        planet.shell_mut(s).buffer_mut().par_iter_mut().for_each(|v| {
            if !v.temperature.is_finite() {
                v.temperature = TEMPERATURE_MIN;
                excursions.fetch_add(1, Ordering::Relaxed);
            } else if v.temperature < TEMPERATURE_MIN || v.temperature > TEMPERATURE_MAX {
                v.temperature = v.temperature.clamp(TEMPERATURE_MIN, TEMPERATURE_MAX);
                excursions.fetch_add(1, Ordering::Relaxed);
            }

            if !v.pressure.is_finite() {
                v.pressure = 0.0;
                excursions.fetch_add(1, Ordering::Relaxed);
            } else if v.pressure < 0.0 {
                v.pressure = 0.0;
                excursions.fetch_add(1, Ordering::Relaxed);
            }

            let speed_sq = v.v_north * v.v_north + v.v_east * v.v_east + v.v_radial * v.v_radial;
            if !speed_sq.is_finite() {
                v.v_north = 0.0;
                v.v_east = 0.0;
                v.v_radial = 0.0;
                excursions.fetch_add(1, Ordering::Relaxed);
                return;
            }
            let speed = speed_sq.sqrt();
            if speed > MAX_VOXEL_VELOCITY_M_PER_S {
                let scale = MAX_VOXEL_VELOCITY_M_PER_S / speed;
                v.v_north *= scale;
                v.v_east *= scale;
                v.v_radial *= scale;
                excursions.fetch_add(1, Ordering::Relaxed);
            }
        });
    }
    for _ in 0..excursions.load(Ordering::Relaxed) {
        ctx.record_excursion();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::backend::cpu::CpuBackend;
    use crate::engine::core::voxel::{Material, Voxel};

    fn seeded_planet() -> Planet {
        let mut planet = Planet::new_uninitialized(6.371e6, 6, 12, 24).unwrap();
        for s in 0..planet.shell_count() {
            for v in planet.shell_mut(s).iter_mut() {
                *v = Voxel::new(Material::Peridotite, 1600.0, 1.0e6);
            }
        }
        planet
    }

    #[test]
    fn step_advances_elapsed_time_and_marks_dirty() {
        let mut planet = seeded_planet();
        let mut registry = PlateRegistry::default();
        let backend = CpuBackend;
        let mut scheduler = Scheduler::new();
        planet.mesh_dirty = false;

        scheduler.step(&mut planet, &mut registry, &backend, 1.0e5).unwrap();

        assert_eq!(planet.elapsed_years, 1.0e5);
        assert!(planet.mesh_dirty);
    }

    #[test]
    fn zero_timestep_is_a_no_op() {
        let mut planet = seeded_planet();
        let mut registry = PlateRegistry::default();
        let backend = CpuBackend;
        let mut scheduler = Scheduler::new();
        let before = planet.elapsed_years;

        scheduler.step(&mut planet, &mut registry, &backend, 0.0).unwrap();

        assert_eq!(planet.elapsed_years, before);
    }

    #[test]
    fn aging_increments_voxel_and_hotspot_age() {
        let mut planet = seeded_planet();
        planet.hotspots.push(crate::engine::core::planet::Hotspot {
            lat_deg: 10.0,
            lon_deg: 20.0,
            age_years: 0.0,
        });
        apply_aging(&mut planet, 1.0e3);
        assert_eq!(planet.hotspots[0].age_years, 1.0e3);
        assert_eq!(planet.shell(0).voxel(0, 0).age, 1.0e3);
    }

    #[test]
    fn clamp_excursions_repairs_non_finite_temperature() {
        let mut planet = seeded_planet();
        planet.shell_mut(0).voxel_mut(0, 0).temperature = f64::NAN;
        let mut ctx = StepContext::new(1.0);
        clamp_excursions(&mut planet, &mut ctx);
        assert!(planet.shell(0).voxel(0, 0).temperature.is_finite());
        assert!(ctx.excursion_count >= 1);
    }
}
