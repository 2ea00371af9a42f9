// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Engine module organization - core data model, physics pipeline, compute backends,
// ABOUTME: the step scheduler, the renderer view, and the `Simulation` facade tying them together

pub mod backend;
pub mod core;
pub mod physics;
pub mod renderer_view;
pub mod scheduler;

use core::config::PlanetConfig;
use core::error::PlanetResult;
use core::planet::Planet;
use core::rng::rng_from_seed;

use backend::{get_or_replace_with_cpu, ComputeBackend};
use physics::worldgen;
use physics::PlateRegistry;
use renderer_view::{build_snapshot, RenderSnapshot};
use scheduler::Scheduler;

/// The top-level facade a driver (CLI, renderer, test harness) constructs and steps. Owns the
/// planet, the plate registry, the compute backend, and the scheduler's cadence bookkeeping --
/// everything a caller needs to run the simulation without touching its internals directly
/// (spec.md §6 "Driver/CLI surface").
pub struct Simulation {
    planet: Planet,
    registry: PlateRegistry,
    backend: Box<dyn ComputeBackend>,
    scheduler: Scheduler,
    config: PlanetConfig,
}

impl Simulation {
    /// Validate `config`, generate a fresh planet from it, and construct the compute backend
    /// it names (downgrading to CPU with a one-time warning if unavailable).
    pub fn new(config: PlanetConfig) -> PlanetResult<Self> {
        config.validate()?;
        let mut rng = rng_from_seed(config.seed);
        let planet = worldgen::generate(&config, &mut rng)?;
        let backend = get_or_replace_with_cpu(config.backend);

        Ok(Self {
            planet,
            registry: PlateRegistry::default(),
            backend,
            scheduler: Scheduler::new(),
            config,
        })
    }

    /// Reconstruct a simulation around an already-generated planet, e.g. loaded from a
    /// snapshot file (spec.md §6 "Persisted state").
    pub fn from_planet(config: PlanetConfig, planet: Planet) -> PlanetResult<Self> {
        config.validate()?;
        let backend = get_or_replace_with_cpu(config.backend);
        Ok(Self {
            planet,
            registry: PlateRegistry::default(),
            backend,
            scheduler: Scheduler::new(),
            config,
        })
    }

    pub fn config(&self) -> &PlanetConfig {
        &self.config
    }

    pub fn planet(&self) -> &Planet {
        &self.planet
    }

    /// Advance the simulation by `dt_real_seconds` of wall-clock time, scaled by the
    /// configured `time_scale_years_per_second` into simulated years (spec.md §6).
    pub fn step(&mut self, dt_real_seconds: f64) -> PlanetResult<()> {
        let dt_years = dt_real_seconds * self.config.time_scale_years_per_second;
        self.scheduler
            .step(&mut self.planet, &mut self.registry, self.backend.as_ref(), dt_years)
    }

    /// Build the read-only renderer snapshot for this frame (spec.md §6). Does not clear
    /// `mesh_dirty`; call `acknowledge_render` once the renderer has consumed it.
    pub fn render_snapshot(&self) -> RenderSnapshot {
        build_snapshot(&self.planet, &self.registry)
    }

    /// Mark the just-published render snapshot as consumed, clearing `mesh_dirty` until the
    /// next step produces new geometry (spec.md §6: "a `meshDirty` flag cleared by the
    /// consumer").
    pub fn acknowledge_render(&mut self) {
        self.planet.mesh_dirty = false;
    }

    /// Persist the current planet state to `path` (spec.md §6 "Persisted state").
    pub fn save_to_file(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.planet.to_snapshot().save_to_file(path)
    }

    /// Load a planet snapshot from `path` and build a simulation around it, keeping `config`
    /// for backend selection and time scale.
    pub fn load_from_file(config: PlanetConfig, path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let file = core::config::PlanetSnapshotFile::load_from_file(path)?;
        let planet = Planet::from_snapshot(&file)?;
        Ok(Self::from_planet(config, planet)?)
    }
}
