// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: The mandatory CPU reference backend (spec.md §4.13): every other backend is
// ABOUTME: validated against this implementation's behavior, not the other way around

use crate::engine::core::planet::Planet;
use crate::engine::physics::{advection, convection, thermal};

use super::{BackendKind, ComputeBackend, StepContext};

/// The CPU reference implementation of the three kernel entry points. Holds no buffers of
/// its own -- `upload`/`download` are no-ops, since the planet it's handed each call already
/// is the authoritative state.
pub struct CpuBackend;

impl ComputeBackend for CpuBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Cpu
    }

    fn run_temperature_step(&self, planet: &mut Planet, ctx: &mut StepContext) {
        thermal::step(planet, ctx.dt_years);
    }

    fn run_convection_step(&self, planet: &mut Planet, ctx: &mut StepContext) {
        convection::step(planet, ctx.dt_years);
    }

    fn run_advection_step(&self, planet: &mut Planet, ctx: &mut StepContext) {
        advection::step(planet, ctx.dt_years);
    }
}
