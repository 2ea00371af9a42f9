// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Abstract compute-backend contract (spec.md §4.13): three kernel entry points plus a CPU fallback
// ABOUTME: All backends are explicit instances passed through the step context; there is no process-wide singleton (spec.md §9)

use std::sync::Once;

use crate::engine::core::planet::Planet;

pub mod cpu;

pub use cpu::CpuBackend;

/// Backend selector exposed on the driver/CLI surface (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Cpu,
    Compute,
    Metal,
    OpenCl,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BackendKind::Cpu => "cpu",
            BackendKind::Compute => "compute",
            BackendKind::Metal => "metal",
            BackendKind::OpenCl => "opencl",
        };
        write!(f, "{name}")
    }
}

/// Per-step bookkeeping shared across substeps and backends: the simulated timestep and the
/// numerical-excursion counter (spec.md §7 "Numerical excursions": clamp locally, count,
/// abort the step if the counter crosses a threshold).
#[derive(Debug, Clone, Copy)]
pub struct StepContext {
    pub dt_years: f64,
    pub excursion_count: u32,
}

impl StepContext {
    pub fn new(dt_years: f64) -> Self {
        Self {
            dt_years,
            excursion_count: 0,
        }
    }

    #[inline]
    pub fn dt_seconds(&self) -> f64 {
        self.dt_years * SECONDS_PER_YEAR
    }

    /// Record a clamp event (NaN temperature, negative pressure, runaway velocity, ...).
    #[inline]
    pub fn record_excursion(&mut self) {
        self.excursion_count += 1;
    }
}

pub const SECONDS_PER_YEAR: f64 = 365.25 * 86_400.0;

/// The abstract compute backend the core consumes (spec.md §4.13). A backend owns no planet
/// state across calls; it receives the planet (and, implicitly, whatever device buffers it
/// privately manages) fresh each invocation through `&mut Planet`.
///
/// Semantics across backends must match within the published tolerance (1 ULP on
/// temperature, 1% on velocities) -- the CPU implementation in `cpu.rs` is the behavioral
/// specification every other backend is validated against.
pub trait ComputeBackend {
    fn kind(&self) -> BackendKind;

    /// Upload planet state to the backend's working buffers. The CPU backend has no separate
    /// buffers, so this is a no-op; a real GPU backend would stage its device memory here.
    fn upload(&mut self, _planet: &Planet) {}

    /// Publish the backend's working buffers back into the planet. No-op on the CPU backend.
    fn download(&mut self, _planet: &mut Planet) {}

    fn run_temperature_step(&self, planet: &mut Planet, ctx: &mut StepContext);
    fn run_convection_step(&self, planet: &mut Planet, ctx: &mut StepContext);
    fn run_advection_step(&self, planet: &mut Planet, ctx: &mut StepContext);
}

static DOWNGRADE_LOGGED: Once = Once::new();

/// Construct the backend for `kind`, downgrading silently to the CPU reference implementation
/// when the requested backend is unavailable and logging the downgrade exactly once per
/// process (spec.md §7 "Backend-unavailable").
///
/// No GPU bindings are bundled with this crate, so every non-CPU kind currently downgrades;
/// the trait boundary is what a real `compute`/`metal`/`opencl` implementation would slot
/// into without the scheduler or physics modules changing.
pub fn get_or_replace_with_cpu(kind: BackendKind) -> Box<dyn ComputeBackend> {
    if kind != BackendKind::Cpu {
        DOWNGRADE_LOGGED.call_once(|| {
            eprintln!("backend `{kind}` unavailable in this build, downgrading to `cpu`");
        });
    }
    Box::new(CpuBackend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_cpu_backends_downgrade_to_cpu() {
        let backend = get_or_replace_with_cpu(BackendKind::Metal);
        assert_eq!(backend.kind(), BackendKind::Cpu);
    }

    #[test]
    fn step_context_converts_years_to_seconds() {
        let ctx = StepContext::new(1.0);
        assert!((ctx.dt_seconds() - SECONDS_PER_YEAR).abs() < 1.0);
    }
}
