// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Planet-level error kinds, in the style of the teacher's AgentError
// ABOUTME: Configuration and invariant failures are fatal; numerical excursions are clamped locally (spec.md §7)

/// Errors the planet surfaces to its driver. Per spec.md §7:
/// - `Configuration` is raised at construction and is fatal.
/// - `BackendUnavailable` is a downgrade notice, not necessarily fatal (the driver may
///   proceed on the CPU reference backend); it is still modeled as a `Result` so the
///   construction site can choose to log-and-continue.
/// - `StepAborted` surfaces a numerical-excursion counter exceeding its threshold within
///   a single step; the driver decides whether to retry from the pre-step snapshot.
/// - `InvariantViolation` is a bug report: the simulator halts rather than auto-correcting.
#[derive(Debug)]
pub enum PlanetError {
    Configuration {
        field: &'static str,
        reason: String,
    },
    BackendUnavailable {
        requested: String,
        fallback: &'static str,
    },
    StepAborted {
        excursion_count: u32,
        threshold: u32,
    },
    InvariantViolation {
        invariant: &'static str,
        details: String,
    },
}

pub type PlanetResult<T> = Result<T, PlanetError>;

impl std::fmt::Display for PlanetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanetError::Configuration { field, reason } => {
                write!(f, "invalid configuration for `{field}`: {reason}")
            }
            PlanetError::BackendUnavailable {
                requested,
                fallback,
            } => write!(
                f,
                "compute backend `{requested}` unavailable, downgraded to `{fallback}`"
            ),
            PlanetError::StepAborted {
                excursion_count,
                threshold,
            } => write!(
                f,
                "step aborted: {excursion_count} numerical excursions exceeded threshold {threshold}"
            ),
            PlanetError::InvariantViolation { invariant, details } => {
                write!(f, "invariant `{invariant}` violated: {details}")
            }
        }
    }
}

impl std::error::Error for PlanetError {}
