// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Seeded randomness for reproducible hotspot placement and initial-noise generation
// ABOUTME: Follows the teacher's StdRng::seed_from_u64 convention (src/engine/physics/worldgen.rs)

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Construct the planet's root RNG from an optional seed (spec.md §6 "Environment": an
/// optional seed variable drives hotspot placement, plume perturbations, initial noise).
/// A missing seed falls back to system entropy, matching `rand::rngs::StdRng::from_entropy`.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}
