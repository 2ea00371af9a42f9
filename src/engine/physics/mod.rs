// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Physics pipeline modules run in fixed order each step: thermal, pressure, phase,
// ABOUTME: rheology, convection, plates, boundaries, advection, water, aging

pub mod advection;
pub mod boundaries;
pub mod constants;
pub mod convection;
pub mod phase;
pub mod plate_forces;
pub mod plates;
pub mod pressure;
pub mod rheology;
pub mod thermal;
pub mod water;
pub mod worldgen;

pub use plates::{Plate, PlateRegistry, PlateType};
