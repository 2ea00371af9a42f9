// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Physical constants shared across the physics pipeline

pub const GRAVITY: f64 = 9.81; // m/s^2
pub const SURFACE_AIR_PRESSURE: f64 = 101_325.0; // Pa

/// Volumetric thermal expansion coefficient used by the buoyancy term.
pub const THERMAL_EXPANSION: f64 = 3.0e-5; // 1/K
/// Thermal diffusivity used by the Rayleigh-number estimate.
pub const THERMAL_DIFFUSIVITY: f64 = 1.0e-6; // m^2/s
pub const RAYLEIGH_CONVECTION_THRESHOLD: f64 = 1000.0;

pub const ARRHENIUS_VISCOSITY_PREFACTOR: f64 = 1.0e21; // Pa*s
pub const ARRHENIUS_ACTIVATION_ENERGY: f64 = 3.0e5; // J/mol
pub const GAS_CONSTANT: f64 = 8.314; // J/(mol*K)
pub const VISCOSITY_MIN: f64 = 1.0e19;
pub const VISCOSITY_MAX: f64 = 1.0e25;

pub const TEMPERATURE_MIN: f64 = 0.0;
pub const TEMPERATURE_MAX: f64 = 6000.0;

/// Plate-motion angular speed cap, expressed as a linear surface speed (spec: 0.2 m/yr).
pub const PLATE_MAX_SURFACE_SPEED_M_PER_YEAR: f64 = 0.2;

/// Minimum connected-component size for a flood-filled region to become a plate.
pub const MIN_PLATE_MEMBERS: usize = 100;
/// Velocity-coherence threshold for the plate-identification flood-fill.
pub const PLATE_VELOCITY_THRESHOLD: f64 = 1.0e-6; // m/s
/// Default cadence between plate re-identification passes.
pub const PLATE_REIDENTIFY_INTERVAL_YEARS: f64 = 1.0e7;

/// Default cadence between water-flow/sea-level update ticks.
pub const WATER_TICK_INTERVAL_YEARS: f64 = 100.0;
/// Relative tolerance on global water-volume conservation.
pub const WATER_VOLUME_TOLERANCE: f64 = 1.0e-6;

/// Numerical-excursion clamp ceiling on voxel velocity components (spec.md §7 "Numerical
/// excursions": "|v|>c_scale"). Set far above any physically expected plate or convective
/// velocity (plate motion is ~cm/yr, i.e. ~1e-9 m/s) so it only ever fires on NaN/Inf-class
/// bugs, never on legitimate dynamics.
pub const MAX_VOXEL_VELOCITY_M_PER_S: f64 = 10.0;
