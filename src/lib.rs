// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Library interface for the tectonika planetary geodynamics simulator
// ABOUTME: Exposes the `Simulation` facade and core data model for external use

pub mod engine;

pub use engine::core::config::{PlanetConfig, PlanetSnapshotFile};
pub use engine::core::error::{PlanetError, PlanetResult};
pub use engine::core::planet::{Hotspot, Planet, Shell};
pub use engine::core::voxel::{Material, MaterialProperties, Voxel};
pub use engine::backend::BackendKind;
pub use engine::physics::{Plate, PlateRegistry, PlateType};
pub use engine::renderer_view::{PlateSnapshot, RenderSnapshot, ShellOffsetTable, VoxelFields};
pub use engine::Simulation;
