// ABOUTME: Core engine foundation - the voxel data model, coordinate system, and planet state
// ABOUTME: Provides the fundamental building blocks every physics module operates on

pub mod config;
pub mod coords;
pub mod error;
pub mod grid;
pub mod math;
pub mod planet;
pub mod rng;
pub mod voxel;

// Re-export key types for convenience
pub use error::{PlanetError, PlanetResult};
pub use math::{LatLon, Vec2, Vec3};
pub use planet::{Hotspot, Planet, Shell};
pub use voxel::{Material, MaterialProperties, Voxel};
