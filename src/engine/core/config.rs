// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Construction parameters and persisted-state file format, generalizing WorkspaceConfig
// ABOUTME: (engine/config/mod.rs) from a 2D terrain-generation workspace to a planet's physical parameters

use serde::{Deserialize, Serialize};

use super::error::{PlanetError, PlanetResult};
use super::grid::ShellLayout;
use super::planet::{Hotspot, Planet, Shell};
use super::voxel::{Material, Voxel};
use crate::engine::backend::BackendKind;

/// Everything the simulator needs to be constructed (spec.md §6 "Driver/CLI surface").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanetConfig {
    /// Planet radius in meters.
    pub radius_m: f64,
    /// Number of shells from core to surface.
    pub shell_count: usize,
    /// Latitude band count per shell.
    pub lat_bands: usize,
    /// Longitude count at the equator; tapers toward the poles (spec.md §3).
    pub lon_base: usize,
    /// Compute backend selector.
    pub backend: BackendKind,
    /// Simulated years advanced per real second the driver is stepped with.
    pub time_scale_years_per_second: f64,
    /// Reproducibility seed for hotspot placement and initial noise (spec.md §6 "Environment").
    pub seed: Option<u64>,
    /// Fraction of the surface shell that starts as ocean, used by initial-condition
    /// generation only.
    pub initial_ocean_fraction: f64,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            radius_m: 6.371e6,
            shell_count: 20,
            lat_bands: 60,
            lon_base: 120,
            backend: BackendKind::Cpu,
            time_scale_years_per_second: 1.0e5,
            seed: None,
            initial_ocean_fraction: 0.6,
        }
    }
}

impl PlanetConfig {
    pub fn validate(&self) -> PlanetResult<()> {
        if self.radius_m <= 0.0 {
            return Err(PlanetError::Configuration {
                field: "radius_m",
                reason: "must be positive".to_string(),
            });
        }
        if self.shell_count < 2 {
            return Err(PlanetError::Configuration {
                field: "shell_count",
                reason: "need at least 2 shells".to_string(),
            });
        }
        if self.lat_bands < 2 {
            return Err(PlanetError::Configuration {
                field: "lat_bands",
                reason: "need at least 2 latitude bands".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.initial_ocean_fraction) {
            return Err(PlanetError::Configuration {
                field: "initial_ocean_fraction",
                reason: "must be within [0, 1]".to_string(),
            });
        }
        Ok(())
    }

    /// Load a config from a YAML file, mirroring the teacher's
    /// `WorkspaceConfig::load_from_file` (engine/config/mod.rs).
    pub fn load_from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PlanetConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save a config to a YAML file.
    pub fn save_to_file(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}

/// Current version of the persisted-snapshot format (spec.md §6 "Persisted state":
/// "version-tag the format").
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// A serializable hotspot record for save/load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotspotRecord {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub age_years: f64,
}

/// A serializable voxel record. Plate ids and sub-cell offsets are included so a reloaded
/// planet resumes mid-step exactly where it left off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoxelRecord {
    pub material: u8,
    pub density: f64,
    pub temperature: f64,
    pub pressure: f64,
    pub v_north: f64,
    pub v_east: f64,
    pub v_radial: f64,
    pub age: f64,
    pub composition: f64,
    pub yield_strength: f64,
    pub stress: f64,
    pub is_brittle: bool,
    pub is_fractured: bool,
    pub plate_id: u32,
    pub is_boundary: bool,
    pub sub_lat: f64,
    pub sub_lon: f64,
    pub sub_r: f64,
    pub stretch_factor: f64,
    pub last_move_time: f64,
    pub melt_fraction: f64,
    pub water_volume: f64,
    pub elevation: f64,
    pub source_plate_id: u32,
    pub is_transient: bool,
}

/// A serializable shell: radii, per-band longitude counts, and its voxels in flat order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellRecord {
    pub r_in: f64,
    pub r_out: f64,
    pub band_lon_counts: Vec<usize>,
    pub voxels: Vec<VoxelRecord>,
}

/// The complete persisted-state file (spec.md §6 "Persisted state"): planet radius, shell
/// schedule, voxel array, hotspot positions, Vw, T.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanetSnapshotFile {
    pub format_version: u32,
    /// RFC 3339 timestamp of when this snapshot was written, matching the teacher's
    /// `WorkspaceMetadata::created` convention (`engine/config/mod.rs`).
    pub created_at: String,
    pub radius_m: f64,
    pub elapsed_years: f64,
    pub water_volume_m3: f64,
    pub sea_level_m: f64,
    pub hotspots: Vec<HotspotRecord>,
    pub shells: Vec<ShellRecord>,
}

impl PlanetSnapshotFile {
    pub fn load_from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let file: PlanetSnapshotFile = serde_yaml::from_str(&content)?;
        if file.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(format!(
                "unsupported snapshot format version {} (expected {})",
                file.format_version, SNAPSHOT_FORMAT_VERSION
            )
            .into());
        }
        Ok(file)
    }

    pub fn save_to_file(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}

impl From<&Voxel> for VoxelRecord {
    fn from(v: &Voxel) -> Self {
        Self {
            material: v.material.to_u8(),
            density: v.density,
            temperature: v.temperature,
            pressure: v.pressure,
            v_north: v.v_north,
            v_east: v.v_east,
            v_radial: v.v_radial,
            age: v.age,
            composition: v.composition,
            yield_strength: v.yield_strength,
            stress: v.stress,
            is_brittle: v.is_brittle,
            is_fractured: v.is_fractured,
            plate_id: v.plate_id,
            is_boundary: v.is_boundary,
            sub_lat: v.sub_lat,
            sub_lon: v.sub_lon,
            sub_r: v.sub_r,
            stretch_factor: v.stretch_factor,
            last_move_time: v.last_move_time,
            melt_fraction: v.melt_fraction,
            water_volume: v.water_volume,
            elevation: v.elevation,
            source_plate_id: v.source_plate_id,
            is_transient: v.is_transient,
        }
    }
}

impl TryFrom<&VoxelRecord> for Voxel {
    type Error = PlanetError;

    fn try_from(r: &VoxelRecord) -> Result<Self, Self::Error> {
        let material = Material::from_u8(r.material).ok_or_else(|| PlanetError::Configuration {
            field: "material",
            reason: format!("unknown material tag {}", r.material),
        })?;
        Ok(Voxel {
            material,
            density: r.density,
            temperature: r.temperature,
            pressure: r.pressure,
            v_north: r.v_north,
            v_east: r.v_east,
            v_radial: r.v_radial,
            age: r.age,
            composition: r.composition,
            yield_strength: r.yield_strength,
            stress: r.stress,
            is_brittle: r.is_brittle,
            is_fractured: r.is_fractured,
            plate_id: r.plate_id,
            is_boundary: r.is_boundary,
            sub_lat: r.sub_lat,
            sub_lon: r.sub_lon,
            sub_r: r.sub_r,
            stretch_factor: r.stretch_factor,
            last_move_time: r.last_move_time,
            melt_fraction: r.melt_fraction,
            water_volume: r.water_volume,
            elevation: r.elevation,
            source_plate_id: r.source_plate_id,
            is_transient: r.is_transient,
        })
    }
}

impl Planet {
    /// Serialize the full planet state for save/load (spec.md §6 "Persisted state").
    pub fn to_snapshot(&self) -> PlanetSnapshotFile {
        let shells = self
            .shells()
            .iter()
            .map(|shell| ShellRecord {
                r_in: shell.r_in,
                r_out: shell.r_out,
                band_lon_counts: (0..shell.layout.lat_bands())
                    .map(|b| shell.layout.lon_count(b))
                    .collect(),
                voxels: shell.buffer().iter().map(VoxelRecord::from).collect(),
            })
            .collect();
        PlanetSnapshotFile {
            format_version: SNAPSHOT_FORMAT_VERSION,
            created_at: chrono::Utc::now().to_rfc3339(),
            radius_m: self.radius,
            elapsed_years: self.elapsed_years,
            water_volume_m3: self.water_volume_m3,
            sea_level_m: self.sea_level_m,
            hotspots: self
                .hotspots
                .iter()
                .map(|h| HotspotRecord {
                    lat_deg: h.lat_deg,
                    lon_deg: h.lon_deg,
                    age_years: h.age_years,
                })
                .collect(),
            shells,
        }
    }

    /// Reconstruct a planet from a persisted snapshot.
    pub fn from_snapshot(file: &PlanetSnapshotFile) -> PlanetResult<Self> {
        if file.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(PlanetError::Configuration {
                field: "format_version",
                reason: format!(
                    "unsupported snapshot format version {} (expected {})",
                    file.format_version, SNAPSHOT_FORMAT_VERSION
                ),
            });
        }
        let mut shells = Vec::with_capacity(file.shells.len());
        for shell_record in &file.shells {
            let layout = ShellLayout::new(shell_record.band_lon_counts.clone());
            let placeholder = Voxel::new(Material::Peridotite, 0.0, 0.0);
            let mut shell = Shell::new(shell_record.r_in, shell_record.r_out, layout, placeholder);
            for (flat, record) in shell_record.voxels.iter().enumerate() {
                shell.buffer_mut().set(flat, Voxel::try_from(record)?);
            }
            shells.push(shell);
        }
        Ok(Planet {
            radius: file.radius_m,
            elapsed_years: file.elapsed_years,
            water_volume_m3: file.water_volume_m3,
            sea_level_m: file.sea_level_m,
            mesh_dirty: true,
            hotspots: file
                .hotspots
                .iter()
                .map(|h| Hotspot {
                    lat_deg: h.lat_deg,
                    lon_deg: h.lon_deg,
                    age_years: h.age_years,
                })
                .collect(),
            shells,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(PlanetConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_ocean_fraction() {
        let mut config = PlanetConfig::default();
        config.initial_ocean_fraction = 1.5;
        assert!(config.validate().is_err());
    }
}
