// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Material property table and the per-voxel state record
// ABOUTME: Computation sites consume MaterialProperties; adding a material only adds a table row

/// Extensible material tag (spec.md §3). New materials add a variant plus a
/// `MaterialProperties` table row; no computation site should match on `Material`
/// directly for physical constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Material {
    Air = 0,
    Water = 1,
    Ice = 2,
    Sediment = 3,
    Sand = 4,
    Granite = 5,
    Basalt = 6,
    Peridotite = 7,
    Magma = 8,
}

impl Material {
    pub const ALL: [Material; 9] = [
        Material::Air,
        Material::Water,
        Material::Ice,
        Material::Sediment,
        Material::Sand,
        Material::Granite,
        Material::Basalt,
        Material::Peridotite,
        Material::Magma,
    ];

    #[inline]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.to_u8() == value)
    }

    /// Fluid materials never carry stress at end of step (spec.md §3 invariant 6).
    #[inline]
    pub fn is_fluid(self) -> bool {
        matches!(self, Material::Air | Material::Water | Material::Magma)
    }

    #[inline]
    pub fn is_air(self) -> bool {
        matches!(self, Material::Air)
    }

    pub fn properties(self) -> &'static MaterialProperties {
        &MATERIAL_TABLE[self.to_u8() as usize]
    }
}

/// Physical constants for a material. One row per `Material` variant; all physics modules
/// read from here instead of branching on the material tag directly (spec.md §9).
#[derive(Debug, Clone, Copy)]
pub struct MaterialProperties {
    pub default_density: f64,       // kg/m^3
    pub thermal_conductivity: f64,  // W/(m*K)
    pub specific_heat: f64,         // J/(kg*K)
    pub melting_point: f64,         // K
    pub base_viscosity: f64,        // Pa*s, reference value feeding the Arrhenius law
    pub solidus: f64,               // K, below which magma solidifies
}

const MATERIAL_TABLE: [MaterialProperties; 9] = [
    // Air
    MaterialProperties {
        default_density: 1.2,
        thermal_conductivity: 0.024,
        specific_heat: 1005.0,
        melting_point: f64::INFINITY,
        base_viscosity: 1.8e-5,
        solidus: 0.0,
    },
    // Water
    MaterialProperties {
        default_density: 1000.0,
        thermal_conductivity: 0.6,
        specific_heat: 4186.0,
        melting_point: 373.15,
        base_viscosity: 1.0e-3,
        solidus: 273.15,
    },
    // Ice
    MaterialProperties {
        default_density: 917.0,
        thermal_conductivity: 2.2,
        specific_heat: 2100.0,
        melting_point: 273.15,
        base_viscosity: 1.0e13,
        solidus: 273.15,
    },
    // Sediment
    MaterialProperties {
        default_density: 1800.0,
        thermal_conductivity: 1.5,
        specific_heat: 1000.0,
        melting_point: 1500.0,
        base_viscosity: 1.0e20,
        solidus: 1200.0,
    },
    // Sand
    MaterialProperties {
        default_density: 1600.0,
        thermal_conductivity: 0.3,
        specific_heat: 830.0,
        melting_point: 1986.0,
        base_viscosity: 1.0e20,
        solidus: 1200.0,
    },
    // Granite
    MaterialProperties {
        default_density: 2700.0,
        thermal_conductivity: 2.6,
        specific_heat: 790.0,
        melting_point: 1473.0,
        base_viscosity: 1.0e22,
        solidus: 1200.0,
    },
    // Basalt
    MaterialProperties {
        default_density: 3000.0,
        thermal_conductivity: 1.8,
        specific_heat: 840.0,
        melting_point: 1473.0,
        base_viscosity: 1.0e21,
        solidus: 1200.0,
    },
    // Peridotite
    MaterialProperties {
        default_density: 3300.0,
        thermal_conductivity: 4.0,
        specific_heat: 1000.0,
        melting_point: 1800.0,
        base_viscosity: 1.0e21,
        solidus: 1200.0,
    },
    // Magma
    MaterialProperties {
        default_density: 2800.0,
        thermal_conductivity: 1.0,
        specific_heat: 1200.0,
        melting_point: 0.0,
        base_viscosity: 1.0e2,
        solidus: 1200.0,
    },
];

/// The atomic simulation unit (spec.md §3). All fields are plain data; physics modules
/// mutate voxels in place through a `Planet`, never retaining references across steps.
#[derive(Debug, Clone, Copy)]
pub struct Voxel {
    pub material: Material,
    pub density: f64,
    pub temperature: f64,
    pub pressure: f64,

    /// Local spherical-frame velocity: northward, eastward, radial (m/s).
    pub v_north: f64,
    pub v_east: f64,
    pub v_radial: f64,

    pub age: f64,         // years
    pub composition: f64, // 0..1 tracer

    pub yield_strength: f64,
    pub stress: f64,
    pub is_brittle: bool,
    pub is_fractured: bool,

    pub plate_id: u32, // 0 = none
    pub is_boundary: bool,

    /// Sub-cell offsets, each in [0, 1) (spec.md §3 invariant 1).
    pub sub_lat: f64,
    pub sub_lon: f64,
    pub sub_r: f64,

    pub stretch_factor: f64,
    pub last_move_time: f64, // simulated years
    pub melt_fraction: f64,
    pub water_volume: f64,
    pub elevation: f64,

    pub source_plate_id: u32,
    pub is_transient: bool,
}

impl Voxel {
    /// A voxel at rest, filled with `material` at its table-default density and a given
    /// temperature; all dynamic/tectonic fields start at their inert zero state.
    pub fn new(material: Material, temperature: f64, pressure: f64) -> Self {
        Self {
            material,
            density: material.properties().default_density,
            temperature,
            pressure,
            v_north: 0.0,
            v_east: 0.0,
            v_radial: 0.0,
            age: 0.0,
            composition: 0.0,
            yield_strength: 1.0e9,
            stress: 0.0,
            is_brittle: false,
            is_fractured: false,
            plate_id: 0,
            is_boundary: false,
            sub_lat: 0.0,
            sub_lon: 0.0,
            sub_r: 0.0,
            stretch_factor: 1.0,
            last_move_time: 0.0,
            melt_fraction: 0.0,
            water_volume: 0.0,
            elevation: 0.0,
            source_plate_id: 0,
            is_transient: false,
        }
    }

    /// Invariant 1 (spec.md §3): every sub-offset stays in [0, 1).
    pub fn sub_offsets_in_range(&self) -> bool {
        (0.0..1.0).contains(&self.sub_lat)
            && (0.0..1.0).contains(&self.sub_lon)
            && (0.0..1.0).contains(&self.sub_r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_table_round_trips_through_u8() {
        for m in Material::ALL {
            assert_eq!(Material::from_u8(m.to_u8()), Some(m));
        }
    }

    #[test]
    fn fluids_are_tagged_correctly() {
        assert!(Material::Air.is_fluid());
        assert!(Material::Water.is_fluid());
        assert!(Material::Magma.is_fluid());
        assert!(!Material::Granite.is_fluid());
        assert!(!Material::Basalt.is_fluid());
    }

    #[test]
    fn new_voxel_has_valid_sub_offsets() {
        let v = Voxel::new(Material::Peridotite, 1500.0, 1.0e9);
        assert!(v.sub_offsets_in_range());
        assert_eq!(v.density, Material::Peridotite.properties().default_density);
    }
}
