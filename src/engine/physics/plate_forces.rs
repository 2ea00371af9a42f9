// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Ridge-push/slab-pull/basal-drag force accumulation, torque-driven Euler-pole
// ABOUTME: rotation, and rigid-body velocity assignment for non-boundary plate members

use crate::engine::core::coords::{self, VoxelAddr};
use crate::engine::core::math::{LatLon, Vec3};
use crate::engine::core::planet::Planet;
use crate::engine::core::voxel::Material;

use super::constants::PLATE_MAX_SURFACE_SPEED_M_PER_YEAR;
use super::plates::PlateRegistry;
use super::rheology::base_viscosity;

const RIDGE_PUSH_TEMP_THRESHOLD: f64 = 1500.0;
const RIDGE_PUSH_COEFF: f64 = 1.0e13;
const SLAB_PULL_COEFF: f64 = 1.0e13;
const BASAL_DRAG_COEFF: f64 = 1.0e6;
const MOMENT_OF_INERTIA_FACTOR: f64 = 0.4;

fn position_of(planet: &Planet, addr: VoxelAddr) -> Vec3 {
    let shell = planet.shell(addr.shell);
    let latlon = coords::voxel_latlon(addr, &shell.layout);
    latlon.to_cartesian(shell.mean_radius())
}

/// Local north/east unit vectors in the Y-up Cartesian frame (spec §4.1 convention).
fn spherical_frame(ll: LatLon) -> (Vec3, Vec3) {
    let lat = ll.lat_deg.to_radians();
    let lon = ll.lon_deg.to_radians();
    let east = Vec3::new(-lon.sin(), 0.0, lon.cos());
    let north = Vec3::new(-lat.sin() * lon.cos(), lat.cos(), -lat.sin() * lon.sin());
    (north, east)
}

/// Accumulate per-plate torque, integrate angular velocity, and apply rigid rotation to
/// every non-boundary member voxel (spec §4.8). Boundary-voxel velocities are left for the
/// boundary-process pass.
pub fn step(planet: &mut Planet, registry: &mut PlateRegistry, dt_years: f64) {
    let dt_seconds = dt_years * crate::engine::backend::SECONDS_PER_YEAR;
    let planet_radius = planet.radius;
    let max_omega = (PLATE_MAX_SURFACE_SPEED_M_PER_YEAR
        / crate::engine::backend::SECONDS_PER_YEAR)
        / planet_radius.max(1.0);

    for plate in &mut registry.plates {
        if plate.members.is_empty() {
            continue;
        }

        let centroid_pos = LatLon::new(plate.centroid_lat_deg, plate.centroid_lon_deg)
            .to_cartesian(planet_radius);

        let mut torque = Vec3::zero();

        for &addr in &plate.boundary {
            let v = *planet.voxel(addr);
            let pos = position_of(planet, addr);
            let away_from_centroid = (pos - centroid_pos).normalize();
            let r_hat = pos.normalize();

            if v.temperature > RIDGE_PUSH_TEMP_THRESHOLD && v.v_radial > 0.0 {
                let force = away_from_centroid * (v.v_radial * RIDGE_PUSH_COEFF);
                torque = torque + pos.cross(&force);
            }
            if matches!(v.material, Material::Basalt) && v.v_radial < 0.0 {
                let force = r_hat * (-v.v_radial * v.density * SLAB_PULL_COEFF * 1.0e-3);
                torque = torque + pos.cross(&force);
            }
        }

        for &addr in &plate.members {
            let v = *planet.voxel(addr);
            let Some(below_addr) = planet.neighbors(addr).inward else {
                continue;
            };
            let below = planet.voxel(below_addr);
            let shell = planet.shell(addr.shell);
            let ll = coords::voxel_latlon(addr, &shell.layout);
            let (north_hat, east_hat) = spherical_frame(ll);
            let member_vel = north_hat * v.v_north + east_hat * v.v_east;
            let below_vel = north_hat * below.v_north + east_hat * below.v_east;
            let diff = member_vel - below_vel;
            let mu = base_viscosity(v.temperature);
            let drag = diff * (-mu * BASAL_DRAG_COEFF * 1.0e-21);
            let pos = position_of(planet, addr);
            torque = torque + pos.cross(&drag);
        }

        let moment_of_inertia = MOMENT_OF_INERTIA_FACTOR * plate.mass_kg.max(1.0) * planet_radius * planet_radius;
        let angular_accel = torque * (1.0 / moment_of_inertia);
        let mut new_omega = plate.omega + angular_accel * dt_seconds;
        let mag = new_omega.magnitude();
        if mag > max_omega && mag > 0.0 {
            new_omega = new_omega * (max_omega / mag);
        }
        plate.omega = new_omega;

        let omega_mag = plate.omega.magnitude();
        if omega_mag > 0.0 {
            let axis = plate.omega.normalize();
            let (_, pole) = LatLon::from_cartesian(axis);
            plate.euler_pole_lat_deg = pole.lat_deg;
            plate.euler_pole_lon_deg = pole.lon_deg;
            plate.angular_velocity = omega_mag;
        } else {
            plate.angular_velocity = 0.0;
        }

        let boundary_set: std::collections::HashSet<VoxelAddr> = plate.boundary.iter().copied().collect();
        for &addr in &plate.members {
            if boundary_set.contains(&addr) {
                continue;
            }
            let pos = position_of(planet, addr);
            let velocity = plate.omega.cross(&pos);
            let shell = planet.shell(addr.shell);
            let ll = coords::voxel_latlon(addr, &shell.layout);
            let (north_hat, east_hat) = spherical_frame(ll);
            let voxel = planet.voxel_mut(addr);
            voxel.v_north = velocity.dot(&north_hat);
            voxel.v_east = velocity.dot(&east_hat);
        }
    }
}
