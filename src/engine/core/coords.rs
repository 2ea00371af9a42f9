// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Voxel addressing and the six-neighbor model across shells, latitude bands, and longitude
// ABOUTME: All lookups are O(1) given each shell's precomputed band-offset prefix sums

use super::grid::ShellLayout;
use super::math::LatLon;

/// Address of a single voxel: which shell, which latitude band, which longitude index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoxelAddr {
    pub shell: usize,
    pub band: usize,
    pub lon: usize,
}

impl VoxelAddr {
    pub fn new(shell: usize, band: usize, lon: usize) -> Self {
        Self { shell, band, lon }
    }
}

/// Latitude of band `i` out of `lat_bands`, per spec.md §4.1: `-90 + 180*(i+0.5)/L`.
pub fn band_latitude_deg(band: usize, lat_bands: usize) -> f64 {
    -90.0 + 180.0 * (band as f64 + 0.5) / lat_bands as f64
}

/// Longitude of index `j` out of `lon_count`, per spec.md §4.1: `-180 + 360*(j+0.5)/M`.
pub fn lon_longitude_deg(lon: usize, lon_count: usize) -> f64 {
    -180.0 + 360.0 * (lon as f64 + 0.5) / lon_count as f64
}

/// Angular address of a voxel, independent of radius.
pub fn voxel_latlon(addr: VoxelAddr, layout: &ShellLayout) -> LatLon {
    let lat = band_latitude_deg(addr.band, layout.lat_bands());
    let lon = lon_longitude_deg(addr.lon, layout.lon_count(addr.band));
    LatLon::new(lat, lon)
}

/// The six-neighbor set of a voxel address, each optional because shell/band edges have no
/// further neighbor in that direction (spec.md §4.1).
#[derive(Debug, Clone, Copy, Default)]
pub struct Neighbors {
    pub inward: Option<VoxelAddr>,
    pub outward: Option<VoxelAddr>,
    pub poleward: Option<VoxelAddr>,  // toward band - 1
    pub equatorward: Option<VoxelAddr>, // toward band + 1
    pub west: Option<VoxelAddr>,
    pub east: Option<VoxelAddr>,
}

/// Compute all in-range neighbors of `addr`, looking up per-shell layouts via `layout_of`.
///
/// `layout_of(shell)` must return `None` for out-of-range shell indices and `Some(&layout)`
/// otherwise; this lets callers pass a closure over a `Planet`'s shell vector without this
/// module depending on `Planet` directly.
pub fn neighbors_of<'a, F>(addr: VoxelAddr, layout_of: F) -> Neighbors
where
    F: Fn(usize) -> Option<&'a ShellLayout>,
{
    let layout = match layout_of(addr.shell) {
        Some(l) => l,
        None => return Neighbors::default(),
    };
    let lon_count = layout.lon_count(addr.band);

    let mut n = Neighbors::default();

    // Radial neighbors: longitude/band must be remapped by ratio since M can differ
    // across shells (spec.md §4.1).
    if addr.shell > 0 {
        if let Some(inner) = layout_of(addr.shell - 1) {
            let band = addr.band.min(inner.lat_bands().saturating_sub(1));
            let remapped = ShellLayout::remap_lon(addr.lon, lon_count, inner.lon_count(band));
            n.inward = Some(VoxelAddr::new(addr.shell - 1, band, remapped));
        }
    }
    if let Some(outer) = layout_of(addr.shell + 1) {
        let band = addr.band.min(outer.lat_bands().saturating_sub(1));
        let remapped = ShellLayout::remap_lon(addr.lon, lon_count, outer.lon_count(band));
        n.outward = Some(VoxelAddr::new(addr.shell + 1, band, remapped));
    }

    // Latitudinal neighbors: band 0 and L-1 have no further polar neighbor.
    if addr.band > 0 {
        let target_count = layout.lon_count(addr.band - 1);
        let remapped = ShellLayout::remap_lon(addr.lon, lon_count, target_count);
        n.poleward = Some(VoxelAddr::new(addr.shell, addr.band - 1, remapped));
    }
    if addr.band + 1 < layout.lat_bands() {
        let target_count = layout.lon_count(addr.band + 1);
        let remapped = ShellLayout::remap_lon(addr.lon, lon_count, target_count);
        n.equatorward = Some(VoxelAddr::new(addr.shell, addr.band + 1, remapped));
    }

    // Longitudinal neighbors wrap modulo M within the same band.
    if lon_count > 0 {
        let west = (addr.lon + lon_count - 1) % lon_count;
        let east = (addr.lon + 1) % lon_count;
        n.west = Some(VoxelAddr::new(addr.shell, addr.band, west));
        n.east = Some(VoxelAddr::new(addr.shell, addr.band, east));
    }

    n
}

/// The up-to-4 diagonal neighbors within the same shell (poleward/equatorward combined with
/// west/east), used alongside `.lateral()` to form the 8-connected neighborhood spec.md §4.10
/// (plate gap-fill) and §4.12 (coastal erosion) count against: "neighbors (of 8)".
///
/// Longitude is remapped by ratio into the target band first, matching the single-step
/// poleward/equatorward rule in `neighbors_of`, before applying the ±1 lateral offset in that
/// band's own longitude count.
pub fn diagonal_neighbors_same_shell(addr: VoxelAddr, layout: &ShellLayout) -> Vec<VoxelAddr> {
    let lon_count = layout.lon_count(addr.band);
    let mut out = Vec::with_capacity(4);
    for delta_band in [-1i64, 1i64] {
        let band = addr.band as i64 + delta_band;
        if band < 0 || band as usize >= layout.lat_bands() {
            continue;
        }
        let band = band as usize;
        let target_count = layout.lon_count(band);
        if target_count == 0 {
            continue;
        }
        let remapped = ShellLayout::remap_lon(addr.lon, lon_count, target_count);
        for delta_lon in [-1i64, 1i64] {
            let lon = ((remapped as i64 + delta_lon).rem_euclid(target_count as i64)) as usize;
            out.push(VoxelAddr::new(addr.shell, band, lon));
        }
    }
    out
}

impl Neighbors {
    /// All six slots flattened, skipping ones that don't exist.
    pub fn iter(&self) -> impl Iterator<Item = VoxelAddr> + '_ {
        [
            self.inward,
            self.outward,
            self.poleward,
            self.equatorward,
            self.west,
            self.east,
        ]
        .into_iter()
        .flatten()
    }

    /// The four in-shell lateral/longitudinal neighbors, used by flood-fill and boundary
    /// detection which only ever look within the lithosphere shell (spec.md §4.7).
    pub fn lateral(&self) -> impl Iterator<Item = VoxelAddr> + '_ {
        [self.poleward, self.equatorward, self.west, self.east]
            .into_iter()
            .flatten()
    }
}
