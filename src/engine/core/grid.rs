// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Flat-buffer storage for a single shell's ragged lat/lon voxel grid
// ABOUTME: Generalizes the PhysicsGrid<T> flat-layout pattern to per-band-varying longitude counts

/// Per-shell layout: how many latitude bands, and how many longitude cells in each band.
///
/// Longitude counts are reduced near the poles (spec.md §3) so the grid is ragged: unlike
/// `PhysicsGrid<T>`'s fixed width*height layout, indexing needs a precomputed prefix-sum
/// offset table to stay O(1) (spec.md §4.1).
#[derive(Clone, Debug)]
pub struct ShellLayout {
    /// Longitude count for each latitude band, band 0 = south pole to band L-1 = north pole.
    band_lon_counts: Vec<usize>,
    /// Prefix sums: `band_offset[i]` is the flat index of band i's first cell.
    /// Has `band_lon_counts.len() + 1` entries; the last entry is the shell's total voxel count.
    band_offsets: Vec<usize>,
}

impl ShellLayout {
    /// Build a layout from explicit per-band longitude counts.
    pub fn new(band_lon_counts: Vec<usize>) -> Self {
        let mut band_offsets = Vec::with_capacity(band_lon_counts.len() + 1);
        let mut offset = 0usize;
        band_offsets.push(0);
        for &count in &band_lon_counts {
            offset += count;
            band_offsets.push(offset);
        }
        Self {
            band_lon_counts,
            band_offsets,
        }
    }

    /// Build an approximately-equal-area layout: `base_lon_count` at the equator, tapering
    /// toward the poles proportional to `cos(lat)` (spec.md §3: "reduced near poles to keep
    /// voxel footprint roughly equal-area").
    pub fn equal_area(lat_bands: usize, base_lon_count: usize) -> Self {
        assert!(lat_bands > 0, "a shell needs at least one latitude band");
        let mut counts = Vec::with_capacity(lat_bands);
        for i in 0..lat_bands {
            let lat_deg = -90.0 + 180.0 * (i as f64 + 0.5) / lat_bands as f64;
            let lat_rad = lat_deg.to_radians();
            let scaled = (base_lon_count as f64 * lat_rad.cos()).round() as usize;
            counts.push(scaled.max(3));
        }
        Self::new(counts)
    }

    #[inline]
    pub fn lat_bands(&self) -> usize {
        self.band_lon_counts.len()
    }

    #[inline]
    pub fn lon_count(&self, band: usize) -> usize {
        self.band_lon_counts[band]
    }

    #[inline]
    pub fn total_voxels(&self) -> usize {
        *self.band_offsets.last().unwrap_or(&0)
    }

    /// Flat index of `(band, lon)`. O(1) via the precomputed offset table.
    #[inline]
    pub fn flat_index(&self, band: usize, lon: usize) -> usize {
        debug_assert!(band < self.lat_bands(), "latitude band out of range");
        let count = self.band_lon_counts[band];
        debug_assert!(count > 0, "empty latitude band");
        self.band_offsets[band] + (lon % count)
    }

    /// Inverse of `flat_index`: recover `(band, lon)` from a flat index.
    pub fn band_lon_of(&self, flat: usize) -> (usize, usize) {
        debug_assert!(flat < self.total_voxels(), "flat index out of range");
        // band_offsets is sorted; find the last offset <= flat.
        match self.band_offsets.binary_search(&flat) {
            Ok(band) => (band, 0),
            Err(insert_at) => {
                let band = insert_at - 1;
                (band, flat - self.band_offsets[band])
            }
        }
    }

    /// Remap a longitude index from this layout's band to a band with a different lon count,
    /// preserving relative angular position (spec.md §4.1: "longitude indices at neighboring
    /// shells are remapped by ratio because M may differ across shells/bands").
    pub fn remap_lon(lon: usize, from_count: usize, to_count: usize) -> usize {
        if from_count == to_count {
            return lon % to_count;
        }
        let frac = (lon as f64 + 0.5) / from_count as f64;
        ((frac * to_count as f64).floor() as usize).min(to_count.saturating_sub(1))
    }
}

/// Flat-layout storage for one shell's worth of per-voxel data of type `T`.
///
/// Mirrors the cache-friendly single-allocation design of the teacher's `PhysicsGrid<T>`
/// (engine/core/physics_grid.rs), adapted from a rectangular `width*height` layout to the
/// ragged per-band layout a spherical shell needs.
#[derive(Clone, Debug)]
pub struct ShellBuffer<T> {
    data: Vec<T>,
}

impl<T: Clone> ShellBuffer<T> {
    pub fn new(layout: &ShellLayout, default: T) -> Self {
        Self {
            data: vec![default; layout.total_voxels()],
        }
    }

    #[inline]
    pub fn get(&self, flat: usize) -> &T {
        debug_assert!(flat < self.data.len(), "ShellBuffer index out of bounds");
        unsafe { self.data.get_unchecked(flat) }
    }

    #[inline]
    pub fn get_mut(&mut self, flat: usize) -> &mut T {
        debug_assert!(flat < self.data.len(), "ShellBuffer index out of bounds");
        unsafe { self.data.get_unchecked_mut(flat) }
    }

    #[inline]
    pub fn set(&mut self, flat: usize, value: T) {
        *self.get_mut(flat) = value;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.data.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

}

impl<T: Clone + Send> ShellBuffer<T> {
    /// Rayon-parallel mutable iteration over every voxel slot in the shell, for the
    /// embarrassingly-parallel substeps that only ever write to the voxel they read
    /// (thermal, rheology, pressure, convection accumulate): the worker pool owns disjoint
    /// slices, so there is no cross-voxel write hazard within a substep.
    pub fn par_iter_mut(&mut self) -> rayon::slice::IterMut<'_, T> {
        use rayon::prelude::*;
        self.data.par_iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_prefix_sums_are_consistent() {
        let layout = ShellLayout::new(vec![4, 6, 6, 4]);
        assert_eq!(layout.total_voxels(), 20);
        assert_eq!(layout.flat_index(0, 0), 0);
        assert_eq!(layout.flat_index(1, 0), 4);
        assert_eq!(layout.flat_index(2, 0), 10);
        assert_eq!(layout.flat_index(3, 0), 16);
        assert_eq!(layout.band_lon_of(16), (3, 0));
        assert_eq!(layout.band_lon_of(19), (3, 3));
    }

    #[test]
    fn longitude_wraps_modulo_band_count() {
        let layout = ShellLayout::new(vec![5]);
        assert_eq!(layout.flat_index(0, 5), layout.flat_index(0, 0));
        assert_eq!(layout.flat_index(0, 6), layout.flat_index(0, 1));
    }

    #[test]
    fn equal_area_tapers_toward_poles() {
        let layout = ShellLayout::equal_area(8, 16);
        let equator_band = layout.lat_bands() / 2;
        let pole_band = 0;
        assert!(layout.lon_count(equator_band) >= layout.lon_count(pole_band));
    }

    #[test]
    fn remap_lon_preserves_relative_position() {
        assert_eq!(ShellLayout::remap_lon(0, 10, 10), 0);
        assert_eq!(ShellLayout::remap_lon(5, 10, 20), 11);
        assert_eq!(ShellLayout::remap_lon(9, 10, 5), 4);
    }
}
