use crate::stacker::StackedVolume;

use ndarray::Array3;
use num_traits::{NumCast, ToPrimitive};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("linear index {index} out of range for volume of {len} cells")]
    OutOfRange { index: usize, len: usize },
}

/// A fixed-shape 3D container with linear-index access and value
/// quantization.
///
/// Cells are addressed either as `(x, y, z)` coordinates or as the linear
/// index `x + nx*y + nx*ny*z`; the two are interchangeable via
/// [`linear_index`]. Quantization buckets raw values onto a fixed-width grid
/// so that the set of distinct classification keys stays small regardless of
/// the samples' native resolution.
///
/// [`linear_index`]: VoxelArray::linear_index
pub struct VoxelArray<T> {
    data: Array3<T>,
    pub spacing: [f64; 3],
    pub origin: [f64; 3],
}

impl<T: Copy> VoxelArray<T> {
    pub fn new(data: Array3<T>, spacing: [f64; 3], origin: [f64; 3]) -> Self {
        Self {
            data,
            spacing,
            origin,
        }
    }

    /// Per-axis extents as `[x, y, z]`.
    pub fn shape(&self) -> [usize; 3] {
        let (nz, ny, nx) = self.data.dim();
        [nx, ny, nz]
    }

    /// Total cell count.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &Array3<T> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Array3<T> {
        &mut self.data
    }

    /// Linear index of cell `(x, y, z)`. Pure arithmetic; out-of-range
    /// coordinates produce out-of-range indices for the caller to handle.
    pub fn linear_index(&self, x: usize, y: usize, z: usize) -> usize {
        let [nx, ny, _] = self.shape();
        x + nx * y + nx * ny * z
    }

    /// Value at a linear index.
    pub fn value(&self, index: usize) -> Result<T, IndexError> {
        let [nx, ny, _] = self.shape();
        if index >= self.len() {
            return Err(IndexError::OutOfRange {
                index,
                len: self.len(),
            });
        }
        let x = index % nx;
        let y = (index / nx) % ny;
        let z = index / (nx * ny);
        Ok(self.data[[z, y, x]])
    }
}

impl<T> VoxelArray<T>
where
    T: Copy + PartialOrd + ToPrimitive + NumCast,
{
    /// Value at a linear index, clamped to `[min, max]` and quantized onto
    /// the grid of `width` multiples anchored at `min`.
    ///
    /// Values already on the grid stay put; anything inside a bucket moves
    /// up to the bucket's upper edge. Re-quantizing with the same parameters
    /// is a no-op.
    ///
    /// `max` must lie on the grid anchored at `min` (i.e. `max - min` a
    /// multiple of `width`); otherwise a value clamped to `max` ceilings to
    /// the grid point above it, exceeding the `(max - min) / width + 1`
    /// bucket bound.
    pub fn rounded_value(&self, index: usize, min: T, max: T, width: T) -> Result<T, IndexError> {
        let value = self.value(index)?;
        let clamped = if value < min {
            min
        } else if value > max {
            max
        } else {
            value
        };

        let offset = to_f64(clamped) - to_f64(min);
        let bucket = to_f64(min) + (offset / to_f64(width)).ceil() * to_f64(width);
        // The bucket is a finite grid point, so the cast back cannot fail.
        Ok(NumCast::from(bucket).unwrap_or(max))
    }
}

impl From<StackedVolume> for VoxelArray<i16> {
    fn from(volume: StackedVolume) -> Self {
        Self::new(volume.data, volume.spacing, volume.origin)
    }
}

fn to_f64<T: ToPrimitive>(value: T) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn array_with(values: &[i16]) -> VoxelArray<i16> {
        let mut data = Array3::zeros((1, 1, values.len()));
        for (x, &v) in values.iter().enumerate() {
            data[[0, 0, x]] = v;
        }
        VoxelArray::new(data, [1.0; 3], [0.0; 3])
    }

    #[test]
    fn linear_index_round_trips() {
        let array: VoxelArray<i16> =
            VoxelArray::new(Array3::zeros((3, 4, 5)), [1.0; 3], [0.0; 3]);
        let [nx, ny, _] = array.shape();
        let mut seen = vec![false; array.len()];
        for i in 0..array.len() {
            let x = i % nx;
            let y = (i / nx) % ny;
            let z = i / (nx * ny);
            assert_eq!(array.linear_index(x, y, z), i);
            assert!(!seen[i]);
            seen[i] = true;
        }
    }

    #[test]
    fn value_matches_coordinate_access() {
        let mut data = Array3::zeros((2, 3, 4));
        data[[1, 2, 3]] = 42;
        let array = VoxelArray::new(data, [1.0; 3], [0.0; 3]);
        let i = array.linear_index(3, 2, 1);
        assert_eq!(array.value(i).unwrap(), 42);
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let array = array_with(&[1, 2, 3]);
        assert!(matches!(
            array.value(3),
            Err(IndexError::OutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn quantization_boundary_values() {
        let array = array_with(&[-1000, 2013, 12, 0, -1013]);
        let round = |i| array.rounded_value(i, -1000, 2000, 25).unwrap();
        // Grid points stay put, above-range clamps to max, in-bucket values
        // move to the bucket's upper edge.
        assert_eq!(round(0), -1000);
        assert_eq!(round(1), 2000);
        assert_eq!(round(2), 25);
        assert_eq!(round(3), 0);
        assert_eq!(round(4), -1000);
    }

    #[test]
    fn quantization_is_idempotent() {
        let array = array_with(&[-987, -12, 13, 638, 1999]);
        for i in 0..array.len() {
            let once = array.rounded_value(i, -1000, 2000, 25).unwrap();
            let requantized = array_with(&[once]).rounded_value(0, -1000, 2000, 25).unwrap();
            assert_eq!(requantized, once);
        }
    }

    #[test]
    fn bucket_count_is_bounded() {
        let values: Vec<i16> = (-1100..2100).step_by(7).collect();
        let array = array_with(&values);
        let mut buckets = std::collections::HashSet::new();
        for i in 0..array.len() {
            buckets.insert(array.rounded_value(i, -1000, 2000, 25).unwrap());
        }
        assert!(buckets.len() <= (2000 + 1000) / 25 + 1);
    }
}
