use ndarray::Array3;

/// One decoded image slice with its pixel geometry.
///
/// Samples are stored `(z, y, x)` so that the flattened buffer runs x-fastest,
/// matching the row-major layout of the source image. A plain 2D slice has a
/// z extent of 1. Sample values are already rescaled into the signed 16-bit
/// target domain by the loader.
pub struct RawSlice {
    /// Rescaled samples, indexed `(z, y, x)`.
    pub data: Array3<i16>,
    /// Physical size of one sample along x, y, z.
    pub spacing: [f64; 3],
    /// Physical position of the first sample along x, y, z.
    pub origin: [f64; 3],
}

impl RawSlice {
    pub fn new(data: Array3<i16>, spacing: [f64; 3], origin: [f64; 3]) -> Self {
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

    /// Total sample count.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
