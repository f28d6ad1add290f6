use crate::array::{IndexError, VoxelArray};

use num_traits::{NumCast, ToPrimitive};
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use thiserror::Error;

/// Caller-owned mapping from quantization bucket to classification object.
pub type ClassificationMap<T, C> = HashMap<T, C>;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("no classification for bucket {bucket} at cell {index}")]
    UnmappedBucket { bucket: String, index: usize },

    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Quantization parameters bound at classifier construction.
#[derive(Clone, Copy)]
pub struct QuantizeWindow<T> {
    pub min: T,
    pub max: T,
    pub width: T,
}

/// The cell-placement protocol a host volume-replication scheme consumes.
///
/// Five methods cover the whole integration surface: total cell count,
/// classification by linear index or by replicated 3-axis coordinate, fixed
/// per-cell half extents, and the translation of the `index`-th cell along
/// the nested axis. The coordinate methods assume the host replicates y
/// outermost, x in the middle and z innermost; that assignment is fixed per
/// instantiation, not negotiated per call.
pub trait VolumeParameterisation<C> {
    fn cell_count(&self) -> usize;

    fn classify_index(&self, index: usize) -> Result<&C, ClassifyError>;

    /// Classify by replicated coordinate. Negative indices clamp to zero:
    /// host replication machinery may probe index -1 during setup.
    fn classify_cell(&self, x: i64, y: i64, z: i64) -> Result<&C, ClassifyError>;

    fn cell_half_extents(&self) -> [f64; 3];

    /// Translation of the `index`-th nested cell. Negative indices clamp to
    /// zero, matching [`classify_cell`](VolumeParameterisation::classify_cell).
    fn cell_translation(&self, index: i64) -> f64;
}

/// Stateless per-call classifier over a voxel array and a caller-owned
/// classification map.
pub struct VoxelClassifier<'a, T, C> {
    array: &'a VoxelArray<T>,
    classes: &'a ClassificationMap<T, C>,
    window: QuantizeWindow<T>,
}

impl<'a, T, C> VoxelClassifier<'a, T, C> {
    pub fn new(
        array: &'a VoxelArray<T>,
        classes: &'a ClassificationMap<T, C>,
        window: QuantizeWindow<T>,
    ) -> Self {
        Self {
            array,
            classes,
            window,
        }
    }
}

impl<T, C> VolumeParameterisation<C> for VoxelClassifier<'_, T, C>
where
    T: Copy + PartialOrd + Eq + Hash + Display + ToPrimitive + NumCast,
{
    fn cell_count(&self) -> usize {
        self.array.len()
    }

    fn classify_index(&self, index: usize) -> Result<&C, ClassifyError> {
        let bucket =
            self.array
                .rounded_value(index, self.window.min, self.window.max, self.window.width)?;
        self.classes
            .get(&bucket)
            .ok_or_else(|| ClassifyError::UnmappedBucket {
                bucket: bucket.to_string(),
                index,
            })
    }

    fn classify_cell(&self, x: i64, y: i64, z: i64) -> Result<&C, ClassifyError> {
        let x = x.max(0) as usize;
        let y = y.max(0) as usize;
        let z = z.max(0) as usize;
        self.classify_index(self.array.linear_index(x, y, z))
    }

    fn cell_half_extents(&self) -> [f64; 3] {
        self.array.spacing.map(|s| s / 2.0)
    }

    fn cell_translation(&self, index: i64) -> f64 {
        let index = index.max(0);
        let [_, _, nz] = self.array.shape();
        let spacing = self.array.spacing;
        // TODO: the step term uses the x spacing while the recentring term
        // uses the z spacing and extent; review which axis convention the
        // replication order actually wants before generalizing.
        (2 * index + 1) as f64 * spacing[0] / 2.0 - spacing[2] * nz as f64 / 2.0
    }
}
