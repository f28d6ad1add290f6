use crate::slice::RawSlice;
use crate::source::{LoadError, SliceSource};

use log::debug;
use ndarray::{Array3, s};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StackError {
    #[error("no sources matched {key} = {value}")]
    EmptyInput { key: String, value: String },

    #[error("in-plane shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: [usize; 2],
        found: [usize; 2],
    },

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// A 3D volume assembled from an ordered stack of slices.
///
/// Samples are indexed `(z, y, x)`; the flattened buffer keeps each slice's
/// row-major layout, slices in ascending stack order. The origin is the
/// physical centre of the volume in-plane and the midpoint of the first and
/// last slice along z.
pub struct StackedVolume {
    pub data: Array3<i16>,
    pub spacing: [f64; 3],
    pub origin: [f64; 3],
}

impl StackedVolume {
    /// Per-axis extents as `[x, y, z]`.
    pub fn shape(&self) -> [usize; 3] {
        let (nz, ny, nx) = self.data.dim();
        [nx, ny, nz]
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

pub struct VolumeStacker;

impl VolumeStacker {
    /// Stack every source whose `filter_key` tag equals `filter_value` into
    /// a single volume, ordered by position along the stacking axis.
    ///
    /// Sources without the tag, or with a different value, are dropped.
    /// Ascending position sort is stable, so equal (or missing) positions
    /// keep their input order. The z spacing is taken from the first slice's
    /// own metadata, not from inter-slice position deltas; non-uniformly
    /// spaced inputs are therefore mis-registered along z.
    ///
    /// # Errors
    ///
    /// [`StackError::EmptyInput`] when the filter matches nothing,
    /// [`StackError::ShapeMismatch`] when a slice disagrees in-plane with the
    /// first, and any [`LoadError`] aborts the whole stack.
    pub fn stack<S: SliceSource>(
        sources: &[S],
        filter_key: &str,
        filter_value: &str,
    ) -> Result<StackedVolume, StackError> {
        let mut selected: Vec<&S> = sources
            .iter()
            .filter(|source| source.tag(filter_key).as_deref() == Some(filter_value))
            .collect();

        if selected.is_empty() {
            return Err(StackError::EmptyInput {
                key: filter_key.to_owned(),
                value: filter_value.to_owned(),
            });
        }

        selected.sort_by(|a, b| {
            a.stack_position()
                .partial_cmp(&b.stack_position())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        debug!(
            "stacking {} of {} sources with {} = {}",
            selected.len(),
            sources.len(),
            filter_key,
            filter_value
        );

        let slices: Vec<RawSlice> = selected
            .iter()
            .map(|source| source.load())
            .collect::<Result<_, _>>()?;

        Self::assemble(slices)
    }

    fn assemble(slices: Vec<RawSlice>) -> Result<StackedVolume, StackError> {
        let first = &slices[0];
        let (_, ny, nx) = first.data.dim();
        let spacing = first.spacing;
        let first_position = first.origin[2];
        let mut origin = first.origin;

        let mut last_position = first_position;
        let mut nz = 0;
        for slice in &slices {
            let (dz, sy, sx) = slice.data.dim();
            if (sy, sx) != (ny, nx) {
                return Err(StackError::ShapeMismatch {
                    expected: [nx, ny],
                    found: [sx, sy],
                });
            }
            nz += dz;
            last_position = slice.origin[2];
        }

        let mut data = Array3::zeros((nz, ny, nx));
        let mut z = 0;
        for slice in slices {
            let dz = slice.data.dim().0;
            data.slice_mut(s![z..z + dz, .., ..]).assign(&slice.data);
            z += dz;
        }

        // Coerce the origin to the centre of the dataset.
        origin[0] += nx as f64 * spacing[0] / 2.0;
        origin[1] += ny as f64 * spacing[1] / 2.0;
        origin[2] = first_position + (last_position - first_position) / 2.0;

        Ok(StackedVolume {
            data,
            spacing,
            origin,
        })
    }
}
