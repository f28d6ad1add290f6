//! # voxel-volume library
//!
//! This crate stacks 2D medical-image slices into a 3D scalar volume and
//! exposes it as a queryable, spatially-indexed structure for per-cell
//! material classification.
//!
//! Slices are decoded through the dicom-rs ecosystem, rescaled into a signed
//! 16-bit sample domain, filtered by an acquisition tag (typically
//! Modality), sorted by physical position along the stacking axis and
//! concatenated into one [`StackedVolume`] with a recentred physical origin.
//! The resulting [`VoxelArray`] maps 3-axis cell coordinates to linear
//! indices and quantizes raw values onto a fixed-width bucket grid, and a
//! [`VoxelClassifier`] resolves each bucket to a caller-supplied
//! classification object (e.g. a material descriptor) through the five
//! methods of [`VolumeParameterisation`] that a host volume-replication
//! scheme consumes.
//!
//! Sources other than DICOM files can participate by implementing
//! [`SliceSource`]; the stacker only needs tag reads, a stack position and a
//! decode.
//!
//! # Examples
//!
//! Stack all CT slices of a directory and classify the first cell:
//!
//! ```no_run
//! # use voxel_volume::{
//! #     ClassificationMap, DicomSource, QuantizeWindow, VolumeParameterisation,
//! #     VolumeStacker, VoxelArray, VoxelClassifier,
//! # };
//! let sources = DicomSource::scan_directory("dicom")
//!     .expect("should have opened files in directory");
//! let volume = VolumeStacker::stack(&sources, "Modality", "CT")
//!     .expect("should have stacked CT slices");
//! let array = VoxelArray::from(volume);
//!
//! let mut materials: ClassificationMap<i16, String> = ClassificationMap::new();
//! for bucket in (-1000..=2000).step_by(25) {
//!     materials.insert(bucket as i16, format!("material for {bucket} HU"));
//! }
//! let window = QuantizeWindow { min: -1000, max: 2000, width: 25 };
//! let classifier = VoxelClassifier::new(&array, &materials, window);
//! let material = classifier.classify_cell(0, 0, 0)
//!     .expect("bucket grid covers the clamped value range");
//! ```

pub mod array;
pub mod classify;
pub mod slice;
pub mod source;
pub mod stacker;

pub use crate::array::{IndexError, VoxelArray};
pub use crate::classify::{
    ClassificationMap, ClassifyError, QuantizeWindow, VolumeParameterisation, VoxelClassifier,
};
pub use crate::slice::RawSlice;
pub use crate::source::{DicomSource, LoadError, SliceSource};
pub use crate::stacker::{StackError, StackedVolume, VolumeStacker};
