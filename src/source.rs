use crate::slice::RawSlice;

use dicom::{
    object::{FileDicomObject, InMemDicomObject, open_file},
    pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder},
};
use dicom_dictionary_std::tags;
use log::debug;
use ndarray::{Axis, s};
use std::{fs, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read source: {0}")]
    Read(#[from] dicom::object::ReadError),

    #[error("failed to decode pixel data: {0}")]
    Decode(#[from] dicom::pixeldata::Error),

    #[error("missing spacing information")]
    MissingSpacing,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An opaque slice source the stacker can filter, sort and decode.
///
/// Metadata reads are cheap and fallible-to-`None`; only [`load`] performs
/// the full pixel decode. Implementations rescale samples into the signed
/// 16-bit target domain regardless of the source's native encoding.
///
/// [`load`]: SliceSource::load
pub trait SliceSource {
    /// Read a scalar metadata tag by keyword. `None` when absent.
    fn tag(&self, key: &str) -> Option<String>;

    /// Physical position along the stacking axis, readable without a decode.
    fn stack_position(&self) -> Option<f64>;

    /// Decode geometry metadata and samples into a [`RawSlice`].
    fn load(&self) -> Result<RawSlice, LoadError>;
}

/// A [`SliceSource`] backed by an in-memory DICOM object.
pub struct DicomSource {
    object: FileDicomObject<InMemDicomObject>,
}

impl DicomSource {
    pub fn new(object: FileDicomObject<InMemDicomObject>) -> Self {
        Self { object }
    }

    /// Open a single DICOM file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Ok(Self::new(open_file(path.as_ref())?))
    }

    /// Open every `.dcm` file in a directory.
    ///
    /// Any unreadable file aborts the scan; the order of the returned
    /// sources is unspecified (the stacker sorts by position).
    pub fn scan_directory(path: impl AsRef<Path>) -> Result<Vec<Self>, LoadError> {
        let paths: Vec<_> = fs::read_dir(path.as_ref())?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("dcm"))
            })
            .collect();

        debug!("scanning {} .dcm candidates", paths.len());
        paths.iter().map(Self::from_file).collect()
    }

    fn rescale_coefficients(&self) -> (f64, f64) {
        let slope = self
            .object
            .element(tags::RESCALE_SLOPE)
            .ok()
            .and_then(|e| e.to_float64().ok())
            .unwrap_or(1.0);
        let intercept = self
            .object
            .element(tags::RESCALE_INTERCEPT)
            .ok()
            .and_then(|e| e.to_float64().ok())
            .unwrap_or(0.0);
        (slope, intercept)
    }

    fn spacing(&self) -> Result<[f64; 3], LoadError> {
        // PixelSpacing is [row spacing, column spacing], i.e. [y, x].
        let pixel_spacing = self
            .object
            .element(tags::PIXEL_SPACING)
            .ok()
            .and_then(|e| e.to_multi_float64().ok())
            .filter(|ps| ps.len() >= 2)
            .ok_or(LoadError::MissingSpacing)?;
        let thickness = self
            .object
            .element(tags::SLICE_THICKNESS)
            .ok()
            .and_then(|e| e.to_float64().ok())
            .ok_or(LoadError::MissingSpacing)?;

        Ok([pixel_spacing[1], pixel_spacing[0], thickness])
    }

    fn origin(&self) -> [f64; 3] {
        self.object
            .element(tags::IMAGE_POSITION_PATIENT)
            .ok()
            .and_then(|e| e.to_multi_float64().ok())
            .filter(|pos| pos.len() >= 3)
            .map(|pos| [pos[0], pos[1], pos[2]])
            .unwrap_or([0.0; 3])
    }
}

impl SliceSource for DicomSource {
    fn tag(&self, key: &str) -> Option<String> {
        let element = self.object.element_by_name(key).ok()?;
        // Strings carry DICOM padding.
        Some(element.to_str().ok()?.trim().to_owned())
    }

    fn stack_position(&self) -> Option<f64> {
        self.object
            .element(tags::IMAGE_POSITION_PATIENT)
            .ok()?
            .to_multi_float64()
            .ok()?
            .get(2)
            .copied()
    }

    fn load(&self) -> Result<RawSlice, LoadError> {
        let pixel_data = self.object.decode_pixel_data()?;
        // Raw stored values; the rescale is applied below so clamping lands
        // exactly on the i16 domain edges.
        let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
        let stored = pixel_data
            .to_ndarray_with_options::<f64>(&options)?
            .slice_move(s![0, .., .., 0]);

        let (slope, intercept) = self.rescale_coefficients();
        let samples = stored.mapv(|v| rescale_to_i16(v, slope, intercept));

        let spacing = self.spacing()?;
        let origin = self.origin();
        debug!(
            "decoded slice {:?} at z = {}",
            samples.dim(),
            origin[2]
        );

        Ok(RawSlice::new(samples.insert_axis(Axis(0)), spacing, origin))
    }
}

/// Apply the source's linear rescale and clamp into the i16 target domain.
fn rescale_to_i16(stored: f64, slope: f64, intercept: f64) -> i16 {
    (stored * slope + intercept)
        .clamp(f64::from(i16::MIN), f64::from(i16::MAX))
        .round() as i16
}
