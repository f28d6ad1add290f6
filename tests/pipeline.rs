use ndarray::Array3;
use voxel_volume::{
    ClassificationMap, LoadError, QuantizeWindow, RawSlice, SliceSource, VolumeParameterisation,
    VolumeStacker, VoxelArray, VoxelClassifier,
};

/// In-memory source producing a 3x2 slice filled with one Hounsfield value.
struct TestSource {
    modality: &'static str,
    z: f64,
    value: i16,
}

impl SliceSource for TestSource {
    fn tag(&self, key: &str) -> Option<String> {
        (key == "Modality").then(|| self.modality.to_owned())
    }

    fn stack_position(&self) -> Option<f64> {
        Some(self.z)
    }

    fn load(&self) -> Result<RawSlice, LoadError> {
        Ok(RawSlice::new(
            Array3::from_elem((1, 2, 3), self.value),
            [0.5, 0.5, 2.0],
            [-0.75, -0.5, self.z],
        ))
    }
}

fn materials() -> ClassificationMap<i16, &'static str> {
    let mut materials = ClassificationMap::new();
    materials.insert(-1000, "air");
    materials.insert(0, "water");
    materials.insert(1000, "bone");
    materials
}

/// Stack three tagged sources out of order, then drive every method of the
/// placement protocol against the result.
#[test]
fn stack_and_classify_end_to_end() {
    let sources = [
        TestSource {
            modality: "CT",
            z: 4.0,
            value: 1000,
        },
        TestSource {
            modality: "CT",
            z: 0.0,
            value: -1000,
        },
        TestSource {
            modality: "MR",
            z: 2.0,
            value: 77,
        },
        TestSource {
            modality: "CT",
            z: 2.0,
            value: -13,
        },
    ];

    let volume = VolumeStacker::stack(&sources, "Modality", "CT").unwrap();
    assert_eq!(volume.shape(), [3, 2, 3]);
    assert_eq!(volume.len(), 18);
    // In-plane recentred to the middle of the 1.5 x 1.0 mm extent; z to the
    // midpoint of the first (0.0) and last (4.0) slice.
    assert_eq!(volume.origin, [0.0, 0.0, 2.0]);
    assert_eq!(volume.spacing, [0.5, 0.5, 2.0]);

    let array = VoxelArray::from(volume);
    let map = materials();
    let window = QuantizeWindow {
        min: -1000,
        max: 2000,
        width: 25,
    };
    let classifier = VoxelClassifier::new(&array, &map, window);

    assert_eq!(classifier.cell_count(), 18);
    assert_eq!(classifier.cell_half_extents(), [0.25, 0.25, 1.0]);

    // One slice per material, ascending z; -13 buckets up to 0.
    assert_eq!(*classifier.classify_cell(0, 0, 0).unwrap(), "air");
    assert_eq!(*classifier.classify_cell(2, 1, 1).unwrap(), "water");
    assert_eq!(*classifier.classify_cell(0, 0, 2).unwrap(), "bone");

    // Linear-index path agrees with the coordinate path.
    let i = array.linear_index(2, 1, 1);
    assert_eq!(*classifier.classify_index(i).unwrap(), "water");

    // Setup probes at index -1 resolve like cell 0.
    assert_eq!(*classifier.classify_cell(-1, 0, 0).unwrap(), "air");
    assert_eq!(
        classifier.cell_translation(-1),
        classifier.cell_translation(0)
    );
}

#[test]
fn unmapped_bucket_surfaces_the_offending_value() {
    let sources = [TestSource {
        modality: "CT",
        z: 0.0,
        value: 333,
    }];
    let volume = VolumeStacker::stack(&sources, "Modality", "CT").unwrap();
    let array = VoxelArray::from(volume);
    let map = materials();
    let window = QuantizeWindow {
        min: -1000,
        max: 2000,
        width: 25,
    };
    let classifier = VoxelClassifier::new(&array, &map, window);

    let error = classifier.classify_cell(0, 0, 0).unwrap_err();
    assert!(error.to_string().contains("350"));
}
