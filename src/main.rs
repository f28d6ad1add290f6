use voxel_volume::{
    ClassificationMap, DicomSource, QuantizeWindow, VolumeParameterisation, VolumeStacker,
    VoxelArray, VoxelClassifier,
};

/// Coarse Hounsfield-range material table over the bucket grid.
fn hounsfield_materials() -> ClassificationMap<i16, &'static str> {
    let mut materials = ClassificationMap::new();
    for bucket in (-1000..=2000).step_by(25) {
        let name = match bucket {
            ..=-901 => "air",
            ..=-101 => "lung",
            ..=-16 => "adipose",
            ..=99 => "soft tissue",
            ..=299 => "muscle",
            _ => "bone",
        };
        materials.insert(bucket as i16, name);
    }
    materials
}

fn main() {
    let directory = std::env::args().nth(1).unwrap_or_else(|| "dicom".to_owned());

    let sources =
        DicomSource::scan_directory(&directory).expect("should have opened files in directory");
    let volume =
        VolumeStacker::stack(&sources, "Modality", "CT").expect("should have stacked CT slices");
    let array = VoxelArray::from(volume);

    let [nx, ny, nz] = array.shape();
    println!("volume: {nx} x {ny} x {nz} cells");
    println!("spacing: {:?} mm", array.spacing);
    println!("origin:  {:?} mm", array.origin);

    let materials = hounsfield_materials();
    let window = QuantizeWindow {
        min: -1000,
        max: 2000,
        width: 25,
    };
    let classifier = VoxelClassifier::new(&array, &materials, window);

    let centre = array.linear_index(nx / 2, ny / 2, nz / 2);
    let material = classifier
        .classify_index(centre)
        .expect("bucket grid covers the clamped value range");
    println!("centre cell: {material}");
}
