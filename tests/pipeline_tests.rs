//! End-to-end blur through the facade re-exports.

use voxel_native::{BoundaryPolicy, ElementType, GaussianFilter, GridBuffer};

#[test]
fn blur_pipeline_through_facade() {
    let dims = [10, 8, 6];
    let mut input = GridBuffer::new(dims, ElementType::F32, 1).unwrap();
    input
        .fill_with(0, |x, y, z| ((x + y + z) % 5) as f32)
        .unwrap();
    let mut output = GridBuffer::new(dims, ElementType::F32, 1).unwrap();

    let filter = GaussianFilter::new()
        .unwrap()
        .with_params(1, 1.0)
        .unwrap()
        .with_boundary_policy(BoundaryPolicy::Renormalized);
    filter.apply(&input.view(), &mut output.view_mut()).unwrap();

    let before = input.to_f32_vec(0).unwrap();
    let after = output.to_f32_vec(0).unwrap();
    assert_eq!(before.len(), after.len());

    // Averaging keeps every voxel inside the input's value range.
    let (min, max) = before
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    for &v in &after {
        assert!(v >= min - 1e-4 && v <= max + 1e-4);
    }

    // And it actually smoothed: the blurred field varies less between
    // neighbors than the sawtooth input.
    let step = |samples: &[f32]| {
        samples
            .windows(2)
            .map(|w| (w[1] - w[0]).abs())
            .fold(0.0f32, f32::max)
    };
    assert!(step(&after) < step(&before));
}

#[test]
fn reconfigured_filter_reblurs_without_reconstruction() {
    let dims = [5, 5, 5];
    let mut input = GridBuffer::new(dims, ElementType::F32, 1).unwrap();
    input
        .fill_with(0, |x, y, z| if (x, y, z) == (2, 2, 2) { 1.0 } else { 0.0 })
        .unwrap();
    let mut output = GridBuffer::new(dims, ElementType::F32, 1).unwrap();

    let mut filter = GaussianFilter::new().unwrap();
    filter.set_radius(0).unwrap();
    filter.apply(&input.view(), &mut output.view_mut()).unwrap();
    assert_eq!(output.to_f32_vec(0).unwrap(), input.to_f32_vec(0).unwrap());

    filter.set_radius(1).unwrap();
    filter.set_sigma(0.8).unwrap();
    filter.apply(&input.view(), &mut output.view_mut()).unwrap();
    let blurred = output.to_f32_vec(0).unwrap();
    assert!(blurred[2 + 5 * 2 + 25 * 2] < 1.0);
    assert!(blurred[1 + 5 * 2 + 25 * 2] > 0.0);
}
