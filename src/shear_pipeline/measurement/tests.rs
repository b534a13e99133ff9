use std::sync::{Arc, Mutex};
use std::time::Duration;

use approx::assert_abs_diff_eq;
use ndarray::{array, Array2};

use crate::shear_pipeline::common::error::{ErrorKind, Result, ShearError};
use crate::shear_pipeline::config::MeterConfig;
use crate::shear_pipeline::measurement::ShearMeter;
use crate::shear_pipeline::reference::{InMemoryDarkFrame, ReferenceFrameStore};
use crate::shear_pipeline::test_utils::{to_raw, two_spot_frame, CameraLog, MockCamera};

struct MockStore {
    should_fail: bool,
    dark: Array2<f64>,
}

impl ReferenceFrameStore for MockStore {
    fn load_dark(&self) -> Result<Array2<f64>> {
        if self.should_fail {
            return Err(ShearError::InputReadError("Mock read error".to_string()));
        }
        Ok(self.dark.clone())
    }
}

fn test_config(burst_size: usize) -> MeterConfig {
    MeterConfig::builder()
        .burst_size(burst_size)
        .warmup(Duration::ZERO)
        .build()
}

fn two_spot_meter() -> (ShearMeter<MockCamera>, Arc<Mutex<CameraLog>>) {
    let raw = to_raw(&two_spot_frame());
    let camera = MockCamera::new(vec![raw.clone(), raw]);
    let log = camera.log.clone();
    let meter =
        ShearMeter::new(camera, &InMemoryDarkFrame::zeros(1000, 1000), test_config(3)).unwrap();
    (meter, log)
}

#[test]
fn test_get_shear_end_to_end() {
    let (meter, log) = two_spot_meter();

    let shear = meter.get_shear(1.0, 30.0).unwrap();

    assert_abs_diff_eq!(shear.dx, 600.0, epsilon = 0.01);
    assert_abs_diff_eq!(shear.dy, 600.0, epsilon = 0.01);

    let log = log.lock().unwrap();
    assert_eq!(log.retrieved, 3);
    assert_eq!(log.opens, 1);
    assert_eq!(log.closes, 1);
}

#[test]
fn test_measure_reports_global_centroids() {
    let (meter, _) = two_spot_meter();

    let measurement = meter.measure(1.0, 30.0).unwrap();

    assert!(measurement.box_1.converged && measurement.box_2.converged);
    assert_abs_diff_eq!(measurement.box_1.centroid.x, 100.0, epsilon = 0.01);
    assert_abs_diff_eq!(measurement.box_2.centroid.y, 700.0, epsilon = 0.01);
    assert_eq!(measurement.shear.dx, measurement.box_2.centroid.x - measurement.box_1.centroid.x);
}

#[test]
fn test_call_parameters_reach_the_device() {
    let (meter, log) = two_spot_meter();

    meter.get_shear(2.0, 15.0).unwrap();

    let log = log.lock().unwrap();
    let settings = &log.configured[0];
    assert_eq!(settings.exposure_ms, 2.0);
    assert_eq!(settings.frame_rate_hz, 15.0);
    assert_eq!(settings.buffer_count, 80);
    assert!(log.timeouts.iter().all(|&t| t == Duration::from_secs_f64(5.0 / 15.0)));
}

#[test]
fn test_grab_frame_applies_dark_subtraction() {
    let camera = MockCamera::new(vec![array![[1u16, 3]], array![[3u16, 5]]]);
    let store = MockStore {
        should_fail: false,
        dark: array![[200.0, 100.0]],
    };
    let meter = ShearMeter::new(camera, &store, test_config(2)).unwrap();

    let frame = meter.grab_frame(1.0, 30.0).unwrap();

    assert_eq!(frame, array![[0.0, 156.0]]);
}

#[test]
fn test_dark_mismatch_is_configuration_error() {
    let camera = MockCamera::new(vec![Array2::<u16>::ones((2, 2))]);
    let log = camera.log.clone();
    let meter = ShearMeter::new(camera, &InMemoryDarkFrame::zeros(3, 3), test_config(2)).unwrap();

    let err = meter.grab_frame(1.0, 30.0).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(log.lock().unwrap().closes, 1);
}

#[test]
fn test_capture_timeout_propagates_without_retry() {
    let mut camera = MockCamera::new(vec![Array2::<u16>::ones((2, 2))]);
    camera.timeout_after = Some(1);
    let log = camera.log.clone();
    let meter = ShearMeter::new(camera, &InMemoryDarkFrame::zeros(2, 2), test_config(3)).unwrap();

    let err = meter.get_shear(1.0, 30.0).unwrap_err();

    assert!(matches!(err, ShearError::CaptureTimeout { .. }));
    let log = log.lock().unwrap();
    assert_eq!(log.opens, 1);
    assert_eq!(log.closes, 1);
}

#[test]
fn test_empty_burst_is_capture_failure() {
    let camera = MockCamera::new(vec![Array2::<u16>::ones((2, 2))]);
    let meter = ShearMeter::new(camera, &InMemoryDarkFrame::zeros(2, 2), test_config(0)).unwrap();

    let err = meter.grab_frame(1.0, 30.0).unwrap_err();

    assert!(matches!(err, ShearError::EmptyBurst));
    assert_eq!(err.kind(), ErrorKind::Capture);
}

#[test]
fn test_dark_frame_only_is_degenerate() {
    let camera = MockCamera::new(vec![Array2::<u16>::zeros((1000, 1000))]);
    let meter =
        ShearMeter::new(camera, &InMemoryDarkFrame::zeros(1000, 1000), test_config(2)).unwrap();

    let err = meter.get_shear(1.0, 30.0).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DegenerateRegion);
}

#[test]
fn test_store_failure_prevents_construction() {
    let camera = MockCamera::new(Vec::new());
    let store = MockStore {
        should_fail: true,
        dark: Array2::zeros((1, 1)),
    };

    let result = ShearMeter::new(camera, &store, test_config(1));

    assert!(matches!(result, Err(ShearError::InputReadError(_))));
}

#[test]
fn test_invalid_config_prevents_construction() {
    let camera = MockCamera::new(Vec::new());
    let config = MeterConfig::builder().spot_fwhm(0.0).build();

    let result = ShearMeter::new(camera, &InMemoryDarkFrame::zeros(1, 1), config);

    assert!(matches!(result, Err(ShearError::InvalidConfig(_))));
}

#[test]
fn test_same_frame_gives_identical_shear() {
    let (meter, log) = two_spot_meter();
    let frame = meter.grab_frame(1.0, 30.0).unwrap();

    let first = meter.shear_of_frame(&frame).unwrap();
    let second = meter.shear_of_frame(&frame).unwrap();

    assert_eq!(first.dx.to_bits(), second.dx.to_bits());
    assert_eq!(first.dy.to_bits(), second.dy.to_bits());
    assert_eq!(log.lock().unwrap().opens, 1);
}

#[test]
fn test_concurrent_callers_share_one_device() {
    let camera = MockCamera::new(vec![array![[1u16, 2], [3, 4]]]);
    let log = camera.log.clone();
    let meter = Arc::new(
        ShearMeter::new(camera, &InMemoryDarkFrame::zeros(2, 2), test_config(4)).unwrap(),
    );

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let meter = Arc::clone(&meter);
            scope.spawn(move || meter.grab_frame(1.0, 30.0).unwrap());
        }
    });

    let log = log.lock().unwrap();
    assert_eq!(log.opens, 4);
    assert_eq!(log.closes, 4);
    assert_eq!(log.retrieved, 16);
}
