use approx::assert_relative_eq;
use plate_prep::core::{stats, GrayImage};
use plate_prep::io::PrepReport;
use plate_prep::pipeline::{PipelineParams, PlatePreprocessor};
use plate_prep::{LabelingMode, ThresholdMethod};

const WIDTH: usize = 24;
const HEIGHT: usize = 10;
const BACKGROUND: u8 = 30;
const STROKE: u8 = 220;

/// Two bright 4x6 bars on a dark plate.
fn two_bars() -> GrayImage {
    let mut data = vec![BACKGROUND; WIDTH * HEIGHT];
    for y in 2..8 {
        for x in (4..8).chain(14..18) {
            data[y * WIDTH + x] = STROKE;
        }
    }
    GrayImage::from_raw(WIDTH, HEIGHT, data).unwrap()
}

#[test]
fn bars_become_two_foreground_components_in_both_modes() {
    let img = two_bars();
    for labeling in [LabelingMode::ForwardPropagation, LabelingMode::UnionFind] {
        let pre = PlatePreprocessor::new(PipelineParams {
            labeling,
            ..PipelineParams::default()
        });
        let result = pre.run(&img.view()).unwrap();
        assert_eq!(result.binary.count_foreground(), 48);
        assert_eq!(result.num_foreground_components(), 2, "{labeling:?}");
        for c in &result.foreground {
            assert_eq!(c.len(), 24);
            let [x0, y0, x1, y1] = c.bounding_box().unwrap();
            assert_eq!((x1 - x0, y0, y1), (3, 2, 7));
        }
    }
}

#[test]
fn default_ensemble_reports_each_selector() {
    let img = two_bars();
    let result = PlatePreprocessor::new(PipelineParams::default())
        .run(&img.view())
        .unwrap();
    let t = &result.thresholds;
    assert_eq!(t.len(), 5);
    assert_eq!(t.get(ThresholdMethod::Fixed), Some(127));
    assert_eq!(t.get(ThresholdMethod::Median), Some(BACKGROUND));
    assert_eq!(t.get(ThresholdMethod::Otsu), Some(BACKGROUND));
    assert_eq!(t.get(ThresholdMethod::GmmError), None);

    let mean = t.get(ThresholdMethod::Mean).unwrap();
    assert_relative_eq!(stats::mean(&img.view()), 68.0);
    assert_eq!(mean, 68);
}

#[test]
fn uniform_plate_has_no_foreground() {
    let img = GrayImage::filled(8, 4, 100).unwrap();
    let result = PlatePreprocessor::new(PipelineParams::default())
        .run(&img.view())
        .unwrap();
    assert_eq!(result.binary.count_foreground(), 0);
    assert_eq!(result.num_components(), 1);
    assert_eq!(result.num_foreground_components(), 0);
}

#[test]
fn single_method_pipeline_matches_plain_binarization() {
    let img = two_bars();
    let pre = PlatePreprocessor::new(PipelineParams {
        methods: vec![ThresholdMethod::Fixed],
        ..PipelineParams::default()
    });
    let result = pre.run(&img.view()).unwrap();
    let expected = plate_prep::threshold::binarize(&img.view(), 127).unwrap();
    assert_eq!(result.binary, expected);
}

#[test]
fn report_carries_points_only_on_request() {
    let img = two_bars();
    let params = PipelineParams::default();
    let result = PlatePreprocessor::new(params.clone())
        .run(&img.view())
        .unwrap();

    let mut report = PrepReport::new("bars.png", WIDTH, HEIGHT, params);
    report.set_result(&result, false);
    assert_eq!(report.num_foreground_components, Some(2));
    assert_eq!(report.foreground_pixels, Some(48));
    assert!(report.foreground_components.is_none());

    report.set_result(&result, true);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["thresholds"]["otsu"], 30);
    assert_eq!(json["foreground_components"][0]["points"][0]["x"], 4);
    assert_eq!(json["foreground_components"][0]["points"][0]["y"], 2);
}

#[cfg(feature = "image")]
#[test]
fn image_helper_matches_view_pipeline() {
    use plate_prep::gray::{gray_image_from_slice, preprocess_image};

    let img = two_bars();
    let gray = gray_image_from_slice(WIDTH as u32, HEIGHT as u32, &img.data).unwrap();
    let from_image = preprocess_image(&gray, PipelineParams::default()).unwrap();
    let from_view = PlatePreprocessor::new(PipelineParams::default())
        .run(&img.view())
        .unwrap();
    assert_eq!(from_image.binary, from_view.binary);
    assert_eq!(from_image.thresholds, from_view.thresholds);
}
