use image::{Rgb, RgbImage};
use micromeasure_designer::{
    Calibration, EditorState, LengthUnit, LineKind, MeasureLine, MeasurePolygon,
    MeasureRectangle, MeasurementShape, Point, RotationDirection, SavedRecord, Shape,
    ShapeParams,
};
use tempfile::TempDir;

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn populated_state() -> EditorState {
    let mut state = EditorState::new();
    state.set_image(RgbImage::from_fn(6, 4, |x, y| {
        Rgb([(x * 40) as u8, (y * 60) as u8, 200])
    }));
    state
        .add_shape(
            Shape::Rectangle(MeasureRectangle::new(p(2.0, 1.0), 2.0, 1.0, 0.0)),
            Some("boxes"),
        )
        .unwrap();
    state
        .add_shape(
            Shape::Line(MeasureLine::new(
                LineKind::MultiLine,
                vec![p(0.0, 0.0), p(3.0, 1.0), p(5.0, 3.0)],
            )),
            Some("fibres"),
        )
        .unwrap();
    state
        .add_shape(
            Shape::Polygon(MeasurePolygon::new(vec![p(1.0, 1.0), p(4.0, 1.0), p(4.0, 3.0)])),
            None,
        )
        .unwrap();
    state.calibration = Calibration::new(4.0, 1.0, LengthUnit::Micrometer);
    state.set_origin(p(1.0, 2.0));
    state.rotate_image(RotationDirection::Clockwise);
    state
}

#[test]
fn test_save_and_load_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sample.json");

    let mut state = populated_state();
    state.save_to_file(&path).unwrap();
    assert!(!state.is_modified);
    assert_eq!(state.display_name(), "sample.json");

    let mut loaded = EditorState::new();
    loaded.load_from_file(&path).unwrap();

    assert_eq!(loaded.rotation_degrees(), 90);
    assert_eq!(loaded.image(), state.image());
    assert_eq!(loaded.source_image(), state.source_image());
    assert_eq!(loaded.origin, state.origin);
    assert_eq!(loaded.calibration, state.calibration);
    assert_eq!(loaded.structures.names(), vec!["boxes", "fibres", "structure_000"]);
    assert_eq!(loaded.document_name, "sample");
    assert!(!loaded.can_undo());

    let saved: Vec<Vec<Point>> = state.shapes.iter().map(|o| o.shape.handles()).collect();
    let restored: Vec<Vec<Point>> = loaded.shapes.iter().map(|o| o.shape.handles()).collect();
    for (a, b) in saved.iter().zip(&restored) {
        assert_eq!(a.len(), b.len());
        for (pa, pb) in a.iter().zip(b) {
            assert!(pa.approx_eq(pb, 1e-9));
        }
    }
    let rect = loaded.shapes.get(1).unwrap();
    match rect.shape.save() {
        ShapeParams::Box { width, height, angle, .. } => {
            assert_eq!((width, height), (2.0, 1.0));
            assert!((angle.to_degrees() - 270.0).abs() < 1e-9);
        }
        other => panic!("unexpected params {other:?}"),
    }
}

#[test]
fn test_failed_load_leaves_state_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let mut state = populated_state();
    let before = state.to_record();
    let depth = state.undo_depth();

    let garbage = temp_dir.path().join("garbage.json");
    std::fs::write(&garbage, b"not json").unwrap();
    assert!(state.load_from_file(&garbage).is_err());

    let bad_tag = temp_dir.path().join("bad_tag.json");
    std::fs::write(&bad_tag, br#"[null, [["x", [["hexagon", {"points": [], "point_count": 0}]]]]]"#)
        .unwrap();
    let err = state.load_from_file(&bad_tag).unwrap_err();
    assert!(format!("{err:#}").contains("hexagon"));

    let too_long = temp_dir.path().join("too_long.json");
    std::fs::write(&too_long, b"[null, [], null, null, 0, 1]").unwrap();
    let err = state.load_from_file(&too_long).unwrap_err();
    assert!(format!("{err:#}").contains("arity 6"));

    assert!(state.load_from_file(temp_dir.path().join("missing.json")).is_err());

    assert_eq!(state.to_record(), before);
    assert_eq!(state.undo_depth(), depth);
    assert!(state.current_file_path.is_none());
}

#[test]
fn test_two_element_record_loads_with_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("legacy.json");
    std::fs::write(
        &path,
        br#"[null, [["cells", [["ellipse", {"center": [10.0, 20.0], "width": 6.0, "height": 4.0, "angle": 0.0}]]]]]"#,
    )
    .unwrap();

    let mut state = populated_state();
    state.load_from_file(&path).unwrap();

    assert!(state.image().is_none());
    assert_eq!(state.rotation_degrees(), 0);
    assert_eq!(state.origin, Point::ORIGIN);
    assert_eq!(state.calibration, Calibration::default());
    assert_eq!(state.structures.names(), vec!["cells"]);
    assert_eq!(state.shapes.len(), 1);
    assert_eq!(state.shapes.get(1).unwrap().shape.center(), p(10.0, 20.0));
    assert_eq!(state.display_name(), "legacy.json");
}

#[test]
fn test_record_bytes_decode_to_the_same_record() {
    let state = populated_state();
    let record = state.to_record();
    let bytes = record.to_json().unwrap();
    let decoded = SavedRecord::from_json(&bytes).unwrap();
    assert_eq!(decoded.image, record.image);
    assert_eq!(decoded.calibration, record.calibration);
    assert_eq!(decoded.rotation_degrees, 90);
    assert_eq!(decoded.structures.len(), 3);
}
