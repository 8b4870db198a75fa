use micromeasure_designer::{
    Calibration, EditorState, LengthUnit, MeasurePolygon, MeasureRectangle, Point, Shape,
};
use tempfile::TempDir;

#[test]
fn test_export_file_lists_every_handle() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("coordinates.csv");

    let mut state = EditorState::new();
    state
        .add_shape(
            Shape::Rectangle(MeasureRectangle::new(Point::new(20.0, 20.0), 8.0, 4.0, 0.0)),
            Some("boxes"),
        )
        .unwrap();
    let triangle = MeasurePolygon::new(vec![
        Point::new(0.0, 0.0),
        Point::new(8.0, 0.0),
        Point::new(8.0, 8.0),
    ]);
    state.add_shape(Shape::Polygon(triangle), Some("cells")).unwrap();
    state.calibration = Calibration::new(8.0, 2.0, LengthUnit::Millimeter);

    state.export_coordinates_to_file(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "# units: mm, scaling factor: 0.25");
    assert_eq!(lines.len(), 2 + 4 + 3);
    assert!(lines[2..6].iter().all(|l| l.starts_with("boxes,0,")));
    assert_eq!(lines[6], "cells,0,0,0.000000,0.000000");
    assert_eq!(lines[8], "cells,0,2,2.000000,2.000000");
}

#[test]
fn test_uncalibrated_export_is_in_pixels() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("empty.csv");

    let state = EditorState::new();
    state.export_coordinates_to_file(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text, "# units: px, scaling factor: 1\n# structure,shape,point,x,y\n");
}

#[test]
fn test_export_to_missing_directory_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing").join("out.csv");
    assert!(EditorState::new().export_coordinates_to_file(&path).is_err());
}
