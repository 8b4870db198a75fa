//! Editor state operations: rotation, origin-aware measurements, bulk commands.

use image::{Rgb, RgbImage};
use micromeasure_core::ScaleBarDirection;
use micromeasure_designer::scale_bar;
use micromeasure_designer::{
    Calibration, EditorState, LengthUnit, LineKind, MeasureEllipse, MeasureLine,
    MeasureRectangle, MeasurementShape, Point, PropertyValue, RotationDirection, Shape,
    ScaleBarParams, ShapeError, DesignerError,
};

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| Rgb([x as u8 * 10, y as u8 * 10, 7]))
}

fn bar_image() -> RgbImage {
    let mut img = RgbImage::from_pixel(80, 5, Rgb([20, 20, 20]));
    for x in 10..60 {
        img.put_pixel(x, 2, Rgb([250, 250, 250]));
    }
    img
}

fn changed_pixels(state: &EditorState) -> usize {
    let image = state.image().unwrap();
    let overlay = state.scale_bar_overlay().unwrap();
    image
        .pixels()
        .zip(overlay.pixels())
        .filter(|(a, b)| a != b)
        .count()
}

fn redetect(state: &EditorState) -> u32 {
    let params = &state.scale_bar.as_ref().unwrap().params;
    scale_bar::detect(state.image().unwrap(), params).pixels
}

#[test]
fn test_rotation_moves_shapes_origin_and_image() {
    let mut state = EditorState::new();
    let source = gradient(4, 2);
    state.set_image(source.clone());
    let rect = Shape::Rectangle(MeasureRectangle::new(p(1.0, 0.5), 1.0, 1.0, 0.0));
    let id = state.add_shape(rect, None).unwrap();
    state.set_origin(p(1.0, 1.0));
    let before = state.shapes.get(id).unwrap().shape.save();

    assert!(state.rotate_image(RotationDirection::Clockwise));
    assert_eq!(state.rotation_degrees(), 90);
    assert_eq!(state.image().unwrap().dimensions(), (2, 4));
    assert_eq!(state.origin, p(1.0, 1.0));
    let shape = &state.shapes.get(id).unwrap().shape;
    assert_eq!(shape.center(), p(1.5, 1.0));
    assert!((shape.angle() - 270.0).abs() < 1e-9);
    // pixel (x, y) of the source lands on (H - 1 - y, x)
    assert_eq!(state.image().unwrap().get_pixel(1, 3), source.get_pixel(3, 0));
    let after = shape.save();

    assert!(state.undo());
    assert_eq!(state.rotation_degrees(), 0);
    assert_eq!(state.image(), Some(&source));
    assert_eq!(state.origin, p(1.0, 1.0));
    assert_eq!(state.shapes.get(id).unwrap().shape.save(), before);

    assert!(state.redo());
    assert_eq!(state.shapes.get(id).unwrap().shape.save(), after);
    assert_eq!(state.rotation_degrees(), 90);
}

#[test]
fn test_rotation_needs_an_image() {
    let mut state = EditorState::new();
    assert!(!state.rotate_image(RotationDirection::CounterClockwise));
    assert!(!state.can_undo());
}

#[test]
fn test_four_counter_clockwise_turns_restore_everything() {
    let mut state = EditorState::new();
    let source = gradient(5, 3);
    state.set_image(source.clone());
    let line = MeasureLine::new(LineKind::Line, vec![p(0.5, 0.5), p(4.0, 2.0)]);
    let id = state.add_shape(Shape::Line(line), None).unwrap();

    for _ in 0..4 {
        state.rotate_image(RotationDirection::CounterClockwise);
    }
    assert_eq!(state.rotation_degrees(), 0);
    assert_eq!(state.image(), Some(&source));
    let points = state.shapes.get(id).unwrap().shape.handles();
    assert!(points[0].approx_eq(&p(0.5, 0.5), 1e-12));
    assert!(points[1].approx_eq(&p(4.0, 2.0), 1e-12));
}

#[test]
fn test_measurements_are_origin_relative_and_scaled() {
    let mut state = EditorState::new();
    let rect = Shape::Rectangle(MeasureRectangle::new(p(100.0, 100.0), 40.0, 20.0, 0.0));
    let id = state.add_shape(rect, None).unwrap();
    state.origin = p(50.0, 50.0);
    state.calibration = Calibration::new(10.0, 5.0, LengthUnit::Micrometer);

    let props = state.measurements(id).unwrap();
    assert_eq!(props.get("center"), Some(&PropertyValue::Pair(25.0, 25.0)));
    assert_eq!(props.scalar("width"), Some(20.0));
    assert_eq!(props.scalar("area"), Some(200.0));
    let area = props.iter().find(|prop| prop.name == "area").unwrap();
    assert_eq!(area.unit, "µm²");
    assert_eq!(props.scalar("angle"), Some(0.0));
}

#[test]
fn test_property_edit_maps_center_back_and_undoes() {
    let mut state = EditorState::new();
    let rect = Shape::Rectangle(MeasureRectangle::new(p(100.0, 100.0), 40.0, 20.0, 0.0));
    let id = state.add_shape(rect, None).unwrap();
    state.origin = p(50.0, 50.0);
    state.calibration = Calibration::new(10.0, 5.0, LengthUnit::Micrometer);

    state
        .update_shape_property(id, "center", PropertyValue::Pair(30.0, 25.0))
        .unwrap();
    assert_eq!(state.shapes.get(id).unwrap().shape.center(), p(110.0, 100.0));
    assert_eq!(state.undo_name(), Some("Update Shape Property"));

    state
        .update_shape_property(id, "width", PropertyValue::Scalar(10.0))
        .unwrap();
    assert_eq!(state.measurements(id).unwrap().scalar("width"), Some(10.0));

    let err = state
        .update_shape_property(id, "area", PropertyValue::Scalar(1.0))
        .unwrap_err();
    assert!(matches!(
        err,
        DesignerError::Shape(ShapeError::PropertyNotModifiable { .. })
    ));

    state.undo();
    state.undo();
    assert_eq!(state.shapes.get(id).unwrap().shape.center(), p(100.0, 100.0));
}

#[test]
fn test_delete_all_restores_order_and_structures() {
    let mut state = EditorState::new();
    let a = state
        .add_shape(
            Shape::Rectangle(MeasureRectangle::new(p(0.0, 0.0), 2.0, 2.0, 0.0)),
            Some("boxes"),
        )
        .unwrap();
    let b = state
        .add_shape(
            Shape::Ellipse(MeasureEllipse::new(p(5.0, 5.0), 2.0, 1.0, 0.0)),
            Some("cells"),
        )
        .unwrap();
    let c = state
        .add_shape(
            Shape::Rectangle(MeasureRectangle::new(p(9.0, 9.0), 2.0, 2.0, 0.0)),
            Some("boxes"),
        )
        .unwrap();
    let structures = state.structures.clone();

    state.delete_all_shapes();
    assert!(state.shapes.is_empty());
    assert!(state.structures.is_empty());

    assert!(state.undo());
    assert_eq!(state.shapes.ids(), vec![a, b, c]);
    assert_eq!(state.structures, structures);

    assert!(state.redo());
    assert!(state.shapes.is_empty());
}

#[test]
fn test_hide_and_show_all_are_undoable() {
    let mut state = EditorState::new();
    let a = state
        .add_shape(
            Shape::Rectangle(MeasureRectangle::new(p(0.0, 0.0), 2.0, 2.0, 0.0)),
            None,
        )
        .unwrap();
    let b = state
        .add_shape(
            Shape::Rectangle(MeasureRectangle::new(p(5.0, 5.0), 2.0, 2.0, 0.0)),
            None,
        )
        .unwrap();
    state.shapes.get_mut(b).unwrap().visible = false;

    state.show_all_shapes();
    assert!(state.shapes.iter().all(|obj| obj.visible));
    state.undo();
    assert!(state.shapes.get(a).unwrap().visible);
    assert!(!state.shapes.get(b).unwrap().visible);

    state.hide_all_shapes();
    assert!(state.shapes.iter().all(|obj| !obj.visible));
    state.undo();
    assert!(state.shapes.get(a).unwrap().visible);
}

#[test]
fn test_rename_structure_is_undoable() {
    let mut state = EditorState::new();
    let id = state
        .add_shape(
            Shape::Rectangle(MeasureRectangle::new(p(0.0, 0.0), 2.0, 2.0, 0.0)),
            None,
        )
        .unwrap();
    state.rename_structure("structure_000", "nuclei").unwrap();
    assert_eq!(state.structures.find_object(id).unwrap(), ("nuclei".to_string(), 0));

    state.undo();
    assert!(state.structures.contains("structure_000"));
    state.redo();
    assert!(state.structures.contains("nuclei"));
}

#[test]
fn test_point_insertion_and_removal() {
    let mut state = EditorState::new();
    let line = MeasureLine::new(LineKind::MultiLine, vec![p(0.0, 0.0), p(10.0, 0.0)]);
    let id = state.add_shape(Shape::Line(line), None).unwrap();

    assert_eq!(state.insert_point(id, 1, p(5.0, 5.0)).unwrap(), 1);
    assert_eq!(state.shapes.get(id).unwrap().shape.handles().len(), 3);
    assert_eq!(state.remove_point(id, 0).unwrap(), p(0.0, 0.0));
    assert!(state.remove_point(id, 0).is_err());

    state.undo();
    state.undo();
    assert_eq!(
        state.shapes.get(id).unwrap().shape.handles(),
        vec![p(0.0, 0.0), p(10.0, 0.0)]
    );

    let rect = Shape::Rectangle(MeasureRectangle::new(p(0.0, 0.0), 2.0, 2.0, 0.0));
    let rect_id = state.add_shape(rect, None).unwrap();
    assert!(state.insert_point(rect_id, 0, p(1.0, 1.0)).is_err());
}

#[test]
fn test_intensity_profile_uses_displayed_image() {
    let mut state = EditorState::new();
    state.set_image(RgbImage::from_pixel(10, 10, Rgb([90, 90, 90])));
    let line = MeasureLine::new(LineKind::Line, vec![p(0.5, 5.5), p(9.5, 5.5)]);
    let id = state.add_shape(Shape::Line(line), None).unwrap();

    let profile = state.intensity_profile(id).unwrap();
    assert!(!profile.is_empty());
    assert!(profile.values.iter().all(|v| (v - 90.0).abs() < 1e-9));
    assert!(state.intensity_profile(id + 1).is_none());
}

#[test]
fn test_modified_flag_and_display_name() {
    let mut state = EditorState::new();
    assert_eq!(state.display_name(), "Untitled");
    state.set_origin(p(1.0, 1.0));
    assert!(state.is_modified);
    assert_eq!(state.display_name(), "Untitled*");

    state.new_document();
    assert!(!state.is_modified);
    assert!(!state.can_undo());
    assert_eq!(state.origin, Point::ORIGIN);
}

#[test]
fn test_rotation_carries_scale_bar_to_the_same_pixels() {
    let mut state = EditorState::new();
    state.set_image(bar_image());
    let params = ScaleBarParams::absolute(p(30.0, 2.0), 30, ScaleBarDirection::Horizontal);
    assert_eq!(state.find_scale_bar(params), Some(50));
    assert_eq!(changed_pixels(&state), 50);

    state.rotate_image(RotationDirection::Clockwise);
    assert_eq!(redetect(&state), 50);
    assert_eq!(changed_pixels(&state), 50);

    state.rotate_image(RotationDirection::CounterClockwise);
    state.rotate_image(RotationDirection::CounterClockwise);
    assert_eq!(state.rotation_degrees(), 270);
    assert_eq!(redetect(&state), 50);
    assert_eq!(changed_pixels(&state), 50);

    state.rotate_image(RotationDirection::Clockwise);
    let restored = &state.scale_bar.as_ref().unwrap().params;
    assert_eq!(restored.seed_pixel(80, 5), Some((30, 2)));
    assert_eq!(restored.direction, ScaleBarDirection::Horizontal);
}

#[test]
fn test_scale_bar_misclick_keeps_calibration() {
    let mut state = EditorState::new();
    state.set_image(bar_image());
    assert_eq!(state.find_scale_bar_at(p(30.5, 2.5)), Some(50));
    let last_undo = state.undo_name().map(str::to_owned);

    assert_eq!(state.find_scale_bar_at(p(-4.0, 2.0)), None);
    assert_eq!(state.find_scale_bar_at(p(200.0, 2.0)), None);
    assert_eq!(state.calibration.pixels, Some(50.0));
    assert_eq!(state.scale_bar.as_ref().map(|d| d.pixels), Some(50));
    assert_eq!(state.undo_name().map(str::to_owned), last_undo);

    assert!(state.undo());
    assert!(!state.can_undo());
    assert_eq!(state.calibration.pixels, None);
}
