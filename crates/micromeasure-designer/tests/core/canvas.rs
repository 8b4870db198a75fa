//! Pointer and key flows through the canvas controller.

use image::{Rgb, RgbImage};
use micromeasure_designer::{
    Canvas, DragState, EditorState, Key, LineKind, MeasureLine, MeasureRectangle,
    MeasurementShape, Modifiers, Outcome, Point, PointerEvent, RegistryError, Shape, Tool,
};

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn setup(tool: Tool) -> (EditorState, Canvas) {
    let mut state = EditorState::new();
    let mut canvas = Canvas::new();
    canvas.set_tool(&mut state, tool);
    (state, canvas)
}

fn drag(canvas: &mut Canvas, state: &mut EditorState, from: Point, to: Point) -> Outcome {
    canvas.pointer_press(state, PointerEvent::left(from));
    canvas.pointer_move(state, PointerEvent::left(to));
    canvas.pointer_release(state, PointerEvent::left(to))
}

fn click(canvas: &mut Canvas, state: &mut EditorState, at: Point) -> Outcome {
    canvas.pointer_press(state, PointerEvent::left(at));
    canvas.pointer_release(state, PointerEvent::left(at))
}

fn points(state: &EditorState, id: u64) -> Vec<Point> {
    state
        .shapes
        .get(id)
        .and_then(|obj| obj.shape.polyline())
        .map(|cp| cp.points().to_vec())
        .unwrap()
}

#[test]
fn test_line_created_by_drag() {
    let (mut state, mut canvas) = setup(Tool::Line);

    let outcome = drag(&mut canvas, &mut state, p(10.0, 10.0), p(30.0, 10.0));
    assert_eq!(outcome, Outcome::Created(1));
    assert_eq!(canvas.drag_state(), &DragState::Idle);

    let props = state.measurements(1).unwrap();
    assert_eq!(props.scalar("length"), Some(20.0));
    assert_eq!(props.scalar("angle"), Some(0.0));
    assert_eq!(state.structures.get("structure_000").unwrap().members, vec![1]);
    assert_eq!(state.undo_name(), Some("Create Shape"));

    assert!(canvas.undo(&mut state));
    assert!(state.shapes.is_empty());
    assert!(state.structures.is_empty());
    assert!(canvas.redo(&mut state));
    assert_eq!(points(&state, 1), vec![p(10.0, 10.0), p(30.0, 10.0)]);
}

#[test]
fn test_click_without_drag_waits_for_placement() {
    let (mut state, mut canvas) = setup(Tool::Rectangle);

    assert_eq!(click(&mut canvas, &mut state, p(100.0, 100.0)), Outcome::Nothing);
    assert_eq!(canvas.drag_state(), &DragState::PendingPlacement { id: 1 });
    assert!(!state.shapes.get(1).unwrap().visible);
    assert!(!state.can_undo());

    canvas.pointer_move(&mut state, PointerEvent::left(p(140.0, 120.0)));
    assert!(state.shapes.get(1).unwrap().visible);
    assert_eq!(click(&mut canvas, &mut state, p(140.0, 120.0)), Outcome::Created(1));

    let props = state.measurements(1).unwrap();
    assert_eq!(props.get("center").and_then(|v| v.as_point()), Some(p(120.0, 110.0)));
    assert_eq!(props.scalar("width"), Some(40.0));
    assert_eq!(props.scalar("height"), Some(20.0));
    assert_eq!(state.undo_depth(), 1);
}

#[test]
fn test_escape_cancels_unplaced_shape() {
    let (mut state, mut canvas) = setup(Tool::Ellipse);
    click(&mut canvas, &mut state, p(5.0, 5.0));

    assert_eq!(
        canvas.key_press(&mut state, Key::Escape),
        Outcome::CreationCancelled
    );
    assert!(state.shapes.is_empty());
    assert!(state.structures.is_empty());
    assert!(!state.can_undo());
    assert_eq!(canvas.selected_id(), None);
}

#[test]
fn test_angle_tool_commits_third_point() {
    let (mut state, mut canvas) = setup(Tool::Angle);

    drag(&mut canvas, &mut state, p(0.0, 0.0), p(10.0, 0.0));
    assert!(matches!(canvas.drag_state(), DragState::Constructing { id: 1, .. }));

    // the preview point follows the pointer
    canvas.pointer_move(&mut state, PointerEvent::left(p(10.0, 10.0)));
    let props = state.measurements(1).unwrap();
    assert!((props.scalar("angle").unwrap() - 90.0).abs() < 1e-9);

    assert_eq!(click(&mut canvas, &mut state, p(10.0, 10.0)), Outcome::PointCommitted(1));
    assert_eq!(canvas.drag_state(), &DragState::Idle);
    assert_eq!(points(&state, 1), vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0)]);
    assert_eq!(state.undo_name(), Some("Add Point"));

    canvas.undo(&mut state);
    assert_eq!(points(&state, 1), vec![p(0.0, 0.0), p(10.0, 0.0)]);
    canvas.redo(&mut state);
    assert_eq!(points(&state, 1).len(), 3);
}

#[test]
fn test_click_without_move_commits_release_position() {
    let (mut state, mut canvas) = setup(Tool::MultiLine);

    drag(&mut canvas, &mut state, p(0.0, 0.0), p(10.0, 0.0));
    assert_eq!(click(&mut canvas, &mut state, p(10.0, 10.0)), Outcome::PointCommitted(1));
    assert_eq!(click(&mut canvas, &mut state, p(0.0, 10.0)), Outcome::PointCommitted(1));
    canvas.key_press(&mut state, Key::Escape);

    assert_eq!(
        points(&state, 1),
        vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)]
    );
}

#[test]
fn test_polygon_closes_and_escape_drops_preview() {
    let (mut state, mut canvas) = setup(Tool::Polygon);

    drag(&mut canvas, &mut state, p(0.0, 0.0), p(10.0, 0.0));
    canvas.pointer_move(&mut state, PointerEvent::left(p(10.0, 10.0)));
    click(&mut canvas, &mut state, p(10.0, 10.0));
    assert!(matches!(canvas.drag_state(), DragState::Constructing { .. }));
    assert_eq!(points(&state, 1).len(), 4);

    assert_eq!(
        canvas.key_press(&mut state, Key::Escape),
        Outcome::ConstructionFinished(1)
    );
    assert_eq!(points(&state, 1), vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0)]);

    let props = state.measurements(1).unwrap();
    assert_eq!(props.scalar("area"), Some(50.0));
    let perimeter = props.scalar("perimeter").unwrap();
    assert!((perimeter - (20.0 + 200f64.sqrt())).abs() < 1e-9);
}

#[test]
fn test_move_pushes_undo_only_when_geometry_changes() {
    let (mut state, mut canvas) = setup(Tool::Select);
    let rect = Shape::Rectangle(MeasureRectangle::new(p(50.0, 50.0), 40.0, 40.0, 0.0));
    let id = state.add_shape(rect, None).unwrap();
    assert_eq!(state.undo_depth(), 1);

    assert_eq!(click(&mut canvas, &mut state, p(50.0, 50.0)), Outcome::Nothing);
    assert_eq!(canvas.selected_id(), Some(id));
    assert_eq!(state.undo_depth(), 1);

    let outcome = drag(&mut canvas, &mut state, p(50.0, 50.0), p(60.0, 55.0));
    assert_eq!(outcome, Outcome::Changed(id));
    assert_eq!(state.undo_depth(), 2);
    assert_eq!(state.shapes.get(id).unwrap().shape.center(), p(60.0, 55.0));

    canvas.undo(&mut state);
    assert_eq!(state.shapes.get(id).unwrap().shape.center(), p(50.0, 50.0));
}

#[test]
fn test_rotate_modifier_turns_from_grab_point() {
    let (mut state, mut canvas) = setup(Tool::Edit);
    let rect = Shape::Rectangle(MeasureRectangle::new(p(50.0, 50.0), 40.0, 20.0, 0.0));
    let id = state.add_shape(rect, None).unwrap();

    // select, then grab corner 1 and swing it a quarter turn counter-clockwise
    click(&mut canvas, &mut state, p(50.0, 50.0));
    let rotate = Modifiers {
        rotate: true,
        ..Modifiers::NONE
    };
    canvas.pointer_press(&mut state, PointerEvent::left(p(70.0, 60.0)));
    assert!(matches!(canvas.drag_state(), DragState::Handle { .. }));
    canvas.pointer_move(
        &mut state,
        PointerEvent::left(p(60.0, 30.0)).with_modifiers(rotate),
    );
    let outcome = canvas.pointer_release(&mut state, PointerEvent::left(p(60.0, 30.0)));
    assert_eq!(outcome, Outcome::Changed(id));

    let shape = &state.shapes.get(id).unwrap().shape;
    assert!((shape.angle() - 90.0).abs() < 1e-9);
    assert_eq!(shape.center(), p(50.0, 50.0));
    let props = shape.output_properties();
    assert!((props.scalar("width").unwrap() - 40.0).abs() < 1e-9);
    assert!((props.scalar("height").unwrap() - 20.0).abs() < 1e-9);
}

#[test]
fn test_handle_drag_resizes_against_opposite_corner() {
    let (mut state, mut canvas) = setup(Tool::Edit);
    let rect = Shape::Rectangle(MeasureRectangle::new(p(100.0, 100.0), 40.0, 20.0, 0.0));
    let id = state.add_shape(rect, None).unwrap();

    // corner 2 sits at (120, 90)
    click(&mut canvas, &mut state, p(100.0, 100.0));
    drag(&mut canvas, &mut state, p(120.0, 90.0), p(140.0, 120.0));
    let save = state.shapes.get(id).unwrap().shape.save();
    assert_eq!(
        save,
        micromeasure_designer::ShapeParams::Box {
            center: (110.0, 115.0),
            width: 60.0,
            height: -10.0,
            angle: 0.0,
        }
    );
}

#[test]
fn test_edit_right_click_removes_point_then_deletes() {
    let (mut state, mut canvas) = setup(Tool::Edit);
    let line = MeasureLine::new(
        LineKind::MultiLine,
        vec![p(0.0, 0.0), p(10.0, 0.0), p(20.0, 0.0)],
    );
    let id = state.add_shape(Shape::Line(line), Some("fibres")).unwrap();
    click(&mut canvas, &mut state, p(5.0, 0.0));

    let outcome = canvas.pointer_press(&mut state, PointerEvent::right(p(10.0, 0.0)));
    assert_eq!(outcome, Outcome::PointRemoved { id, index: 1 });
    assert_eq!(points(&state, id), vec![p(0.0, 0.0), p(20.0, 0.0)]);

    // a two-point polyline cannot lose a point, so the shape goes
    let outcome = canvas.pointer_press(&mut state, PointerEvent::right(p(20.0, 0.0)));
    assert_eq!(outcome, Outcome::Deleted(id));
    assert!(state.shapes.is_empty());
    assert!(!state.structures.contains("fibres"));

    canvas.undo(&mut state);
    assert_eq!(state.structures.get("fibres").unwrap().members, vec![id]);
    canvas.undo(&mut state);
    assert_eq!(points(&state, id).len(), 3);
}

#[test]
fn test_delete_key_removes_selected_shape() {
    let (mut state, mut canvas) = setup(Tool::Select);
    let rect = Shape::Rectangle(MeasureRectangle::new(p(50.0, 50.0), 40.0, 40.0, 0.0));
    let id = state.add_shape(rect, None).unwrap();

    assert_eq!(canvas.key_press(&mut state, Key::Delete), Outcome::Nothing);
    click(&mut canvas, &mut state, p(50.0, 50.0));
    assert_eq!(canvas.key_press(&mut state, Key::Delete), Outcome::Deleted(id));
    assert_eq!(canvas.selected_id(), None);
    assert_eq!(state.undo_name(), Some("Delete Shape"));
}

#[test]
fn test_structure_type_guard_rejects_creation() {
    let (mut state, mut canvas) = setup(Tool::Line);
    let rect = Shape::Rectangle(MeasureRectangle::new(p(50.0, 50.0), 10.0, 10.0, 0.0));
    state.add_shape(rect, Some("cells")).unwrap();
    canvas.set_active_structure(Some("cells".to_string()));

    let outcome = canvas.pointer_press(&mut state, PointerEvent::left(p(200.0, 200.0)));
    assert!(matches!(
        outcome,
        Outcome::CreationRejected(RegistryError::TypeMismatch { .. })
    ));
    assert_eq!(state.shapes.len(), 1);
    assert_eq!(canvas.drag_state(), &DragState::Idle);

    // retrying with another structure works
    canvas.set_active_structure(Some("fibres".to_string()));
    let outcome = drag(&mut canvas, &mut state, p(200.0, 200.0), p(220.0, 200.0));
    assert!(matches!(outcome, Outcome::Created(_)));
    assert_eq!(state.structures.names(), vec!["cells", "fibres"]);
}

#[test]
fn test_append_key_extends_selected_polyline() {
    let (mut state, mut canvas) = setup(Tool::Select);
    let line = MeasureLine::new(LineKind::MultiLine, vec![p(0.0, 0.0), p(10.0, 0.0)]);
    let id = state.add_shape(Shape::Line(line), None).unwrap();
    click(&mut canvas, &mut state, p(5.0, 0.0));

    canvas.pointer_move(&mut state, PointerEvent::left(p(15.0, 5.0)));
    assert_eq!(
        canvas.key_press(&mut state, Key::Char('a')),
        Outcome::AppendStarted(id)
    );
    canvas.pointer_move(&mut state, PointerEvent::left(p(20.0, 5.0)));
    assert_eq!(click(&mut canvas, &mut state, p(20.0, 5.0)), Outcome::PointCommitted(id));

    // multi-lines keep growing until escape
    canvas.key_press(&mut state, Key::Escape);
    assert_eq!(points(&state, id), vec![p(0.0, 0.0), p(10.0, 0.0), p(20.0, 5.0)]);
}

#[test]
fn test_identify_scaling_tool() {
    let (mut state, mut canvas) = setup(Tool::IdentifyScaling);
    let mut img = RgbImage::from_pixel(80, 5, Rgb([20, 20, 20]));
    for x in 10..60 {
        img.put_pixel(x, 2, Rgb([250, 250, 250]));
    }
    state.set_image(img);

    let outcome = canvas.pointer_press(&mut state, PointerEvent::left(p(30.5, 2.5)));
    assert_eq!(outcome, Outcome::ScaleBarDetected(50));
    assert_eq!(state.calibration.pixels, Some(50.0));
    assert!(state.scale_bar_overlay().is_some());

    let outcome = canvas.pointer_press(&mut state, PointerEvent::right(p(0.0, 0.0)));
    assert_eq!(outcome, Outcome::ScaleBarCleared);
    assert!(state.scale_bar.is_none());
    assert_eq!(state.calibration.pixels, Some(50.0));

    canvas.undo(&mut state);
    canvas.undo(&mut state);
    assert_eq!(state.calibration.pixels, None);
}

#[test]
fn test_set_origin_tool() {
    let (mut state, mut canvas) = setup(Tool::SetOrigin);
    let outcome = canvas.pointer_press(&mut state, PointerEvent::left(p(12.0, 7.0)));
    assert_eq!(outcome, Outcome::OriginSet(p(12.0, 7.0)));
    assert_eq!(state.origin, p(12.0, 7.0));
    canvas.undo(&mut state);
    assert_eq!(state.origin, Point::ORIGIN);
}

#[test]
fn test_move_tool_pans() {
    let (mut state, mut canvas) = setup(Tool::Move);
    canvas.pointer_press(&mut state, PointerEvent::left(p(10.0, 10.0)));
    let outcome = canvas.pointer_move(&mut state, PointerEvent::left(p(15.0, 8.0)));
    assert_eq!(outcome, Outcome::Pan(p(5.0, -2.0)));
    canvas.pointer_release(&mut state, PointerEvent::left(p(15.0, 8.0)));
    assert!(!state.can_undo());
}

#[test]
fn test_creation_tool_selects_before_resizing() {
    let (mut state, mut canvas) = setup(Tool::Rectangle);
    let rect = Shape::Rectangle(MeasureRectangle::new(p(100.0, 100.0), 40.0, 20.0, 0.0));
    let id = state.add_shape(rect, None).unwrap();

    // first press near an unselected corner grabs the whole shape
    canvas.pointer_press(&mut state, PointerEvent::left(p(120.0, 90.0)));
    assert!(matches!(canvas.drag_state(), DragState::Moving { .. }));
    canvas.pointer_release(&mut state, PointerEvent::left(p(120.0, 90.0)));
    assert_eq!(canvas.selected_id(), Some(id));
    assert_eq!(state.shapes.len(), 1);

    canvas.pointer_press(&mut state, PointerEvent::left(p(120.0, 90.0)));
    assert!(matches!(canvas.drag_state(), DragState::Handle { .. }));
}

#[test]
fn test_hidden_shapes_cannot_be_picked() {
    let (mut state, mut canvas) = setup(Tool::Select);
    let rect = Shape::Rectangle(MeasureRectangle::new(p(50.0, 50.0), 40.0, 40.0, 0.0));
    state.add_shape(rect, None).unwrap();
    state.hide_all_shapes();

    assert_eq!(click(&mut canvas, &mut state, p(50.0, 50.0)), Outcome::Nothing);
    assert_eq!(canvas.selected_id(), None);
}
