use micromeasure_core::EditorSettings;
use micromeasure_designer::{
    EditorState, LineKind, MeasureEllipse, MeasureLine, MeasureRectangle, MeasurementShape,
    Point, PropertyValue, Shape, ShapeParams, StructureRegistry,
};

#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    shapes: Vec<(u64, ShapeParams, bool)>,
    structures: StructureRegistry,
    origin: Point,
}

fn snapshot(state: &EditorState) -> Snapshot {
    Snapshot {
        shapes: state
            .shapes
            .iter()
            .map(|obj| (obj.id, obj.shape.save(), obj.visible))
            .collect(),
        structures: state.structures.clone(),
        origin: state.origin,
    }
}

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

type Op = fn(&mut EditorState);

fn operations() -> Vec<Op> {
    vec![
        |s| {
            let rect = MeasureRectangle::new(p(10.0, 10.0), 8.0, 4.0, 0.0);
            s.add_shape(Shape::Rectangle(rect), None).unwrap();
        },
        |s| {
            let ellipse = MeasureEllipse::new(p(30.0, 30.0), 6.0, 3.0, 0.5);
            s.add_shape(Shape::Ellipse(ellipse), Some("cells")).unwrap();
        },
        |s| s.set_origin(p(5.0, 5.0)),
        |s| {
            s.update_shape_property(1, "width", PropertyValue::Scalar(12.0))
                .unwrap();
        },
        |s| {
            let line = MeasureLine::new(LineKind::MultiLine, vec![p(0.0, 0.0), p(10.0, 0.0)]);
            s.add_shape(Shape::Line(line), Some("fibres")).unwrap();
        },
        |s| {
            s.insert_point(3, 2, p(10.0, 10.0)).unwrap();
        },
        |s| {
            s.remove_point(3, 0).unwrap();
        },
        |s| s.hide_all_shapes(),
        |s| s.rename_structure("cells", "nuclei").unwrap(),
        |s| s.delete_shape(2).unwrap(),
        |s| s.show_all_shapes(),
        |s| s.delete_all_shapes(),
    ]
}

#[test]
fn test_undo_and_redo_walk_back_through_every_state() {
    let mut state = EditorState::new();
    let mut states = vec![snapshot(&state)];
    for op in operations() {
        op(&mut state);
        states.push(snapshot(&state));
    }
    assert_eq!(state.undo_depth(), operations().len());

    for expected in states.iter().rev().skip(1) {
        assert!(state.undo());
        assert_eq!(&snapshot(&state), expected);
    }
    assert!(!state.undo());

    for expected in states.iter().skip(1) {
        assert!(state.redo());
        assert_eq!(&snapshot(&state), expected);
    }
    assert!(!state.redo());
}

#[test]
fn test_new_command_clears_redo() {
    let mut state = EditorState::new();
    state.set_origin(p(1.0, 1.0));
    state.set_origin(p(2.0, 2.0));
    state.undo();
    assert!(state.can_redo());

    state.set_origin(p(3.0, 3.0));
    assert!(!state.can_redo());
    assert_eq!(state.undo_depth(), 2);
}

#[test]
fn test_depth_limit_drops_oldest_commands() {
    let mut state = EditorState::new();
    let mut settings = EditorSettings::default();
    settings.history.max_depth = 3;
    state.set_settings(settings);

    for i in 1..=5 {
        state.set_origin(p(i as f64, 0.0));
    }
    assert_eq!(state.undo_depth(), 3);
    while state.undo() {}
    assert_eq!(state.origin, p(2.0, 0.0));
}

#[test]
fn test_command_names() {
    let mut state = EditorState::new();
    let rect = MeasureRectangle::new(p(10.0, 10.0), 8.0, 4.0, 0.0);
    let id = state.add_shape(Shape::Rectangle(rect), None).unwrap();
    assert_eq!(state.undo_name(), Some("Create Shape"));
    state.delete_shape(id).unwrap();
    assert_eq!(state.undo_name(), Some("Delete Shape"));
    state.undo();
    assert_eq!(state.redo_name(), Some("Delete Shape"));
}
