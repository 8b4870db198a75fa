use micromeasure_designer::{
    EditorState, LineKind, MeasureEllipse, MeasureLine, MeasureRectangle, Point, RegistryError,
    Shape, ShapeType,
};

fn rect(x: f64) -> Shape {
    Shape::Rectangle(MeasureRectangle::new(Point::new(x, 10.0), 4.0, 4.0, 0.0))
}

fn ellipse() -> Shape {
    Shape::Ellipse(MeasureEllipse::new(Point::new(50.0, 50.0), 4.0, 2.0, 0.0))
}

#[test]
fn test_structure_rejects_foreign_shape_type() {
    let mut state = EditorState::new();
    state.add_shape(rect(0.0), Some("cells")).unwrap();

    let err = state.add_shape(ellipse(), Some("cells")).unwrap_err();
    assert_eq!(
        err,
        RegistryError::TypeMismatch {
            structure: "cells".to_string(),
            existing: ShapeType::Rectangle,
            requested: ShapeType::Ellipse,
        }
    );
    assert_eq!(state.shapes.len(), 1);
    assert_eq!(state.undo_depth(), 1);

    state.add_shape(rect(20.0), Some("cells")).unwrap();
    let cells = state.structures.get("cells").unwrap();
    assert_eq!(cells.shape_type, ShapeType::Rectangle);
    assert_eq!(cells.members, vec![1, 2]);
}

#[test]
fn test_line_kinds_are_distinct_types() {
    let mut state = EditorState::new();
    let line = MeasureLine::new(LineKind::Line, vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0)]);
    state.add_shape(Shape::Line(line), Some("fibres")).unwrap();

    let angle = MeasureLine::new(
        LineKind::Angle,
        vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(5.0, 5.0)],
    );
    assert!(matches!(
        state.add_shape(Shape::Line(angle), Some("fibres")),
        Err(RegistryError::TypeMismatch { .. })
    ));
}

#[test]
fn test_blank_structure_name_is_rejected() {
    let mut state = EditorState::new();
    assert_eq!(
        state.add_shape(rect(0.0), Some("  ")),
        Err(RegistryError::InvalidName("  ".to_string()))
    );
    assert!(state.shapes.is_empty());
}

#[test]
fn test_generated_names_fill_gaps() {
    let mut state = EditorState::new();
    let a = state.add_shape(rect(0.0), None).unwrap();
    state.add_shape(ellipse(), None).unwrap();
    assert_eq!(state.structures.names(), vec!["structure_000", "structure_001"]);

    state.delete_shape(a).unwrap();
    assert_eq!(state.structures.names(), vec!["structure_001"]);
    state.add_shape(rect(5.0), None).unwrap();
    assert_eq!(state.structures.names(), vec!["structure_001", "structure_000"]);
}

#[test]
fn test_last_member_leaving_prunes_structure() {
    let mut state = EditorState::new();
    let a = state.add_shape(rect(0.0), Some("cells")).unwrap();
    let b = state.add_shape(rect(10.0), Some("cells")).unwrap();

    state.delete_shape(a).unwrap();
    assert_eq!(state.structures.find_object(b).unwrap(), ("cells".to_string(), 0));
    state.delete_shape(b).unwrap();
    assert!(!state.structures.contains("cells"));
    assert_eq!(
        state.structures.find_object(b),
        Err(RegistryError::ShapeNotFound(b))
    );

    state.undo();
    state.undo();
    assert_eq!(state.structures.get("cells").unwrap().members, vec![a, b]);
}

#[test]
fn test_rename_conflicts() {
    let mut state = EditorState::new();
    state.add_shape(rect(0.0), Some("cells")).unwrap();
    state.add_shape(ellipse(), Some("nuclei")).unwrap();

    assert_eq!(
        state.rename_structure("cells", "nuclei"),
        Err(RegistryError::NameTaken("nuclei".to_string()))
    );
    assert_eq!(
        state.rename_structure("missing", "x"),
        Err(RegistryError::StructureNotFound("missing".to_string()))
    );
    assert_eq!(state.undo_depth(), 2);

    state.rename_structure("cells", "boxes").unwrap();
    assert_eq!(state.structures.names(), vec!["boxes", "nuclei"]);
}
