//! Plain-text coordinate export.
//!
//! One comma-separated row per control point, grouped by structure:
//!
//! ```text
//! # units: µm, scaling factor: 0.2
//! # structure,shape,point,x,y
//! cells,0,0,1.000000,2.000000
//! ```
//!
//! Coordinates are relative to the origin and multiplied by the scaling factor.

use std::fmt::Write;

use crate::editor_state::EditorState;
use crate::model::MeasurementShape;

/// Renders the coordinate dump of every registered shape.
pub fn export_coordinates(state: &EditorState) -> String {
    let factor = state.scaling_factor();
    let unit = state.calibration.display_unit();
    let mut out = String::new();
    let _ = writeln!(out, "# units: {}, scaling factor: {}", unit, factor);
    let _ = writeln!(out, "# structure,shape,point,x,y");

    for structure in state.structures.iter() {
        for (shape_index, id) in structure.members.iter().enumerate() {
            let Some(obj) = state.shapes.get(*id) else {
                continue;
            };
            for (point_index, p) in obj.shape.handles().iter().enumerate() {
                let p = (*p - state.origin) * factor;
                let _ = writeln!(
                    out,
                    "{},{},{},{:.6},{:.6}",
                    structure.name, shape_index, point_index, p.x, p.y
                );
            }
        }
    }
    out
}
