use std::f32::consts::TAU;

/// Converts a wrapped encoder count in `[0, resolution)` to an angle in
/// radians in `[0, 2π)`.
pub fn wrapped_encoder_to_radians(count: u32, resolution: u32) -> f32 {
    (TAU * count as f32) / resolution as f32
}

/// Folds an angular error onto the shorter rotational direction.
///
/// Errors strictly beyond `max_error` in magnitude get a full turn
/// subtracted or added. An error exactly at the boundary is left untouched,
/// so the controller cannot flip between the two directions there.
pub fn shortest_rotation(error: f32, max_error: f32) -> f32 {
    if error > max_error {
        error - TAU
    } else if error < -max_error {
        error + TAU
    } else {
        error
    }
}
