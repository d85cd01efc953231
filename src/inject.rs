//! Brush overrides applied to the freshly written back grid.

use crate::grid::Grid;
use crate::pointer::PointerState;

/// B level written under a secondary press.
pub const SECONDARY_B: f32 = 0.4;

/// Whether the pixel at `(x, y)` lies inside a brush of `radius` centered
/// on `pointer`.
///
/// Both positions are divided by the shorter surface side, so the brush
/// stays circular on non-square surfaces. Cells are sampled at their
/// centers.
#[inline]
pub fn inside_brush(
    x: usize,
    y: usize,
    pointer: &PointerState,
    radius: f32,
    width: usize,
    height: usize,
) -> bool {
    let scale = width.min(height) as f32;
    let dx = (x as f32 + 0.5 - pointer.x) / scale;
    let dy = (y as f32 + 0.5 - pointer.y) / scale;
    (dx * dx + dy * dy).sqrt() < radius
}

/// Overwrite cells under the brush according to the active press flags.
/// Primary is applied last so it wins when both are held.
///
/// Returns the number of cells touched.
pub fn apply(grid: &mut Grid, pointer: &PointerState, radius: f32) -> usize {
    if !pointer.is_pressed() || radius.is_nan() || radius <= 0.0 {
        return 0;
    }
    let (w, h) = grid.dimensions();
    let r_px = radius * w.min(h) as f32;

    // pixel window that can contain the brush; everything else is skipped
    let x0 = (pointer.x - r_px - 1.0).floor().max(0.0) as usize;
    let y0 = (pointer.y - r_px - 1.0).floor().max(0.0) as usize;
    let x1 = ((pointer.x + r_px + 1.0).ceil().max(0.0) as usize).min(w);
    let y1 = ((pointer.y + r_px + 1.0).ceil().max(0.0) as usize).min(h);

    let mut touched = 0;
    for y in y0..y1 {
        for x in x0..x1 {
            if !inside_brush(x, y, pointer, radius, w, h) {
                continue;
            }
            let mut cell = grid.get(x, y);
            if pointer.secondary_pressed {
                cell.b = SECONDARY_B;
            }
            if pointer.primary_pressed {
                cell.a = 1.0;
                cell.b = 0.0;
            }
            grid.set(x, y, cell);
            touched += 1;
        }
    }
    touched
}
