//! Factory functions for synthetic scalar fields and settings used in tests.
//!
//! Shapes are centred on the grid midpoint `resolution / 2`, which maps to the
//! world origin.

use shared::ReliefSettings;

use crate::field::ScalarField;

/// Every sample set to `value`.
pub fn uniform_field(resolution: usize, value: f64) -> ScalarField {
    ScalarField::from_fn(resolution, |_, _| value)
}

/// Filled disk of `radius` grid units.
pub fn disk_field(resolution: usize, radius: f64) -> ScalarField {
    let c = resolution as f64 / 2.0;
    ScalarField::from_fn(resolution, |x, y| {
        let (dx, dy) = (x as f64 - c, y as f64 - c);
        if dx * dx + dy * dy <= radius * radius {
            1.0
        } else {
            0.0
        }
    })
}

/// Square frame: filled where `inner_half < max(|dx|, |dy|) <= outer_half`.
pub fn square_with_hole_field(resolution: usize, outer_half: f64, inner_half: f64) -> ScalarField {
    let c = resolution as f64 / 2.0;
    ScalarField::from_fn(resolution, |x, y| {
        let d = (x as f64 - c).abs().max((y as f64 - c).abs());
        if d > inner_half && d <= outer_half {
            1.0
        } else {
            0.0
        }
    })
}

/// Square frame with a filled square island in its hole: three nested boundaries.
///
/// Radii are half-widths, outermost first.
pub fn nested_squares_field(resolution: usize, radii: [f64; 3]) -> ScalarField {
    let [outer, hole, island] = radii;
    let c = resolution as f64 / 2.0;
    ScalarField::from_fn(resolution, |x, y| {
        let d = (x as f64 - c).abs().max((y as f64 - c).abs());
        if d <= island || (d > hole && d <= outer) {
            1.0
        } else {
            0.0
        }
    })
}

/// Default settings in vector mode with the base slab switched on or off.
pub fn vector_settings(enable_base: bool) -> ReliefSettings {
    ReliefSettings {
        flat_top: true,
        enable_base,
        ..Default::default()
    }
}

/// Default settings in heightfield mode.
pub fn relief_settings() -> ReliefSettings {
    ReliefSettings {
        flat_top: false,
        ..Default::default()
    }
}
