//! Closed outline of the hatched region.
//!
//! The outline walks the crest forwards over the draw range and then the toe
//! backwards, always on the XY reference plane. Hosts use it to fill a
//! background mask behind the strokes.

use slope_math::{to_point2, Point2};

use crate::range::DrawRange;
use crate::resolve::{CurvePair, Resolver};

/// Mask outline on the XY plane: crest points forward, then toe points back.
///
/// The last vertex connects back to the first.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    /// Vertices in walking order.
    pub points: Vec<Point2>,
}

impl Outline {
    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the outline has no vertices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether there are enough vertices to enclose an area.
    pub fn is_closed_region(&self) -> bool {
        self.points.len() > 2
    }
}

/// Build the outline of the region between crest and toe over `range`.
///
/// Crest points are taken at `range.start + i * step` up to `range.end`.
/// Toe points are taken walking back from `range.end`, each at the
/// proportional toe position of its crest distance (mirrored when
/// `reverse_toe`). Overrides and the stroke method are not consulted.
///
/// Returns an empty outline for a non-positive step.
pub fn build_boundary(
    pair: CurvePair<'_>,
    range: DrawRange,
    step: f64,
    reverse_toe: bool,
) -> Outline {
    let resolver = Resolver::new(pair);
    let tol = *resolver.tolerance();
    let crest_len = resolver.crest_length();
    let range = range.clamped(crest_len);

    let mut points: Vec<Point2> = range
        .grid(step)
        .map(|d| {
            let d = tol.clamp_distance(d, crest_len);
            to_point2(&pair.crest.projected_point_at_dist(d))
        })
        .collect();

    let backward = range.grid_rev(step).map(|d| {
        let toe_dist = resolver.proportional_toe_dist(d, reverse_toe);
        to_point2(&pair.toe.projected_point_at_dist(toe_dist))
    });
    points.extend(backward);

    Outline { points }
}
