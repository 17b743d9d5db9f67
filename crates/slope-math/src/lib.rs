#![warn(missing_docs)]

//! Math types for slope hatching.
//!
//! Thin wrappers around nalgebra providing the point and vector types used
//! by the crest/toe engine, the tolerance constants that govern its
//! comparisons, and the small set of arc-length helpers shared by the
//! resolver, the override set and the sampler.

use nalgebra::{Vector2, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A point on the XY reference plane.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector on the XY reference plane.
pub type Vec2 = Vector2<f64>;

/// Tolerance constants for arc-length and geometric comparisons.
///
/// All values are absolute drawing units. They do not scale with curve
/// length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Distance kept from the end of a curve before any arc-length lookup.
    pub end_clamp: f64,
    /// Slack when testing whether a crest distance falls inside an override.
    pub range_match: f64,
    /// Crest spans shorter than this interpolate with `t = 0`.
    pub degenerate_span: f64,
    /// Overlap slack when splitting override ranges on insert.
    pub split: f64,
    /// Start/end gap under which a curve counts as closed.
    pub closed_gap: f64,
    /// Connecting vectors shorter than this produce no stroke.
    pub min_vector: f64,
    /// Drawn strokes must be longer than this to be emitted.
    pub min_stroke: f64,
    /// Slack when checking a picked crest distance against the draw range.
    pub pick_slack: f64,
}

impl Tolerance {
    /// Default slope tolerances.
    pub const DEFAULT: Self = Self {
        end_clamp: 1e-6,
        range_match: 0.01,
        degenerate_span: 0.001,
        split: 0.001,
        closed_gap: 0.01,
        min_vector: 0.001,
        min_stroke: 0.01,
        pick_slack: 0.001,
    };

    /// Check whether a span is too short to interpolate across.
    pub fn is_degenerate_span(&self, span: f64) -> bool {
        span.abs() < self.degenerate_span
    }

    /// Check whether two points close a curve (XY distance only).
    pub fn closes(&self, a: &Point3, b: &Point3) -> bool {
        (flatten(a) - flatten(b)).norm() < self.closed_gap
    }

    /// Clamp an arc-length distance into `[0, length - end_clamp]`.
    pub fn clamp_distance(&self, d: f64, length: f64) -> f64 {
        clamp_distance(d, length, self.end_clamp)
    }

    /// Normalized position of `value` between `start` and `end`.
    ///
    /// Returns `0.0` for degenerate spans.
    pub fn normalized_position(&self, value: f64, start: f64, end: f64) -> f64 {
        let span = end - start;
        if self.is_degenerate_span(span) {
            0.0
        } else {
            (value - start) / span
        }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Drop a point onto the XY reference plane (z = 0).
pub fn flatten(p: &Point3) -> Point3 {
    Point3::new(p.x, p.y, 0.0)
}

/// XY coordinates of a point.
pub fn to_point2(p: &Point3) -> Point2 {
    Point2::new(p.x, p.y)
}

/// Linear interpolation between two scalars.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Clamp an arc-length distance into `[0, length - eps]`.
///
/// Never returns a negative value, even when `length < eps`.
pub fn clamp_distance(d: f64, length: f64, eps: f64) -> f64 {
    d.min(length - eps).max(0.0)
}

/// Wrap a distance onto a closed curve of the given length, into `[0, length)`.
///
/// Lengths that are not positive leave the distance unchanged.
pub fn wrap_distance(d: f64, length: f64) -> f64 {
    if length <= 0.0 || !d.is_finite() {
        return d;
    }
    let wrapped = d.rem_euclid(length);
    // rem_euclid can round up to `length` for tiny negative inputs
    if wrapped >= length {
        0.0
    } else {
        wrapped
    }
}

/// Signed travel from `from` to `to` on a closed curve, taking the shorter way around.
///
/// The result lies in `[-length / 2, length / 2]`.
pub fn shortest_travel(from: f64, to: f64, length: f64) -> f64 {
    let mut travel = to - from;
    if length <= 0.0 {
        return travel;
    }
    let half = length / 2.0;
    while travel > half {
        travel -= length;
    }
    while travel < -half {
        travel += length;
    }
    travel
}
