#![warn(missing_docs)]

//! Arc-length curve queries for slope hatching.
//!
//! The hatch engine never looks inside a curve. It only asks the questions
//! in [`CurveQuery`]: how long the curve's projection onto the XY reference
//! plane is, where a given projected distance lands (on the projection and
//! on the true 3D curve), which projected distance is closest to a picked
//! point, and whether the curve is closed.
//!
//! Two concrete curves are provided for hosts without their own geometry
//! kernel and for tests: [`Polyline3d`] and [`Arc3d`]. [`CurveDef`] is their
//! serializable description.

pub mod arc;
pub mod def;
pub mod error;
pub mod polyline;

pub use arc::Arc3d;
pub use def::CurveDef;
pub use error::{CurveError, Result};
pub use polyline::Polyline3d;

use slope_math::{flatten, Point3, Tolerance};

/// Arc-length access to a crest or toe curve.
///
/// Every distance is measured along the curve's projection onto the XY
/// reference plane. The true 3D point for a projected distance is the point
/// of the unprojected curve at the same curve parameter.
pub trait CurveQuery: Send + Sync + std::fmt::Debug {
    /// Arc length of the projected curve.
    fn length(&self) -> f64;

    /// True 3D point at projected distance `d`.
    ///
    /// Distances outside `[0, length]` are clamped.
    fn point_at_dist(&self, d: f64) -> Point3;

    /// Point on the projected curve (z = 0) at projected distance `d`.
    fn projected_point_at_dist(&self, d: f64) -> Point3 {
        flatten(&self.point_at_dist(d))
    }

    /// Projected distance of the point on the projected curve closest to `p`.
    ///
    /// The elevation of `p` is ignored.
    fn closest_dist(&self, p: &Point3) -> f64;

    /// Start point of the projected curve.
    fn start_point(&self) -> Point3;

    /// End point of the projected curve.
    fn end_point(&self) -> Point3;

    /// Whether the curve was built closed.
    fn declared_closed(&self) -> bool;

    /// Clone into a boxed trait object.
    fn clone_box(&self) -> Box<dyn CurveQuery>;

    /// Whether the curve is closed, either by construction or because its
    /// start and end points (nearly) coincide.
    fn is_closed(&self) -> bool {
        self.declared_closed()
            || Tolerance::DEFAULT.closes(&self.start_point(), &self.end_point())
    }

    /// Closest point on the projected curve to `p`.
    fn closest_point(&self, p: &Point3) -> Point3 {
        self.projected_point_at_dist(self.closest_dist(p))
    }
}

impl Clone for Box<dyn CurveQuery> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
