//! Circular arcs with an optional linear elevation ramp.

use std::f64::consts::TAU;

use slope_math::{flatten, Point2, Point3};

use crate::error::{CurveError, Result};
use crate::CurveQuery;

/// A circular arc in the XY plane whose elevation varies linearly with arc length.
///
/// Parameterization by projected distance `d`:
/// `angle(d) = start_angle + sweep * d / length`,
/// `z(d) = z_start + (z_end - z_start) * d / length`.
///
/// A positive sweep runs counter-clockwise. A sweep of a full turn or more
/// is a closed circle.
#[derive(Debug, Clone)]
pub struct Arc3d {
    /// Center of the arc on the XY plane.
    pub center: Point2,
    /// Radius.
    pub radius: f64,
    /// Angle of the start point in radians.
    pub start_angle: f64,
    /// Signed swept angle in radians.
    pub sweep: f64,
    /// Elevation at the start point.
    pub z_start: f64,
    /// Elevation at the end point.
    pub z_end: f64,
}

impl Arc3d {
    /// Create a flat arc at z = 0.
    pub fn new(center: Point2, radius: f64, start_angle: f64, sweep: f64) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(CurveError::InvalidRadius(radius));
        }
        if sweep == 0.0 || !sweep.is_finite() {
            return Err(CurveError::ZeroSweep);
        }
        Ok(Self {
            center,
            radius,
            start_angle,
            sweep,
            z_start: 0.0,
            z_end: 0.0,
        })
    }

    /// Full counter-clockwise circle starting at angle 0.
    pub fn circle(center: Point2, radius: f64) -> Result<Self> {
        Self::new(center, radius, 0.0, TAU)
    }

    /// Set the elevation ramp.
    pub fn with_elevation(mut self, z_start: f64, z_end: f64) -> Self {
        self.z_start = z_start;
        self.z_end = z_end;
        self
    }

    fn is_full_turn(&self) -> bool {
        self.sweep.abs() >= TAU - 1e-9
    }

    fn point_at_angle(&self, angle: f64, z: f64) -> Point3 {
        let (sin_a, cos_a) = angle.sin_cos();
        Point3::new(
            self.center.x + self.radius * cos_a,
            self.center.y + self.radius * sin_a,
            z,
        )
    }
}

impl CurveQuery for Arc3d {
    fn length(&self) -> f64 {
        self.radius * self.sweep.abs()
    }

    fn point_at_dist(&self, d: f64) -> Point3 {
        let len = self.length();
        let u = (d / len).clamp(0.0, 1.0);
        self.point_at_angle(
            self.start_angle + self.sweep * u,
            self.z_start + (self.z_end - self.z_start) * u,
        )
    }

    fn closest_dist(&self, p: &Point3) -> f64 {
        let dx = p.x - self.center.x;
        let dy = p.y - self.center.y;
        let angle = dy.atan2(dx);
        let delta = ((angle - self.start_angle) * self.sweep.signum()).rem_euclid(TAU);
        let span = self.sweep.abs();

        if self.is_full_turn() || delta <= span {
            return (delta * self.radius).min(self.length());
        }

        // Outside the swept range: the nearer endpoint wins
        let q = flatten(p);
        let to_start = (q - self.start_point()).norm();
        let to_end = (q - self.end_point()).norm();
        if to_start <= to_end {
            0.0
        } else {
            self.length()
        }
    }

    fn start_point(&self) -> Point3 {
        self.point_at_angle(self.start_angle, 0.0)
    }

    fn end_point(&self) -> Point3 {
        self.point_at_angle(self.start_angle + self.sweep, 0.0)
    }

    fn declared_closed(&self) -> bool {
        self.is_full_turn()
    }

    fn clone_box(&self) -> Box<dyn CurveQuery> {
        Box::new(self.clone())
    }
}
