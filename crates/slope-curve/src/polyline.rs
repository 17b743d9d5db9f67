//! Piecewise-linear 3D curves.

use slope_math::{flatten, Point3};

use crate::error::{CurveError, Result};
use crate::CurveQuery;

/// A 3D polyline, open or closed.
///
/// Arc length is measured on the XY projection. A projected distance maps to
/// a segment and a fraction along it, and the 3D point is interpolated on the
/// same segment at the same fraction, so elevation follows the vertices.
#[derive(Debug, Clone)]
pub struct Polyline3d {
    points: Vec<Point3>,
    closed: bool,
    /// Projected length from the start to each segment boundary.
    cumulative: Vec<f64>,
}

impl Polyline3d {
    /// Create a polyline. A closed polyline has an implicit segment from the
    /// last vertex back to the first.
    pub fn new(points: Vec<Point3>, closed: bool) -> Result<Self> {
        if points.len() < 2 {
            return Err(CurveError::TooFewPoints(points.len()));
        }

        let n_segments = if closed { points.len() } else { points.len() - 1 };
        let mut cumulative = Vec::with_capacity(n_segments + 1);
        cumulative.push(0.0);
        let mut total = 0.0;
        for i in 0..n_segments {
            let a = flatten(&points[i]);
            let b = flatten(&points[(i + 1) % points.len()]);
            total += (b - a).norm();
            cumulative.push(total);
        }

        if total <= 0.0 {
            return Err(CurveError::ZeroLength);
        }

        Ok(Self {
            points,
            closed,
            cumulative,
        })
    }

    /// Create an open polyline.
    pub fn open(points: Vec<Point3>) -> Result<Self> {
        Self::new(points, false)
    }

    /// Create a closed polyline.
    pub fn closed(points: Vec<Point3>) -> Result<Self> {
        Self::new(points, true)
    }

    /// Vertices in order.
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Number of segments, including the closing segment.
    pub fn segment_count(&self) -> usize {
        self.cumulative.len() - 1
    }

    fn segment(&self, i: usize) -> (Point3, Point3) {
        (self.points[i], self.points[(i + 1) % self.points.len()])
    }

    /// Segment index and fraction along it for a projected distance.
    fn locate(&self, d: f64) -> (usize, f64) {
        let total = self.length();
        let d = d.clamp(0.0, total);
        let last = self.segment_count() - 1;
        let seg = self
            .cumulative
            .partition_point(|&c| c <= d)
            .saturating_sub(1)
            .min(last);
        let seg_len = self.cumulative[seg + 1] - self.cumulative[seg];
        let frac = if seg_len < 1e-12 {
            0.0
        } else {
            ((d - self.cumulative[seg]) / seg_len).clamp(0.0, 1.0)
        };
        (seg, frac)
    }
}

impl CurveQuery for Polyline3d {
    fn length(&self) -> f64 {
        self.cumulative[self.cumulative.len() - 1]
    }

    fn point_at_dist(&self, d: f64) -> Point3 {
        let (seg, frac) = self.locate(d);
        let (a, b) = self.segment(seg);
        a + (b - a) * frac
    }

    fn closest_dist(&self, p: &Point3) -> f64 {
        let q = flatten(p);
        let mut best_dist = f64::INFINITY;
        let mut best_arc = 0.0;

        for i in 0..self.segment_count() {
            let (a, b) = self.segment(i);
            let a = flatten(&a);
            let ab = flatten(&b) - a;
            let len_sq = ab.norm_squared();
            let t = if len_sq < 1e-24 {
                0.0
            } else {
                ((q - a).dot(&ab) / len_sq).clamp(0.0, 1.0)
            };
            let dist = (q - (a + ab * t)).norm();
            if dist < best_dist {
                best_dist = dist;
                best_arc = self.cumulative[i] + t * (self.cumulative[i + 1] - self.cumulative[i]);
            }
        }

        best_arc
    }

    fn start_point(&self) -> Point3 {
        flatten(&self.points[0])
    }

    fn end_point(&self) -> Point3 {
        if self.closed {
            self.start_point()
        } else {
            flatten(&self.points[self.points.len() - 1])
        }
    }

    fn declared_closed(&self) -> bool {
        self.closed
    }

    fn clone_box(&self) -> Box<dyn CurveQuery> {
        Box::new(self.clone())
    }
}
