//! The portion of the crest that receives strokes.

use serde::{Deserialize, Serialize};
use slope_curve::CurveQuery;
use slope_math::Point3;

/// An interval of projected crest distances, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawRange {
    /// Lower crest distance.
    pub start: f64,
    /// Upper crest distance.
    pub end: f64,
}

impl DrawRange {
    /// Create a range from two distances in either order.
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// The whole crest.
    pub fn entire(crest: &dyn CurveQuery) -> Self {
        Self::new(0.0, crest.length())
    }

    /// The crest between the points closest to `a` and `b`.
    pub fn segment(crest: &dyn CurveQuery, a: &Point3, b: &Point3) -> Self {
        Self::new(crest.closest_dist(a), crest.closest_dist(b))
    }

    /// Restrict to `[0, length]`.
    pub fn clamped(&self, length: f64) -> Self {
        Self {
            start: self.start.max(0.0),
            end: self.end.min(length),
        }
    }

    /// Length of the interval; negative if clamping emptied it.
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// Whether `d` lies in the interval widened by `slack`.
    pub fn contains(&self, d: f64, slack: f64) -> bool {
        d >= self.start - slack && d <= self.end + slack
    }

    /// Grid distances `start + i * step` that do not pass `end`.
    ///
    /// The last sample lands exactly on `end` only when the span is a
    /// multiple of `step`. A non-positive step yields nothing.
    pub fn grid(&self, step: f64) -> impl Iterator<Item = f64> {
        let range = *self;
        (0u64..).map_while(move |i| range.grid_point(step, i))
    }

    /// Grid distances `end - i * step` that do not pass `start`.
    pub fn grid_rev(&self, step: f64) -> impl Iterator<Item = f64> {
        let range = *self;
        (0u64..).map_while(move |i| {
            let d = range.end - i as f64 * step;
            (is_valid_step(step) && d >= range.start - GRID_SLACK).then_some(d)
        })
    }

    /// The `i`-th forward grid distance, or `None` once it passes `end`.
    pub(crate) fn grid_point(&self, step: f64, i: u64) -> Option<f64> {
        let d = self.start + i as f64 * step;
        (is_valid_step(step) && d <= self.end + GRID_SLACK).then_some(d)
    }
}

fn is_valid_step(step: f64) -> bool {
    step > 0.0 && step.is_finite()
}

/// Rounding slack for the last grid sample.
const GRID_SLACK: f64 = 1e-9;

#[cfg(test)]
mod tests {
    use super::*;
    use slope_curve::Polyline3d;

    #[test]
    fn test_new_orders_endpoints() {
        let r = DrawRange::new(40.0, 10.0);
        assert_eq!(r.start, 10.0);
        assert_eq!(r.end, 40.0);
        assert_eq!(r.span(), 30.0);
    }

    #[test]
    fn test_entire_and_segment() {
        let crest =
            Polyline3d::open(vec![Point3::new(0.0, 0.0, 3.0), Point3::new(50.0, 0.0, 3.0)])
                .unwrap();
        assert_eq!(DrawRange::entire(&crest), DrawRange::new(0.0, 50.0));

        let seg = DrawRange::segment(&crest, &Point3::new(30.0, 4.0, 0.0), &Point3::new(12.0, -2.0, 0.0));
        assert!((seg.start - 12.0).abs() < 1e-12);
        assert!((seg.end - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_clamped() {
        let r = DrawRange::new(-5.0, 120.0).clamped(100.0);
        assert_eq!(r, DrawRange::new(0.0, 100.0));
    }

    #[test]
    fn test_grid() {
        let samples: Vec<f64> = DrawRange::new(0.0, 100.0).grid(10.0).collect();
        assert_eq!(samples.len(), 11);
        assert_eq!(samples[10], 100.0);

        // Remainder is not sampled
        let samples: Vec<f64> = DrawRange::new(0.0, 25.0).grid(10.0).collect();
        assert_eq!(samples, vec![0.0, 10.0, 20.0]);

        assert_eq!(DrawRange::new(0.0, 25.0).grid(0.0).count(), 0);
        assert_eq!(DrawRange::new(5.0, 5.0).grid(1.0).count(), 1);
    }

    #[test]
    fn test_grid_does_not_accumulate_error() {
        let count = DrawRange::new(0.0, 1.0).grid(0.1).count();
        assert_eq!(count, 11);
    }

    #[test]
    fn test_grid_rev() {
        let samples: Vec<f64> = DrawRange::new(20.0, 45.0).grid_rev(10.0).collect();
        assert_eq!(samples, vec![45.0, 35.0, 25.0]);
        assert_eq!(DrawRange::new(0.0, 25.0).grid_rev(-1.0).count(), 0);
        assert_eq!(DrawRange::new(0.0, 1.0).grid_rev(0.1).count(), 11);
    }
}
