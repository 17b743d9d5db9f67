//! Crest-to-toe correspondence.
//!
//! Given a crest distance, [`Resolver::resolve`] answers which toe point the
//! stroke starting there should run to. Manual overrides always win; without
//! one the chosen [`Method`] decides.

use serde::{Deserialize, Serialize};
use slope_curve::CurveQuery;
use slope_math::{shortest_travel, wrap_distance, Point3, Tolerance};

use crate::error::{CurveRole, HatchError, Result};
use crate::overrides::{AdjustedRange, OverrideRangeSet};

/// How a crest distance is mapped to the toe when no override applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Closest toe point to the projected crest point.
    Perpendicular,
    /// Same correspondence as `Perpendicular`; the interactive adjuster
    /// starts from it.
    #[default]
    Elastic,
    /// Same fractional position along both curves.
    Proportional,
    /// Currently identical to `Proportional`.
    Hybrid,
}

impl Method {
    /// Whether this method uses the closest-point correspondence.
    pub fn is_closest_point(&self) -> bool {
        matches!(self, Method::Perpendicular | Method::Elastic)
    }
}

/// The crest and toe of one hatch.
#[derive(Debug, Clone, Copy)]
pub struct CurvePair<'a> {
    /// Upper/reference curve; strokes start here.
    pub crest: &'a dyn CurveQuery,
    /// Lower curve; strokes run towards it.
    pub toe: &'a dyn CurveQuery,
}

impl<'a> CurvePair<'a> {
    /// Pair up a crest and a toe.
    pub fn new(crest: &'a dyn CurveQuery, toe: &'a dyn CurveQuery) -> Self {
        Self { crest, toe }
    }

    /// Whether the two curves were drawn in opposite directions.
    ///
    /// Compares the projected start-to-end vectors. Closed curves have a
    /// zero chord and never count as opposite.
    pub fn is_opposite_direction(&self) -> bool {
        let crest = self.crest.end_point() - self.crest.start_point();
        let toe = self.toe.end_point() - self.toe.start_point();
        crest.dot(&toe) < 0.0
    }
}

/// Toe side of a resolved correspondence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    /// True 3D toe point.
    pub point: Point3,
    /// Projected distance of `point` along the toe.
    pub toe_dist: f64,
    /// Whether an override produced this correspondence.
    pub is_manual: bool,
}

/// Resolves crest distances to toe points for one curve pair.
///
/// Curve lengths and the toe's closedness are read once at construction.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    pair: CurvePair<'a>,
    crest_len: f64,
    toe_len: f64,
    toe_closed: bool,
    tol: Tolerance,
}

impl<'a> Resolver<'a> {
    /// Create a resolver with default tolerances.
    pub fn new(pair: CurvePair<'a>) -> Self {
        Self {
            pair,
            crest_len: pair.crest.length(),
            toe_len: pair.toe.length(),
            toe_closed: pair.toe.is_closed(),
            tol: Tolerance::DEFAULT,
        }
    }

    /// Use custom tolerances.
    pub fn with_tolerance(mut self, tol: Tolerance) -> Self {
        self.tol = tol;
        self
    }

    /// The curve pair.
    pub fn pair(&self) -> CurvePair<'a> {
        self.pair
    }

    /// Projected crest length.
    pub fn crest_length(&self) -> f64 {
        self.crest_len
    }

    /// Projected toe length.
    pub fn toe_length(&self) -> f64 {
        self.toe_len
    }

    /// Whether the toe is closed.
    pub fn toe_closed(&self) -> bool {
        self.toe_closed
    }

    /// Tolerances in use.
    pub fn tolerance(&self) -> &Tolerance {
        &self.tol
    }

    /// Resolve the toe point for `crest_dist`.
    ///
    /// The distance is first clamped into the crest. If an override covers
    /// it, the override decides regardless of `method`. `reverse_toe` only
    /// affects the proportional methods.
    pub fn resolve(
        &self,
        crest_dist: f64,
        method: Method,
        overrides: &OverrideRangeSet,
        reverse_toe: bool,
    ) -> Resolved {
        let d = self.tol.clamp_distance(crest_dist, self.crest_len);

        if let Some(range) = overrides.find(d) {
            return self.resolve_override(d, range);
        }

        let toe_dist = if method.is_closest_point() {
            let anchor = self.pair.crest.projected_point_at_dist(d);
            self.pair.toe.closest_dist(&anchor)
        } else {
            self.proportional_toe_dist(d, reverse_toe)
        };

        Resolved {
            point: self.pair.toe.point_at_dist(toe_dist),
            toe_dist,
            is_manual: false,
        }
    }

    /// Toe distance at the same fractional position as `crest_dist`.
    ///
    /// With `reverse_toe` the fraction is mirrored.
    pub fn proportional_toe_dist(&self, crest_dist: f64, reverse_toe: bool) -> f64 {
        let ratio = if self.tol.is_degenerate_span(self.crest_len) {
            0.0
        } else {
            crest_dist / self.crest_len
        };
        let ratio = if reverse_toe { 1.0 - ratio } else { ratio };
        self.tol.clamp_distance(ratio * self.toe_len, self.toe_len)
    }

    /// Toe distance a range maps `crest_dist` to on this pair's toe.
    ///
    /// On a closed toe the travel takes the shorter way around and the
    /// result is wrapped back onto the curve.
    pub fn override_toe_dist(&self, crest_dist: f64, range: &AdjustedRange) -> f64 {
        let t = self
            .tol
            .normalized_position(crest_dist, range.start_crest, range.end_crest);

        let toe_dist = if self.toe_closed {
            let travel = shortest_travel(range.start_toe, range.end_toe, self.toe_len);
            wrap_distance(range.start_toe + t * travel, self.toe_len)
        } else {
            range.start_toe + t * (range.end_toe - range.start_toe)
        };

        self.tol.clamp_distance(toe_dist, self.toe_len)
    }

    /// Reject a range that would bridge the gap of an open crest or toe.
    ///
    /// On an open curve both endpoints must lie on the curve and be at most
    /// half its length apart. Closed curves accept any range.
    pub fn check_override(&self, range: &AdjustedRange) -> Result<()> {
        let slack = self.tol.pick_slack;
        if !self.pair.crest.is_closed()
            && bridges_gap(range.start_crest, range.end_crest, self.crest_len, slack)
        {
            log::warn!(
                "override [{:.3}, {:.3}] bridges the open crest",
                range.start_crest,
                range.end_crest
            );
            return Err(HatchError::SeamCrossing(CurveRole::Crest));
        }
        if !self.toe_closed && bridges_gap(range.start_toe, range.end_toe, self.toe_len, slack) {
            log::warn!(
                "override toe {:.3} -> {:.3} bridges the open toe",
                range.start_toe,
                range.end_toe
            );
            return Err(HatchError::SeamCrossing(CurveRole::Toe));
        }
        Ok(())
    }

    fn resolve_override(&self, crest_dist: f64, range: &AdjustedRange) -> Resolved {
        let toe_dist = self.override_toe_dist(crest_dist, range);
        Resolved {
            point: self.pair.toe.point_at_dist(toe_dist),
            toe_dist,
            is_manual: true,
        }
    }
}

fn bridges_gap(a: f64, b: f64, length: f64, slack: f64) -> bool {
    let on_curve = |d: f64| d >= -slack && d <= length + slack;
    !(on_curve(a) && on_curve(b)) || (b - a).abs() > length / 2.0
}
