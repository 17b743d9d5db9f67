//! User-authored crest-to-toe override ranges.
//!
//! An [`AdjustedRange`] replaces the default correspondence over a crest
//! interval with a linear map onto a toe interval. [`OverrideRangeSet`]
//! keeps the crest intervals of its ranges disjoint: inserting a range cuts
//! away whatever older coverage it overlaps, so the newest edit always
//! governs its own interval.
//!
//! On a closed toe the set must know the toe length (see
//! [`OverrideRangeSet::for_toe`]). Ranges are then stored unwrapped, so the
//! linear split below and the resolver's shortest-way rule agree on every
//! surviving remnant.

use serde::{Deserialize, Serialize};
use slope_curve::CurveQuery;
use slope_math::{lerp, shortest_travel, Tolerance};

/// A manual correspondence between a crest interval and a toe interval.
///
/// All four values are projected arc-length distances. The crest endpoints
/// may be given in either order; the toe is interpolated from `start_toe` at
/// `start_crest` to `end_toe` at `end_crest`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustedRange {
    /// Crest distance where the range begins.
    pub start_crest: f64,
    /// Crest distance where the range ends.
    pub end_crest: f64,
    /// Toe distance mapped to `start_crest`.
    pub start_toe: f64,
    /// Toe distance mapped to `end_crest`.
    pub end_toe: f64,
}

impl AdjustedRange {
    /// Create a new range.
    pub fn new(start_crest: f64, end_crest: f64, start_toe: f64, end_toe: f64) -> Self {
        Self {
            start_crest,
            end_crest,
            start_toe,
            end_toe,
        }
    }

    /// Lower end of the crest interval.
    pub fn min_crest(&self) -> f64 {
        self.start_crest.min(self.end_crest)
    }

    /// Upper end of the crest interval.
    pub fn max_crest(&self) -> f64 {
        self.start_crest.max(self.end_crest)
    }

    /// Whether `crest_dist` lies in the crest interval, widened by `slack` on both sides.
    pub fn contains(&self, crest_dist: f64, slack: f64) -> bool {
        crest_dist >= self.min_crest() - slack && crest_dist <= self.max_crest() + slack
    }

    /// Toe distance this range maps `crest_dist` to, by plain linear interpolation.
    ///
    /// Degenerate crest spans map everything to `start_toe`.
    pub fn toe_at(&self, crest_dist: f64, tol: &Tolerance) -> f64 {
        let t = tol.normalized_position(crest_dist, self.start_crest, self.end_crest);
        lerp(self.start_toe, self.end_toe, t)
    }

    /// Rewrite `end_toe` so the toe travel takes the shorter way around a
    /// closed toe of length `toe_length`.
    ///
    /// `start_toe = L - 1, end_toe = 1` becomes `end_toe = L + 1`.
    pub fn unwrapped(&self, toe_length: f64) -> Self {
        Self {
            end_toe: self.start_toe + shortest_travel(self.start_toe, self.end_toe, toe_length),
            ..*self
        }
    }
}

/// An ordered set of [`AdjustedRange`]s with pairwise disjoint crest intervals.
#[derive(Debug, Clone, Default)]
pub struct OverrideRangeSet {
    ranges: Vec<AdjustedRange>,
    tol: Tolerance,
    closed_toe: Option<f64>,
}

impl OverrideRangeSet {
    /// Create an empty set with default tolerances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set for ranges mapping onto `toe`.
    ///
    /// A closed toe makes the set unwrap every inserted range.
    pub fn for_toe(toe: &dyn CurveQuery) -> Self {
        let set = Self::new();
        if toe.is_closed() {
            set.with_closed_toe(toe.length())
        } else {
            set
        }
    }

    /// Treat the toe as closed with the given length.
    ///
    /// Ranges already in the set are unwrapped as well.
    pub fn with_closed_toe(mut self, toe_length: f64) -> Self {
        self.closed_toe = Some(toe_length);
        for range in &mut self.ranges {
            *range = range.unwrapped(toe_length);
        }
        self
    }

    /// Length of the closed toe, if the set was told about one.
    pub fn closed_toe(&self) -> Option<f64> {
        self.closed_toe
    }

    /// Use custom tolerances for splitting and lookup.
    pub fn with_tolerance(mut self, tol: Tolerance) -> Self {
        self.tol = tol;
        self
    }

    /// Tolerances in use.
    pub fn tolerance(&self) -> &Tolerance {
        &self.tol
    }

    /// Number of ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Check if the set has no ranges.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Ranges in insertion order (split remnants keep their owner's slot).
    pub fn ranges(&self) -> &[AdjustedRange] {
        &self.ranges
    }

    /// Iterate over the ranges.
    pub fn iter(&self) -> std::slice::Iter<'_, AdjustedRange> {
        self.ranges.iter()
    }

    /// Remove every range.
    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    /// Insert a range, cutting any existing coverage it overlaps.
    ///
    /// Each existing range is kept whole when it only touches the new crest
    /// interval (within the split tolerance). Otherwise the parts left and
    /// right of the new interval survive as separate ranges whose toe
    /// endpoints are re-interpolated from the old range, and the covered
    /// middle is dropped. The new range is appended last, unwrapped first
    /// when the toe is closed.
    pub fn insert(&mut self, range: AdjustedRange) {
        let range = match self.closed_toe {
            Some(toe_length) => range.unwrapped(toe_length),
            None => range,
        };
        let new_min = range.min_crest();
        let new_max = range.max_crest();
        let eps = self.tol.split;

        let mut rebuilt = Vec::with_capacity(self.ranges.len() + 2);
        for old in &self.ranges {
            let old_min = old.min_crest();
            let old_max = old.max_crest();

            if old_max <= new_min + eps || old_min >= new_max - eps {
                rebuilt.push(*old);
                continue;
            }

            if old_min < new_min {
                rebuilt.push(AdjustedRange::new(
                    old_min,
                    new_min,
                    old.toe_at(old_min, &self.tol),
                    old.toe_at(new_min, &self.tol),
                ));
            }
            if old_max > new_max {
                rebuilt.push(AdjustedRange::new(
                    new_max,
                    old_max,
                    old.toe_at(new_max, &self.tol),
                    old.toe_at(old_max, &self.tol),
                ));
            }
        }
        rebuilt.push(range);

        self.ranges = rebuilt;
    }

    /// The range governing `crest_dist`, if any.
    ///
    /// Ranges are matched with the lookup slack so grid samples sitting on a
    /// boundary still resolve. Where two neighbours both match, the most
    /// recently inserted one wins.
    pub fn find(&self, crest_dist: f64) -> Option<&AdjustedRange> {
        self.ranges
            .iter()
            .rev()
            .find(|r| r.contains(crest_dist, self.tol.range_match))
    }
}

impl Extend<AdjustedRange> for OverrideRangeSet {
    fn extend<I: IntoIterator<Item = AdjustedRange>>(&mut self, iter: I) {
        for range in iter {
            self.insert(range);
        }
    }
}

impl FromIterator<AdjustedRange> for OverrideRangeSet {
    fn from_iter<I: IntoIterator<Item = AdjustedRange>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a> IntoIterator for &'a OverrideRangeSet {
    type Item = &'a AdjustedRange;
    type IntoIter = std::slice::Iter<'a, AdjustedRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_disjoint(set: &OverrideRangeSet) {
        let eps = set.tolerance().split;
        for (i, a) in set.iter().enumerate() {
            for b in set.iter().skip(i + 1) {
                let overlap = a.max_crest().min(b.max_crest()) - a.min_crest().max(b.min_crest());
                assert!(
                    overlap <= eps + 1e-12,
                    "ranges {a:?} and {b:?} overlap by {overlap}"
                );
            }
        }
    }

    #[test]
    fn test_insert_into_empty() {
        let mut set = OverrideRangeSet::new();
        set.insert(AdjustedRange::new(20.0, 40.0, 15.0, 35.0));
        assert_eq!(set.len(), 1);
        assert_eq!(set.ranges()[0], AdjustedRange::new(20.0, 40.0, 15.0, 35.0));
    }

    #[test]
    fn test_partial_overlap_splits_left() {
        let mut set = OverrideRangeSet::new();
        set.insert(AdjustedRange::new(20.0, 40.0, 15.0, 35.0));
        set.insert(AdjustedRange::new(30.0, 50.0, 25.0, 45.0));

        assert_eq!(set.len(), 2);
        let left = set.ranges()[0];
        assert_relative_eq!(left.start_crest, 20.0);
        assert_relative_eq!(left.end_crest, 30.0);
        assert_relative_eq!(left.start_toe, 15.0);
        assert_relative_eq!(left.end_toe, 25.0);
        assert_eq!(set.ranges()[1], AdjustedRange::new(30.0, 50.0, 25.0, 45.0));
        // Nothing of the old range survives beyond 30
        assert!(set.iter().all(|r| r.max_crest() <= 30.0 || r.min_crest() >= 30.0));
        assert_disjoint(&set);
    }

    #[test]
    fn test_partial_overlap_splits_right() {
        let mut set = OverrideRangeSet::new();
        set.insert(AdjustedRange::new(20.0, 40.0, 100.0, 140.0));
        set.insert(AdjustedRange::new(10.0, 30.0, 0.0, 5.0));

        assert_eq!(set.len(), 2);
        let right = set.ranges()[0];
        assert_relative_eq!(right.start_crest, 30.0);
        assert_relative_eq!(right.end_crest, 40.0);
        assert_relative_eq!(right.start_toe, 120.0);
        assert_relative_eq!(right.end_toe, 140.0);
    }

    #[test]
    fn test_containing_insert_removes_old_range() {
        let mut set = OverrideRangeSet::new();
        set.insert(AdjustedRange::new(20.0, 40.0, 15.0, 35.0));
        set.insert(AdjustedRange::new(10.0, 50.0, 0.0, 80.0));
        assert_eq!(set.len(), 1);
        assert_eq!(set.ranges()[0], AdjustedRange::new(10.0, 50.0, 0.0, 80.0));
    }

    #[test]
    fn test_inner_insert_leaves_two_remnants() {
        let mut set = OverrideRangeSet::new();
        set.insert(AdjustedRange::new(0.0, 100.0, 0.0, 50.0));
        set.insert(AdjustedRange::new(40.0, 60.0, 90.0, 95.0));

        assert_eq!(set.len(), 3);
        let left = set.ranges()[0];
        let right = set.ranges()[1];
        assert_relative_eq!(left.end_crest, 40.0);
        assert_relative_eq!(left.end_toe, 20.0);
        assert_relative_eq!(right.start_crest, 60.0);
        assert_relative_eq!(right.start_toe, 30.0);
        assert_relative_eq!(right.end_toe, 50.0);
        assert_disjoint(&set);
    }

    #[test]
    fn test_touching_ranges_are_kept() {
        let mut set = OverrideRangeSet::new();
        set.insert(AdjustedRange::new(0.0, 10.0, 0.0, 10.0));
        // Overlaps by less than the split tolerance
        set.insert(AdjustedRange::new(9.9995, 20.0, 50.0, 60.0));
        assert_eq!(set.len(), 2);
        assert_eq!(set.ranges()[0], AdjustedRange::new(0.0, 10.0, 0.0, 10.0));
    }

    #[test]
    fn test_reversed_old_range_splits_by_extent() {
        let mut set = OverrideRangeSet::new();
        // Authored right to left
        set.insert(AdjustedRange::new(40.0, 20.0, 35.0, 15.0));
        set.insert(AdjustedRange::new(30.0, 50.0, 0.0, 0.0));

        assert_eq!(set.len(), 2);
        let left = set.ranges()[0];
        assert_relative_eq!(left.min_crest(), 20.0);
        assert_relative_eq!(left.max_crest(), 30.0);
        // Same correspondence as the old range
        assert_relative_eq!(left.toe_at(20.0, &Tolerance::DEFAULT), 15.0);
        assert_relative_eq!(left.toe_at(30.0, &Tolerance::DEFAULT), 25.0);
    }

    #[test]
    fn test_remnants_keep_old_correspondence() {
        let tol = Tolerance::DEFAULT;
        let old = AdjustedRange::new(0.0, 60.0, 10.0, 130.0);
        let mut set = OverrideRangeSet::new();
        set.insert(old);
        set.insert(AdjustedRange::new(25.0, 35.0, 0.0, 0.0));

        for i in 0..=60 {
            let d = i as f64;
            if (25.0..=35.0).contains(&d) {
                continue;
            }
            let remnant = set
                .iter()
                .find(|r| r.contains(d, 0.0) && r.start_toe != 0.0)
                .unwrap();
            assert_relative_eq!(remnant.toe_at(d, &tol), old.toe_at(d, &tol), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_repeated_overlapping_inserts_stay_disjoint() {
        // Deterministic pseudo-random sequence
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            (seed % 10_000) as f64 / 100.0
        };

        let mut set = OverrideRangeSet::new();
        for _ in 0..200 {
            let (a, b) = (next(), next());
            let (c, d) = (next(), next());
            set.insert(AdjustedRange::new(a, b, c, d));
            assert_disjoint(&set);
        }
    }

    #[test]
    fn test_find_prefers_newest_at_shared_boundary() {
        let mut set = OverrideRangeSet::new();
        set.insert(AdjustedRange::new(0.0, 10.0, 0.0, 10.0));
        set.insert(AdjustedRange::new(10.0, 20.0, 70.0, 80.0));
        let found = set.find(10.0).unwrap();
        assert_relative_eq!(found.start_toe, 70.0);
        // Lookup slack
        assert!(set.find(20.005).is_some());
        assert!(set.find(20.02).is_none());
    }

    #[test]
    fn test_unwrapped() {
        let r = AdjustedRange::new(0.0, 10.0, 99.0, 1.0).unwrapped(100.0);
        assert_relative_eq!(r.end_toe, 101.0);
        let r = AdjustedRange::new(0.0, 10.0, 1.0, 99.0).unwrapped(100.0);
        assert_relative_eq!(r.end_toe, -1.0);
        let r = AdjustedRange::new(0.0, 10.0, 10.0, 30.0).unwrapped(100.0);
        assert_relative_eq!(r.end_toe, 30.0);
    }

    #[test]
    fn test_closed_toe_insert_unwraps() {
        let mut set = OverrideRangeSet::new().with_closed_toe(100.0);
        set.insert(AdjustedRange::new(0.0, 20.0, 99.0, 1.0));
        assert_relative_eq!(set.ranges()[0].end_toe, 101.0);

        // Remnant stays on the short way round the seam
        set.insert(AdjustedRange::new(10.0, 20.0, 50.0, 60.0));
        let left = set.ranges()[0];
        assert_relative_eq!(left.start_toe, 99.0);
        assert_relative_eq!(left.end_toe, 100.0);
    }

    #[test]
    fn test_with_closed_toe_unwraps_existing() {
        let mut set = OverrideRangeSet::new();
        set.insert(AdjustedRange::new(0.0, 20.0, 99.0, 1.0));
        let set = set.with_closed_toe(100.0);
        assert_eq!(set.closed_toe(), Some(100.0));
        assert_relative_eq!(set.ranges()[0].end_toe, 101.0);
    }

    #[test]
    fn test_collect_inserts_in_order() {
        let set: OverrideRangeSet = vec![
            AdjustedRange::new(20.0, 40.0, 15.0, 35.0),
            AdjustedRange::new(30.0, 50.0, 25.0, 45.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 2);
    }
}
