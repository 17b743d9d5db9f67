//! Interactive adjustment of the crest-to-toe correspondence.
//!
//! An [`AdjustmentSession`] owns the override set while the user edits it.
//! Each pass shows preview strokes; the user picks a start and an end stroke
//! ([`AdjustmentSession::begin`]), drags the toe end to a new position
//! ([`AdjustmentDraft`]) and then either commits or cancels through
//! [`AdjustmentSession::step`].
//!
//! ```text
//!   refresh_preview ──► begin(start, end) ──► draft.track / preview_lines
//!         ▲                                           │
//!         └──── step(Adjust) ◄────────────────────────┤
//!                                  step(Cancel) ◄─────┘
//! ```

use std::fmt;

use slope_math::{shortest_travel, wrap_distance, Point3};

use crate::error::{CurveRole, HatchError, Result};
use crate::overrides::{AdjustedRange, OverrideRangeSet};
use crate::range::DrawRange;
use crate::resolve::{CurvePair, Method, Resolver};

/// Session-scoped handle of a preview stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PreviewId(u64);

impl fmt::Display for PreviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A stroke shown during adjustment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewStroke {
    /// Handle for picking.
    pub id: PreviewId,
    /// Crest distance of the stroke.
    pub crest_dist: f64,
    /// Crest end (true elevation).
    pub start: Point3,
    /// Toe end (true elevation).
    pub end: Point3,
    /// Whether an override produced the stroke.
    pub is_manual: bool,
}

/// One interaction step.
#[derive(Debug, Clone, Copy)]
pub enum PointerInput<'a> {
    /// Commit the draft with the toe end dragged to `toe_dist`.
    Adjust {
        /// Draft returned by [`AdjustmentSession::begin`].
        draft: AdjustmentDraft<'a>,
        /// Final toe distance of the drag.
        toe_dist: f64,
    },
    /// The user abandoned the drag.
    Cancel,
}

/// Result of one interaction step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// This many ranges were inserted.
    Committed(usize),
    /// Nothing changed.
    Cancelled,
}

/// Override editing state for one hatch.
#[derive(Debug, Clone)]
pub struct AdjustmentSession<'a> {
    resolver: Resolver<'a>,
    range: DrawRange,
    step: f64,
    overrides: OverrideRangeSet,
    preview: Vec<PreviewStroke>,
    next_id: u64,
}

impl<'a> AdjustmentSession<'a> {
    /// Start a session over `range` with strokes every `step`.
    ///
    /// The first preview pass is generated immediately.
    pub fn new(pair: CurvePair<'a>, range: DrawRange, step: f64) -> Result<Self> {
        if !(step.is_finite() && step > 0.0) {
            return Err(HatchError::InvalidSettings("step must be positive".into()));
        }
        let resolver = Resolver::new(pair);
        let mut session = Self {
            range: range.clamped(resolver.crest_length()),
            resolver,
            step,
            overrides: OverrideRangeSet::for_toe(pair.toe),
            preview: Vec::new(),
            next_id: 0,
        };
        session.refresh_preview();
        Ok(session)
    }

    /// Continue editing an existing override set.
    pub fn with_overrides(mut self, overrides: OverrideRangeSet) -> Self {
        self.overrides = if self.resolver.toe_closed() {
            overrides.with_closed_toe(self.resolver.toe_length())
        } else {
            overrides
        };
        self.refresh_preview();
        self
    }

    /// Current overrides.
    pub fn overrides(&self) -> &OverrideRangeSet {
        &self.overrides
    }

    /// The clamped draw range.
    pub fn range(&self) -> DrawRange {
        self.range
    }

    /// Strokes of the current preview pass.
    pub fn preview(&self) -> &[PreviewStroke] {
        &self.preview
    }

    /// Whether `id` belongs to the current preview pass.
    pub fn contains_preview(&self, id: PreviewId) -> bool {
        self.lookup(id).is_ok()
    }

    /// Regenerate the preview strokes with fresh ids.
    pub fn refresh_preview(&mut self) -> &[PreviewStroke] {
        let crest = self.resolver.pair().crest;
        let tol = *self.resolver.tolerance();
        let crest_len = self.resolver.crest_length();

        let mut preview = Vec::new();
        for d in self.range.grid(self.step) {
            let d = tol.clamp_distance(d, crest_len);
            let resolved = self
                .resolver
                .resolve(d, Method::Elastic, &self.overrides, false);
            preview.push(PreviewStroke {
                id: PreviewId(self.next_id),
                crest_dist: d,
                start: crest.point_at_dist(d),
                end: resolved.point,
                is_manual: resolved.is_manual,
            });
            self.next_id += 1;
        }
        log::debug!("preview refreshed with {} strokes", preview.len());

        self.preview = preview;
        &self.preview
    }

    fn lookup(&self, id: PreviewId) -> Result<&PreviewStroke> {
        // Ids are handed out in increasing order within a pass
        self.preview
            .binary_search_by_key(&id, |s| s.id)
            .map(|i| &self.preview[i])
            .map_err(|_| HatchError::UnknownPreview(id))
    }

    /// Start adjusting the crest span between two picked preview strokes.
    ///
    /// The start stroke must lie inside the draw range. A pick spanning more
    /// than half the crest is read as crossing the crest seam, which is only
    /// possible on a closed crest; the pair is then ordered so the draft runs
    /// from the larger distance forward through the seam.
    pub fn begin(&self, start: PreviewId, end: PreviewId) -> Result<AdjustmentDraft<'a>> {
        let start_crest = self.lookup(start)?.crest_dist;
        let end_crest = self.lookup(end)?.crest_dist;
        self.begin_at(start_crest, end_crest)
    }

    /// Like [`begin`](Self::begin), for crest distances picked directly.
    pub fn begin_at(&self, start_crest: f64, end_crest: f64) -> Result<AdjustmentDraft<'a>> {
        let tol = *self.resolver.tolerance();
        let (mut start_crest, mut end_crest) = (start_crest, end_crest);

        if !self.range.contains(start_crest, tol.pick_slack) {
            log::warn!("picked crest distance {start_crest:.3} lies outside the draw range");
            return Err(HatchError::OutOfRange {
                dist: start_crest,
                start: self.range.start,
                end: self.range.end,
            });
        }

        let pair = self.resolver.pair();
        let crest_len = self.resolver.crest_length();
        let crosses_seam = (start_crest - end_crest).abs() > crest_len / 2.0;
        if crosses_seam {
            if !pair.crest.is_closed() {
                log::warn!("adjustment would bridge the open crest");
                return Err(HatchError::SeamCrossing(CurveRole::Crest));
            }
            if start_crest < end_crest {
                std::mem::swap(&mut start_crest, &mut end_crest);
            }
        }

        let anchor = pair.crest.projected_point_at_dist(start_crest);
        let start_toe = pair.toe.closest_dist(&anchor);

        Ok(AdjustmentDraft {
            resolver: self.resolver,
            start_crest,
            end_crest,
            start_toe,
            crosses_seam,
            step: self.step,
        })
    }

    /// Apply one interaction.
    ///
    /// A commit inserts the draft's ranges and refreshes the preview, so
    /// earlier preview ids stop resolving. A cancel changes nothing.
    pub fn step(&mut self, input: PointerInput<'_>) -> Result<StepOutcome> {
        match input {
            PointerInput::Cancel => {
                log::debug!("adjustment cancelled");
                Ok(StepOutcome::Cancelled)
            }
            PointerInput::Adjust { draft, toe_dist } => {
                let ranges = draft.ranges(toe_dist)?;
                let count = ranges.len();
                self.overrides.extend(ranges);
                log::info!(
                    "committed {} override range(s), {} total",
                    count,
                    self.overrides.len()
                );
                self.refresh_preview();
                Ok(StepOutcome::Committed(count))
            }
        }
    }

    /// End the session and hand over the override set.
    pub fn finish(self) -> OverrideRangeSet {
        self.overrides
    }
}

/// A pending adjustment between two crest distances.
#[derive(Debug, Clone, Copy)]
pub struct AdjustmentDraft<'a> {
    resolver: Resolver<'a>,
    start_crest: f64,
    end_crest: f64,
    start_toe: f64,
    crosses_seam: bool,
    step: f64,
}

impl<'a> AdjustmentDraft<'a> {
    /// Crest distance the drag is anchored at.
    pub fn start_crest(&self) -> f64 {
        self.start_crest
    }

    /// Crest distance of the dragged end.
    pub fn end_crest(&self) -> f64 {
        self.end_crest
    }

    /// Toe distance nearest the anchor.
    pub fn start_toe(&self) -> f64 {
        self.start_toe
    }

    /// Whether the crest span wraps through the seam of a closed crest.
    pub fn crosses_seam(&self) -> bool {
        self.crosses_seam
    }

    /// Toe distance for a pointer position.
    ///
    /// On an open toe, positions that would jump more than 40% of the toe
    /// length away from the anchor are rejected.
    pub fn track(&self, pointer: &Point3) -> Option<f64> {
        let candidate = self.resolver.pair().toe.closest_dist(pointer);
        let limit = self.resolver.toe_length() * 0.4;
        if !self.resolver.toe_closed() && (candidate - self.start_toe).abs() > limit {
            None
        } else {
            Some(candidate)
        }
    }

    fn toe_travel(&self, end_toe: f64) -> f64 {
        if self.resolver.toe_closed() {
            shortest_travel(self.start_toe, end_toe, self.resolver.toe_length())
        } else {
            end_toe - self.start_toe
        }
    }

    /// Crest distance covered from `start_crest` to `end_crest`.
    fn crest_travel(&self) -> f64 {
        if self.crosses_seam {
            (self.resolver.crest_length() - self.start_crest) + self.end_crest
        } else {
            self.end_crest - self.start_crest
        }
    }

    /// Rubber-band lines from crest to toe for the drag at `end_toe`.
    ///
    /// One line per step across the drafted crest span, walking through the
    /// seam when the draft crosses it.
    pub fn preview_lines(&self, end_toe: f64) -> Vec<(Point3, Point3)> {
        let crest_len = self.resolver.crest_length();
        let tol = *self.resolver.tolerance();
        let travel = self.toe_travel(end_toe);
        let total = self.crest_travel();

        let line = |crest_dist: f64, traversed: f64| {
            let rel = if tol.is_degenerate_span(total) {
                0.0
            } else {
                traversed / total
            };
            let mut toe_dist = self.start_toe + rel * travel;
            if self.resolver.toe_closed() {
                toe_dist = wrap_distance(toe_dist, self.resolver.toe_length());
            }
            let toe_dist = tol.clamp_distance(toe_dist, self.resolver.toe_length());
            let crest_dist = tol.clamp_distance(crest_dist, crest_len);
            let pair = self.resolver.pair();
            (pair.crest.point_at_dist(crest_dist), pair.toe.point_at_dist(toe_dist))
        };

        if self.crosses_seam {
            let to_seam = crest_len - self.start_crest;
            let before = DrawRange::new(self.start_crest, crest_len)
                .grid(self.step)
                .map(|d| line(d, d - self.start_crest));
            let after = DrawRange::new(0.0, self.end_crest)
                .grid(self.step)
                .map(|d| line(d, to_seam + d));
            before.chain(after).collect()
        } else {
            DrawRange::new(self.start_crest, self.end_crest)
                .grid(self.step)
                .map(|d| line(d, d - self.start_crest))
                .collect()
        }
    }

    /// Override ranges that commit the drag at `end_toe`.
    ///
    /// Toe distances are stored unwrapped: on a closed toe the end is
    /// `start_toe + travel` and may lie outside `[0, toe_length]`. Ranges
    /// bridging the gap of an open curve are rejected.
    pub fn ranges(&self, end_toe: f64) -> Result<Vec<AdjustedRange>> {
        let travel = self.toe_travel(end_toe);
        let end_toe = self.start_toe + travel;

        let ranges = if self.crosses_seam {
            self.seam_ranges(travel, end_toe)
        } else {
            vec![AdjustedRange::new(
                self.start_crest,
                self.end_crest,
                self.start_toe,
                end_toe,
            )]
        };
        for range in &ranges {
            self.resolver.check_override(range)?;
        }
        Ok(ranges)
    }

    /// The two halves of a draft running through the crest seam.
    fn seam_ranges(&self, travel: f64, end_toe: f64) -> Vec<AdjustedRange> {
        let crest_len = self.resolver.crest_length();
        let to_seam = crest_len - self.start_crest;
        let total = self.crest_travel();
        let mid_toe = if self.resolver.tolerance().is_degenerate_span(total) {
            self.start_toe
        } else {
            self.start_toe + to_seam / total * travel
        };

        vec![
            AdjustedRange::new(self.start_crest, crest_len, self.start_toe, mid_toe),
            AdjustedRange::new(0.0, self.end_crest, mid_toe, end_toe),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use slope_curve::Polyline3d;

    fn line(x0: f64, x1: f64, y: f64) -> Polyline3d {
        Polyline3d::open(vec![Point3::new(x0, y, 0.0), Point3::new(x1, y, 0.0)]).unwrap()
    }

    fn ring(size: f64) -> Polyline3d {
        Polyline3d::closed(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(size, 0.0, 0.0),
            Point3::new(size, size, 0.0),
            Point3::new(0.0, size, 0.0),
        ])
        .unwrap()
    }

    fn id_at(session: &AdjustmentSession<'_>, crest_dist: f64) -> PreviewId {
        session
            .preview()
            .iter()
            .find(|s| (s.crest_dist - crest_dist).abs() < 1e-3)
            .map(|s| s.id)
            .unwrap()
    }

    #[test]
    fn test_preview_covers_range() {
        let crest = line(0.0, 100.0, 10.0);
        let toe = line(0.0, 100.0, 0.0);
        let session =
            AdjustmentSession::new(CurvePair::new(&crest, &toe), DrawRange::entire(&crest), 10.0)
                .unwrap();
        assert_eq!(session.preview().len(), 11);
        assert!(session.preview().iter().all(|s| !s.is_manual));
    }

    #[test]
    fn test_rejects_bad_step() {
        let crest = line(0.0, 100.0, 10.0);
        let toe = line(0.0, 100.0, 0.0);
        let err = AdjustmentSession::new(CurvePair::new(&crest, &toe), DrawRange::entire(&crest), 0.0)
            .unwrap_err();
        assert!(matches!(err, HatchError::InvalidSettings(_)));
    }

    #[test]
    fn test_commit_straight_adjustment() {
        let crest = line(0.0, 100.0, 10.0);
        let toe = line(0.0, 100.0, 0.0);
        let mut session =
            AdjustmentSession::new(CurvePair::new(&crest, &toe), DrawRange::entire(&crest), 10.0)
                .unwrap();

        let draft = session.begin(id_at(&session, 20.0), id_at(&session, 40.0)).unwrap();
        assert!(!draft.crosses_seam());
        assert_relative_eq!(draft.start_toe(), 20.0);

        let toe_dist = draft.track(&Point3::new(50.0, -3.0, 0.0)).unwrap();
        assert_relative_eq!(toe_dist, 50.0);

        let lines = draft.preview_lines(toe_dist);
        assert_eq!(lines.len(), 3);
        assert_relative_eq!(lines[1].1.x, 35.0);

        let outcome = session
            .step(PointerInput::Adjust { draft, toe_dist })
            .unwrap();
        assert_eq!(outcome, StepOutcome::Committed(1));
        assert_eq!(
            session.overrides().ranges()[0],
            AdjustedRange::new(20.0, 40.0, 20.0, 50.0)
        );
        let manual = session.preview().iter().filter(|s| s.is_manual).count();
        assert_eq!(manual, 3);
    }

    #[test]
    fn test_cancel_leaves_state_untouched() {
        let crest = line(0.0, 100.0, 10.0);
        let toe = line(0.0, 100.0, 0.0);
        let mut session =
            AdjustmentSession::new(CurvePair::new(&crest, &toe), DrawRange::entire(&crest), 10.0)
                .unwrap();
        let before = session.preview().to_vec();
        let draft = session.begin(id_at(&session, 20.0), id_at(&session, 40.0)).unwrap();
        assert!(draft.track(&Point3::new(30.0, 0.0, 0.0)).is_some());

        assert_eq!(session.step(PointerInput::Cancel).unwrap(), StepOutcome::Cancelled);
        assert!(session.overrides().is_empty());
        assert_eq!(session.preview(), before.as_slice());
        assert!(session.finish().is_empty());
    }

    #[test]
    fn test_stale_ids_are_unknown() {
        let crest = line(0.0, 100.0, 10.0);
        let toe = line(0.0, 100.0, 0.0);
        let mut session =
            AdjustmentSession::new(CurvePair::new(&crest, &toe), DrawRange::entire(&crest), 10.0)
                .unwrap();
        let old = id_at(&session, 20.0);
        let other = id_at(&session, 30.0);
        session.refresh_preview();
        assert!(!session.contains_preview(old));
        let err = session.begin(old, other).unwrap_err();
        assert!(matches!(err, HatchError::UnknownPreview(id) if id == old));
    }

    #[test]
    fn test_open_crest_seam_is_rejected() {
        let crest = line(0.0, 100.0, 10.0);
        let toe = line(0.0, 100.0, 0.0);
        let session =
            AdjustmentSession::new(CurvePair::new(&crest, &toe), DrawRange::entire(&crest), 10.0)
                .unwrap();
        let err = session
            .begin(id_at(&session, 10.0), id_at(&session, 90.0))
            .unwrap_err();
        assert!(matches!(err, HatchError::SeamCrossing(CurveRole::Crest)));
    }

    #[test]
    fn test_open_toe_seam_is_rejected() {
        let crest = line(0.0, 100.0, 10.0);
        let toe = line(0.0, 100.0, 0.0);
        let session =
            AdjustmentSession::new(CurvePair::new(&crest, &toe), DrawRange::entire(&crest), 10.0)
                .unwrap();
        let draft = session.begin(id_at(&session, 10.0), id_at(&session, 30.0)).unwrap();
        // Too far for a drag on an open toe
        assert!(draft.track(&Point3::new(60.0, 0.0, 0.0)).is_none());
        let err = draft.ranges(70.0).unwrap_err();
        assert!(matches!(err, HatchError::SeamCrossing(CurveRole::Toe)));
    }

    #[test]
    fn test_out_of_range_pick() {
        let crest = line(0.0, 100.0, 10.0);
        let toe = line(0.0, 100.0, 0.0);
        let session =
            AdjustmentSession::new(CurvePair::new(&crest, &toe), DrawRange::new(20.0, 60.0), 10.0)
                .unwrap();
        // Every preview stroke is in range
        let first = session.preview()[0].id;
        let last = session.preview()[session.preview().len() - 1].id;
        assert!(session.begin(first, last).is_ok());

        assert!(session.begin_at(60.0005, 40.0).is_ok());
        let err = session.begin_at(75.0, 40.0).unwrap_err();
        assert!(matches!(
            err,
            HatchError::OutOfRange { start, end, .. } if start == 20.0 && end == 60.0
        ));
    }

    #[test]
    fn test_closed_crest_seam_splits_in_two() {
        // Square ring crest of length 400 around a ring toe of length 200
        let crest = Polyline3d::closed(vec![
            Point3::new(-50.0, -50.0, 5.0),
            Point3::new(50.0, -50.0, 5.0),
            Point3::new(50.0, 50.0, 5.0),
            Point3::new(-50.0, 50.0, 5.0),
        ])
        .unwrap();
        let toe = Polyline3d::closed(vec![
            Point3::new(-25.0, -25.0, 0.0),
            Point3::new(25.0, -25.0, 0.0),
            Point3::new(25.0, 25.0, 0.0),
            Point3::new(-25.0, 25.0, 0.0),
        ])
        .unwrap();
        let mut session =
            AdjustmentSession::new(CurvePair::new(&crest, &toe), DrawRange::entire(&crest), 10.0)
                .unwrap();

        // Picked forwards from 20 to 380: runs backwards through the seam
        let draft = session.begin(id_at(&session, 20.0), id_at(&session, 380.0)).unwrap();
        assert!(draft.crosses_seam());
        assert_relative_eq!(draft.start_crest(), 380.0);
        assert_relative_eq!(draft.end_crest(), 20.0);

        let anchor = draft.start_toe();
        let target = wrap_distance(anchor + 20.0, 200.0);
        let ranges = draft.ranges(target).unwrap();
        assert_eq!(ranges.len(), 2);
        assert_relative_eq!(ranges[0].start_crest, 380.0);
        assert_relative_eq!(ranges[0].end_crest, 400.0);
        assert_relative_eq!(ranges[0].end_toe, anchor + 10.0, epsilon = 1e-9);
        assert_relative_eq!(ranges[1].start_crest, 0.0);
        assert_relative_eq!(ranges[1].end_crest, 20.0);
        assert_relative_eq!(ranges[1].end_toe, anchor + 20.0, epsilon = 1e-9);

        // 380..400 and 0..20
        assert_eq!(draft.preview_lines(target).len(), 3 + 3);

        assert_eq!(
            session.step(PointerInput::Adjust { draft, toe_dist: target }).unwrap(),
            StepOutcome::Committed(2)
        );
        assert_eq!(session.finish().len(), 2);
    }
}
