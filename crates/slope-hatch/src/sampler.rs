//! Stroke generation along the crest.
//!
//! [`StrokeSampler`] walks a regular grid of crest distances, resolves the
//! toe point for each and turns the pair into a [`StrokeDescriptor`]: the
//! drawn segment after offset and short-stroke scaling, plus an optional
//! arrowhead on long strokes and an optional marker on short ones.
//!
//! The sampler is a lazy iterator and borrows everything it reads, so it can
//! be cloned to restart and dropped part way without side effects.

use serde::{Deserialize, Serialize};
use slope_math::{flatten, Point3, Vec3};

use crate::overrides::OverrideRangeSet;
use crate::range::DrawRange;
use crate::resolve::{CurvePair, Method, Resolver};

/// Long/short alternation pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeStyle {
    /// Every stroke is long.
    Fixed,
    /// Long and short strokes alternate.
    #[default]
    LongOneShort,
    /// Each long stroke is followed by two short ones.
    LongTwoShorts,
}

impl StrokeStyle {
    /// Whether the stroke with the given emitted index is short.
    pub fn is_short(&self, index: usize) -> bool {
        match self {
            StrokeStyle::Fixed => false,
            StrokeStyle::LongOneShort => index % 2 != 0,
            StrokeStyle::LongTwoShorts => index % 3 != 0,
        }
    }
}

/// Marker drawn at the end of short strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// No marker.
    #[default]
    None,
    /// A short perpendicular tick across the stroke end.
    Tick,
    /// A small circle just beyond the stroke end.
    Circle,
}

/// Decoration placed at the end of a short stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SecondaryMarker {
    /// Perpendicular tick segment.
    Tick {
        /// One end of the tick.
        start: Point3,
        /// The other end.
        end: Point3,
    },
    /// Circle on the XY plane.
    Circle {
        /// Circle center.
        center: Point3,
        /// Circle radius.
        radius: f64,
    },
}

/// One emitted stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeDescriptor {
    /// Position in the long/short pattern.
    pub index: usize,
    /// Crest distance the stroke was sampled at.
    pub crest_dist: f64,
    /// Toe distance it was resolved to.
    pub toe_dist: f64,
    /// Stroke start.
    pub start: Point3,
    /// Drawn end, after offset and short scaling.
    pub end: Point3,
    /// Whether the pattern made this stroke short.
    pub is_short: bool,
    /// Whether an override produced the correspondence.
    pub is_manual: bool,
    /// Arrowhead outline `[base, base, apex]`, long strokes only.
    pub head: Option<[Point3; 3]>,
    /// Marker, short strokes only.
    pub marker: Option<SecondaryMarker>,
}

impl StrokeDescriptor {
    /// Drawn length.
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

/// Geometry parameters for stroke generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeOptions {
    /// Crest spacing between samples.
    pub step: f64,
    /// Length trimmed from the end of every stroke.
    pub offset: f64,
    /// Scale applied to short strokes, as a fraction.
    pub short_ratio: f64,
    /// Long/short pattern.
    pub style: StrokeStyle,
    /// Marker for short strokes.
    pub marker: MarkerKind,
    /// Correspondence method outside overrides.
    pub method: Method,
    /// Always draw from the higher end to the lower end.
    pub auto_orient: bool,
    /// Keep true elevations instead of flattening to z = 0.
    pub is_3d: bool,
    /// Draw arrowheads on long strokes.
    pub triangle_heads: bool,
}

impl Default for StrokeOptions {
    fn default() -> Self {
        Self {
            step: 2.0,
            offset: 0.0,
            short_ratio: 0.5,
            style: StrokeStyle::default(),
            marker: MarkerKind::default(),
            method: Method::default(),
            auto_orient: false,
            is_3d: false,
            triangle_heads: false,
        }
    }
}

/// Lazy stroke generator over a draw range.
#[derive(Debug, Clone)]
pub struct StrokeSampler<'a> {
    resolver: Resolver<'a>,
    overrides: &'a OverrideRangeSet,
    options: StrokeOptions,
    range: DrawRange,
    reverse_toe: bool,
    sample: u64,
    index: usize,
}

/// Create a sampler; see [`StrokeSampler::new`].
pub fn sample<'a>(
    pair: CurvePair<'a>,
    overrides: &'a OverrideRangeSet,
    range: DrawRange,
    options: StrokeOptions,
) -> StrokeSampler<'a> {
    StrokeSampler::new(pair, overrides, range, options)
}

impl<'a> StrokeSampler<'a> {
    /// Create a sampler for `range` (clamped to the crest).
    ///
    /// Toe reversal is decided here from the curve directions.
    pub fn new(
        pair: CurvePair<'a>,
        overrides: &'a OverrideRangeSet,
        range: DrawRange,
        options: StrokeOptions,
    ) -> Self {
        let resolver = Resolver::new(pair);
        let range = range.clamped(resolver.crest_length());
        Self {
            resolver,
            overrides,
            options,
            range,
            reverse_toe: pair.is_opposite_direction(),
            sample: 0,
            index: 0,
        }
    }

    /// Whether proportional lookups run the toe backwards.
    pub fn reverse_toe(&self) -> bool {
        self.reverse_toe
    }

    /// The clamped draw range.
    pub fn range(&self) -> DrawRange {
        self.range
    }

    fn stroke_at(&mut self, crest_dist: f64) -> Option<StrokeDescriptor> {
        let tol = *self.resolver.tolerance();
        let opts = self.options;
        let d = tol.clamp_distance(crest_dist, self.resolver.crest_length());

        let resolved = self
            .resolver
            .resolve(d, opts.method, self.overrides, self.reverse_toe);
        let crest_point = self.resolver.pair().crest.point_at_dist(d);

        let (mut start, mut end) = if opts.is_3d {
            (crest_point, resolved.point)
        } else {
            (flatten(&crest_point), flatten(&resolved.point))
        };
        if opts.auto_orient && start.z < end.z {
            std::mem::swap(&mut start, &mut end);
        }

        let full = end - start;
        let full_len = full.norm();
        if full_len < tol.min_vector {
            log::trace!("crest {d:.3}: crest and toe coincide, skipped");
            return None;
        }

        let index = self.index;
        self.index += 1;
        let is_short = opts.style.is_short(index);

        let mut draw_len = full_len - opts.offset;
        if is_short {
            draw_len *= opts.short_ratio;
        }
        let draw_len = draw_len.max(0.0);
        if draw_len <= tol.min_stroke {
            log::trace!("crest {d:.3}: stroke shorter than {}, skipped", tol.min_stroke);
            return None;
        }

        let dir = full / full_len;
        let drawn_end = start + dir * draw_len;

        let head = if opts.triangle_heads && !is_short {
            triangle_head(&start, &drawn_end, &dir, opts.step)
        } else {
            None
        };
        let marker = if is_short {
            secondary_marker(opts.marker, &drawn_end, &dir, opts.step)
        } else {
            None
        };

        Some(StrokeDescriptor {
            index,
            crest_dist: d,
            toe_dist: resolved.toe_dist,
            start,
            end: drawn_end,
            is_short,
            is_manual: resolved.is_manual,
            head,
            marker,
        })
    }
}

impl Iterator for StrokeSampler<'_> {
    type Item = StrokeDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let d = self.range.grid_point(self.options.step, self.sample)?;
            self.sample += 1;
            if let Some(stroke) = self.stroke_at(d) {
                return Some(stroke);
            }
        }
    }
}

/// Horizontal unit vector perpendicular to `dir`, if `dir` is not vertical.
fn horizontal_normal(dir: &Vec3) -> Option<Vec3> {
    let perp = dir.cross(&Vec3::z());
    let len = perp.norm();
    (len > 1e-12).then(|| perp / len)
}

/// Arrowhead spanning the whole stroke with its base at the start.
fn triangle_head(start: &Point3, end: &Point3, dir: &Vec3, step: f64) -> Option<[Point3; 3]> {
    let half_width = step * 0.25;
    horizontal_normal(dir).map(|perp| [start + perp * half_width, start - perp * half_width, *end])
}

fn secondary_marker(
    kind: MarkerKind,
    end: &Point3,
    dir: &Vec3,
    step: f64,
) -> Option<SecondaryMarker> {
    match kind {
        MarkerKind::None => None,
        MarkerKind::Tick => {
            let half = step * 0.2;
            horizontal_normal(dir).map(|perp| SecondaryMarker::Tick {
                start: end + perp * half,
                end: end - perp * half,
            })
        }
        MarkerKind::Circle => {
            let radius = step * 0.06;
            Some(SecondaryMarker::Circle {
                center: end + dir * (radius * 6.0),
                radius,
            })
        }
    }
}
