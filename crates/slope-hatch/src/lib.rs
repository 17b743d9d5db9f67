#![warn(missing_docs)]

//! Slope hatching between a crest and a toe curve.
//!
//! A slope symbol is a row of strokes running from an upper curve (the
//! crest) down to a lower curve (the toe), usually alternating long and
//! short. This crate decides where each stroke lands on the toe, lets a user
//! override that decision over parts of the crest, and produces the stroke
//! geometry plus an optional outline for a background mask.
//!
//! # Example
//!
//! ```ignore
//! use slope_curve::Polyline3d;
//! use slope_hatch::{generate_hatch, DrawRange, HatchSettings, OverrideRangeSet};
//!
//! let crest: Polyline3d = // ... upper edge
//! let toe: Polyline3d = // ... lower edge
//! let settings = HatchSettings::default();
//! let output = generate_hatch(
//!     &crest,
//!     &toe,
//!     &settings,
//!     &OverrideRangeSet::new(),
//!     DrawRange::entire(&crest),
//! )?;
//!
//! println!("Strokes: {}", output.stats.stroke_count);
//! ```

pub mod boundary;
pub mod error;
pub mod overrides;
pub mod range;
pub mod resolve;
pub mod sampler;
pub mod session;
pub mod settings;

pub use boundary::{build_boundary, Outline};
pub use error::{CurveRole, HatchError, Result};
pub use overrides::{AdjustedRange, OverrideRangeSet};
pub use range::DrawRange;
pub use resolve::{CurvePair, Method, Resolved, Resolver};
pub use sampler::{
    sample, MarkerKind, SecondaryMarker, StrokeDescriptor, StrokeOptions, StrokeSampler,
    StrokeStyle,
};
pub use session::{
    AdjustmentDraft, AdjustmentSession, PointerInput, PreviewId, PreviewStroke, StepOutcome,
};
pub use settings::{DrawingOptions, HatchSettings};

use serde::{Deserialize, Serialize};
use slope_curve::CurveQuery;

/// Counts describing a generated hatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HatchStats {
    /// Number of emitted strokes.
    pub stroke_count: usize,
    /// Strokes shortened by the style pattern.
    pub short_count: usize,
    /// Strokes whose correspondence came from an override.
    pub manual_count: usize,
    /// Strokes carrying a secondary marker.
    pub marker_count: usize,
}

/// Result of [`generate_hatch`].
#[derive(Debug, Clone)]
pub struct HatchOutput {
    /// Strokes in crest order.
    pub strokes: Vec<StrokeDescriptor>,
    /// Background mask outline, when requested and non-degenerate.
    pub boundary: Option<Outline>,
    /// Whether proportional lookups ran the toe backwards.
    pub reverse_toe: bool,
    /// The draw range after clamping to the crest.
    pub range: DrawRange,
    /// Summary counts.
    pub stats: HatchStats,
    /// Presentation attributes from the settings.
    pub drawing: DrawingOptions,
}

/// Generate a slope hatch.
///
/// This is the main entry point:
/// 1. Validates the settings
/// 2. Samples strokes over the draw range
/// 3. Builds the mask outline if `drawing.background_mask` is set
/// 4. Collects statistics
pub fn generate_hatch(
    crest: &dyn CurveQuery,
    toe: &dyn CurveQuery,
    settings: &HatchSettings,
    overrides: &OverrideRangeSet,
    range: DrawRange,
) -> Result<HatchOutput> {
    settings.validate()?;

    let pair = CurvePair::new(crest, toe);
    let sampler = StrokeSampler::new(pair, overrides, range, settings.stroke_options());
    let reverse_toe = sampler.reverse_toe();
    let range = sampler.range();
    if reverse_toe {
        log::debug!("crest and toe run in opposite directions");
    }

    let strokes: Vec<StrokeDescriptor> = sampler.collect();

    let boundary = if settings.drawing.background_mask {
        let outline = build_boundary(pair, range, settings.step, reverse_toe);
        if outline.is_closed_region() {
            Some(outline)
        } else {
            log::warn!("background mask skipped: outline has {} points", outline.len());
            None
        }
    } else {
        None
    };

    let stats = HatchStats {
        stroke_count: strokes.len(),
        short_count: strokes.iter().filter(|s| s.is_short).count(),
        manual_count: strokes.iter().filter(|s| s.is_manual).count(),
        marker_count: strokes.iter().filter(|s| s.marker.is_some()).count(),
    };
    log::debug!(
        "generated {} strokes ({} short, {} manual) over [{:.3}, {:.3}]",
        stats.stroke_count,
        stats.short_count,
        stats.manual_count,
        range.start,
        range.end
    );

    Ok(HatchOutput {
        strokes,
        boundary,
        reverse_toe,
        range,
        stats,
        drawing: settings.drawing.clone(),
    })
}
