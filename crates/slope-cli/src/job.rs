//! Job files and JSON output.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use slope_curve::{CurveDef, CurveQuery};
use slope_hatch::{
    AdjustedRange, CurvePair, DrawRange, DrawingOptions, HatchOutput, HatchStats,
    OverrideRangeSet, Resolver, SecondaryMarker, StrokeDescriptor,
};
use slope_math::Point3;

/// Input for one hatch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Upper curve.
    pub crest: CurveDef,
    /// Lower curve.
    pub toe: CurveDef,
    /// Crest interval to hatch; the whole crest when absent.
    #[serde(default)]
    pub range: Option<DrawRange>,
    /// Manual overrides, inserted in order.
    #[serde(default)]
    pub overrides: Vec<AdjustedRange>,
}

/// A job with its curves built.
#[derive(Debug)]
pub struct LoadedJob {
    pub crest: Box<dyn CurveQuery>,
    pub toe: Box<dyn CurveQuery>,
    pub range: DrawRange,
    pub overrides: OverrideRangeSet,
}

impl Job {
    /// Parse a job from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a job file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read job file {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("invalid job file {}", path.display()))
    }

    /// Build the curves and the override set.
    ///
    /// Overrides that bridge the gap of an open crest or toe are rejected.
    pub fn build(&self) -> Result<LoadedJob> {
        let crest = self.crest.build().context("invalid crest curve")?;
        let toe = self.toe.build().context("invalid toe curve")?;

        let range = self
            .range
            .map(|r| DrawRange::new(r.start, r.end))
            .unwrap_or_else(|| DrawRange::entire(crest.as_ref()));

        let resolver = Resolver::new(CurvePair::new(crest.as_ref(), toe.as_ref()));
        for (i, r) in self.overrides.iter().enumerate() {
            resolver
                .check_override(r)
                .with_context(|| format!("invalid override #{i}"))?;
        }
        let mut overrides = OverrideRangeSet::for_toe(toe.as_ref());
        overrides.extend(self.overrides.iter().copied());

        Ok(LoadedJob {
            crest,
            toe,
            range,
            overrides,
        })
    }
}

fn xyz(p: &Point3) -> [f64; 3] {
    [p.x, p.y, p.z]
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum MarkerJson {
    Tick { start: [f64; 3], end: [f64; 3] },
    Circle { center: [f64; 3], radius: f64 },
}

impl From<&SecondaryMarker> for MarkerJson {
    fn from(marker: &SecondaryMarker) -> Self {
        match marker {
            SecondaryMarker::Tick { start, end } => MarkerJson::Tick {
                start: xyz(start),
                end: xyz(end),
            },
            SecondaryMarker::Circle { center, radius } => MarkerJson::Circle {
                center: xyz(center),
                radius: *radius,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct StrokeJson {
    crest_dist: f64,
    toe_dist: f64,
    start: [f64; 3],
    end: [f64; 3],
    short: bool,
    manual: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    head: Option<[[f64; 3]; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    marker: Option<MarkerJson>,
}

impl From<&StrokeDescriptor> for StrokeJson {
    fn from(s: &StrokeDescriptor) -> Self {
        Self {
            crest_dist: s.crest_dist,
            toe_dist: s.toe_dist,
            start: xyz(&s.start),
            end: xyz(&s.end),
            short: s.is_short,
            manual: s.is_manual,
            head: s.head.map(|[a, b, c]| [xyz(&a), xyz(&b), xyz(&c)]),
            marker: s.marker.as_ref().map(MarkerJson::from),
        }
    }
}

/// Serializable view of a [`HatchOutput`].
#[derive(Debug, Serialize)]
pub struct OutputJson {
    drawing: DrawingOptions,
    range: DrawRange,
    reverse_toe: bool,
    stats: HatchStats,
    strokes: Vec<StrokeJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    boundary: Option<Vec<[f64; 2]>>,
}

impl From<&HatchOutput> for OutputJson {
    fn from(output: &HatchOutput) -> Self {
        Self {
            drawing: output.drawing.clone(),
            range: output.range,
            reverse_toe: output.reverse_toe,
            stats: output.stats.clone(),
            strokes: output.strokes.iter().map(StrokeJson::from).collect(),
            boundary: output
                .boundary
                .as_ref()
                .map(|poly| poly.points.iter().map(|p| [p.x, p.y]).collect()),
        }
    }
}
