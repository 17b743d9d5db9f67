//! Serializable curve descriptions.

use serde::{Deserialize, Serialize};
use slope_math::{Point2, Point3};

use crate::error::Result;
use crate::{Arc3d, CurveQuery, Polyline3d};

/// A curve description that can be stored in a job file.
///
/// We use plain arrays instead of nalgebra points so the format does not
/// depend on nalgebra's serde feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurveDef {
    /// A 3D polyline.
    Polyline {
        /// Vertices as `[x, y, z]`.
        points: Vec<[f64; 3]>,
        /// Whether the last vertex connects back to the first.
        #[serde(default)]
        closed: bool,
    },
    /// A circular arc with a linear elevation ramp.
    Arc {
        /// Center as `[x, y]`.
        center: [f64; 2],
        /// Radius.
        radius: f64,
        /// Start angle in radians.
        #[serde(default)]
        start_angle: f64,
        /// Signed sweep in radians.
        sweep: f64,
        /// Elevation at the start.
        #[serde(default)]
        z_start: f64,
        /// Elevation at the end.
        #[serde(default)]
        z_end: f64,
    },
}

impl CurveDef {
    /// Build the described curve.
    pub fn build(&self) -> Result<Box<dyn CurveQuery>> {
        match self {
            CurveDef::Polyline { points, closed } => {
                let points = points
                    .iter()
                    .map(|[x, y, z]| Point3::new(*x, *y, *z))
                    .collect();
                Ok(Box::new(Polyline3d::new(points, *closed)?))
            }
            CurveDef::Arc {
                center,
                radius,
                start_angle,
                sweep,
                z_start,
                z_end,
            } => {
                let arc = Arc3d::new(Point2::new(center[0], center[1]), *radius, *start_angle, *sweep)?
                    .with_elevation(*z_start, *z_end);
                Ok(Box::new(arc))
            }
        }
    }
}
