//! Error types for slope hatching.

use std::fmt;

use thiserror::Error;

use crate::session::PreviewId;

/// Which of the two boundary curves an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveRole {
    /// The upper/reference curve.
    Crest,
    /// The lower curve strokes run to.
    Toe,
}

impl fmt::Display for CurveRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveRole::Crest => f.write_str("crest"),
            CurveRole::Toe => f.write_str("toe"),
        }
    }
}

/// Errors that can occur while generating or adjusting a slope hatch.
///
/// All of them are recoverable: the caller can repeat the request and no
/// state has been modified.
#[derive(Error, Debug)]
pub enum HatchError {
    /// Invalid hatch settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// A picked crest distance lies outside the current draw range.
    #[error("crest distance {dist:.3} is outside the draw range [{start:.3}, {end:.3}]")]
    OutOfRange {
        /// The picked distance.
        dist: f64,
        /// Start of the draw range.
        start: f64,
        /// End of the draw range.
        end: f64,
    },

    /// An adjustment would wrap across the endpoints of an open curve.
    #[error("adjustment crosses the gap of the open {0} curve")]
    SeamCrossing(CurveRole),

    /// A picked stroke was not produced by this session's preview.
    #[error("stroke {0} is not part of the current preview")]
    UnknownPreview(PreviewId),

    /// Settings file could not be read or written.
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file is not valid TOML for [`crate::HatchSettings`].
    #[error("malformed settings: {0}")]
    SettingsParse(#[from] toml::de::Error),

    /// Settings could not be encoded as TOML.
    #[error("cannot encode settings: {0}")]
    SettingsEncode(#[from] toml::ser::Error),
}

/// Result type for hatch operations.
pub type Result<T> = std::result::Result<T, HatchError>;
