//! Hatch settings and their TOML persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HatchError, Result};
use crate::resolve::Method;
use crate::sampler::{MarkerKind, StrokeOptions, StrokeStyle};

/// Everything that controls how a hatch is generated and drawn.
///
/// Missing keys in a settings file take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HatchSettings {
    /// Crest spacing between strokes.
    pub step: f64,
    /// Length trimmed from the toe end of every stroke.
    pub offset: f64,
    /// Short stroke scale. Values above 1 are percentages.
    pub short_ratio: f64,
    /// Long/short pattern.
    pub style: StrokeStyle,
    /// Marker at the end of short strokes.
    pub marker: MarkerKind,
    /// Correspondence method outside overrides.
    pub method: Method,
    /// Draw every stroke from its higher end to its lower end.
    pub auto_orient: bool,
    /// Keep true elevations instead of flattening to z = 0.
    pub is_3d: bool,
    /// Draw arrowheads on long strokes.
    pub triangle_heads: bool,
    /// Presentation attributes passed through to the host.
    pub drawing: DrawingOptions,
}

impl Default for HatchSettings {
    fn default() -> Self {
        Self {
            step: 2.0,
            offset: 0.0,
            short_ratio: 50.0,
            style: StrokeStyle::LongOneShort,
            marker: MarkerKind::None,
            method: Method::Elastic,
            auto_orient: false,
            is_3d: false,
            triangle_heads: false,
            drawing: DrawingOptions::default(),
        }
    }
}

/// How the host should present generated geometry.
///
/// The engine never reads these; they travel with the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingOptions {
    /// Target layer name; empty means the host's current layer.
    pub layer: String,
    /// Stroke color index.
    pub color_index: u16,
    /// Collect the strokes into one group.
    pub group: bool,
    /// Emit the boundary outline for a background mask.
    pub background_mask: bool,
    /// Mask fill color index.
    pub mask_color_index: u16,
}

impl Default for DrawingOptions {
    fn default() -> Self {
        Self {
            layer: String::new(),
            color_index: 1,
            group: false,
            background_mask: false,
            mask_color_index: 3,
        }
    }
}

impl HatchSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(HatchError::InvalidSettings("step must be positive".into()));
        }
        if !(self.offset.is_finite() && self.offset >= 0.0) {
            return Err(HatchError::InvalidSettings(
                "offset must not be negative".into(),
            ));
        }
        if !(self.short_ratio.is_finite() && self.short_ratio >= 0.0 && self.short_ratio <= 100.0)
        {
            return Err(HatchError::InvalidSettings(
                "short_ratio must be between 0 and 100".into(),
            ));
        }
        Ok(())
    }

    /// Short stroke scale as a fraction.
    pub fn short_fraction(&self) -> f64 {
        if self.short_ratio > 1.0 {
            self.short_ratio / 100.0
        } else {
            self.short_ratio
        }
    }

    /// Sampler parameters.
    pub fn stroke_options(&self) -> StrokeOptions {
        StrokeOptions {
            step: self.step,
            offset: self.offset,
            short_ratio: self.short_fraction(),
            style: self.style,
            marker: self.marker,
            method: self.method,
            auto_orient: self.auto_orient,
            is_3d: self.is_3d,
            triangle_heads: self.triangle_heads,
        }
    }

    /// Parse settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Encode settings as TOML text.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load settings from a TOML file. Falls back to defaults on any error.
    pub fn load_from_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(settings) => {
                    log::info!("Loaded hatch settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Malformed settings file, using defaults: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No settings file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Save settings as a TOML file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = self.to_toml_string()?;
        std::fs::write(path, content)?;
        log::info!("Saved hatch settings to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_valid() {
        let settings = HatchSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.method, Method::Elastic);
        assert_eq!(settings.style, StrokeStyle::LongOneShort);
        assert_eq!(settings.drawing.color_index, 1);
        assert_eq!(settings.drawing.mask_color_index, 3);
    }

    #[test]
    fn test_invalid_settings() {
        let settings = HatchSettings {
            step: 0.0,
            ..HatchSettings::default()
        };
        assert!(matches!(settings.validate(), Err(HatchError::InvalidSettings(_))));

        let settings = HatchSettings {
            offset: -1.0,
            ..HatchSettings::default()
        };
        assert!(settings.validate().is_err());

        let settings = HatchSettings {
            short_ratio: 150.0,
            ..HatchSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_short_fraction() {
        let mut settings = HatchSettings::default();
        assert!((settings.short_fraction() - 0.5).abs() < 1e-12);
        settings.short_ratio = 0.25;
        assert!((settings.short_fraction() - 0.25).abs() < 1e-12);
        settings.short_ratio = 1.0;
        assert!((settings.short_fraction() - 1.0).abs() < 1e-12);
        assert!((settings.stroke_options().short_ratio - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings = HatchSettings::from_toml_str(
            r#"
            step = 5.0
            style = "long_two_shorts"
            method = "proportional"

            [drawing]
            layer = "SLOPE"
            "#,
        )
        .unwrap();
        assert_eq!(settings.step, 5.0);
        assert_eq!(settings.style, StrokeStyle::LongTwoShorts);
        assert_eq!(settings.method, Method::Proportional);
        assert_eq!(settings.marker, MarkerKind::None);
        assert_eq!(settings.drawing.layer, "SLOPE");
        assert_eq!(settings.drawing.color_index, 1);
    }

    #[test]
    fn test_toml_text_round_trip() {
        let settings = HatchSettings {
            marker: MarkerKind::Tick,
            triangle_heads: true,
            ..HatchSettings::default()
        };
        let text = settings.to_toml_string().unwrap();
        assert!(text.contains("marker = \"tick\""));
        assert_eq!(HatchSettings::from_toml_str(&text).unwrap(), settings);
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let err = HatchSettings::from_toml_str("step = \"wide\"").unwrap_err();
        assert!(matches!(err, HatchError::SettingsParse(_)));
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("slope-hatch-settings-{}.toml", std::process::id()));
        let settings = HatchSettings {
            step: 3.5,
            ..HatchSettings::default()
        };
        settings.save_to_file(&path).unwrap();
        let loaded = HatchSettings::load_from_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, settings);

        // Missing file falls back to defaults
        assert_eq!(HatchSettings::load_from_file(&path), HatchSettings::default());
    }
}
