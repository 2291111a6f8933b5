//! Poster sizing configuration.
//!
//! A [`PosterConfig`] describes how big the poster is and how it is split
//! into printable pages. Physical fields are stored in the active `unit`.

use posterkit_common::error::{PosterError, PosterResult};
use serde::{Deserialize, Serialize};

use crate::units::Unit;

/// Smallest and largest page count accepted per grid axis.
pub const MIN_GRID_PAGES: u32 = 1;
pub const MAX_GRID_PAGES: u32 = 20;

/// How the poster size is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SizingMode {
    /// Poster size derived from a row/column page count.
    #[default]
    Grid,
    /// Poster size given directly; page count derived.
    Size,
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Stroke used for the printable-area outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CutLineStyle {
    Solid,
    #[default]
    Dashed,
    None,
}

/// The sizing contract for a poster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PosterConfig {
    pub mode: SizingMode,

    pub unit: Unit,

    /// Requested poster width (SIZE mode only).
    pub target_width: f64,

    /// Requested poster height (SIZE mode only).
    pub target_height: f64,

    /// Page rows (GRID mode only).
    pub grid_rows: u32,

    /// Page columns (GRID mode only).
    pub grid_cols: u32,

    /// Paper catalog id.
    pub paper_id: String,

    pub orientation: Orientation,

    /// Blank border on every side of each page.
    pub margin: f64,

    /// Reserved for overlapping tiles; not used by the tiler yet.
    pub overlap: f64,

    pub show_cut_lines: bool,

    pub cut_line_style: CutLineStyle,

    pub show_page_numbers: bool,
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            mode: SizingMode::Grid,
            unit: Unit::Millimeter,
            target_width: 594.0,
            target_height: 841.0,
            grid_rows: 2,
            grid_cols: 2,
            paper_id: crate::paper::DEFAULT_PAPER_ID.to_string(),
            orientation: Orientation::Portrait,
            margin: 10.0,
            overlap: 0.0,
            show_cut_lines: true,
            cut_line_style: CutLineStyle::Dashed,
            show_page_numbers: true,
        }
    }
}

impl PosterConfig {
    /// Check the user-editable fields.
    ///
    /// The margin/paper relationship is checked by the layout resolver,
    /// which knows the paper dimensions.
    pub fn validate(&self) -> PosterResult<()> {
        if self.mode == SizingMode::Grid {
            check_grid_count("grid_rows", self.grid_rows)?;
            check_grid_count("grid_cols", self.grid_cols)?;
        } else {
            check_positive("target_width", self.target_width)?;
            check_positive("target_height", self.target_height)?;
        }

        check_non_negative("margin", self.margin)?;
        check_non_negative("overlap", self.overlap)?;
        Ok(())
    }

    /// Switch the active unit, converting every physical field together.
    pub fn set_unit(&mut self, unit: Unit) {
        if unit == self.unit {
            return;
        }
        let from = self.unit;
        self.target_width = from.convert_rounded(self.target_width, unit);
        self.target_height = from.convert_rounded(self.target_height, unit);
        self.margin = from.convert_rounded(self.margin, unit);
        self.overlap = from.convert_rounded(self.overlap, unit);
        self.unit = unit;
        tracing::debug!(from = %from, to = %unit, "Converted poster config units");
    }

    /// Whether an outline should be drawn around each printable area.
    pub fn draws_cut_lines(&self) -> bool {
        self.show_cut_lines && self.cut_line_style != CutLineStyle::None
    }
}

fn check_grid_count(field: &str, value: u32) -> PosterResult<()> {
    if !(MIN_GRID_PAGES..=MAX_GRID_PAGES).contains(&value) {
        return Err(PosterError::invalid_config(
            field,
            value,
            format!("must be between {MIN_GRID_PAGES} and {MAX_GRID_PAGES}"),
        ));
    }
    Ok(())
}

fn check_positive(field: &str, value: f64) -> PosterResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PosterError::invalid_config(
            field,
            value,
            "must be greater than zero",
        ));
    }
    Ok(())
}

fn check_non_negative(field: &str, value: f64) -> PosterResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PosterError::invalid_config(field, value, "must not be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PosterConfig::default().validate().is_ok());
    }

    #[test]
    fn test_grid_counts_are_bounded() {
        let mut config = PosterConfig {
            grid_rows: 0,
            ..PosterConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("grid_rows"));

        config.grid_rows = 21;
        assert!(config.validate().is_err());

        config.grid_rows = 20;
        config.grid_cols = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_size_mode_requires_positive_target() {
        let config = PosterConfig {
            mode: SizingMode::Size,
            target_width: 0.0,
            ..PosterConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("target_width"));

        let config = PosterConfig {
            mode: SizingMode::Size,
            target_height: f64::NAN,
            ..PosterConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_grid_mode_ignores_target_size() {
        let config = PosterConfig {
            mode: SizingMode::Grid,
            target_width: -5.0,
            ..PosterConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_margin_rejected() {
        let config = PosterConfig {
            margin: -1.0,
            ..PosterConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("margin"));
    }

    #[test]
    fn test_set_unit_converts_all_physical_fields() {
        let mut config = PosterConfig {
            target_width: 914.4,
            target_height: 609.6,
            margin: 12.7,
            overlap: 5.0,
            ..PosterConfig::default()
        };
        config.set_unit(Unit::Inch);
        assert_eq!(config.unit, Unit::Inch);
        assert_eq!(config.target_width, 36.0);
        assert_eq!(config.target_height, 24.0);
        assert_eq!(config.margin, 0.5);
        assert_eq!(config.overlap, 0.2);

        // Grid counts are unit-free.
        assert_eq!(config.grid_rows, 2);
    }

    #[test]
    fn test_set_unit_same_unit_is_noop() {
        let mut config = PosterConfig {
            margin: 3.333,
            ..PosterConfig::default()
        };
        config.set_unit(Unit::Millimeter);
        assert_eq!(config.margin, 3.333);
    }

    #[test]
    fn test_draws_cut_lines() {
        let mut config = PosterConfig::default();
        assert!(config.draws_cut_lines());
        config.cut_line_style = CutLineStyle::None;
        assert!(!config.draws_cut_lines());
        config.cut_line_style = CutLineStyle::Solid;
        config.show_cut_lines = false;
        assert!(!config.draws_cut_lines());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: PosterConfig =
            serde_json::from_str(r#"{ "mode": "size", "unit": "in", "target_width": 36.0 }"#)
                .unwrap();
        assert_eq!(config.mode, SizingMode::Size);
        assert_eq!(config.unit, Unit::Inch);
        assert_eq!(config.target_width, 36.0);
        assert_eq!(config.paper_id, "a4");
        assert_eq!(config.cut_line_style, CutLineStyle::Dashed);
    }
}
