//! Physical units and conversion.
//!
//! Millimeters are the canonical physical unit: the paper catalog is stored
//! in millimeters and every other unit converts through them.

use std::fmt;
use std::str::FromStr;

use posterkit_common::config::ExportDefaults;
use posterkit_common::error::PosterError;
use serde::{Deserialize, Serialize};

/// Millimeters per inch (exact).
pub const MM_PER_INCH: f64 = 25.4;

/// Decimal places kept when a value is converted on a unit toggle.
pub const UNIT_TOGGLE_DECIMALS: i32 = 2;

/// A unit of physical length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Unit {
    #[default]
    #[serde(rename = "mm")]
    Millimeter,
    #[serde(rename = "in")]
    Inch,
}

impl Unit {
    /// Short symbol used in labels and error messages.
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Millimeter => "mm",
            Unit::Inch => "in",
        }
    }

    /// Millimeters in one of this unit.
    pub fn mm_per_unit(self) -> f64 {
        match self {
            Unit::Millimeter => 1.0,
            Unit::Inch => MM_PER_INCH,
        }
    }

    /// Convert `value` in this unit to `target`, without rounding.
    pub fn convert(self, value: f64, target: Unit) -> f64 {
        if self == target {
            return value;
        }
        from_physical(to_physical(value, self), target)
    }

    /// Convert `value` in this unit to `target`, rounded for display stability.
    ///
    /// This is what a unit toggle applies to stored config values.
    pub fn convert_rounded(self, value: f64, target: Unit) -> f64 {
        if self == target {
            return value;
        }
        round_to(self.convert(value, target), UNIT_TOGGLE_DECIMALS)
    }

    /// Raster pixels per one of this unit for exports.
    pub fn raster_scale(self, defaults: &ExportDefaults) -> f64 {
        match self {
            Unit::Millimeter => defaults.pixels_per_mm,
            Unit::Inch => defaults.pixels_per_inch,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = PosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm" | "millimeter" | "millimeters" => Ok(Unit::Millimeter),
            "in" | "inch" | "inches" => Ok(Unit::Inch),
            other => Err(PosterError::invalid_config(
                "unit",
                other,
                "expected `mm` or `in`",
            )),
        }
    }
}

/// Convert a value in `unit` to millimeters.
pub fn to_physical(value: f64, unit: Unit) -> f64 {
    value * unit.mm_per_unit()
}

/// Convert millimeters to a value in `unit`.
pub fn from_physical(mm: f64, unit: Unit) -> f64 {
    mm / unit.mm_per_unit()
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
