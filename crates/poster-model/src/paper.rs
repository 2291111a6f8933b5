//! Paper size catalog.
//!
//! The catalog is a fixed table of common ISO, ANSI and photo sizes,
//! stored in millimeters with portrait (width <= height) dimensions.

use posterkit_common::error::{PosterError, PosterResult};
use serde::{Deserialize, Serialize};

use crate::config::Orientation;
use crate::units::{from_physical, Unit};

/// Grouping used when presenting the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperCategory {
    Iso,
    Ansi,
    Photo,
}

/// An entry in the paper catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PaperSize {
    pub id: &'static str,
    pub name: &'static str,
    pub width_mm: f64,
    pub height_mm: f64,
    pub category: PaperCategory,
}

/// Paper used when a config names an id that is not in the catalog.
pub const DEFAULT_PAPER_ID: &str = "a4";

/// All known paper sizes.
pub static PAPER_SIZES: &[PaperSize] = &[
    paper("a0", "A0", 841.0, 1189.0, PaperCategory::Iso),
    paper("a1", "A1", 594.0, 841.0, PaperCategory::Iso),
    paper("a2", "A2", 420.0, 594.0, PaperCategory::Iso),
    paper("a3", "A3", 297.0, 420.0, PaperCategory::Iso),
    paper("a4", "A4", 210.0, 297.0, PaperCategory::Iso),
    paper("a5", "A5", 148.0, 210.0, PaperCategory::Iso),
    paper("a6", "A6", 105.0, 148.0, PaperCategory::Iso),
    paper("b4", "B4", 250.0, 353.0, PaperCategory::Iso),
    paper("b5", "B5", 176.0, 250.0, PaperCategory::Iso),
    paper("letter", "Letter", 215.9, 279.4, PaperCategory::Ansi),
    paper("legal", "Legal", 215.9, 355.6, PaperCategory::Ansi),
    paper("tabloid", "Tabloid", 279.4, 431.8, PaperCategory::Ansi),
    paper("executive", "Executive", 184.15, 266.7, PaperCategory::Ansi),
    paper("photo-3.5x5", "3.5 x 5 in", 88.9, 127.0, PaperCategory::Photo),
    paper("photo-4x6", "4 x 6 in", 101.6, 152.4, PaperCategory::Photo),
    paper("photo-5x7", "5 x 7 in", 127.0, 177.8, PaperCategory::Photo),
    paper("photo-8x10", "8 x 10 in", 203.2, 254.0, PaperCategory::Photo),
];

const fn paper(
    id: &'static str,
    name: &'static str,
    width_mm: f64,
    height_mm: f64,
    category: PaperCategory,
) -> PaperSize {
    PaperSize {
        id,
        name,
        width_mm,
        height_mm,
        category,
    }
}

/// Look up a paper size by id.
pub fn find_paper(id: &str) -> PosterResult<&'static PaperSize> {
    PAPER_SIZES
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(id))
        .ok_or_else(|| PosterError::MissingPaper { id: id.to_string() })
}

/// The designated fallback paper.
pub fn default_paper() -> &'static PaperSize {
    PAPER_SIZES
        .iter()
        .find(|p| p.id == DEFAULT_PAPER_ID)
        .unwrap_or(&PAPER_SIZES[0])
}

/// A catalog entry converted into a working unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPaper {
    pub paper: &'static PaperSize,
    /// Portrait width in `unit`.
    pub width: f64,
    /// Portrait height in `unit`.
    pub height: f64,
    pub unit: Unit,
    /// True when the requested id was unknown and the default was used.
    pub substituted: bool,
}

impl ResolvedPaper {
    /// Page dimensions after applying orientation.
    pub fn oriented(&self, orientation: Orientation) -> (f64, f64) {
        match orientation {
            Orientation::Portrait => (self.width, self.height),
            Orientation::Landscape => (self.height, self.width),
        }
    }
}

/// Resolve a paper id into dimensions in `unit`.
///
/// Unknown ids fall back to [`DEFAULT_PAPER_ID`]; this never fails.
pub fn resolve_paper(id: &str, unit: Unit) -> ResolvedPaper {
    let (paper, substituted) = match find_paper(id) {
        Ok(paper) => (paper, false),
        Err(e) => {
            tracing::warn!(error = %e, fallback = DEFAULT_PAPER_ID, "Substituting default paper");
            (default_paper(), true)
        }
    };

    ResolvedPaper {
        paper,
        width: from_physical(paper.width_mm, unit),
        height: from_physical(paper.height_mm, unit),
        unit,
        substituted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_entries_are_positive_and_portrait() {
        for p in PAPER_SIZES {
            assert!(p.width_mm > 0.0 && p.height_mm > 0.0, "{}", p.id);
            assert!(p.width_mm <= p.height_mm, "{}", p.id);
        }
    }

    #[test]
    fn test_catalog_ids_are_unique() {
        for (i, a) in PAPER_SIZES.iter().enumerate() {
            for b in &PAPER_SIZES[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn test_known_sizes() {
        let a3 = find_paper("a3").unwrap();
        assert_eq!((a3.width_mm, a3.height_mm), (297.0, 420.0));
        let letter = find_paper("LETTER").unwrap();
        assert_eq!((letter.width_mm, letter.height_mm), (215.9, 279.4));
        let photo = find_paper("photo-4x6").unwrap();
        assert_eq!((photo.width_mm, photo.height_mm), (101.6, 152.4));
    }

    #[test]
    fn test_resolve_converts_to_inches() {
        let letter = resolve_paper("letter", Unit::Inch);
        assert!((letter.width - 8.5).abs() < 1e-9);
        assert!((letter.height - 11.0).abs() < 1e-9);
        assert!(!letter.substituted);
    }

    #[test]
    fn test_unknown_paper_falls_back_to_default() {
        assert!(matches!(
            find_paper("napkin"),
            Err(PosterError::MissingPaper { .. })
        ));
        let resolved = resolve_paper("napkin", Unit::Millimeter);
        assert!(resolved.substituted);
        assert_eq!(resolved.paper.id, DEFAULT_PAPER_ID);
        assert_eq!((resolved.width, resolved.height), (210.0, 297.0));
    }

    #[test]
    fn test_orientation_swaps_dimensions() {
        let a4 = resolve_paper("a4", Unit::Millimeter);
        assert_eq!(a4.oriented(Orientation::Portrait), (210.0, 297.0));
        assert_eq!(a4.oriented(Orientation::Landscape), (297.0, 210.0));
    }
}
