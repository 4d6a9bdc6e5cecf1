//! Locating upstream glyph files in a checked-out glyph repository.
//!
//! The upstream layout is `src/<category>/<glyph_id>/<variant>/24px.svg`;
//! the category is not recorded in the mapping table, so lookup scans the
//! category directories in sorted order.

use crate::mapping::GlyphId;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Canonical 24x24 currentColor glyph used for mapping rows whose source
/// id is `unknown`.
pub const PLACEHOLDER_SVG: &str = include_str!("../resources/placeholder.svg");

/// Upstream glyph style variant.
#[derive(Debug, Default, PartialEq, Eq, Hash, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    #[default]
    Filled,
    Outlined,
    Rounded,
    TwoTone,
}

impl Style {
    pub const ALL: [Style; 4] = [Style::Filled, Style::Outlined, Style::Rounded, Style::TwoTone];

    /// Variant directory name in the upstream repository.
    pub fn variant_dir(&self) -> &'static str {
        match self {
            Style::Filled => "materialicons",
            Style::Outlined => "materialiconsoutlined",
            Style::Rounded => "materialiconsround",
            Style::TwoTone => "materialiconstwotone",
        }
    }

    /// Human-readable label, used in the theme name.
    pub fn label(&self) -> &'static str {
        match self {
            Style::Filled => "Filled",
            Style::Outlined => "Outlined",
            Style::Rounded => "Rounded",
            Style::TwoTone => "Two-Tone",
        }
    }

    fn slug(&self) -> &'static str {
        match self {
            Style::Filled => "filled",
            Style::Outlined => "outlined",
            Style::Rounded => "rounded",
            Style::TwoTone => "two-tone",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown glyph style '{0}', expected one of: filled, outlined, rounded, two-tone")]
pub struct UnknownStyle(pub String);

impl FromStr for Style {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "filled" => Ok(Style::Filled),
            "outlined" => Ok(Style::Outlined),
            "rounded" => Ok(Style::Rounded),
            "two-tone" | "twotone" => Ok(Style::TwoTone),
            _ => Err(UnknownStyle(s.to_owned())),
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("glyph source directory {} does not exist", .0.display())]
    SourceMissing(PathBuf),
    #[error("glyph '{0}' not found in the glyph source")]
    GlyphNotFound(GlyphId),
    #[error("glyph '{glyph}' has no {style} variant")]
    VariantNotFound { glyph: GlyphId, style: Style },
    #[error("i/o error scanning glyph source")]
    Io(#[source] std::io::Error),
}

/// A checked-out upstream glyph repository.
#[derive(Debug, Clone)]
pub struct GlyphSource {
    root: PathBuf,
}

impl GlyphSource {
    pub fn new(root: impl Into<PathBuf>) -> GlyphSource {
        GlyphSource { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn check(&self) -> Result<(), Error> {
        if self.glyph_root().is_dir() {
            Ok(())
        } else {
            Err(Error::SourceMissing(self.root.clone()))
        }
    }

    fn glyph_root(&self) -> PathBuf {
        self.root.join("src")
    }

    /// Finds the SVG file for a glyph in the given style.
    ///
    /// Distinguishes a completely unknown glyph id from a glyph that
    /// exists but lacks the requested variant.
    pub fn locate(&self, glyph: &GlyphId, style: Style) -> Result<PathBuf, Error> {
        let glyph_root = self.glyph_root();
        if !glyph_root.is_dir() {
            return Err(Error::SourceMissing(self.root.clone()));
        }

        let mut categories: Vec<PathBuf> = std::fs::read_dir(&glyph_root)
            .map_err(Error::Io)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        categories.sort();

        let mut glyph_exists = false;
        for category in categories {
            let glyph_dir = category.join(&glyph.0);
            if !glyph_dir.is_dir() {
                continue;
            }
            glyph_exists = true;
            let svg = glyph_dir.join(style.variant_dir()).join("24px.svg");
            if svg.is_file() {
                return Ok(svg);
            }
        }

        if glyph_exists {
            Err(Error::VariantNotFound {
                glyph: glyph.clone(),
                style,
            })
        } else {
            Err(Error::GlyphNotFound(glyph.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_source(glyphs: &[(&str, &str, &[&str])]) -> (tempfile::TempDir, GlyphSource) {
        let tmp = tempfile::tempdir().unwrap();
        for (category, id, variants) in glyphs {
            for variant in *variants {
                let dir = tmp.path().join("src").join(category).join(id).join(variant);
                std::fs::create_dir_all(&dir).unwrap();
                std::fs::write(dir.join("24px.svg"), "<svg/>").unwrap();
            }
        }
        let source = GlyphSource::new(tmp.path());
        (tmp, source)
    }

    #[test]
    fn should_locate_glyph_in_requested_style() {
        let (_tmp, source) = fake_source(&[
            ("action", "home", &["materialicons", "materialiconsoutlined"]),
            ("content", "content_copy", &["materialicons"]),
        ]);

        let path = source
            .locate(&GlyphId("home".to_string()), Style::Outlined)
            .unwrap();

        assert!(path.ends_with("action/home/materialiconsoutlined/24px.svg"));
    }

    #[test]
    fn should_distinguish_missing_variant_from_missing_glyph() {
        let (_tmp, source) = fake_source(&[("content", "content_copy", &["materialicons"])]);

        assert!(matches!(
            source.locate(&GlyphId("content_copy".to_string()), Style::Rounded),
            Err(Error::VariantNotFound { .. })
        ));
        assert!(matches!(
            source.locate(&GlyphId("does_not_exist".to_string()), Style::Filled),
            Err(Error::GlyphNotFound(_))
        ));
    }

    #[test]
    fn should_fail_check_for_missing_source() {
        let source = GlyphSource::new("/nonexistent/material-design-icons");

        assert!(matches!(source.check(), Err(Error::SourceMissing(_))));
    }

    #[test]
    fn should_parse_styles_case_insensitively() {
        assert_eq!("Filled".parse::<Style>().unwrap(), Style::Filled);
        assert_eq!("two-tone".parse::<Style>().unwrap(), Style::TwoTone);
        assert_eq!("Two-Tone".parse::<Style>().unwrap(), Style::TwoTone);
        assert!("sharp".parse::<Style>().is_err());
    }

    #[test]
    fn placeholder_is_canonical() {
        assert!(PLACEHOLDER_SVG.contains(r#"viewBox="0 0 24 24""#));
        assert!(PLACEHOLDER_SVG.contains(r#"fill="currentColor""#));
    }
}
