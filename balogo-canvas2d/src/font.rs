//! Font specification for text measurement and rendering.
//!
//! A browser canvas takes a CSS font shorthand string. Here the same
//! information is carried as a typed value: a pixel size and an ordered list
//! of family names that is walked until a family present in the font
//! database is found. Text is always set at normal weight.

use std::fmt;

/// Generic CSS family names mapped onto cosmic-text's generic families.
pub(crate) const GENERIC_FAMILIES: &[&str] =
    &["serif", "sans-serif", "monospace", "cursive", "fantasy"];

/// Font size and family preference list.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    /// Font size in pixels.
    pub size_px: f32,
    /// Font families in order of preference.
    pub families: Vec<String>,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            size_px: 10.0,
            families: vec!["sans-serif".to_string()],
        }
    }
}

impl FontSpec {
    /// Create a font spec from a size and an ordered family list.
    pub fn new<I, S>(size_px: f32, families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            size_px,
            families: families.into_iter().map(Into::into).collect(),
        }
    }
}

/// Renders the CSS font shorthand, e.g. `84px Arial, sans-serif`.
impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px ", self.size_px)?;
        for (i, family) in self.families.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if family.contains(' ') && !GENERIC_FAMILIES.contains(&family.as_str()) {
                write!(f, "\"{}\"", family)?;
            } else {
                f.write_str(family)?;
            }
        }
        Ok(())
    }
}
