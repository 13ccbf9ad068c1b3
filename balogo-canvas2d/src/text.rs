//! Text measurement and shaping using cosmic-text.

use crate::font::{FontSpec, GENERIC_FAMILIES};
use crate::style::TextAlign;
use cosmic_text::{Attrs, Buffer, CacheKeyFlags, Family, FontSystem, Metrics, Shaping};

/// Fraction of the font size used for ascent when no face metrics are available.
const FALLBACK_ASCENT: f32 = 0.8;
/// Fraction of the font size used for descent when no face metrics are available.
const FALLBACK_DESCENT: f32 = 0.2;

/// Text metrics returned by measureText().
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextMetrics {
    /// Advance width of the text in pixels.
    pub width: f32,
    /// Font ascent above the alphabetic baseline.
    pub font_bounding_box_ascent: f32,
    /// Font descent below the alphabetic baseline (positive down).
    pub font_bounding_box_descent: f32,
}

impl TextMetrics {
    pub fn new(width: f32, ascent: f32, descent: f32) -> Self {
        Self {
            width,
            font_bounding_box_ascent: ascent,
            font_bounding_box_descent: descent,
        }
    }
}

/// Pick the first family of the preference list that the font database can satisfy.
///
/// Generic names (`sans-serif`, ...) always resolve since the database maps
/// them to a concrete face. Unknown names are skipped. An exhausted list falls
/// back to sans-serif.
pub(crate) fn resolve_family<'a>(db: &fontdb::Database, families: &'a [String]) -> Family<'a> {
    for name in families {
        if GENERIC_FAMILIES.contains(&name.as_str()) {
            return match name.as_str() {
                "serif" => Family::Serif,
                "monospace" => Family::Monospace,
                "cursive" => Family::Cursive,
                "fantasy" => Family::Fantasy,
                _ => Family::SansSerif,
            };
        }
        let available = db.faces().any(|face| {
            face.families
                .iter()
                .any(|(family, _)| family.eq_ignore_ascii_case(name))
        });
        if available {
            return Family::Name(name);
        }
        log::trace!(target: "canvas", "font family {:?} not available, trying next", name);
    }
    Family::SansSerif
}

/// Shape a single line of text into a cosmic-text buffer.
pub(crate) fn shape_line(font_system: &mut FontSystem, text: &str, font: &FontSpec) -> Buffer {
    let metrics = Metrics::new(font.size_px, font.size_px * 1.2);
    let mut buffer = Buffer::new(font_system, metrics);

    let family = resolve_family(font_system.db(), &font.families);
    // Hinting is disabled so outlines match the measured advance exactly
    let attrs = Attrs::new()
        .family(family)
        .cache_key_flags(CacheKeyFlags::DISABLE_HINTING);

    buffer.set_text(font_system, text, &attrs, Shaping::Advanced, None);
    buffer.shape_until_scroll(font_system, false);
    buffer
}

/// Ascent and descent in pixels of the primary face used for `text`.
fn face_extents(
    font_system: &FontSystem,
    buffer: &Buffer,
    font: &FontSpec,
) -> Option<(f32, f32)> {
    let db = font_system.db();
    let face_id = buffer
        .layout_runs()
        .flat_map(|run| run.glyphs.iter())
        .map(|glyph| glyph.font_id)
        .next()
        .or_else(|| {
            let family = resolve_family(db, &font.families);
            db.query(&fontdb::Query {
                families: &[family],
                ..fontdb::Query::default()
            })
        })?;

    db.with_face_data(face_id, |data, index| {
        let face = ttf_parser::Face::parse(data, index).ok()?;
        let scale = font.size_px / f32::from(face.units_per_em());
        Some((
            f32::from(face.ascender()) * scale,
            -f32::from(face.descender()) * scale,
        ))
    })
    .flatten()
}

/// Measure text using cosmic-text.
///
/// With an empty font database nothing is shaped: the width is zero and the
/// extents are fractions of the font size.
pub fn measure_text(font_system: &mut FontSystem, text: &str, font: &FontSpec) -> TextMetrics {
    if font_system.db().is_empty() {
        log::debug!(target: "canvas", "no fonts loaded, measuring {:?} as empty", text);
        return TextMetrics::new(
            0.0,
            font.size_px * FALLBACK_ASCENT,
            font.size_px * FALLBACK_DESCENT,
        );
    }
    let buffer = shape_line(font_system, text, font);

    let width = buffer
        .layout_runs()
        .fold(0.0_f32, |width, run| width.max(run.line_w));

    let (ascent, descent) = face_extents(font_system, &buffer, font).unwrap_or((
        font.size_px * FALLBACK_ASCENT,
        font.size_px * FALLBACK_DESCENT,
    ));

    TextMetrics::new(width, ascent, descent)
}

/// Calculate X offset for text alignment.
pub fn calculate_text_x_offset(width: f32, align: TextAlign) -> f32 {
    match align {
        TextAlign::Start => 0.0,
        TextAlign::End => -width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_offsets() {
        assert_eq!(calculate_text_x_offset(100.0, TextAlign::Start), 0.0);
        assert_eq!(calculate_text_x_offset(100.0, TextAlign::End), -100.0);
    }

    #[test]
    fn test_resolve_family_skips_missing_names() {
        let db = fontdb::Database::new();
        let families = vec![
            "Definitely Not Installed".to_string(),
            "monospace".to_string(),
        ];
        assert_eq!(resolve_family(&db, &families), Family::Monospace);
    }

    #[test]
    fn test_resolve_family_exhausted_list() {
        let db = fontdb::Database::new();
        let families = vec!["Nope".to_string()];
        assert_eq!(resolve_family(&db, &families), Family::SansSerif);
    }

    #[test]
    fn test_measure_without_fonts_uses_fallback_extents() {
        let mut font_system =
            FontSystem::new_with_locale_and_db("en".to_string(), fontdb::Database::new());
        let font = FontSpec::new(100.0, ["sans-serif"]);
        let metrics = measure_text(&mut font_system, "", &font);
        assert_eq!(metrics.width, 0.0);
        assert!((metrics.font_bounding_box_ascent - 80.0).abs() < 1e-3);
        assert!((metrics.font_bounding_box_descent - 20.0).abs() < 1e-3);
    }
}
