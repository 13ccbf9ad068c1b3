//! Adaptive layout: measures both words and sizes each half of the canvas.
//!
//! The left word is right-aligned against the seam and the right word is
//! left-aligned against it. Both are drawn under a horizontal shear, which
//! pushes the part of a glyph below the baseline one way and the part above
//! it the other way, so the measured advance is corrected by the sheared
//! offset of the baseline's distance to the outer edge of each word.

use crate::settings::GeometryConfig;
use crate::state::LogoState;
use balogo_canvas2d::{Canvas2dContext, FontSpec, TextMetrics};

/// Something that can measure a run of text in a given font.
pub trait TextMeasure {
    fn measure(&mut self, text: &str, font: &FontSpec) -> TextMetrics;
}

impl TextMeasure for Canvas2dContext {
    fn measure(&mut self, text: &str, font: &FontSpec) -> TextMetrics {
        if self.font() != font {
            self.set_font(font.clone());
        }
        self.measure_text(text)
    }
}

/// Result of one layout pass. Recomputed on every render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasuredExtents {
    pub metrics_left: TextMetrics,
    pub metrics_right: TextMetrics,
    /// Width left of the seam.
    pub canvas_width_left: f32,
    /// Width right of the seam.
    pub canvas_width_right: f32,
    /// Shear-corrected footprint of the left word.
    pub text_width_left: f32,
    /// Shear-corrected footprint of the right word.
    pub text_width_right: f32,
}

impl MeasuredExtents {
    /// X coordinate where the two words meet.
    pub fn seam(&self) -> f32 {
        self.canvas_width_left
    }

    pub fn total_width(&self) -> f32 {
        self.canvas_width_left + self.canvas_width_right
    }

    /// Pixel width of the working surface.
    pub fn surface_width(&self) -> u32 {
        self.total_width().ceil().max(1.0) as u32
    }
}

/// Shear-corrected widths of the left and right words.
pub fn skew_corrected_widths(
    left: &TextMetrics,
    right: &TextMetrics,
    config: &GeometryConfig,
) -> (f32, f32) {
    let baseline = config.baseline_y();
    let tilt = config.horizontal_tilt;
    let left_width = left.width - (baseline + left.font_bounding_box_descent) * tilt;
    let right_width = right.width + (baseline - right.font_bounding_box_ascent) * tilt;
    (left_width, right_width)
}

/// Half-width for one side: grows to fit the word plus padding, never
/// shrinks below the symmetric default.
fn side_width(text_width: f32, config: &GeometryConfig) -> f32 {
    let needed = text_width + config.padding_x;
    if needed > config.half_width() {
        needed
    } else {
        config.half_width()
    }
}

/// Measure both words and size each side of the seam independently.
pub fn layout<M: TextMeasure + ?Sized>(
    state: &LogoState,
    config: &GeometryConfig,
    measure: &mut M,
) -> MeasuredExtents {
    let metrics_left = measure.measure(&state.left_text, &config.font);
    let metrics_right = measure.measure(&state.right_text, &config.font);
    let (text_width_left, text_width_right) =
        skew_corrected_widths(&metrics_left, &metrics_right, config);

    let extents = MeasuredExtents {
        metrics_left,
        metrics_right,
        canvas_width_left: side_width(text_width_left, config),
        canvas_width_right: side_width(text_width_right, config),
        text_width_left,
        text_width_right,
    };
    log::debug!(
        "layout {:?}|{:?}: text {:.1}|{:.1}, canvas {:.1}|{:.1}",
        state.left_text,
        state.right_text,
        extents.text_width_left,
        extents.text_width_right,
        extents.canvas_width_left,
        extents.canvas_width_right
    );
    extents
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::settings::{resolve, BaseSettings, DensityMultiplier};

    /// Every character advances `advance` px; ascent and descent are fixed
    /// fractions of the font size.
    pub(crate) struct FixedMetrics {
        pub advance: f32,
    }

    impl TextMeasure for FixedMetrics {
        fn measure(&mut self, text: &str, font: &FontSpec) -> TextMetrics {
            TextMetrics::new(
                text.chars().count() as f32 * self.advance,
                font.size_px * 0.9,
                font.size_px * 0.25,
            )
        }
    }

    fn config() -> GeometryConfig {
        resolve(&BaseSettings::default(), DensityMultiplier::default())
    }

    fn state(left: &str, right: &str) -> LogoState {
        let mut state = LogoState::new(&config());
        state.left_text = left.to_string();
        state.right_text = right.to_string();
        state
    }

    #[test]
    fn test_skew_correction() {
        let config = config();
        let left = TextMetrics::new(100.0, 70.0, 20.0);
        let right = TextMetrics::new(100.0, 70.0, 20.0);
        let (l, r) = skew_corrected_widths(&left, &right, &config);
        // baseline 170; tilt -0.4
        assert!((l - (100.0 + 190.0 * 0.4)).abs() < 1e-3);
        assert!((r - (100.0 - 100.0 * 0.4)).abs() < 1e-3);
    }

    #[test]
    fn test_short_words_keep_default_width() {
        let config = config();
        let extents = layout(&state("Blue", "Archive"), &config, &mut FixedMetrics { advance: 30.0 });
        assert_eq!(extents.canvas_width_left, 450.0);
        assert_eq!(extents.canvas_width_right, 450.0);
        assert_eq!(extents.surface_width(), 900);
    }

    #[test]
    fn test_long_word_grows_only_its_side() {
        let config = config();
        let long = "W".repeat(40);
        let extents = layout(&state(&long, "Archive"), &config, &mut FixedMetrics { advance: 30.0 });
        assert!(extents.canvas_width_left > config.half_width());
        assert_eq!(
            extents.canvas_width_left,
            extents.text_width_left + config.padding_x
        );
        assert_eq!(extents.canvas_width_right, config.half_width());
        assert_eq!(
            extents.total_width(),
            extents.canvas_width_left + extents.canvas_width_right
        );
    }

    #[test]
    fn test_sides_are_independent() {
        let config = config();
        let mut measure = FixedMetrics { advance: 30.0 };
        let long = "x".repeat(30);
        let a = layout(&state(&long, "a"), &config, &mut measure);
        let b = layout(&state(&long, &"b".repeat(50)), &config, &mut measure);
        assert_eq!(a.canvas_width_left, b.canvas_width_left);

        let c = layout(&state("short", "right"), &config, &mut measure);
        let d = layout(&state(&"y".repeat(45), "right"), &config, &mut measure);
        assert_eq!(c.canvas_width_right, d.canvas_width_right);
    }

    #[test]
    fn test_empty_words() {
        let config = config();
        let extents = layout(&state("", ""), &config, &mut FixedMetrics { advance: 30.0 });
        assert_eq!(extents.total_width(), config.canvas_width);
        assert!(extents.canvas_width_left >= config.half_width());
        assert!(extents.canvas_width_right >= config.half_width());
    }

    #[test]
    fn test_density_scales_layout() {
        let base = BaseSettings::default();
        let one = resolve(&base, DensityMultiplier::new(1));
        let two = resolve(&base, DensityMultiplier::new(2));
        let long = "M".repeat(40);
        // Advance proportional to font size, as real fonts behave.
        let a = layout(&state(&long, "x"), &one, &mut FixedMetrics { advance: 30.0 });
        let b = layout(&state(&long, "x"), &two, &mut FixedMetrics { advance: 60.0 });
        assert!((b.canvas_width_left - 2.0 * a.canvas_width_left).abs() < 1e-2);
        assert_eq!(b.canvas_width_right, 2.0 * a.canvas_width_right);
    }
}
