//! The drawing surface: pixel buffer, font system and paint state.

mod drawing;
mod image_ops;
mod path_ops;
mod text_rendering;
mod transform;

use crate::drawing_state::DrawingState;
use crate::error::{Canvas2dError, Canvas2dResult};
use crate::font_config::{apply_sans_serif, font_config_to_fontdb, FontConfig};
use crate::style::{CompositeOperation, FillStyle};
use cosmic_text::{FontSystem, SwashCache};
use tiny_skia::Pixmap;

/// Largest accepted surface side, in pixels.
const MAX_DIMENSION: u32 = 32767;

/// A resizable RGBA surface that draws text, polygons and images.
pub struct Canvas2dContext {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) pixmap: Pixmap,
    pub(crate) font_system: FontSystem,
    pub(crate) swash_cache: SwashCache,
    pub(crate) state: DrawingState,
    /// Path under construction, consumed by `fill`.
    pub(crate) path_builder: tiny_skia::PathBuilder,
    pub(crate) has_current_point: bool,
    /// Families tried for `sans-serif`, reapplied when fonts are registered.
    sans_serif: Vec<String>,
}

impl Canvas2dContext {
    /// Transparent surface of `width` x `height` whose fonts come from `config`.
    ///
    /// Loading system fonts is the slow part; callers keep one surface and
    /// [`resize`](Self::resize) it rather than building new ones.
    pub fn with_config(width: u32, height: u32, config: FontConfig) -> Canvas2dResult<Self> {
        let pixmap = Self::allocate(width, height)?;
        let font_db = font_config_to_fontdb(&config);
        log::debug!(target: "canvas", "surface {}x{} with {} font face(s)", width, height, font_db.len());

        Ok(Self {
            width,
            height,
            pixmap,
            font_system: FontSystem::new_with_locale_and_db("en".to_string(), font_db),
            swash_cache: SwashCache::new(),
            state: DrawingState::default(),
            path_builder: tiny_skia::PathBuilder::new(),
            has_current_point: false,
            sans_serif: config.sans_serif,
        })
    }

    fn allocate(width: u32, height: u32) -> Canvas2dResult<Pixmap> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(Canvas2dError::InvalidDimensions { width, height });
        }
        Pixmap::new(width, height).ok_or(Canvas2dError::InvalidDimensions { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resize the surface.
    ///
    /// Like assigning `canvas.width`/`canvas.height` in a browser, this
    /// discards all pixels and resets the drawing state, even when the size
    /// does not change. Registered fonts are kept.
    pub fn resize(&mut self, width: u32, height: u32) -> Canvas2dResult<()> {
        log::debug!(target: "canvas", "resize {}x{} -> {}x{}", self.width, self.height, width, height);
        self.pixmap = Self::allocate(width, height)?;
        self.width = width;
        self.height = height;
        self.state = DrawingState::default();
        self.begin_path();
        Ok(())
    }

    /// Register raw font file data (TTF/OTF/TTC) with this context's font database.
    ///
    /// Returns the number of faces that became available.
    pub fn register_font_data(&mut self, data: Vec<u8>) -> usize {
        let db = self.font_system.db_mut();
        let before = db.len();
        db.load_font_data(data);
        let added = db.len() - before;
        apply_sans_serif(db, &self.sans_serif);
        log::debug!(target: "canvas", "registered {} font face(s)", added);
        added
    }

    /// Set the fill color from any CSS color string. On error the previous
    /// color stays.
    pub fn set_fill_style(&mut self, style: &str) -> Canvas2dResult<()> {
        self.state.fill_style = FillStyle::Color(parse_color(style)?);
        Ok(())
    }

    /// Set the stroke color from any CSS color string.
    pub fn set_stroke_style(&mut self, style: &str) -> Canvas2dResult<()> {
        self.state.stroke_style = FillStyle::Color(parse_color(style)?);
        Ok(())
    }

    /// Stroke width for `stroke_text`. Non-finite or non-positive widths are
    /// ignored.
    pub fn set_line_width(&mut self, width: f32) {
        if width.is_finite() && width > 0.0 {
            self.state.line_width = width;
        }
    }

    /// Set the global composite operation.
    pub fn set_global_composite_operation(&mut self, op: CompositeOperation) {
        log::debug!(target: "canvas", "globalCompositeOperation {}", op.as_str());
        self.state.global_composite_operation = op;
    }

    pub fn global_composite_operation(&self) -> CompositeOperation {
        self.state.global_composite_operation
    }
}

pub(crate) fn parse_color(input: &str) -> Canvas2dResult<tiny_skia::Color> {
    let color = csscolorparser::parse(input)
        .map_err(|err| Canvas2dError::ColorParseError(format!("{input:?}: {err}")))?;
    let [r, g, b, a] = color.to_array();
    tiny_skia::Color::from_rgba(r, g, b, a)
        .ok_or_else(|| Canvas2dError::ColorParseError(format!("{input:?} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom_matrix::DOMMatrix;
    use crate::geometry::RectParams;

    fn blank(width: u32, height: u32) -> Canvas2dContext {
        Canvas2dContext::with_config(width, height, FontConfig::empty()).unwrap()
    }

    #[test]
    fn test_blank_surface() {
        let ctx = blank(200, 150);
        assert_eq!((ctx.width(), ctx.height()), (200, 150));
        assert_eq!(ctx.state.line_width, 1.0);
        assert_eq!(
            ctx.global_composite_operation(),
            CompositeOperation::SourceOver
        );
        assert!(ctx.pixmap.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(
            Canvas2dContext::with_config(0, 100, FontConfig::empty()),
            Err(Canvas2dError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            Canvas2dContext::with_config(100, MAX_DIMENSION + 1, FontConfig::empty()),
            Err(Canvas2dError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_unusable_line_widths_are_ignored() {
        let mut ctx = blank(100, 100);
        ctx.set_line_width(12.0);
        for width in [-1.0, 0.0, f32::NAN, f32::INFINITY] {
            ctx.set_line_width(width);
            assert_eq!(ctx.state.line_width, 12.0);
        }
    }

    #[test]
    fn test_invalid_color_keeps_previous_style() {
        let mut ctx = blank(10, 10);
        ctx.set_fill_style("#128AFA").unwrap();
        assert!(matches!(
            ctx.set_fill_style("not-a-color"),
            Err(Canvas2dError::ColorParseError(_))
        ));
        let FillStyle::Color(color) = ctx.state.fill_style;
        assert_eq!(color.to_color_u8().red(), 0x12);
    }

    #[test]
    fn test_resize_clears_pixels_and_state() {
        let mut ctx = blank(50, 50);
        ctx.set_fill_style("#ff0000").unwrap();
        ctx.set_transform(DOMMatrix::shear_x(0.5));
        ctx.set_global_composite_operation(CompositeOperation::DestinationOut);
        ctx.fill_rect(&RectParams::new(0.0, 0.0, 50.0, 50.0));
        ctx.set_global_composite_operation(CompositeOperation::SourceOver);
        ctx.fill_rect(&RectParams::new(0.0, 0.0, 50.0, 50.0));
        assert!(ctx.pixmap.data().iter().any(|&b| b != 0));
        assert_eq!(ctx.get_transform().c, 0.5);

        ctx.resize(80, 40).unwrap();
        assert_eq!((ctx.width(), ctx.height()), (80, 40));
        assert!(ctx.pixmap.data().iter().all(|&b| b == 0));
        assert!(ctx.get_transform().is_identity());
        assert_eq!(
            ctx.global_composite_operation(),
            CompositeOperation::SourceOver
        );

        assert!(ctx.resize(0, 40).is_err());
    }

    #[test]
    fn test_register_garbage_font_adds_nothing() {
        let mut ctx = blank(10, 10);
        assert_eq!(ctx.register_font_data(vec![0u8; 64]), 0);
        assert_eq!(ctx.font_system.db().len(), 0);
    }
}
