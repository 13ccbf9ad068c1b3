//! Per-surface paint settings.

use crate::font::FontSpec;
use crate::style::{CompositeOperation, FillStyle, TextAlign};
use tiny_skia::Transform;

/// Paint settings applied to every drawing call. Reset by
/// [`Canvas2dContext::resize`](crate::Canvas2dContext::resize).
#[derive(Debug, Clone)]
pub struct DrawingState {
    /// Current fill style.
    pub fill_style: FillStyle,
    /// Current stroke style.
    pub stroke_style: FillStyle,
    /// Current line width.
    pub line_width: f32,
    /// Current font specification.
    pub font: FontSpec,
    /// Current text alignment.
    pub text_align: TextAlign,
    /// Current global composite operation.
    pub global_composite_operation: CompositeOperation,
    /// Current transform matrix.
    pub transform: Transform,
}

impl Default for DrawingState {
    fn default() -> Self {
        Self {
            fill_style: FillStyle::default(),
            stroke_style: FillStyle::default(),
            line_width: 1.0,
            font: FontSpec::default(),
            text_align: TextAlign::default(),
            global_composite_operation: CompositeOperation::SourceOver,
            transform: Transform::identity(),
        }
    }
}
