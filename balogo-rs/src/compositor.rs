//! Paints one frame of the logo onto the working surface.
//!
//! Paint order, back to front: background, left word, halo, right word
//! (outline then fill), cutout, cross. The halo, cutout and cross share one
//! origin so the mark stays registered whatever the word lengths.

use crate::assets::MarkRaster;
use crate::error::LogoResult;
use crate::layout::MeasuredExtents;
use crate::settings::{GeometryConfig, CUTOUT_UNITS};
use crate::state::LogoState;
use balogo_canvas2d::{
    Canvas2dContext, CanvasImage, CompositeOperation, DOMMatrix, ImageDestParams, RectParams,
    TextAlign,
};

/// Outline width of the right word. Not density-scaled.
pub const RIGHT_OUTLINE_WIDTH: f32 = 12.0;

const WHITE: &str = "#ffffff";

/// Top-left corner shared by the halo, the cutout and the cross.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkOrigin {
    pub x: f32,
    pub y: f32,
}

impl MarkOrigin {
    pub fn new(state: &LogoState, config: &GeometryConfig, extents: &MeasuredExtents) -> Self {
        Self {
            x: extents.seam() - config.canvas_height / 2.0 + state.graph_offset.x,
            y: state.graph_offset.y,
        }
    }
}

/// What a render pass drew, for callers that need to reason about placement.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub width: u32,
    pub height: u32,
    pub halo_origin: MarkOrigin,
    pub cutout_origin: MarkOrigin,
    pub cross_origin: MarkOrigin,
    /// Cutout corners in surface pixels.
    pub cutout_points: [(f32, f32); 4],
}

/// Scale the normalized cutout path by the mark size and move it to `origin`.
pub fn cutout_points(config: &GeometryConfig, origin: MarkOrigin) -> [(f32, f32); 4] {
    let scale = config.canvas_height / CUTOUT_UNITS;
    config
        .cutout_path
        .map(|[x, y]| (origin.x + x * scale, origin.y + y * scale))
}

fn draw_mark_image(surface: &mut Canvas2dContext, image: &CanvasImage, origin: MarkOrigin, size: f32) {
    surface.draw_image(
        image,
        &ImageDestParams {
            dx: origin.x,
            dy: origin.y,
            dw: size,
            dh: size,
        },
    );
}

/// Repaint the whole surface from `state`.
///
/// The surface is resized to the layout's width, which also discards the
/// previous frame and any leftover drawing state.
pub fn render(
    surface: &mut Canvas2dContext,
    state: &LogoState,
    config: &GeometryConfig,
    extents: &MeasuredExtents,
    marks: &MarkRaster,
) -> LogoResult<RenderReport> {
    let width = extents.surface_width();
    let height = config.canvas_height.ceil() as u32;
    let shear = DOMMatrix::shear_x(config.horizontal_tilt);
    let seam = extents.seam();
    let baseline = config.baseline_y();
    let mark_size = config.mark_size();

    // Clear
    surface.resize(width, height)?;
    surface.clear_rect(&RectParams::new(0.0, 0.0, width as f32, height as f32));

    // Background
    if !state.transparent_background {
        surface.set_fill_style(WHITE)?;
        surface.fill_rect(&RectParams::new(0.0, 0.0, width as f32, height as f32));
    }

    surface.set_font(config.font.clone());

    // Left word, right-aligned against the seam
    surface.set_fill_style(state.left_color.as_str())?;
    surface.set_text_align(TextAlign::End);
    surface.set_transform(shear);
    surface.fill_text(&state.left_text, seam, baseline);
    surface.reset_transform();

    // Halo, unsheared
    let origin = MarkOrigin::new(state, config, extents);
    draw_mark_image(surface, &marks.halo, origin, mark_size);

    // Right word: the white outline erases the halo under the glyphs when
    // the background is transparent, then the fill goes on top.
    surface.set_fill_style(state.right_color.as_str())?;
    surface.set_text_align(TextAlign::Start);
    if state.transparent_background {
        surface.set_global_composite_operation(CompositeOperation::DestinationOut);
    }
    surface.set_stroke_style(WHITE)?;
    surface.set_line_width(RIGHT_OUTLINE_WIDTH);
    surface.set_transform(shear);
    surface.stroke_text(&state.right_text, seam, baseline);
    surface.set_global_composite_operation(CompositeOperation::SourceOver);
    surface.fill_text(&state.right_text, seam, baseline);
    surface.reset_transform();

    // Cutout
    let cutout_origin = origin;
    let points = cutout_points(config, cutout_origin);
    surface.begin_path();
    surface.polygon(&points);
    if state.transparent_background {
        surface.set_global_composite_operation(CompositeOperation::DestinationOut);
    }
    surface.set_fill_style(WHITE)?;
    surface.fill();
    surface.set_global_composite_operation(CompositeOperation::SourceOver);

    // Cross
    let cross_origin = origin;
    draw_mark_image(surface, &marks.cross, cross_origin, mark_size);

    log::debug!(
        "rendered {}x{} (seam {:.1}, mark at {:.1},{:.1}, transparent={})",
        width,
        height,
        seam,
        origin.x,
        origin.y,
        state.transparent_background
    );

    Ok(RenderReport {
        width,
        height,
        halo_origin: origin,
        cutout_origin,
        cross_origin,
        cutout_points: points,
    })
}
