//! Fill, clear, and paint helper operations for Canvas2dContext.

use super::Canvas2dContext;
use crate::geometry::RectParams;
use crate::style::FillStyle;
use tiny_skia::{PathBuilder, Transform};

impl Canvas2dContext {
    /// Fill the current path using the non-zero winding rule.
    pub fn fill(&mut self) {
        log::debug!(
            target: "canvas",
            "fill ({})",
            self.state.global_composite_operation.as_str()
        );
        // Clone the builder so the path survives for a following fill
        let Some(path) = self.path_builder.clone().finish() else {
            return;
        };
        let paint = self.paint_for(self.state.fill_style);
        // Path coordinates are already in device space (pre-transformed)
        self.pixmap.fill_path(
            &path,
            &paint,
            tiny_skia::FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    /// Fill a rectangle.
    pub fn fill_rect(&mut self, params: &RectParams) {
        log::debug!(target: "canvas", "fillRect {} {} {} {}", params.x, params.y, params.width, params.height);
        self.begin_path();
        self.rect(params);
        self.fill();
        self.begin_path();
    }

    /// Set the pixels under a rectangle to transparent black. The rectangle
    /// follows the current transform; the composite operation is ignored.
    pub fn clear_rect(&mut self, params: &RectParams) {
        log::debug!(target: "canvas", "clearRect {} {} {} {}", params.x, params.y, params.width, params.height);
        let corners = [
            self.transform_point(params.x, params.y),
            self.transform_point(params.x + params.width, params.y),
            self.transform_point(params.x + params.width, params.y + params.height),
            self.transform_point(params.x, params.y + params.height),
        ];

        let mut pb = PathBuilder::new();
        pb.move_to(corners[0].0, corners[0].1);
        for &(x, y) in &corners[1..] {
            pb.line_to(x, y);
        }
        pb.close();

        if let Some(path) = pb.finish() {
            let paint = tiny_skia::Paint {
                blend_mode: tiny_skia::BlendMode::Clear,
                ..Default::default()
            };
            self.pixmap.fill_path(
                &path,
                &paint,
                tiny_skia::FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    // --- Private paint helpers ---

    pub(crate) fn paint_for(&self, style: FillStyle) -> tiny_skia::Paint<'static> {
        let mut paint = tiny_skia::Paint {
            anti_alias: true,
            blend_mode: self.state.global_composite_operation.into(),
            ..Default::default()
        };
        match style {
            FillStyle::Color(color) => paint.set_color(color),
        }
        paint
    }
}
