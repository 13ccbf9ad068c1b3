//! Path building operations for Canvas2dContext.
//!
//! Points are mapped through the current transform as they are added, so a
//! path built under a shear keeps that shear even if the transform is reset
//! before `fill()`.

use super::Canvas2dContext;
use crate::geometry::RectParams;
use tiny_skia::PathBuilder;

impl Canvas2dContext {
    /// Begin a new path.
    pub fn begin_path(&mut self) {
        log::debug!(target: "canvas", "beginPath");
        self.path_builder = PathBuilder::new();
        self.has_current_point = false;
    }

    /// Transform a point by the current transformation matrix.
    pub(crate) fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        let t = &self.state.transform;
        (t.sx * x + t.kx * y + t.tx, t.ky * x + t.sy * y + t.ty)
    }

    /// Move to a point without drawing.
    pub fn move_to(&mut self, x: f32, y: f32) {
        log::debug!(target: "canvas", "moveTo {} {}", x, y);
        let (tx, ty) = self.transform_point(x, y);
        self.path_builder.move_to(tx, ty);
        self.has_current_point = true;
    }

    /// Draw a line to a point.
    ///
    /// Without a current point this behaves like `move_to`.
    pub fn line_to(&mut self, x: f32, y: f32) {
        log::debug!(target: "canvas", "lineTo {} {}", x, y);
        if !self.has_current_point {
            self.move_to(x, y);
            return;
        }
        let (tx, ty) = self.transform_point(x, y);
        self.path_builder.line_to(tx, ty);
    }

    /// Close the current subpath.
    pub fn close_path(&mut self) {
        log::debug!(target: "canvas", "closePath");
        if self.has_current_point {
            self.path_builder.close();
        }
    }

    /// Add a closed polygon through `points` as a new subpath.
    pub fn polygon(&mut self, points: &[(f32, f32)]) {
        let Some((&(x0, y0), rest)) = points.split_first() else {
            return;
        };
        self.move_to(x0, y0);
        for &(x, y) in rest {
            self.line_to(x, y);
        }
        self.close_path();
    }

    /// Add a rectangle to the path.
    pub fn rect(&mut self, params: &RectParams) {
        log::debug!(target: "canvas", "rect {} {} {} {}", params.x, params.y, params.width, params.height);
        self.polygon(&[
            (params.x, params.y),
            (params.x + params.width, params.y),
            (params.x + params.width, params.y + params.height),
            (params.x, params.y + params.height),
        ]);
    }
}
