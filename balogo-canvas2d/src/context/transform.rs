//! Current transform of the surface.

use super::Canvas2dContext;
use crate::dom_matrix::DOMMatrix;
use tiny_skia::Transform;

impl Canvas2dContext {
    /// Set the transform matrix (replacing the current one).
    pub fn set_transform(&mut self, matrix: DOMMatrix) {
        log::debug!(target: "canvas", "setTransform {:?}", matrix);
        self.state.transform = matrix.into();
    }

    /// Reset the transform to identity.
    pub fn reset_transform(&mut self) {
        log::debug!(target: "canvas", "resetTransform");
        self.state.transform = Transform::identity();
    }

    /// Get the current transformation matrix.
    pub fn get_transform(&self) -> DOMMatrix {
        self.state.transform.into()
    }
}
