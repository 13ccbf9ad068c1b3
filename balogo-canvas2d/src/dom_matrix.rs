//! DOMMatrix type for 2D transformation matrices.

/// DOMMatrix represents a 2D transformation matrix.
///
/// The matrix is represented as:
/// ```text
/// | a c e |
/// | b d f |
/// | 0 0 1 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DOMMatrix {
    /// Scale X component.
    pub a: f32,
    /// Skew Y component.
    pub b: f32,
    /// Skew X component.
    pub c: f32,
    /// Scale Y component.
    pub d: f32,
    /// Translate X component.
    pub e: f32,
    /// Translate Y component.
    pub f: f32,
}

impl DOMMatrix {
    /// Create a new DOMMatrix with the specified components.
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Create an identity matrix.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Horizontal shear: `x' = x + k * y`, `y' = y`.
    ///
    /// Equivalent to `setTransform(1, 0, k, 1, 0, 0)`.
    pub fn shear_x(k: f32) -> Self {
        Self::new(1.0, 0.0, k, 1.0, 0.0, 0.0)
    }

    /// Map a point through this matrix.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

impl Default for DOMMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<tiny_skia::Transform> for DOMMatrix {
    fn from(t: tiny_skia::Transform) -> Self {
        DOMMatrix {
            a: t.sx,
            b: t.ky,
            c: t.kx,
            d: t.sy,
            e: t.tx,
            f: t.ty,
        }
    }
}

impl From<DOMMatrix> for tiny_skia::Transform {
    fn from(m: DOMMatrix) -> Self {
        tiny_skia::Transform::from_row(m.a, m.b, m.c, m.d, m.e, m.f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shear_moves_points_by_y() {
        let m = DOMMatrix::shear_x(-0.4);
        let (x, y) = m.apply(100.0, 50.0);
        assert!((x - 80.0).abs() < 1e-4);
        assert_eq!(y, 50.0);
    }

    #[test]
    fn test_round_trip_through_tiny_skia() {
        let m = DOMMatrix::new(1.0, 0.0, 0.25, 1.0, 3.0, 4.0);
        let t: tiny_skia::Transform = m.into();
        assert_eq!(t.kx, 0.25);
        assert_eq!(DOMMatrix::from(t), m);
        assert!(DOMMatrix::default().is_identity());
    }
}
