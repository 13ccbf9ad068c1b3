//! Parameter structs for Canvas 2D drawing operations.

/// Parameters for a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectParams {
    /// X coordinate of the top-left corner.
    pub x: f32,
    /// Y coordinate of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl RectParams {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Destination rectangle for a scaled drawImage operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageDestParams {
    /// Destination X.
    pub dx: f32,
    /// Destination Y.
    pub dy: f32,
    /// Destination width.
    pub dw: f32,
    /// Destination height.
    pub dh: f32,
}

/// Integer pixel region of a canvas, used when copying pixels out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    /// Left edge in source pixels (may be negative; uncovered pixels stay transparent).
    pub x: i32,
    /// Top edge in source pixels.
    pub y: i32,
    /// Region width.
    pub width: u32,
    /// Region height.
    pub height: u32,
}
