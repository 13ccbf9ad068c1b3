//! Image drawing, pixel readback, and PNG output operations for Canvas2dContext.

use super::Canvas2dContext;
use crate::error::Canvas2dResult;
use crate::geometry::{ImageDestParams, PixelRegion};
use crate::image::CanvasImage;
use tiny_skia::Transform;

impl Canvas2dContext {
    /// Draw an image scaled into the destination rectangle.
    ///
    /// The current transform and composite operation apply.
    pub fn draw_image(&mut self, image: &CanvasImage, dest: &ImageDestParams) {
        log::debug!(
            target: "canvas",
            "drawImage {}x{} at {} {} {} {}",
            image.width(), image.height(), dest.dx, dest.dy, dest.dw, dest.dh
        );
        if dest.dw <= 0.0 || dest.dh <= 0.0 {
            return;
        }
        let paint = tiny_skia::PixmapPaint {
            opacity: 1.0,
            blend_mode: self.state.global_composite_operation.into(),
            quality: tiny_skia::FilterQuality::Bilinear,
        };

        let scale_x = dest.dw / image.width() as f32;
        let scale_y = dest.dh / image.height() as f32;
        let transform = self
            .state
            .transform
            .pre_translate(dest.dx, dest.dy)
            .pre_scale(scale_x, scale_y);

        self.pixmap
            .draw_pixmap(0, 0, image.pixmap().as_ref(), &paint, transform, None);
    }

    /// Copy the whole surface into a new, independently owned image.
    pub fn snapshot(&self) -> CanvasImage {
        CanvasImage::from_pixmap(self.pixmap.clone())
    }

    /// Copy a region of the surface into a new image of the region's size.
    ///
    /// Parts of the region that fall outside the surface stay transparent.
    /// The surface itself is left untouched.
    pub fn snapshot_region(&self, region: &PixelRegion) -> Canvas2dResult<CanvasImage> {
        log::debug!(
            target: "canvas",
            "snapshot region {} {} {}x{}",
            region.x, region.y, region.width, region.height
        );
        let mut image = CanvasImage::new(region.width, region.height)?;
        let paint = tiny_skia::PixmapPaint {
            blend_mode: tiny_skia::BlendMode::Source,
            ..Default::default()
        };
        image.pixmap_mut().draw_pixmap(
            -region.x,
            -region.y,
            self.pixmap.as_ref(),
            &paint,
            Transform::identity(),
            None,
        );
        Ok(image)
    }

    /// Get non-premultiplied RGBA image data for a region of the canvas.
    pub fn get_image_data(&self, x: i32, y: i32, width: u32, height: u32) -> Vec<u8> {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for dy in 0..height as i32 {
            for dx in 0..width as i32 {
                let (sx, sy) = (x + dx, y + dy);
                let pixel = if sx < 0 || sy < 0 {
                    None
                } else {
                    self.pixmap.pixel(sx as u32, sy as u32)
                };
                match pixel {
                    Some(p) => {
                        let c = p.demultiply();
                        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
                    }
                    None => data.extend_from_slice(&[0, 0, 0, 0]),
                }
            }
        }
        data
    }

    /// Export the canvas as PNG data.
    ///
    /// # Arguments
    /// * `ppi` - Optional pixels per inch for PNG metadata. Defaults to 72 if not specified.
    pub fn to_png(&self, ppi: Option<f32>) -> Canvas2dResult<Vec<u8>> {
        self.snapshot().to_png(ppi)
    }
}
