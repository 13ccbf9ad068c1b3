//! Owned raster images: drawable sources and export targets.

use crate::error::{Canvas2dError, Canvas2dResult};
use tiny_skia::{ColorU8, Pixmap};

/// Default pixel density written to PNG metadata.
const DEFAULT_PPI: f32 = 72.0;

/// An owned RGBA image, stored premultiplied as tiny-skia expects.
///
/// Used both for images drawn onto a canvas (`drawImage` sources) and for
/// surfaces snapshotted out of a canvas for export.
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasImage {
    pixmap: Pixmap,
}

impl CanvasImage {
    /// Create a fully transparent image.
    pub fn new(width: u32, height: u32) -> Canvas2dResult<Self> {
        let pixmap =
            Pixmap::new(width, height).ok_or(Canvas2dError::InvalidDimensions { width, height })?;
        Ok(Self { pixmap })
    }

    /// Wrap an existing tiny-skia pixmap.
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self { pixmap }
    }

    /// Build an image from non-premultiplied RGBA bytes.
    pub fn from_rgba(data: &[u8], width: u32, height: u32) -> Canvas2dResult<Self> {
        if data.len() != (width as usize) * (height as usize) * 4 {
            return Err(Canvas2dError::ImageDataLength {
                len: data.len(),
                width,
                height,
            });
        }
        let mut image = Self::new(width, height)?;
        for (dst, src) in image.pixmap.pixels_mut().iter_mut().zip(data.chunks_exact(4)) {
            *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        }
        Ok(image)
    }

    /// Decode a PNG file into an image.
    pub fn from_png(bytes: &[u8]) -> Canvas2dResult<Self> {
        let mut decoder = png::Decoder::new(bytes);
        decoder.set_transformations(png::Transformations::normalize_to_color8());
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        let buf = &buf[..info.buffer_size()];

        let rgba: Vec<u8> = match info.color_type {
            png::ColorType::Rgba => buf.to_vec(),
            png::ColorType::Rgb => buf
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect(),
            png::ColorType::GrayscaleAlpha => buf
                .chunks_exact(2)
                .flat_map(|p| [p[0], p[0], p[0], p[1]])
                .collect(),
            png::ColorType::Grayscale => buf.iter().flat_map(|&g| [g, g, g, 255]).collect(),
            png::ColorType::Indexed => {
                // normalize_to_color8 expands palettes, so this is unreachable in practice
                return Err(Canvas2dError::PngDecodeError(
                    "unexpanded indexed color".to_string(),
                ));
            }
        };
        Self::from_rgba(&rgba, info.width, info.height)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub(crate) fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Non-premultiplied RGBA value of one pixel, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Non-premultiplied RGBA bytes of the whole image.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect()
    }

    /// Encode as PNG.
    ///
    /// # Arguments
    /// * `ppi` - Optional pixels per inch for PNG metadata. Defaults to 72 if not specified.
    pub fn to_png(&self, ppi: Option<f32>) -> Canvas2dResult<Vec<u8>> {
        let ppi = ppi.unwrap_or(DEFAULT_PPI);

        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, self.width(), self.height());
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);

            // Set pixel density metadata (pixels per meter)
            let ppm = (ppi.max(0.0) / 0.0254).round() as u32;
            encoder.set_pixel_dims(Some(png::PixelDimensions {
                xppu: ppm,
                yppu: ppm,
                unit: png::Unit::Meter,
            }));

            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.to_rgba())?;
        }
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_round_trip_keeps_opaque_pixels() {
        let data = [255, 0, 0, 255, 0, 0, 255, 255];
        let image = CanvasImage::from_rgba(&data, 2, 1).unwrap();
        assert_eq!(image.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(image.pixel(1, 0), Some([0, 0, 255, 255]));
        assert_eq!(image.pixel(2, 0), None);
        assert_eq!(image.to_rgba(), data.to_vec());
    }

    #[test]
    fn test_rgba_length_mismatch() {
        assert!(matches!(
            CanvasImage::from_rgba(&[0, 0, 0], 1, 1),
            Err(Canvas2dError::ImageDataLength { len: 3, .. })
        ));
    }

    #[test]
    fn test_zero_sized_image_rejected() {
        assert!(matches!(
            CanvasImage::new(0, 10),
            Err(Canvas2dError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_png_encode_then_decode() {
        let data = [10, 20, 30, 255, 0, 0, 0, 0, 200, 100, 50, 255, 1, 2, 3, 255];
        let image = CanvasImage::from_rgba(&data, 2, 2).unwrap();
        let png = image.to_png(Some(144.0)).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = CanvasImage::from_png(&png).unwrap();
        assert_eq!(decoded.width(), 2);
        assert_eq!(decoded.height(), 2);
        assert_eq!(decoded.pixel(0, 0), Some([10, 20, 30, 255]));
        assert_eq!(decoded.pixel(1, 0).map(|p| p[3]), Some(0));
    }

    #[test]
    fn test_garbage_png_is_an_error() {
        assert!(matches!(
            CanvasImage::from_png(b"not a png"),
            Err(Canvas2dError::PngDecodeError(_))
        ));
    }
}
