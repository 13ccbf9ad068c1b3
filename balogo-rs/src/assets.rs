//! Halo and cross images of the logo mark.
//!
//! Vector sources are rasterized with resvg at the exact size they are drawn
//! at, so the mark stays sharp at every density. Raster sources are drawn
//! scaled.

use crate::error::{LogoError, LogoResult};
use balogo_canvas2d::CanvasImage;
use std::path::Path;

const HALO_SVG: &str = include_str!("../assets/halo.svg");
const CROSS_SVG: &str = include_str!("../assets/cross.svg");

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// One mark image, vector or raster.
pub enum MarkImage {
    Vector(usvg::Tree),
    Raster(CanvasImage),
}

impl std::fmt::Debug for MarkImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkImage::Vector(tree) => write!(f, "Vector({:?})", tree.size()),
            MarkImage::Raster(image) => write!(f, "Raster({}x{})", image.width(), image.height()),
        }
    }
}

impl MarkImage {
    pub fn from_svg_str(svg: &str) -> LogoResult<Self> {
        let opt = usvg::Options::default();
        let tree = usvg::Tree::from_str(svg, &opt)?;
        Ok(MarkImage::Vector(tree))
    }

    pub fn from_png_bytes(bytes: &[u8]) -> LogoResult<Self> {
        Ok(MarkImage::Raster(CanvasImage::from_png(bytes)?))
    }

    /// Load a PNG or SVG file, sniffing the PNG signature.
    pub fn from_file(path: &Path) -> LogoResult<Self> {
        let bytes = std::fs::read(path).map_err(|err| LogoError::io(path, err))?;
        if bytes.starts_with(PNG_SIGNATURE) {
            return Self::from_png_bytes(&bytes);
        }
        let svg = std::str::from_utf8(&bytes).map_err(|err| {
            LogoError::Asset(format!("{} is neither PNG nor UTF-8 SVG: {}", path.display(), err))
        })?;
        Self::from_svg_str(svg)
    }

    /// Produce a square image of `size` pixels.
    pub fn render(&self, size: u32) -> LogoResult<CanvasImage> {
        match self {
            MarkImage::Raster(image) => Ok(image.clone()),
            MarkImage::Vector(tree) => {
                let mut pixmap = tiny_skia::Pixmap::new(size, size).ok_or_else(|| {
                    LogoError::Asset(format!("cannot allocate a {size}x{size} mark image"))
                })?;
                let svg_size = tree.size();
                let transform = usvg::Transform::from_scale(
                    size as f32 / svg_size.width(),
                    size as f32 / svg_size.height(),
                );
                resvg::render(tree, transform, &mut pixmap.as_mut());
                Ok(CanvasImage::from_pixmap(pixmap))
            }
        }
    }
}

/// Halo (behind the right word) and cross (on top of everything).
#[derive(Debug)]
pub struct MarkAssets {
    pub halo: MarkImage,
    pub cross: MarkImage,
}

impl MarkAssets {
    /// The bundled vector halo and cross.
    pub fn builtin() -> LogoResult<Self> {
        Ok(Self {
            halo: MarkImage::from_svg_str(HALO_SVG)?,
            cross: MarkImage::from_svg_str(CROSS_SVG)?,
        })
    }

    pub fn from_files(halo: &Path, cross: &Path) -> LogoResult<Self> {
        Ok(Self {
            halo: MarkImage::from_file(halo)?,
            cross: MarkImage::from_file(cross)?,
        })
    }

    pub fn rasterize(&self, size: u32) -> LogoResult<MarkRaster> {
        log::debug!("rasterizing mark assets at {size}px");
        Ok(MarkRaster {
            size,
            halo: self.halo.render(size)?,
            cross: self.cross.render(size)?,
        })
    }
}

/// Mark images ready to draw at one size.
#[derive(Debug, Clone)]
pub struct MarkRaster {
    pub size: u32,
    pub halo: CanvasImage,
    pub cross: CanvasImage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_assets_rasterize_at_size() {
        let assets = MarkAssets::builtin().unwrap();
        let raster = assets.rasterize(250).unwrap();
        assert_eq!((raster.halo.width(), raster.halo.height()), (250, 250));
        assert_eq!((raster.cross.width(), raster.cross.height()), (250, 250));

        let halo_alpha = raster.halo.to_rgba().chunks_exact(4).filter(|p| p[3] > 0).count();
        assert!(halo_alpha > 0);
        // Cross stem below the hollow slash is solid, the slash is a hole.
        assert_eq!(raster.cross.pixel(111, 220).map(|p| p[3]), Some(255));
        assert_eq!(raster.cross.pixel(125, 120).map(|p| p[3]), Some(0));
        // Corners stay transparent.
        assert_eq!(raster.cross.pixel(2, 2).map(|p| p[3]), Some(0));
    }

    #[test]
    fn test_raster_asset_from_png() {
        let image = CanvasImage::from_rgba(&[255, 0, 0, 255].repeat(4), 2, 2).unwrap();
        let png = image.to_png(None).unwrap();
        let mark = MarkImage::from_png_bytes(&png).unwrap();
        let rendered = mark.render(100).unwrap();
        assert_eq!(rendered.width(), 2);
    }

    #[test]
    fn test_from_file_sniffs_format() {
        let dir = tempfile::tempdir().unwrap();
        let svg_path = dir.path().join("mark.svg");
        std::fs::write(&svg_path, HALO_SVG).unwrap();
        assert!(matches!(MarkImage::from_file(&svg_path).unwrap(), MarkImage::Vector(_)));

        let bad_path = dir.path().join("mark.bin");
        std::fs::write(&bad_path, [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(MarkImage::from_file(&bad_path), Err(LogoError::Asset(_))));

        let missing = dir.path().join("missing.png");
        assert!(matches!(MarkImage::from_file(&missing), Err(LogoError::Io { .. })));
    }
}
