//! Raster drawing surface with the subset of the Canvas 2D API used to
//! composite logos: text fill and stroke, polygon paths, shear transforms,
//! `source-over`/`destination-out` compositing, image drawing, and PNG output.
//!
//! It uses:
//! - `tiny-skia` for 2D graphics rendering
//! - `cosmic-text` for text shaping, measurement, and glyph outlines
//! - `fontdb` for the font database, with a configurable `sans-serif` fallback list
//!
//! # Example
//!
//! ```rust,ignore
//! use balogo_canvas2d::{Canvas2dContext, FontConfig, FontSpec, RectParams};
//!
//! let mut ctx = Canvas2dContext::with_config(400, 300, FontConfig::default())?;
//! ctx.set_fill_style("#ffffff")?;
//! ctx.fill_rect(&RectParams::new(0.0, 0.0, 400.0, 300.0));
//! ctx.set_font(FontSpec::new(84.0, ["sans-serif"]));
//! ctx.fill_text("Blue", 200.0, 170.0);
//! let png_data = ctx.to_png(None)?;
//! ```

mod context;
mod dom_matrix;
mod drawing_state;
mod error;
mod font;
mod font_config;
mod geometry;
mod image;
mod style;
mod text;

// Re-export public API
pub use context::Canvas2dContext;
pub use dom_matrix::DOMMatrix;
pub use drawing_state::DrawingState;
pub use error::{Canvas2dError, Canvas2dResult};
pub use font::FontSpec;
pub use font_config::{font_config_to_fontdb, CustomFont, FontConfig};
pub use geometry::{ImageDestParams, PixelRegion, RectParams};
pub use image::CanvasImage;
pub use style::{CompositeOperation, FillStyle, TextAlign};
pub use text::TextMetrics;
