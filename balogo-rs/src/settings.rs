//! Base settings and the density-scaled geometry derived from them.

use crate::error::{LogoError, LogoResult};
use balogo_canvas2d::FontSpec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Font families tried in order for both words. The two brand faces come
/// first, CJK-capable heavy sans-serif faces follow, generic sans-serif last.
pub const FONT_FALLBACK_FAMILIES: &[&str] = &[
    "RoGSanSrfStd-Bd",
    "GlowSansSC-Normal-Heavy_diff",
    "apple-system",
    "BlinkMacSystemFont",
    "Segoe UI",
    "Helvetica",
    "Arial",
    "PingFang SC",
    "Hiragino Sans GB",
    "Microsoft YaHei",
    "sans-serif",
];

/// Side length of the logical square the cutout path is expressed in.
pub const CUTOUT_UNITS: f32 = 500.0;

/// Offset of the mark (halo, cutout, cross) relative to the seam.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphOffset {
    pub x: f32,
    pub y: f32,
}

impl GraphOffset {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn scaled(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

/// Geometry at density 1. Every pixel-valued field is scaled by the
/// density multiplier when resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaseSettings {
    pub canvas_height: f32,
    pub canvas_width: f32,
    pub font_size: f32,
    /// Horizontal shear factor applied to both words.
    pub horizontal_tilt: f32,
    /// Alphabetic baseline as a fraction of the canvas height.
    pub text_baseline: f32,
    pub padding_x: f32,
    pub graph_offset: GraphOffset,
    /// Cutout quadrilateral in `CUTOUT_UNITS` space.
    pub hollow_path: [[f32; 2]; 4],
}

impl Default for BaseSettings {
    fn default() -> Self {
        Self {
            canvas_height: 250.0,
            canvas_width: 900.0,
            font_size: 84.0,
            horizontal_tilt: -0.4,
            text_baseline: 0.68,
            padding_x: 10.0,
            graph_offset: GraphOffset::new(-15.0, 0.0),
            hollow_path: [[284.0, 136.0], [321.0, 153.0], [159.0, 410.0], [148.0, 403.0]],
        }
    }
}

impl BaseSettings {
    /// Parse settings from JSON. Missing fields take their default values.
    pub fn from_json_str(json: &str) -> LogoResult<Self> {
        let settings: BaseSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_file(path: &Path) -> LogoResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|err| LogoError::io(path, err))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> LogoResult<()> {
        let positive = [
            ("canvasHeight", self.canvas_height),
            ("canvasWidth", self.canvas_width),
            ("fontSize", self.font_size),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(LogoError::Settings(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        let finite = [
            ("horizontalTilt", self.horizontal_tilt),
            ("textBaseline", self.text_baseline),
            ("paddingX", self.padding_x),
            ("graphOffset.x", self.graph_offset.x),
            ("graphOffset.y", self.graph_offset.y),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(LogoError::Settings(format!("{name} must be finite")));
            }
        }
        if self.hollow_path.iter().flatten().any(|v| !v.is_finite()) {
            return Err(LogoError::Settings(
                "hollowPath points must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Integer upscaling factor in `1..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DensityMultiplier(u8);

impl DensityMultiplier {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    /// Values outside `1..=4` resolve to 1.
    pub fn new(value: i64) -> Self {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Self(value as u8)
        } else {
            Self(1)
        }
    }

    /// Parse raw input the way a number field reports it: leading
    /// whitespace is skipped and the leading integer prefix is used
    /// (`"3px"` is 3, `"2.5"` is 2). Anything unparsable resolves to 1.
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim_start();
        let sign_len = usize::from(trimmed.starts_with(['+', '-']));
        let digits = trimmed[sign_len..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        trimmed[..sign_len + digits]
            .parse::<i64>()
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn factor(self) -> f32 {
        f32::from(self.0)
    }
}

impl Default for DensityMultiplier {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for DensityMultiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.0)
    }
}

/// Active geometry for one density. Rebuilt wholesale whenever the density
/// changes, never edited in place.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryConfig {
    pub canvas_height: f32,
    /// Base canvas width, before growing to fit the words.
    pub canvas_width: f32,
    pub font_size_px: f32,
    pub horizontal_tilt: f32,
    pub text_baseline_ratio: f32,
    pub padding_x: f32,
    pub graph_offset: GraphOffset,
    pub cutout_path: [[f32; 2]; 4],
    pub density: DensityMultiplier,
    pub font: FontSpec,
}

impl GeometryConfig {
    /// Y coordinate of both words' alphabetic baseline.
    pub fn baseline_y(&self) -> f32 {
        self.canvas_height * self.text_baseline_ratio
    }

    /// Symmetric default half-width of the canvas.
    pub fn half_width(&self) -> f32 {
        self.canvas_width / 2.0
    }

    /// Side length of the square halo and cross images.
    pub fn mark_size(&self) -> f32 {
        self.canvas_height
    }

    /// The font as a CSS shorthand string.
    pub fn css_font(&self) -> String {
        self.font.to_string()
    }
}

/// Scale `base` by `density`. Shear, baseline ratio and cutout path are
/// dimensionless and copied unchanged.
pub fn resolve(base: &BaseSettings, density: DensityMultiplier) -> GeometryConfig {
    let k = density.factor();
    let font_size_px = base.font_size * k;
    GeometryConfig {
        canvas_height: base.canvas_height * k,
        canvas_width: base.canvas_width * k,
        font_size_px,
        horizontal_tilt: base.horizontal_tilt,
        text_baseline_ratio: base.text_baseline,
        padding_x: base.padding_x * k,
        graph_offset: base.graph_offset.scaled(k),
        cutout_path: base.hollow_path,
        density,
        font: FontSpec::new(font_size_px, FONT_FALLBACK_FAMILIES.iter().copied()),
    }
}
