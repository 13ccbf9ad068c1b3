//! Style types and enums for Canvas 2D operations.

use crate::error::Canvas2dError;
use std::str::FromStr;

/// Fill or stroke paint source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillStyle {
    /// Solid color fill.
    Color(tiny_skia::Color),
}

impl Default for FillStyle {
    fn default() -> Self {
        // Default is opaque black
        FillStyle::Color(tiny_skia::Color::BLACK)
    }
}

/// Horizontal text alignment relative to the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// Align text to the start (left for LTR).
    #[default]
    Start,
    /// Align text to the end (right for LTR).
    End,
}

/// Porter-Duff operation applied when painting onto the surface.
///
/// Only the operations the wordmark needs are modelled: normal painting and
/// erasing the destination under the painted shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeOperation {
    /// Paint over existing pixels (`source-over`).
    #[default]
    SourceOver,
    /// Remove existing pixels where the source is painted (`destination-out`).
    DestinationOut,
}

impl CompositeOperation {
    /// CSS keyword for this operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompositeOperation::SourceOver => "source-over",
            CompositeOperation::DestinationOut => "destination-out",
        }
    }
}

impl FromStr for CompositeOperation {
    type Err = Canvas2dError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "source-over" => Ok(CompositeOperation::SourceOver),
            "destination-out" => Ok(CompositeOperation::DestinationOut),
            _ => Err(Canvas2dError::CompositeParseError(s.to_string())),
        }
    }
}

impl From<CompositeOperation> for tiny_skia::BlendMode {
    fn from(op: CompositeOperation) -> Self {
        match op {
            CompositeOperation::SourceOver => tiny_skia::BlendMode::SourceOver,
            CompositeOperation::DestinationOut => tiny_skia::BlendMode::DestinationOut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_operation_keywords() {
        assert_eq!(
            "destination-out".parse::<CompositeOperation>().unwrap(),
            CompositeOperation::DestinationOut
        );
        assert_eq!(
            "source-over".parse::<CompositeOperation>().unwrap(),
            CompositeOperation::SourceOver
        );
        assert!("multiply".parse::<CompositeOperation>().is_err());
        assert_eq!(CompositeOperation::DestinationOut.as_str(), "destination-out");
    }

    #[test]
    fn test_blend_mode_mapping() {
        assert_eq!(
            tiny_skia::BlendMode::from(CompositeOperation::DestinationOut),
            tiny_skia::BlendMode::DestinationOut
        );
    }
}
