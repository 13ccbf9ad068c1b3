//! Text rendering operations for Canvas2dContext.

use super::Canvas2dContext;
use crate::font::FontSpec;
use crate::style::TextAlign;
use crate::text::{calculate_text_x_offset, shape_line, TextMetrics};
use cosmic_text::Command;
use tiny_skia::{Path, PathBuilder, Transform};

/// Miter limit for outlined text, matching the Canvas 2D default.
const STROKE_MITER_LIMIT: f32 = 10.0;

impl Canvas2dContext {
    /// Set the current font.
    pub fn set_font(&mut self, font: FontSpec) {
        log::debug!(target: "canvas", "font {}", font);
        self.state.font = font;
    }

    /// Get the current font.
    pub fn font(&self) -> &FontSpec {
        &self.state.font
    }

    /// Set the text alignment.
    pub fn set_text_align(&mut self, align: TextAlign) {
        self.state.text_align = align;
    }

    /// Measure text and return metrics.
    pub fn measure_text(&mut self, text: &str) -> TextMetrics {
        crate::text::measure_text(&mut self.font_system, text, &self.state.font)
    }

    /// Fill text with its alphabetic baseline at `y`.
    pub fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        log::debug!(target: "canvas", "fillText \"{}\" {} {}", text, x, y);
        self.render_text_impl(text, x, y, true);
    }

    /// Stroke text outlines with the current line width.
    pub fn stroke_text(&mut self, text: &str, x: f32, y: f32) {
        log::debug!(target: "canvas", "strokeText \"{}\" {} {}", text, x, y);
        self.render_text_impl(text, x, y, false);
    }

    /// Collect glyph outlines of `text` as paths, each with its placement transform.
    fn glyph_paths(&mut self, text: &str, x: f32, y: f32) -> Vec<(Path, Transform)> {
        if self.font_system.db().is_empty() {
            return Vec::new();
        }
        let buffer = shape_line(&mut self.font_system, text, &self.state.font);

        let text_width = buffer
            .layout_runs()
            .fold(0.0_f32, |width, run| width.max(run.line_w));
        let base_x = x + calculate_text_x_offset(text_width, self.state.text_align);
        let base_y = y;
        let transform = self.state.transform;

        let mut paths = Vec::new();
        for run in buffer.layout_runs() {
            for glyph in run.glyphs.iter() {
                let physical_glyph = glyph.physical((base_x, base_y), 1.0);

                // Floating-point glyph position for sub-pixel precision
                let glyph_x = base_x + glyph.x + glyph.font_size * glyph.x_offset;
                let glyph_y = base_y + glyph.y - glyph.font_size * glyph.y_offset;

                let Some(commands) = self
                    .swash_cache
                    .get_outline_commands(&mut self.font_system, physical_glyph.cache_key)
                else {
                    continue;
                };

                // Font outlines have Y pointing up, the surface has Y pointing down
                let mut pb = PathBuilder::new();
                for cmd in commands {
                    match cmd {
                        Command::MoveTo(p) => pb.move_to(p.x, -p.y),
                        Command::LineTo(p) => pb.line_to(p.x, -p.y),
                        Command::QuadTo(ctrl, end) => pb.quad_to(ctrl.x, -ctrl.y, end.x, -end.y),
                        Command::CurveTo(c1, c2, end) => {
                            pb.cubic_to(c1.x, -c1.y, c2.x, -c2.y, end.x, -end.y)
                        }
                        Command::Close => pb.close(),
                    }
                }

                if let Some(path) = pb.finish() {
                    let glyph_transform =
                        Transform::from_translate(glyph_x, glyph_y).post_concat(transform);
                    paths.push((path, glyph_transform));
                }
            }
        }
        paths
    }

    /// Render text as vector glyph paths (shared by fillText and strokeText).
    fn render_text_impl(&mut self, text: &str, x: f32, y: f32, fill: bool) {
        let paths = self.glyph_paths(text, x, y);
        if paths.is_empty() {
            return;
        }

        if fill {
            let paint = self.paint_for(self.state.fill_style);
            for (path, transform) in &paths {
                self.pixmap.fill_path(
                    path,
                    &paint,
                    tiny_skia::FillRule::Winding,
                    *transform,
                    None,
                );
            }
        } else {
            let paint = self.paint_for(self.state.stroke_style);
            let stroke = tiny_skia::Stroke {
                width: self.state.line_width,
                line_join: tiny_skia::LineJoin::Miter,
                miter_limit: STROKE_MITER_LIMIT,
                ..Default::default()
            };
            for (path, transform) in &paths {
                self.pixmap
                    .stroke_path(path, &paint, &stroke, *transform, None);
            }
        }
    }
}
