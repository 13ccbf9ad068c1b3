//! The logo engine: owns the state, the working surface and the current
//! geometry, and runs the resolve, layout, composite pipeline on demand.

use crate::assets::{MarkAssets, MarkRaster};
use crate::compositor::{self, RenderReport};
use crate::error::{LogoError, LogoResult};
use crate::export::{self, ClipboardSink, StatusIndicator};
use crate::fonts::{FontGate, GateOutcome};
use crate::layout::{layout, MeasuredExtents};
use crate::settings::{resolve, BaseSettings, DensityMultiplier, GeometryConfig};
use crate::state::{EditEvent, EditOutcome, LogoState};
use balogo_canvas2d::{Canvas2dContext, FontConfig};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Everything needed to build a [`LogoEngine`].
pub struct EngineOptions {
    pub settings: BaseSettings,
    pub density: DensityMultiplier,
    pub font_config: FontConfig,
    pub font_gate: FontGate,
    pub assets: Option<MarkAssets>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            settings: BaseSettings::default(),
            density: DensityMultiplier::default(),
            font_config: FontConfig::default(),
            font_gate: FontGate::default(),
            assets: None,
        }
    }
}

pub struct LogoEngine {
    settings: BaseSettings,
    config: GeometryConfig,
    state: LogoState,
    surface: Canvas2dContext,
    font_gate: FontGate,
    assets: MarkAssets,
    marks: Option<MarkRaster>,
    extents: Option<MeasuredExtents>,
    render_count: u64,
}

impl LogoEngine {
    pub fn try_new(options: EngineOptions) -> LogoResult<Self> {
        options.settings.validate()?;
        let config = resolve(&options.settings, options.density);
        let surface = Canvas2dContext::with_config(
            config.canvas_width.ceil() as u32,
            config.canvas_height.ceil() as u32,
            options.font_config,
        )?;
        let assets = match options.assets {
            Some(assets) => assets,
            None => MarkAssets::builtin()?,
        };
        log::info!("logo engine ready at {} ({})", config.density, config.css_font());
        Ok(Self {
            state: LogoState::new(&config),
            settings: options.settings,
            config,
            surface,
            font_gate: options.font_gate,
            assets,
            marks: None,
            extents: None,
            render_count: 0,
        })
    }

    pub fn state(&self) -> &LogoState {
        &self.state
    }

    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    pub fn surface(&self) -> &Canvas2dContext {
        &self.surface
    }

    /// Layout of the last render, if any.
    pub fn extents(&self) -> Option<&MeasuredExtents> {
        self.extents.as_ref()
    }

    /// Number of completed renders.
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    /// Rebuild the geometry at `density`. The mark offset goes back to the
    /// scaled default.
    pub fn set_density(&mut self, density: DensityMultiplier) {
        self.config = resolve(&self.settings, density);
        self.state.graph_offset = self.config.graph_offset;
        log::info!("density {} ({})", density, self.config.css_font());
    }

    /// Apply an edit without rendering. Any change discards the last
    /// layout, so the next export renders again.
    pub fn apply(&mut self, event: EditEvent) -> EditOutcome {
        let outcome = self.state.apply(event);
        match outcome {
            EditOutcome::Ignored => {}
            EditOutcome::Changed => self.extents = None,
            EditOutcome::Density(density) => {
                self.set_density(density);
                self.extents = None;
            }
        }
        outcome
    }

    /// Apply an edit and render if it changed anything.
    pub async fn edit(&mut self, event: EditEvent) -> LogoResult<Option<RenderReport>> {
        match self.apply(event) {
            EditOutcome::Ignored => Ok(None),
            EditOutcome::Changed | EditOutcome::Density(_) => self.draw().await.map(Some),
        }
    }

    /// Rasterize the mark images again when the mark size changed.
    fn refresh_marks(&mut self) -> LogoResult<()> {
        let size = self.config.mark_size().round().max(1.0) as u32;
        let stale = self.marks.as_ref().map_or(true, |marks| marks.size != size);
        if stale {
            self.marks = Some(self.assets.rasterize(size)?);
        }
        Ok(())
    }

    /// Run the full pipeline from the current state.
    pub async fn draw(&mut self) -> LogoResult<RenderReport> {
        let sample = self.state.sample_text();
        log::debug!("waiting for fonts");
        let started = Instant::now();
        let outcome = self.font_gate.ensure(&mut self.surface, &sample).await;
        log::debug!("font wait finished after {:?}: {:?}", started.elapsed(), outcome);
        if let GateOutcome::Ready { new_faces } = outcome {
            if new_faces > 0 {
                log::debug!("{new_faces} new font face(s) available");
            }
        }

        let extents = layout(&self.state, &self.config, &mut self.surface);
        self.refresh_marks()?;
        let Some(marks) = self.marks.as_ref() else {
            return Err(LogoError::Asset("mark images unavailable".to_string()));
        };
        let report = compositor::render(
            &mut self.surface,
            &self.state,
            &self.config,
            &extents,
            marks,
        )?;
        self.extents = Some(extents);
        self.render_count += 1;
        Ok(report)
    }

    async fn current_extents(&mut self) -> LogoResult<MeasuredExtents> {
        match self.extents {
            Some(extents) => Ok(extents),
            None => {
                self.draw().await?;
                self.extents
                    .ok_or_else(|| LogoError::Export("nothing has been rendered".to_string()))
            }
        }
    }

    /// Export the current frame as PNG, rendering first if nothing has been
    /// drawn yet.
    pub async fn export_png(&mut self) -> LogoResult<Vec<u8>> {
        let extents = self.current_extents().await?;
        export::export(&self.surface, &extents, &self.config).await
    }

    /// Export and write the PNG into `dir`.
    pub async fn save(&mut self, dir: &Path) -> LogoResult<PathBuf> {
        let png = self.export_png().await?;
        export::save_png(dir, &self.state, &png).await
    }

    /// Export and hand the PNG to the clipboard.
    pub async fn copy(&mut self, sink: &dyn ClipboardSink, status: &StatusIndicator) -> LogoResult<()> {
        let png = self.export_png().await?;
        export::copy_png(sink, status, png).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GraphOffset;
    use crate::state::Word;

    fn engine() -> LogoEngine {
        LogoEngine::try_new(EngineOptions {
            font_config: FontConfig::empty(),
            ..EngineOptions::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_draw_counts_renders() {
        let mut engine = engine();
        assert_eq!(engine.render_count(), 0);
        assert!(engine.extents().is_none());
        let report = engine.draw().await.unwrap();
        assert_eq!(engine.render_count(), 1);
        assert_eq!((report.width, report.height), (900, 250));
        assert_eq!(engine.surface().width(), 900);
    }

    #[tokio::test]
    async fn test_invalid_color_does_not_render() {
        let mut engine = engine();
        assert!(engine
            .edit(EditEvent::LeftColor("#12".to_string()))
            .await
            .unwrap()
            .is_none());
        assert_eq!(engine.render_count(), 0);
        assert!(engine
            .edit(EditEvent::LeftColor("#000000".to_string()))
            .await
            .unwrap()
            .is_some());
        assert_eq!(engine.render_count(), 1);
    }

    #[tokio::test]
    async fn test_density_edit_rescales_and_resets_offset() {
        let mut engine = engine();
        engine.apply(EditEvent::GraphOffsetX(40.0));
        assert_eq!(engine.state().graph_offset, GraphOffset::new(40.0, 0.0));

        let report = engine
            .edit(EditEvent::Density("2".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(engine.config().density.get(), 2);
        assert_eq!(engine.state().graph_offset, GraphOffset::new(-30.0, 0.0));
        assert_eq!((report.width, report.height), (1800, 500));

        engine.edit(EditEvent::Density("12".to_string())).await.unwrap();
        assert_eq!(engine.config().density.get(), 1);
        assert_eq!(engine.surface().height(), 250);
    }

    #[tokio::test]
    async fn test_apply_then_export_uses_fresh_layout() {
        let mut engine = engine();
        engine.draw().await.unwrap();
        assert_eq!(engine.render_count(), 1);

        assert_eq!(engine.apply(EditEvent::LeftColor("bad".to_string())), EditOutcome::Ignored);
        assert!(engine.extents().is_some());

        engine.apply(EditEvent::Density("2".to_string()));
        assert!(engine.extents().is_none());
        let png = engine.export_png().await.unwrap();
        assert_eq!(engine.render_count(), 2);
        assert_eq!(engine.surface().height(), 500);
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.height(), 500);
        let extents = *engine.extents().unwrap();
        let expected =
            extents.text_width_left + extents.text_width_right + 2.0 * engine.config().padding_x;
        assert_eq!(decoded.width(), expected.ceil() as u32);
    }

    #[tokio::test]
    async fn test_export_renders_first_when_needed() {
        let mut engine = engine();
        let png = engine.export_png().await.unwrap();
        assert_eq!(engine.render_count(), 1);
        let decoded = image::load_from_memory(&png).unwrap();
        // No fonts: both words measure zero, so the crop is just padding
        // around the skew correction.
        let extents = *engine.extents().unwrap();
        let expected = extents.text_width_left + extents.text_width_right + 20.0;
        assert_eq!(decoded.width(), expected.ceil() as u32);
        assert_eq!(decoded.height(), 250);
    }

    #[tokio::test]
    async fn test_save_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine();
        engine
            .edit(EditEvent::CompositionEnd(Word::Left, "Red".to_string()))
            .await
            .unwrap();
        let path = engine.save(dir.path()).await.unwrap();
        assert_eq!(path, dir.path().join("RedArchive_ba-style@nulla.top.png"));
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[tokio::test]
    async fn test_save_to_missing_dir_is_an_error() {
        let mut engine = engine();
        let result = engine.save(Path::new("/definitely/not/here")).await;
        assert!(matches!(result, Err(LogoError::Io { .. })));
        // The session can carry on.
        assert!(engine.draw().await.is_ok());
    }
}
