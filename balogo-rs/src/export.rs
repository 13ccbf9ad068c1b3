//! Export of the working surface to PNG, and the save and copy destinations.

use crate::error::{LogoError, LogoResult};
use crate::layout::MeasuredExtents;
use crate::settings::GeometryConfig;
use crate::state::LogoState;
use balogo_canvas2d::{Canvas2dContext, CanvasImage, PixelRegion};
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// MIME type handed to clipboard sinks.
pub const PNG_MIME: &str = "image/png";

/// How long the copy indicator shows success before going idle again.
pub const COPY_STATUS_RESET: Duration = Duration::from_millis(2000);

/// Which part of the working surface goes into the exported image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropPlan {
    /// Export the working surface unchanged.
    Full,
    /// Export only this region.
    Crop(PixelRegion),
}

impl CropPlan {
    /// Crop to the words plus padding when at least one side kept its
    /// default width, otherwise export everything.
    ///
    /// The crop starts at the seam rather than at half the configured
    /// width, so a grown left word is never shifted out of the crop.
    pub fn for_extents(extents: &MeasuredExtents, config: &GeometryConfig, height: u32) -> Self {
        let half = config.half_width();
        let pad = config.padding_x;
        let left_fits = extents.text_width_left + pad < half;
        let right_fits = extents.text_width_right + pad < half;
        if !(left_fits || right_fits) {
            return CropPlan::Full;
        }
        let width = extents.text_width_left + extents.text_width_right + 2.0 * pad;
        let x = extents.seam() - extents.text_width_left - pad;
        CropPlan::Crop(PixelRegion {
            x: x.floor() as i32,
            y: 0,
            width: width.ceil().max(1.0) as u32,
            height,
        })
    }
}

/// Copy the exported image out of the working surface. The surface is left
/// untouched.
pub fn export_image(
    surface: &Canvas2dContext,
    extents: &MeasuredExtents,
    config: &GeometryConfig,
) -> LogoResult<CanvasImage> {
    match CropPlan::for_extents(extents, config, surface.height()) {
        CropPlan::Full => Ok(surface.snapshot()),
        CropPlan::Crop(region) => surface
            .snapshot_region(&region)
            .map_err(|err| LogoError::Export(err.to_string())),
    }
}

/// Encode an exported image as PNG off the async executor.
pub async fn encode_png(image: CanvasImage) -> LogoResult<Vec<u8>> {
    tokio::task::spawn_blocking(move || image.to_png(None))
        .await
        .map_err(|err| LogoError::Export(format!("encoder task failed: {err}")))?
        .map_err(|err| LogoError::Export(err.to_string()))
}

/// Export the working surface as PNG bytes.
pub async fn export(
    surface: &Canvas2dContext,
    extents: &MeasuredExtents,
    config: &GeometryConfig,
) -> LogoResult<Vec<u8>> {
    let image = export_image(surface, extents, config)?;
    log::debug!("exporting {}x{} image", image.width(), image.height());
    encode_png(image).await
}

/// File name used by the save destination.
///
/// Path separators in the words are replaced so the file always lands in the
/// chosen directory.
pub fn save_file_name(state: &LogoState) -> String {
    let name = format!("{}{}_ba-style@nulla.top.png", state.left_text, state.right_text);
    name.replace(['/', '\\', '\0'], "_")
}

/// Write `png` into `dir` under the save file name.
pub async fn save_png(dir: &Path, state: &LogoState, png: &[u8]) -> LogoResult<PathBuf> {
    let path = dir.join(save_file_name(state));
    tokio::fs::write(&path, png)
        .await
        .map_err(|err| LogoError::io(&path, err))?;
    log::info!("saved {}", path.display());
    Ok(path)
}

/// A destination that accepts an image as a typed clipboard object.
pub trait ClipboardSink: Send + Sync {
    fn write_image<'a>(&'a self, mime: &'a str, data: Vec<u8>) -> BoxFuture<'a, LogoResult<()>>;
}

/// State shown by the copy indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStatus {
    Idle,
    Copied,
}

/// Copy success indicator that returns to idle on its own.
///
/// Each success restarts the reset timer.
#[derive(Debug, Clone)]
pub struct StatusIndicator {
    sender: Arc<watch::Sender<CopyStatus>>,
    generation: Arc<AtomicU64>,
    reset_after: Duration,
}

impl Default for StatusIndicator {
    fn default() -> Self {
        Self::new(COPY_STATUS_RESET)
    }
}

impl StatusIndicator {
    pub fn new(reset_after: Duration) -> Self {
        let (sender, _) = watch::channel(CopyStatus::Idle);
        Self {
            sender: Arc::new(sender),
            generation: Arc::new(AtomicU64::new(0)),
            reset_after,
        }
    }

    pub fn status(&self) -> CopyStatus {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<CopyStatus> {
        self.sender.subscribe()
    }

    /// Show success now and schedule the reset. Requires a tokio runtime.
    pub fn flash_success(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.sender.send_replace(CopyStatus::Copied);

        let sender = Arc::clone(&self.sender);
        let current = Arc::clone(&self.generation);
        let reset_after = self.reset_after;
        tokio::spawn(async move {
            tokio::time::sleep(reset_after).await;
            if current.load(Ordering::SeqCst) == generation {
                sender.send_replace(CopyStatus::Idle);
            }
        });
    }
}

/// Hand `png` to the clipboard and flash the indicator on success.
///
/// Failures are logged and returned, and the indicator stays as it was.
pub async fn copy_png(
    sink: &dyn ClipboardSink,
    status: &StatusIndicator,
    png: Vec<u8>,
) -> LogoResult<()> {
    match sink.write_image(PNG_MIME, png).await {
        Ok(()) => {
            log::info!("image copied");
            status.flash_success();
            Ok(())
        }
        Err(err) => {
            log::error!("can't copy: {err}");
            Err(err)
        }
    }
}
