#![allow(clippy::uninlined_format_args)]

use anyhow::{bail, Context};
use balogo_canvas2d::FontConfig;
use balogo_rs::assets::MarkAssets;
use balogo_rs::color::HexColor;
use balogo_rs::engine::{EngineOptions, LogoEngine};
use balogo_rs::export::{ClipboardSink, CopyStatus, StatusIndicator};
use balogo_rs::fonts::{FontDirectory, FontGate, FontSources, RemoteFonts, SystemFonts};
use balogo_rs::session::LogoSession;
use balogo_rs::settings::{BaseSettings, DensityMultiplier};
use balogo_rs::state::EditEvent;
use balogo_rs::{LogoError, LogoResult};
use clap::{Args, Parser, Subcommand};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// balogo: render two-word wordmark logos with a halo and cross mark
#[derive(Parser, Debug)]
#[command(version, name = "balogo")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one logo and save, write or copy it
    Render(RenderArgs),

    /// Read edit events and commands as JSON lines from stdin
    Session(SessionArgs),
}

#[derive(Args, Debug, Clone)]
struct EngineArgs {
    /// Path to a JSON file overriding the base settings
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Density multiplier, 1 to 4. Other values fall back to 1
    #[arg(short, long, default_value = "1")]
    density: String,

    /// Additional directory of font files, loaded before rendering
    #[arg(long)]
    font_dir: Vec<PathBuf>,

    /// URL of a font file to download before rendering
    #[arg(long)]
    font_url: Vec<String>,

    /// How long to wait for --font-dir and --font-url fonts, in milliseconds
    #[arg(long, default_value_t = 5000)]
    font_timeout_ms: u64,

    /// Do not load system fonts
    #[arg(long)]
    no_system_fonts: bool,

    /// Halo image (SVG or PNG) drawn behind the right word
    #[arg(long, requires = "cross")]
    halo: Option<PathBuf>,

    /// Cross image (SVG or PNG) drawn on top of everything
    #[arg(long, requires = "halo")]
    cross: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    engine: EngineArgs,

    /// Left word
    #[arg(short, long)]
    left: Option<String>,

    /// Right word
    #[arg(short, long)]
    right: Option<String>,

    /// Left word color as #RRGGBB
    #[arg(long)]
    left_color: Option<String>,

    /// Right word color as #RRGGBB
    #[arg(long)]
    right_color: Option<String>,

    /// Leave the background transparent instead of white
    #[arg(short, long)]
    transparent: bool,

    /// Horizontal mark offset in pixels
    #[arg(long, allow_hyphen_values = true)]
    offset_x: Option<f32>,

    /// Vertical mark offset in pixels
    #[arg(long, allow_hyphen_values = true)]
    offset_y: Option<f32>,

    /// Write the PNG to this file
    #[arg(short, long, conflicts_with_all = ["out_dir", "copy"])]
    output: Option<PathBuf>,

    /// Save the PNG into this directory under the logo's file name
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Write the PNG to stdout instead of saving it
    #[arg(long)]
    copy: bool,
}

#[derive(Args, Debug)]
struct SessionArgs {
    #[command(flatten)]
    engine: EngineArgs,

    /// Default directory for save commands
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

/// One line of session input.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum SessionInput {
    Request(SessionRequest),
    Edit(EditEvent),
}

#[derive(Deserialize, Debug)]
#[serde(tag = "command", rename_all = "camelCase")]
enum SessionRequest {
    Save { dir: Option<PathBuf> },
    Export { path: PathBuf },
    Copy,
    Status,
}

/// Clipboard stand-in: the PNG goes to stdout.
struct StdoutClipboard;

impl ClipboardSink for StdoutClipboard {
    fn write_image<'a>(&'a self, mime: &'a str, data: Vec<u8>) -> BoxFuture<'a, LogoResult<()>> {
        async move {
            log::debug!("writing {} bytes of {mime} to stdout", data.len());
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(&data)
                .await
                .map_err(|err| LogoError::Clipboard(err.to_string()))?;
            stdout
                .flush()
                .await
                .map_err(|err| LogoError::Clipboard(err.to_string()))
        }
        .boxed()
    }
}

impl EngineArgs {
    fn settings(&self) -> anyhow::Result<BaseSettings> {
        match &self.settings {
            Some(path) => BaseSettings::from_json_file(path)
                .with_context(|| format!("Failed to load settings from {}", path.display())),
            None => Ok(BaseSettings::default()),
        }
    }

    fn font_gate(&self) -> FontGate {
        let mut sources = FontSources::new();
        for dir in &self.font_dir {
            sources = sources.with(FontDirectory::new(dir));
        }
        if !self.font_url.is_empty() {
            sources = sources.with(RemoteFonts::new(self.font_url.clone()));
        }
        let timeout = Duration::from_millis(self.font_timeout_ms);
        if sources.is_empty() {
            FontGate::new(Box::new(SystemFonts), timeout)
        } else {
            FontGate::new(Box::new(sources), timeout)
        }
    }

    fn assets(&self) -> LogoResult<Option<MarkAssets>> {
        match (&self.halo, &self.cross) {
            (Some(halo), Some(cross)) => MarkAssets::from_files(halo, cross).map(Some),
            _ => Ok(None),
        }
    }

    /// Build engine options. Called on whichever thread will own the engine.
    fn engine_options(&self, settings: BaseSettings) -> LogoResult<EngineOptions> {
        let font_config = if self.no_system_fonts {
            FontConfig::empty()
        } else {
            FontConfig::default()
        };
        Ok(EngineOptions {
            settings,
            density: DensityMultiplier::from_input(&self.density),
            font_config,
            font_gate: self.font_gate(),
            assets: self.assets()?,
        })
    }
}

fn color_edit(input: &Option<String>, make: fn(String) -> EditEvent) -> anyhow::Result<Option<EditEvent>> {
    match input {
        Some(color) if HexColor::parse(color).is_none() => {
            bail!("Invalid color {:?}: expected #RRGGBB", color)
        }
        Some(color) => Ok(Some(make(color.clone()))),
        None => Ok(None),
    }
}

async fn render(args: RenderArgs) -> anyhow::Result<()> {
    let settings = args.engine.settings()?;
    let mut edits = Vec::new();
    edits.extend(args.left.clone().map(EditEvent::LeftText));
    edits.extend(args.right.clone().map(EditEvent::RightText));
    edits.extend(color_edit(&args.left_color, EditEvent::LeftColor)?);
    edits.extend(color_edit(&args.right_color, EditEvent::RightColor)?);
    edits.extend(args.offset_x.map(EditEvent::GraphOffsetX));
    edits.extend(args.offset_y.map(EditEvent::GraphOffsetY));
    if args.transparent {
        edits.push(EditEvent::Transparent(true));
    }

    let mut engine = LogoEngine::try_new(args.engine.engine_options(settings)?)
        .context("Failed to initialize logo engine")?;
    for edit in edits {
        engine.apply(edit);
    }
    engine.draw().await.context("Render failed")?;

    if args.copy {
        let status = StatusIndicator::default();
        engine
            .copy(&StdoutClipboard, &status)
            .await
            .context("Failed to copy image")?;
    } else if let Some(output) = &args.output {
        let png = engine.export_png().await.context("Export failed")?;
        write_file(output, &png).await?;
        println!("{}", output.display());
    } else {
        let path = engine
            .save(&args.out_dir)
            .await
            .with_context(|| format!("Failed to save into {}", args.out_dir.display()))?;
        println!("{}", path.display());
    }
    Ok(())
}

async fn write_file(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    tokio::fs::write(path, data)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

async fn handle_request(session: &LogoSession, request: SessionRequest, out_dir: &Path) -> anyhow::Result<()> {
    match request {
        SessionRequest::Save { dir } => {
            let dir = dir.unwrap_or_else(|| out_dir.to_path_buf());
            let path = session.save(dir).await?;
            eprintln!("saved {}", path.display());
        }
        SessionRequest::Export { path } => {
            let png = session.export_png().await?;
            write_file(&path, &png).await?;
            eprintln!("exported {}", path.display());
        }
        SessionRequest::Copy => {
            session.copy().await?;
            eprintln!("copied");
        }
        SessionRequest::Status => {
            let snapshot = session.snapshot().await?;
            let status = serde_json::json!({
                "leftText": snapshot.state.left_text,
                "rightText": snapshot.state.right_text,
                "leftColor": snapshot.state.left_color.as_str(),
                "rightColor": snapshot.state.right_color.as_str(),
                "transparent": snapshot.state.transparent_background,
                "density": snapshot.density.get(),
                "width": snapshot.extents.map(|extents| extents.surface_width()),
                "renders": snapshot.render_count,
                "copied": session.status().status() == CopyStatus::Copied,
            });
            eprintln!("{status}");
        }
    }
    Ok(())
}

async fn session(args: SessionArgs) -> anyhow::Result<()> {
    let settings = args.engine.settings()?;
    let engine_args = args.engine.clone();
    let session = LogoSession::start(
        move || LogoEngine::try_new(engine_args.engine_options(settings)?),
        Arc::new(StdoutClipboard),
        StatusIndicator::default(),
    )
    .await
    .context("Failed to start session")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let input = match serde_json::from_str::<SessionInput>(line) {
            Ok(input) => input,
            Err(err) => {
                log::warn!("Ignoring unrecognized input {:?}: {}", line, err);
                continue;
            }
        };
        let result = match input {
            SessionInput::Edit(event) => session.edit(event).await.map_err(anyhow::Error::from),
            SessionInput::Request(request) => handle_request(&session, request, &args.out_dir).await,
        };
        if let Err(err) = result {
            if matches!(err.downcast_ref::<LogoError>(), Some(LogoError::SessionClosed(_))) {
                return Err(err);
            }
            eprintln!("error: {:#}", err);
        }
    }

    let snapshot = session.snapshot().await?;
    log::info!("session ended after {} render(s)", snapshot.render_count);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Render(args) => render(args).await,
        Command::Session(args) => session(args).await,
    }
}
