//! An interactive logo session: edit events in, renders and exports out.
//!
//! The engine lives on a dedicated thread with its own single-threaded tokio
//! runtime. Callers talk to it through [`LogoSession`], which forwards
//! commands over a channel and awaits the answers.
//!
//! Text edits are debounced per word; an input method composition holds
//! text renders back until it ends. All other edits render immediately.

use crate::engine::LogoEngine;
use crate::error::{LogoError, LogoResult};
use crate::export::{ClipboardSink, StatusIndicator};
use crate::layout::MeasuredExtents;
use crate::settings::DensityMultiplier;
use crate::state::{EditEvent, LogoState, Word};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

/// Quiet period after the last keystroke before a text edit renders.
pub const TEXT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Point-in-time view of a session.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: LogoState,
    pub density: DensityMultiplier,
    pub render_count: u64,
    pub extents: Option<MeasuredExtents>,
}

pub enum SessionCommand {
    Edit(EditEvent),
    Export {
        responder: oneshot::Sender<LogoResult<Vec<u8>>>,
    },
    Save {
        dir: PathBuf,
        responder: oneshot::Sender<LogoResult<PathBuf>>,
    },
    Copy {
        responder: oneshot::Sender<LogoResult<()>>,
    },
    Snapshot {
        responder: oneshot::Sender<SessionSnapshot>,
    },
}

/// Per-word text edits waiting out the debounce window.
#[derive(Default)]
struct PendingText {
    edits: HashMap<Word, (String, Instant)>,
    composing: HashSet<Word>,
}

impl PendingText {
    fn next_deadline(&self) -> Option<Instant> {
        self.edits.values().map(|(_, deadline)| *deadline).min()
    }

    /// Remove edits whose window has passed. Edits to a word that is being
    /// composed are dropped; the composition's final text replaces them.
    fn take_due(&mut self, now: Instant) -> Vec<(Word, String)> {
        let due: Vec<Word> = self
            .edits
            .iter()
            .filter(|(_, (_, deadline))| *deadline <= now)
            .map(|(word, _)| *word)
            .collect();
        let mut fired = Vec::new();
        for word in due {
            if let Some((text, _)) = self.edits.remove(&word) {
                if self.composing.contains(&word) {
                    log::debug!("dropping {word:?} text edit made during composition");
                } else {
                    fired.push((word, text));
                }
            }
        }
        fired.sort_by_key(|(word, _)| *word == Word::Right);
        fired
    }

    /// Remove every pending edit regardless of its deadline.
    fn take_all(&mut self) -> Vec<(Word, String)> {
        self.take_due(Instant::now() + TEXT_DEBOUNCE)
    }
}

fn text_event(word: Word, text: String) -> EditEvent {
    match word {
        Word::Left => EditEvent::LeftText(text),
        Word::Right => EditEvent::RightText(text),
    }
}

async fn draw_logged(engine: &mut LogoEngine) {
    if let Err(err) = engine.draw().await {
        log::error!("Render failed: {err}");
    }
}

/// Apply pending text edits in one render. Returns whether anything rendered.
async fn flush(engine: &mut LogoEngine, edits: Vec<(Word, String)>) -> bool {
    if edits.is_empty() {
        return false;
    }
    for (word, text) in edits {
        engine.apply(text_event(word, text));
    }
    draw_logged(engine).await;
    true
}

async fn handle_edit(engine: &mut LogoEngine, pending: &mut PendingText, event: EditEvent) {
    match event {
        EditEvent::LeftText(text) => {
            pending
                .edits
                .insert(Word::Left, (text, Instant::now() + TEXT_DEBOUNCE));
        }
        EditEvent::RightText(text) => {
            pending
                .edits
                .insert(Word::Right, (text, Instant::now() + TEXT_DEBOUNCE));
        }
        EditEvent::CompositionStart(word) => {
            pending.composing.insert(word);
        }
        EditEvent::CompositionEnd(word, text) => {
            pending.composing.remove(&word);
            pending.edits.remove(&word);
            if let Err(err) = engine.edit(EditEvent::CompositionEnd(word, text)).await {
                log::error!("Render failed: {err}");
            }
        }
        other => {
            if let Err(err) = engine.edit(other).await {
                log::error!("Render failed: {err}");
            }
        }
    }
}

/// Drive `engine` from `receiver` until every sender is gone.
///
/// Renders once at start. Text edits still pending when the channel closes
/// are flushed before returning.
pub async fn run_session(
    mut engine: LogoEngine,
    mut receiver: mpsc::Receiver<SessionCommand>,
    clipboard: Arc<dyn ClipboardSink>,
    status: StatusIndicator,
) {
    let mut pending = PendingText::default();
    draw_logged(&mut engine).await;

    loop {
        let deadline = pending.next_deadline();
        tokio::select! {
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                let due = pending.take_due(Instant::now());
                flush(&mut engine, due).await;
            }
            cmd = receiver.recv() => {
                let Some(cmd) = cmd else { break };
                match cmd {
                    SessionCommand::Edit(event) => handle_edit(&mut engine, &mut pending, event).await,
                    SessionCommand::Export { responder } => {
                        flush(&mut engine, pending.take_all()).await;
                        responder.send(engine.export_png().await).ok();
                    }
                    SessionCommand::Save { dir, responder } => {
                        flush(&mut engine, pending.take_all()).await;
                        let result = engine.save(&dir).await;
                        if let Err(err) = &result {
                            log::error!("Save failed: {err}");
                        }
                        responder.send(result).ok();
                    }
                    SessionCommand::Copy { responder } => {
                        flush(&mut engine, pending.take_all()).await;
                        responder.send(engine.copy(clipboard.as_ref(), &status).await).ok();
                    }
                    SessionCommand::Snapshot { responder } => {
                        responder
                            .send(SessionSnapshot {
                                state: engine.state().clone(),
                                density: engine.config().density,
                                render_count: engine.render_count(),
                                extents: engine.extents().copied(),
                            })
                            .ok();
                    }
                }
            }
        }
    }

    flush(&mut engine, pending.take_all()).await;
    log::debug!("session closed after {} render(s)", engine.render_count());
}

/// Handle to a session running on its own thread.
///
/// # Examples
///
/// ```no_run
/// use balogo_rs::engine::{EngineOptions, LogoEngine};
/// use balogo_rs::session::LogoSession;
/// use balogo_rs::state::EditEvent;
/// # async fn demo(sink: std::sync::Arc<dyn balogo_rs::export::ClipboardSink>) -> balogo_rs::error::LogoResult<()> {
/// let session = LogoSession::start(
///     || LogoEngine::try_new(EngineOptions::default()),
///     sink,
///     Default::default(),
/// )
/// .await?;
/// session.edit(EditEvent::RightText("Archive".to_string())).await?;
/// let png = session.export_png().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LogoSession {
    sender: mpsc::Sender<SessionCommand>,
    status: StatusIndicator,
    _handle: Arc<JoinHandle<()>>,
}

impl LogoSession {
    /// Build the engine on a new session thread and start processing.
    pub async fn start<F>(
        make_engine: F,
        clipboard: Arc<dyn ClipboardSink>,
        status: StatusIndicator,
    ) -> LogoResult<Self>
    where
        F: FnOnce() -> LogoResult<LogoEngine> + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel::<SessionCommand>(32);
        let (ready_tx, ready_rx) = oneshot::channel::<LogoResult<()>>();
        let thread_status = status.clone();

        let handle = thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    ready_tx
                        .send(Err(LogoError::SessionClosed(format!(
                            "failed to start session runtime: {err}"
                        ))))
                        .ok();
                    return;
                }
            };
            let engine = match make_engine() {
                Ok(engine) => engine,
                Err(err) => {
                    ready_tx.send(Err(err)).ok();
                    return;
                }
            };
            ready_tx.send(Ok(())).ok();
            runtime.block_on(run_session(engine, receiver, clipboard, thread_status));
        });

        match ready_rx.await {
            Ok(Ok(())) => Ok(Self {
                sender,
                status,
                _handle: Arc::new(handle),
            }),
            Ok(Err(err)) => Err(err),
            Err(err) => Err(LogoError::SessionClosed(format!(
                "session thread exited during startup: {err}"
            ))),
        }
    }

    pub fn status(&self) -> &StatusIndicator {
        &self.status
    }

    async fn send(&self, cmd: SessionCommand) -> LogoResult<()> {
        self.sender.send(cmd).await.map_err(|err| {
            LogoError::SessionClosed(format!("failed to send session command: {err}"))
        })
    }

    async fn request<T>(
        &self,
        make_cmd: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> LogoResult<T> {
        let (resp_tx, resp_rx) = oneshot::channel::<T>();
        self.send(make_cmd(resp_tx)).await?;
        resp_rx.await.map_err(|err| {
            LogoError::SessionClosed(format!("failed to retrieve session result: {err}"))
        })
    }

    pub async fn edit(&self, event: EditEvent) -> LogoResult<()> {
        self.send(SessionCommand::Edit(event)).await
    }

    pub async fn export_png(&self) -> LogoResult<Vec<u8>> {
        self.request(|responder| SessionCommand::Export { responder })
            .await?
    }

    pub async fn save(&self, dir: PathBuf) -> LogoResult<PathBuf> {
        self.request(|responder| SessionCommand::Save { dir, responder })
            .await?
    }

    pub async fn copy(&self) -> LogoResult<()> {
        self.request(|responder| SessionCommand::Copy { responder })
            .await?
    }

    pub async fn snapshot(&self) -> LogoResult<SessionSnapshot> {
        self.request(|responder| SessionCommand::Snapshot { responder })
            .await
    }
}
