//! Font loading collaborators and the bounded wait that gates layout on them.

use crate::error::{LogoError, LogoResult};
use balogo_canvas2d::Canvas2dContext;
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell};

static BALOGO_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Default bound on how long a render waits for fonts.
pub const DEFAULT_FONT_TIMEOUT: Duration = Duration::from_millis(5000);

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];

lazy_static! {
    static ref REQWEST_CLIENT: Client = reqwest::ClientBuilder::new()
        .user_agent(BALOGO_USER_AGENT)
        .build()
        .unwrap_or_else(|err| {
            log::warn!("Failed to configure font download client, using defaults: {err}");
            Client::new()
        });
}

/// Raw font file bytes, identified by where they came from.
#[derive(Debug, Clone)]
pub struct FontData {
    pub key: String,
    pub data: Arc<Vec<u8>>,
}

/// Delivers the fonts needed to render `sample_text`.
pub trait FontLoader: Send + Sync {
    fn load<'a>(&'a self, sample_text: &'a str) -> BoxFuture<'a, LogoResult<Vec<FontData>>>;
}

/// Relies on the fonts scanned when the surface was created.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFonts;

impl FontLoader for SystemFonts {
    fn load<'a>(&'a self, _sample_text: &'a str) -> BoxFuture<'a, LogoResult<Vec<FontData>>> {
        futures::future::ready(Ok(Vec::new())).boxed()
    }
}

/// Every TTF/OTF/TTC file directly inside a directory, read once.
#[derive(Debug)]
pub struct FontDirectory {
    dir: PathBuf,
    fonts: OnceCell<Vec<FontData>>,
}

impl FontDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            fonts: OnceCell::new(),
        }
    }

    async fn read_fonts(dir: &Path) -> LogoResult<Vec<FontData>> {
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|err| LogoError::io(dir, err))?;
        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| LogoError::io(dir, err))?
        {
            let path = entry.path();
            let is_font = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| FONT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
            if is_font {
                paths.push(path);
            }
        }
        paths.sort();

        let mut fonts = Vec::with_capacity(paths.len());
        for path in paths {
            let data = tokio::fs::read(&path)
                .await
                .map_err(|err| LogoError::io(&path, err))?;
            log::debug!("read font file {}", path.display());
            fonts.push(FontData {
                key: path.display().to_string(),
                data: Arc::new(data),
            });
        }
        Ok(fonts)
    }
}

impl FontLoader for FontDirectory {
    fn load<'a>(&'a self, _sample_text: &'a str) -> BoxFuture<'a, LogoResult<Vec<FontData>>> {
        async move {
            let fonts = self
                .fonts
                .get_or_try_init(|| Self::read_fonts(&self.dir))
                .await?;
            Ok(fonts.clone())
        }
        .boxed()
    }
}

/// Font files downloaded over HTTP. Each URL is fetched once; failed
/// downloads are retried on the next load.
#[derive(Debug)]
pub struct RemoteFonts {
    urls: Vec<String>,
    client: Client,
    cache: Mutex<HashMap<String, Arc<Vec<u8>>>>,
}

impl RemoteFonts {
    pub fn new(urls: Vec<String>) -> Self {
        Self {
            urls,
            client: REQWEST_CLIENT.clone(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    async fn fetch(&self, url: &str) -> LogoResult<Arc<Vec<u8>>> {
        if let Some(data) = self.cache.lock().await.get(url) {
            return Ok(Arc::clone(data));
        }
        log::info!("downloading font {url}");
        let response = self.client.get(url).send().await?.error_for_status()?;
        let data = Arc::new(response.bytes().await?.to_vec());
        self.cache
            .lock()
            .await
            .insert(url.to_string(), Arc::clone(&data));
        Ok(data)
    }
}

impl FontLoader for RemoteFonts {
    fn load<'a>(&'a self, _sample_text: &'a str) -> BoxFuture<'a, LogoResult<Vec<FontData>>> {
        async move {
            let mut fonts = Vec::with_capacity(self.urls.len());
            for url in &self.urls {
                fonts.push(FontData {
                    key: url.clone(),
                    data: self.fetch(url).await?,
                });
            }
            Ok(fonts)
        }
        .boxed()
    }
}

/// Several loaders queried in order. Any failure fails the whole load.
#[derive(Default)]
pub struct FontSources {
    loaders: Vec<Box<dyn FontLoader>>,
}

impl FontSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, loader: impl FontLoader + 'static) -> Self {
        self.loaders.push(Box::new(loader));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

impl FontLoader for FontSources {
    fn load<'a>(&'a self, sample_text: &'a str) -> BoxFuture<'a, LogoResult<Vec<FontData>>> {
        async move {
            let mut fonts = Vec::new();
            for loader in &self.loaders {
                fonts.extend(loader.load(sample_text).await?);
            }
            Ok(fonts)
        }
        .boxed()
    }
}

/// How a font wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Fonts arrived; `new_faces` faces were added to the surface.
    Ready { new_faces: usize },
    /// The loader failed. Rendering goes ahead with what is available.
    Failed,
    /// The loader did not answer in time. Rendering goes ahead anyway.
    TimedOut,
}

/// Waits a bounded time for a loader and registers what it delivers with
/// the surface. Each font is registered once.
pub struct FontGate {
    loader: Box<dyn FontLoader>,
    timeout: Duration,
    registered: HashSet<String>,
}

impl FontGate {
    pub fn new(loader: Box<dyn FontLoader>, timeout: Duration) -> Self {
        Self {
            loader,
            timeout,
            registered: HashSet::new(),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn ensure(&mut self, surface: &mut Canvas2dContext, sample_text: &str) -> GateOutcome {
        let fonts = match tokio::time::timeout(self.timeout, self.loader.load(sample_text)).await {
            Ok(Ok(fonts)) => fonts,
            Ok(Err(err)) => {
                log::warn!("Font loading failed, rendering with available fonts: {err}");
                return GateOutcome::Failed;
            }
            Err(_) => {
                log::warn!(
                    "Font loading timed out after {:?}, rendering with available fonts",
                    self.timeout
                );
                return GateOutcome::TimedOut;
            }
        };

        let mut new_faces = 0;
        for font in fonts {
            if self.registered.insert(font.key.clone()) {
                let added = surface.register_font_data(font.data.as_ref().clone());
                if added == 0 {
                    log::warn!("No usable font faces in {}", font.key);
                }
                new_faces += added;
            }
        }
        GateOutcome::Ready { new_faces }
    }
}

impl Default for FontGate {
    fn default() -> Self {
        Self::new(Box::new(SystemFonts), DEFAULT_FONT_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use balogo_canvas2d::FontConfig;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn surface() -> Canvas2dContext {
        Canvas2dContext::with_config(1, 1, FontConfig::empty()).unwrap()
    }

    struct NeverLoads;

    impl FontLoader for NeverLoads {
        fn load<'a>(&'a self, _sample_text: &'a str) -> BoxFuture<'a, LogoResult<Vec<FontData>>> {
            futures::future::pending().boxed()
        }
    }

    struct Broken;

    impl FontLoader for Broken {
        fn load<'a>(&'a self, _sample_text: &'a str) -> BoxFuture<'a, LogoResult<Vec<FontData>>> {
            futures::future::ready(Err(LogoError::FontLoad("offline".to_string()))).boxed()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_times_out() {
        let mut gate = FontGate::new(Box::new(NeverLoads), Duration::from_millis(5000));
        let started = tokio::time::Instant::now();
        assert_eq!(gate.ensure(&mut surface(), "Blue").await, GateOutcome::TimedOut);
        assert_eq!(started.elapsed(), Duration::from_millis(5000));
    }

    #[tokio::test]
    async fn test_gate_failure_is_not_fatal() {
        let mut gate = FontGate::new(Box::new(Broken), DEFAULT_FONT_TIMEOUT);
        assert_eq!(gate.ensure(&mut surface(), "Blue").await, GateOutcome::Failed);
    }

    #[tokio::test]
    async fn test_font_directory_filters_and_registers_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.TTF"), [0u8; 16]).unwrap();
        std::fs::write(dir.path().join("a.otf"), [0u8; 16]).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a font").unwrap();

        let loader = FontDirectory::new(dir.path());
        let fonts = loader.load("").await.unwrap();
        let names: Vec<_> = fonts
            .iter()
            .map(|f| Path::new(&f.key).file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.otf", "b.TTF"]);

        let mut gate = FontGate::new(Box::new(loader), DEFAULT_FONT_TIMEOUT);
        let mut surface = surface();
        assert_eq!(
            gate.ensure(&mut surface, "x").await,
            GateOutcome::Ready { new_faces: 0 }
        );
        assert_eq!(gate.registered.len(), 2);
        gate.ensure(&mut surface, "y").await;
        assert_eq!(gate.registered.len(), 2);
    }

    #[tokio::test]
    async fn test_font_sources_concatenate_in_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(first.path().join("one.ttf"), [0u8; 4]).unwrap();
        std::fs::write(second.path().join("two.ttf"), [0u8; 4]).unwrap();

        let sources = FontSources::new()
            .with(FontDirectory::new(first.path()))
            .with(SystemFonts)
            .with(FontDirectory::new(second.path()));
        let fonts = sources.load("").await.unwrap();
        assert_eq!(fonts.len(), 2);
        assert!(fonts[0].key.ends_with("one.ttf"));
        assert!(fonts[1].key.ends_with("two.ttf"));

        let failing = FontSources::new().with(SystemFonts).with(Broken);
        assert!(failing.load("").await.is_err());
    }

    #[tokio::test]
    async fn test_missing_font_directory() {
        let loader = FontDirectory::new("/definitely/not/a/font/dir");
        assert!(matches!(loader.load("").await, Err(LogoError::Io { .. })));
    }

    /// Serves `body` to every connection and counts requests.
    fn serve(body: &'static [u8]) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let header = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(header.as_bytes());
                let _ = stream.write_all(body);
            }
        });
        (format!("http://{addr}/font.ttf"), hits)
    }

    #[tokio::test]
    async fn test_remote_fonts_are_cached() {
        let (url, hits) = serve(b"fake font bytes");
        let loader = RemoteFonts::new(vec![url.clone()]);

        let first = loader.load("Blue").await.unwrap();
        let second = loader.load("Archive").await.unwrap();
        assert_eq!(first[0].key, url);
        assert_eq!(first[0].data.as_slice(), b"fake font bytes");
        assert!(Arc::ptr_eq(&first[0].data, &second[0].data));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_remote_fonts_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let loader = RemoteFonts::new(vec![format!("http://{addr}/font.ttf")]);
        assert!(matches!(loader.load("").await, Err(LogoError::FontLoad(_))));
    }
}
