//! Font database configuration for canvas contexts.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Which fonts a surface starts with. Fonts can still be added later with
/// [`Canvas2dContext::register_font_data`](crate::Canvas2dContext::register_font_data).
#[derive(Clone, Debug)]
pub struct FontConfig {
    /// Font files passed in as bytes.
    pub custom_fonts: Vec<CustomFont>,
    /// Concrete families tried, in order, for the CSS `sans-serif` generic.
    pub sans_serif: Vec<String>,
    /// Scan the platform font directories.
    pub load_system_fonts: bool,
    /// Extra directories scanned at construction.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            custom_fonts: Vec::new(),
            sans_serif: default_sans_serif(),
            load_system_fonts: true,
            font_dirs: Vec::new(),
        }
    }
}

/// Heavy Latin faces first, then CJK-capable faces, so the generic
/// fallback can still render Chinese and Japanese input.
fn default_sans_serif() -> Vec<String> {
    [
        "Arial",
        "Helvetica",
        "Liberation Sans",
        "Noto Sans CJK SC",
        "Source Han Sans SC",
        "Microsoft YaHei",
        "DejaVu Sans",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Raw font file data registered with the canvas font database.
#[derive(Clone, Debug)]
pub struct CustomFont {
    /// TTF, OTF or TTC bytes, shared between clones.
    pub data: Arc<Vec<u8>>,
}

impl CustomFont {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: Arc::new(data),
        }
    }
}

impl FontConfig {
    /// Configuration that sees no system fonts, only what is registered later.
    pub fn empty() -> Self {
        Self {
            load_system_fonts: false,
            ..Self::default()
        }
    }
}

/// Build the font database described by `config`.
pub fn font_config_to_fontdb(config: &FontConfig) -> fontdb::Database {
    let mut db = fontdb::Database::new();

    if config.load_system_fonts {
        db.load_system_fonts();
    }

    for dir in &config.font_dirs {
        db.load_fonts_dir(dir);
    }

    for font in &config.custom_fonts {
        db.load_font_data(Vec::from(font.data.as_slice()));
    }

    apply_sans_serif(&mut db, &config.sans_serif);
    db
}

/// Point the `sans-serif` generic at the first available family of the list.
pub(crate) fn apply_sans_serif(db: &mut fontdb::Database, preference: &[String]) {
    let available: HashSet<String> = db
        .faces()
        .flat_map(|face| face.families.iter().map(|(family, _)| family.clone()))
        .collect();

    if let Some(family) = preference.iter().find(|f| available.contains(*f)) {
        log::debug!(target: "canvas", "sans-serif resolved to {}", family);
        db.set_sans_serif_family(family.as_str());
    }
}
