//! Mutable logo state and the edit events that change it.

use crate::color::HexColor;
use crate::settings::{DensityMultiplier, GeometryConfig, GraphOffset};
use serde::{Deserialize, Serialize};

/// Which of the two words an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Word {
    Left,
    Right,
}

/// A single field edit delivered by an input collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "value", rename_all = "camelCase")]
pub enum EditEvent {
    LeftText(String),
    RightText(String),
    /// Raw color input; ignored unless it is strict `#RRGGBB`.
    LeftColor(String),
    RightColor(String),
    Transparent(bool),
    /// Raw density input, parsed like a number field.
    Density(String),
    GraphOffsetX(f32),
    GraphOffsetY(f32),
    /// An input method started composing into a word.
    CompositionStart(Word),
    /// Composition finished with the final text of the word.
    CompositionEnd(Word, String),
}

impl EditEvent {
    /// Text edits are debounced; everything else applies immediately.
    pub fn is_text_input(&self) -> bool {
        matches!(self, EditEvent::LeftText(_) | EditEvent::RightText(_))
    }

    pub fn word(&self) -> Option<Word> {
        match self {
            EditEvent::LeftText(_) => Some(Word::Left),
            EditEvent::RightText(_) => Some(Word::Right),
            EditEvent::CompositionStart(word) | EditEvent::CompositionEnd(word, _) => Some(*word),
            _ => None,
        }
    }
}

/// What applying an edit requires of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// State changed, render again.
    Changed,
    /// Nothing changed, no render.
    Ignored,
    /// Geometry must be rebuilt at this density before rendering.
    Density(DensityMultiplier),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogoState {
    pub left_text: String,
    pub right_text: String,
    pub left_color: HexColor,
    pub right_color: HexColor,
    pub transparent_background: bool,
    /// Mark offset, initialised from the geometry and edited independently.
    pub graph_offset: GraphOffset,
}

impl LogoState {
    pub fn new(config: &GeometryConfig) -> Self {
        Self {
            left_text: "Blue".to_string(),
            right_text: "Archive".to_string(),
            left_color: HexColor::default_left(),
            right_color: HexColor::default_right(),
            transparent_background: false,
            graph_offset: config.graph_offset,
        }
    }

    /// Text used to decide which glyphs must be loadable before measuring.
    pub fn sample_text(&self) -> String {
        format!("{}{}", self.left_text, self.right_text)
    }

    /// Apply one edit. Invalid colors and non-finite offsets leave the
    /// state untouched.
    pub fn apply(&mut self, event: EditEvent) -> EditOutcome {
        match event {
            EditEvent::LeftText(text) | EditEvent::CompositionEnd(Word::Left, text) => {
                self.left_text = text;
                EditOutcome::Changed
            }
            EditEvent::RightText(text) | EditEvent::CompositionEnd(Word::Right, text) => {
                self.right_text = text;
                EditOutcome::Changed
            }
            EditEvent::LeftColor(input) => set_color(&mut self.left_color, &input),
            EditEvent::RightColor(input) => set_color(&mut self.right_color, &input),
            EditEvent::Transparent(transparent) => {
                self.transparent_background = transparent;
                EditOutcome::Changed
            }
            EditEvent::Density(input) => EditOutcome::Density(DensityMultiplier::from_input(&input)),
            EditEvent::GraphOffsetX(x) if x.is_finite() => {
                self.graph_offset.x = x;
                EditOutcome::Changed
            }
            EditEvent::GraphOffsetY(y) if y.is_finite() => {
                self.graph_offset.y = y;
                EditOutcome::Changed
            }
            EditEvent::GraphOffsetX(_) | EditEvent::GraphOffsetY(_) => EditOutcome::Ignored,
            EditEvent::CompositionStart(_) => EditOutcome::Ignored,
        }
    }
}

fn set_color(slot: &mut HexColor, input: &str) -> EditOutcome {
    match HexColor::parse(input) {
        Some(color) => {
            *slot = color;
            EditOutcome::Changed
        }
        None => {
            log::debug!("ignoring malformed color {:?}", input);
            EditOutcome::Ignored
        }
    }
}
