#![allow(clippy::uninlined_format_args)]
#![doc = include_str!("../README.md")]

#[macro_use]
extern crate lazy_static;

pub mod assets;
pub mod color;
pub mod compositor;
pub mod engine;
pub mod error;
pub mod export;
pub mod fonts;
pub mod layout;
pub mod session;
pub mod settings;
pub mod state;

pub use balogo_canvas2d;
pub use engine::{EngineOptions, LogoEngine};
pub use error::{LogoError, LogoResult};
pub use session::LogoSession;
pub use settings::{BaseSettings, DensityMultiplier, GeometryConfig};
pub use state::{EditEvent, LogoState, Word};
