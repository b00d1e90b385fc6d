//! eepee: an image viewer for electrophysiology tracings with calipers,
//! calibration, doodles, crop/rotate and playlists.

pub mod annotation;
pub mod app;
pub mod caliper;
pub mod canvas;
pub mod command;
pub mod dialogs;
pub mod doodle;
pub mod error;
pub mod pipeline;
pub mod playlist;
pub mod prefs;
pub mod session;
pub mod surface;
pub mod transform;

pub use app::ViewerApp;
pub use error::{Result, ViewerError};
