//! Wound annotator
//!
//! Bounding-box annotation core for wound images: fits an image into a
//! viewport, turns pointer gestures into rectangles, keeps them with clinical
//! metadata, and saves the whole set through a persistence backend.
//!
//! Geometry is stored in image space (natural pixels); pointer input and the
//! render model are in screen space. [`fit_math::ViewportFit`] converts
//! between them.

pub mod color_utils;
pub mod config;
pub mod constants;
pub mod fit_math;
pub mod format;
pub mod model;
pub mod overlay;
pub mod state;

pub use config::{AppConfig, LogLevel};
pub use fit_math::{ViewportCap, ViewportFit};
pub use format::{AnnotationBackend, AnnotationConfig, DirectoryBackend};
pub use state::{AnnotationStore, AnnotationView};

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
