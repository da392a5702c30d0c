//! Persistence boundary.
//!
//! The annotation core talks to the outside world through the
//! [`AnnotationBackend`] trait: fetch the vocabulary, the image and the stored
//! annotations of an image, and replace those annotations wholesale on save.
//!
//! ## Wire records
//!
//! [`PersistedAnnotation`] is the shape the backend stores. It has no local
//! identifier; hydration assigns one and flattening strips it again.
//!
//! ## Backends
//!
//! - **Directory**: a plain directory tree, one JSON file per image
//! - Hosts with an async transport fetch the parts themselves and use
//!   [`LoadedContext::from_parts`]

mod backend;
mod csv;
mod directory;
mod error;
mod record;
mod vocabulary;

pub use backend::{AnnotationBackend, LoadedContext, image_dimensions};
pub use csv::{CSV_HEADER, export_csv};
pub use directory::{DirectoryBackend, IMAGE_EXTENSIONS};
pub use error::{BackendError, LoadError, SaveError};
pub use record::{AnnotationsDocument, PersistedAnnotation};
pub use vocabulary::AnnotationConfig;
