//! Persistence backend contract.

use std::io::Cursor;

use crate::format::error::{BackendError, LoadError};
use crate::format::record::{AnnotationsDocument, PersistedAnnotation};
use crate::format::vocabulary::AnnotationConfig;

/// Everything the annotation core needs from the outside world.
///
/// Implementations may block; hosts with an async transport fetch the pieces
/// themselves and hand them to [`LoadedContext::from_parts`] instead.
pub trait AnnotationBackend {
    /// Short identifier for log messages (e.g., "dir", "http").
    fn id(&self) -> &'static str;

    /// Fetch the category/location vocabulary and color map.
    fn load_config(&self) -> Result<AnnotationConfig, BackendError>;

    /// Fetch the encoded image bytes.
    fn load_image(&self, image_id: &str) -> Result<Vec<u8>, BackendError>;

    /// Fetch the persisted annotations of an image.
    fn load_annotations(&self, image_id: &str) -> Result<AnnotationsDocument, BackendError>;

    /// Replace all annotations of an image with `boxes`.
    ///
    /// Must be all-or-nothing: on error the previously stored set is intact.
    fn save_annotations(
        &self,
        image_id: &str,
        boxes: &[PersistedAnnotation],
    ) -> Result<(), BackendError>;
}

/// Fully fetched annotation context of one image.
#[derive(Debug, Clone)]
pub struct LoadedContext {
    pub config: AnnotationConfig,
    pub natural_width: u32,
    pub natural_height: u32,
    pub document: AnnotationsDocument,
}

impl LoadedContext {
    /// Assemble a context from separately fetched parts, decoding the image size.
    pub fn from_parts(
        config: AnnotationConfig,
        image_bytes: &[u8],
        document: AnnotationsDocument,
    ) -> Result<Self, LoadError> {
        let (natural_width, natural_height) = image_dimensions(image_bytes)?;
        Ok(Self {
            config,
            natural_width,
            natural_height,
            document,
        })
    }

    /// Fetch config, image and annotations. Any failure fails the whole load.
    pub fn fetch(backend: &dyn AnnotationBackend, image_id: &str) -> Result<Self, LoadError> {
        log::info!("Loading '{}' from {} backend", image_id, backend.id());
        let config = backend.load_config().map_err(LoadError::Config)?;
        let image_bytes = backend.load_image(image_id).map_err(LoadError::Image)?;
        let document = backend
            .load_annotations(image_id)
            .map_err(LoadError::Annotations)?;
        Self::from_parts(config, &image_bytes, document)
    }
}

/// Natural size of an encoded image, read from its header.
pub fn image_dimensions(bytes: &[u8]) -> Result<(u32, u32), LoadError> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| LoadError::image_decode(e.to_string()))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| LoadError::image_decode(e.to_string()))?;
    if width == 0 || height == 0 {
        return Err(LoadError::image_decode(format!(
            "image has no area ({width}x{height})"
        )));
    }
    log::trace!("Decoded image header: {}x{}", width, height);
    Ok((width, height))
}
