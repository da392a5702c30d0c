//! Test doubles shared by the scenario tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::Cursor;

use chrono::{TimeZone, Utc};
use image::{DynamicImage, ImageFormat, RgbImage};

use crate::format::{
    AnnotationBackend, AnnotationConfig, AnnotationsDocument, BackendError, PersistedAnnotation,
};
use crate::model::EditContext;

/// Encode a black PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// Edit context `secs` seconds after a fixed base time.
pub fn ctx_at(actor: &str, secs: i64) -> EditContext {
    EditContext::new(actor, Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap())
}

/// Backend keeping everything in memory.
///
/// Individual stages can be made to fail to exercise error paths.
#[derive(Default)]
pub struct MemoryBackend {
    pub config: AnnotationConfig,
    pub images: HashMap<String, Vec<u8>>,
    pub documents: RefCell<HashMap<String, Vec<PersistedAnnotation>>>,
    pub fail_config: bool,
    pub fail_annotations: bool,
    pub fail_save: Cell<bool>,
    pub saves: Cell<usize>,
}

impl MemoryBackend {
    pub fn with_image(mut self, image_id: &str, width: u32, height: u32) -> Self {
        self.images
            .insert(image_id.to_string(), png_bytes(width, height));
        self
    }

    pub fn with_boxes(self, image_id: &str, boxes: Vec<PersistedAnnotation>) -> Self {
        self.documents
            .borrow_mut()
            .insert(image_id.to_string(), boxes);
        self
    }

    pub fn stored(&self, image_id: &str) -> Vec<PersistedAnnotation> {
        self.documents
            .borrow()
            .get(image_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl AnnotationBackend for MemoryBackend {
    fn id(&self) -> &'static str {
        "memory"
    }

    fn load_config(&self) -> Result<AnnotationConfig, BackendError> {
        if self.fail_config {
            return Err(BackendError::rejected("config service unavailable"));
        }
        Ok(self.config.clone())
    }

    fn load_image(&self, image_id: &str) -> Result<Vec<u8>, BackendError> {
        self.images
            .get(image_id)
            .cloned()
            .ok_or_else(|| BackendError::not_found(format!("image '{image_id}'")))
    }

    fn load_annotations(&self, image_id: &str) -> Result<AnnotationsDocument, BackendError> {
        if self.fail_annotations {
            return Err(BackendError::rejected("annotation service unavailable"));
        }
        Ok(AnnotationsDocument {
            boxes: self.stored(image_id),
        })
    }

    fn save_annotations(
        &self,
        image_id: &str,
        boxes: &[PersistedAnnotation],
    ) -> Result<(), BackendError> {
        if self.fail_save.get() {
            return Err(BackendError::rejected("server returned 500"));
        }
        self.saves.set(self.saves.get() + 1);
        self.documents
            .borrow_mut()
            .insert(image_id.to_string(), boxes.to_vec());
        Ok(())
    }
}

/// A persisted record with the given geometry and category.
pub fn record(x: f64, y: f64, width: f64, height: f64, category: &str) -> PersistedAnnotation {
    serde_json::from_value(serde_json::json!({
        "x": x, "y": y, "width": width, "height": height,
        "category": category, "location": "HEAD",
        "created_by": "seed", "created_at": "2023-01-01T00:00:00.000Z",
        "last_modified_by": "seed", "last_modified_at": "2023-01-01T00:00:00.000Z"
    }))
    .unwrap()
}
