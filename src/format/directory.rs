//! File-system backend.
//!
//! Layout under the root directory:
//!
//! ```text
//! config.json                 optional vocabulary, built-in default otherwise
//! images/<image_id>.<ext>     png, jpg, jpeg, bmp or webp
//! annotations/<image_id>.json {"boxes": [...]}
//! ```

use std::fs;
use std::path::PathBuf;

use crate::format::backend::AnnotationBackend;
use crate::format::error::BackendError;
use crate::format::record::{AnnotationsDocument, PersistedAnnotation};
use crate::format::vocabulary::AnnotationConfig;

/// Image file extensions probed in order.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp"];

/// Backend reading and writing a plain directory tree.
#[derive(Debug, Clone)]
pub struct DirectoryBackend {
    root: PathBuf,
}

impl DirectoryBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn config_path(&self) -> PathBuf {
        self.root.join("config.json")
    }

    fn annotations_path(&self, image_id: &str) -> Result<PathBuf, BackendError> {
        Ok(self
            .root
            .join("annotations")
            .join(format!("{}.json", checked_id(image_id)?)))
    }

    fn image_path(&self, image_id: &str) -> Result<PathBuf, BackendError> {
        let id = checked_id(image_id)?;
        let dir = self.root.join("images");
        IMAGE_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{id}.{ext}")))
            .find(|p| p.is_file())
            .ok_or_else(|| BackendError::not_found(format!("image '{image_id}'")))
    }
}

/// Image ids become file names, so they must not escape the directory.
fn checked_id(image_id: &str) -> Result<&str, BackendError> {
    let bad = image_id.is_empty()
        || image_id == "."
        || image_id == ".."
        || image_id.contains(['/', '\\', '\0']);
    if bad {
        Err(BackendError::rejected(format!(
            "invalid image id '{image_id}'"
        )))
    } else {
        Ok(image_id)
    }
}

impl AnnotationBackend for DirectoryBackend {
    fn id(&self) -> &'static str {
        "dir"
    }

    fn load_config(&self) -> Result<AnnotationConfig, BackendError> {
        let path = self.config_path();
        if !path.exists() {
            log::debug!("No {:?}, using built-in vocabulary", path);
            return Ok(AnnotationConfig::default());
        }
        let json = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn load_image(&self, image_id: &str) -> Result<Vec<u8>, BackendError> {
        let path = self.image_path(image_id)?;
        log::debug!("Reading image {:?}", path);
        Ok(fs::read(path)?)
    }

    fn load_annotations(&self, image_id: &str) -> Result<AnnotationsDocument, BackendError> {
        let path = self.annotations_path(image_id)?;
        if !path.exists() {
            log::debug!("No annotations stored for '{}'", image_id);
            return Ok(AnnotationsDocument::default());
        }
        let json = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn save_annotations(
        &self,
        image_id: &str,
        boxes: &[PersistedAnnotation],
    ) -> Result<(), BackendError> {
        let path = self.annotations_path(image_id)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let document = AnnotationsDocument {
            boxes: boxes.to_vec(),
        };
        let json = serde_json::to_string_pretty(&document)?;

        // Write beside the target and rename over it so readers never see a partial file.
        let tmp = path.with_extension("json.tmp");
        let written = fs::write(&tmp, json.as_bytes()).and_then(|()| fs::rename(&tmp, &path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        log::info!("Saved {} annotations to {:?}", boxes.len(), path);
        Ok(())
    }
}
