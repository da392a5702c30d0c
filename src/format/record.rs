//! Wire shapes exchanged with the persistence layer.
//!
//! Persisted records carry no local identifier. Hydration assigns one and
//! normalizes every optional text field to `""`; flattening strips it again.

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::{Annotation, AnnotationId, BoundingBox, Provenance, WoundMetadata};

/// Accept `null` or a missing field as the empty string.
fn empty_if_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// An annotation as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedAnnotation {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub category: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub location: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub body_map_id: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub severity: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub doctor_notes: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub created_by: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub created_at: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub last_modified_by: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub last_modified_at: String,
}

impl PersistedAnnotation {
    /// Flatten an annotation, dropping only its local id.
    pub fn from_annotation(annotation: &Annotation) -> Self {
        let Annotation {
            id: _,
            bbox,
            metadata,
            provenance,
        } = annotation;
        Self {
            x: bbox.x,
            y: bbox.y,
            width: bbox.width,
            height: bbox.height,
            category: metadata.category.clone(),
            location: metadata.location.clone(),
            body_map_id: metadata.body_map_id.clone(),
            severity: metadata.severity.clone(),
            doctor_notes: metadata.doctor_notes.clone(),
            created_by: provenance.created_by.clone(),
            created_at: provenance.created_at.clone(),
            last_modified_by: provenance.last_modified_by.clone(),
            last_modified_at: provenance.last_modified_at.clone(),
        }
    }

    /// Hydrate into an annotation carrying the given local id.
    pub fn into_annotation(self, id: AnnotationId) -> Annotation {
        Annotation {
            id,
            bbox: BoundingBox::new(self.x, self.y, self.width, self.height),
            metadata: WoundMetadata {
                category: self.category,
                location: self.location,
                body_map_id: self.body_map_id,
                severity: self.severity,
                doctor_notes: self.doctor_notes,
            },
            provenance: Provenance {
                created_by: self.created_by,
                created_at: self.created_at,
                last_modified_by: self.last_modified_by,
                last_modified_at: self.last_modified_at,
            },
        }
    }
}

/// Response body of the annotation load call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationsDocument {
    #[serde(default)]
    pub boxes: Vec<PersistedAnnotation>,
}
