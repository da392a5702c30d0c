//! Data models for the annotation core.

mod annotation;
mod severity;

pub use annotation::{
    Annotation, AnnotationId, BoundingBox, EditContext, Point, Provenance, ValidationIssue,
    WoundMetadata, format_timestamp,
};
pub use severity::{
    NO_SEVERITY, SeverityOption, is_valid_severity, reconcile_severity, severity_options_for,
};
