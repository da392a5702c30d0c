//! Annotation data structures.
//!
//! All geometry here is in image space (natural pixel coordinates).

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

use crate::constants::MIN_DRAW_EXTENT;

/// Client-local identifier of an annotation.
///
/// Unique within one image's annotation set and never reused after deletion.
/// Never sent to the persistence layer.
pub type AnnotationId = u32;

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// An axis-aligned rectangle, top-left corner plus extent.
///
/// Width and height may be negative while a gesture is in progress; the store
/// only accepts normalized boxes with positive extent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box spanning two corner points, in any order.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        Self::new(p1.x, p1.y, p2.x - p1.x, p2.y - p1.y).normalized()
    }

    /// Flip negative extents so width and height are non-negative.
    ///
    /// `x += width; width = |width|` when width is negative, same for y.
    pub fn normalized(self) -> Self {
        let mut out = self;
        if out.width < 0.0 {
            out.x += out.width;
            out.width = out.width.abs();
        }
        if out.height < 0.0 {
            out.y += out.height;
            out.height = out.height.abs();
        }
        out
    }

    /// Both extents strictly positive.
    pub fn has_positive_extent(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Both extents larger than the accidental-click threshold.
    pub fn exceeds_draw_threshold(&self) -> bool {
        self.width.abs() > MIN_DRAW_EXTENT && self.height.abs() > MIN_DRAW_EXTENT
    }

    /// Check if a point is inside the box (edges inclusive).
    pub fn contains(&self, point: &Point) -> bool {
        let b = self.normalized();
        point.x >= b.x && point.x <= b.x + b.width && point.y >= b.y && point.y <= b.y + b.height
    }

    /// Same extent at a new top-left corner.
    pub fn moved_to(&self, x: f64, y: f64) -> Self {
        Self::new(x, y, self.width, self.height)
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Clinical metadata attached to an annotation.
///
/// The same shape doubles as the working selection: defaults for new boxes,
/// two-way bound to the selected box. Optional text is `""` when unset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WoundMetadata {
    /// Wound etiology, one of the configured categories
    pub category: String,
    /// Body location, one of the configured locations
    pub location: String,
    /// Free-text body map reference
    pub body_map_id: String,
    /// Severity code valid for the category, or empty
    pub severity: String,
    /// Free-text clinician notes
    pub doctor_notes: String,
}

impl WoundMetadata {
    pub fn new(category: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            location: location.into(),
            ..Default::default()
        }
    }

    pub fn with_body_map_id(mut self, body_map_id: impl Into<String>) -> Self {
        self.body_map_id = body_map_id.into();
        self
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = severity.into();
        self
    }

    pub fn with_doctor_notes(mut self, notes: impl Into<String>) -> Self {
        self.doctor_notes = notes.into();
        self
    }
}

/// Who created and last modified an annotation, and when.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Provenance {
    pub created_by: String,
    pub created_at: String,
    pub last_modified_by: String,
    pub last_modified_at: String,
}

impl Provenance {
    /// Creation stamp with matching last-modified fields.
    pub fn created(ctx: &EditContext) -> Self {
        let at = ctx.timestamp();
        Self {
            created_by: ctx.actor.clone(),
            created_at: at.clone(),
            last_modified_by: ctx.actor.clone(),
            last_modified_at: at,
        }
    }

    /// Re-stamp the last-modified fields, keeping creation untouched.
    ///
    /// The new time never precedes the stored one, even if the clock went back.
    /// A stored time at or after `ctx.now` is kept as written.
    pub fn touch(&mut self, ctx: &EditContext) {
        let keep_stored =
            parse_timestamp(&self.last_modified_at).is_some_and(|prev| prev >= ctx.now);
        self.last_modified_by = ctx.actor.clone();
        if !keep_stored {
            self.last_modified_at = format_timestamp(ctx.now);
        }
    }
}

/// Actor identity and clock reading for one mutation.
///
/// The actor is an opaque string supplied by the session layer; it is never
/// validated here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditContext {
    pub actor: String,
    pub now: DateTime<Utc>,
}

impl EditContext {
    pub fn new(actor: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            actor: actor.into(),
            now,
        }
    }

    /// Context stamped with the current wall clock.
    pub fn now(actor: impl Into<String>) -> Self {
        Self::new(actor, Utc::now())
    }

    pub fn timestamp(&self) -> String {
        format_timestamp(self.now)
    }
}

/// Read a stored timestamp.
///
/// Accepts RFC 3339 and ISO 8601 without an offset, which is taken as UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|t| t.and_utc())
}

/// RFC 3339 UTC with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
pub fn format_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A labeled rectangle on a wound image.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,
    pub bbox: BoundingBox,
    pub metadata: WoundMetadata,
    pub provenance: Provenance,
}

impl Annotation {
    pub fn new(
        id: AnnotationId,
        bbox: BoundingBox,
        metadata: WoundMetadata,
        provenance: Provenance,
    ) -> Self {
        Self {
            id,
            bbox,
            metadata,
            provenance,
        }
    }

    /// Problems that make this annotation incomplete, in a fixed order.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if self.metadata.category.trim().is_empty() {
            issues.push(ValidationIssue::MissingCategory);
        }
        if self.metadata.location.trim().is_empty() {
            issues.push(ValidationIssue::MissingLocation);
        }
        if !self.bbox.has_positive_extent() {
            issues.push(ValidationIssue::InvalidDimensions);
        }
        issues
    }
}

/// Reason an annotation is considered incomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingCategory,
    MissingLocation,
    InvalidDimensions,
}

impl ValidationIssue {
    pub fn message(&self) -> &'static str {
        match self {
            ValidationIssue::MissingCategory => "Category is required",
            ValidationIssue::MissingLocation => "Location is required",
            ValidationIssue::InvalidDimensions => "Invalid box dimensions",
        }
    }
}
