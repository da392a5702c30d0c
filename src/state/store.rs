//! Annotation storage for the image currently being annotated.
//!
//! The store owns the ordered annotation list (append order is z-order, later
//! entries draw on top), the single selection, and the working selection:
//! the metadata used for newly drawn boxes, two-way bound to the selected box.

use crate::format::PersistedAnnotation;
use crate::model::{
    Annotation, AnnotationId, BoundingBox, EditContext, Point, Provenance, ValidationIssue,
    WoundMetadata, is_valid_severity, reconcile_severity,
};

/// Per-category annotation counts in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub counts: Vec<(String, usize)>,
    pub total: usize,
}

/// Storage for the annotations of one image.
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    /// Annotations in z-order
    annotations: Vec<Annotation>,
    /// Currently selected annotation
    selected: Option<AnnotationId>,
    /// Working selection fields
    working: WoundMetadata,
    /// Counter for generating unique annotation IDs
    next_id: AnnotationId,
    /// Bumped on every mutation of the annotation list
    revision: u64,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self {
            annotations: Vec::new(),
            selected: None,
            working: WoundMetadata::default(),
            next_id: 1,
            revision: 0,
        }
    }

    /// Build a store from persisted records, assigning fresh local ids.
    ///
    /// Records without a positive width and height are dropped.
    pub fn hydrate(records: Vec<PersistedAnnotation>) -> Self {
        let mut store = Self::new();
        let total = records.len();
        for record in records {
            let annotation = record.into_annotation(store.next_id);
            if !annotation.bbox.has_positive_extent() {
                log::warn!(
                    "Dropping persisted annotation with degenerate geometry {:?}",
                    annotation.bbox
                );
                continue;
            }
            store.next_id += 1;
            store.annotations.push(annotation);
        }
        log::info!(
            "Hydrated {} of {} persisted annotations",
            store.annotations.len(),
            total
        );
        store
    }

    /// Add a box using the working selection as its metadata.
    ///
    /// Returns None, leaving the store untouched, when the normalized box
    /// has no positive extent.
    pub fn add(&mut self, bbox: BoundingBox, ctx: &EditContext) -> Option<AnnotationId> {
        let bbox = bbox.normalized();
        if !bbox.has_positive_extent() {
            log::debug!("Refusing to add degenerate box {:?}", bbox);
            return None;
        }

        let mut metadata = self.working.clone();
        metadata.severity = reconcile_severity(&metadata.category, &metadata.severity);

        let id = self.next_id;
        self.next_id += 1;
        self.annotations.push(Annotation::new(
            id,
            bbox,
            metadata,
            Provenance::created(ctx),
        ));
        self.revision += 1;

        log::debug!(
            "Added annotation {} at ({:.1}, {:.1}) {:.1}x{:.1} (total: {})",
            id,
            bbox.x,
            bbox.y,
            bbox.width,
            bbox.height,
            self.annotations.len()
        );
        Some(id)
    }

    /// Replace the stored annotation with the same id.
    ///
    /// Creation provenance is always kept from the stored record and the
    /// last-modified stamp is renewed from `ctx`. Unknown ids and boxes
    /// without positive extent are ignored; returns whether anything changed.
    pub fn update(&mut self, annotation: Annotation, ctx: &EditContext) -> bool {
        let Some(slot) = self.annotations.iter_mut().find(|a| a.id == annotation.id) else {
            log::debug!("Ignoring update of unknown annotation {}", annotation.id);
            return false;
        };

        let mut next = annotation;
        next.bbox = next.bbox.normalized();
        if !next.bbox.has_positive_extent() {
            log::debug!(
                "Ignoring update of annotation {} to degenerate box {:?}",
                next.id,
                next.bbox
            );
            return false;
        }
        next.metadata.severity =
            reconcile_severity(&next.metadata.category, &next.metadata.severity);

        let mut provenance = slot.provenance.clone();
        provenance.touch(ctx);
        next.provenance = provenance;

        *slot = next;
        self.revision += 1;

        if self.selected == Some(slot.id) {
            self.working = slot.metadata.clone();
        }
        log::debug!("Updated annotation {}", slot.id);
        true
    }

    /// Remove an annotation. Clears the selection if it pointed there.
    pub fn delete(&mut self, id: AnnotationId) -> Option<Annotation> {
        let Some(index) = self.annotations.iter().position(|a| a.id == id) else {
            log::debug!("Ignoring delete of unknown annotation {}", id);
            return None;
        };
        let removed = self.annotations.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.revision += 1;
        log::debug!(
            "Deleted annotation {} (remaining: {})",
            id,
            self.annotations.len()
        );
        Some(removed)
    }

    /// Select an annotation, or clear the selection with None.
    ///
    /// Selecting copies the annotation's metadata into the working fields
    /// (severity reconciled against its category). Clearing blanks every
    /// working field. An unknown id changes nothing and returns false.
    pub fn select(&mut self, id: Option<AnnotationId>) -> bool {
        match id {
            None => {
                self.selected = None;
                self.working = WoundMetadata::default();
                log::debug!("Selection cleared");
                true
            }
            Some(id) => {
                let Some(annotation) = self.get(id) else {
                    log::debug!("Ignoring selection of unknown annotation {}", id);
                    return false;
                };
                let mut working = annotation.metadata.clone();
                working.severity = reconcile_severity(&working.category, &working.severity);
                self.working = working;
                self.selected = Some(id);
                log::debug!("Selected annotation {}", id);
                true
            }
        }
    }

    /// Set the working fields without touching any annotation.
    ///
    /// Used to seed defaults for new boxes; does nothing to the selection.
    pub fn set_working_defaults(&mut self, metadata: WoundMetadata) {
        let mut metadata = metadata;
        metadata.severity = reconcile_severity(&metadata.category, &metadata.severity);
        self.working = metadata;
    }

    /// Change the working category, clearing a severity the new category
    /// does not allow, and propagate to the selected annotation.
    pub fn set_working_category(&mut self, category: impl Into<String>, ctx: &EditContext) {
        self.working.category = category.into();
        self.working.severity = reconcile_severity(&self.working.category, &self.working.severity);
        self.propagate_working(ctx);
    }

    pub fn set_working_location(&mut self, location: impl Into<String>, ctx: &EditContext) {
        self.working.location = location.into();
        self.propagate_working(ctx);
    }

    pub fn set_working_body_map_id(&mut self, body_map_id: impl Into<String>, ctx: &EditContext) {
        self.working.body_map_id = body_map_id.into();
        self.propagate_working(ctx);
    }

    /// Change the working severity. Values the working category does not
    /// allow are refused and false is returned.
    pub fn set_working_severity(&mut self, severity: impl Into<String>, ctx: &EditContext) -> bool {
        let severity = severity.into();
        if !is_valid_severity(&self.working.category, &severity) {
            log::debug!(
                "Refusing severity '{}' for category '{}'",
                severity,
                self.working.category
            );
            return false;
        }
        self.working.severity = severity;
        self.propagate_working(ctx);
        true
    }

    pub fn set_working_doctor_notes(&mut self, notes: impl Into<String>, ctx: &EditContext) {
        self.working.doctor_notes = notes.into();
        self.propagate_working(ctx);
    }

    /// Write the working fields onto the selected annotation, if any.
    fn propagate_working(&mut self, ctx: &EditContext) {
        let Some(mut selected) = self.selected().cloned() else {
            return;
        };
        selected.metadata = self.working.clone();
        self.update(selected, ctx);
    }

    /// Topmost annotation containing `point` (image space).
    pub fn hit_test(&self, point: &Point) -> Option<AnnotationId> {
        self.annotations
            .iter()
            .rev()
            .find(|a| a.bbox.contains(point))
            .map(|a| a.id)
    }

    /// Flatten the whole set for persistence, in z-order.
    pub fn to_persisted(&self) -> Vec<PersistedAnnotation> {
        self.annotations
            .iter()
            .map(PersistedAnnotation::from_annotation)
            .collect()
    }

    /// Number of annotations per category.
    pub fn count_by_category(&self) -> CategoryCounts {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for ann in &self.annotations {
            match counts.iter_mut().find(|(c, _)| *c == ann.metadata.category) {
                Some((_, n)) => *n += 1,
                None => counts.push((ann.metadata.category.clone(), 1)),
            }
        }
        CategoryCounts {
            counts,
            total: self.annotations.len(),
        }
    }

    /// Annotations that are missing required fields.
    pub fn incomplete(&self) -> Vec<(AnnotationId, Vec<ValidationIssue>)> {
        self.annotations
            .iter()
            .filter_map(|a| {
                let issues = a.validate();
                (!issues.is_empty()).then_some((a.id, issues))
            })
            .collect()
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn selected(&self) -> Option<&Annotation> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn selected_id(&self) -> Option<AnnotationId> {
        self.selected
    }

    /// Working selection fields.
    pub fn working(&self) -> &WoundMetadata {
        &self.working
    }

    /// Annotations in z-order.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Mutation counter, for unsaved-change tracking.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
