//! The annotation view of one image.
//!
//! Owns the store and gesture state for the image being annotated and drives
//! the load and save lifecycles around them:
//!
//! - **Load**: [`AnnotationView::begin_load`] hands out a [`LoadTicket`].
//!   The result is applied only if no newer load or close happened since,
//!   so a slow fetch never overwrites the view of another image. Loading is
//!   all-or-nothing; gestures stay disabled until it succeeds.
//! - **Save**: [`AnnotationView::begin_save`] snapshots the whole set into a
//!   [`SaveRequest`]. One save runs at a time. Edits made while it is in
//!   flight are not part of it and remain unsaved until the next save.

use crate::fit_math::{ViewportCap, ViewportFit};
use crate::format::{
    AnnotationBackend, AnnotationConfig, LoadError, LoadedContext, PersistedAnnotation, SaveError,
};
use crate::model::{
    AnnotationId, EditContext, Point, SeverityOption, ValidationIssue, WoundMetadata,
    severity_options_for,
};
use crate::overlay::{RectOverlay, build_overlay};
use crate::state::interaction::{self, GestureOutcome, Interaction};
use crate::state::save_status::{SaveStatus, SaveStatusTracker};
use crate::state::store::{AnnotationStore, CategoryCounts};

/// Lifecycle phase of the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewPhase {
    /// No image.
    Closed,
    /// Waiting for config, image and annotations.
    Loading,
    /// Interactive.
    Ready,
    /// Load failed; nothing is rendered.
    Failed(String),
}

/// Handle for one load attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    image_id: String,
}

impl LoadTicket {
    pub fn image_id(&self) -> &str {
        &self.image_id
    }
}

/// Handle for one save attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTicket {
    generation: u64,
    revision: u64,
}

/// Snapshot of the annotation set to hand to the backend.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub ticket: SaveTicket,
    pub image_id: String,
    pub boxes: Vec<PersistedAnnotation>,
}

/// Everything that only exists once an image is loaded.
#[derive(Debug, Clone)]
struct Loaded {
    config: AnnotationConfig,
    fit: ViewportFit,
}

/// Annotation view of a single image.
#[derive(Debug, Clone)]
pub struct AnnotationView {
    cap: ViewportCap,
    /// Bumped by every load and close
    generation: u64,
    image_id: Option<String>,
    phase: ViewPhase,
    loaded: Option<Loaded>,
    store: AnnotationStore,
    interaction: Interaction,
    /// Revision being saved, if a save is in flight
    saving: Option<u64>,
    /// Store revision at the last successful save
    saved_revision: u64,
    status: SaveStatusTracker,
}

impl Default for AnnotationView {
    fn default() -> Self {
        Self::new(ViewportCap::default())
    }
}

impl AnnotationView {
    pub fn new(cap: ViewportCap) -> Self {
        Self {
            cap,
            generation: 0,
            image_id: None,
            phase: ViewPhase::Closed,
            loaded: None,
            store: AnnotationStore::new(),
            interaction: Interaction::default(),
            saving: None,
            saved_revision: 0,
            status: SaveStatusTracker::new(),
        }
    }

    /// Viewport cap used by the next load. The current fit is kept.
    pub fn set_viewport_cap(&mut self, cap: ViewportCap) {
        self.cap = cap;
    }

    pub fn set_drag_enabled(&mut self, enabled: bool) {
        self.interaction.set_drag_enabled(enabled);
    }

    // ---- Load lifecycle ----

    /// Start loading `image_id`, discarding whatever the view showed.
    pub fn begin_load(&mut self, image_id: impl Into<String>) -> LoadTicket {
        let image_id = image_id.into();
        self.reset();
        self.phase = ViewPhase::Loading;
        self.image_id = Some(image_id.clone());
        log::info!(
            "Loading annotations for '{}' (generation {})",
            image_id,
            self.generation
        );
        LoadTicket {
            generation: self.generation,
            image_id,
        }
    }

    fn is_current(&self, ticket: &LoadTicket) -> bool {
        if ticket.generation != self.generation {
            log::warn!(
                "Discarding stale load of '{}' (generation {}, current {})",
                ticket.image_id,
                ticket.generation,
                self.generation
            );
            return false;
        }
        true
    }

    /// Apply a completed load. Returns false if the ticket is stale.
    pub fn finish_load(&mut self, ticket: &LoadTicket, context: LoadedContext) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        let LoadedContext {
            config,
            natural_width,
            natural_height,
            document,
        } = context;

        let fit = ViewportFit::compute(natural_width, natural_height, self.cap).unwrap_or_else(|| {
            log::warn!(
                "Viewport cap {:?} cannot fit {}x{}, using scale 1",
                self.cap,
                natural_width,
                natural_height
            );
            ViewportFit::identity(natural_width, natural_height)
        });

        self.store = AnnotationStore::hydrate(document.boxes);
        self.store.set_working_defaults(WoundMetadata::new(
            config.default_category(),
            config.default_location(),
        ));
        self.saved_revision = self.store.revision();
        self.loaded = Some(Loaded { config, fit });
        self.phase = ViewPhase::Ready;

        log::info!(
            "Loaded '{}': {}x{} at scale {:.3}, {} annotations",
            ticket.image_id,
            natural_width,
            natural_height,
            fit.scale,
            self.store.len()
        );
        true
    }

    /// Mark a load as failed. Returns false if the ticket is stale.
    pub fn fail_load(&mut self, ticket: &LoadTicket, reason: impl Into<String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        let reason = reason.into();
        log::error!("Failed to load '{}': {}", ticket.image_id, reason);
        self.store = AnnotationStore::new();
        self.loaded = None;
        self.phase = ViewPhase::Failed(reason);
        true
    }

    /// Load synchronously from a backend.
    pub fn load_from(
        &mut self,
        backend: &dyn AnnotationBackend,
        image_id: &str,
    ) -> Result<(), LoadError> {
        let ticket = self.begin_load(image_id);
        match LoadedContext::fetch(backend, image_id) {
            Ok(context) => {
                self.finish_load(&ticket, context);
                Ok(())
            }
            Err(e) => {
                self.fail_load(&ticket, e.to_string());
                Err(e)
            }
        }
    }

    /// Leave the image. Pending loads are abandoned; a pending save may
    /// still complete against the backend but no longer reports here.
    pub fn close(&mut self) {
        self.reset();
        self.phase = ViewPhase::Closed;
        self.image_id = None;
        log::debug!("View closed (generation {})", self.generation);
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.loaded = None;
        self.store = AnnotationStore::new();
        self.interaction.cancel();
        self.saving = None;
        self.saved_revision = 0;
        self.status.clear();
    }

    pub fn phase(&self) -> &ViewPhase {
        &self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == ViewPhase::Ready
    }

    pub fn image_id(&self) -> Option<&str> {
        self.image_id.as_deref()
    }

    pub fn fit(&self) -> Option<&ViewportFit> {
        self.loaded.as_ref().map(|l| &l.fit)
    }

    pub fn config(&self) -> Option<&AnnotationConfig> {
        self.loaded.as_ref().map(|l| &l.config)
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    // ---- Gestures (screen space) ----

    pub fn pointer_down(&mut self, screen: Point) -> GestureOutcome {
        let Some(loaded) = self.loaded.as_ref() else {
            return GestureOutcome::Ignored;
        };
        self.interaction
            .pointer_down(screen, &mut self.store, &loaded.fit)
    }

    pub fn pointer_move(&mut self, screen: Point) {
        if let Some(loaded) = self.loaded.as_ref() {
            self.interaction.pointer_move(screen, &loaded.fit);
        }
    }

    pub fn pointer_up(&mut self, screen: Point, ctx: &EditContext) -> GestureOutcome {
        let Some(loaded) = self.loaded.as_ref() else {
            return GestureOutcome::Ignored;
        };
        self.interaction
            .pointer_up(screen, &mut self.store, &loaded.fit, ctx)
    }

    /// Move an annotation to a screen-space top-left, as reported by a
    /// host-side drag handle.
    pub fn drag_end(
        &mut self,
        id: AnnotationId,
        screen_top_left: Point,
        ctx: &EditContext,
    ) -> GestureOutcome {
        let Some(loaded) = self.loaded.as_ref() else {
            return GestureOutcome::Ignored;
        };
        interaction::drag_end(&mut self.store, &loaded.fit, ctx, id, screen_top_left)
    }

    pub fn cancel_gesture(&mut self) {
        self.interaction.cancel();
    }

    // ---- Selection and working fields ----

    pub fn select(&mut self, id: Option<AnnotationId>) -> bool {
        self.store.select(id)
    }

    pub fn working(&self) -> &WoundMetadata {
        self.store.working()
    }

    pub fn set_category(&mut self, category: impl Into<String>, ctx: &EditContext) {
        self.store.set_working_category(category, ctx);
    }

    pub fn set_location(&mut self, location: impl Into<String>, ctx: &EditContext) {
        self.store.set_working_location(location, ctx);
    }

    pub fn set_body_map_id(&mut self, body_map_id: impl Into<String>, ctx: &EditContext) {
        self.store.set_working_body_map_id(body_map_id, ctx);
    }

    pub fn set_severity(&mut self, severity: impl Into<String>, ctx: &EditContext) -> bool {
        self.store.set_working_severity(severity, ctx)
    }

    pub fn set_doctor_notes(&mut self, notes: impl Into<String>, ctx: &EditContext) {
        self.store.set_working_doctor_notes(notes, ctx);
    }

    /// Severity choices for the working category.
    pub fn severity_options(&self) -> &'static [SeverityOption] {
        severity_options_for(&self.store.working().category)
    }

    pub fn delete(&mut self, id: AnnotationId) -> bool {
        self.store.delete(id).is_some()
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.store.selected_id() {
            Some(id) => self.delete(id),
            None => false,
        }
    }

    // ---- Reporting ----

    /// Rectangles to draw, empty unless ready.
    pub fn overlay(&self) -> Vec<RectOverlay> {
        match self.loaded.as_ref() {
            Some(loaded) => build_overlay(
                &self.store,
                self.interaction.state(),
                &loaded.config,
                &loaded.fit,
            ),
            None => Vec::new(),
        }
    }

    pub fn counts(&self) -> CategoryCounts {
        self.store.count_by_category()
    }

    pub fn incomplete(&self) -> Vec<(AnnotationId, Vec<ValidationIssue>)> {
        self.store.incomplete()
    }

    // ---- Save lifecycle ----

    /// Snapshot the annotation set for saving.
    pub fn begin_save(&mut self) -> Result<SaveRequest, SaveError> {
        if !self.is_ready() {
            return Err(SaveError::NotReady);
        }
        let Some(image_id) = self.image_id.clone() else {
            return Err(SaveError::NotReady);
        };
        if self.saving.is_some() {
            return Err(SaveError::InFlight);
        }

        let revision = self.store.revision();
        let boxes = self.store.to_persisted();
        self.saving = Some(revision);
        self.status.saving();
        log::info!("Saving {} annotations for '{}'", boxes.len(), image_id);

        Ok(SaveRequest {
            ticket: SaveTicket {
                generation: self.generation,
                revision,
            },
            image_id,
            boxes,
        })
    }

    fn save_is_current(&self, ticket: SaveTicket) -> bool {
        if ticket.generation != self.generation || self.saving != Some(ticket.revision) {
            log::debug!("Save result for a previous view ignored");
            return false;
        }
        true
    }

    /// Record a successful save. Returns false if the view moved on.
    pub fn finish_save(&mut self, ticket: SaveTicket) -> bool {
        if !self.save_is_current(ticket) {
            return false;
        }
        self.saving = None;
        self.saved_revision = ticket.revision;
        self.status.succeeded();
        log::info!("Annotations saved (revision {})", ticket.revision);
        true
    }

    /// Record a failed save. The annotation set is left as it is.
    pub fn fail_save(&mut self, ticket: SaveTicket, reason: &str) -> bool {
        if !self.save_is_current(ticket) {
            return false;
        }
        self.saving = None;
        self.status.failed(reason);
        log::error!("Failed to save annotations: {}", reason);
        true
    }

    /// Save synchronously to a backend.
    pub fn save_to(&mut self, backend: &dyn AnnotationBackend) -> Result<(), SaveError> {
        let request = self.begin_save()?;
        match backend.save_annotations(&request.image_id, &request.boxes) {
            Ok(()) => {
                self.finish_save(request.ticket);
                Ok(())
            }
            Err(e) => {
                self.fail_save(request.ticket, &e.to_string());
                Err(e.into())
            }
        }
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_some()
    }

    /// Whether the set changed since it was loaded or last saved.
    pub fn has_unsaved_changes(&self) -> bool {
        self.store.revision() != self.saved_revision
    }

    pub fn save_status(&self) -> Option<&SaveStatus> {
        self.status.current()
    }
}
