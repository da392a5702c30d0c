//! Browser entry point.
//!
//! The host page does all fetching. It hands results to `WoundCanvas`,
//! forwards pointer events in canvas (screen) coordinates, and draws the
//! overlay it reads back as JSON.

use wasm_bindgen::prelude::*;

use crate::fit_math::ViewportCap;
use crate::format::{AnnotationConfig, AnnotationsDocument, LoadedContext};
use crate::model::{EditContext, Point};
use crate::state::{AnnotationView, GestureOutcome, LoadTicket, SaveTicket, StatusKind};

/// Forwards `log` records to the browser console.
struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&line),
            log::Level::Warn => web_sys::console::warn_1(&line),
            log::Level::Info => web_sys::console::info_1(&line),
            log::Level::Debug | log::Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }
    log::info!("Wound annotator ready");
}

/// Change console verbosity: "error", "warn", "info", "debug" or "trace".
#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter: log::LevelFilter = level
        .parse()
        .map_err(|_| JsValue::from_str(&format!("unknown log level '{level}'")))?;
    log::set_max_level(filter);
    Ok(())
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn changed_id(outcome: GestureOutcome) -> Option<u32> {
    match outcome {
        GestureOutcome::Selected(id) | GestureOutcome::Added(id) | GestureOutcome::Moved(id) => {
            Some(id)
        }
        GestureOutcome::Ignored | GestureOutcome::DrawStarted | GestureOutcome::Discarded => None,
    }
}

/// Annotation canvas for one image at a time.
#[wasm_bindgen]
pub struct WoundCanvas {
    view: AnnotationView,
    actor: String,
    load: Option<LoadTicket>,
    save: Option<SaveTicket>,
}

#[wasm_bindgen]
impl WoundCanvas {
    /// `actor` is the logged-in user stamped onto edits.
    #[wasm_bindgen(constructor)]
    pub fn new(actor: String, max_width: f64, max_height: f64) -> Self {
        Self {
            view: AnnotationView::new(ViewportCap::new(max_width, max_height)),
            actor,
            load: None,
            save: None,
        }
    }

    #[wasm_bindgen(js_name = setActor)]
    pub fn set_actor(&mut self, actor: String) {
        self.actor = actor;
    }

    /// Canvas size cap for the next load, e.g. after a window resize.
    #[wasm_bindgen(js_name = setViewportCap)]
    pub fn set_viewport_cap(&mut self, max_width: f64, max_height: f64) {
        self.view.set_viewport_cap(ViewportCap::new(max_width, max_height));
    }

    #[wasm_bindgen(js_name = setDragEnabled)]
    pub fn set_drag_enabled(&mut self, enabled: bool) {
        self.view.set_drag_enabled(enabled);
    }

    fn ctx(&self) -> EditContext {
        EditContext::now(self.actor.clone())
    }

    // ---- Load ----

    #[wasm_bindgen(js_name = beginLoad)]
    pub fn begin_load(&mut self, image_id: String) {
        self.save = None;
        self.load = Some(self.view.begin_load(image_id));
    }

    /// Apply fetched parts. Returns false if a newer load or close happened.
    #[wasm_bindgen(js_name = finishLoad)]
    pub fn finish_load(
        &mut self,
        config_json: &str,
        image_bytes: &[u8],
        annotations_json: &str,
    ) -> Result<bool, JsValue> {
        let Some(ticket) = self.load.take() else {
            return Ok(false);
        };
        let parsed = serde_json::from_str::<AnnotationConfig>(config_json)
            .map_err(|e| format!("Failed to load configuration: {e}"))
            .and_then(|config| {
                serde_json::from_str::<AnnotationsDocument>(annotations_json)
                    .map_err(|e| format!("Failed to load annotations: {e}"))
                    .map(|document| (config, document))
            })
            .and_then(|(config, document)| {
                LoadedContext::from_parts(config, image_bytes, document).map_err(|e| e.to_string())
            });

        match parsed {
            Ok(context) => Ok(self.view.finish_load(&ticket, context)),
            Err(reason) => {
                self.view.fail_load(&ticket, reason.clone());
                Err(JsValue::from_str(&reason))
            }
        }
    }

    #[wasm_bindgen(js_name = failLoad)]
    pub fn fail_load(&mut self, reason: &str) -> bool {
        match self.load.take() {
            Some(ticket) => self.view.fail_load(&ticket, reason),
            None => false,
        }
    }

    pub fn close(&mut self) {
        self.load = None;
        self.save = None;
        self.view.close();
    }

    #[wasm_bindgen(js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.view.is_ready()
    }

    /// Load failure message, if the last load failed.
    #[wasm_bindgen(js_name = loadError)]
    pub fn load_error(&self) -> Option<String> {
        match self.view.phase() {
            crate::state::ViewPhase::Failed(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    #[wasm_bindgen(js_name = renderedWidth)]
    pub fn rendered_width(&self) -> f64 {
        self.view.fit().map(|f| f.rendered_width()).unwrap_or(0.0)
    }

    #[wasm_bindgen(js_name = renderedHeight)]
    pub fn rendered_height(&self) -> f64 {
        self.view.fit().map(|f| f.rendered_height()).unwrap_or(0.0)
    }

    // ---- Pointer events (canvas coordinates) ----

    /// Returns the id of the annotation selected by the press, if any.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64) -> Option<u32> {
        changed_id(self.view.pointer_down(Point::new(x, y)))
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.view.pointer_move(Point::new(x, y));
    }

    /// Returns the id of the annotation added or moved, if any.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f64, y: f64) -> Option<u32> {
        let ctx = self.ctx();
        changed_id(self.view.pointer_up(Point::new(x, y), &ctx))
    }

    /// Drag end reported by a host-side drag handle, top-left in canvas coordinates.
    #[wasm_bindgen(js_name = dragEnd)]
    pub fn drag_end(&mut self, id: u32, x: f64, y: f64) -> bool {
        let ctx = self.ctx();
        matches!(
            self.view.drag_end(id, Point::new(x, y), &ctx),
            GestureOutcome::Moved(_)
        )
    }

    #[wasm_bindgen(js_name = cancelGesture)]
    pub fn cancel_gesture(&mut self) {
        self.view.cancel_gesture();
    }

    // ---- Selection and form fields ----

    pub fn select(&mut self, id: Option<u32>) -> bool {
        self.view.select(id)
    }

    #[wasm_bindgen(js_name = selectedId)]
    pub fn selected_id(&self) -> Option<u32> {
        self.view.store().selected_id()
    }

    #[wasm_bindgen(js_name = setCategory)]
    pub fn set_category(&mut self, value: String) {
        let ctx = self.ctx();
        self.view.set_category(value, &ctx);
    }

    #[wasm_bindgen(js_name = setLocation)]
    pub fn set_location(&mut self, value: String) {
        let ctx = self.ctx();
        self.view.set_location(value, &ctx);
    }

    #[wasm_bindgen(js_name = setBodyMapId)]
    pub fn set_body_map_id(&mut self, value: String) {
        let ctx = self.ctx();
        self.view.set_body_map_id(value, &ctx);
    }

    #[wasm_bindgen(js_name = setSeverity)]
    pub fn set_severity(&mut self, value: String) -> bool {
        let ctx = self.ctx();
        self.view.set_severity(value, &ctx)
    }

    #[wasm_bindgen(js_name = setDoctorNotes)]
    pub fn set_doctor_notes(&mut self, value: String) {
        let ctx = self.ctx();
        self.view.set_doctor_notes(value, &ctx);
    }

    /// Working form fields as JSON.
    #[wasm_bindgen(js_name = workingJson)]
    pub fn working_json(&self) -> String {
        let w = self.view.working();
        serde_json::json!({
            "category": w.category,
            "location": w.location,
            "body_map_id": w.body_map_id,
            "severity": w.severity,
            "doctor_notes": w.doctor_notes,
        })
        .to_string()
    }

    /// Severity choices for the working category as JSON `[{value, label}]`.
    #[wasm_bindgen(js_name = severityOptionsJson)]
    pub fn severity_options_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.view.severity_options()).map_err(js_error)
    }

    pub fn delete(&mut self, id: u32) -> bool {
        self.view.delete(id)
    }

    #[wasm_bindgen(js_name = deleteSelected)]
    pub fn delete_selected(&mut self) -> bool {
        self.view.delete_selected()
    }

    // ---- Rendering ----

    /// Rectangles to draw, as JSON.
    #[wasm_bindgen(js_name = overlayJson)]
    pub fn overlay_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.view.overlay()).map_err(js_error)
    }

    #[wasm_bindgen(js_name = annotationCount)]
    pub fn annotation_count(&self) -> usize {
        self.view.store().len()
    }

    // ---- Save ----

    /// Payload for the save request, `{"boxes": [...]}`.
    #[wasm_bindgen(js_name = beginSave)]
    pub fn begin_save(&mut self) -> Result<String, JsValue> {
        let request = self.view.begin_save().map_err(js_error)?;
        let body = serde_json::to_string(&AnnotationsDocument {
            boxes: request.boxes,
        })
        .map_err(js_error)?;
        self.save = Some(request.ticket);
        Ok(body)
    }

    #[wasm_bindgen(js_name = finishSave)]
    pub fn finish_save(&mut self) -> bool {
        match self.save.take() {
            Some(ticket) => self.view.finish_save(ticket),
            None => false,
        }
    }

    #[wasm_bindgen(js_name = failSave)]
    pub fn fail_save(&mut self, reason: &str) -> bool {
        match self.save.take() {
            Some(ticket) => self.view.fail_save(ticket, reason),
            None => false,
        }
    }

    #[wasm_bindgen(js_name = isSaving)]
    pub fn is_saving(&self) -> bool {
        self.view.is_saving()
    }

    #[wasm_bindgen(js_name = hasUnsavedChanges)]
    pub fn has_unsaved_changes(&self) -> bool {
        self.view.has_unsaved_changes()
    }

    /// Current save status message, if one is showing.
    #[wasm_bindgen(js_name = saveStatusMessage)]
    pub fn save_status_message(&self) -> Option<String> {
        self.view.save_status().map(|s| s.message.clone())
    }

    /// "info", "success" or "error", if a status is showing.
    #[wasm_bindgen(js_name = saveStatusKind)]
    pub fn save_status_kind(&self) -> Option<String> {
        self.view.save_status().map(|s| {
            match s.kind {
                StatusKind::Info => "info",
                StatusKind::Success => "success",
                StatusKind::Error => "error",
            }
            .to_string()
        })
    }
}
