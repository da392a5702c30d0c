//! Save lifecycle: atomic replace-all, failures, and concurrent edits.

use super::support::{MemoryBackend, ctx_at, record};
use crate::format::{BackendError, SaveError};
use crate::model::{BoundingBox, Point};
use crate::state::{AnnotationView, GestureOutcome, StatusKind};

fn loaded(backend: &MemoryBackend) -> AnnotationView {
    let mut view = AnnotationView::default();
    view.load_from(backend, "w1").unwrap();
    view
}

fn draw_box(view: &mut AnnotationView, from: Point, to: Point) {
    view.pointer_down(from);
    let outcome = view.pointer_up(to, &ctx_at("alice", 0));
    assert!(matches!(outcome, GestureOutcome::Added(_)), "{outcome:?}");
}

#[test]
fn test_save_replaces_whole_set() {
    let backend = MemoryBackend::default().with_image("w1", 800, 600).with_boxes(
        "w1",
        vec![
            record(10.0, 10.0, 50.0, 50.0, "BURN"),
            record(100.0, 100.0, 50.0, 50.0, "STOMA"),
        ],
    );
    let mut view = loaded(&backend);
    let first = view.store().iter().next().unwrap().id;
    view.delete(first);

    view.save_to(&backend).unwrap();
    let stored = backend.stored("w1");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].category, "STOMA");
    // Untouched records keep their persisted provenance
    assert_eq!(stored[0].created_by, "seed");
    assert_eq!(stored[0].last_modified_at, "2023-01-01T00:00:00.000Z");
}

#[test]
fn test_save_payload_matches_store() {
    let backend = MemoryBackend::default().with_image("w1", 800, 600);
    let mut view = loaded(&backend);
    draw_box(&mut view, Point::new(10.0, 10.0), Point::new(60.0, 40.0));
    draw_box(&mut view, Point::new(300.0, 300.0), Point::new(200.0, 250.0));

    let request = view.begin_save().unwrap();
    assert_eq!(request.image_id, "w1");
    assert_eq!(request.boxes.len(), view.store().len());
    for (record, ann) in request.boxes.iter().zip(view.store().iter()) {
        assert_eq!(
            BoundingBox::new(record.x, record.y, record.width, record.height),
            ann.bbox
        );
        assert_eq!(record.category, ann.metadata.category);
        assert_eq!(record.doctor_notes, ann.metadata.doctor_notes);
        assert_eq!(record.created_at, ann.provenance.created_at);
    }
    assert!(view.finish_save(request.ticket));
}

#[test]
fn test_failed_save_keeps_state_and_reports() {
    let backend = MemoryBackend::default().with_image("w1", 800, 600);
    let mut view = loaded(&backend);
    draw_box(&mut view, Point::new(10.0, 10.0), Point::new(60.0, 40.0));

    backend.fail_save.set(true);
    let err = view.save_to(&backend).unwrap_err();
    assert!(matches!(err, SaveError::Backend(BackendError::Rejected(_))));

    assert_eq!(view.store().len(), 1);
    assert!(view.has_unsaved_changes());
    assert!(!view.is_saving());
    let status = view.save_status().unwrap();
    assert_eq!(status.kind, StatusKind::Error);
    assert_eq!(
        status.message,
        "Failed to save annotations: Request rejected: server returned 500"
    );
    assert!(backend.stored("w1").is_empty());

    // Retry without redrawing
    backend.fail_save.set(false);
    view.save_to(&backend).unwrap();
    assert_eq!(backend.stored("w1").len(), 1);
    assert_eq!(
        view.save_status().unwrap().message,
        "Annotations saved successfully!"
    );
}

#[test]
fn test_one_save_at_a_time() {
    let backend = MemoryBackend::default().with_image("w1", 800, 600);
    let mut view = loaded(&backend);

    let request = view.begin_save().unwrap();
    assert!(view.is_saving());
    assert_eq!(view.save_status().unwrap().message, "Saving...");
    assert!(matches!(view.begin_save(), Err(SaveError::InFlight)));
    assert!(matches!(view.save_to(&backend), Err(SaveError::InFlight)));
    assert_eq!(backend.saves.get(), 0);

    assert!(view.finish_save(request.ticket));
    assert!(view.begin_save().is_ok());
}

#[test]
fn test_edits_during_save_stay_unsaved() {
    let backend = MemoryBackend::default().with_image("w1", 800, 600);
    let mut view = loaded(&backend);
    draw_box(&mut view, Point::new(10.0, 10.0), Point::new(60.0, 40.0));

    let request = view.begin_save().unwrap();
    draw_box(&mut view, Point::new(200.0, 200.0), Point::new(260.0, 240.0));
    assert!(view.finish_save(request.ticket));

    assert_eq!(request.boxes.len(), 1);
    assert!(view.has_unsaved_changes());

    view.save_to(&backend).unwrap();
    assert_eq!(backend.stored("w1").len(), 2);
    assert!(!view.has_unsaved_changes());
}

#[test]
fn test_save_requires_loaded_view() {
    let mut view = AnnotationView::default();
    assert!(matches!(view.begin_save(), Err(SaveError::NotReady)));

    let backend = MemoryBackend::default();
    let _ = view.load_from(&backend, "missing");
    assert!(matches!(view.begin_save(), Err(SaveError::NotReady)));
}

#[test]
fn test_save_result_after_close_is_ignored() {
    let backend = MemoryBackend::default().with_image("w1", 800, 600);
    let mut view = loaded(&backend);
    let request = view.begin_save().unwrap();

    view.close();
    assert!(!view.finish_save(request.ticket));
    assert!(view.save_status().is_none());
    assert!(!view.is_saving());
}
