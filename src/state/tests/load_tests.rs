//! Load lifecycle: all-or-nothing hydration and stale results.

use super::support::{MemoryBackend, ctx_at, png_bytes, record};
use crate::fit_math::ViewportCap;
use crate::format::{AnnotationConfig, AnnotationsDocument, LoadError, LoadedContext};
use crate::model::Point;
use crate::state::{AnnotationView, GestureOutcome, ViewPhase};

#[test]
fn test_annotation_failure_fails_whole_load() {
    let backend = MemoryBackend {
        fail_annotations: true,
        ..Default::default()
    }
    .with_image("w1", 800, 600)
    .with_boxes("w1", vec![record(1.0, 1.0, 10.0, 10.0, "BURN")]);

    let mut view = AnnotationView::default();
    let err = view.load_from(&backend, "w1").unwrap_err();
    assert!(matches!(err, LoadError::Annotations(_)));
    assert!(matches!(view.phase(), ViewPhase::Failed(_)));
    assert!(view.store().is_empty());
    assert!(view.fit().is_none());
    assert!(view.overlay().is_empty());
}

#[test]
fn test_config_and_image_failures() {
    let backend = MemoryBackend {
        fail_config: true,
        ..Default::default()
    }
    .with_image("w1", 800, 600);
    let mut view = AnnotationView::default();
    assert!(matches!(
        view.load_from(&backend, "w1"),
        Err(LoadError::Config(_))
    ));

    let backend = MemoryBackend::default();
    assert!(matches!(
        view.load_from(&backend, "missing"),
        Err(LoadError::Image(_))
    ));
    let ViewPhase::Failed(reason) = view.phase() else {
        panic!("expected failed phase, got {:?}", view.phase());
    };
    assert!(reason.contains("missing"));
}

#[test]
fn test_undecodable_image_fails_load() {
    let mut backend = MemoryBackend::default();
    backend
        .images
        .insert("w1".to_string(), b"definitely not an image".to_vec());
    let mut view = AnnotationView::default();
    assert!(matches!(
        view.load_from(&backend, "w1"),
        Err(LoadError::ImageDecode { .. })
    ));
}

#[test]
fn test_gestures_disabled_until_ready() {
    let mut view = AnnotationView::default();
    let ticket = view.begin_load("w1");
    assert_eq!(view.phase(), &ViewPhase::Loading);
    assert_eq!(
        view.pointer_down(Point::new(10.0, 10.0)),
        GestureOutcome::Ignored
    );
    assert_eq!(
        view.pointer_up(Point::new(100.0, 100.0), &ctx_at("alice", 0)),
        GestureOutcome::Ignored
    );
    assert!(view.store().is_empty());

    let context = LoadedContext::from_parts(
        AnnotationConfig::default(),
        &png_bytes(400, 300),
        AnnotationsDocument::default(),
    )
    .unwrap();
    assert!(view.finish_load(&ticket, context));
    assert_eq!(
        view.pointer_down(Point::new(10.0, 10.0)),
        GestureOutcome::DrawStarted
    );
}

#[test]
fn test_stale_load_is_discarded() {
    let mut view = AnnotationView::default();
    let first = view.begin_load("w1");
    let second = view.begin_load("w2");

    let stale = LoadedContext::from_parts(
        AnnotationConfig::default(),
        &png_bytes(800, 600),
        AnnotationsDocument {
            boxes: vec![record(1.0, 1.0, 10.0, 10.0, "BURN")],
        },
    )
    .unwrap();
    assert!(!view.finish_load(&first, stale));
    assert!(!view.fail_load(&first, "timeout"));
    assert_eq!(view.phase(), &ViewPhase::Loading);
    assert_eq!(view.image_id(), Some("w2"));
    assert!(view.store().is_empty());

    let fresh = LoadedContext::from_parts(
        AnnotationConfig::default(),
        &png_bytes(800, 600),
        AnnotationsDocument::default(),
    )
    .unwrap();
    assert!(view.finish_load(&second, fresh));
    assert!(view.is_ready());
}

#[test]
fn test_load_after_close_is_discarded() {
    let mut view = AnnotationView::default();
    let ticket = view.begin_load("w1");
    view.close();

    let context = LoadedContext::from_parts(
        AnnotationConfig::default(),
        &png_bytes(800, 600),
        AnnotationsDocument::default(),
    )
    .unwrap();
    assert!(!view.finish_load(&ticket, context));
    assert_eq!(view.phase(), &ViewPhase::Closed);
    assert!(view.image_id().is_none());
}

#[test]
fn test_degenerate_persisted_boxes_are_dropped() {
    let backend = MemoryBackend::default().with_image("w1", 800, 600).with_boxes(
        "w1",
        vec![
            record(1.0, 1.0, 10.0, 10.0, "BURN"),
            record(1.0, 1.0, 0.0, 10.0, "BURN"),
        ],
    );
    let mut view = AnnotationView::default();
    view.load_from(&backend, "w1").unwrap();
    assert_eq!(view.store().len(), 1);
    assert!(!view.has_unsaved_changes());
}

#[test]
fn test_small_image_is_scaled_up() {
    let backend = MemoryBackend::default().with_image("tiny", 200, 100);
    let mut view = AnnotationView::default();
    view.load_from(&backend, "tiny").unwrap();
    assert_eq!(view.fit().unwrap().scale, 4.0);
}

#[test]
fn test_viewport_cap_applies_to_next_load() {
    let backend = MemoryBackend::default()
        .with_image("w1", 1600, 1200)
        .with_image("w2", 1600, 1200);
    let mut view = AnnotationView::default();
    view.load_from(&backend, "w1").unwrap();
    assert_eq!(view.fit().unwrap().scale, 0.5);

    view.set_viewport_cap(ViewportCap::new(400.0, 600.0));
    assert_eq!(view.fit().unwrap().scale, 0.5);

    view.load_from(&backend, "w2").unwrap();
    assert_eq!(view.fit().unwrap().scale, 0.25);
    assert_eq!(view.fit().unwrap().rendered_width(), 400.0);
}
