//! Scenario tests for the annotation view.
//!
//! These drive [`AnnotationView`](crate::state::AnnotationView) end to end
//! against an in-memory backend: load, draw, edit, save, and the failure
//! paths around each.

mod load_tests;
mod save_tests;
mod support;
