//! Annotation state: store, gestures, and the view lifecycle around them.

mod interaction;
mod save_status;
mod store;
mod view;

#[cfg(test)]
mod tests;

pub use interaction::{GestureOutcome, GestureState, Interaction, drag_end};
pub use save_status::{SaveStatus, SaveStatusTracker, StatusKind};
pub use store::{AnnotationStore, CategoryCounts};
pub use view::{AnnotationView, LoadTicket, SaveRequest, SaveTicket, ViewPhase};
