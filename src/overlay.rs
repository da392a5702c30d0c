//! Render model for the rectangles drawn over the image.
//!
//! Everything here is in screen space, ready for a canvas backend to stroke
//! and fill. Committed annotations come first in z-order, the rectangle being
//! drawn (if any) last.

use serde::Serialize;

use crate::color_utils::Rgba;
use crate::constants::{
    COMMITTED_FILL_ALPHA, DRAFT_DASH, DRAFT_FILL_ALPHA, SELECTED_STROKE_COLOR, STROKE_WIDTH,
};
use crate::fit_math::ViewportFit;
use crate::format::AnnotationConfig;
use crate::model::{AnnotationId, BoundingBox};
use crate::state::{AnnotationStore, GestureState};

/// One rectangle to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RectOverlay {
    /// None for the rectangle being drawn
    pub annotation_id: Option<AnnotationId>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub stroke: Rgba,
    pub stroke_width: f64,
    pub fill: Rgba,
    /// Dash pattern (on, off); solid when None
    pub dash: Option<[f64; 2]>,
    pub highlighted: bool,
}

fn to_screen(fit: &ViewportFit, bbox: &BoundingBox) -> BoundingBox {
    let top_left = fit.image_to_screen(bbox.top_left());
    BoundingBox::new(
        top_left.x,
        top_left.y,
        fit.to_screen(bbox.width),
        fit.to_screen(bbox.height),
    )
}

/// Build the overlay for the current store and gesture.
pub fn build_overlay(
    store: &AnnotationStore,
    gesture: &GestureState,
    config: &AnnotationConfig,
    fit: &ViewportFit,
) -> Vec<RectOverlay> {
    let drag = gesture.drag_preview();
    let selected = store.selected_id();

    let mut rects: Vec<RectOverlay> = store
        .iter()
        .map(|ann| {
            let color = config.color_for(&ann.metadata.category);
            let is_selected = selected == Some(ann.id);
            let mut rect = to_screen(fit, &ann.bbox);
            if let Some((id, top_left)) = drag {
                if id == ann.id {
                    rect = rect.moved_to(top_left.x, top_left.y);
                }
            }
            RectOverlay {
                annotation_id: Some(ann.id),
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
                stroke: if is_selected {
                    Rgba::opaque(SELECTED_STROKE_COLOR)
                } else {
                    color
                },
                stroke_width: STROKE_WIDTH,
                fill: color.with_alpha(COMMITTED_FILL_ALPHA),
                dash: None,
                highlighted: is_selected,
            }
        })
        .collect();

    if let Some(draft) = gesture.draft_box() {
        let rect = to_screen(fit, &draft);
        rects.push(RectOverlay {
            annotation_id: None,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            stroke: config.color_for(&store.working().category),
            stroke_width: STROKE_WIDTH,
            fill: Rgba([0, 0, 0, DRAFT_FILL_ALPHA]),
            dash: Some(DRAFT_DASH),
            highlighted: false,
        });
    }

    rects
}
