//! Pointer gesture handling for the annotation canvas.
//!
//! Pointer positions arrive in screen space. Drawing tracks its corners in
//! image space; dragging tracks the pointer in screen space and converts the
//! final top-left corner to image space before it reaches the store.

use crate::constants::MIN_DRAG_DISTANCE;
use crate::fit_math::ViewportFit;
use crate::model::{Annotation, AnnotationId, BoundingBox, EditContext, Point};
use crate::state::store::AnnotationStore;

/// Current pointer gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum GestureState {
    /// No pointer captured.
    #[default]
    Idle,
    /// Drawing a new box; both corners in image space.
    Drawing { anchor: Point, current: Point },
    /// Pressed on an existing box; positions in screen space.
    Dragging {
        annotation_id: AnnotationId,
        /// Pointer position at press
        start: Point,
        /// Box top-left at press
        origin: Point,
        /// Latest pointer position
        current: Point,
        /// Set once the pointer travelled past the drag threshold
        moving: bool,
    },
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }

    /// The box being drawn, in image space, normalized.
    pub fn draft_box(&self) -> Option<BoundingBox> {
        match self {
            GestureState::Drawing { anchor, current } => {
                Some(BoundingBox::from_corners(*anchor, *current))
            }
            _ => None,
        }
    }

    /// Annotation being moved and its current top-left in screen space.
    pub fn drag_preview(&self) -> Option<(AnnotationId, Point)> {
        match self {
            GestureState::Dragging {
                annotation_id,
                start,
                origin,
                current,
                moving: true,
            } => Some((
                *annotation_id,
                Point::new(origin.x + current.x - start.x, origin.y + current.y - start.y),
            )),
            _ => None,
        }
    }
}

/// What a pointer event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Nothing changed.
    Ignored,
    /// A press on empty canvas started a new box.
    DrawStarted,
    /// A press on an existing box selected it.
    Selected(AnnotationId),
    /// A finished draw was committed to the store.
    Added(AnnotationId),
    /// A finished draw was too small and was thrown away.
    Discarded,
    /// A drag moved an existing box.
    Moved(AnnotationId),
}

/// Draw/drag state machine. One gesture at a time.
#[derive(Debug, Clone)]
pub struct Interaction {
    state: GestureState,
    drag_enabled: bool,
}

impl Default for Interaction {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Interaction {
    pub fn new(drag_enabled: bool) -> Self {
        Self {
            state: GestureState::Idle,
            drag_enabled,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn set_drag_enabled(&mut self, enabled: bool) {
        self.drag_enabled = enabled;
    }

    /// Abandon the current gesture without touching the store.
    pub fn cancel(&mut self) {
        if !self.state.is_idle() {
            log::debug!("Gesture cancelled");
        }
        self.state = GestureState::Idle;
    }

    /// Pointer pressed. Existing boxes win over starting a new draw.
    pub fn pointer_down(
        &mut self,
        screen: Point,
        store: &mut AnnotationStore,
        fit: &ViewportFit,
    ) -> GestureOutcome {
        if !self.state.is_idle() {
            log::debug!("Ignoring pointer down during {:?}", self.state);
            return GestureOutcome::Ignored;
        }

        let image = fit.screen_to_image(screen);

        if let Some(id) = store.hit_test(&image) {
            store.select(Some(id));
            if self.drag_enabled {
                if let Some(annotation) = store.get(id) {
                    self.state = GestureState::Dragging {
                        annotation_id: id,
                        start: screen,
                        origin: fit.image_to_screen(annotation.bbox.top_left()),
                        current: screen,
                        moving: false,
                    };
                    log::debug!("Potential drag on annotation {}", id);
                }
            }
            return GestureOutcome::Selected(id);
        }

        self.state = GestureState::Drawing {
            anchor: image,
            current: image,
        };
        log::debug!("Started drawing at ({:.1}, {:.1})", image.x, image.y);
        GestureOutcome::DrawStarted
    }

    /// Pointer moved while pressed.
    pub fn pointer_move(&mut self, screen: Point, fit: &ViewportFit) {
        match &mut self.state {
            GestureState::Idle => {}
            GestureState::Drawing { current, .. } => {
                *current = fit.screen_to_image(screen);
                log::trace!("Drawing to ({:.1}, {:.1})", current.x, current.y);
            }
            GestureState::Dragging {
                annotation_id,
                start,
                current,
                moving,
                ..
            } => {
                *current = screen;
                if !*moving && start.distance_to(&screen) >= MIN_DRAG_DISTANCE {
                    *moving = true;
                    log::debug!("Started dragging annotation {}", annotation_id);
                }
            }
        }
    }

    /// Pointer released. Always returns to idle.
    pub fn pointer_up(
        &mut self,
        screen: Point,
        store: &mut AnnotationStore,
        fit: &ViewportFit,
        ctx: &EditContext,
    ) -> GestureOutcome {
        self.pointer_move(screen, fit);

        match std::mem::take(&mut self.state) {
            GestureState::Idle => GestureOutcome::Ignored,
            drawing @ GestureState::Drawing { .. } => {
                let Some(raw) = drawing.draft_box() else {
                    return GestureOutcome::Ignored;
                };
                if !raw.exceeds_draw_threshold() {
                    log::debug!(
                        "Discarding {:.1}x{:.1} box below draw threshold",
                        raw.width,
                        raw.height
                    );
                    return GestureOutcome::Discarded;
                }
                match store.add(raw, ctx) {
                    Some(id) => GestureOutcome::Added(id),
                    None => GestureOutcome::Discarded,
                }
            }
            dragging @ GestureState::Dragging { .. } => match dragging.drag_preview() {
                Some((id, top_left)) => drag_end(store, fit, ctx, id, top_left),
                None => GestureOutcome::Ignored,
            },
        }
    }
}

/// Move an annotation so its top-left sits at `screen_top_left`.
///
/// Only `x`/`y` change; the position is converted to image space first.
/// Hosts that run their own drag handles call this on drag end.
pub fn drag_end(
    store: &mut AnnotationStore,
    fit: &ViewportFit,
    ctx: &EditContext,
    id: AnnotationId,
    screen_top_left: Point,
) -> GestureOutcome {
    let Some(annotation) = store.get(id).cloned() else {
        log::debug!("Drag ended on unknown annotation {}", id);
        return GestureOutcome::Ignored;
    };
    let image = fit.screen_to_image(screen_top_left);
    let moved = Annotation {
        bbox: annotation.bbox.moved_to(image.x, image.y),
        ..annotation
    };
    if store.update(moved, ctx) {
        log::debug!(
            "Moved annotation {} to ({:.1}, {:.1})",
            id,
            image.x,
            image.y
        );
        GestureOutcome::Moved(id)
    } else {
        GestureOutcome::Ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit_math::ViewportCap;
    use crate::model::WoundMetadata;
    use chrono::{TimeZone, Utc};

    fn ctx() -> EditContext {
        EditContext::new("alice", Utc.timestamp_opt(1_700_000_000, 0).unwrap())
    }

    fn half_scale() -> ViewportFit {
        // 1600x1200 into 800x600: scale 0.5
        ViewportFit::compute(1600, 1200, ViewportCap::new(800.0, 600.0)).unwrap()
    }

    fn draw(
        interaction: &mut Interaction,
        store: &mut AnnotationStore,
        fit: &ViewportFit,
        from: Point,
        to: Point,
    ) -> GestureOutcome {
        interaction.pointer_down(from, store, fit);
        interaction.pointer_move(to, fit);
        interaction.pointer_up(to, store, fit, &ctx())
    }

    #[test]
    fn test_draw_normalizes_any_corner_order() {
        let fit = ViewportFit::identity(800, 600);
        let corners = [
            (Point::new(100.0, 100.0), Point::new(50.0, 50.0)),
            (Point::new(50.0, 50.0), Point::new(100.0, 100.0)),
            (Point::new(50.0, 100.0), Point::new(100.0, 50.0)),
            (Point::new(100.0, 50.0), Point::new(50.0, 100.0)),
        ];
        for (p1, p2) in corners {
            let mut store = AnnotationStore::new();
            let mut interaction = Interaction::default();
            let GestureOutcome::Added(id) = draw(&mut interaction, &mut store, &fit, p1, p2) else {
                panic!("expected a committed box for {p1:?} -> {p2:?}");
            };
            assert_eq!(
                store.get(id).unwrap().bbox,
                BoundingBox::new(50.0, 50.0, 50.0, 50.0)
            );
            assert!(interaction.state().is_idle());
        }
    }

    #[test]
    fn test_draw_below_threshold_is_discarded() {
        let fit = ViewportFit::identity(800, 600);
        let mut store = AnnotationStore::new();
        let mut interaction = Interaction::default();

        let cases = [
            (Point::new(10.0, 10.0), Point::new(10.0, 10.0)),
            (Point::new(10.0, 10.0), Point::new(15.0, 100.0)),
            (Point::new(10.0, 10.0), Point::new(100.0, 5.0)),
            (Point::new(10.0, 10.0), Point::new(5.0, 5.0)),
        ];
        for (p1, p2) in cases {
            assert_eq!(
                draw(&mut interaction, &mut store, &fit, p1, p2),
                GestureOutcome::Discarded
            );
        }
        assert!(store.is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_threshold_applies_in_image_space() {
        // 4 screen px at scale 0.5 is 8 image px, above the threshold
        let fit = half_scale();
        let mut store = AnnotationStore::new();
        let mut interaction = Interaction::default();
        let outcome = draw(
            &mut interaction,
            &mut store,
            &fit,
            Point::new(10.0, 10.0),
            Point::new(14.0, 14.0),
        );
        let GestureOutcome::Added(id) = outcome else {
            panic!("expected a committed box, got {outcome:?}");
        };
        assert_eq!(
            store.get(id).unwrap().bbox,
            BoundingBox::new(20.0, 20.0, 8.0, 8.0)
        );
    }

    #[test]
    fn test_press_on_existing_box_selects_instead_of_drawing() {
        let fit = ViewportFit::identity(800, 600);
        let mut store = AnnotationStore::new();
        store.set_working_defaults(WoundMetadata::new("BURN", "HEAD"));
        let id = store
            .add(BoundingBox::new(10.0, 10.0, 100.0, 100.0), &ctx())
            .unwrap();
        store.select(None);

        let mut interaction = Interaction::new(false);
        let outcome = interaction.pointer_down(Point::new(50.0, 50.0), &mut store, &fit);
        assert_eq!(outcome, GestureOutcome::Selected(id));
        assert_eq!(store.selected_id(), Some(id));
        assert_eq!(store.working().category, "BURN");
        assert!(interaction.state().is_idle());

        // Release without a gesture adds nothing
        interaction.pointer_up(Point::new(200.0, 200.0), &mut store, &fit, &ctx());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_drag_converts_to_image_space() {
        let fit = half_scale();
        let mut store = AnnotationStore::new();
        let id = store
            .add(BoundingBox::new(100.0, 100.0, 200.0, 100.0), &ctx())
            .unwrap();
        let mut interaction = Interaction::default();

        // Box top-left is at screen (50, 50)
        interaction.pointer_down(Point::new(60.0, 60.0), &mut store, &fit);
        interaction.pointer_move(Point::new(80.0, 70.0), &fit);
        assert_eq!(
            interaction.state().drag_preview(),
            Some((id, Point::new(70.0, 60.0)))
        );
        let outcome = interaction.pointer_up(Point::new(90.0, 75.0), &mut store, &fit, &ctx());

        assert_eq!(outcome, GestureOutcome::Moved(id));
        // Screen offset (30, 15) is (60, 30) in image space
        assert_eq!(
            store.get(id).unwrap().bbox,
            BoundingBox::new(160.0, 130.0, 200.0, 100.0)
        );
    }

    #[test]
    fn test_press_without_travel_does_not_move() {
        let fit = ViewportFit::identity(800, 600);
        let mut store = AnnotationStore::new();
        let id = store
            .add(BoundingBox::new(10.0, 10.0, 100.0, 100.0), &ctx())
            .unwrap();
        let revision = store.revision();
        let mut interaction = Interaction::default();

        interaction.pointer_down(Point::new(50.0, 50.0), &mut store, &fit);
        let outcome = interaction.pointer_up(Point::new(51.0, 50.0), &mut store, &fit, &ctx());
        assert_eq!(outcome, GestureOutcome::Ignored);
        assert_eq!(store.revision(), revision);
        assert_eq!(store.get(id).unwrap().bbox.x, 10.0);
    }

    #[test]
    fn test_direct_drag_end_keeps_extent_and_metadata() {
        let fit = half_scale();
        let mut store = AnnotationStore::new();
        store.set_working_defaults(WoundMetadata::new("STOMA", "TORSO BACK"));
        let id = store
            .add(BoundingBox::new(0.0, 0.0, 40.0, 30.0), &ctx())
            .unwrap();

        let outcome = drag_end(&mut store, &fit, &ctx(), id, Point::new(25.0, 5.0));
        assert_eq!(outcome, GestureOutcome::Moved(id));
        let ann = store.get(id).unwrap();
        assert_eq!(ann.bbox, BoundingBox::new(50.0, 10.0, 40.0, 30.0));
        assert_eq!(ann.metadata.category, "STOMA");

        assert_eq!(
            drag_end(&mut store, &fit, &ctx(), 77, Point::new(0.0, 0.0)),
            GestureOutcome::Ignored
        );
    }

    #[test]
    fn test_no_nested_gestures() {
        let fit = ViewportFit::identity(800, 600);
        let mut store = AnnotationStore::new();
        let mut interaction = Interaction::default();
        interaction.pointer_down(Point::new(0.0, 0.0), &mut store, &fit);
        assert_eq!(
            interaction.pointer_down(Point::new(10.0, 10.0), &mut store, &fit),
            GestureOutcome::Ignored
        );
        interaction.cancel();
        assert!(interaction.state().is_idle());
        assert!(store.is_empty());
    }
}
