//! Global constants for the wound annotator

use std::time::Duration;

/// Default viewport width cap for the annotation canvas
pub const DEFAULT_MAX_VIEWPORT_WIDTH: f64 = 800.0;

/// Default viewport height cap for the annotation canvas
pub const DEFAULT_MAX_VIEWPORT_HEIGHT: f64 = 600.0;

/// Horizontal space kept free around the canvas when sizing from the window width
pub const DEFAULT_WINDOW_MARGIN: f64 = 40.0;

/// A drawn rectangle must exceed this extent (image pixels) on both axes to be kept
pub const MIN_DRAW_EXTENT: f64 = 5.0;

/// Stroke color used for categories missing from the color map
pub const DEFAULT_CATEGORY_COLOR: [u8; 3] = [0xFF, 0x00, 0x00];

/// Stroke color of the selected annotation
pub const SELECTED_STROKE_COLOR: [u8; 3] = [0xFF, 0xFF, 0x00];

/// Alpha applied to the category color when filling committed rectangles
pub const COMMITTED_FILL_ALPHA: u8 = 0x20;

/// Alpha of the neutral fill under the rectangle being drawn
pub const DRAFT_FILL_ALPHA: u8 = 0x1A;

/// Stroke width for all rectangles, in screen pixels
pub const STROKE_WIDTH: f64 = 2.0;

/// Dash pattern (on, off) for the rectangle being drawn
pub const DRAFT_DASH: [f64; 2] = [5.0, 5.0];

/// How long a success status message stays visible
pub const SUCCESS_STATUS_TTL: Duration = Duration::from_secs(3);

/// Pointer travel (screen pixels) before a press on a rectangle becomes a move
pub const MIN_DRAG_DISTANCE: f64 = 3.0;
