//! Fit-to-viewport mathematics.
//!
//! One uniform scale factor maps the image's natural pixel grid onto the
//! rendered canvas. Stored geometry always lives in image space; pointer
//! positions arrive in screen space and must go through [`ViewportFit`]
//! before they touch the store.

use crate::constants::{DEFAULT_MAX_VIEWPORT_HEIGHT, DEFAULT_MAX_VIEWPORT_WIDTH};
use crate::model::Point;

/// Target box the image is fitted into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportCap {
    pub max_width: f64,
    pub max_height: f64,
}

impl ViewportCap {
    pub fn new(max_width: f64, max_height: f64) -> Self {
        Self {
            max_width,
            max_height,
        }
    }
}

impl Default for ViewportCap {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_VIEWPORT_WIDTH, DEFAULT_MAX_VIEWPORT_HEIGHT)
    }
}

/// Scale state computed once per loaded image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportFit {
    /// Natural image width in pixels
    pub natural_width: u32,
    /// Natural image height in pixels
    pub natural_height: u32,
    /// Screen pixels per image pixel
    pub scale: f64,
}

impl ViewportFit {
    /// Fit an image of the given natural size into `cap`.
    ///
    /// `scale = min(max_width / natural_width, max_height / natural_height)`.
    /// The result is not clamped to 1, so small images are scaled up to fill
    /// the cap. Returns None for zero-sized images or a degenerate cap.
    pub fn compute(natural_width: u32, natural_height: u32, cap: ViewportCap) -> Option<Self> {
        if natural_width == 0 || natural_height == 0 {
            return None;
        }
        let scale_x = cap.max_width / natural_width as f64;
        let scale_y = cap.max_height / natural_height as f64;
        let scale = scale_x.min(scale_y);
        if !scale.is_finite() || scale <= 0.0 {
            return None;
        }

        log::debug!(
            "Fit {}x{} into {:.0}x{:.0}: scale {:.4}",
            natural_width,
            natural_height,
            cap.max_width,
            cap.max_height,
            scale
        );

        Some(Self {
            natural_width,
            natural_height,
            scale,
        })
    }

    /// Identity fit (scale 1) for an image of the given size.
    pub fn identity(natural_width: u32, natural_height: u32) -> Self {
        Self {
            natural_width,
            natural_height,
            scale: 1.0,
        }
    }

    /// Rendered canvas width in screen pixels.
    pub fn rendered_width(&self) -> f64 {
        self.natural_width as f64 * self.scale
    }

    /// Rendered canvas height in screen pixels.
    pub fn rendered_height(&self) -> f64 {
        self.natural_height as f64 * self.scale
    }

    /// Convert a single screen-space length or coordinate to image space.
    #[inline]
    pub fn to_image(&self, screen: f64) -> f64 {
        screen / self.scale
    }

    /// Convert a single image-space length or coordinate to screen space.
    #[inline]
    pub fn to_screen(&self, image: f64) -> f64 {
        image * self.scale
    }

    /// Convert a pointer position to image space.
    pub fn screen_to_image(&self, p: Point) -> Point {
        Point::new(self.to_image(p.x), self.to_image(p.y))
    }

    /// Convert an image-space point to screen space.
    pub fn image_to_screen(&self, p: Point) -> Point {
        Point::new(self.to_screen(p.x), self.to_screen(p.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 0.001;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_exact_fit_is_identity() {
        let fit = ViewportFit::compute(800, 600, ViewportCap::new(800.0, 600.0)).unwrap();
        assert_eq!(fit.scale, 1.0);
        assert_eq!(fit.rendered_width(), 800.0);
        assert_eq!(fit.rendered_height(), 600.0);
    }

    #[test]
    fn test_oversized_image_scales_down_by_tighter_axis() {
        // Width-bound: 800/4000 = 0.2, height 600/1000 = 0.6
        let fit = ViewportFit::compute(4000, 1000, ViewportCap::new(800.0, 600.0)).unwrap();
        assert!(approx_eq(fit.scale, 0.2));
        assert!(approx_eq(fit.rendered_width(), 800.0));
        assert!(approx_eq(fit.rendered_height(), 200.0));
    }

    #[test]
    fn test_small_image_scales_up() {
        let fit = ViewportFit::compute(200, 100, ViewportCap::new(800.0, 600.0)).unwrap();
        assert!(approx_eq(fit.scale, 4.0));
        assert!(approx_eq(fit.rendered_width(), 800.0));
        assert!(approx_eq(fit.rendered_height(), 400.0));
    }

    #[test]
    fn test_zero_sized_image_has_no_fit() {
        assert!(ViewportFit::compute(0, 600, ViewportCap::default()).is_none());
        assert!(ViewportFit::compute(600, 0, ViewportCap::default()).is_none());
        assert!(ViewportFit::compute(600, 600, ViewportCap::new(0.0, 600.0)).is_none());
    }

    #[test]
    fn test_round_trip_many_sizes() {
        let sizes = [(1, 1), (37, 4096), (800, 600), (3024, 4032), (10_000, 7)];
        let caps = [
            ViewportCap::new(800.0, 600.0),
            ViewportCap::new(123.0, 977.0),
            ViewportCap::new(1920.0, 1080.0),
        ];
        for &(w, h) in &sizes {
            for &cap in &caps {
                let fit = ViewportFit::compute(w, h, cap).unwrap();
                let p = Point::new(w as f64 * 0.37, h as f64 * 0.81);
                let back = fit.screen_to_image(fit.image_to_screen(p));
                let tolerance = (w.max(h) as f64) * 1e-5;
                assert!((back.x - p.x).abs() <= tolerance, "{w}x{h} {cap:?}");
                assert!((back.y - p.y).abs() <= tolerance, "{w}x{h} {cap:?}");
            }
        }
    }

    #[test]
    fn test_pointer_conversion_uses_scale() {
        let fit = ViewportFit::compute(1600, 1200, ViewportCap::new(800.0, 600.0)).unwrap();
        let img = fit.screen_to_image(Point::new(100.0, 50.0));
        assert!(approx_eq(img.x, 200.0));
        assert!(approx_eq(img.y, 100.0));
    }
}
