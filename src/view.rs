//! Viewport math: the mapping between canvas (screen) coordinates and
//! image pixels under zoom and pan.
//!
//! This is the part of the frontend that has actual invariants worth
//! testing: zooming at the cursor must keep the image point under the
//! cursor fixed, and a drag on the canvas must land on the right image
//! pixels no matter how the view is zoomed or panned. No rendering
//! happens here; a frontend owns the drawing and asks this type where
//! things are.

use crate::annot::{BBox, Canvas, Coord, Pixel};

/// One zoom-in step (mouse wheel up, `+` key).
pub const ZOOM_IN_SCALE: f64 = 1.1;
/// One zoom-out step (mouse wheel down, `-` key).
pub const ZOOM_OUT_SCALE: f64 = 0.9;

/// The zoom/pan state of a displayed image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    zoom: f64,
    /// Canvas position of the image's top-left corner.
    origin: Coord<Canvas>,
    image_width: f64,
    image_height: f64,
}

impl Viewport {
    /// Creates a viewport at 1:1 zoom with the image at the canvas origin.
    pub fn new(image_width: u32, image_height: u32) -> Self {
        Self {
            zoom: 1.0,
            origin: Coord::default(),
            image_width: image_width as f64,
            image_height: image_height as f64,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn origin(&self) -> Coord<Canvas> {
        self.origin
    }

    /// Shrinks the view so the whole image fits in the given area.
    ///
    /// Only ever zooms out: an image smaller than the area stays at 1:1.
    pub fn fit_within(&mut self, avail_width: f64, avail_height: f64) {
        let ratio = (avail_width / self.image_width).min(avail_height / self.image_height);
        if ratio < 1.0 {
            self.zoom = ratio;
        }
        self.origin = Coord::default();
    }

    /// Restores 1:1 zoom with the image at the canvas origin.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.origin = Coord::default();
    }

    /// Offsets the image origin on the canvas (middle-drag panning).
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.origin = Coord::new(self.origin.x + dx, self.origin.y + dy);
    }

    /// Zooms by `scale`, keeping the image point under `cursor` fixed.
    ///
    /// Returns false (and leaves the view untouched) when the new zoom
    /// would shrink the image below one pixel wide.
    pub fn zoom_at(&mut self, cursor: Coord<Canvas>, scale: f64) -> bool {
        let new_zoom = self.zoom * scale;
        if (self.image_width * new_zoom).floor() < 1.0 {
            return false;
        }

        let rel_x = cursor.x - self.origin.x;
        let rel_y = cursor.y - self.origin.y;
        let image_x = rel_x / self.zoom;
        let image_y = rel_y / self.zoom;

        self.zoom = new_zoom;
        self.origin = Coord::new(cursor.x - image_x * self.zoom, cursor.y - image_y * self.zoom);
        true
    }

    /// Zooms around the center of the visible canvas (keyboard zoom).
    pub fn zoom_about_center(&mut self, canvas_width: f64, canvas_height: f64, scale: f64) -> bool {
        self.zoom_at(Coord::new(canvas_width / 2.0, canvas_height / 2.0), scale)
    }

    /// Maps a canvas point to image pixel coordinates.
    pub fn to_image(&self, point: Coord<Canvas>) -> Coord<Pixel> {
        Coord::new(
            (point.x - self.origin.x) / self.zoom,
            (point.y - self.origin.y) / self.zoom,
        )
    }

    /// Maps an image pixel point to canvas coordinates.
    pub fn to_canvas(&self, point: Coord<Pixel>) -> Coord<Canvas> {
        Coord::new(
            self.origin.x + point.x * self.zoom,
            self.origin.y + point.y * self.zoom,
        )
    }

    /// Turns a canvas drag into an image-space box.
    ///
    /// Both endpoints are mapped to image space and clamped to the image
    /// bounds, the corners are ordered, and boxes with zero width or
    /// height come back as `None` (a click without a drag).
    pub fn box_from_drag(
        &self,
        start: Coord<Canvas>,
        end: Coord<Canvas>,
    ) -> Option<BBox<Pixel>> {
        let a = self
            .to_image(start)
            .clamped(self.image_width, self.image_height);
        let b = self
            .to_image(end)
            .clamped(self.image_width, self.image_height);

        let bbox = BBox::from_corners(a, b);
        if bbox.is_degenerate() {
            return None;
        }
        Some(bbox)
    }
}
