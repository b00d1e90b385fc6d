//! Canvas pixels <-> world units.
//!
//! World coordinates are pinned to the display image: its top edge is world
//! `y = 0` and its bottom edge is `WORLD_HEIGHT`, whatever the window size.
//! Calipers and doodles are stored in world units so they survive resizes.

use eframe::egui;

/// Height of the display image in world units.
pub const WORLD_HEIGHT: f32 = 1000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Uniform fit of the display image into the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateTransform {
    /// World units per canvas pixel.
    world_per_pixel: f32,
    /// Canvas pixels per display-image pixel.
    fit_scale: f32,
    /// Top-left corner of the scaled image inside the canvas.
    offset: egui::Vec2,
    /// Size of the scaled image in canvas pixels.
    scaled_size: egui::Vec2,
}

impl CoordinateTransform {
    /// Fit a `display_w` x `display_h` image into a canvas, preserving aspect
    /// ratio. Whichever axis is tighter drives the scale and the image is
    /// centred.
    ///
    /// Returns `None` for empty images or canvases.
    pub fn fit(display_w: u32, display_h: u32, canvas_w: f32, canvas_h: f32) -> Option<Self> {
        if display_w == 0 || display_h == 0 || canvas_w <= 0.0 || canvas_h <= 0.0 {
            return None;
        }
        let (dw, dh) = (display_w as f32, display_h as f32);

        let fit_scale = if dw / dh > canvas_w / canvas_h {
            canvas_w / dw
        } else {
            canvas_h / dh
        };

        let scaled_size = egui::vec2((dw * fit_scale).floor(), (dh * fit_scale).floor());
        if scaled_size.y < 1.0 {
            return None;
        }

        Some(Self {
            world_per_pixel: WORLD_HEIGHT / scaled_size.y,
            fit_scale,
            offset: (egui::vec2(canvas_w, canvas_h) - scaled_size) / 2.0,
            scaled_size,
        })
    }

    /// Transform for drawing onto a canvas the same size as the image.
    pub fn native(display_w: u32, display_h: u32) -> Option<Self> {
        Self::fit(display_w, display_h, display_w as f32, display_h as f32)
    }

    pub fn pixel_to_world(&self, coord: f32, axis: Axis) -> f32 {
        ((coord - self.axis_offset(axis)) * self.world_per_pixel).round()
    }

    pub fn world_to_pixel(&self, coord: f32, axis: Axis) -> f32 {
        coord / self.world_per_pixel + self.axis_offset(axis)
    }

    pub fn pixel_to_world_pos(&self, pos: egui::Pos2) -> egui::Pos2 {
        egui::pos2(
            self.pixel_to_world(pos.x, Axis::X),
            self.pixel_to_world(pos.y, Axis::Y),
        )
    }

    pub fn world_to_pixel_pos(&self, pos: egui::Pos2) -> egui::Pos2 {
        egui::pos2(
            self.world_to_pixel(pos.x, Axis::X),
            self.world_to_pixel(pos.y, Axis::Y),
        )
    }

    /// Where the display image lands, relative to the canvas origin.
    pub fn image_rect(&self) -> egui::Rect {
        egui::Rect::from_min_size(self.offset.to_pos2(), self.scaled_size)
    }

    /// Map a canvas-space rectangle to display-image pixels
    /// `[x1, y1, x2, y2]`, truncating toward zero. Values may fall outside
    /// the image.
    pub fn canvas_to_display_pixels(&self, rect: egui::Rect) -> [i64; 4] {
        let to_px = |v: f32, axis: Axis| ((v - self.axis_offset(axis)) / self.fit_scale) as i64;
        [
            to_px(rect.min.x, Axis::X),
            to_px(rect.min.y, Axis::Y),
            to_px(rect.max.x, Axis::X),
            to_px(rect.max.y, Axis::Y),
        ]
    }

    pub fn world_per_pixel(&self) -> f32 {
        self.world_per_pixel
    }

    pub fn fit_scale(&self) -> f32 {
        self.fit_scale
    }

    pub fn offset(&self) -> egui::Vec2 {
        self.offset
    }

    fn axis_offset(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.offset.x,
            Axis::Y => self.offset.y,
        }
    }
}
