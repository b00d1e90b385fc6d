//! Drawing targets for the overlay (calipers, doodle, rubberband).
//!
//! The canvas only ever emits lines and text in canvas pixel coordinates;
//! where they land is up to the surface.

use ab_glyph::{point, Font, FontArc, ScaleFont};
use eframe::egui;
use image::{Rgba, RgbaImage};
use std::sync::OnceLock;

/// Measurement label size in pixels, on screen and in exports.
pub const LABEL_FONT_SIZE: f32 = 14.0;

pub trait Surface {
    fn line(&mut self, from: egui::Pos2, to: egui::Pos2, stroke: egui::Stroke);
    fn text(&mut self, at: egui::Pos2, text: &str, color: egui::Color32);
}

// ── egui ────────────────────────────────────────────────────────────────────

/// Paints onto an egui painter; canvas pixels are relative to `origin`.
pub struct PainterSurface<'a> {
    painter: &'a egui::Painter,
    origin: egui::Vec2,
}

impl<'a> PainterSurface<'a> {
    pub fn new(painter: &'a egui::Painter, canvas_rect: egui::Rect) -> Self {
        Self {
            painter,
            origin: canvas_rect.min.to_vec2(),
        }
    }
}

impl Surface for PainterSurface<'_> {
    fn line(&mut self, from: egui::Pos2, to: egui::Pos2, stroke: egui::Stroke) {
        self.painter
            .line_segment([from + self.origin, to + self.origin], stroke);
    }

    fn text(&mut self, at: egui::Pos2, text: &str, color: egui::Color32) {
        self.painter.text(
            at + self.origin,
            egui::Align2::CENTER_CENTER,
            text,
            egui::FontId::proportional(LABEL_FONT_SIZE),
            color,
        );
    }
}

// ── Raster ──────────────────────────────────────────────────────────────────

/// Burns lines and labels into an RGBA buffer for export.
pub struct RasterSurface<'a> {
    image: &'a mut RgbaImage,
}

impl<'a> RasterSurface<'a> {
    pub fn new(image: &'a mut RgbaImage) -> Self {
        Self { image }
    }
}

impl Surface for RasterSurface<'_> {
    fn line(&mut self, from: egui::Pos2, to: egui::Pos2, stroke: egui::Stroke) {
        let [r, g, b, _] = stroke.color.to_array();
        stamp_line(self.image, from, to, stroke.width, Rgba([r, g, b, 255]));
    }

    /// Centred on `at` like the painter's `CENTER_CENTER`.
    fn text(&mut self, at: egui::Pos2, text: &str, color: egui::Color32) {
        let Some(font) = label_font() else {
            return;
        };
        let scaled = font.as_scaled(LABEL_FONT_SIZE);

        let mut glyphs = Vec::with_capacity(text.len());
        let mut cursor = 0.0;
        let mut prev = None;
        for ch in text.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = prev {
                cursor += scaled.kern(prev, id);
            }
            glyphs.push((id, cursor));
            cursor += scaled.h_advance(id);
            prev = Some(id);
        }

        let left = at.x - cursor / 2.0;
        let baseline = at.y + (scaled.ascent() + scaled.descent()) / 2.0;
        let [r, g, b, _] = color.to_array();
        let image = &mut *self.image;
        for (id, x) in glyphs {
            let glyph = id.with_scale_and_position(LABEL_FONT_SIZE, point(left + x, baseline));
            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i64 + i64::from(gx);
                let y = bounds.min.y as i64 + i64::from(gy);
                blend(image, x, y, [r, g, b], coverage);
            });
        }
    }
}

/// egui's default proportional font, so exported labels look like the
/// ones on screen. `None` if the bundled data does not parse.
fn label_font() -> Option<&'static FontArc> {
    static FONT: OnceLock<Option<FontArc>> = OnceLock::new();
    FONT.get_or_init(|| {
        let defs = egui::FontDefinitions::default();
        let name = defs.families.get(&egui::FontFamily::Proportional)?.first()?;
        let data = defs.font_data.get(name)?;
        match FontArc::try_from_vec(data.font.to_vec()) {
            Ok(font) => Some(font),
            Err(e) => {
                log::warn!("Cannot load label font {name}, exports will have no labels: {e}");
                None
            }
        }
    })
    .as_ref()
}

fn blend(img: &mut RgbaImage, x: i64, y: i64, rgb: [u8; 3], coverage: f32) {
    if x < 0 || y < 0 || x >= i64::from(img.width()) || y >= i64::from(img.height()) {
        return;
    }
    let alpha = coverage.clamp(0.0, 1.0);
    if alpha == 0.0 {
        return;
    }
    let px = img.get_pixel_mut(x as u32, y as u32);
    for (dst, src) in px.0.iter_mut().zip(rgb) {
        *dst = (f32::from(src) * alpha + f32::from(*dst) * (1.0 - alpha)).round() as u8;
    }
    px.0[3] = px.0[3].max((alpha * 255.0).round() as u8);
}

/// Stamp a square pen `width` pixels wide every half pixel along the
/// segment. Pixels outside the image are skipped.
fn stamp_line(img: &mut RgbaImage, from: egui::Pos2, to: egui::Pos2, width: f32, color: Rgba<u8>) {
    let delta = to - from;
    let samples = (delta.length() * 2.0).ceil().max(1.0) as u32;
    let reach = ((width - 1.0) / 2.0).max(0.0).round() as i64;
    let (max_x, max_y) = (i64::from(img.width()) - 1, i64::from(img.height()) - 1);

    for step in 0..=samples {
        let p = from + delta * (step as f32 / samples as f32);
        let (cx, cy) = (p.x as i64, p.y as i64);
        for y in (cy - reach).max(0)..=(cy + reach).min(max_y) {
            for x in (cx - reach).max(0)..=(cx + reach).min(max_x) {
                img.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}
