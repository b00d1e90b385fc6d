//! Freehand strokes in world coordinates.

use eframe::egui;

/// One line segment `(x1, y1, x2, y2)` in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub from: egui::Pos2,
    pub to: egui::Pos2,
}

/// Segments of a single pointer drag, in order.
pub type Stroke = Vec<Segment>;

#[derive(Clone, Debug, Default)]
pub struct Doodle {
    strokes: Vec<Stroke>,
    current: Option<Stroke>,
    last: egui::Pos2,
}

impl Doodle {
    pub fn begin(&mut self, world: egui::Pos2) {
        self.current = Some(Vec::new());
        self.last = world;
    }

    /// Extend the stroke in progress and return the new segment so the
    /// caller can draw just that piece.
    pub fn extend(&mut self, world: egui::Pos2) -> Option<Segment> {
        let stroke = self.current.as_mut()?;
        if world == self.last {
            return None;
        }
        let segment = Segment {
            from: self.last,
            to: world,
        };
        stroke.push(segment);
        self.last = world;
        Some(segment)
    }

    pub fn finish(&mut self) {
        if let Some(stroke) = self.current.take() {
            if !stroke.is_empty() {
                self.strokes.push(stroke);
            }
        }
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.current = None;
    }

    pub fn is_drawing(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.current.as_ref().map_or(true, |s| s.is_empty())
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Committed segments followed by the stroke in progress.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.strokes.iter().chain(self.current.iter()).flatten()
    }
}
