//! The drawing area: routes pointer events to the active tool and keeps
//! the overlay (calipers, doodle, crop rubberband) in world units.
//!
//! The canvas never paints on its own. Mutations raise one of two redraw
//! flags and the host drains them once per frame with [`Canvas::take_redraw`].

use eframe::egui;

use crate::caliper::{
    Caliper, CaliperInput, CaliperOutcome, CaliperShape, CaliperState, CaliperStyle, Completion,
    HitKind,
};
use crate::doodle::Doodle;
use crate::error::{Result, ViewerError};
use crate::surface::Surface;
use crate::transform::CoordinateTransform;

// ── Events ──────────────────────────────────────────────────────────────────

/// Pointer input in canvas pixels (relative to the canvas' top-left corner).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Moved(egui::Pos2),
    PrimaryDown(egui::Pos2),
    PrimaryUp(egui::Pos2),
    SecondaryDown(egui::Pos2),
}

impl PointerEvent {
    pub fn pos(&self) -> egui::Pos2 {
        match *self {
            PointerEvent::Moved(p)
            | PointerEvent::PrimaryDown(p)
            | PointerEvent::PrimaryUp(p)
            | PointerEvent::SecondaryDown(p) => p,
        }
    }
}

/// What the session has to act on after a pointer event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CanvasReply {
    None,
    /// Right click on empty canvas, at this canvas position.
    ContextMenu(egui::Pos2),
    /// Rubberband released; rectangle in canvas pixels.
    CropSelected(egui::Rect),
    /// The calibration caliper spans this many world units.
    CalibrationRequested(f32),
    Notice(&'static str),
}

// ── Tools ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ActiveTool {
    #[default]
    Idle,
    /// Index into the caliper list of the caliper receiving events.
    Caliper(usize),
    Doodle,
    Rubberband {
        start: Option<egui::Pos2>,
        current: egui::Pos2,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RedrawFlags {
    /// Display image or canvas size changed; the image must be refitted.
    pub background: bool,
    /// Only the overlay changed.
    pub foreground: bool,
}

impl RedrawFlags {
    pub fn any(&self) -> bool {
        self.background || self.foreground
    }
}

/// Pens for everything the canvas draws over the image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayStyle {
    pub caliper: CaliperStyle,
    pub doodle: egui::Stroke,
    pub rubberband: egui::Stroke,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            caliper: CaliperStyle::default(),
            doodle: egui::Stroke::new(2.0, egui::Color32::from_rgb(0, 0, 255)),
            rubberband: egui::Stroke::new(1.0, egui::Color32::from_gray(90)),
        }
    }
}

// ── Canvas ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Canvas {
    calipers: Vec<Caliper>,
    tool: ActiveTool,
    hover: Option<(usize, HitKind)>,
    doodle: Doodle,
    /// Milliseconds per world unit; `0` when uncalibrated.
    calibration: f32,
    /// World length of the calibration caliper awaiting a duration.
    pending_calibration: Option<f32>,
    caliper_shape: CaliperShape,

    size: egui::Vec2,
    display_size: (u32, u32),
    transform: Option<CoordinateTransform>,
    redraw: RedrawFlags,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Geometry ────────────────────────────────────────────────────────

    pub fn set_size(&mut self, size: egui::Vec2) {
        if size != self.size {
            self.size = size;
            self.refit();
        }
    }

    pub fn set_display_size(&mut self, width: u32, height: u32) {
        self.display_size = (width, height);
        self.refit();
    }

    /// Forget the image; the transform is gone until a new display size.
    pub fn clear_display(&mut self) {
        self.display_size = (0, 0);
        self.refit();
    }

    pub fn size(&self) -> egui::Vec2 {
        self.size
    }

    pub fn transform(&self) -> Option<&CoordinateTransform> {
        self.transform.as_ref()
    }

    fn refit(&mut self) {
        let (w, h) = self.display_size;
        self.transform = CoordinateTransform::fit(w, h, self.size.x, self.size.y);
        self.redraw.background = true;
    }

    // ── Redraw flags ────────────────────────────────────────────────────

    pub fn take_redraw(&mut self) -> RedrawFlags {
        std::mem::take(&mut self.redraw)
    }

    fn mark_foreground(&mut self) {
        self.redraw.foreground = true;
    }

    // ── State ───────────────────────────────────────────────────────────

    pub fn tool(&self) -> ActiveTool {
        self.tool
    }

    pub fn calipers(&self) -> &[Caliper] {
        &self.calipers
    }

    pub fn doodle(&self) -> &Doodle {
        &self.doodle
    }

    pub fn calibration(&self) -> f32 {
        self.calibration
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration > 0.0
    }

    /// Restore a stored calibration. Anything not positive means
    /// uncalibrated.
    pub fn set_calibration(&mut self, calibration: f32) {
        self.calibration = if calibration.is_finite() && calibration > 0.0 {
            calibration
        } else {
            0.0
        };
        self.mark_foreground();
    }

    pub fn pending_calibration(&self) -> Option<f32> {
        self.pending_calibration
    }

    pub fn set_caliper_shape(&mut self, shape: CaliperShape) {
        self.caliper_shape = shape;
    }

    pub fn is_doodling(&self) -> bool {
        self.tool == ActiveTool::Doodle
    }

    pub fn cursor(&self) -> egui::CursorIcon {
        match self.tool {
            ActiveTool::Idle => match self.hover {
                Some((_, HitKind::Bridge)) => egui::CursorIcon::Grab,
                Some(_) => egui::CursorIcon::ResizeHorizontal,
                None => egui::CursorIcon::Default,
            },
            ActiveTool::Caliper(i) => match self.calipers.get(i).map(Caliper::state) {
                Some(CaliperState::Dragging) => egui::CursorIcon::Grabbing,
                _ => egui::CursorIcon::ResizeHorizontal,
            },
            ActiveTool::Doodle => egui::CursorIcon::Crosshair,
            ActiveTool::Rubberband { .. } => egui::CursorIcon::Crosshair,
        }
    }

    // ── Tools ───────────────────────────────────────────────────────────

    /// Start a caliper that follows the pointer until its first leg is set.
    pub fn new_caliper(&mut self) {
        self.abandon_tool();
        self.calipers.push(Caliper::new(self.caliper_shape));
        self.tool = ActiveTool::Caliper(self.calipers.len() - 1);
        self.mark_foreground();
    }

    /// Start the one-shot calibration caliper. Any earlier one is dropped.
    pub fn start_calibration(&mut self) {
        self.abandon_tool();
        self.remove_calibration_caliper();
        self.calipers.push(Caliper::calibration());
        self.tool = ActiveTool::Caliper(self.calipers.len() - 1);
        self.mark_foreground();
    }

    /// Parse a duration in milliseconds for the pending calibration
    /// caliper. On error the request stays pending so the user can retry.
    pub fn submit_calibration(&mut self, input: &str) -> Result<f32> {
        let Some(measurement) = self.pending_calibration else {
            return Err(ViewerError::InvalidCalibration(
                "no calibration in progress".into(),
            ));
        };
        let millis: f32 = input
            .trim()
            .parse()
            .map_err(|_| ViewerError::InvalidCalibration(input.trim().to_string()))?;
        if !millis.is_finite() || millis <= 0.0 {
            return Err(ViewerError::InvalidCalibration(input.trim().to_string()));
        }

        self.calibration = millis / measurement;
        self.pending_calibration = None;
        self.remove_calibration_caliper();
        log::info!(
            "Calibrated: {millis} ms over {measurement} units ({} ms/unit)",
            self.calibration
        );
        Ok(self.calibration)
    }

    pub fn cancel_calibration(&mut self) {
        self.pending_calibration = None;
        self.remove_calibration_caliper();
    }

    pub fn remove_caliper(&mut self, index: usize) {
        if index >= self.calipers.len() {
            return;
        }
        self.calipers.remove(index);
        self.tool = match self.tool {
            ActiveTool::Caliper(i) if i == index => ActiveTool::Idle,
            ActiveTool::Caliper(i) if i > index => ActiveTool::Caliper(i - 1),
            other => other,
        };
        self.hover = None;
        self.mark_foreground();
    }

    pub fn remove_all_calipers(&mut self) {
        if matches!(self.tool, ActiveTool::Caliper(_)) {
            self.tool = ActiveTool::Idle;
        }
        self.calipers.clear();
        self.pending_calibration = None;
        self.hover = None;
        self.mark_foreground();
    }

    /// Returns whether doodling is now on.
    pub fn toggle_doodle(&mut self) -> bool {
        if self.tool == ActiveTool::Doodle {
            self.doodle.finish();
            self.tool = ActiveTool::Idle;
        } else {
            self.abandon_tool();
            self.tool = ActiveTool::Doodle;
        }
        self.is_doodling()
    }

    pub fn clear_doodle(&mut self) {
        self.doodle.clear();
        self.mark_foreground();
    }

    pub fn start_crop_selection(&mut self) {
        self.abandon_tool();
        self.tool = ActiveTool::Rubberband {
            start: None,
            current: egui::Pos2::ZERO,
        };
    }

    /// Drop everything drawn in world units. Used whenever the display
    /// image changes shape, so stored coordinates would no longer line up.
    pub fn reset_foreground(&mut self) {
        self.calipers.clear();
        self.doodle.clear();
        self.calibration = 0.0;
        self.pending_calibration = None;
        self.tool = ActiveTool::Idle;
        self.hover = None;
        self.mark_foreground();
    }

    /// Leave the current tool. A caliper that never got both legs is
    /// discarded; one being dragged is dropped where it is.
    fn abandon_tool(&mut self) {
        match self.tool {
            ActiveTool::Caliper(i) => {
                self.tool = ActiveTool::Idle;
                match self.calipers.get(i).map(Caliper::state) {
                    Some(CaliperState::Dragging) => {
                        self.calipers[i].handle(CaliperInput::PrimaryDown(egui::Pos2::ZERO));
                    }
                    Some(CaliperState::Fixed) | None => {}
                    Some(_) => self.remove_caliper(i),
                }
            }
            ActiveTool::Doodle => {
                self.doodle.finish();
                self.tool = ActiveTool::Idle;
            }
            ActiveTool::Rubberband { .. } => {
                self.tool = ActiveTool::Idle;
                self.mark_foreground();
            }
            ActiveTool::Idle => {}
        }
    }

    fn remove_calibration_caliper(&mut self) {
        if let Some(i) = self
            .calipers
            .iter()
            .position(|c| c.behavior().is_calibration())
        {
            self.remove_caliper(i);
        }
    }

    fn hit(&self, world: egui::Pos2) -> Option<(usize, HitKind)> {
        self.calipers
            .iter()
            .enumerate()
            .find_map(|(i, c)| c.hit(world).map(|kind| (i, kind)))
    }

    // ── Pointer routing ─────────────────────────────────────────────────

    pub fn handle_pointer(&mut self, event: PointerEvent) -> CanvasReply {
        let Some(transform) = self.transform else {
            return CanvasReply::None;
        };
        if self.pending_calibration.is_some() {
            return CanvasReply::None;
        }
        let world = transform.pixel_to_world_pos(event.pos());

        match self.tool {
            ActiveTool::Idle => self.handle_idle(event, world),
            ActiveTool::Caliper(index) => self.handle_caliper(index, event, world),
            ActiveTool::Doodle => self.handle_doodle(event, world),
            ActiveTool::Rubberband { start, .. } => self.handle_rubberband(start, event),
        }
    }

    fn handle_idle(&mut self, event: PointerEvent, world: egui::Pos2) -> CanvasReply {
        match event {
            PointerEvent::Moved(_) => {
                let hover = self.hit(world);
                if hover != self.hover {
                    self.hover = hover;
                    self.mark_foreground();
                }
            }
            PointerEvent::PrimaryDown(pos) => match self.hit(world) {
                Some((index, kind)) => {
                    log::debug!("Grabbed caliper {index} at {kind:?}");
                    self.calipers[index].grab(kind, world);
                    self.tool = ActiveTool::Caliper(index);
                    self.hover = None;
                    self.mark_foreground();
                }
                // the new caliper follows the pointer; the next click drops its first leg
                None => {
                    self.new_caliper();
                    return self.handle_pointer(PointerEvent::Moved(pos));
                }
            },
            PointerEvent::SecondaryDown(pos) => match self.hit(world) {
                Some((index, _)) => self.remove_caliper(index),
                None => return CanvasReply::ContextMenu(pos),
            },
            PointerEvent::PrimaryUp(_) => {}
        }
        CanvasReply::None
    }

    fn handle_caliper(&mut self, index: usize, event: PointerEvent, world: egui::Pos2) -> CanvasReply {
        let input = match event {
            PointerEvent::Moved(_) => CaliperInput::Moved(world),
            PointerEvent::PrimaryDown(_) => CaliperInput::PrimaryDown(world),
            PointerEvent::SecondaryDown(_) => CaliperInput::SecondaryDown,
            PointerEvent::PrimaryUp(_) => return CanvasReply::None,
        };
        let Some(caliper) = self.calipers.get_mut(index) else {
            self.tool = ActiveTool::Idle;
            return CanvasReply::None;
        };

        let outcome = caliper.handle(input);
        self.mark_foreground();
        match outcome {
            CaliperOutcome::Continue => CanvasReply::None,
            CaliperOutcome::Released => {
                self.tool = ActiveTool::Idle;
                CanvasReply::None
            }
            CaliperOutcome::Cancelled => {
                self.remove_caliper(index);
                self.tool = ActiveTool::Idle;
                CanvasReply::None
            }
            CaliperOutcome::Completed => {
                self.tool = ActiveTool::Idle;
                let Some(measurement) = self.calipers[index].measurement(self.calibration) else {
                    return CanvasReply::None;
                };
                match self.calipers[index].behavior().on_completion(&measurement) {
                    Completion::Keep => CanvasReply::None,
                    Completion::RequestCalibration { measurement } if measurement > 0.0 => {
                        self.pending_calibration = Some(measurement);
                        CanvasReply::CalibrationRequested(measurement)
                    }
                    Completion::RequestCalibration { .. } => {
                        self.remove_caliper(index);
                        CanvasReply::Notice("Calibration caliper has zero width")
                    }
                }
            }
        }
    }

    fn handle_doodle(&mut self, event: PointerEvent, world: egui::Pos2) -> CanvasReply {
        match event {
            PointerEvent::PrimaryDown(_) => self.doodle.begin(world),
            PointerEvent::Moved(_) => {
                if self.doodle.extend(world).is_some() {
                    self.mark_foreground();
                }
            }
            PointerEvent::PrimaryUp(_) => self.doodle.finish(),
            PointerEvent::SecondaryDown(pos) => {
                self.doodle.finish();
                return CanvasReply::ContextMenu(pos);
            }
        }
        CanvasReply::None
    }

    fn handle_rubberband(&mut self, start: Option<egui::Pos2>, event: PointerEvent) -> CanvasReply {
        match (event, start) {
            (PointerEvent::PrimaryDown(p), _) => {
                self.tool = ActiveTool::Rubberband {
                    start: Some(p),
                    current: p,
                };
            }
            (PointerEvent::Moved(p), Some(s)) => {
                self.tool = ActiveTool::Rubberband {
                    start: Some(s),
                    current: p,
                };
                self.mark_foreground();
            }
            (PointerEvent::PrimaryUp(p), Some(s)) => {
                self.tool = ActiveTool::Idle;
                self.mark_foreground();
                return CanvasReply::CropSelected(egui::Rect::from_two_pos(s, p));
            }
            (PointerEvent::SecondaryDown(_), _) => {
                self.tool = ActiveTool::Idle;
                self.mark_foreground();
            }
            _ => {}
        }
        CanvasReply::None
    }

    // ── Drawing ─────────────────────────────────────────────────────────

    /// Overlay for the screen: calipers, doodle and the crop rubberband.
    pub fn draw(&self, surface: &mut dyn Surface, style: &OverlayStyle) {
        let Some(transform) = self.transform else {
            return;
        };
        self.draw_overlay(surface, &transform, style);

        if let ActiveTool::Rubberband {
            start: Some(start),
            current,
        } = self.tool
        {
            let r = egui::Rect::from_two_pos(start, current);
            let corners = [r.left_top(), r.right_top(), r.right_bottom(), r.left_bottom()];
            for (i, from) in corners.iter().enumerate() {
                surface.line(*from, corners[(i + 1) % 4], style.rubberband);
            }
        }
    }

    /// Calipers and doodle through an arbitrary transform, e.g. onto the
    /// display image at its native size.
    pub fn draw_overlay(
        &self,
        surface: &mut dyn Surface,
        transform: &CoordinateTransform,
        style: &OverlayStyle,
    ) {
        for (i, caliper) in self.calipers.iter().enumerate() {
            let highlight = match self.hover {
                Some((h, kind)) if h == i => Some(kind),
                _ => None,
            };
            caliper.draw(surface, transform, &style.caliper, highlight, self.calibration);
        }
        for segment in self.doodle.segments() {
            surface.line(
                transform.world_to_pixel_pos(segment.from),
                transform.world_to_pixel_pos(segment.to),
                style.doodle,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1000x1000 image on a 1000x1000 canvas: pixels equal world units.
    fn canvas() -> Canvas {
        let mut c = Canvas::new();
        c.set_size(egui::vec2(1000.0, 1000.0));
        c.set_display_size(1000, 1000);
        c.take_redraw();
        c
    }

    fn click(c: &mut Canvas, x: f32, y: f32) -> CanvasReply {
        c.handle_pointer(PointerEvent::Moved(egui::pos2(x, y)));
        c.handle_pointer(PointerEvent::PrimaryDown(egui::pos2(x, y)))
    }

    fn place_caliper(c: &mut Canvas, x1: f32, x2: f32, y: f32) {
        c.new_caliper();
        click(c, x1, y);
        click(c, x2, y);
    }

    #[derive(Default)]
    struct Lines(usize);

    impl Surface for Lines {
        fn line(&mut self, _: egui::Pos2, _: egui::Pos2, _: egui::Stroke) {
            self.0 += 1;
        }
        fn text(&mut self, _: egui::Pos2, _: &str, _: egui::Color32) {}
    }

    #[test]
    fn test_no_image_ignores_pointer() {
        let mut c = Canvas::new();
        c.set_size(egui::vec2(500.0, 500.0));
        let reply = c.handle_pointer(PointerEvent::SecondaryDown(egui::pos2(1.0, 1.0)));

        assert_eq!(reply, CanvasReply::None);
        assert!(c.transform().is_none());
    }

    #[test]
    fn test_geometry_changes_raise_background() {
        let mut c = canvas();
        c.set_size(egui::vec2(800.0, 600.0));
        let flags = c.take_redraw();

        assert!(flags.background);
        assert!(!c.take_redraw().any());
    }

    #[test]
    fn test_new_caliper_lifecycle() {
        let mut c = canvas();
        c.new_caliper();
        assert_eq!(c.tool(), ActiveTool::Caliper(0));

        click(&mut c, 100.0, 400.0);
        c.handle_pointer(PointerEvent::Moved(egui::pos2(180.0, 420.0)));
        assert!(c.take_redraw().foreground);
        click(&mut c, 200.0, 420.0);

        assert_eq!(c.tool(), ActiveTool::Idle);
        let cal = &c.calipers()[0];
        assert_eq!((cal.x1, cal.x2, cal.y2), (100.0, 200.0, 420.0));
        assert_eq!(cal.state(), CaliperState::Fixed);
    }

    #[test]
    fn test_click_on_empty_canvas_starts_caliper_at_pointer() {
        let mut c = canvas();
        click(&mut c, 300.0, 300.0);

        assert_eq!(c.tool(), ActiveTool::Caliper(0));
        assert_eq!(c.calipers()[0].state(), CaliperState::PlacingFirstLeg);
        assert_eq!(c.calipers()[0].x1, 300.0);

        click(&mut c, 320.0, 300.0);
        assert_eq!(c.calipers().len(), 1);
        assert_eq!(c.calipers()[0].state(), CaliperState::PlacingSecondLeg);
        assert_eq!(c.calipers()[0].x1, 320.0);
    }

    #[test]
    fn test_right_click_cancels_active_caliper() {
        let mut c = canvas();
        place_caliper(&mut c, 100.0, 200.0, 500.0);
        c.new_caliper();
        click(&mut c, 600.0, 500.0);

        c.handle_pointer(PointerEvent::SecondaryDown(egui::pos2(650.0, 500.0)));

        assert_eq!(c.calipers().len(), 1);
        assert_eq!(c.tool(), ActiveTool::Idle);
    }

    #[test]
    fn test_right_click_removes_hit_caliper_or_opens_menu() {
        let mut c = canvas();
        place_caliper(&mut c, 100.0, 200.0, 500.0);

        let reply = c.handle_pointer(PointerEvent::SecondaryDown(egui::pos2(700.0, 700.0)));
        assert_eq!(reply, CanvasReply::ContextMenu(egui::pos2(700.0, 700.0)));
        assert_eq!(c.calipers().len(), 1);

        let reply = c.handle_pointer(PointerEvent::SecondaryDown(egui::pos2(105.0, 10.0)));
        assert_eq!(reply, CanvasReply::None);
        assert!(c.calipers().is_empty());
    }

    #[test]
    fn test_hover_then_drag_bridge() {
        let mut c = canvas();
        place_caliper(&mut c, 100.0, 300.0, 500.0);

        c.handle_pointer(PointerEvent::Moved(egui::pos2(200.0, 505.0)));
        assert_eq!(c.cursor(), egui::CursorIcon::Grab);

        c.handle_pointer(PointerEvent::PrimaryDown(egui::pos2(200.0, 505.0)));
        c.handle_pointer(PointerEvent::Moved(egui::pos2(250.0, 600.0)));
        assert_eq!(c.cursor(), egui::CursorIcon::Grabbing);
        c.handle_pointer(PointerEvent::PrimaryDown(egui::pos2(250.0, 600.0)));

        let cal = &c.calipers()[0];
        assert_eq!((cal.x1, cal.x2, cal.y2), (150.0, 350.0, 600.0));
        assert_eq!(c.tool(), ActiveTool::Idle);
    }

    #[test]
    fn test_first_caliper_in_creation_order_wins() {
        let mut c = canvas();
        place_caliper(&mut c, 100.0, 300.0, 500.0);
        place_caliper(&mut c, 105.0, 400.0, 200.0);

        c.handle_pointer(PointerEvent::PrimaryDown(egui::pos2(103.0, 50.0)));

        assert_eq!(c.tool(), ActiveTool::Caliper(0));
    }

    #[test]
    fn test_remove_caliper_shifts_active_index() {
        let mut c = canvas();
        place_caliper(&mut c, 100.0, 200.0, 500.0);
        place_caliper(&mut c, 400.0, 500.0, 500.0);
        c.new_caliper();
        assert_eq!(c.tool(), ActiveTool::Caliper(2));

        c.remove_caliper(0);
        assert_eq!(c.tool(), ActiveTool::Caliper(1));
        c.remove_caliper(1);
        assert_eq!(c.tool(), ActiveTool::Idle);
    }

    #[test]
    fn test_switching_tools_discards_unplaced_caliper() {
        let mut c = canvas();
        place_caliper(&mut c, 100.0, 200.0, 500.0);
        c.new_caliper();
        click(&mut c, 600.0, 500.0);

        assert!(c.toggle_doodle());
        assert_eq!(c.calipers().len(), 1);
        assert!(!c.toggle_doodle());
        assert_eq!(c.tool(), ActiveTool::Idle);
    }

    #[test]
    fn test_calibration_flow() {
        let mut c = canvas();
        c.start_calibration();
        click(&mut c, 100.0, 500.0);
        let reply = click(&mut c, 300.0, 500.0);

        assert_eq!(reply, CanvasReply::CalibrationRequested(200.0));
        assert_eq!(c.pending_calibration(), Some(200.0));

        // events are held while the prompt is open
        c.handle_pointer(PointerEvent::PrimaryDown(egui::pos2(800.0, 800.0)));
        assert_eq!(c.calipers().len(), 1);

        assert!(matches!(
            c.submit_calibration("abc"),
            Err(ViewerError::InvalidCalibration(_))
        ));
        assert!(c.submit_calibration("-5").is_err());
        assert_eq!(c.pending_calibration(), Some(200.0));

        let calibration = c.submit_calibration(" 1000 ").unwrap();
        assert_eq!(calibration, 5.0);
        assert!(c.is_calibrated());
        assert!(c.calipers().is_empty());
        assert!(c.pending_calibration().is_none());
    }

    #[test]
    fn test_cancelled_calibration_keeps_previous_value() {
        let mut c = canvas();
        c.set_calibration(2.0);
        place_caliper(&mut c, 10.0, 20.0, 30.0);
        c.start_calibration();
        click(&mut c, 100.0, 500.0);
        click(&mut c, 300.0, 500.0);

        c.cancel_calibration();

        assert_eq!(c.calibration(), 2.0);
        assert_eq!(c.calipers().len(), 1);
        assert!(!c.calipers()[0].behavior().is_calibration());
    }

    #[test]
    fn test_zero_width_calibration_is_discarded() {
        let mut c = canvas();
        c.start_calibration();
        click(&mut c, 100.0, 500.0);
        let reply = click(&mut c, 100.0, 500.0);

        assert!(matches!(reply, CanvasReply::Notice(_)));
        assert!(c.calipers().is_empty());
        assert!(c.pending_calibration().is_none());
    }

    #[test]
    fn test_doodle_drag() {
        let mut c = canvas();
        c.toggle_doodle();
        c.handle_pointer(PointerEvent::PrimaryDown(egui::pos2(10.0, 10.0)));
        c.handle_pointer(PointerEvent::Moved(egui::pos2(20.0, 10.0)));
        c.handle_pointer(PointerEvent::Moved(egui::pos2(30.0, 15.0)));
        c.handle_pointer(PointerEvent::PrimaryUp(egui::pos2(30.0, 15.0)));
        // moving with the button up draws nothing
        c.handle_pointer(PointerEvent::Moved(egui::pos2(90.0, 90.0)));

        assert_eq!(c.doodle().strokes().len(), 1);
        assert_eq!(c.doodle().segments().count(), 2);
        assert!(c.is_doodling());
    }

    #[test]
    fn test_rubberband_reports_rect() {
        let mut c = canvas();
        c.start_crop_selection();
        c.handle_pointer(PointerEvent::PrimaryDown(egui::pos2(300.0, 200.0)));
        c.handle_pointer(PointerEvent::Moved(egui::pos2(100.0, 400.0)));
        let reply = c.handle_pointer(PointerEvent::PrimaryUp(egui::pos2(100.0, 400.0)));

        assert_eq!(
            reply,
            CanvasReply::CropSelected(egui::Rect::from_min_max(
                egui::pos2(100.0, 200.0),
                egui::pos2(300.0, 400.0)
            ))
        );
        assert_eq!(c.tool(), ActiveTool::Idle);
    }

    #[test]
    fn test_reset_foreground_is_idempotent() {
        let mut c = canvas();
        c.set_calibration(4.0);
        place_caliper(&mut c, 100.0, 200.0, 500.0);
        c.toggle_doodle();
        c.handle_pointer(PointerEvent::PrimaryDown(egui::pos2(10.0, 10.0)));
        c.handle_pointer(PointerEvent::Moved(egui::pos2(20.0, 10.0)));

        c.reset_foreground();
        let once = (
            c.calipers().len(),
            c.doodle().is_empty(),
            c.calibration(),
            c.tool(),
        );
        c.reset_foreground();
        let twice = (
            c.calipers().len(),
            c.doodle().is_empty(),
            c.calibration(),
            c.tool(),
        );

        assert_eq!(once, (0, true, 0.0, ActiveTool::Idle));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_draw_counts_overlay_lines() {
        let mut c = canvas();
        place_caliper(&mut c, 100.0, 200.0, 500.0);
        c.toggle_doodle();
        c.handle_pointer(PointerEvent::PrimaryDown(egui::pos2(10.0, 10.0)));
        c.handle_pointer(PointerEvent::Moved(egui::pos2(20.0, 10.0)));
        c.handle_pointer(PointerEvent::PrimaryUp(egui::pos2(20.0, 10.0)));
        c.toggle_doodle();
        c.start_crop_selection();
        c.handle_pointer(PointerEvent::PrimaryDown(egui::pos2(0.0, 0.0)));
        c.handle_pointer(PointerEvent::Moved(egui::pos2(50.0, 50.0)));

        let mut lines = Lines::default();
        c.draw(&mut lines, &OverlayStyle::default());

        // 3 caliper lines, 1 doodle segment, 4 rubberband edges
        assert_eq!(lines.0, 8);
    }
}
