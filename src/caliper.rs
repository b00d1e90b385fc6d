//! Calipers: two vertical legs joined by a horizontal bridge.
//!
//! ```text
//!      x1,0      x2,0
//!        |         |
//!  x1,y2 |_________| x2,y2
//!        |         |
//!   x1,1000    x2,1000
//! ```
//!
//! Everything here is in world units. A caliper's behaviour on completion
//! and how it labels itself come from a [`CaliperBehavior`], so the plain
//! measuring caliper and the one-shot calibration caliper share the state
//! machine.

use eframe::egui;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::surface::Surface;
use crate::transform::{CoordinateTransform, WORLD_HEIGHT};

/// Pointer distance (world units) within which a leg or bridge is hit.
pub const HIT_RANGE: f32 = 10.0;

/// Labels sit this far above (time) or below (rate) the bridge.
const LABEL_OFFSET: f32 = 40.0;

/// Half-length of truncated legs, as a fraction of the world height.
const TRUNCATED_EXTENT: f32 = 0.05;

// ── Options ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaliperShape {
    #[default]
    Full,
    /// Short legs around the bridge. Drawing only.
    Truncated,
}

impl CaliperShape {
    pub fn name(&self) -> &'static str {
        match self {
            CaliperShape::Full => "Full",
            CaliperShape::Truncated => "Truncated",
        }
    }
}

/// Which labels a measuring caliper shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementMode {
    #[default]
    Time,
    Rate,
    Both,
    None,
}

impl MeasurementMode {
    pub fn shows_time(self) -> bool {
        matches!(self, MeasurementMode::Time | MeasurementMode::Both)
    }

    pub fn shows_rate(self) -> bool {
        matches!(self, MeasurementMode::Rate | MeasurementMode::Both)
    }

    pub fn name(&self) -> &'static str {
        match self {
            MeasurementMode::Time => "Time",
            MeasurementMode::Rate => "Rate",
            MeasurementMode::Both => "Both",
            MeasurementMode::None => "None",
        }
    }

    pub fn all() -> &'static [MeasurementMode] {
        &[
            MeasurementMode::Time,
            MeasurementMode::Rate,
            MeasurementMode::Both,
            MeasurementMode::None,
        ]
    }
}

// ── Measurement ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    /// Leg separation in world units.
    pub raw: f32,
    /// Leg separation in milliseconds, when calibrated.
    pub millis: Option<f32>,
}

impl Measurement {
    pub fn new(raw: f32, calibration: f32) -> Self {
        Self {
            raw,
            millis: (calibration > 0.0).then(|| raw * calibration),
        }
    }

    /// Beats per minute for an interval of `millis`. Only defined once the
    /// measurement has been scaled to milliseconds.
    pub fn rate_bpm(&self) -> Option<f32> {
        self.millis.filter(|ms| *ms > 0.0).map(|ms| 60_000.0 / ms)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MeasurementLabel {
    pub text: String,
    /// Centre of the label in world units.
    pub world: egui::Pos2,
}

// ── Behaviours ──────────────────────────────────────────────────────────────

/// What the canvas should do once a caliper has both legs placed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Completion {
    Keep,
    /// Ask the user for the real duration of `measurement` world units.
    RequestCalibration { measurement: f32 },
}

pub trait CaliperBehavior: fmt::Debug + Sync {
    fn on_completion(&self, measurement: &Measurement) -> Completion;

    fn describe_measurement(
        &self,
        caliper: &Caliper,
        measurement: &Measurement,
        mode: MeasurementMode,
    ) -> Vec<MeasurementLabel>;

    fn stroke(&self, configured: egui::Stroke) -> egui::Stroke {
        configured
    }

    fn is_calibration(&self) -> bool {
        false
    }
}

#[derive(Debug)]
pub struct Measure;

#[derive(Debug)]
pub struct Calibrate;

pub static MEASURE: Measure = Measure;
pub static CALIBRATE: Calibrate = Calibrate;

impl CaliperBehavior for Measure {
    fn on_completion(&self, _measurement: &Measurement) -> Completion {
        Completion::Keep
    }

    fn describe_measurement(
        &self,
        caliper: &Caliper,
        measurement: &Measurement,
        mode: MeasurementMode,
    ) -> Vec<MeasurementLabel> {
        let mid_x = (caliper.x1 + caliper.x2) / 2.0;
        let mut labels = Vec::new();

        if mode.shows_rate() {
            if let Some(rate) = measurement.rate_bpm() {
                labels.push(MeasurementLabel {
                    text: format!("{} bpm", rate as i64),
                    world: egui::pos2(mid_x, caliper.y2 + LABEL_OFFSET),
                });
            }
        }
        if mode.shows_time() {
            let text = match measurement.millis {
                Some(ms) => format!("{} ms", ms as i64),
                None => format!("{} units", measurement.raw as i64),
            };
            labels.push(MeasurementLabel {
                text,
                world: egui::pos2(mid_x, caliper.y2 - LABEL_OFFSET),
            });
        }
        labels
    }
}

impl CaliperBehavior for Calibrate {
    fn on_completion(&self, measurement: &Measurement) -> Completion {
        Completion::RequestCalibration {
            measurement: measurement.raw,
        }
    }

    fn describe_measurement(
        &self,
        _caliper: &Caliper,
        _measurement: &Measurement,
        _mode: MeasurementMode,
    ) -> Vec<MeasurementLabel> {
        Vec::new()
    }

    fn stroke(&self, _configured: egui::Stroke) -> egui::Stroke {
        egui::Stroke::new(1.0, egui::Color32::BLACK)
    }

    fn is_calibration(&self) -> bool {
        true
    }
}

// ── State machine ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaliperState {
    PlacingFirstLeg,
    PlacingSecondLeg,
    Fixed,
    Dragging,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitKind {
    FirstLeg,
    SecondLeg,
    Bridge,
}

/// Pointer input already converted to world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CaliperInput {
    Moved(egui::Pos2),
    PrimaryDown(egui::Pos2),
    SecondaryDown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaliperOutcome {
    /// Still active.
    Continue,
    /// Both legs placed; run the behaviour's completion hook.
    Completed,
    /// Dropped after a whole-caliper drag.
    Released,
    /// Remove this caliper.
    Cancelled,
}

#[derive(Clone, Debug)]
pub struct Caliper {
    pub x1: f32,
    pub x2: f32,
    pub y2: f32,
    shape: CaliperShape,
    state: CaliperState,
    behavior: &'static dyn CaliperBehavior,
    x1_offset: f32,
    x2_offset: f32,
}

impl Caliper {
    pub fn new(shape: CaliperShape) -> Self {
        Self::with_behavior(shape, &MEASURE)
    }

    pub fn calibration() -> Self {
        Self::with_behavior(CaliperShape::Full, &CALIBRATE)
    }

    pub fn with_behavior(shape: CaliperShape, behavior: &'static dyn CaliperBehavior) -> Self {
        Self {
            x1: 0.0,
            x2: 0.0,
            y2: 0.0,
            shape,
            state: CaliperState::PlacingFirstLeg,
            behavior,
            x1_offset: 0.0,
            x2_offset: 0.0,
        }
    }

    pub fn state(&self) -> CaliperState {
        self.state
    }

    pub fn behavior(&self) -> &'static dyn CaliperBehavior {
        self.behavior
    }

    pub fn handle(&mut self, input: CaliperInput) -> CaliperOutcome {
        use CaliperInput::*;
        use CaliperState::*;

        match (input, self.state) {
            (SecondaryDown, _) => return CaliperOutcome::Cancelled,

            (Moved(p), PlacingFirstLeg) => {
                self.x1 = p.x;
                self.x2 = p.x;
                self.y2 = p.y;
            }
            (PrimaryDown(p), PlacingFirstLeg) => {
                self.x1 = p.x;
                self.x2 = p.x;
                self.y2 = p.y;
                self.state = PlacingSecondLeg;
            }

            (Moved(p), PlacingSecondLeg) => {
                self.x2 = p.x;
                self.y2 = p.y;
            }
            (PrimaryDown(p), PlacingSecondLeg) => {
                self.x2 = p.x;
                self.y2 = p.y;
                self.state = Fixed;
                return CaliperOutcome::Completed;
            }

            (Moved(p), Dragging) => {
                self.x1 = p.x - self.x1_offset;
                self.x2 = p.x + self.x2_offset;
                self.y2 = p.y;
            }
            (PrimaryDown(_), Dragging) => {
                self.state = Fixed;
                return CaliperOutcome::Released;
            }

            (_, Fixed) => {}
        }
        CaliperOutcome::Continue
    }

    /// Pick a fixed caliper back up at the part that was hit. Grabbing a
    /// leg makes it the moving second leg; grabbing the bridge drags the
    /// whole caliper.
    pub fn grab(&mut self, hit: HitKind, world: egui::Pos2) {
        match hit {
            HitKind::FirstLeg => {
                std::mem::swap(&mut self.x1, &mut self.x2);
                self.state = CaliperState::PlacingSecondLeg;
            }
            HitKind::SecondLeg => {
                self.state = CaliperState::PlacingSecondLeg;
            }
            HitKind::Bridge => {
                self.x1_offset = world.x - self.x1;
                self.x2_offset = self.x2 - world.x;
                self.state = CaliperState::Dragging;
            }
        }
    }

    /// First leg beats second leg beats bridge.
    pub fn hit(&self, world: egui::Pos2) -> Option<HitKind> {
        if (world.x - self.x1).abs() < HIT_RANGE {
            Some(HitKind::FirstLeg)
        } else if (world.x - self.x2).abs() < HIT_RANGE {
            Some(HitKind::SecondLeg)
        } else if (world.y - self.y2).abs() < HIT_RANGE
            && world.x >= self.x1.min(self.x2)
            && world.x <= self.x1.max(self.x2)
        {
            Some(HitKind::Bridge)
        } else {
            None
        }
    }

    /// `None` until the first leg is down.
    pub fn measurement(&self, calibration: f32) -> Option<Measurement> {
        if self.state == CaliperState::PlacingFirstLeg {
            return None;
        }
        Some(Measurement::new((self.x2 - self.x1).abs(), calibration))
    }

    pub fn labels(&self, calibration: f32, mode: MeasurementMode) -> Vec<MeasurementLabel> {
        match self.measurement(calibration) {
            Some(m) => self.behavior.describe_measurement(self, &m, mode),
            None => Vec::new(),
        }
    }

    /// Top and bottom of the legs in world units.
    pub fn leg_extent(&self) -> (f32, f32) {
        match self.shape {
            CaliperShape::Full => (0.0, WORLD_HEIGHT),
            CaliperShape::Truncated => {
                let half = WORLD_HEIGHT * TRUNCATED_EXTENT;
                (
                    (self.y2 - half).max(0.0),
                    (self.y2 + half).min(WORLD_HEIGHT),
                )
            }
        }
    }

    pub fn draw(
        &self,
        surface: &mut dyn Surface,
        transform: &CoordinateTransform,
        style: &CaliperStyle,
        highlight: Option<HitKind>,
        calibration: f32,
    ) {
        let stroke = self.behavior.stroke(style.stroke);
        let (top, bottom) = self.leg_extent();
        let px = |x: f32, y: f32| transform.world_to_pixel_pos(egui::pos2(x, y));

        let leg1 = (px(self.x1, top), px(self.x1, bottom));
        let leg2 = (px(self.x2, top), px(self.x2, bottom));
        let bridge = (px(self.x1, self.y2), px(self.x2, self.y2));

        let (s1, s2, sb) = match highlight {
            Some(HitKind::FirstLeg) => (style.active, stroke, stroke),
            Some(HitKind::SecondLeg) => (stroke, style.active, stroke),
            Some(HitKind::Bridge) => (style.active, style.active, style.active),
            None => (stroke, stroke, stroke),
        };
        surface.line(leg1.0, leg1.1, s1);
        surface.line(leg2.0, leg2.1, s2);
        surface.line(bridge.0, bridge.1, sb);

        for label in self.labels(calibration, style.mode) {
            surface.text(
                transform.world_to_pixel_pos(label.world),
                &label.text,
                stroke.color,
            );
        }
    }
}

/// Pens and label options for drawing calipers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaliperStyle {
    pub stroke: egui::Stroke,
    /// Pen for the part under the pointer.
    pub active: egui::Stroke,
    pub mode: MeasurementMode,
}

impl Default for CaliperStyle {
    fn default() -> Self {
        Self {
            stroke: egui::Stroke::new(1.0, egui::Color32::from_rgb(255, 0, 0)),
            active: egui::Stroke::new(1.0, egui::Color32::from_rgb(0, 120, 255)),
            mode: MeasurementMode::Time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(x1: f32, x2: f32, y2: f32) -> Caliper {
        let mut c = Caliper::new(CaliperShape::Full);
        c.handle(CaliperInput::PrimaryDown(egui::pos2(x1, y2)));
        c.handle(CaliperInput::PrimaryDown(egui::pos2(x2, y2)));
        assert_eq!(c.state(), CaliperState::Fixed);
        c
    }

    #[derive(Default)]
    struct Recorder {
        lines: Vec<(egui::Pos2, egui::Pos2, egui::Stroke)>,
        texts: Vec<String>,
    }

    impl Surface for Recorder {
        fn line(&mut self, from: egui::Pos2, to: egui::Pos2, stroke: egui::Stroke) {
            self.lines.push((from, to, stroke));
        }

        fn text(&mut self, _at: egui::Pos2, text: &str, _color: egui::Color32) {
            self.texts.push(text.to_string());
        }
    }

    // ========================================================================
    // State machine
    // ========================================================================

    #[test]
    fn test_placement_sequence() {
        let mut c = Caliper::new(CaliperShape::Full);

        c.handle(CaliperInput::Moved(egui::pos2(100.0, 300.0)));
        assert_eq!((c.x1, c.x2, c.y2), (100.0, 100.0, 300.0));

        assert_eq!(
            c.handle(CaliperInput::PrimaryDown(egui::pos2(100.0, 300.0))),
            CaliperOutcome::Continue
        );
        assert_eq!(c.state(), CaliperState::PlacingSecondLeg);

        c.handle(CaliperInput::Moved(egui::pos2(250.0, 320.0)));
        assert_eq!((c.x1, c.x2, c.y2), (100.0, 250.0, 320.0));

        assert_eq!(
            c.handle(CaliperInput::PrimaryDown(egui::pos2(260.0, 320.0))),
            CaliperOutcome::Completed
        );
        assert_eq!(c.state(), CaliperState::Fixed);
        assert_eq!(c.x2, 260.0);
    }

    #[test]
    fn test_fixed_caliper_ignores_pointer() {
        let mut c = fixed(100.0, 200.0, 50.0);
        c.handle(CaliperInput::Moved(egui::pos2(500.0, 500.0)));
        c.handle(CaliperInput::PrimaryDown(egui::pos2(500.0, 500.0)));

        assert_eq!((c.x1, c.x2, c.y2), (100.0, 200.0, 50.0));
        assert_eq!(c.state(), CaliperState::Fixed);
    }

    #[test]
    fn test_secondary_cancels_in_any_state() {
        let mut c = Caliper::new(CaliperShape::Full);
        assert_eq!(c.handle(CaliperInput::SecondaryDown), CaliperOutcome::Cancelled);

        let mut c = fixed(1.0, 2.0, 3.0);
        c.grab(HitKind::Bridge, egui::pos2(1.5, 3.0));
        assert_eq!(c.handle(CaliperInput::SecondaryDown), CaliperOutcome::Cancelled);
    }

    #[test]
    fn test_grab_first_leg_swaps_legs() {
        let mut c = fixed(100.0, 200.0, 50.0);
        c.grab(HitKind::FirstLeg, egui::pos2(101.0, 400.0));

        assert_eq!((c.x1, c.x2), (200.0, 100.0));
        assert_eq!(c.state(), CaliperState::PlacingSecondLeg);

        c.handle(CaliperInput::Moved(egui::pos2(80.0, 60.0)));
        assert_eq!((c.x1, c.x2), (200.0, 80.0));
    }

    #[test]
    fn test_grab_second_leg_moves_it() {
        let mut c = fixed(100.0, 200.0, 50.0);
        c.grab(HitKind::SecondLeg, egui::pos2(199.0, 400.0));
        c.handle(CaliperInput::Moved(egui::pos2(300.0, 60.0)));

        assert_eq!((c.x1, c.x2), (100.0, 300.0));
        assert_eq!(
            c.handle(CaliperInput::PrimaryDown(egui::pos2(300.0, 60.0))),
            CaliperOutcome::Completed
        );
    }

    #[test]
    fn test_bridge_drag_preserves_separation() {
        let mut c = fixed(100.0, 200.0, 50.0);
        c.grab(HitKind::Bridge, egui::pos2(130.0, 52.0));
        assert_eq!(c.state(), CaliperState::Dragging);

        c.handle(CaliperInput::Moved(egui::pos2(430.0, 700.0)));
        assert_eq!((c.x1, c.x2, c.y2), (400.0, 500.0, 700.0));

        assert_eq!(
            c.handle(CaliperInput::PrimaryDown(egui::pos2(430.0, 700.0))),
            CaliperOutcome::Released
        );
        assert_eq!(c.state(), CaliperState::Fixed);
    }

    // ========================================================================
    // Hit testing
    // ========================================================================

    #[test]
    fn test_hit_priority_first_leg_then_second_then_bridge() {
        let c = fixed(100.0, 115.0, 500.0);

        // within range of both legs and on the bridge
        assert_eq!(c.hit(egui::pos2(107.0, 500.0)), Some(HitKind::FirstLeg));
        assert_eq!(c.hit(egui::pos2(112.0, 500.0)), Some(HitKind::SecondLeg));

        let wide = fixed(100.0, 300.0, 500.0);
        assert_eq!(wide.hit(egui::pos2(200.0, 505.0)), Some(HitKind::Bridge));
        assert_eq!(wide.hit(egui::pos2(200.0, 520.0)), None);
        assert_eq!(wide.hit(egui::pos2(320.0, 500.0)), None);
    }

    #[test]
    fn test_hit_degenerate_coincident_legs() {
        let c = fixed(200.0, 200.0, 500.0);
        assert_eq!(c.hit(egui::pos2(200.0, 500.0)), Some(HitKind::FirstLeg));
        assert_eq!(c.hit(egui::pos2(205.0, 505.0)), Some(HitKind::FirstLeg));

        let c = fixed(200.0, 201.0, 500.0);
        assert_eq!(c.hit(egui::pos2(201.0, 500.0)), Some(HitKind::FirstLeg));

        let c = fixed(201.0, 200.0, 500.0);
        assert_eq!(c.hit(egui::pos2(200.0, 500.0)), Some(HitKind::FirstLeg));
    }

    #[test]
    fn test_hit_range_is_exclusive() {
        let c = fixed(100.0, 300.0, 500.0);
        assert_eq!(c.hit(egui::pos2(110.0, 0.0)), None);
        assert_eq!(c.hit(egui::pos2(109.0, 0.0)), Some(HitKind::FirstLeg));
    }

    #[test]
    fn test_bridge_hit_with_reversed_legs() {
        let c = fixed(300.0, 100.0, 500.0);
        assert_eq!(c.hit(egui::pos2(250.0, 495.0)), Some(HitKind::Bridge));
    }

    // ========================================================================
    // Measurement
    // ========================================================================

    #[test]
    fn test_measurement_uncalibrated() {
        let c = fixed(300.0, 100.0, 0.0);
        let m = c.measurement(0.0).unwrap();

        assert_eq!(m.raw, 200.0);
        assert!(m.millis.is_none());
        assert!(m.rate_bpm().is_none());
    }

    #[test]
    fn test_rate_is_computed_from_milliseconds() {
        let c = fixed(100.0, 300.0, 0.0);
        // 200 units * 4 ms/unit = 800 ms -> 75 bpm
        let m = c.measurement(4.0).unwrap();

        assert_eq!(m.millis, Some(800.0));
        assert_eq!(m.rate_bpm(), Some(75.0));
    }

    #[test]
    fn test_no_measurement_while_placing_first_leg() {
        let mut c = Caliper::new(CaliperShape::Full);
        c.handle(CaliperInput::Moved(egui::pos2(5.0, 5.0)));
        assert!(c.measurement(1.0).is_none());
        assert!(c.labels(1.0, MeasurementMode::Both).is_empty());
    }

    #[test]
    fn test_labels_follow_mode_and_calibration() {
        let c = fixed(100.0, 300.0, 500.0);

        let texts = |cal, mode| -> Vec<String> {
            c.labels(cal, mode).into_iter().map(|l| l.text).collect()
        };

        assert_eq!(texts(0.0, MeasurementMode::Time), vec!["200 units"]);
        // rate needs calibration
        assert!(texts(0.0, MeasurementMode::Rate).is_empty());
        assert_eq!(texts(4.0, MeasurementMode::Rate), vec!["75 bpm"]);
        assert_eq!(texts(4.0, MeasurementMode::Both), vec!["75 bpm", "800 ms"]);
        assert!(texts(4.0, MeasurementMode::None).is_empty());

        let labels = c.labels(4.0, MeasurementMode::Both);
        assert_eq!(labels[0].world, egui::pos2(200.0, 540.0));
        assert_eq!(labels[1].world, egui::pos2(200.0, 460.0));
    }

    #[test]
    fn test_zero_width_calibrated_caliper_has_no_rate() {
        let c = fixed(100.0, 100.0, 500.0);
        let texts: Vec<String> = c
            .labels(4.0, MeasurementMode::Both)
            .into_iter()
            .map(|l| l.text)
            .collect();
        assert_eq!(texts, vec!["0 ms"]);
    }

    #[test]
    fn test_calibration_behavior() {
        let mut c = Caliper::calibration();
        c.handle(CaliperInput::PrimaryDown(egui::pos2(100.0, 10.0)));
        c.handle(CaliperInput::PrimaryDown(egui::pos2(350.0, 10.0)));
        let m = c.measurement(3.0).unwrap();

        assert!(c.behavior().is_calibration());
        assert_eq!(
            c.behavior().on_completion(&m),
            Completion::RequestCalibration { measurement: 250.0 }
        );
        assert!(c.labels(3.0, MeasurementMode::Both).is_empty());
        assert_eq!(MEASURE.on_completion(&m), Completion::Keep);
    }

    // ========================================================================
    // Drawing
    // ========================================================================

    #[test]
    fn test_truncated_legs_stay_near_bridge() {
        let mut c = Caliper::new(CaliperShape::Truncated);
        c.handle(CaliperInput::PrimaryDown(egui::pos2(100.0, 500.0)));
        c.handle(CaliperInput::PrimaryDown(egui::pos2(200.0, 500.0)));
        assert_eq!(c.leg_extent(), (450.0, 550.0));

        c.y2 = 10.0;
        assert_eq!(c.leg_extent(), (0.0, 60.0));

        // hit testing is unchanged by the shape
        assert_eq!(c.hit(egui::pos2(100.0, 900.0)), Some(HitKind::FirstLeg));
    }

    #[test]
    fn test_draw_emits_legs_bridge_and_labels() {
        let t = CoordinateTransform::fit(1000, 1000, 1000.0, 1000.0).unwrap();
        let c = fixed(100.0, 300.0, 500.0);
        let style = CaliperStyle::default();
        let mut rec = Recorder::default();

        c.draw(&mut rec, &t, &style, Some(HitKind::SecondLeg), 0.0);

        assert_eq!(rec.lines.len(), 3);
        assert_eq!(rec.lines[0].0, egui::pos2(100.0, 0.0));
        assert_eq!(rec.lines[0].1, egui::pos2(100.0, 1000.0));
        assert_eq!(rec.lines[0].2, style.stroke);
        assert_eq!(rec.lines[1].2, style.active);
        assert_eq!(rec.lines[2].0, egui::pos2(100.0, 500.0));
        assert_eq!(rec.texts, vec!["200 units"]);
    }
}
