//! Everything that belongs to "the image being looked at": its pipeline,
//! the canvas overlay, the playlist it came from and the annotation record.
//!
//! Every user-level operation goes through [`Session`]. Failures are
//! written to the status line and logged; the session is left as it was.

use eframe::egui;
use image::GenericImageView;
use std::path::{Path, PathBuf};

use crate::annotation::{self, AnnotationRecord, CropFrame};
use crate::canvas::{Canvas, CanvasReply, OverlayStyle, PointerEvent};
use crate::error::{Result, ViewerError};
use crate::pipeline::{ImagePipeline, Rotation};
use crate::playlist::{self, Playlist};
use crate::surface::RasterSurface;
use crate::transform::CoordinateTransform;

/// The three status bar fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusLine {
    pub message: String,
    pub file: String,
    pub calibration: String,
}

#[derive(Default)]
pub struct Session {
    pipeline: Option<ImagePipeline>,
    canvas: Canvas,
    playlist: Playlist,
    /// The record as it was read, to decide whether closing must save.
    loaded: AnnotationRecord,
    note: String,
    status: StatusLine,
}

impl Session {
    pub fn new() -> Self {
        let mut session = Self::default();
        session.update_calibration_status();
        session
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn pipeline(&self) -> Option<&ImagePipeline> {
        self.pipeline.as_ref()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn note_mut(&mut self) -> &mut String {
        &mut self.note
    }

    pub fn has_image(&self) -> bool {
        self.pipeline.is_some()
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.status.message = message.into();
    }

    /// Put an error on the status line and in the log.
    pub fn report(&mut self, error: &ViewerError) {
        log::warn!("{error}");
        self.status.message = error.to_string();
    }

    pub fn set_canvas_size(&mut self, size: egui::Vec2) {
        self.canvas.set_size(size);
    }

    // ── Opening and closing ─────────────────────────────────────────────

    /// Open an image (with its directory as the playlist) or a `.plst`.
    pub fn open_path(&mut self, path: &Path) -> Result<()> {
        if playlist::is_playlist_path(path) {
            let list = Playlist::from_file(path)?;
            return self.set_playlist(list);
        }

        self.load_and_display(path)?;
        self.playlist = match Playlist::from_directory(path) {
            Ok(list) => list,
            Err(e) => {
                self.report(&e);
                Playlist::default()
            }
        };
        Ok(())
    }

    /// Replace the playlist and show its current entry. If that entry
    /// cannot be shown the old playlist stays.
    pub fn set_playlist(&mut self, list: Playlist) -> Result<()> {
        let first = list
            .current()
            .map(Path::to_path_buf)
            .ok_or(ViewerError::EmptyPlaylist)?;
        self.load_and_display(&first)?;
        self.playlist = list;
        Ok(())
    }

    /// Swap in an edited playlist, keeping the shown image when it is
    /// still listed.
    pub fn replace_playlist(&mut self, mut list: Playlist) {
        if let Some(shown) = self.pipeline.as_ref().map(|p| p.path().to_path_buf()) {
            if let Some(i) = list.paths().iter().position(|p| *p == shown) {
                list.jump_to(i);
            }
        }
        self.playlist = list;
    }

    /// Decode `path` and make it the current image. If decoding fails the
    /// current image stays up.
    pub fn load_and_display(&mut self, path: &Path) -> Result<()> {
        let mut pipeline = match ImagePipeline::open(path) {
            Ok(p) => p,
            Err(e) => {
                self.report(&e);
                return Err(e);
            }
        };

        let saved = self.release_image();

        let record = annotation::load_record(path).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable annotation for {}: {e}", path.display());
            AnnotationRecord::default()
        });
        pipeline.restore(record.crop_frame, Rotation::from_count(record.rotation));

        let (w, h) = pipeline.display_size();
        self.canvas.set_display_size(w, h);
        self.canvas.set_calibration(record.calibration);
        self.note = record.note.clone();
        self.loaded = record;
        self.pipeline = Some(pipeline);

        self.status.file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.status.message.clear();
        if let Err(e) = saved {
            self.report(&e);
        }
        self.update_calibration_status();
        Ok(())
    }

    /// The record as it would be written right now.
    pub fn current_record(&self) -> Option<AnnotationRecord> {
        let pipeline = self.pipeline.as_ref()?;
        Some(AnnotationRecord {
            note: self.note.clone(),
            calibration: self.canvas.calibration(),
            rotation: pipeline.rotation().count(),
            crop_frame: pipeline.crop(),
        })
    }

    pub fn is_dirty(&self) -> bool {
        self.current_record()
            .is_some_and(|record| record != self.loaded)
    }

    /// Write the sidecar if the record changed since it was loaded.
    /// Returns whether anything was written.
    pub fn save_annotation(&mut self) -> Result<bool> {
        let (Some(pipeline), Some(record)) = (self.pipeline.as_ref(), self.current_record())
        else {
            return Ok(false);
        };
        if record == self.loaded {
            return Ok(false);
        }
        annotation::save_record(pipeline.path(), &record)?;
        self.loaded = record;
        Ok(true)
    }

    /// Persist and drop the current image. A failed save is reported, the
    /// image is closed regardless.
    pub fn close_image(&mut self) {
        if let Err(e) = self.release_image() {
            self.report(&e);
        }
    }

    fn release_image(&mut self) -> Result<()> {
        let Some(path) = self.pipeline.as_ref().map(|p| p.path().to_path_buf()) else {
            return Ok(());
        };
        let saved = self.save_annotation().map(|_| ());
        self.pipeline = None;
        log::info!("Closed {}", path.display());
        self.loaded = AnnotationRecord::default();
        self.note.clear();
        self.canvas.reset_foreground();
        self.canvas.clear_display();
        self.status.file.clear();
        self.update_calibration_status();
        saved
    }

    // ── Image operations ────────────────────────────────────────────────

    pub fn rotate_right(&mut self) {
        if let Some(p) = self.pipeline.as_mut() {
            p.rotate_right();
            self.display_changed();
        }
    }

    pub fn rotate_left(&mut self) {
        if let Some(p) = self.pipeline.as_mut() {
            p.rotate_left();
            self.display_changed();
        }
    }

    /// Toggle cropping: start a rubberband selection, or uncrop.
    pub fn choose_crop_frame(&mut self) {
        let Some(p) = self.pipeline.as_mut() else {
            return;
        };
        if p.is_cropped() {
            p.uncrop();
            self.display_changed();
        } else {
            self.canvas.start_crop_selection();
            self.set_message("Drag to select the area to keep");
        }
    }

    /// Crop to a rectangle in canvas pixels. Returns the stored frame
    /// (unrotated source pixels).
    pub fn crop_to_canvas_rect(&mut self, rect: egui::Rect) -> Result<CropFrame> {
        let transform = self.canvas.transform().copied().ok_or(ViewerError::EmptyCrop)?;
        let p = self.pipeline.as_mut().ok_or(ViewerError::EmptyCrop)?;
        let frame = p.crop_display_pixels(transform.canvas_to_display_pixels(rect))?;
        self.display_changed();
        Ok(frame)
    }

    /// The display image changed shape: world coordinates no longer line up.
    fn display_changed(&mut self) {
        self.canvas.reset_foreground();
        if let Some(p) = self.pipeline.as_ref() {
            let (w, h) = p.display_size();
            self.canvas.set_display_size(w, h);
        }
        self.update_calibration_status();
    }

    // ── Pointer and calibration ─────────────────────────────────────────

    /// Feed a pointer event to the canvas and act on what it asks for.
    /// The reply is handed back so the host can open menus or prompts.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> CanvasReply {
        let reply = self.canvas.handle_pointer(event);
        match reply {
            CanvasReply::CropSelected(rect) => {
                if let Err(e) = self.crop_to_canvas_rect(rect) {
                    self.report(&e);
                }
            }
            CanvasReply::CalibrationRequested(_) => {
                self.set_message("Enter the duration of the calibration interval");
            }
            CanvasReply::Notice(text) => self.set_message(text),
            CanvasReply::None | CanvasReply::ContextMenu(_) => {}
        }
        reply
    }

    pub fn start_calibration(&mut self) {
        if self.has_image() {
            self.canvas.start_calibration();
            self.set_message("Place the calibration caliper over a known interval");
        }
    }

    pub fn submit_calibration(&mut self, input: &str) -> Result<f32> {
        let calibration = self.canvas.submit_calibration(input)?;
        self.update_calibration_status();
        self.set_message("Calibrated");
        Ok(calibration)
    }

    pub fn cancel_calibration(&mut self) {
        self.canvas.cancel_calibration();
        self.set_message("Calibration cancelled");
    }

    fn update_calibration_status(&mut self) {
        self.status.calibration = if self.canvas.is_calibrated() {
            "Calibrated".into()
        } else {
            "Not calibrated".into()
        };
    }

    // ── Playlist ────────────────────────────────────────────────────────

    pub fn next_image(&mut self) -> Result<()> {
        let index = self.playlist.next_index().ok_or(ViewerError::EmptyPlaylist)?;
        self.show_entry(index)
    }

    pub fn previous_image(&mut self) -> Result<()> {
        let index = self
            .playlist
            .previous_index()
            .ok_or(ViewerError::EmptyPlaylist)?;
        self.show_entry(index)
    }

    pub fn jump_to(&mut self, index: usize) -> Result<()> {
        self.show_entry(index)
    }

    /// Show playlist entry `index`; the cursor only moves once it is up.
    fn show_entry(&mut self, index: usize) -> Result<()> {
        let path = self
            .playlist
            .paths()
            .get(index)
            .cloned()
            .ok_or(ViewerError::EmptyPlaylist)?;
        self.load_and_display(&path)?;
        self.playlist.jump_to(index);
        Ok(())
    }

    pub fn save_playlist(&mut self, path: &Path) -> Result<PathBuf> {
        let written = self.playlist.save(path)?;
        self.set_message(format!("Saved playlist {}", written.display()));
        Ok(written)
    }

    /// Rename a playlist entry on disk. The annotation sidecar moves with
    /// the image; an existing sidecar under the new name blocks the rename.
    pub fn rename_entry(&mut self, index: usize, new_name: &str) -> Result<PathBuf> {
        let old = self
            .playlist
            .paths()
            .get(index)
            .cloned()
            .ok_or(ViewerError::EmptyPlaylist)?;
        let target = self.playlist.rename_target(index, new_name)?;
        if target == old {
            return Ok(target);
        }
        let (old_sidecar, new_sidecar) = (
            annotation::sidecar_path(&old),
            annotation::sidecar_path(&target),
        );
        if new_sidecar.exists() {
            return Err(ViewerError::RenameCollision(new_sidecar));
        }

        let showing = self.pipeline.as_ref().is_some_and(|p| p.path() == old);
        if showing {
            self.save_annotation()?;
        }
        let has_sidecar = old_sidecar.exists();

        let new = self.playlist.rename(index, new_name)?;
        if showing {
            if let Some(p) = self.pipeline.as_mut() {
                p.set_path(new.clone());
            }
            self.status.file = new
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        if has_sidecar {
            std::fs::rename(&old_sidecar, &new_sidecar).map_err(|source| {
                ViewerError::Persistence {
                    path: new_sidecar.clone(),
                    source,
                }
            })?;
        }
        self.set_message("Filename changed");
        Ok(new)
    }

    // ── Export ──────────────────────────────────────────────────────────

    /// Render the display image with calipers and doodle at native size and
    /// write it. The format follows the extension (PNG when there is none).
    pub fn export_annotated(&mut self, path: &Path, style: &OverlayStyle) -> Result<PathBuf> {
        let pipeline = self.pipeline.as_ref().ok_or(ViewerError::EmptyPlaylist)?;
        let path = if path.extension().is_some() {
            path.to_path_buf()
        } else {
            path.with_extension("png")
        };

        let (w, h) = pipeline.display().dimensions();
        let mut img = pipeline.display().to_rgba8();
        if let Some(transform) = CoordinateTransform::native(w, h) {
            let mut surface = RasterSurface::new(&mut img);
            self.canvas.draw_overlay(&mut surface, &transform, style);
        }
        img.save(&path).map_err(|source| ViewerError::Export {
            path: path.clone(),
            source,
        })?;

        log::info!("Exported {}", path.display());
        self.set_message(format!("Saved {}", path.display()));
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caliper::CaliperState;
    use image::{Rgb, RgbImage};
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(w, h, Rgb([255, 255, 255]))
            .save(&path)
            .unwrap();
        path
    }

    /// A session showing an 800x600 image on a 1000x1000 canvas.
    fn session_with_image() -> (TempDir, PathBuf, Session) {
        let dir = tempdir().unwrap();
        let path = write_png(dir.path(), "trace.png", 800, 600);
        let mut session = Session::new();
        session.set_canvas_size(egui::vec2(1000.0, 1000.0));
        session.open_path(&path).unwrap();
        (dir, path, session)
    }

    fn click(s: &mut Session, x: f32, y: f32) -> CanvasReply {
        s.handle_pointer(PointerEvent::Moved(egui::pos2(x, y)));
        s.handle_pointer(PointerEvent::PrimaryDown(egui::pos2(x, y)))
    }

    fn drag(s: &mut Session, from: egui::Pos2, to: egui::Pos2) -> CanvasReply {
        s.handle_pointer(PointerEvent::PrimaryDown(from));
        s.handle_pointer(PointerEvent::Moved(to));
        s.handle_pointer(PointerEvent::PrimaryUp(to))
    }

    #[test]
    fn test_open_sets_status_and_playlist() {
        let (dir, path, session) = session_with_image();

        assert!(session.has_image());
        assert_eq!(session.status().file, "trace.png");
        assert_eq!(session.status().calibration, "Not calibrated");
        assert_eq!(session.playlist().paths(), &[dir.path().join("trace.png")]);
        assert_eq!(session.pipeline().unwrap().path(), path);
    }

    #[test]
    fn test_rotate_then_crop_whole_image() {
        let (_dir, _path, mut s) = session_with_image();
        s.canvas_mut().set_calibration(2.0);
        s.canvas_mut().new_caliper();
        click(&mut s, 300.0, 500.0);
        click(&mut s, 400.0, 500.0);
        s.canvas_mut().toggle_doodle();
        drag(&mut s, egui::pos2(10.0, 10.0), egui::pos2(50.0, 50.0));
        s.canvas_mut().toggle_doodle();
        assert_eq!(s.canvas().calipers().len(), 1);

        s.rotate_right();

        assert!(s.canvas().calipers().is_empty());
        assert!(s.canvas().doodle().is_empty());
        assert!(!s.canvas().is_calibrated());
        assert_eq!(s.pipeline().unwrap().display_size(), (600, 800));

        // 600x800 fits a 1000x1000 canvas at 1.25, centred at x = 125
        let t = *s.canvas().transform().unwrap();
        assert_eq!(t.image_rect().min, egui::pos2(125.0, 0.0));
        let rect = egui::Rect::from_min_max(egui::pos2(125.0, 0.0), egui::pos2(875.0, 1000.0));
        assert_eq!(t.canvas_to_display_pixels(rect), [0, 0, 600, 800]);

        s.choose_crop_frame();
        drag(&mut s, rect.min, rect.max);

        let p = s.pipeline().unwrap();
        assert_eq!(p.crop(), CropFrame::new(0, 0, 800, 600));
        assert_eq!(p.rotation(), Rotation::from_count(1));
        assert_eq!(p.display_size(), (600, 800));
    }

    #[test]
    fn test_crop_toggle_uncrops() {
        let (_dir, _path, mut s) = session_with_image();
        let frame = s
            .crop_to_canvas_rect(egui::Rect::from_min_max(
                egui::pos2(0.0, 125.0),
                egui::pos2(500.0, 500.0),
            ))
            .unwrap();
        assert_eq!(frame, CropFrame::new(0, 0, 400, 300));
        assert_eq!(s.pipeline().unwrap().display_size(), (400, 300));

        s.choose_crop_frame();

        assert!(!s.pipeline().unwrap().is_cropped());
        assert_eq!(s.pipeline().unwrap().display_size(), (800, 600));
    }

    #[test]
    fn test_crop_outside_image_reports_status() {
        let (_dir, _path, mut s) = session_with_image();
        s.choose_crop_frame();

        // above the image: the 800x600 image starts at y = 125
        drag(&mut s, egui::pos2(100.0, 0.0), egui::pos2(300.0, 100.0));

        assert!(!s.pipeline().unwrap().is_cropped());
        assert_eq!(s.status().message, ViewerError::EmptyCrop.to_string());
    }

    #[test]
    fn test_unchanged_image_writes_no_sidecar() {
        let (_dir, path, mut s) = session_with_image();
        assert!(!s.is_dirty());

        s.close_image();

        assert!(!annotation::sidecar_path(&path).exists());
        assert!(!s.has_image());
    }

    #[test]
    fn test_changes_are_saved_on_close_and_restored() {
        let (_dir, path, mut s) = session_with_image();
        s.note_mut().push_str("sinus rhythm");
        s.rotate_left();
        s.canvas_mut().set_calibration(0.5);
        assert!(s.is_dirty());

        s.close_image();

        let record = annotation::load_record(&path).unwrap();
        assert_eq!(record.note, "sinus rhythm");
        assert_eq!(record.rotation, 3);
        assert_eq!(record.calibration, 0.5);

        s.load_and_display(&path).unwrap();
        assert_eq!(s.note(), "sinus rhythm");
        assert_eq!(s.pipeline().unwrap().display_size(), (600, 800));
        assert_eq!(s.status().calibration, "Calibrated");
        assert!(!s.is_dirty());
    }

    #[test]
    fn test_stored_crop_and_rotation_are_applied() {
        let dir = tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 800, 600);
        let record = AnnotationRecord {
            rotation: 2,
            crop_frame: CropFrame::new(100, 100, 300, 200),
            ..AnnotationRecord::default()
        };
        annotation::save_record(&path, &record).unwrap();

        let mut s = Session::new();
        s.open_path(&path).unwrap();

        let p = s.pipeline().unwrap();
        assert_eq!(p.display_size(), (200, 100));
        assert_eq!(p.rotation().count(), 2);
    }

    #[test]
    fn test_corrupt_sidecar_opens_with_defaults() {
        let dir = tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 40, 30);
        fs::write(annotation::sidecar_path(&path), "not json").unwrap();

        let mut s = Session::new();
        s.open_path(&path).unwrap();

        assert_eq!(s.pipeline().unwrap().display_size(), (40, 30));
        assert_eq!(s.note(), "");
    }

    #[test]
    fn test_failed_load_keeps_current_image() {
        let (dir, path, mut s) = session_with_image();
        let broken = dir.path().join("broken.png");
        fs::write(&broken, b"not an image").unwrap();
        click(&mut s, 300.0, 500.0);

        let result = s.load_and_display(&broken);

        assert!(matches!(result, Err(ViewerError::ImageLoad { .. })));
        assert_eq!(s.pipeline().unwrap().path(), path);
        assert_eq!(s.canvas().calipers().len(), 1);
        assert!(!s.status().message.is_empty());
    }

    #[test]
    fn test_failed_navigation_keeps_cursor() {
        let dir = tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", 20, 10);
        fs::write(dir.path().join("b.png"), b"garbage").unwrap();
        let mut s = Session::new();
        s.open_path(&a).unwrap();
        assert_eq!(s.playlist().len(), 2);

        assert!(s.next_image().is_err());
        assert_eq!(s.playlist().now_showing(), 0);
        assert_eq!(s.pipeline().unwrap().path(), a);

        assert!(s.previous_image().is_err());
        assert!(s.jump_to(1).is_err());
        assert_eq!(s.playlist().current(), Some(a.as_path()));
    }

    #[test]
    fn test_failed_playlist_switch_keeps_old_playlist() {
        let dir = tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", 20, 10);
        let broken = dir.path().join("broken.png");
        fs::write(&broken, b"garbage").unwrap();
        let mut s = Session::new();
        s.open_path(&a).unwrap();

        let result = s.set_playlist(Playlist::new(vec![broken]));

        assert!(matches!(result, Err(ViewerError::ImageLoad { .. })));
        assert_eq!(s.playlist().paths(), &[a.clone()]);
        assert_eq!(s.pipeline().unwrap().path(), a);
    }

    #[test]
    fn test_unwritable_sidecar_is_reported_on_close() {
        let (_dir, path, mut s) = session_with_image();
        s.note_mut().push_str("lost");
        fs::create_dir(annotation::sidecar_path(&path)).unwrap();

        s.close_image();

        assert!(!s.has_image());
        assert!(s.status().message.contains("Could not save data"));
    }

    #[test]
    fn test_unwritable_sidecar_is_reported_when_switching_images() {
        let (dir, path, mut s) = session_with_image();
        let other = write_png(dir.path(), "other.png", 20, 10);
        s.rotate_right();
        fs::create_dir(annotation::sidecar_path(&path)).unwrap();

        s.load_and_display(&other).unwrap();

        assert_eq!(s.pipeline().unwrap().path(), other);
        assert!(s.status().message.contains("Could not save data"));
    }

    #[test]
    fn test_navigation_wraps_and_saves() {
        let dir = tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", 20, 10);
        let b = write_png(dir.path(), "b.png", 20, 10);
        let c = write_png(dir.path(), "c.png", 20, 10);
        let mut s = Session::new();
        s.open_path(&c).unwrap();
        assert_eq!(s.playlist().now_showing(), 2);
        s.note_mut().push_str("last");

        s.next_image().unwrap();
        assert_eq!(s.pipeline().unwrap().path(), a);
        assert_eq!(annotation::load_record(&c).unwrap().note, "last");

        s.previous_image().unwrap();
        assert_eq!(s.pipeline().unwrap().path(), c);
        assert_eq!(s.note(), "last");

        s.jump_to(1).unwrap();
        assert_eq!(s.pipeline().unwrap().path(), b);
        assert!(s.jump_to(7).is_err());
        assert_eq!(s.pipeline().unwrap().path(), b);
    }

    #[test]
    fn test_open_playlist_file() {
        let dir = tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", 20, 10);
        let b = write_png(dir.path(), "b.png", 20, 10);
        let list = Playlist::new(vec![b.clone(), a.clone()]);
        let plst = list.save(&dir.path().join("review")).unwrap();

        let mut s = Session::new();
        s.open_path(&plst).unwrap();

        assert_eq!(s.pipeline().unwrap().path(), b);
        assert_eq!(s.playlist().len(), 2);
    }

    #[test]
    fn test_open_unlisted_extension_falls_back_to_empty_playlist() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.gif");
        RgbImage::new(8, 8).save(&path).unwrap();

        let mut s = Session::new();
        s.open_path(&path).unwrap();

        assert!(s.has_image());
        assert!(s.playlist().is_empty());
        assert!(s.status().message.contains("not in the playlist"));
    }

    #[test]
    fn test_calibration_through_session() {
        let (_dir, _path, mut s) = session_with_image();
        s.start_calibration();
        click(&mut s, 100.0, 500.0);
        let reply = click(&mut s, 600.0, 500.0);
        let CanvasReply::CalibrationRequested(units) = reply else {
            panic!("expected a calibration request, got {reply:?}");
        };

        assert!(s.submit_calibration("zero").is_err());
        let calibration = s.submit_calibration("1000").unwrap();

        assert_eq!(calibration, 1000.0 / units);
        assert_eq!(s.status().calibration, "Calibrated");
        assert!(s.canvas().calipers().is_empty());
    }

    #[test]
    fn test_rename_current_image_moves_sidecar() {
        let (dir, path, mut s) = session_with_image();
        s.note_mut().push_str("keep me");

        let new = s.rename_entry(0, "renamed.png").unwrap();

        assert_eq!(new, dir.path().join("renamed.png"));
        assert!(!path.exists());
        assert_eq!(s.pipeline().unwrap().path(), new);
        assert_eq!(s.status().file, "renamed.png");
        assert_eq!(annotation::load_record(&new).unwrap().note, "keep me");
        assert!(!annotation::sidecar_path(&path).exists());
    }

    #[test]
    fn test_rename_collision_leaves_files() {
        let dir = tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", 20, 10);
        let b = write_png(dir.path(), "b.png", 20, 10);
        let mut s = Session::new();
        s.open_path(&a).unwrap();

        let result = s.rename_entry(0, "b.png");

        assert!(matches!(result, Err(ViewerError::RenameCollision(_))));
        assert!(a.exists() && b.exists());
        assert_eq!(s.pipeline().unwrap().path(), a);
    }

    #[test]
    fn test_rename_outside_directory_is_rejected() {
        let (dir, path, mut s) = session_with_image();
        let studies = dir.path().join("studies");
        fs::create_dir(&studies).unwrap();
        let inner = write_png(&studies, "a.png", 20, 10);
        s.open_path(&inner).unwrap();

        let result = s.rename_entry(0, "../moved.png");

        assert!(matches!(result, Err(ViewerError::InvalidFileName(_))));
        assert!(inner.exists());
        assert!(!dir.path().join("moved.png").exists());
        assert!(path.exists());
        assert_eq!(s.pipeline().unwrap().path(), inner);
    }

    #[test]
    fn test_rename_onto_stale_sidecar_is_rejected() {
        let (dir, path, mut s) = session_with_image();
        s.note_mut().push_str("current");
        let stale = dir.path().join("renamed.png");
        annotation::save_record(
            &stale,
            &AnnotationRecord {
                note: "stale".into(),
                ..AnnotationRecord::default()
            },
        )
        .unwrap();

        let result = s.rename_entry(0, "renamed.png");

        assert!(matches!(result, Err(ViewerError::RenameCollision(_))));
        assert!(path.exists());
        assert!(!stale.exists());
        assert_eq!(s.pipeline().unwrap().path(), path);
        assert_eq!(annotation::load_record(&stale).unwrap().note, "stale");
    }

    #[test]
    fn test_export_burns_in_calipers() {
        let dir = tempdir().unwrap();
        let path = write_png(dir.path(), "trace.png", 800, 600);
        let mut s = Session::new();
        s.set_canvas_size(egui::vec2(800.0, 600.0));
        s.open_path(&path).unwrap();
        s.canvas_mut().new_caliper();
        click(&mut s, 100.0, 300.0);
        click(&mut s, 400.0, 300.0);
        assert_eq!(s.canvas().calipers()[0].state(), CaliperState::Fixed);

        let out = s
            .export_annotated(&dir.path().join("out"), &OverlayStyle::default())
            .unwrap();

        assert_eq!(out, dir.path().join("out.png"));
        let img = image::open(&out).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (800, 600));
        assert_eq!(img.get_pixel(100, 50).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(250, 50).0, [255, 255, 255, 255]);
        // "500 units" sits 40 world units above the bridge, centred at x = 250
        let label_ink = (215..285)
            .flat_map(|x| (262..292).map(move |y| (x, y)))
            .filter(|&(x, y)| {
                let [r, g, _, _] = img.get_pixel(x, y).0;
                r == 255 && g < 128
            })
            .count();
        assert!(label_ink > 10, "only {label_ink} label pixels");
    }

    #[test]
    fn test_no_image_operations_are_noops() {
        let mut s = Session::new();
        s.rotate_right();
        s.choose_crop_frame();
        s.start_calibration();
        s.close_image();

        assert!(!s.has_image());
        assert!(matches!(s.next_image(), Err(ViewerError::EmptyPlaylist)));
        assert_eq!(
            s.handle_pointer(PointerEvent::PrimaryDown(egui::pos2(1.0, 1.0))),
            CanvasReply::None
        );
    }
}
