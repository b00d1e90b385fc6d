//! Source image -> crop -> rotate -> display image.
//!
//! The crop frame is always kept in unrotated source pixels, so the display
//! image can be rebuilt from `(source, crop, rotation)` alone.

use image::{DynamicImage, GenericImageView};
use std::path::{Path, PathBuf};

use crate::annotation::CropFrame;
use crate::error::{Result, ViewerError};

// ── Rotation ────────────────────────────────────────────────────────────────

/// Quarter turns clockwise, normalised to `0..4`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rotation(u8);

impl Rotation {
    pub const NONE: Rotation = Rotation(0);

    pub fn from_count(count: i32) -> Self {
        Self(count.rem_euclid(4) as u8)
    }

    pub fn count(self) -> i32 {
        i32::from(self.0)
    }

    /// One quarter turn clockwise.
    pub fn right(self) -> Self {
        Self::from_count(self.count() + 1)
    }

    /// One quarter turn counter-clockwise.
    pub fn left(self) -> Self {
        Self::from_count(self.count() - 1)
    }

    pub fn inverse(self) -> Self {
        Self::from_count(-self.count())
    }

    /// Odd rotations swap width and height.
    pub fn swaps_axes(self) -> bool {
        self.0 % 2 == 1
    }

    pub fn apply(self, image: &DynamicImage) -> DynamicImage {
        match self.0 {
            1 => image.rotate90(),
            2 => image.rotate180(),
            3 => image.rotate270(),
            _ => image.clone(),
        }
    }
}

/// Map a frame drawn on an image that is displayed with `rotation` back to
/// the unrotated image. `width` x `height` is the size of the image the
/// frame was drawn on (i.e. already rotated).
///
/// Each branch undoes exactly one of the raster rotations in
/// [`Rotation::apply`]; do not collapse them into a formula.
pub fn rotate_frame(frame: CropFrame, rotation: Rotation, width: i64, height: i64) -> CropFrame {
    let CropFrame { x1, y1, x2, y2 } = frame;
    let (w, h) = (width, height);
    match rotation.0 {
        1 => CropFrame::new(y1, w - x2, y2, w - x1),
        2 => CropFrame::new(w - x2, h - y2, w - x1, h - y1),
        3 => CropFrame::new(h - y2, x1, h - y1, x2),
        _ => frame,
    }
}

// ── Pipeline ────────────────────────────────────────────────────────────────

pub struct ImagePipeline {
    path: PathBuf,
    source: DynamicImage,
    rotation: Rotation,
    crop: CropFrame,
    display: DynamicImage,
}

impl ImagePipeline {
    pub fn open(path: &Path) -> Result<Self> {
        let source = image::open(path).map_err(|source| ViewerError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!(
            "Opened {} ({}x{})",
            path.display(),
            source.width(),
            source.height()
        );
        Ok(Self::from_image(path.to_path_buf(), source))
    }

    pub fn from_image(path: PathBuf, source: DynamicImage) -> Self {
        let display = source.clone();
        Self {
            path,
            source,
            rotation: Rotation::NONE,
            crop: CropFrame::NONE,
            display,
        }
    }

    /// Re-apply a stored crop and rotation. The crop is in unrotated
    /// coordinates so it goes first. A crop that misses the image is
    /// dropped.
    pub fn restore(&mut self, crop: CropFrame, rotation: Rotation) {
        self.rotation = rotation;
        self.crop = if crop.is_none() {
            CropFrame::NONE
        } else {
            let (w, h) = self.source.dimensions();
            let clamped = crop.clamped(w, h);
            if clamped.width() > 0 && clamped.height() > 0 {
                clamped
            } else {
                log::warn!("Ignoring stored crop {crop:?} outside {w}x{h} image");
                CropFrame::NONE
            }
        };
        self.rebuild();
    }

    pub fn rotate_right(&mut self) {
        self.display = self.display.rotate90();
        self.rotation = self.rotation.right();
    }

    pub fn rotate_left(&mut self) {
        self.display = self.display.rotate270();
        self.rotation = self.rotation.left();
    }

    /// Crop to a rectangle given in display-image pixels. Returns the frame
    /// in source coordinates.
    pub fn crop_display_pixels(&mut self, px: [i64; 4]) -> Result<CropFrame> {
        let (src_w, src_h) = self.source.dimensions();
        let (w, h) = if self.rotation.swaps_axes() {
            (src_h, src_w)
        } else {
            (src_w, src_h)
        };

        let frame = rotate_frame(
            CropFrame::from(px),
            self.rotation,
            i64::from(w),
            i64::from(h),
        )
        .clamped(src_w, src_h);
        if frame.width() <= 0 || frame.height() <= 0 {
            return Err(ViewerError::EmptyCrop);
        }

        self.crop = frame;
        self.rebuild();
        log::info!("Cropped {} to {frame:?}", self.path.display());
        Ok(frame)
    }

    pub fn uncrop(&mut self) {
        self.crop = CropFrame::NONE;
        self.rebuild();
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Follow the file after it was renamed on disk.
    pub fn set_path(&mut self, path: PathBuf) {
        self.path = path;
    }

    pub fn display(&self) -> &DynamicImage {
        &self.display
    }

    pub fn display_size(&self) -> (u32, u32) {
        self.display.dimensions()
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn crop(&self) -> CropFrame {
        self.crop
    }

    pub fn is_cropped(&self) -> bool {
        !self.crop.is_none()
    }

    fn rebuild(&mut self) {
        let cropped = if self.crop.is_none() {
            self.source.clone()
        } else {
            let CropFrame { x1, y1, .. } = self.crop;
            self.source.crop_imm(
                x1 as u32,
                y1 as u32,
                self.crop.width() as u32,
                self.crop.height() as u32,
            )
        };
        self.display = self.rotation.apply(&cropped);
    }
}
