//! Per-image annotation record and its sidecar file.
//!
//! The record sits next to the image as a hidden file, `.<stem>.eepee`,
//! holding pretty-printed JSON. Every field has a default so that records
//! written by older versions (or edited by hand) still load.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, ViewerError};

pub const SIDECAR_EXTENSION: &str = "eepee";

// ── Crop frame ──────────────────────────────────────────────────────────────

/// Rectangle `(x1, y1, x2, y2)` in unrotated source-image pixels.
/// All zeros means "uncropped".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i64; 4]", into = "[i64; 4]")]
pub struct CropFrame {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

impl CropFrame {
    pub const NONE: CropFrame = CropFrame {
        x1: 0,
        y1: 0,
        x2: 0,
        y2: 0,
    };

    pub fn new(x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    pub fn width(&self) -> i64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i64 {
        self.y2 - self.y1
    }

    /// Clamp every coordinate into `0..=width` / `0..=height`.
    pub fn clamped(&self, width: u32, height: u32) -> Self {
        let (w, h) = (i64::from(width), i64::from(height));
        Self {
            x1: self.x1.clamp(0, w),
            y1: self.y1.clamp(0, h),
            x2: self.x2.clamp(0, w),
            y2: self.y2.clamp(0, h),
        }
    }
}

impl From<[i64; 4]> for CropFrame {
    fn from([x1, y1, x2, y2]: [i64; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<CropFrame> for [i64; 4] {
    fn from(f: CropFrame) -> Self {
        [f.x1, f.y1, f.x2, f.y2]
    }
}

// ── Record ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationRecord {
    pub note: String,
    /// Milliseconds per world unit; 0 means uncalibrated.
    pub calibration: f32,
    /// Quarter turns clockwise, stored mod 4.
    pub rotation: i32,
    #[serde(rename = "cropframe")]
    pub crop_frame: CropFrame,
}

impl AnnotationRecord {
    pub fn is_calibrated(&self) -> bool {
        self.calibration > 0.0
    }
}

pub fn sidecar_path(image_path: &Path) -> PathBuf {
    let stem = image_path.file_stem().unwrap_or_default().to_string_lossy();
    image_path.with_file_name(format!(".{stem}.{SIDECAR_EXTENSION}"))
}

/// Read the record for `image_path`. A missing sidecar yields the defaults.
pub fn load_record(image_path: &Path) -> Result<AnnotationRecord> {
    let path = sidecar_path(image_path);
    if !path.exists() {
        return Ok(AnnotationRecord::default());
    }
    let data = std::fs::read_to_string(&path)?;
    let record = serde_json::from_str(&data)?;
    log::debug!("Loaded annotation record {}", path.display());
    Ok(record)
}

pub fn save_record(image_path: &Path, record: &AnnotationRecord) -> Result<()> {
    let path = sidecar_path(image_path);
    let data = serde_json::to_string_pretty(record)?;
    std::fs::write(&path, data).map_err(|source| ViewerError::Persistence {
        path: path.clone(),
        source,
    })?;
    log::info!("Saved annotation record {}", path.display());
    Ok(())
}
