//! Ordered list of images with a "now showing" cursor.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::{Result, ViewerError};

pub const PLAYLIST_EXTENSION: &str = "plst";

/// Extensions picked up when building a playlist from a directory.
pub const IMAGE_EXTENSIONS: &[&str] = &["bmp", "png", "jpg", "jpeg", "tif", "tiff"];

pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

pub fn is_playlist_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(PLAYLIST_EXTENSION))
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Playlist {
    paths: Vec<PathBuf>,
    now_showing: usize,
}

impl Playlist {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            now_showing: 0,
        }
    }

    /// Every image in `opened`'s directory, sorted by path, with the
    /// cursor on `opened`.
    pub fn from_directory(opened: &Path) -> Result<Self> {
        let dir = match opened.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_image_path(p))
            .collect();
        paths.sort();

        let target = dir.join(opened.file_name().unwrap_or_default());
        let now_showing = paths
            .iter()
            .position(|p| *p == target)
            .ok_or_else(|| ViewerError::NotInPlaylist(opened.to_path_buf()))?;

        log::info!(
            "Playlist of {} images from {}",
            paths.len(),
            dir.display()
        );
        Ok(Self { paths, now_showing })
    }

    /// Read a `.plst` file: one path per line.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let paths: Vec<PathBuf> = data
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .collect();
        log::info!("Loaded playlist {} ({} entries)", path.display(), paths.len());
        Ok(Self::new(paths))
    }

    /// Write the playlist, adding the `.plst` extension when missing.
    /// Returns the path actually written.
    pub fn save(&self, path: &Path) -> Result<PathBuf> {
        let path = if is_playlist_path(path) {
            path.to_path_buf()
        } else {
            let mut name = path.as_os_str().to_owned();
            name.push(".");
            name.push(PLAYLIST_EXTENSION);
            PathBuf::from(name)
        };

        let mut data = String::new();
        for p in &self.paths {
            data.push_str(&p.to_string_lossy());
            data.push('\n');
        }
        std::fs::write(&path, data).map_err(|source| ViewerError::Persistence {
            path: path.clone(),
            source,
        })?;
        log::info!("Saved playlist {}", path.display());
        Ok(path)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn now_showing(&self) -> usize {
        self.now_showing
    }

    pub fn current(&self) -> Option<&Path> {
        self.paths.get(self.now_showing).map(PathBuf::as_path)
    }

    /// The entry after the cursor, wrapping to the start. The cursor is
    /// not moved; callers commit with [`Playlist::jump_to`].
    pub fn next_index(&self) -> Option<usize> {
        if self.paths.is_empty() {
            return None;
        }
        Some((self.now_showing + 1) % self.paths.len())
    }

    pub fn previous_index(&self) -> Option<usize> {
        if self.paths.is_empty() {
            return None;
        }
        Some(match self.now_showing {
            0 => self.paths.len() - 1,
            n => n - 1,
        })
    }

    /// Move the cursor; `false` leaves it alone when `index` is out of range.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index < self.paths.len() {
            self.now_showing = index;
            true
        } else {
            false
        }
    }

    // ── Editing ─────────────────────────────────────────────────────────────

    pub fn push(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    pub fn remove(&mut self, index: usize) -> Option<PathBuf> {
        if index >= self.paths.len() {
            return None;
        }
        let removed = self.paths.remove(index);
        if self.now_showing > index || self.now_showing >= self.paths.len() {
            self.now_showing = self.now_showing.saturating_sub(1);
        }
        Some(removed)
    }

    /// Swap `index` with its predecessor. Returns the new index.
    pub fn move_up(&mut self, index: usize) -> Option<usize> {
        if index == 0 || index >= self.paths.len() {
            return None;
        }
        self.swap(index, index - 1);
        Some(index - 1)
    }

    /// Swap `index` with its successor. Returns the new index.
    pub fn move_down(&mut self, index: usize) -> Option<usize> {
        if index + 1 >= self.paths.len() {
            return None;
        }
        self.swap(index, index + 1);
        Some(index + 1)
    }

    /// Where `rename` would move the entry at `index`. The name must be a
    /// bare file name: no separators, no `..`.
    pub fn rename_target(&self, index: usize, new_name: &str) -> Result<PathBuf> {
        let old = self.paths.get(index).ok_or(ViewerError::EmptyPlaylist)?;
        let name = new_name.trim();
        if name.is_empty() || Path::new(name).file_name() != Some(OsStr::new(name)) {
            return Err(ViewerError::InvalidFileName(name.to_string()));
        }
        Ok(old.with_file_name(name))
    }

    /// Rename the file at `index` on disk, keeping it in its directory.
    pub fn rename(&mut self, index: usize, new_name: &str) -> Result<PathBuf> {
        let new = self.rename_target(index, new_name)?;
        let old = self.paths[index].clone();
        if new == old {
            return Ok(new);
        }
        if new.exists() {
            return Err(ViewerError::RenameCollision(new));
        }
        std::fs::rename(&old, &new)?;
        log::info!("Renamed {} -> {}", old.display(), new.display());
        self.paths[index] = new.clone();
        Ok(new)
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.paths.swap(a, b);
        if self.now_showing == a {
            self.now_showing = b;
        } else if self.now_showing == b {
            self.now_showing = a;
        }
    }
}
