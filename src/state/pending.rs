use chrono::{DateTime, Utc};
use log::{debug, info};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::Result;

/// Image extensions accepted as captures
const CAPTURE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// A photo taken on the device but not uploaded yet
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPhoto {
    pub path: PathBuf,
    pub captured_at: DateTime<Utc>,
}

/// Captures waiting for the user to confirm or discard them.
///
/// Owned by the session that outlives the camera and gallery screens and
/// passed down by reference.
#[derive(Debug, Default)]
pub struct PendingCaptures {
    photos: Vec<CapturedPhoto>,
}

impl PendingCaptures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<PathBuf>) {
        let photo = CapturedPhoto {
            path: path.into(),
            captured_at: Utc::now(),
        };
        debug!("Captured {}", photo.path.display());
        self.photos.push(photo);
    }

    pub fn list(&self) -> &[CapturedPhoto] {
        &self.photos
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Remove and return every capture, oldest first
    pub fn take_all(&mut self) -> Vec<CapturedPhoto> {
        std::mem::take(&mut self.photos)
    }

    /// Put captures back at the front (after a failed upload)
    pub fn restore(&mut self, mut photos: Vec<CapturedPhoto>) {
        photos.append(&mut self.photos);
        self.photos = photos;
    }

    /// Drop every capture; returns how many were discarded
    pub fn clear(&mut self) -> usize {
        let count = self.photos.len();
        self.photos.clear();
        count
    }
}

/// Add every image under `folder` to the pending captures.
///
/// Stands in for the device camera on desktop hosts. Files are visited in
/// file-name order; returns how many captures were added.
pub fn capture_folder(folder: &Path, pending: &mut PendingCaptures) -> Result<usize> {
    if !folder.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("not a directory: {}", folder.display()),
        )
        .into());
    }

    let mut added = 0;
    for entry in WalkDir::new(folder)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        // Only process files (not directories)
        if !path.is_file() {
            continue;
        }

        let is_image = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .map(|ext| CAPTURE_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false);
        if !is_image {
            continue;
        }

        pending.add(path);
        added += 1;
    }

    info!("Captured {} photos from {}", added, folder.display());
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_take_and_restore_keep_order() {
        let mut pending = PendingCaptures::new();
        pending.add("/tmp/a.jpg");
        pending.add("/tmp/b.jpg");

        let mut taken = pending.take_all();
        assert!(pending.is_empty());

        pending.add("/tmp/c.jpg");
        taken.remove(0);
        pending.restore(taken);

        let paths: Vec<_> = pending.list().iter().map(|p| p.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("/tmp/b.jpg"), PathBuf::from("/tmp/c.jpg")]);
        assert_eq!(pending.clear(), 2);
        assert_eq!(pending.len(), 0);
    }

    #[test]
    fn test_capture_folder_picks_images_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.JPG"), b"x").unwrap();
        fs::write(dir.path().join("a.png"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.jpeg"), b"x").unwrap();

        let mut pending = PendingCaptures::new();
        let added = capture_folder(dir.path(), &mut pending).unwrap();

        assert_eq!(added, 3);
        let names: Vec<_> = pending
            .list()
            .iter()
            .map(|p| p.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.png", "b.JPG", "c.jpeg"]);
    }

    #[test]
    fn test_capture_folder_missing() {
        let mut pending = PendingCaptures::new();
        assert!(capture_folder(Path::new("/no/such/folder"), &mut pending).is_err());
        assert!(pending.is_empty());
    }
}
