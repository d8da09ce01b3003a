//! Object storage and the confirm/discard flow for pending captures
//!
//! The object store only has to turn a local file into a fetchable URL.
//! `LocalObjectStore` keeps everything on disk and also writes a small
//! thumbnail next to each upload.

use chrono::Utc;
use image::imageops::FilterType;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use super::data::{Category, NewPhoto, PhotoRecord, PhotoStatus};
use super::library::Library;
use super::pending::PendingCaptures;
use super::session::Session;
use crate::error::{LibraryError, Result};

/// Size of generated thumbnails (square bound)
const THUMBNAIL_SIZE: u32 = 256;

/// Accepts a local file and returns a publicly fetchable URL
pub trait ObjectStore {
    fn put_file(&self, local_path: &Path) -> Result<String>;
}

/// Object store backed by a local directory
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Create the store, making `root/images` and `root/thumbnails` if needed
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join("images"))?;
        fs::create_dir_all(root.join("thumbnails"))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Thumbnail written for an uploaded object name
    pub fn thumbnail_path(&self, object_name: &str) -> PathBuf {
        let stem = Path::new(object_name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| object_name.to_string());
        self.root.join("thumbnails").join(format!("{stem}.png"))
    }
}

impl ObjectStore for LocalObjectStore {
    fn put_file(&self, local_path: &Path) -> Result<String> {
        // Decoding doubles as validation: we never store something that is not an image
        let img = image::open(local_path)?;

        let file_name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| LibraryError::InvalidData(format!("no file name: {}", local_path.display())))?;
        let object_name = format!("{}_{}", Utc::now().timestamp_micros(), file_name);
        let target = self.root.join("images").join(&object_name);

        fs::copy(local_path, &target)?;

        let thumbnail = img.resize(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3);
        thumbnail.save(self.thumbnail_path(&object_name))?;

        info!("Uploaded {} -> {}", local_path.display(), target.display());
        Ok(format!("file://{}", target.display()))
    }
}

/// Upload every pending capture and store it as a confirmed photo.
///
/// Captures are processed oldest first. If one fails, it and everything
/// after it go back into `pending` and the error is returned; photos already
/// stored stay stored.
pub fn confirm_pending(
    library: &Library,
    store: &dyn ObjectStore,
    pending: &mut PendingCaptures,
    session: &Session,
    category: Category,
) -> Result<Vec<PhotoRecord>> {
    let mut remaining = pending.take_all().into_iter();
    let mut stored = Vec::new();

    while let Some(capture) = remaining.next() {
        let result = store.put_file(&capture.path).and_then(|image_url| {
            library.add_photo(&NewPhoto {
                image_url,
                uploader_email: session.email.clone(),
                uploader_label: session.uploader_label(),
                category,
                status: PhotoStatus::Confirmed,
            })
        });

        match result {
            Ok(record) => stored.push(record),
            Err(err) => {
                warn!("Upload of {} failed: {}", capture.path.display(), err);
                let mut unsent = vec![capture];
                unsent.extend(remaining);
                pending.restore(unsent);
                return Err(err);
            }
        }
    }

    info!("Confirmed {} photos into {}", stored.len(), category);
    Ok(stored)
}

/// Throw away every pending capture without uploading
pub fn discard_pending(pending: &mut PendingCaptures) -> usize {
    let count = pending.clear();
    info!("Discarded {} pending photos", count);
    count
}
