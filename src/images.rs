//! Image selection
//!
//! Lists candidate images in the configured folder, filters out the ones
//! already recorded in `sent_images.json`, and picks uniformly at random.
//! Once every candidate has been sent the whole pool becomes eligible
//! again, so duplicates are expected after a full rotation.

use std::fs;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::{Config, StorageType};
use crate::error::{Error, Result};
use crate::history::{history_dir, now_timestamp, ImageHistory, SentImage, IMAGES_HISTORY_FILE};

/// Accepted image file extensions (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp"];

pub struct ImageSelector {
    storage: StorageType,
    images_folder: PathBuf,
    history: ImageHistory,
}

impl ImageSelector {
    pub fn new(config: &Config) -> Self {
        let history_path = history_dir(&config.images_folder).join(IMAGES_HISTORY_FILE);
        Self {
            storage: config.storage_type,
            images_folder: config.images_folder.clone(),
            history: ImageHistory::load(history_path),
        }
    }

    /// Candidate image files for the configured storage backend.
    pub fn available_images(&self) -> Vec<PathBuf> {
        match self.storage {
            StorageType::Local => self.list_local_images(),
            StorageType::Dropbox => {
                warn!("Dropbox storage is not implemented yet");
                Vec::new()
            }
            StorageType::GoogleDrive => {
                warn!("Google Drive storage is not implemented yet");
                Vec::new()
            }
        }
    }

    fn list_local_images(&self) -> Vec<PathBuf> {
        if !self.images_folder.exists() {
            if let Err(err) = fs::create_dir_all(&self.images_folder) {
                warn!(
                    "Could not create images folder {}: {}",
                    self.images_folder.display(),
                    err
                );
                return Vec::new();
            }
        }

        let mut images: Vec<PathBuf> = WalkDir::new(&self.images_folder)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| is_image_file(path))
            .collect();
        images.sort();
        images
    }

    /// Pick the next image to send and record it in the history before
    /// returning.
    pub fn select_next(&mut self) -> Result<PathBuf> {
        let available = self.available_images();
        if available.is_empty() {
            return Err(Error::NoImagesFound(
                self.images_folder.display().to_string(),
            ));
        }

        let mut eligible: Vec<PathBuf> = available
            .iter()
            .filter(|path| !self.history.contains_path(&path.to_string_lossy()))
            .cloned()
            .collect();

        if eligible.is_empty() {
            info!("All images have been sent, starting over");
            eligible = available;
        }

        let mut rng = rand::thread_rng();
        let selected = eligible
            .choose(&mut rng)
            .cloned()
            .expect("eligible image set is non-empty");

        let filename = selected
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.history.record(SentImage {
            path: selected.to_string_lossy().into_owned(),
            sent_date: now_timestamp(),
            filename,
        })?;

        info!("Selected image {}", selected.display());
        Ok(selected)
    }

    pub fn history(&self) -> &ImageHistory {
        &self.history
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
