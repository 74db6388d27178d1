//! Sent-item history logs
//!
//! Two independent JSON documents track what has already gone out:
//! `sent_images.json` and `sent_messages.json`, both siblings of the images
//! folder's parent directory. Each log is loaded fully at startup and
//! rewritten wholesale after every append. The on-disk shape is a contract
//! shared with earlier implementations, so records keep their exact field
//! names and `sent_date` stays an opaque ISO-8601 string.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

pub const IMAGES_HISTORY_FILE: &str = "sent_images.json";
pub const MESSAGES_HISTORY_FILE: &str = "sent_messages.json";

/// Directory where the history files live: the parent of the images folder.
pub fn history_dir(images_folder: &Path) -> PathBuf {
    images_folder
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Timestamp recorded alongside every sent item.
pub fn now_timestamp() -> String {
    Local::now().to_rfc3339()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SentImage {
    pub path: String,
    pub sent_date: String,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SentMessage {
    pub message: String,
    pub sent_date: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ImageLogFile {
    images: Vec<SentImage>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MessageLogFile {
    messages: Vec<SentMessage>,
}

/// History of sent images.
#[derive(Debug)]
pub struct ImageHistory {
    path: PathBuf,
    log: ImageLogFile,
}

impl ImageHistory {
    /// Load the history file, or start fresh when it is absent or malformed.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let log = load_log_file(&path);
        Self { path, log }
    }

    pub fn entries(&self) -> &[SentImage] {
        &self.log.images
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.log.images.iter().any(|entry| entry.path == path)
    }

    /// Append a record and persist immediately.
    pub fn record(&mut self, entry: SentImage) -> Result<()> {
        self.log.images.push(entry);
        self.save()
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.log)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// History of sent messages.
#[derive(Debug)]
pub struct MessageHistory {
    path: PathBuf,
    log: MessageLogFile,
}

impl MessageHistory {
    /// Load the history file, or start fresh when it is absent or malformed.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let log = load_log_file(&path);
        Self { path, log }
    }

    pub fn entries(&self) -> &[SentMessage] {
        &self.log.messages
    }

    /// The `n` most recently recorded messages, newest first.
    pub fn recent_messages(&self, n: usize) -> Vec<&str> {
        self.log
            .messages
            .iter()
            .rev()
            .take(n)
            .map(|entry| entry.message.as_str())
            .collect()
    }

    /// Append a record and persist immediately.
    pub fn record(&mut self, entry: SentMessage) -> Result<()> {
        self.log.messages.push(entry);
        self.save()
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.log)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

fn load_log_file<T: Default + for<'de> Deserialize<'de>>(path: &Path) -> T {
    match fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(log) => log,
            Err(err) => {
                warn!(
                    "Error reading {}, creating new history: {}",
                    path.display(),
                    err
                );
                T::default()
            }
        },
        Err(_) => T::default(),
    }
}
