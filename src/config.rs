//! Configuration for the love message sender
//!
//! All settings are environment-variable-backed, loaded from a local `.env`
//! file via dotenvy. The struct is built once at startup and passed by
//! reference to each component's constructor.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{Error, Result};
use crate::schedule::Schedule;

/// Default constants (used when the corresponding variable is unset)
pub const DEFAULT_COUNTRY_CODE: &str = "1";
pub const DEFAULT_IMAGES_FOLDER: &str = "./images";
pub const DEFAULT_YOUR_NAME: &str = "Your Name";
pub const DEFAULT_GIRLFRIEND_NAME: &str = "Her Name";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
/// Saturday, in 0 = Monday numbering.
pub const DEFAULT_SEND_DAY: u32 = 5;
pub const DEFAULT_SEND_HOUR: u32 = 18;
pub const DEFAULT_SEND_MINUTE: u32 = 0;

/// Placeholder values shipped in `.env.template`; treated as "not configured".
pub const PLACEHOLDER_PHONE: &str = "1234567890";
pub const PLACEHOLDER_API_KEY: &str = "your_openai_api_key_here";

/// Image storage backends. Only `local` is functional; the remote backends
/// are stubs that yield no candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    Local,
    Dropbox,
    GoogleDrive,
}

impl StorageType {
    pub fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "local" => StorageType::Local,
            "dropbox" => StorageType::Dropbox,
            "google_drive" => StorageType::GoogleDrive,
            other => {
                warn!("Unknown STORAGE_TYPE '{}', falling back to local", other);
                StorageType::Local
            }
        }
    }
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_model: String,
    pub recipient_phone: String,
    pub country_code: String,
    pub storage_type: StorageType,
    pub images_folder: PathBuf,
    pub dropbox_access_token: String,
    pub gdrive_folder_id: String,
    pub your_name: String,
    pub girlfriend_name: String,
    pub relationship_duration: String,
    pub schedule: Schedule,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            recipient_phone: String::new(),
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            storage_type: StorageType::Local,
            images_folder: PathBuf::from(DEFAULT_IMAGES_FOLDER),
            dropbox_access_token: String::new(),
            gdrive_folder_id: String::new(),
            your_name: DEFAULT_YOUR_NAME.to_string(),
            girlfriend_name: DEFAULT_GIRLFRIEND_NAME.to_string(),
            relationship_duration: String::new(),
            schedule: Schedule::new(DEFAULT_SEND_DAY, DEFAULT_SEND_HOUR, DEFAULT_SEND_MINUTE),
        }
    }
}

impl Config {
    /// Build the configuration from environment variables, loading `.env`
    /// first.
    pub fn from_env() -> Self {
        Self::load_dotenv();

        Self {
            openai_api_key: env_string("OPENAI_API_KEY", ""),
            openai_model: env_string("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            recipient_phone: env_string("RECIPIENT_PHONE", ""),
            country_code: env_string("COUNTRY_CODE", DEFAULT_COUNTRY_CODE),
            storage_type: StorageType::parse(&env_string("STORAGE_TYPE", "local")),
            images_folder: PathBuf::from(env_string("IMAGES_FOLDER", DEFAULT_IMAGES_FOLDER)),
            dropbox_access_token: env_string("DROPBOX_ACCESS_TOKEN", ""),
            gdrive_folder_id: env_string("GDRIVE_FOLDER_ID", ""),
            your_name: env_string("YOUR_NAME", DEFAULT_YOUR_NAME),
            girlfriend_name: env_string("GIRLFRIEND_NAME", DEFAULT_GIRLFRIEND_NAME),
            relationship_duration: env_string("RELATIONSHIP_DURATION", ""),
            schedule: Schedule::new(
                env_u32("SEND_DAY", DEFAULT_SEND_DAY),
                env_u32("SEND_HOUR", DEFAULT_SEND_HOUR),
                env_u32("SEND_MINUTE", DEFAULT_SEND_MINUTE),
            ),
        }
    }

    /// Load .env file into environment variables using dotenvy
    fn load_dotenv() {
        // Try to load from current directory first, then parent
        if dotenvy::dotenv().is_err() {
            let _ = dotenvy::from_filename("../.env");
        }
    }

    /// Bootstrap `.env` from `.env.template` on first run. Returns an error
    /// when the file had to be created (the user must edit it) or when
    /// neither file exists.
    pub fn ensure_env_file() -> Result<()> {
        Self::ensure_env_file_in(Path::new("."))
    }

    pub fn ensure_env_file_in(dir: &Path) -> Result<()> {
        let env_path = dir.join(".env");
        if env_path.exists() {
            return Ok(());
        }

        let template_path = dir.join(".env.template");
        if template_path.exists() {
            fs::copy(&template_path, &env_path)?;
            println!("No .env file found. Created one from .env.template.");
            return Err(Error::ConfigError(
                "edit .env with your settings before running again".to_string(),
            ));
        }

        Err(Error::ConfigError(
            "no .env file or .env.template found".to_string(),
        ))
    }

    /// True when an OpenAI key is configured and is not the template
    /// placeholder.
    pub fn has_openai_key(&self) -> bool {
        !self.openai_api_key.is_empty() && self.openai_api_key != PLACEHOLDER_API_KEY
    }

    /// Validate the settings a send actually needs: a real recipient phone
    /// and, for local storage, an existing non-empty images folder. A
    /// missing folder is created so the user only has to drop images in.
    pub fn validate(&self) -> Result<()> {
        if self.recipient_phone.is_empty() || self.recipient_phone == PLACEHOLDER_PHONE {
            return Err(Error::ConfigError(
                "recipient phone number not configured in .env".to_string(),
            ));
        }

        if self.storage_type == StorageType::Local {
            if !self.images_folder.exists() {
                warn!(
                    "Images folder {} does not exist, creating it",
                    self.images_folder.display()
                );
                fs::create_dir_all(&self.images_folder)?;
                return Err(Error::ConfigError(format!(
                    "add images to {} before running again",
                    self.images_folder.display()
                )));
            }

            if fs::read_dir(&self.images_folder)?.next().is_none() {
                return Err(Error::ConfigError(format!(
                    "no images found in {}",
                    self.images_folder.display()
                )));
            }
        }

        Ok(())
    }
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u32(key: &str, default: u32) -> u32 {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Invalid {}='{}', using default {}", key, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}
