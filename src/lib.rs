//! Love Message Sender Library
//!
//! This library provides tools to:
//! - Select a not-yet-sent image at random from a local folder
//! - Generate personalized messages (OpenAI integration with offline fallbacks)
//! - Track sent images and messages in flat JSON history files
//! - Gate sends on a weekly day/hour/minute schedule
//! - Deliver image/message pairs through WhatsApp Web automation

pub mod config;
pub mod error;
pub mod history;
pub mod images;
pub mod integrations;
pub mod messages;
pub mod schedule;
pub mod whatsapp;

// Re-export common types
pub use config::{Config, StorageType};
pub use error::{Error, Result};
pub use images::ImageSelector;
pub use integrations::{OpenAIClient, TextGenerator};
pub use messages::MessageGenerator;
pub use schedule::Schedule;
pub use whatsapp::{MessageDispatcher, WhatsAppSender};

// Commands module uses re-exported types, so it must be declared after the re-exports
pub mod commands;
