//! Message generation
//!
//! Produces the text that accompanies each image: one attempt against the
//! chat-completion endpoint when a key is configured, otherwise (or on any
//! failure) a random pick from a fixed pool of fallback messages that avoids
//! the most recently sent ones. Every produced message is recorded in
//! `sent_messages.json` before it is returned.

use rand::seq::SliceRandom;
use tracing::warn;

use crate::config::Config;
use crate::error::Result;
use crate::history::{history_dir, now_timestamp, MessageHistory, SentMessage, MESSAGES_HISTORY_FILE};
use crate::integrations::{OpenAIClient, TextGenerator};

/// How many recent history entries a fallback pick must avoid.
pub const FALLBACK_WINDOW: usize = 5;

const MESSAGE_MAX_TOKENS: u32 = 200;
const MESSAGE_TEMPERATURE: f32 = 0.7;

const SYSTEM_PROMPT: &str =
    "You are a romantic message writer helping someone express their love.";

/// The offline message pool, personalized with the recipient's name.
pub fn fallback_messages(girlfriend_name: &str) -> Vec<String> {
    vec![
        format!(
            "My dearest {girlfriend_name}, every day with you feels like a beautiful adventure. \
             Your smile brightens my world in ways I never thought possible. \
             I love you more than words can express."
        ),
        format!(
            "{girlfriend_name}, you are the most precious person in my life. \
             I cherish every moment we spend together and look forward to creating \
             countless more memories. My love for you grows stronger each day."
        ),
        format!(
            "To my amazing {girlfriend_name}, you fill my heart with joy and my life with purpose. \
             I'm so grateful to have you by my side through everything. \
             You are truly irreplaceable."
        ),
        format!(
            "My love for you, {girlfriend_name}, knows no bounds. \
             Your kindness, strength, and beauty inspire me every day. \
             I'm the luckiest person in the world to call you mine."
        ),
        format!(
            "Thinking of you, {girlfriend_name}, always brings a smile to my face. \
             You are the most wonderful person I know, and I'm endlessly thankful for your love. \
             You mean everything to me."
        ),
    ]
}

pub struct MessageGenerator {
    generator: Option<Box<dyn TextGenerator>>,
    model: String,
    your_name: String,
    girlfriend_name: String,
    relationship_duration: String,
    history: MessageHistory,
}

impl MessageGenerator {
    /// Build a generator with the production OpenAI client when a usable key
    /// is configured, otherwise fallback-only.
    pub fn from_config(config: &Config) -> Self {
        let generator: Option<Box<dyn TextGenerator>> = if config.has_openai_key() {
            match OpenAIClient::new(config.openai_api_key.clone()) {
                Ok(client) => Some(Box::new(client)),
                Err(err) => {
                    warn!("Could not build OpenAI client: {}", err);
                    None
                }
            }
        } else {
            None
        };

        Self::new(config, generator)
    }

    /// Build a generator with an injected text-generation capability.
    pub fn new(config: &Config, generator: Option<Box<dyn TextGenerator>>) -> Self {
        let history_path = history_dir(&config.images_folder).join(MESSAGES_HISTORY_FILE);
        Self {
            generator,
            model: config.openai_model.clone(),
            your_name: config.your_name.clone(),
            girlfriend_name: config.girlfriend_name.clone(),
            relationship_duration: config.relationship_duration.clone(),
            history: MessageHistory::load(history_path),
        }
    }

    /// Produce the next message. Generation never fails outward: any remote
    /// failure falls back to the offline pool. Only a history-persist error
    /// can surface.
    pub async fn generate_message(&mut self) -> Result<String> {
        let message = match &self.generator {
            Some(generator) => {
                let prompt = self.build_prompt();
                match generator
                    .generate(
                        SYSTEM_PROMPT,
                        &prompt,
                        &self.model,
                        MESSAGE_TEMPERATURE,
                        MESSAGE_MAX_TOKENS,
                    )
                    .await
                {
                    Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
                    Ok(_) => {
                        warn!("Generated message was empty, using a fallback");
                        self.pick_fallback()
                    }
                    Err(err) => {
                        warn!("Error generating message with OpenAI: {}", err);
                        self.pick_fallback()
                    }
                }
            }
            None => self.pick_fallback(),
        };

        self.history.record(SentMessage {
            message: message.clone(),
            sent_date: now_timestamp(),
        })?;

        Ok(message)
    }

    fn build_prompt(&self) -> String {
        format!(
            "Generate a heartfelt, romantic message from {you} to {her}. \
             The message should express deep love, reassurance, and appreciation. \
             It should be personal, warm, and make {her} feel special and loved. \
             The message should be 3-5 sentences long and suitable to accompany a romantic photo.\n\n\
             Some context about their relationship: They have been together for {duration}.\n\n\
             The message should NOT include any placeholders or variables like [NAME] or similar. \
             The message should be ready to send as-is.",
            you = self.your_name,
            her = self.girlfriend_name,
            duration = self.relationship_duration,
        )
    }

    fn pick_fallback(&self) -> String {
        let pool = fallback_messages(&self.girlfriend_name);
        let recent = self.history.recent_messages(FALLBACK_WINDOW);

        let mut candidates: Vec<String> = pool
            .iter()
            .filter(|message| !recent.contains(&message.as_str()))
            .cloned()
            .collect();

        // All pool entries were sent recently: ignore the exclusion
        if candidates.is_empty() {
            candidates = pool;
        }

        let mut rng = rand::thread_rng();
        candidates
            .choose(&mut rng)
            .cloned()
            .expect("fallback pool is never empty")
    }

    pub fn history(&self) -> &MessageHistory {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    use crate::error::Error;

    struct FakeGenerator {
        reply: Option<String>,
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
            _model: &str,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String> {
            match &self.reply {
                Some(text) => Ok(text.clone()),
                None => Err(Error::OpenAiError("service unavailable".to_string())),
            }
        }
    }

    fn config_in(dir: &Path) -> Config {
        let images_folder = dir.join("images");
        fs::create_dir_all(&images_folder).expect("mkdir");
        Config {
            girlfriend_name: "Alice".to_string(),
            images_folder,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn without_credential_returns_a_fallback_message() {
        let dir = tempdir().expect("tempdir");
        let config = config_in(dir.path());
        let mut generator = MessageGenerator::from_config(&config);

        let message = generator.generate_message().await.expect("message");
        assert!(fallback_messages("Alice").contains(&message));
        assert!(message.contains("Alice"));
        assert_eq!(generator.history().entries().len(), 1);
    }

    #[tokio::test]
    async fn fallback_avoids_recently_sent_messages() {
        let dir = tempdir().expect("tempdir");
        let config = config_in(dir.path());
        let mut generator = MessageGenerator::new(&config, None);

        // Mark 4 of the 5 pool entries as recently sent
        let pool = fallback_messages("Alice");
        for message in pool.iter().take(4) {
            generator
                .history
                .record(SentMessage {
                    message: message.clone(),
                    sent_date: now_timestamp(),
                })
                .expect("record");
        }

        let message = generator.generate_message().await.expect("message");
        assert_eq!(message, pool[4]);
    }

    #[tokio::test]
    async fn fallback_uses_full_pool_when_exclusion_empties_it() {
        let dir = tempdir().expect("tempdir");
        let config = config_in(dir.path());
        let mut generator = MessageGenerator::new(&config, None);

        for message in fallback_messages("Alice") {
            generator
                .history
                .record(SentMessage {
                    message,
                    sent_date: now_timestamp(),
                })
                .expect("record");
        }

        let message = generator.generate_message().await.expect("message");
        assert!(fallback_messages("Alice").contains(&message));
    }

    #[tokio::test]
    async fn api_reply_is_recorded_and_returned() {
        let dir = tempdir().expect("tempdir");
        let config = config_in(dir.path());
        let fake = FakeGenerator {
            reply: Some("  A generated love note.  ".to_string()),
        };
        let mut generator = MessageGenerator::new(&config, Some(Box::new(fake)));

        let message = generator.generate_message().await.expect("message");
        assert_eq!(message, "A generated love note.");

        let entries = generator.history().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "A generated love note.");
    }

    #[tokio::test]
    async fn api_failure_falls_back_silently() {
        let dir = tempdir().expect("tempdir");
        let config = config_in(dir.path());
        let fake = FakeGenerator { reply: None };
        let mut generator = MessageGenerator::new(&config, Some(Box::new(fake)));

        let message = generator.generate_message().await.expect("message");
        assert!(fallback_messages("Alice").contains(&message));
        assert_eq!(generator.history().entries().len(), 1);
    }

    #[tokio::test]
    async fn empty_api_reply_falls_back() {
        let dir = tempdir().expect("tempdir");
        let config = config_in(dir.path());
        let fake = FakeGenerator {
            reply: Some("   ".to_string()),
        };
        let mut generator = MessageGenerator::new(&config, Some(Box::new(fake)));

        let message = generator.generate_message().await.expect("message");
        assert!(fallback_messages("Alice").contains(&message));
    }

    #[test]
    fn pool_has_five_personalized_messages() {
        let pool = fallback_messages("Alice");
        assert_eq!(pool.len(), 5);
        for message in &pool {
            assert!(message.contains("Alice"));
        }
    }
}
