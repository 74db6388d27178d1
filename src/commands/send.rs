//! Send pipeline
//!
//! Wires the selectors and the dispatcher in sequence: pick an image,
//! generate a message, print the summary, deliver. Both selections are
//! recorded in their history files before delivery is attempted; a failed
//! send still leaves the pair recorded as sent.

use std::path::Path;

use crate::{Config, ImageSelector, MessageDispatcher, MessageGenerator, Result, WhatsAppSender};

/// Run the full pipeline with the production WhatsApp dispatcher.
pub async fn run(config: &Config, test_mode: bool) -> Result<()> {
    let sender = WhatsAppSender::from_config(config);
    run_with_dispatcher(config, &sender, test_mode).await
}

/// Run the pipeline against any dispatcher implementation.
pub async fn run_with_dispatcher(
    config: &Config,
    dispatcher: &dyn MessageDispatcher,
    test_mode: bool,
) -> Result<()> {
    let mut images = ImageSelector::new(config);
    let mut messages = MessageGenerator::from_config(config);

    let image_path = images.select_next()?;
    let message = messages.generate_message().await?;

    print_summary(&image_path, &message);

    if test_mode {
        println!("Test mode: message and image would be sent to WhatsApp");
        return Ok(());
    }

    dispatcher.send_image_with_message(&image_path, &message).await?;

    println!("✓ Successfully sent love message with image!");
    Ok(())
}

fn print_summary(image_path: &Path, message: &str) {
    println!("\n{}", "=".repeat(50));
    println!("Love Message Sender");
    println!("{}", "=".repeat(50));
    println!("Selected image: {}", image_path.display());
    println!("Generated message: {}", message);
    println!("{}\n", "=".repeat(50));
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::tempdir;

    use crate::error::Error;
    use crate::history::{IMAGES_HISTORY_FILE, MESSAGES_HISTORY_FILE};

    #[derive(Default)]
    struct RecordingDispatcher {
        calls: Mutex<Vec<(PathBuf, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl MessageDispatcher for RecordingDispatcher {
        async fn send_image_with_message(&self, image_path: &Path, message: &str) -> Result<()> {
            if self.fail {
                return Err(Error::DeliveryError("automation blew up".to_string()));
            }
            self.calls
                .lock()
                .unwrap()
                .push((image_path.to_path_buf(), message.to_string()));
            Ok(())
        }

        async fn send_message_only(&self, message: &str) -> Result<()> {
            if self.fail {
                return Err(Error::DeliveryError("automation blew up".to_string()));
            }
            self.calls
                .lock()
                .unwrap()
                .push((PathBuf::new(), message.to_string()));
            Ok(())
        }
    }

    fn config_with_one_image(dir: &Path) -> Config {
        let images_folder = dir.join("images");
        fs::create_dir_all(&images_folder).expect("mkdir");
        fs::write(images_folder.join("pic.png"), b"png-bytes").expect("write");
        Config {
            recipient_phone: "5551234567".to_string(),
            girlfriend_name: "Alice".to_string(),
            images_folder,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn pipeline_dispatches_selected_pair() {
        let dir = tempdir().expect("tempdir");
        let config = config_with_one_image(dir.path());
        let dispatcher = RecordingDispatcher::default();

        run_with_dispatcher(&config, &dispatcher, false)
            .await
            .expect("pipeline");

        let calls = dispatcher.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.ends_with("pic.png"));
        assert!(calls[0].1.contains("Alice"));
    }

    #[tokio::test]
    async fn test_mode_skips_dispatch_but_still_records_history() {
        let dir = tempdir().expect("tempdir");
        let config = config_with_one_image(dir.path());
        let dispatcher = RecordingDispatcher::default();

        run_with_dispatcher(&config, &dispatcher, true)
            .await
            .expect("pipeline");

        assert!(dispatcher.calls.lock().unwrap().is_empty());
        assert!(dir.path().join(IMAGES_HISTORY_FILE).exists());
        assert!(dir.path().join(MESSAGES_HISTORY_FILE).exists());
    }

    #[tokio::test]
    async fn dispatch_failure_surfaces() {
        let dir = tempdir().expect("tempdir");
        let config = config_with_one_image(dir.path());
        let dispatcher = RecordingDispatcher {
            fail: true,
            ..RecordingDispatcher::default()
        };

        let err = run_with_dispatcher(&config, &dispatcher, false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DeliveryError(_)));
    }

    #[tokio::test]
    async fn empty_images_folder_aborts_before_generation() {
        let dir = tempdir().expect("tempdir");
        let images_folder = dir.path().join("images");
        fs::create_dir_all(&images_folder).expect("mkdir");
        let config = Config {
            recipient_phone: "5551234567".to_string(),
            images_folder,
            ..Config::default()
        };
        let dispatcher = RecordingDispatcher::default();

        let err = run_with_dispatcher(&config, &dispatcher, false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoImagesFound(_)));
        assert!(!dir.path().join(MESSAGES_HISTORY_FILE).exists());
    }
}
