//! WhatsApp delivery
//!
//! Transmission is delegated to the pywhatkit WhatsApp Web automation,
//! driven as an external process. This module only validates inputs,
//! computes send times, and reports success or failure; nothing here talks
//! to WhatsApp directly.

use std::path::Path;

use async_trait::async_trait;
use chrono::{Duration, Local, Timelike};
use tokio::process::Command;
use tracing::info;

use crate::config::{Config, PLACEHOLDER_PHONE};
use crate::error::{Error, Result};

/// Seconds to wait for WhatsApp Web to open before the automation types.
pub const DEFAULT_WAIT_TIME_SECS: u64 = 15;

/// Capability interface for the outbound delivery channel, so tests can
/// substitute deterministic fakes.
#[async_trait]
pub trait MessageDispatcher: Send + Sync {
    /// Send an image with a caption to the configured recipient.
    async fn send_image_with_message(&self, image_path: &Path, message: &str) -> Result<()>;

    /// Send a text-only message to the configured recipient.
    async fn send_message_only(&self, message: &str) -> Result<()>;
}

// The automation entry points, invoked as `python3 -c <bridge> <args...>`.
// Arguments travel through argv so message content needs no quoting.
const IMAGE_BRIDGE: &str = "import sys\n\
import pywhatkit as kit\n\
kit.sendwhats_image(receiver=sys.argv[1], img_path=sys.argv[2], caption=sys.argv[3], \
wait_time=int(sys.argv[4]), tab_close=sys.argv[5] == 'true')\n";

const TEXT_BRIDGE: &str = "import sys\n\
import pywhatkit as kit\n\
kit.sendwhatmsg(phone_no=sys.argv[1], message=sys.argv[2], time_hour=int(sys.argv[3]), \
time_min=int(sys.argv[4]), wait_time=int(sys.argv[5]), tab_close=sys.argv[6] == 'true')\n";

pub struct WhatsAppSender {
    recipient_phone: String,
    full_phone_number: String,
    wait_time: u64,
    close_tab: bool,
    python_bin: String,
}

impl WhatsAppSender {
    pub fn from_config(config: &Config) -> Self {
        Self {
            recipient_phone: config.recipient_phone.clone(),
            full_phone_number: format!("+{}{}", config.country_code, config.recipient_phone),
            wait_time: DEFAULT_WAIT_TIME_SECS,
            close_tab: true,
            python_bin: "python3".to_string(),
        }
    }

    /// Recipient in full international format (`+<country><number>`).
    pub fn full_phone_number(&self) -> &str {
        &self.full_phone_number
    }

    pub fn with_wait_time(mut self, secs: u64) -> Self {
        self.wait_time = secs;
        self
    }

    pub fn with_close_tab(mut self, close: bool) -> Self {
        self.close_tab = close;
        self
    }

    fn validate_recipient(&self) -> Result<()> {
        if self.recipient_phone.is_empty() || self.recipient_phone == PLACEHOLDER_PHONE {
            return Err(Error::DeliveryError(
                "valid recipient phone number not configured".to_string(),
            ));
        }
        Ok(())
    }

    /// Target send time one minute from the given clock reading, carrying
    /// the hour on minute rollover and wrapping midnight.
    pub fn rollover_send_time(hour: u32, minute: u32) -> (u32, u32) {
        let minute = minute + 1;
        if minute >= 60 {
            ((hour + 1) % 24, minute % 60)
        } else {
            (hour, minute)
        }
    }

    async fn run_bridge(&self, bridge: &str, args: &[&str]) -> Result<()> {
        let output = Command::new(&self.python_bin)
            .arg("-c")
            .arg(bridge)
            .args(args)
            .output()
            .await
            .map_err(|e| Error::DeliveryError(format!("failed to launch automation: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::DeliveryError(format!(
                "automation exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl MessageDispatcher for WhatsAppSender {
    async fn send_image_with_message(&self, image_path: &Path, message: &str) -> Result<()> {
        if !image_path.exists() {
            return Err(Error::DeliveryError(format!(
                "image file not found at {}",
                image_path.display()
            )));
        }
        self.validate_recipient()?;

        // One-minute allowance for WhatsApp Web to load
        let send_time = Local::now() + Duration::minutes(1);
        info!(
            "Preparing to send image to {} (around {})",
            self.full_phone_number,
            send_time.format("%H:%M")
        );

        let image_arg = image_path.to_string_lossy();
        let wait_arg = self.wait_time.to_string();
        let close_arg = if self.close_tab { "true" } else { "false" };
        let args = [
            self.full_phone_number.as_str(),
            image_arg.as_ref(),
            message,
            wait_arg.as_str(),
            close_arg,
        ];
        self.run_bridge(IMAGE_BRIDGE, &args).await?;

        println!("✓ Message and image sent to {}", self.full_phone_number);
        Ok(())
    }

    async fn send_message_only(&self, message: &str) -> Result<()> {
        self.validate_recipient()?;

        let now = Local::now();
        let (hour, minute) = Self::rollover_send_time(now.hour(), now.minute());
        info!(
            "Preparing to send message to {} at {:02}:{:02}",
            self.full_phone_number, hour, minute
        );

        let hour_arg = hour.to_string();
        let minute_arg = minute.to_string();
        let wait_arg = self.wait_time.to_string();
        let close_arg = if self.close_tab { "true" } else { "false" };
        let args = [
            self.full_phone_number.as_str(),
            message,
            hour_arg.as_str(),
            minute_arg.as_str(),
            wait_arg.as_str(),
            close_arg,
        ];
        self.run_bridge(TEXT_BRIDGE, &args).await?;

        println!("✓ Message sent to {}", self.full_phone_number);
        Ok(())
    }
}
