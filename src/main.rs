//! Love Message Sender CLI - main entry point
//!
//! Intended to be triggered once a minute by cron or Task Scheduler; the
//! schedule gate decides whether this invocation actually sends.

use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use love_sender::{commands, Config};

#[derive(Parser)]
#[command(name = "love_sender")]
#[command(about = "Scheduled WhatsApp love message sender", long_about = None)]
#[command(version)]
struct Cli {
    /// Run in test mode (no actual sending)
    #[arg(long)]
    test: bool,

    /// Force send regardless of schedule
    #[arg(long)]
    force: bool,

    /// Check if it's time to send based on the schedule
    #[arg(long)]
    check_schedule: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("love_sender=info".parse()?))
        .init();

    let cli = Cli::parse();

    // First run bootstraps .env from the template and asks for editing
    if let Err(err) = Config::ensure_env_file() {
        eprintln!("❌ {}", err);
        std::process::exit(1);
    }

    let config = Config::from_env();

    if let Err(err) = config.validate() {
        eprintln!("❌ {}", err);
        eprintln!("Please fix configuration issues and try again.");
        std::process::exit(1);
    }

    if cli.check_schedule {
        let now = Local::now();
        if config.schedule.matches(&now) {
            println!("It's time to send a love message based on the schedule!");
        } else {
            println!(
                "It's not time to send yet. Current time: {}",
                now.format("%A %H:%M")
            );
            println!(
                "Scheduled time: day {} (0=Mon, 6=Sun) at {}:{:02}",
                config.schedule.day, config.schedule.hour, config.schedule.minute
            );
        }
        return Ok(());
    }

    if cli.force || config.schedule.is_send_time() {
        if let Err(err) = commands::send::run(&config, cli.test).await {
            eprintln!("❌ Failed to send love message: {}", err);
            std::process::exit(1);
        }
        Ok(())
    } else {
        println!("Not scheduled to send now. Use --force to send anyway.");
        Ok(())
    }
}
