//! Status monitor CLI - watches LLM provider status feeds and alerts on incidents.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use status_monitor::{
    classify, Config, FeedSource, HttpFeedSource, Notification, Notifier, StatusMonitor,
};

/// Color used for the test notification.
const TEST_NOTIFICATION_COLOR: u32 = 0x00_FF00;

/// Characters of description shown by `--check-feeds`.
const PREVIEW_CHARS: usize = 200;

/// Status monitor - Alert on Anthropic and OpenAI status page incidents.
#[derive(Parser)]
#[command(name = "status-monitor")]
#[command(about = "Monitor LLM provider status feeds and alert Discord or Slack on incidents")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Run a single check cycle and exit (for cron use)
    #[arg(long, conflicts_with_all = ["check_feeds", "test_notification"])]
    once: bool,

    /// Fetch every feed, print its latest entry and classification, and exit
    #[arg(long, conflicts_with = "test_notification")]
    check_feeds: bool,

    /// Send a test message to the configured webhook and exit
    #[arg(long)]
    test_notification: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load .env before tracing so LOG_LEVEL and LOG_FORMAT apply
    dotenvy::dotenv().ok();
    init_tracing(cli.verbose);

    // .env is already loaded; read the environment as-is
    let config = match Config::from_lookup(|key| std::env::var(key).ok()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Configuration error");
            return Ok(ExitCode::FAILURE);
        }
    };

    let source = Arc::new(HttpFeedSource::new()?);

    if cli.check_feeds {
        return Ok(exit_code(check_feeds(&config, source.as_ref()).await));
    }

    let notifier = Notifier::from_config(&config)?;

    if cli.test_notification {
        return Ok(exit_code(send_test_notification(&config, notifier.as_ref()).await));
    }

    let mut monitor = StatusMonitor::new(&config, source, notifier);

    if cli.once {
        monitor.load_state();
        let report = tokio::select! {
            report = monitor.run_check_cycle() => Some(report),
            () = shutdown_signal() => None,
        };

        return Ok(match report {
            Some(report) => exit_code(report.state_saved),
            None => {
                info!("Interrupted, saving state");
                if !monitor.state().save() {
                    error!(path = %config.state_file.display(), "Final state not persisted");
                }
                ExitCode::SUCCESS
            }
        });
    }

    if monitor.run(shutdown_signal()).await {
        info!("Status monitor exited");
    } else {
        error!(
            path = %config.state_file.display(),
            "Final state not persisted, entries seen since the last save may be re-evaluated"
        );
    }
    Ok(ExitCode::SUCCESS)
}

/// Initialize tracing from `RUST_LOG`, then `LOG_LEVEL`, then `info`.
fn init_tracing(verbose: bool) {
    let base = if verbose {
        "status_monitor=debug,info".to_string()
    } else {
        std::env::var("RUST_LOG")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| std::env::var("LOG_LEVEL").ok().map(|v| v.to_lowercase()))
            .unwrap_or_else(|| "info".to_string())
    };

    let filter = EnvFilter::try_new(format!("{base},reqwest=warn,hyper=warn"))
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn"));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .init();
}

/// Print the latest entry of every configured feed.
async fn check_feeds(config: &Config, source: &dyn FeedSource) -> bool {
    let mut all_ok = true;

    for feed in &config.feeds {
        println!("\n{}", "=".repeat(60));
        println!("{}", feed.name);
        println!("{}", feed.url);
        println!("{}", "=".repeat(60));

        match source.latest_entry(feed.url).await {
            Ok(Some(entry)) => {
                let preview: String = entry.description.chars().take(PREVIEW_CHARS).collect();
                let classification = classify(&entry.title, &entry.description);

                println!("Title:       {}", entry.title);
                println!("ID:          {}", entry.id);
                println!("Link:        {}", entry.link);
                println!(
                    "Published:   {}",
                    entry.published.as_deref().unwrap_or("unknown")
                );
                println!("Description: {preview}");
                println!(
                    "Incident:    {}{}",
                    if classification.is_active() { "yes" } else { "no" },
                    classification
                        .keyword()
                        .map(|k| format!(" (matched '{k}')"))
                        .unwrap_or_default()
                );
            }
            Ok(None) => println!("No entries found"),
            Err(e) => {
                println!("Error: {e}");
                all_ok = false;
            }
        }
    }

    all_ok
}

/// Send a fixed message through the configured channel.
async fn send_test_notification(config: &Config, notifier: Option<&Notifier>) -> bool {
    let Some(notifier) = notifier else {
        error!(
            "Cannot send test notification: {} is not set",
            config.notification_type.webhook_env()
        );
        return false;
    };

    info!(channel = notifier.channel_name(), "Sending test notification");

    let notification = Notification::new(
        "Test Service",
        "Test Notification - System Working",
        "This is a test notification from the status monitor. \
         If you see this, your webhook is configured correctly!",
        "https://github.com",
        TEST_NOTIFICATION_COLOR,
    );

    let delivered = notifier.send(&notification).await;
    if delivered {
        info!("Test notification delivered");
    } else {
        warn!("Test notification failed, check the webhook URL");
    }
    delivered
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        () = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
