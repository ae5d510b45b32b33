//! Bursar Validator - composition root binary
//!
//! Without arguments it watches the pending queue. With `approve` or
//! `reject` it submits one batch and exits.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bursar_client::infrastructure::{ApiAdapter, SystemClock, TracingNotifier};
use bursar_client::ports::outbound::RawApiPort;
use bursar_client::{activate, ClientConfig, ExpenseValidationService};
use bursar_domain::{ExpenseId, ValidationAction};

const USAGE: &str = "Usage: bursar-validator [watch]\n       bursar-validator approve|reject <id>... [--notes TEXT]";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Watch,
    Validate {
        action: ValidationAction,
        ids: Vec<ExpenseId>,
        notes: Option<String>,
    },
}

fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Command> {
    let mut args = args.into_iter();
    let action = match args.next().as_deref() {
        None | Some("watch") => return Ok(Command::Watch),
        Some("-h") | Some("--help") => anyhow::bail!(USAGE),
        Some(cmd) => cmd
            .parse::<ValidationAction>()
            .map_err(|_| anyhow::anyhow!("Unknown command: {cmd}\n\n{USAGE}"))?,
    };

    let mut ids = Vec::new();
    let mut notes = None;
    while let Some(arg) = args.next() {
        if arg == "--notes" {
            notes = Some(args.next().context("--notes needs a value")?);
        } else {
            ids.push(ExpenseId::new(arg));
        }
    }
    if ids.is_empty() {
        anyhow::bail!("No expense ids given\n\n{USAGE}");
    }

    Ok(Command::Validate { action, ids, notes })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bursar_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let command = parse_args(std::env::args().skip(1))?;
    let config = ClientConfig::from_env().context("loading configuration")?;
    tracing::info!(api_base_url = %config.api_base_url, "Starting Bursar Validator");

    let raw_api: Arc<dyn RawApiPort> = Arc::new(ApiAdapter::from_config(&config));
    let service = Arc::new(ExpenseValidationService::new(
        raw_api,
        Arc::new(TracingNotifier::new()),
        Arc::new(SystemClock::new()),
    ));

    match command {
        Command::Watch => watch(service, &config).await,
        Command::Validate { action, ids, notes } => {
            // Populate the snapshot so the approved amount can be reported.
            if let Err(e) = service.load_pending_expenses().await {
                tracing::warn!(error = %e, "Could not load pending expenses before submitting");
            }
            let outcome = service
                .validate(ids, action, notes)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message("Failed to validate expenses")))?;
            tracing::info!(
                action = %outcome.action,
                submitted = outcome.submitted,
                processed = outcome.processed_count,
                capital_impact = %service.stats().capital_impact,
                "{}",
                outcome.message
            );
            Ok(())
        }
    }
}

async fn watch(service: Arc<ExpenseValidationService>, config: &ClientConfig) -> anyhow::Result<()> {
    let mut changes = service.subscribe();
    let Some(poll) = activate(service.clone(), config.poll_interval).await else {
        match service.last_error() {
            Some(error) => anyhow::bail!(error),
            None => {
                tracing::info!("Signed-in user cannot validate expenses; nothing to watch");
                return Ok(());
            }
        }
    };

    let mut last_loaded_at = None;
    log_snapshot(&service, &mut last_loaded_at);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                tracing::info!("Shutting down");
                break;
            }
            _ = poll.stopped() => {
                log_snapshot(&service, &mut last_loaded_at);
                tracing::info!("Polling ended; exiting");
                break;
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                log_snapshot(&service, &mut last_loaded_at);
            }
        }
    }

    poll.stop();
    poll.join().await;
    Ok(())
}

fn log_snapshot(
    service: &ExpenseValidationService,
    last_loaded_at: &mut Option<chrono::DateTime<chrono::Utc>>,
) {
    let view = service.snapshot();
    if view.last_loaded_at == *last_loaded_at {
        return;
    }
    *last_loaded_at = view.last_loaded_at;

    tracing::info!(
        pending = view.stats.pending_count,
        total = %view.stats.pending_amount,
        approved_today = view.stats.approved_today,
        rejected_today = view.stats.rejected_today,
        "Pending expenses refreshed"
    );
    for group in service.group_by_category() {
        tracing::info!(
            category = %group.label,
            count = group.len(),
            total = %group.total(),
            "Category"
        );
    }
}

fn load_dotenv_from_repo_root() {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");
    bursar_client::config::load_dotenv(&repo_root);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_arguments_means_watch() {
        assert_eq!(parse_args(args(&[])).unwrap(), Command::Watch);
        assert_eq!(parse_args(args(&["watch"])).unwrap(), Command::Watch);
    }

    #[test]
    fn parses_batch_with_notes() {
        let command = parse_args(args(&["reject", "e1", "--notes", "duplicate", "e2"])).unwrap();
        assert_eq!(
            command,
            Command::Validate {
                action: ValidationAction::Reject,
                ids: vec![ExpenseId::from("e1"), ExpenseId::from("e2")],
                notes: Some("duplicate".to_string()),
            }
        );
    }

    #[test]
    fn rejects_unknown_command_and_missing_ids() {
        assert!(parse_args(args(&["delete", "e1"])).is_err());
        assert!(parse_args(args(&["approve"])).is_err());
        assert!(parse_args(args(&["approve", "e1", "--notes"])).is_err());
    }
}
