//! Roster replay
//!
//! Replays a JSON-lines log of engine notifications through the roster core
//! and prints the resulting render state, one JSON object per applied line.
//!
//! # Input
//!
//! `ROSTER_REPLAY_FILE` names the log; stdin is read when it is unset. See
//! [`roster_core::replay`] for the line format.
//!
//! # Output
//!
//! Frames go to stdout, logs to stderr (`ROSTER_JSON_LOGS=true` for JSON).

#![warn(clippy::pedantic)]

use std::sync::Arc;
use std::time::Duration;

use roster_core::actors::{SessionController, SessionOutcome};
use roster_core::config::Config;
use roster_core::replay;
use roster_core::surface::LoggingSurfaceBinder;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let json_logs = config.observability.json_logs;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("roster_core={}", config.observability.log_level).into()
            }),
        )
        .with(json_logs.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    info!(
        target: "roster.replay",
        local_attendee_id = ?config.local_attendee_id,
        mute_batch_policy = ?config.mute_batch_policy,
        mailbox_capacity = config.mailbox_capacity,
        input = config.replay_file.as_deref().unwrap_or("<stdin>"),
        "Starting roster replay"
    );

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &config.replay_file {
        Some(path) => {
            let file = tokio::fs::File::open(path).await.map_err(|e| {
                error!(target: "roster.replay", path = %path, error = %e, "Failed to open replay file");
                e
            })?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let controller = SessionController::spawn("replay", &config, Arc::new(LoggingSurfaceBinder));

    let result = replay::replay(reader, &controller, |frame| {
        match serde_json::to_string(&frame) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!(target: "roster.replay", line = frame.line, error = %e, "Failed to encode frame"),
        }
    })
    .await;

    if let SessionOutcome::Ended(reason) = *controller.outcome().borrow() {
        info!(target: "roster.replay", reason = ?reason, "Session ended during replay");
    }

    controller.shutdown(SHUTDOWN_DEADLINE).await?;

    match result {
        Ok(applied) => {
            info!(target: "roster.replay", applied, "Replay complete");
            Ok(())
        }
        Err(e) => {
            error!(target: "roster.replay", error = %e, "Replay failed");
            Err(e.into())
        }
    }
}
