//! JSON-lines event replay.
//!
//! Each non-blank line is one [`ReplayLine`]:
//!
//! ```text
//! {"roster": {"type": "attendees_joined", "attendees": [...]}}
//! {"session": {"type": "audio_session_started", "reconnecting": false}}
//! ```
//!
//! Lines starting with `#` are comments. After every applied line a
//! [`ReplayFrame`] is produced from the state the line left behind.

use crate::actors::SessionController;
use crate::errors::RosterError;
use crate::events::{RosterEvent, SessionEvent};
use crate::lifecycle::SessionStatus;
use crate::projector::{self, LocalRenderRecord, RenderRecord};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayLine {
    Roster(RosterEvent),
    Session(SessionEvent),
}

/// Render state after one replayed line.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayFrame {
    pub line: usize,
    pub version: u64,
    pub attendees: Vec<RenderRecord>,
    pub local: LocalRenderRecord,
    pub status: SessionStatus,
}

/// Parse one input line. Blank lines and comments yield `None`.
pub fn parse_line(line_no: usize, text: &str) -> Result<Option<ReplayLine>, RosterError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| RosterError::Replay(format!("line {line_no}: {e}")))
}

/// Feed every line of `reader` through `controller`, calling `on_frame` after
/// each. Stops at the first malformed line. Returns the number of lines applied.
pub async fn replay<R, F>(
    reader: R,
    controller: &SessionController,
    mut on_frame: F,
) -> Result<usize, RosterError>
where
    R: AsyncBufRead + Unpin,
    F: FnMut(ReplayFrame),
{
    let mut lines = reader.lines();
    let mut line_no = 0;
    let mut applied = 0;

    while let Some(text) = lines
        .next_line()
        .await
        .map_err(|e| RosterError::Replay(format!("read failed: {e}")))?
    {
        line_no += 1;
        let Some(line) = parse_line(line_no, &text)? else {
            continue;
        };

        match line {
            ReplayLine::Roster(event) => controller.apply(event).await?,
            ReplayLine::Session(event) => controller.apply_session(event).await?,
        }
        applied += 1;

        let snapshot = controller.reconciler().snapshot().await?;
        let status = controller.status().await?;
        debug!(
            target: "roster.replay",
            line = line_no,
            version = snapshot.version,
            phase = status.phase.as_str(),
            "line applied"
        );

        on_frame(ReplayFrame {
            line: line_no,
            version: snapshot.version,
            attendees: projector::project(&snapshot),
            local: projector::project_local(&snapshot.local),
            status,
        });
    }

    Ok(applied)
}
