use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{
    utils::{iso_timestamp_utc, truncate_text},
    Result,
};

const AUDIT_MAX_TEXT: usize = 500;

#[derive(Clone, Debug, Serialize)]
pub struct AuditEvent {
    pub timestamp: String,
    pub event: String,
    pub requester: String,
    pub command: String,
    pub outcome: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

impl AuditEvent {
    pub fn command_ok(requester: &str, command: &str) -> Self {
        Self {
            timestamp: iso_timestamp_utc(),
            event: "command".to_string(),
            requester: requester.to_string(),
            command: command.to_string(),
            outcome: "ok".to_string(),
            fault: None,
        }
    }

    pub fn command_fault(requester: &str, command: &str, fault: &str) -> Self {
        Self {
            timestamp: iso_timestamp_utc(),
            event: "command".to_string(),
            requester: requester.to_string(),
            command: command.to_string(),
            outcome: "fault".to_string(),
            fault: Some(fault.to_string()),
        }
    }
}

/// Append-only JSON-lines log of dispatched commands.
#[derive(Clone, Debug)]
pub struct AuditLogger {
    path: PathBuf,
}

impl AuditLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, mut event: AuditEvent) -> Result<()> {
        // Need texts are free-form; keep lines bounded.
        event.command = truncate_text(&event.command, AUDIT_MAX_TEXT);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let line = serde_json::to_string(&event)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}
