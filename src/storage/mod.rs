//! Session persistence.
//!
//! The whole session (log, ledger, period) is written as one pretty-printed
//! JSON document after every mutating command and read back on startup.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

use crate::engine::session::Session;

/// Default session file path.
pub const DEFAULT_STATE_FILE: &str = "studio_session.json";

/// Save the session to a JSON file.
pub fn save_session(session: &Session, path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_STATE_FILE);
    let json = serde_json::to_string_pretty(session).context("Failed to serialise session")?;

    std::fs::write(path, &json).with_context(|| format!("Failed to write session to {path}"))?;

    debug!(
        path,
        rounds = session.history.len(),
        period = %session.period,
        "Session saved"
    );
    Ok(())
}

/// Load a session from a JSON file.
/// Returns None if the file doesn't exist.
pub fn load_session(path: Option<&str>) -> Result<Option<Session>> {
    let path = path.unwrap_or(DEFAULT_STATE_FILE);

    if !Path::new(path).exists() {
        info!(path, "No saved session found, starting fresh");
        return Ok(None);
    }

    let json =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read session from {path}"))?;
    let session: Session =
        serde_json::from_str(&json).with_context(|| format!("Failed to parse session from {path}"))?;

    info!(
        path,
        id = %session.id,
        rounds = session.history.len(),
        configured = session.is_configured(),
        "Session restored from disk"
    );

    Ok(Some(session))
}

/// Delete the session file.
pub fn delete_session(path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_STATE_FILE);
    if Path::new(path).exists() {
        std::fs::remove_file(path).with_context(|| format!("Failed to delete session file {path}"))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
