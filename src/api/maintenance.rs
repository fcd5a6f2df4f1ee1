//! Age-based sweep of the published audio directory
//!
//! Best-effort cleanup: a sweep racing a publish is accepted, since an
//! artifact can only be deleted once it is older than the threshold.

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use super::ApiState;
use super::chat::ChatError;

/// Default artifact age threshold in hours
const DEFAULT_MAX_AGE_HOURS: u64 = 24;

/// Query parameters for `GET /cleanup`
#[derive(Debug, Deserialize)]
pub(super) struct CleanupParams {
    #[serde(default = "default_max_age_hours")]
    max_age_hours: u64,
}

const fn default_max_age_hours() -> u64 {
    DEFAULT_MAX_AGE_HOURS
}

/// Handle `GET /cleanup`
pub(super) async fn cleanup(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<CleanupParams>,
) -> Result<Json<serde_json::Value>, ChatError> {
    let deleted = sweep(&state.audio_dir, params.max_age_hours)
        .map_err(|e| ChatError::Internal(format!("cleanup failed: {e}")))?;

    Ok(Json(serde_json::json!({
        "message": format!("Deleted {deleted} old audio files")
    })))
}

/// Delete `.wav` artifacts in `dir` older than `max_age_hours`
///
/// A missing directory counts as empty. Returns the number of deletions.
///
/// # Errors
///
/// Returns error if the directory cannot be scanned or a file cannot be
/// removed
pub fn sweep(dir: &Path, max_age_hours: u64) -> io::Result<usize> {
    sweep_at(dir, max_age_hours, SystemTime::now())
}

fn sweep_at(dir: &Path, max_age_hours: u64, now: SystemTime) -> io::Result<usize> {
    let max_age = Duration::from_secs(max_age_hours.saturating_mul(3600));

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut deleted = 0;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("wav") {
            continue;
        }

        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let Ok(modified) = metadata.modified() else {
            continue;
        };

        // A file modified "in the future" has age zero
        let age = now.duration_since(modified).unwrap_or_default();
        if age > max_age {
            std::fs::remove_file(&path)?;
            deleted += 1;
            tracing::debug!(path = %path.display(), "deleted expired audio artifact");
        }
    }

    tracing::info!(deleted, max_age_hours, "audio sweep complete");
    Ok(deleted)
}
