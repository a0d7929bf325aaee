use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistics about a live transcription session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Whether recording is currently active
    pub is_active: bool,

    /// When the session was created
    pub started_at: DateTime<Utc>,

    /// Total duration in seconds
    pub duration_secs: f64,

    /// Number of completed turns in the history
    pub turns_completed: usize,

    /// Latest user-facing error, if any
    pub last_error: Option<String>,
}
