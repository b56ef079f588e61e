//! Note domain model.
//!
//! # Responsibility
//! - Define the persisted note record and its write-time validation.
//! - Provide the creation-age label rendered by the edit view.
//!
//! # Invariants
//! - `id` is assigned by storage and never changes afterwards.
//! - `timestamp` is the creation time and is never rewritten by edits.
//! - Empty `title`/`text` are valid.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned note identifier (SQLite rowid).
pub type NoteId = i64;

/// Placeholder id carried by notes that were not persisted yet.
pub const UNSAVED_NOTE_ID: NoteId = 0;

const MS_PER_SECOND: i64 = 1_000;
const SECONDS_PER_MINUTE: i64 = 60;
const MINUTES_PER_HOUR: i64 = 60;
const HOURS_PER_DAY: i64 = 24;

/// One user note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique id assigned on insert.
    pub id: NoteId,
    pub title: String,
    pub text: String,
    /// Creation time in Unix epoch milliseconds.
    pub timestamp: i64,
}

/// Validation errors raised before a note is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    NegativeTimestamp(i64),
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeTimestamp(value) => {
                write!(f, "timestamp must be non-negative epoch ms, got {value}")
            }
        }
    }
}

impl Error for NoteValidationError {}

impl Note {
    /// Builds a not-yet-persisted note stamped with the current time.
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_timestamp(title, text, now_epoch_ms())
    }

    /// Builds a not-yet-persisted note with an explicit creation time.
    pub fn with_timestamp(
        title: impl Into<String>,
        text: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            id: UNSAVED_NOTE_ID,
            title: title.into(),
            text: text.into(),
            timestamp,
        }
    }

    /// Checks write-time invariants.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.timestamp < 0 {
            return Err(NoteValidationError::NegativeTimestamp(self.timestamp));
        }
        Ok(())
    }

    /// Returns a short "time since creation" label relative to `now_ms`.
    ///
    /// Timestamps in the future are reported as `just now`.
    pub fn age_label(&self, now_ms: i64) -> String {
        let seconds = now_ms.saturating_sub(self.timestamp).max(0) / MS_PER_SECOND;
        let minutes = seconds / SECONDS_PER_MINUTE;
        let hours = minutes / MINUTES_PER_HOUR;
        let days = hours / HOURS_PER_DAY;

        if seconds < SECONDS_PER_MINUTE {
            "just now".to_string()
        } else if minutes < MINUTES_PER_HOUR {
            format!("{minutes} min ago")
        } else if hours < HOURS_PER_DAY {
            format!("{hours} h ago")
        } else {
            format!("{days} d ago")
        }
    }
}

/// Unsaved edit input kept alive after a failed save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub text: String,
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
