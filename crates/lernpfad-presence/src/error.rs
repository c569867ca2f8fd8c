use lernpfad_core::{ActivityId, StoreError, TargetId, ThemeId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PresenceError {
    #[error("Target not found: {0}")]
    TargetNotFound(TargetId),
    #[error("Theme not found: {0}")]
    ThemeNotFound(ThemeId),
    #[error("Activity not found: {0}")]
    ActivityNotFound(ActivityId),
    #[error("Activity {0} is already finished")]
    ActivityFinished(ActivityId),
    #[error("Activity {activity} is still inside target {target}")]
    AlreadyInTarget {
        activity: ActivityId,
        target: TargetId,
    },
    #[error("Activity {activity} is not inside target {target}")]
    NotInTarget {
        activity: ActivityId,
        target: TargetId,
    },
    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Snapshot (de)serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, PresenceError>;
