use lernpfad_core::{ActivityId, StoreError, TargetId, ThemeId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("Activity not found: {0}")]
    ActivityNotFound(ActivityId),
    #[error("Theme not found: {0}")]
    ThemeNotFound(ThemeId),
    #[error("Target not found: {0}")]
    TargetNotFound(TargetId),
    #[error("Target {target} has no membership in theme {theme}")]
    MembershipNotFound { target: TargetId, theme: ThemeId },
    #[error("Target {0} has a learn time of zero")]
    ZeroLearnTime(TargetId),
    #[error("Target {0} is occupied but has a capacity of zero")]
    ZeroCapacity(TargetId),
    #[error("Theme {0} has no virtual weight on its root edges")]
    ZeroVirtualWeight(ThemeId),
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Grobe Einteilung der Fehler für Aufrufer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Referenzierte Aktivität, Thema, Lernpunkt oder Zugehörigkeit fehlt.
    NotFound,
    /// Stammdaten ergeben einen Nenner von `0`; die Daten müssen korrigiert werden.
    InvalidConfiguration,
    /// Der Kollaborateur selbst ist ausgefallen.
    Store,
}

impl RecommendError {
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            RecommendError::ActivityNotFound(_)
            | RecommendError::ThemeNotFound(_)
            | RecommendError::TargetNotFound(_)
            | RecommendError::MembershipNotFound { .. } => ErrorClass::NotFound,
            RecommendError::ZeroLearnTime(_)
            | RecommendError::ZeroCapacity(_)
            | RecommendError::ZeroVirtualWeight(_)
            | RecommendError::InvalidConfig(_) => ErrorClass::InvalidConfiguration,
            RecommendError::Store(_) => ErrorClass::Store,
        }
    }
}

pub type Result<T> = std::result::Result<T, RecommendError>;
