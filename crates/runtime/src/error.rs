//! Errors surfaced by the session API.

use combat_core::{
    CombatError, CombatPhase, EncounterError, ErrorSeverity, StateError,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no handler registered for phase {0}")]
    NoHandler(CombatPhase),

    #[error("invalid encounter")]
    InvalidEncounter(#[from] EncounterError),

    #[error("font '{0}' is required for phase overlays but is not in the content table")]
    MissingUiFont(String),

    #[error("operation requires phase {expected}, session is in {actual}")]
    WrongPhase {
        expected: CombatPhase,
        actual: CombatPhase,
    },

    #[error(transparent)]
    State(#[from] StateError),
}

impl CombatError for SessionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            SessionError::NoHandler(_) => ErrorSeverity::Internal,
            SessionError::InvalidEncounter(_) | SessionError::MissingUiFont(_) => {
                ErrorSeverity::Validation
            }
            SessionError::WrongPhase { .. } => ErrorSeverity::Recoverable,
            SessionError::State(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            SessionError::NoHandler(_) => "SESSION_NO_HANDLER",
            SessionError::InvalidEncounter(_) => "SESSION_INVALID_ENCOUNTER",
            SessionError::MissingUiFont(_) => "SESSION_MISSING_UI_FONT",
            SessionError::WrongPhase { .. } => "SESSION_WRONG_PHASE",
            SessionError::State(_) => "SESSION_STATE",
        }
    }
}
