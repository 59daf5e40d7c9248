//! Combat session orchestration.
//!
//! [`CombatSession`] owns the authoritative [`CombatState`](combat_core::CombatState),
//! swaps phase handlers as the encounter moves through its phases, gates input
//! on the active cinematic, and records a player-facing [`CombatLog`].
//!
//! - [`session`] hosts the session and its builder
//! - [`handlers`] decides which handler runs each phase
//! - [`log`] keeps the bounded combat log
//! - [`error`] defines the session error type
pub mod error;
pub mod handlers;
pub mod log;
pub mod session;

pub use error::{Result, SessionError};
pub use handlers::{HandlerFactory, StandardHandlers};
pub use log::{CombatLog, LogEntry};
pub use session::{CombatSession, EncounterOutcome, SessionBuilder, SharedContent};
