//! Combat data model and contracts shared across the tactics workspace.
//!
//! `combat-core` defines the canonical combat state, encounter definitions,
//! the victory/defeat predicate tree, turn actions, and the render and
//! content-lookup contracts the cinematic engine and phase handlers draw
//! through. It owns no frame loop and no pixels.
pub mod action;
pub mod config;
pub mod encounter;
pub mod error;
pub mod event;
pub mod predicate;
pub mod render;
pub mod state;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use action::{ActionMenuItem, TurnAction};
pub use config::CombatConfig;
pub use encounter::{CombatEncounter, EncounterError, IntroScript};
pub use error::{CombatError, ErrorSeverity};
pub use event::{PhaseEventData, PhaseEventResult};
pub use predicate::{CombatPredicate, PredicateError};
pub use render::{
    ContentError, ContentLookup, DitherMask, FontAtlas, FontLoad, FontSource, PixelRect,
    RenderContext, RenderSurface, Rgba, SpriteDef,
};
pub use state::{
    CombatMap, CombatPhase, CombatState, CombatStateJson, CombatUnit, MapCell, PlacedUnit,
    Position, StateError, Team, UnitId, UnitManifest, UnitStats,
};
