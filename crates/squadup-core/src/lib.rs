//! Squad Builder rules for a fifteen-player fantasy football squad
//!
//! Everything in this crate is pure and synchronous: the caller owns the
//! selection and every operation returns a new value instead of mutating
//! shared state.

pub mod captaincy;
pub mod formation;
pub mod player;
pub mod position;
pub mod rules;
pub mod selection;

pub use captaincy::{CaptaincyError, Squad, SquadEntry};
pub use formation::{
    auto_fix_formation, formation, validate_formation, FixOutcome, Formation, FormationViolation,
    Swap,
};
pub use player::{Player, PlayerId, Price};
pub use position::{ParsePositionError, Position, PositionCounts};
pub use selection::{
    can_add, stats, validate_squad, Rejection, Selection, SelectionError, SquadStats,
    SquadViolation,
};
