//! Fixed squad-building rules

use crate::player::Price;

/// Total spend allowed across the fifteen players (£100.0m)
pub const BUDGET: Price = Price::from_tenths(1000);

/// Players in a complete squad
pub const SQUAD_SIZE: usize = 15;

/// Players in the starting line-up; the rest of the squad is the bench
pub const STARTING_XI: usize = 11;

/// Players allowed from any single club
pub const MAX_PER_CLUB: usize = 3;

/// Goalkeepers the starting line-up must contain
pub const STARTING_GOALKEEPERS: usize = 1;

pub const MIN_STARTING_DEFENDERS: usize = 3;

pub const MIN_STARTING_FORWARDS: usize = 1;

/// Team name used when a squad is saved without one
pub const DEFAULT_TEAM_NAME: &str = "My Fantasy Team";
