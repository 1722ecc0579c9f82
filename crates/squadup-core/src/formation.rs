//! Starting line-up validation and the bench substitution heuristic
//!
//! The first [`STARTING_XI`] players of a selection start; the rest sit on
//! the bench. [`auto_fix_formation`] repairs the line-up by swapping single
//! starters with bench players and never changes squad membership.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::player::{Player, PlayerId};
use crate::position::{Position, PositionCounts};
use crate::rules::{MIN_STARTING_DEFENDERS, MIN_STARTING_FORWARDS, STARTING_GOALKEEPERS, STARTING_XI};

/// A broken line-up constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormationViolation {
    #[error("Starting XI must have exactly 1 goalkeeper (has {found})")]
    GoalkeeperCount { found: usize },

    #[error("Starting XI needs at least 3 defenders (has {found})")]
    TooFewDefenders { found: usize },

    #[error("Starting XI needs at least 1 forward")]
    NoForward,
}

impl FormationViolation {
    pub const fn code(&self) -> &'static str {
        match self {
            FormationViolation::GoalkeeperCount { .. } => "GOALKEEPER_COUNT",
            FormationViolation::TooFewDefenders { .. } => "TOO_FEW_DEFENDERS",
            FormationViolation::NoForward => "NO_FORWARD",
        }
    }
}

/// DEF-MID-FWD shape of a line-up, shown as `4-4-2`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Formation {
    pub defenders: usize,
    pub midfielders: usize,
    pub forwards: usize,
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.defenders, self.midfielders, self.forwards)
    }
}

pub fn formation(starting: &[Player]) -> Formation {
    let counts = PositionCounts::tally(starting.iter().map(|p| p.position));
    Formation {
        defenders: counts.defenders,
        midfielders: counts.midfielders,
        forwards: counts.forwards,
    }
}

/// List the constraints `starting` breaks; empty means the line-up is legal
pub fn validate_formation(starting: &[Player]) -> Vec<FormationViolation> {
    let counts = PositionCounts::tally(starting.iter().map(|p| p.position));
    let mut violations = Vec::new();

    if counts.goalkeepers != STARTING_GOALKEEPERS {
        violations.push(FormationViolation::GoalkeeperCount {
            found: counts.goalkeepers,
        });
    }
    if counts.defenders < MIN_STARTING_DEFENDERS {
        violations.push(FormationViolation::TooFewDefenders {
            found: counts.defenders,
        });
    }
    if counts.forwards < MIN_STARTING_FORWARDS {
        violations.push(FormationViolation::NoForward);
    }

    violations
}

/// One bench player traded with one starter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Swap {
    pub promoted: PlayerId,
    pub demoted: PlayerId,
}

/// Result of [`auto_fix_formation`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    /// Same players as the input, starters first
    pub players: Vec<Player>,
    pub swaps: Vec<Swap>,
    /// Constraints no bench player could repair
    pub remaining: Vec<FormationViolation>,
}

impl FixOutcome {
    pub fn starting(&self) -> &[Player] {
        &self.players[..self.players.len().min(STARTING_XI)]
    }

    pub fn bench(&self) -> &[Player] {
        &self.players[self.players.len().min(STARTING_XI)..]
    }

    pub fn is_valid(&self) -> bool {
        self.remaining.is_empty()
    }
}

/// Repartition `selection` into a legal starting XI and bench
///
/// Goalkeepers are fixed first, then defenders, then forwards. Each later
/// step only demotes starters whose loss cannot break an earlier step:
///
/// - missing goalkeeper: the first bench goalkeeper replaces the first
///   starting midfielder, or the first starter when no midfielder starts
/// - extra goalkeepers: every one after the first swaps with a bench
///   outfielder
/// - too few defenders: bench defenders replace starting midfielders, then
///   starting forwards
/// - no forward: the first bench forward replaces the first starting
///   midfielder, or a defender while more than three defenders start
///
/// When the bench has nobody suitable the constraint is left broken and
/// reported in [`FixOutcome::remaining`].
pub fn auto_fix_formation(selection: &[Player]) -> FixOutcome {
    let mut lineup = Lineup {
        split: selection.len().min(STARTING_XI),
        players: selection.to_vec(),
        swaps: Vec::new(),
    };

    lineup.fix_goalkeepers();
    lineup.fix_defenders();
    lineup.fix_forwards();

    let remaining = validate_formation(&lineup.players[..lineup.split]);

    FixOutcome {
        players: lineup.players,
        swaps: lineup.swaps,
        remaining,
    }
}

struct Lineup {
    players: Vec<Player>,
    split: usize,
    swaps: Vec<Swap>,
}

impl Lineup {
    fn starting_count(&self, position: Position) -> usize {
        self.players[..self.split]
            .iter()
            .filter(|p| p.position == position)
            .count()
    }

    fn first_starter(&self, position: Position) -> Option<usize> {
        (0..self.split).find(|&i| self.players[i].position == position)
    }

    fn bench_indices(&self, keep: impl Fn(&Player) -> bool) -> Vec<usize> {
        (self.split..self.players.len())
            .filter(|&i| keep(&self.players[i]))
            .collect()
    }

    fn swap(&mut self, starter: usize, sub: usize) {
        self.swaps.push(Swap {
            promoted: self.players[sub].id,
            demoted: self.players[starter].id,
        });
        self.players.swap(starter, sub);
    }

    fn fix_goalkeepers(&mut self) {
        let goalkeepers = self.starting_count(Position::Goalkeeper);

        if goalkeepers == 0 {
            let sub = self.bench_indices(|p| p.position == Position::Goalkeeper);
            let starter = self
                .first_starter(Position::Midfielder)
                .or_else(|| (0..self.split).next());
            if let (Some(&sub), Some(starter)) = (sub.first(), starter) {
                self.swap(starter, sub);
            }
        } else if goalkeepers > STARTING_GOALKEEPERS {
            // keep the first goalkeeper, bench the others
            let extra: Vec<usize> = (0..self.split)
                .filter(|&i| self.players[i].position == Position::Goalkeeper)
                .skip(STARTING_GOALKEEPERS)
                .collect();
            let outfield = self.bench_indices(|p| p.position != Position::Goalkeeper);

            for (starter, sub) in extra.into_iter().zip(outfield) {
                self.swap(starter, sub);
            }
        }
    }

    fn fix_defenders(&mut self) {
        let mut defenders = self.starting_count(Position::Defender);
        if defenders >= MIN_STARTING_DEFENDERS {
            return;
        }

        for sub in self.bench_indices(|p| p.position == Position::Defender) {
            if defenders >= MIN_STARTING_DEFENDERS {
                break;
            }
            let starter = self
                .first_starter(Position::Midfielder)
                .or_else(|| self.first_starter(Position::Forward));
            let Some(starter) = starter else {
                break;
            };
            self.swap(starter, sub);
            defenders += 1;
        }
    }

    fn fix_forwards(&mut self) {
        if self.starting_count(Position::Forward) >= MIN_STARTING_FORWARDS {
            return;
        }

        let Some(&sub) = self
            .bench_indices(|p| p.position == Position::Forward)
            .first()
        else {
            return;
        };

        let spare_defender = self.starting_count(Position::Defender) > MIN_STARTING_DEFENDERS;
        let starter = self.first_starter(Position::Midfielder).or_else(|| {
            spare_defender
                .then(|| self.first_starter(Position::Defender))
                .flatten()
        });

        if let Some(starter) = starter {
            self.swap(starter, sub);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Price;

    fn player(id: i32, position: Position) -> Player {
        Player {
            id: PlayerId(id),
            name: format!("Player {}", id),
            club: format!("Club {}", id),
            position,
            price: Price::from_tenths(50),
            nationality: "England".to_string(),
            jersey_number: None,
        }
    }

    /// Build a selection from position codes, ids counting from 1
    fn lineup(codes: &str) -> Vec<Player> {
        codes
            .split_whitespace()
            .enumerate()
            .map(|(i, code)| player(i as i32 + 1, code.parse().unwrap()))
            .collect()
    }

    fn ids(players: &[Player]) -> Vec<i32> {
        let mut ids: Vec<i32> = players.iter().map(|p| p.id.0).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_valid_formation_has_no_violations() {
        let starting = lineup("GK DEF DEF DEF DEF MID MID MID MID FWD FWD");
        assert!(validate_formation(&starting).is_empty());
        assert_eq!(formation(&starting).to_string(), "4-4-2");
    }

    #[test]
    fn test_validate_formation_lists_every_violation() {
        let starting = lineup("DEF DEF MID MID MID MID MID MID MID MID MID");
        let violations = validate_formation(&starting);

        assert_eq!(
            violations,
            vec![
                FormationViolation::GoalkeeperCount { found: 0 },
                FormationViolation::TooFewDefenders { found: 2 },
                FormationViolation::NoForward,
            ]
        );
        assert_eq!(violations[2].to_string(), "Starting XI needs at least 1 forward");
    }

    #[test]
    fn test_two_goalkeepers_starting_is_a_violation() {
        let starting = lineup("GK GK DEF DEF DEF MID MID MID MID FWD FWD");
        assert_eq!(
            validate_formation(&starting),
            vec![FormationViolation::GoalkeeperCount { found: 2 }]
        );
    }

    #[test]
    fn test_auto_fix_leaves_valid_lineup_untouched() {
        let squad = lineup("GK DEF DEF DEF DEF MID MID MID MID FWD FWD GK DEF MID FWD");
        let outcome = auto_fix_formation(&squad);

        assert!(outcome.swaps.is_empty());
        assert!(outcome.is_valid());
        assert_eq!(outcome.players, squad);
    }

    #[test]
    fn test_auto_fix_brings_in_bench_goalkeeper() {
        let squad = lineup("DEF DEF DEF DEF MID MID MID MID MID FWD FWD GK GK DEF FWD");
        let outcome = auto_fix_formation(&squad);

        let starting_gks = outcome
            .starting()
            .iter()
            .filter(|p| p.position == Position::Goalkeeper)
            .count();
        assert_eq!(starting_gks, 1);
        assert!(outcome.is_valid());
        assert_eq!(
            outcome.swaps,
            vec![Swap {
                promoted: PlayerId(12),
                demoted: PlayerId(5),
            }]
        );
    }

    #[test]
    fn test_goalkeeper_fix_falls_back_to_first_starter() {
        let squad = lineup("DEF DEF DEF DEF DEF FWD FWD FWD DEF FWD DEF GK MID MID MID");
        let outcome = auto_fix_formation(&squad);

        assert!(outcome.is_valid());
        assert_eq!(
            outcome.swaps,
            vec![Swap {
                promoted: PlayerId(12),
                demoted: PlayerId(1),
            }]
        );
    }

    #[test]
    fn test_auto_fix_benches_extra_goalkeeper() {
        let squad = lineup("GK GK DEF DEF DEF MID MID MID MID FWD FWD DEF DEF MID FWD");
        let outcome = auto_fix_formation(&squad);

        assert!(outcome.is_valid());
        assert_eq!(outcome.starting()[0].id, PlayerId(1));
        assert_eq!(outcome.starting()[1].position, Position::Defender);
        assert!(outcome.bench().iter().any(|p| p.id == PlayerId(2)));
    }

    #[test]
    fn test_auto_fix_pulls_defenders_for_midfielders() {
        let squad = lineup("GK DEF MID MID MID MID MID FWD FWD FWD DEF DEF DEF DEF GK");
        let outcome = auto_fix_formation(&squad);

        assert!(outcome.is_valid());
        assert_eq!(formation(outcome.starting()).to_string(), "3-4-3");
        assert_eq!(outcome.swaps.len(), 1);
    }

    #[test]
    fn test_auto_fix_pulls_forward_without_breaking_defence() {
        let squad = lineup("GK DEF DEF DEF MID MID MID MID MID DEF DEF FWD FWD FWD GK");
        let outcome = auto_fix_formation(&squad);

        assert!(outcome.is_valid());
        let shape = formation(outcome.starting());
        assert_eq!(shape.forwards, 1);
        assert_eq!(shape.defenders, 5);
        assert_eq!(shape.midfielders, 4);
    }

    #[test]
    fn test_auto_fix_repairs_all_three_in_order() {
        // no keeper, two defenders, no forward in the first eleven
        let squad = lineup("DEF DEF MID MID MID MID MID MID MID MID MID GK GK DEF FWD");
        let outcome = auto_fix_formation(&squad);

        assert!(outcome.is_valid(), "remaining: {:?}", outcome.remaining);
        assert_eq!(outcome.swaps.len(), 3);
        assert_eq!(formation(outcome.starting()).to_string(), "3-6-1");
        assert_eq!(ids(&outcome.players), ids(&squad));
    }

    #[test]
    fn test_auto_fix_reports_unrepairable_constraint() {
        // nobody on the bench can keep goal
        let squad = lineup("DEF DEF DEF DEF MID MID MID MID MID FWD FWD DEF MID FWD FWD");
        let outcome = auto_fix_formation(&squad);

        assert!(!outcome.is_valid());
        assert_eq!(
            outcome.remaining,
            vec![FormationViolation::GoalkeeperCount { found: 0 }]
        );
        assert!(outcome.swaps.is_empty());
        assert_eq!(outcome.players, squad);
    }

    #[test]
    fn test_auto_fix_handles_short_selection() {
        let squad = lineup("GK DEF DEF");
        let outcome = auto_fix_formation(&squad);

        assert_eq!(outcome.starting().len(), 3);
        assert!(outcome.bench().is_empty());
        assert_eq!(
            outcome.remaining,
            vec![
                FormationViolation::TooFewDefenders { found: 2 },
                FormationViolation::NoForward,
            ]
        );
    }
}
