//! In-progress squad selection: add checks, derived statistics and the
//! complete-squad composition check run before saving

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use thiserror::Error;

use crate::player::{Player, PlayerId, Price};
use crate::position::{Position, PositionCounts};
use crate::rules::{BUDGET, MAX_PER_CLUB, SQUAD_SIZE};

/// Why a candidate cannot join the current selection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Player already selected")]
    DuplicatePlayer { id: PlayerId },

    #[error("Cannot afford {name} ({price}). Budget remaining: {remaining}")]
    BudgetExceeded {
        name: String,
        price: Price,
        remaining: Price,
    },

    #[error("Maximum {quota} {position} players allowed")]
    PositionFull { position: Position, quota: usize },

    #[error("Maximum {limit} players from {club} allowed")]
    ClubLimitReached { club: String, limit: usize },

    #[error("Maximum {limit} players allowed")]
    SquadFull { limit: usize },
}

/// Every rule a candidate failed, in evaluation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    reasons: Vec<SelectionError>,
}

impl Rejection {
    pub fn reasons(&self) -> &[SelectionError] {
        &self.reasons
    }

    pub fn into_reasons(self) -> Vec<SelectionError> {
        self.reasons
    }

    pub fn messages(&self) -> Vec<String> {
        self.reasons.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

impl std::error::Error for Rejection {}

/// Derived numbers for a selection, recomputed from scratch on each call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SquadStats {
    pub player_count: usize,
    pub total_cost: Price,
    pub budget_remaining: Price,
    pub position_counts: PositionCounts,
    pub club_counts: BTreeMap<String, usize>,
}

pub fn stats(selection: &[Player]) -> SquadStats {
    let total_cost: Price = selection.iter().map(|p| p.price).sum();

    let mut club_counts = BTreeMap::new();
    for player in selection {
        *club_counts.entry(player.club.clone()).or_insert(0) += 1;
    }

    SquadStats {
        player_count: selection.len(),
        total_cost,
        budget_remaining: BUDGET - total_cost,
        position_counts: PositionCounts::tally(selection.iter().map(|p| p.position)),
        club_counts,
    }
}

/// Decide whether `candidate` may be appended to `selection`
///
/// A duplicate is reported on its own; otherwise every failing rule is
/// collected so the caller can show all of them at once.
pub fn can_add(candidate: &Player, selection: &[Player]) -> Result<(), Rejection> {
    if selection.iter().any(|p| p.id == candidate.id) {
        return Err(Rejection {
            reasons: vec![SelectionError::DuplicatePlayer { id: candidate.id }],
        });
    }

    let current = stats(selection);
    let mut reasons = Vec::new();

    if current.budget_remaining < candidate.price {
        reasons.push(SelectionError::BudgetExceeded {
            name: candidate.name.clone(),
            price: candidate.price,
            remaining: current.budget_remaining,
        });
    }

    let quota = candidate.position.squad_quota();
    if current.position_counts.get(candidate.position) >= quota {
        reasons.push(SelectionError::PositionFull {
            position: candidate.position,
            quota,
        });
    }

    let from_club = current
        .club_counts
        .get(&candidate.club)
        .copied()
        .unwrap_or(0);
    if from_club >= MAX_PER_CLUB {
        reasons.push(SelectionError::ClubLimitReached {
            club: candidate.club.clone(),
            limit: MAX_PER_CLUB,
        });
    }

    if selection.len() >= SQUAD_SIZE {
        reasons.push(SelectionError::SquadFull { limit: SQUAD_SIZE });
    }

    if reasons.is_empty() {
        Ok(())
    } else {
        Err(Rejection { reasons })
    }
}

/// A selection held in memory while the user builds a squad
///
/// Commands return a new value; the receiver is never changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Selection {
    players: Vec<Player>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap players loaded from storage without re-running the add checks
    pub fn from_players(players: Vec<Player>) -> Self {
        Self { players }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn into_players(self) -> Vec<Player> {
        self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    pub fn stats(&self) -> SquadStats {
        stats(&self.players)
    }

    pub fn check(&self, candidate: &Player) -> Result<(), Rejection> {
        can_add(candidate, &self.players)
    }

    pub fn with_player(&self, candidate: Player) -> Result<Selection, Rejection> {
        self.check(&candidate)?;
        let mut players = self.players.clone();
        players.push(candidate);
        Ok(Selection { players })
    }

    pub fn without_player(&self, id: PlayerId) -> Selection {
        Selection {
            players: self
                .players
                .iter()
                .filter(|p| p.id != id)
                .cloned()
                .collect(),
        }
    }

    /// Remove the player if selected, otherwise try to add them
    pub fn toggle(&self, player: Player) -> Result<Selection, Rejection> {
        if self.contains(player.id) {
            Ok(self.without_player(player.id))
        } else {
            self.with_player(player)
        }
    }
}

/// A way a complete squad breaks the composition rules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SquadViolation {
    #[error("Team must have exactly {expected} players (got {actual})")]
    WrongSize { expected: usize, actual: usize },

    #[error("Player {id} appears more than once")]
    DuplicatePlayer { id: PlayerId },

    #[error("Team must have exactly {expected} {position} players (got {actual})")]
    PositionCount {
        position: Position,
        expected: usize,
        actual: usize,
    },

    #[error("Team costs {total}, over the {budget} budget")]
    OverBudget { total: Price, budget: Price },

    #[error("Maximum {limit} players from {club} allowed (got {count})")]
    ClubLimit {
        club: String,
        count: usize,
        limit: usize,
    },
}

/// Check a finished squad against size, quota, budget and club rules
pub fn validate_squad(players: &[Player]) -> Result<(), Vec<SquadViolation>> {
    let mut violations = Vec::new();

    if players.len() != SQUAD_SIZE {
        violations.push(SquadViolation::WrongSize {
            expected: SQUAD_SIZE,
            actual: players.len(),
        });
    }

    let mut seen = HashSet::new();
    for player in players {
        if !seen.insert(player.id) {
            violations.push(SquadViolation::DuplicatePlayer { id: player.id });
        }
    }

    let summary = stats(players);

    for position in Position::ALL {
        let actual = summary.position_counts.get(position);
        let expected = position.squad_quota();
        if actual != expected {
            violations.push(SquadViolation::PositionCount {
                position,
                expected,
                actual,
            });
        }
    }

    if summary.budget_remaining.is_negative() {
        violations.push(SquadViolation::OverBudget {
            total: summary.total_cost,
            budget: BUDGET,
        });
    }

    for (club, &count) in &summary.club_counts {
        if count > MAX_PER_CLUB {
            violations.push(SquadViolation::ClubLimit {
                club: club.clone(),
                count,
                limit: MAX_PER_CLUB,
            });
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
