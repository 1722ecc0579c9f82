//! Captain and vice-captain designation
//!
//! A [`Squad`] is an ordered selection where at most one player holds each
//! armband and no player holds both. Transitions return a new value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::player::{Player, PlayerId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptaincyError {
    #[error("Player {0} is not in the squad")]
    NotInSquad(PlayerId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadEntry {
    #[serde(flatten)]
    pub player: Player,
    #[serde(default)]
    pub is_captain: bool,
    #[serde(default)]
    pub is_vice_captain: bool,
}

impl SquadEntry {
    pub fn new(player: Player) -> Self {
        Self {
            player,
            is_captain: false,
            is_vice_captain: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Squad {
    entries: Vec<SquadEntry>,
}

impl Squad {
    /// Wrap players with the default armbands: first captain, second vice
    pub fn from_players(players: Vec<Player>) -> Self {
        let entries = players
            .into_iter()
            .enumerate()
            .map(|(i, player)| SquadEntry {
                player,
                is_captain: i == 0,
                is_vice_captain: i == 1,
            })
            .collect();
        Self { entries }
    }

    /// Wrap entries as stored, normalising them so each armband has at most
    /// one holder and nobody holds both. The first holder wins.
    pub fn from_entries(entries: Vec<SquadEntry>) -> Self {
        let mut captain_seen = false;
        let mut vice_seen = false;
        let entries = entries
            .into_iter()
            .map(|mut entry| {
                entry.is_captain = entry.is_captain && !captain_seen;
                captain_seen |= entry.is_captain;
                entry.is_vice_captain =
                    entry.is_vice_captain && !entry.is_captain && !vice_seen;
                vice_seen |= entry.is_vice_captain;
                entry
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[SquadEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<SquadEntry> {
        self.entries
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> + '_ {
        self.entries.iter().map(|e| &e.player)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn captain(&self) -> Option<&Player> {
        self.entries
            .iter()
            .find(|e| e.is_captain)
            .map(|e| &e.player)
    }

    pub fn vice_captain(&self) -> Option<&Player> {
        self.entries
            .iter()
            .find(|e| e.is_vice_captain)
            .map(|e| &e.player)
    }

    /// Hand the captaincy to `id`; a vice-captain promoted this way loses
    /// the vice armband
    pub fn set_captain(&self, id: PlayerId) -> Result<Squad, CaptaincyError> {
        self.ensure_member(id)?;
        let entries = self
            .entries
            .iter()
            .cloned()
            .map(|mut entry| {
                let target = entry.player.id == id;
                entry.is_captain = target;
                if target {
                    entry.is_vice_captain = false;
                }
                entry
            })
            .collect();
        Ok(Squad { entries })
    }

    /// Hand the vice-captaincy to `id`; a captain moved this way loses the
    /// captain armband
    pub fn set_vice_captain(&self, id: PlayerId) -> Result<Squad, CaptaincyError> {
        self.ensure_member(id)?;
        let entries = self
            .entries
            .iter()
            .cloned()
            .map(|mut entry| {
                let target = entry.player.id == id;
                entry.is_vice_captain = target;
                if target {
                    entry.is_captain = false;
                }
                entry
            })
            .collect();
        Ok(Squad { entries })
    }

    fn ensure_member(&self, id: PlayerId) -> Result<(), CaptaincyError> {
        if self.entries.iter().any(|e| e.player.id == id) {
            Ok(())
        } else {
            Err(CaptaincyError::NotInSquad(id))
        }
    }
}
