//! Playing positions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The four positions a fantasy player can be listed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "DEF")]
    Defender,
    #[serde(rename = "MID")]
    Midfielder,
    #[serde(rename = "FWD")]
    Forward,
}

impl Position {
    /// All positions in catalog display order
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    /// Short wire code (`GK`, `DEF`, `MID`, `FWD`)
    pub const fn code(self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }

    /// Exact number of players a complete squad holds at this position
    pub const fn squad_quota(self) -> usize {
        match self {
            Position::Goalkeeper => 2,
            Position::Defender => 5,
            Position::Midfielder => 5,
            Position::Forward => 3,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown position '{0}' (expected GK, DEF, MID or FWD)")]
pub struct ParsePositionError(pub String);

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GK" => Ok(Position::Goalkeeper),
            "DEF" => Ok(Position::Defender),
            "MID" => Ok(Position::Midfielder),
            "FWD" => Ok(Position::Forward),
            _ => Err(ParsePositionError(s.to_string())),
        }
    }
}

/// Number of players per position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionCounts {
    #[serde(rename = "GK")]
    pub goalkeepers: usize,
    #[serde(rename = "DEF")]
    pub defenders: usize,
    #[serde(rename = "MID")]
    pub midfielders: usize,
    #[serde(rename = "FWD")]
    pub forwards: usize,
}

impl PositionCounts {
    pub fn tally<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = Position>,
    {
        let mut counts = Self::default();
        for position in positions {
            *counts.slot_mut(position) += 1;
        }
        counts
    }

    pub const fn get(&self, position: Position) -> usize {
        match position {
            Position::Goalkeeper => self.goalkeepers,
            Position::Defender => self.defenders,
            Position::Midfielder => self.midfielders,
            Position::Forward => self.forwards,
        }
    }

    fn slot_mut(&mut self, position: Position) -> &mut usize {
        match position {
            Position::Goalkeeper => &mut self.goalkeepers,
            Position::Defender => &mut self.defenders,
            Position::Midfielder => &mut self.midfielders,
            Position::Forward => &mut self.forwards,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotas_fill_a_fifteen_man_squad() {
        let total: usize = Position::ALL.iter().map(|p| p.squad_quota()).sum();
        assert_eq!(total, 15);
    }

    #[test]
    fn test_parse_position_codes() {
        assert_eq!("GK".parse::<Position>().unwrap(), Position::Goalkeeper);
        assert_eq!("def".parse::<Position>().unwrap(), Position::Defender);
        assert_eq!(" MID ".parse::<Position>().unwrap(), Position::Midfielder);
        assert_eq!("FWD".parse::<Position>().unwrap(), Position::Forward);

        let err = "Striker".parse::<Position>().unwrap_err();
        assert!(err.to_string().contains("Striker"));
    }

    #[test]
    fn test_position_serializes_as_code() {
        let json = serde_json::to_string(&Position::Forward).unwrap();
        assert_eq!(json, "\"FWD\"");

        let back: Position = serde_json::from_str("\"GK\"").unwrap();
        assert_eq!(back, Position::Goalkeeper);
    }

    #[test]
    fn test_tally_counts_each_position() {
        let counts = PositionCounts::tally([
            Position::Goalkeeper,
            Position::Defender,
            Position::Defender,
            Position::Forward,
        ]);

        assert_eq!(counts.get(Position::Goalkeeper), 1);
        assert_eq!(counts.get(Position::Defender), 2);
        assert_eq!(counts.get(Position::Midfielder), 0);
        assert_eq!(counts.get(Position::Forward), 1);
    }
}
