//! Player Catalog seed data
//!
//! The catalog ships as an embedded transfer-market snapshot of the
//! 2025/26 Premier League. Loading it converts every entry into a
//! [`NewPlayer`] with a fantasy position and price; ids are assigned by
//! the store when the rows are seeded.

pub mod pricing;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use squadup_core::{Position, Price};

pub use pricing::{map_api_position, map_position, market_value_to_price, MINIMUM_PRICE};

const SEASON_2025: &str = include_str!("../data/premier_league_2025.json");

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Malformed catalog data: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Player {name} is listed twice for {club}")]
    DuplicatePlayer { name: String, club: String },

    #[error("Club {0} has no players")]
    EmptyClub(String),
}

/// A catalog player that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlayer {
    pub name: String,
    pub club: String,
    pub position: Position,
    pub price: Price,
    pub nationality: String,
    pub jersey_number: Option<u8>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    pub season: String,
    pub players: Vec<NewPlayer>,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Player count per club, sorted by club name
    pub fn clubs(&self) -> BTreeMap<&str, usize> {
        let mut clubs = BTreeMap::new();
        for player in &self.players {
            *clubs.entry(player.club.as_str()).or_insert(0) += 1;
        }
        clubs
    }

    pub fn by_position(&self, position: Position) -> impl Iterator<Item = &NewPlayer> + '_ {
        self.players.iter().filter(move |p| p.position == position)
    }
}

#[derive(Deserialize)]
struct RawSeason {
    season: String,
    clubs: Vec<RawClub>,
}

#[derive(Deserialize)]
struct RawClub {
    club: String,
    players: Vec<RawPlayer>,
}

#[derive(Deserialize)]
struct RawPlayer {
    name: String,
    position: String,
    market_value: String,
    nationality: String,
}

/// The embedded 2025/26 Premier League catalog
pub fn season_2025() -> Result<Catalog, CatalogError> {
    parse_catalog(SEASON_2025)
}

/// Parse a transfer-market snapshot in the embedded data format
pub fn parse_catalog(json: &str) -> Result<Catalog, CatalogError> {
    let raw: RawSeason = serde_json::from_str(json)?;

    let mut seen = HashSet::new();
    let mut players = Vec::new();

    for club in raw.clubs {
        if club.players.is_empty() {
            return Err(CatalogError::EmptyClub(club.club));
        }

        for player in club.players {
            if !seen.insert((player.name.clone(), club.club.clone())) {
                return Err(CatalogError::DuplicatePlayer {
                    name: player.name,
                    club: club.club,
                });
            }

            players.push(NewPlayer {
                position: map_position(&player.position),
                price: market_value_to_price(&player.market_value),
                name: player.name,
                club: club.club.clone(),
                nationality: player.nationality,
                jersey_number: None,
            });
        }
    }

    Ok(Catalog {
        season: raw.season,
        players,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use squadup_core::rules::{BUDGET, MAX_PER_CLUB};

    fn find<'a>(catalog: &'a Catalog, name: &str) -> &'a NewPlayer {
        catalog
            .players
            .iter()
            .find(|p| p.name == name)
            .unwrap_or_else(|| panic!("{} missing from catalog", name))
    }

    #[test]
    fn test_season_2025_loads() {
        let catalog = season_2025().unwrap();

        assert_eq!(catalog.season, "2025/26");
        assert_eq!(catalog.len(), 518);
        assert_eq!(catalog.clubs().len(), 20);
        assert_eq!(catalog.clubs()["Manchester City"], 34);
    }

    #[test]
    fn test_season_2025_conversions() {
        let catalog = season_2025().unwrap();

        let ederson = find(&catalog, "Ederson");
        assert_eq!(ederson.position, Position::Goalkeeper);
        assert_eq!(ederson.price, Price::from_tenths(55));
        assert_eq!(ederson.club, "Manchester City");

        let rodri = find(&catalog, "Rodri");
        assert_eq!(rodri.position, Position::Midfielder);
        assert_eq!(rodri.price, Price::from_tenths(120));

        assert_eq!(find(&catalog, "Marcus Bettinelli").price, MINIMUM_PRICE);
    }

    #[test]
    fn test_season_2025_can_field_a_legal_squad() {
        let catalog = season_2025().unwrap();

        // cheapest players per position, respecting the club cap
        let mut clubs: BTreeMap<&str, usize> = BTreeMap::new();
        let mut total = Price::ZERO;
        for position in Position::ALL {
            let mut pool: Vec<&NewPlayer> = catalog.by_position(position).collect();
            pool.sort_by_key(|p| p.price);
            let mut picked = 0;
            for player in pool {
                if picked == position.squad_quota() {
                    break;
                }
                let count = clubs.entry(player.club.as_str()).or_insert(0);
                if *count < MAX_PER_CLUB {
                    *count += 1;
                    picked += 1;
                    total = total + player.price;
                }
            }
            assert_eq!(picked, position.squad_quota());
        }
        assert!(total <= BUDGET);
    }

    #[test]
    fn test_duplicate_player_is_rejected() {
        let json = r#"{"season":"x","clubs":[{"club":"Fulham","players":[
            {"name":"A","position":"Goalkeeper","market_value":"€1.00m","nationality":"England"},
            {"name":"A","position":"Goalkeeper","market_value":"€1.00m","nationality":"England"}
        ]}]}"#;

        let err = parse_catalog(json).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicatePlayer { .. }));
    }

    #[test]
    fn test_malformed_catalog_is_rejected() {
        assert!(matches!(
            parse_catalog("{\"season\":1}"),
            Err(CatalogError::Malformed(_))
        ));
    }
}
