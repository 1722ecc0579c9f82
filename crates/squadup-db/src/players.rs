//! Player catalog queries and seeding

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use squadup_catalog::NewPlayer;
use squadup_core::{Player, PlayerId, Position};

use crate::entities::player::{self, PlayerPosition};
use crate::entities::user_team_player;
use crate::StoreError;

/// Optional catalog listing filters; `None` matches everything
#[derive(Debug, Clone, Default)]
pub struct PlayerFilter {
    pub position: Option<Position>,
    pub club: Option<String>,
}

/// What a catalog reseed changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub removed: usize,
    /// Players missing from the new catalog but kept because a saved squad
    /// still holds them
    pub retained: usize,
}

/// Catalog players ordered by position (GK first) then name
pub async fn list_players<C: ConnectionTrait>(
    db: &C,
    filter: &PlayerFilter,
) -> Result<Vec<Player>, StoreError> {
    let mut query = player::Entity::find();

    if let Some(position) = filter.position {
        query = query.filter(player::Column::Position.eq(PlayerPosition::from(position)));
    }
    if let Some(club) = &filter.club {
        query = query.filter(player::Column::Club.eq(club.as_str()));
    }

    let mut players: Vec<Player> = query
        .order_by_asc(player::Column::Name)
        .all(db)
        .await?
        .iter()
        .map(player::Model::to_player)
        .collect();

    players.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.name.cmp(&b.name)));

    Ok(players)
}

pub async fn find_player<C: ConnectionTrait>(
    db: &C,
    id: PlayerId,
) -> Result<Option<Player>, StoreError> {
    Ok(player::Entity::find_by_id(id.0)
        .one(db)
        .await?
        .map(|m| m.to_player()))
}

/// Fetch players in the order of `ids`
///
/// Fails with [`StoreError::UnknownPlayers`] naming every id that is not in
/// the catalog.
pub async fn find_players<C: ConnectionTrait>(
    db: &C,
    ids: &[PlayerId],
) -> Result<Vec<Player>, StoreError> {
    let wanted: Vec<i32> = ids.iter().map(|id| id.0).collect();

    let found: HashMap<i32, Player> = player::Entity::find()
        .filter(player::Column::Id.is_in(wanted))
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.id, m.to_player()))
        .collect();

    let mut missing = Vec::new();
    let mut players = Vec::with_capacity(ids.len());
    for id in ids {
        match found.get(&id.0) {
            Some(player) => players.push(player.clone()),
            None if !missing.contains(id) => missing.push(*id),
            None => {}
        }
    }

    if !missing.is_empty() {
        return Err(StoreError::UnknownPlayers(missing));
    }

    Ok(players)
}

pub async fn count_players<C: ConnectionTrait>(db: &C) -> Result<u64, StoreError> {
    Ok(player::Entity::find().count(db).await?)
}

/// Replace the catalog with `players` in a single transaction
///
/// Rows are matched on (name, club) so existing ids, and the saved squads
/// that reference them, survive a reseed. Players absent from the new
/// catalog are deleted unless a saved squad still holds them.
pub async fn replace_catalog(
    db: &DatabaseConnection,
    players: &[NewPlayer],
) -> Result<SeedReport, StoreError> {
    let txn = db.begin().await?;
    let now = Utc::now();
    let mut report = SeedReport::default();

    let mut existing: HashMap<(String, String), player::Model> = player::Entity::find()
        .all(&txn)
        .await?
        .into_iter()
        .map(|m| ((m.name.clone(), m.club.clone()), m))
        .collect();

    let mut fresh = Vec::new();

    for new in players {
        let key = (new.name.clone(), new.club.clone());
        let position = PlayerPosition::from(new.position);
        let price_tenths = new.price.tenths();
        let jersey_number = new.jersey_number.map(i32::from);

        match existing.remove(&key) {
            Some(model)
                if model.position == position
                    && model.price_tenths == price_tenths
                    && model.nationality == new.nationality
                    && model.jersey_number == jersey_number =>
            {
                report.unchanged += 1;
            }
            Some(model) => {
                let mut active: player::ActiveModel = model.into();
                active.position = Set(position);
                active.price_tenths = Set(price_tenths);
                active.nationality = Set(new.nationality.clone());
                active.jersey_number = Set(jersey_number);
                active.updated_at = Set(now);
                active.update(&txn).await?;
                report.updated += 1;
            }
            None => {
                fresh.push(player::ActiveModel {
                    id: NotSet,
                    name: Set(new.name.clone()),
                    club: Set(new.club.clone()),
                    position: Set(position),
                    price_tenths: Set(price_tenths),
                    nationality: Set(new.nationality.clone()),
                    jersey_number: Set(jersey_number),
                    created_at: Set(now),
                    updated_at: Set(now),
                });
            }
        }
    }

    if !fresh.is_empty() {
        report.inserted = fresh.len();
        player::Entity::insert_many(fresh)
            .exec_without_returning(&txn)
            .await?;
    }

    // whatever is left was dropped from the catalog
    let absent: Vec<i32> = existing.values().map(|m| m.id).collect();
    if !absent.is_empty() {
        let referenced: HashSet<i32> = user_team_player::Entity::find()
            .filter(user_team_player::Column::PlayerId.is_in(absent.clone()))
            .all(&txn)
            .await?
            .into_iter()
            .map(|m| m.player_id)
            .collect();

        let removable: Vec<i32> = absent
            .into_iter()
            .filter(|id| !referenced.contains(id))
            .collect();

        report.retained = referenced.len();
        if !removable.is_empty() {
            let result = player::Entity::delete_many()
                .filter(player::Column::Id.is_in(removable))
                .exec(&txn)
                .await?;
            report.removed = result.rows_affected as usize;
        }
    }

    txn.commit().await?;

    debug!("Catalog reseed report: {:?}", report);
    info!(
        "Player catalog replaced: {} inserted, {} updated, {} removed",
        report.inserted, report.updated, report.removed
    );

    Ok(report)
}
