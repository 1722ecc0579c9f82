//! Saved squads: one per user, replaced wholesale on every save

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

use squadup_core::{PlayerId, Squad, SquadEntry};

use crate::entities::{player, user_team, user_team_player};
use crate::StoreError;

#[derive(Debug, Clone)]
pub struct SavedSquad {
    pub id: Uuid,
    pub user_id: Uuid,
    pub team_name: String,
    /// Members in saved slot order, starting XI first
    pub squad: Squad,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Load the squad saved by `user_id`; `None` when they have not saved one
pub async fn load_squad<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Option<SavedSquad>, StoreError> {
    let Some(team) = user_team::Entity::find()
        .filter(user_team::Column::UserId.eq(user_id))
        .one(db)
        .await?
    else {
        debug!("No saved squad for user {}", user_id);
        return Ok(None);
    };

    let rows = user_team_player::Entity::find()
        .filter(user_team_player::Column::UserTeamId.eq(team.id))
        .order_by_asc(user_team_player::Column::Slot)
        .find_also_related(player::Entity)
        .all(db)
        .await?;

    let entries = rows
        .into_iter()
        .map(|(member, player)| {
            let player = player.ok_or_else(|| {
                StoreError::Corrupt(format!(
                    "squad {} references missing player {}",
                    team.id, member.player_id
                ))
            })?;
            Ok(SquadEntry {
                player: player.to_player(),
                is_captain: member.is_captain,
                is_vice_captain: member.is_vice_captain,
            })
        })
        .collect::<Result<Vec<_>, StoreError>>()?;

    Ok(Some(SavedSquad {
        id: team.id,
        user_id: team.user_id,
        team_name: team.team_name,
        squad: Squad::from_entries(entries),
        created_at: team.created_at,
        updated_at: team.updated_at,
    }))
}

/// Save `squad` as the only squad of `user_id` and return its id
///
/// The team row is upserted and its memberships are replaced inside one
/// transaction, so a failed save leaves the previous squad intact.
pub async fn save_squad(
    db: &DatabaseConnection,
    user_id: Uuid,
    team_name: &str,
    squad: &Squad,
) -> Result<Uuid, StoreError> {
    let txn = db.begin().await?;

    let ids: Vec<i32> = squad.players().map(|p| p.id.0).collect();
    let known: HashSet<i32> = player::Entity::find()
        .filter(player::Column::Id.is_in(ids.clone()))
        .all(&txn)
        .await?
        .into_iter()
        .map(|m| m.id)
        .collect();
    let missing: Vec<PlayerId> = ids
        .iter()
        .filter(|id| !known.contains(*id))
        .map(|&id| PlayerId(id))
        .collect();
    if !missing.is_empty() {
        // dropping the transaction rolls it back
        return Err(StoreError::UnknownPlayers(missing));
    }

    let now = Utc::now();
    let existing = user_team::Entity::find()
        .filter(user_team::Column::UserId.eq(user_id))
        .one(&txn)
        .await?;

    let team_id = match existing {
        Some(team) => {
            let id = team.id;
            let mut active: user_team::ActiveModel = team.into();
            active.team_name = Set(team_name.to_string());
            active.updated_at = Set(now);
            active.update(&txn).await?;
            id
        }
        None => {
            let id = Uuid::new_v4();
            user_team::ActiveModel {
                id: Set(id),
                user_id: Set(user_id),
                team_name: Set(team_name.to_string()),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
            id
        }
    };

    user_team_player::Entity::delete_many()
        .filter(user_team_player::Column::UserTeamId.eq(team_id))
        .exec(&txn)
        .await?;

    let members: Vec<user_team_player::ActiveModel> = squad
        .entries()
        .iter()
        .enumerate()
        .map(|(slot, entry)| user_team_player::ActiveModel {
            user_team_id: Set(team_id),
            player_id: Set(entry.player.id.0),
            is_captain: Set(entry.is_captain),
            is_vice_captain: Set(entry.is_vice_captain),
            slot: Set(slot as i32),
        })
        .collect();

    if !members.is_empty() {
        user_team_player::Entity::insert_many(members)
            .exec_without_returning(&txn)
            .await?;
    }

    txn.commit().await?;

    info!(
        "Saved squad {} ({} players) for user {}",
        team_id,
        squad.len(),
        user_id
    );

    Ok(team_id)
}
