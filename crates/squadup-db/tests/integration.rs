//! Integration tests for squadup-db
//!
//! Tests database operations with real SQLite in-memory database

use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait};
use uuid::Uuid;

use squadup_catalog::NewPlayer;
use squadup_core::{Player, PlayerId, Position, Price, Squad};
use squadup_db::entities::{user::UserRole, Session, UserTeam, UserTeamPlayer};
use squadup_db::{connect, migrate, players, squads, users, PlayerFilter, StoreError};

/// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    migrate(&db).await.expect("Failed to run migrations");

    db
}

fn new_player(name: &str, club: &str, position: Position, tenths: i32) -> NewPlayer {
    NewPlayer {
        name: name.to_string(),
        club: club.to_string(),
        position,
        price: Price::from_tenths(tenths),
        nationality: "England".to_string(),
        jersey_number: None,
    }
}

/// Thirty players, two legal squads' worth: 4 GK, 10 DEF, 10 MID, 6 FWD
fn catalog() -> Vec<NewPlayer> {
    let mut players = Vec::new();
    let layout = [
        (Position::Goalkeeper, 4),
        (Position::Defender, 10),
        (Position::Midfielder, 10),
        (Position::Forward, 6),
    ];
    let mut n = 0;
    for (position, count) in layout {
        for _ in 0..count {
            players.push(new_player(
                &format!("{} {}", position, n),
                &format!("Club {}", n % 10),
                position,
                50,
            ));
            n += 1;
        }
    }
    players
}

async fn seeded_db() -> DatabaseConnection {
    let db = setup_test_db().await;
    players::replace_catalog(&db, &catalog())
        .await
        .expect("Failed to seed catalog");
    db
}

async fn create_user(db: &DatabaseConnection, email: &str) -> Uuid {
    users::create_user(db, email, "$argon2id$fake", None, UserRole::User)
        .await
        .expect("Failed to create user")
        .id
}

/// Pick a 2/5/5/3 squad from the catalog, skipping the first `offset` of
/// each position
async fn pick_squad(db: &DatabaseConnection, offset: usize) -> Vec<Player> {
    let mut picked = Vec::new();
    for position in Position::ALL {
        let filter = PlayerFilter {
            position: Some(position),
            club: None,
        };
        let pool = players::list_players(db, &filter).await.unwrap();
        let start = offset * position.squad_quota();
        picked.extend(pool[start..start + position.squad_quota()].iter().cloned());
    }
    picked
}

#[tokio::test]
async fn test_database_connection() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let backend = db.get_database_backend();
    assert!(matches!(backend, sea_orm::DatabaseBackend::Sqlite));
}

#[tokio::test]
async fn test_migrations_run_successfully() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let result = migrate(&db).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_replace_catalog_inserts_players() {
    let db = setup_test_db().await;

    let report = players::replace_catalog(&db, &catalog()).await.unwrap();

    assert_eq!(report.inserted, 30);
    assert_eq!(report.updated, 0);
    assert_eq!(players::count_players(&db).await.unwrap(), 30);
}

#[tokio::test]
async fn test_list_players_orders_by_position_then_name() {
    let db = seeded_db().await;

    let all = players::list_players(&db, &PlayerFilter::default())
        .await
        .unwrap();

    assert_eq!(all.len(), 30);
    assert_eq!(all[0].position, Position::Goalkeeper);
    assert_eq!(all[29].position, Position::Forward);
    for pair in all.windows(2) {
        assert!(
            (pair[0].position, &pair[0].name) <= (pair[1].position, &pair[1].name),
            "{} listed before {}",
            pair[0].name,
            pair[1].name
        );
    }
}

#[tokio::test]
async fn test_list_players_filters() {
    let db = seeded_db().await;

    let forwards = players::list_players(
        &db,
        &PlayerFilter {
            position: Some(Position::Forward),
            club: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(forwards.len(), 6);
    assert!(forwards.iter().all(|p| p.position == Position::Forward));

    let club = players::list_players(
        &db,
        &PlayerFilter {
            position: None,
            club: Some("Club 3".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(club.len(), 3);
    assert!(club.iter().all(|p| p.club == "Club 3"));
}

#[tokio::test]
async fn test_find_players_keeps_request_order_and_reports_unknown() {
    let db = seeded_db().await;
    let all = players::list_players(&db, &PlayerFilter::default())
        .await
        .unwrap();

    let ids = [all[5].id, all[0].id];
    let found = players::find_players(&db, &ids).await.unwrap();
    assert_eq!(found[0].id, all[5].id);
    assert_eq!(found[1].id, all[0].id);

    let err = players::find_players(&db, &[all[0].id, PlayerId(9999)])
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::UnknownPlayers(ids) if ids == vec![PlayerId(9999)]));

    assert!(players::find_player(&db, PlayerId(9999)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_reseed_keeps_ids_and_updates_prices() {
    let db = seeded_db().await;
    let before = players::list_players(&db, &PlayerFilter::default())
        .await
        .unwrap();

    let mut next = catalog();
    next[0].price = Price::from_tenths(65);
    next.pop();
    next.push(new_player("Newcomer", "Club 0", Position::Forward, 45));

    let report = players::replace_catalog(&db, &next).await.unwrap();
    assert_eq!(report.inserted, 1);
    assert_eq!(report.updated, 1);
    assert_eq!(report.unchanged, 28);
    assert_eq!(report.removed, 1);
    assert_eq!(report.retained, 0);

    let after = players::list_players(&db, &PlayerFilter::default())
        .await
        .unwrap();
    let first = after.iter().find(|p| p.name == next[0].name).unwrap();
    let original = before.iter().find(|p| p.name == next[0].name).unwrap();
    assert_eq!(first.id, original.id);
    assert_eq!(first.price, Price::from_tenths(65));
}

#[tokio::test]
async fn test_reseed_retains_players_held_by_saved_squads() {
    let db = seeded_db().await;
    let user = create_user(&db, "keeper@example.com").await;
    let picked = pick_squad(&db, 0).await;
    squads::save_squad(&db, user, "Held", &Squad::from_players(picked.clone()))
        .await
        .unwrap();

    // drop one saved player and one unsaved player from the catalog
    let saved_name = picked[0].name.clone();
    let unsaved_name = "GK 3".to_string();
    let next: Vec<NewPlayer> = catalog()
        .into_iter()
        .filter(|p| p.name != saved_name && p.name != unsaved_name)
        .collect();

    let report = players::replace_catalog(&db, &next).await.unwrap();
    assert_eq!(report.removed, 1);
    assert_eq!(report.retained, 1);

    let loaded = squads::load_squad(&db, user).await.unwrap().unwrap();
    assert_eq!(loaded.squad.len(), 15);
}

#[tokio::test]
async fn test_load_squad_without_save_is_none() {
    let db = seeded_db().await;
    let user = create_user(&db, "nobody@example.com").await;

    assert!(squads::load_squad(&db, user).await.unwrap().is_none());
}

#[tokio::test]
async fn test_save_then_load_round_trip() {
    let db = seeded_db().await;
    let user = create_user(&db, "manager@example.com").await;
    let picked = pick_squad(&db, 0).await;

    let squad = Squad::from_players(picked.clone())
        .set_captain(picked[6].id)
        .unwrap();
    let team_id = squads::save_squad(&db, user, "Route One FC", &squad)
        .await
        .unwrap();

    let loaded = squads::load_squad(&db, user).await.unwrap().unwrap();
    assert_eq!(loaded.id, team_id);
    assert_eq!(loaded.team_name, "Route One FC");
    assert_eq!(loaded.user_id, user);

    let ids: Vec<PlayerId> = loaded.squad.players().map(|p| p.id).collect();
    let expected: Vec<PlayerId> = picked.iter().map(|p| p.id).collect();
    assert_eq!(ids, expected, "slot order survives the round trip");
    assert_eq!(loaded.squad.captain().map(|p| p.id), Some(picked[6].id));
    assert_eq!(loaded.squad.vice_captain().map(|p| p.id), Some(picked[1].id));
}

#[tokio::test]
async fn test_second_save_replaces_membership() {
    let db = seeded_db().await;
    let user = create_user(&db, "tinkerer@example.com").await;

    let first = pick_squad(&db, 0).await;
    let second = pick_squad(&db, 1).await;

    let first_id = squads::save_squad(&db, user, "Draft", &Squad::from_players(first.clone()))
        .await
        .unwrap();
    let second_id = squads::save_squad(&db, user, "Final", &Squad::from_players(second.clone()))
        .await
        .unwrap();

    // same team row, new name and members
    assert_eq!(first_id, second_id);
    assert_eq!(UserTeam::find().count(&db).await.unwrap(), 1);
    assert_eq!(UserTeamPlayer::find().count(&db).await.unwrap(), 15);

    let loaded = squads::load_squad(&db, user).await.unwrap().unwrap();
    assert_eq!(loaded.team_name, "Final");
    let mut loaded_ids: Vec<PlayerId> = loaded.squad.players().map(|p| p.id).collect();
    let mut second_ids: Vec<PlayerId> = second.iter().map(|p| p.id).collect();
    loaded_ids.sort();
    second_ids.sort();
    assert_eq!(loaded_ids, second_ids);
    assert!(first.iter().all(|p| !loaded_ids.contains(&p.id)));
}

#[tokio::test]
async fn test_save_with_unknown_player_keeps_previous_squad() {
    let db = seeded_db().await;
    let user = create_user(&db, "careful@example.com").await;
    let picked = pick_squad(&db, 0).await;
    squads::save_squad(&db, user, "Safe", &Squad::from_players(picked.clone()))
        .await
        .unwrap();

    let mut broken = pick_squad(&db, 1).await;
    broken[3].id = PlayerId(424242);
    let err = squads::save_squad(&db, user, "Broken", &Squad::from_players(broken))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::UnknownPlayers(ids) if ids == vec![PlayerId(424242)]));

    let loaded = squads::load_squad(&db, user).await.unwrap().unwrap();
    assert_eq!(loaded.team_name, "Safe");
    assert_eq!(loaded.squad.len(), 15);
}

#[tokio::test]
async fn test_failed_member_insert_rolls_back_whole_save() {
    let db = seeded_db().await;
    let user = create_user(&db, "rollback@example.com").await;
    let picked = pick_squad(&db, 0).await;
    squads::save_squad(&db, user, "Safe", &Squad::from_players(picked.clone()))
        .await
        .unwrap();

    // every id is known, so the old memberships are deleted before the
    // repeated player breaks the membership primary key
    let mut broken = pick_squad(&db, 1).await;
    broken[3] = broken[2].clone();
    let err = squads::save_squad(&db, user, "Broken", &Squad::from_players(broken))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Database(_)));

    let loaded = squads::load_squad(&db, user).await.unwrap().unwrap();
    assert_eq!(loaded.team_name, "Safe");
    let ids: Vec<PlayerId> = loaded.squad.players().map(|p| p.id).collect();
    let expected: Vec<PlayerId> = picked.iter().map(|p| p.id).collect();
    assert_eq!(ids, expected);
    assert_eq!(UserTeamPlayer::find().count(&db).await.unwrap(), 15);
}

#[tokio::test]
async fn test_full_name_is_optional() {
    let db = setup_test_db().await;

    let anonymous =
        users::create_user(&db, "anon@example.com", "$argon2id$fake", None, UserRole::User)
            .await
            .unwrap();
    assert_eq!(anonymous.full_name, None);

    let named = users::create_user(
        &db,
        "named@example.com",
        "$argon2id$fake",
        Some("Mikel".to_string()),
        UserRole::User,
    )
    .await
    .unwrap();
    let reloaded = users::find_user(&db, named.id).await.unwrap().unwrap();
    assert_eq!(reloaded.full_name.as_deref(), Some("Mikel"));
}

#[tokio::test]
async fn test_users_are_found_by_normalized_email() {
    let db = setup_test_db().await;
    let id = create_user(&db, "  Manager@Example.com ").await;

    let found = users::find_user_by_email(&db, "manager@example.COM")
        .await
        .unwrap()
        .expect("user not found");
    assert_eq!(found.id, id);
    assert_eq!(found.email, "manager@example.com");
    assert_eq!(found.role, UserRole::User);

    let promoted = users::set_user_role(&db, found, UserRole::Admin).await.unwrap();
    assert_eq!(promoted.role, UserRole::Admin);
    let reloaded = users::find_user(&db, id).await.unwrap().unwrap();
    assert_eq!(reloaded.role, UserRole::Admin);
}

#[tokio::test]
async fn test_duplicate_email_is_rejected_by_store() {
    let db = setup_test_db().await;
    create_user(&db, "twice@example.com").await;

    let result =
        users::create_user(&db, "TWICE@example.com", "$argon2id$fake", None, UserRole::User).await;
    assert!(matches!(result, Err(StoreError::DuplicateEmail(email)) if email == "twice@example.com"));
}

#[tokio::test]
async fn test_session_lifecycle() {
    let db = setup_test_db().await;
    let user = create_user(&db, "session@example.com").await;

    let session = users::create_session(&db, user, Utc::now() + Duration::hours(1))
        .await
        .unwrap();
    assert!(users::is_session_active(&db, session.id).await.unwrap());

    assert!(users::revoke_session(&db, session.id).await.unwrap());
    assert!(!users::is_session_active(&db, session.id).await.unwrap());
    // a second revoke is a no-op
    assert!(!users::revoke_session(&db, session.id).await.unwrap());

    let expired = users::create_session(&db, user, Utc::now() - Duration::minutes(1))
        .await
        .unwrap();
    assert!(!users::is_session_active(&db, expired.id).await.unwrap());
    assert!(!users::is_session_active(&db, Uuid::new_v4()).await.unwrap());
}

#[tokio::test]
async fn test_purge_expired_sessions() {
    let db = setup_test_db().await;
    let user = create_user(&db, "purge@example.com").await;
    let now = Utc::now();

    let live = users::create_session(&db, user, now + Duration::hours(1))
        .await
        .unwrap();
    let revoked = users::create_session(&db, user, now + Duration::hours(1))
        .await
        .unwrap();
    users::revoke_session(&db, revoked.id).await.unwrap();
    users::create_session(&db, user, now - Duration::minutes(5))
        .await
        .unwrap();

    assert_eq!(users::purge_expired_sessions(&db, now).await.unwrap(), 2);
    assert!(users::is_session_active(&db, live.id).await.unwrap());
    assert_eq!(Session::find().count(&db).await.unwrap(), 1);

    // nothing left to purge
    assert_eq!(users::purge_expired_sessions(&db, now).await.unwrap(), 0);
}
