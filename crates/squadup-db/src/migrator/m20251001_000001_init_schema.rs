//! Initial schema: accounts, sessions, the player catalog and saved squads

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // 1. users
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::Email, 255).not_null().unique_key())
                    .col(string_len(User::PasswordHash, 255).not_null())
                    .col(string_len_null(User::FullName, 255))
                    .col(string_len(User::Role, 32).not_null().default("user"))
                    .col(boolean(User::IsActive).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(User::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(User::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 2. sessions
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Session::Table)
                    .if_not_exists()
                    .col(uuid(Session::Id).primary_key())
                    .col(uuid(Session::UserId).not_null())
                    .col(
                        timestamp_with_time_zone(Session::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone(Session::ExpiresAt).not_null())
                    .col(timestamp_with_time_zone_null(Session::RevokedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sessions_user_id")
                            .from(Session::Table, Session::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_sessions_user_id")
                    .table(Session::Table)
                    .col(Session::UserId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 3. players
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Player::Table)
                    .if_not_exists()
                    .col(pk_auto(Player::Id))
                    .col(string_len(Player::Name, 255).not_null())
                    .col(string_len(Player::Club, 255).not_null())
                    .col(string_len(Player::Position, 8).not_null())
                    .col(integer(Player::PriceTenths).not_null())
                    .col(string_len(Player::Nationality, 255).not_null())
                    .col(integer_null(Player::JerseyNumber))
                    .col(
                        timestamp_with_time_zone(Player::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Player::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_players_name_club")
                    .table(Player::Table)
                    .col(Player::Name)
                    .col(Player::Club)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_players_position")
                    .table(Player::Table)
                    .col(Player::Position)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 4. user_teams
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(UserTeam::Table)
                    .if_not_exists()
                    .col(uuid(UserTeam::Id).primary_key())
                    .col(uuid(UserTeam::UserId).not_null().unique_key())
                    .col(string_len(UserTeam::TeamName, 255).not_null())
                    .col(
                        timestamp_with_time_zone(UserTeam::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(UserTeam::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_teams_user_id")
                            .from(UserTeam::Table, UserTeam::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 5. user_team_players
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(UserTeamPlayer::Table)
                    .if_not_exists()
                    .col(uuid(UserTeamPlayer::UserTeamId).not_null())
                    .col(integer(UserTeamPlayer::PlayerId).not_null())
                    .col(
                        boolean(UserTeamPlayer::IsCaptain)
                            .not_null()
                            .default(false),
                    )
                    .col(
                        boolean(UserTeamPlayer::IsViceCaptain)
                            .not_null()
                            .default(false),
                    )
                    .col(integer(UserTeamPlayer::Slot).not_null())
                    .primary_key(
                        Index::create()
                            .col(UserTeamPlayer::UserTeamId)
                            .col(UserTeamPlayer::PlayerId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_team_players_user_team_id")
                            .from(UserTeamPlayer::Table, UserTeamPlayer::UserTeamId)
                            .to(UserTeam::Table, UserTeam::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_team_players_player_id")
                            .from(UserTeamPlayer::Table, UserTeamPlayer::PlayerId)
                            .to(Player::Table, Player::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_team_players_player_id")
                    .table(UserTeamPlayer::Table)
                    .col(UserTeamPlayer::PlayerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserTeamPlayer::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserTeam::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Player::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Session::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Email,
    PasswordHash,
    FullName,
    Role,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Session {
    #[sea_orm(iden = "sessions")]
    Table,
    Id,
    UserId,
    CreatedAt,
    ExpiresAt,
    RevokedAt,
}

#[derive(DeriveIden)]
enum Player {
    #[sea_orm(iden = "players")]
    Table,
    Id,
    Name,
    Club,
    Position,
    PriceTenths,
    Nationality,
    JerseyNumber,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserTeam {
    #[sea_orm(iden = "user_teams")]
    Table,
    Id,
    UserId,
    TeamName,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserTeamPlayer {
    #[sea_orm(iden = "user_team_players")]
    Table,
    UserTeamId,
    PlayerId,
    IsCaptain,
    IsViceCaptain,
    Slot,
}
