use sea_orm::DbErr;
use squadup_core::PlayerId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Unknown players: {}", join_ids(.0))]
    UnknownPlayers(Vec<PlayerId>),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Stored data is inconsistent: {0}")]
    Corrupt(String),
}

fn join_ids(ids: &[PlayerId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
