//! Player catalog rows

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum PlayerPosition {
    #[sea_orm(string_value = "GK")]
    Goalkeeper,
    #[sea_orm(string_value = "DEF")]
    Defender,
    #[sea_orm(string_value = "MID")]
    Midfielder,
    #[sea_orm(string_value = "FWD")]
    Forward,
}

impl From<squadup_core::Position> for PlayerPosition {
    fn from(position: squadup_core::Position) -> Self {
        use squadup_core::Position;
        match position {
            Position::Goalkeeper => PlayerPosition::Goalkeeper,
            Position::Defender => PlayerPosition::Defender,
            Position::Midfielder => PlayerPosition::Midfielder,
            Position::Forward => PlayerPosition::Forward,
        }
    }
}

impl From<PlayerPosition> for squadup_core::Position {
    fn from(position: PlayerPosition) -> Self {
        use squadup_core::Position;
        match position {
            PlayerPosition::Goalkeeper => Position::Goalkeeper,
            PlayerPosition::Defender => Position::Defender,
            PlayerPosition::Midfielder => Position::Midfielder,
            PlayerPosition::Forward => Position::Forward,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "players")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Unique together with `club`
    pub name: String,

    pub club: String,

    pub position: PlayerPosition,

    /// Price in tenths of a million
    pub price_tenths: i32,

    pub nationality: String,

    pub jersey_number: Option<i32>,

    pub created_at: ChronoDateTimeUtc,

    pub updated_at: ChronoDateTimeUtc,
}

impl Model {
    pub fn to_player(&self) -> squadup_core::Player {
        squadup_core::Player {
            id: squadup_core::PlayerId(self.id),
            name: self.name.clone(),
            club: self.club.clone(),
            position: self.position.into(),
            price: squadup_core::Price::from_tenths(self.price_tenths),
            nationality: self.nationality.clone(),
            jersey_number: self.jersey_number.and_then(|n| u8::try_from(n).ok()),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_team_player::Entity")]
    Memberships,
}

impl Related<super::user_team_player::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
