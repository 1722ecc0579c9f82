//! Squad membership: which catalog players a saved squad holds

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_team_players")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_team_id: Uuid,

    #[sea_orm(primary_key, auto_increment = false)]
    pub player_id: i32,

    pub is_captain: bool,

    pub is_vice_captain: bool,

    /// Position in the squad; slots 0..11 are the starting XI
    pub slot: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user_team::Entity",
        from = "Column::UserTeamId",
        to = "super::user_team::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    UserTeam,

    #[sea_orm(
        belongs_to = "super::player::Entity",
        from = "Column::PlayerId",
        to = "super::player::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Player,
}

impl Related<super::user_team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserTeam.def()
    }
}

impl Related<super::player::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Player.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
