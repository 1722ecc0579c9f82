//! Database entities

pub mod player;
pub mod session;
pub mod user;
pub mod user_team;
pub mod user_team_player;

pub use player::Entity as Player;
pub use session::Entity as Session;
pub use user::Entity as User;
pub use user_team::Entity as UserTeam;
pub use user_team_player::Entity as UserTeamPlayer;

pub mod prelude {
    pub use super::player::Entity as Player;
    pub use super::session::Entity as Session;
    pub use super::user::Entity as User;
    pub use super::user_team::Entity as UserTeam;
    pub use super::user_team_player::Entity as UserTeamPlayer;
}
