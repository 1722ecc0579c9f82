use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use squadup_core::{FormationViolation, Player, SquadEntry, SquadStats, Swap};
use squadup_db::entities::user;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Players in the catalog
    pub catalog_players: u64,
}

/// Error envelope returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    /// Error message
    pub error: String,
    /// Error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Individual rule failures, when there are several
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            success: false,
            error: error.into(),
            code: Some(code.to_string()),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}

// ============================================================================
// Catalog Models
// ============================================================================

/// Fantasy position code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PositionCode {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "DEF")]
    Defender,
    #[serde(rename = "MID")]
    Midfielder,
    #[serde(rename = "FWD")]
    Forward,
}

impl From<squadup_core::Position> for PositionCode {
    fn from(position: squadup_core::Position) -> Self {
        use squadup_core::Position;
        match position {
            Position::Goalkeeper => PositionCode::Goalkeeper,
            Position::Defender => PositionCode::Defender,
            Position::Midfielder => PositionCode::Midfielder,
            Position::Forward => PositionCode::Forward,
        }
    }
}

/// Catalog player
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlayerView {
    pub id: i32,
    pub name: String,
    pub club: String,
    pub position: PositionCode,
    /// Price in millions (e.g. 7.5)
    pub price: f64,
    pub nationality: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jersey_number: Option<u8>,
}

impl From<&Player> for PlayerView {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.0,
            name: player.name.clone(),
            club: player.club.clone(),
            position: player.position.into(),
            price: player.price.as_millions(),
            nationality: player.nationality.clone(),
            jersey_number: player.jersey_number,
        }
    }
}

/// Catalog listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlayerList {
    pub success: bool,
    pub players: Vec<PlayerView>,
    pub total: usize,
}

/// Query parameters for the catalog listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PlayerQuery {
    /// GK, DEF, MID or FWD
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    /// Exact club name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club: Option<String>,
}

/// Squad-building rules
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RulesResponse {
    /// Budget in millions
    pub budget: f64,
    pub squad_size: usize,
    pub starting_xi: usize,
    pub max_per_club: usize,
    /// Exact squad count per position
    pub position_quotas: BTreeMap<String, usize>,
    pub starting_goalkeepers: usize,
    pub min_starting_defenders: usize,
    pub min_starting_forwards: usize,
}

/// Result of a catalog reseed
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SeedResponse {
    pub success: bool,
    pub message: String,
    pub season: String,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub removed: usize,
    pub retained: usize,
}

// ============================================================================
// Squad Builder Models
// ============================================================================

/// A selection, as an ordered list of catalog player ids
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SelectionRequest {
    pub player_ids: Vec<i32>,
}

/// Can `candidate_id` join the selection?
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckRequest {
    pub candidate_id: i32,
    #[serde(default)]
    pub player_ids: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckResponse {
    pub success: bool,
    pub allowed: bool,
    /// One message per failed rule
    pub errors: Vec<String>,
}

/// Derived statistics for a selection
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub success: bool,
    pub player_count: usize,
    /// Millions
    pub total_cost: f64,
    /// Millions; negative when over budget
    pub budget_remaining: f64,
    pub position_counts: BTreeMap<String, usize>,
    pub club_counts: BTreeMap<String, usize>,
}

impl From<SquadStats> for StatsResponse {
    fn from(stats: SquadStats) -> Self {
        let position_counts = squadup_core::Position::ALL
            .iter()
            .map(|&p| (p.code().to_string(), stats.position_counts.get(p)))
            .collect();

        Self {
            success: true,
            player_count: stats.player_count,
            total_cost: stats.total_cost.as_millions(),
            budget_remaining: stats.budget_remaining.as_millions(),
            position_counts,
            club_counts: stats.club_counts,
        }
    }
}

/// A broken starting line-up rule
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ViolationView {
    pub code: String,
    pub message: String,
}

impl From<&FormationViolation> for ViolationView {
    fn from(violation: &FormationViolation) -> Self {
        Self {
            code: violation.code().to_string(),
            message: violation.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FormationResponse {
    pub success: bool,
    pub valid: bool,
    /// DEF-MID-FWD, e.g. "4-4-2"
    pub formation: String,
    pub violations: Vec<ViolationView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SwapView {
    /// Bench player moved into the starting XI
    pub promoted: i32,
    /// Starter moved to the bench
    pub demoted: i32,
}

impl From<&Swap> for SwapView {
    fn from(swap: &Swap) -> Self {
        Self {
            promoted: swap.promoted.0,
            demoted: swap.demoted.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AutoFixResponse {
    pub success: bool,
    /// Repartitioned selection, starting XI first
    pub player_ids: Vec<i32>,
    pub swaps: Vec<SwapView>,
    pub formation: String,
    /// Rules no bench player could repair
    pub remaining: Vec<ViolationView>,
}

// ============================================================================
// Saved Team Models
// ============================================================================

/// Query for loading a saved team
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoadTeamQuery {
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// A squad member with its armbands
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamPlayer {
    #[serde(flatten)]
    pub player: PlayerView,
    pub is_captain: bool,
    pub is_vice_captain: bool,
}

impl From<&SquadEntry> for TeamPlayer {
    fn from(entry: &SquadEntry) -> Self {
        Self {
            player: PlayerView::from(&entry.player),
            is_captain: entry.is_captain,
            is_vice_captain: entry.is_vice_captain,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamView {
    pub id: String,
    pub user_id: String,
    pub team_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Members in slot order, starting XI first
    pub players: Vec<TeamPlayer>,
    pub formation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoadTeamResponse {
    pub success: bool,
    /// Null when the user has not saved a team yet
    pub team: Option<TeamView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A squad member in a save request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaveTeamPlayer {
    pub id: i32,
    #[serde(default)]
    pub is_captain: Option<bool>,
    #[serde(default)]
    pub is_vice_captain: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaveTeamRequest {
    /// Defaults to "My Fantasy Team"
    #[serde(rename = "teamName", default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub players: Vec<SaveTeamPlayer>,
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaveTeamResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "teamId")]
    pub team_id: String,
    /// Bench swaps applied to make the starting XI legal
    pub swaps: Vec<SwapView>,
}

// ============================================================================
// Authentication Models
// ============================================================================

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// User email address (must be unique)
    pub email: String,
    /// User password (minimum 8 characters)
    pub password: String,
    /// User full name (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Register and login response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub success: bool,
    pub user: User,
    /// Session token, also set as the `session_token` cookie
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

/// User role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// May reseed the player catalog
    Admin,
    /// Regular user
    User,
}

/// User information
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// User UUID
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for User {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id.to_string(),
            email: model.email,
            full_name: model.full_name,
            role: match model.role {
                user::UserRole::Admin => UserRole::Admin,
                user::UserRole::User => UserRole::User,
            },
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUserResponse {
    pub success: bool,
    pub user: User,
    pub message: String,
}
