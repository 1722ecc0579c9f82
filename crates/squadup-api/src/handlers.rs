use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{
        sse::{Event, KeepAlive},
        IntoResponse, Response, Sse,
    },
    Extension, Json,
};
use futures::stream::Stream;
use std::{convert::Infallible, sync::Arc, time::Duration};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use squadup_core::{
    auto_fix_formation, can_add, formation, rules, stats, validate_formation, validate_squad,
    Player, PlayerId, Position, Squad, SquadEntry,
};
use squadup_db::{players, squads, PlayerFilter, StoreError};

use crate::auth_gateway::{AuthError, AuthUser, SessionGrant};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{extract_token, SESSION_COOKIE};
use crate::models::*;
use crate::AppState;

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse::new(message, code)))
}

/// A 400 listing every rule the request broke
fn rules_error<E: ToString>(code: &str, message: &str, broken: &[E]) -> ApiError {
    let body = ErrorResponse::new(message, code)
        .with_details(broken.iter().map(ToString::to_string).collect());
    (StatusCode::BAD_REQUEST, Json(body))
}

/// Storage failures are logged in full and reported generically
fn store_error(err: StoreError) -> ApiError {
    match err {
        StoreError::UnknownPlayers(_) => {
            api_error(StatusCode::NOT_FOUND, "UNKNOWN_PLAYER", err.to_string())
        }
        other => {
            error!("Storage error: {}", other);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                "Something went wrong while talking to the database. Please try again.",
            )
        }
    }
}

fn auth_error(err: AuthError) -> ApiError {
    let status = match &err {
        AuthError::InvalidEmail | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
        AuthError::EmailExists => StatusCode::CONFLICT,
        AuthError::SignupDisabled | AuthError::AccountDisabled => StatusCode::FORBIDDEN,
        AuthError::UnknownUser(_) => StatusCode::NOT_FOUND,
        AuthError::Password(_) | AuthError::Store(_) => {
            error!("Auth gateway failure: {}", err);
            return api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                err.code(),
                "Something went wrong. Please try again.",
            );
        }
        _ => StatusCode::UNAUTHORIZED,
    };
    api_error(status, err.code(), err.to_string())
}

fn session_cookie(token: &str, max_age: i64, secure: bool) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
        SESSION_COOKIE,
        token,
        max_age.max(0),
        if secure { "; Secure" } else { "" }
    )
}

fn session_response(state: &AppState, status: StatusCode, grant: SessionGrant) -> Response {
    let max_age = (grant.expires_at - chrono::Utc::now()).num_seconds();
    let cookie = session_cookie(&grant.token, max_age, state.secure_cookies);

    let body = SessionResponse {
        success: true,
        user: grant.user.into(),
        token: grant.token,
        expires_at: grant.expires_at,
    };

    (status, [(header::SET_COOKIE, cookie)], Json(body)).into_response()
}

/// Resolve ids to catalog players, keeping their order
async fn resolve_players(state: &AppState, ids: &[i32]) -> Result<Vec<Player>, ApiError> {
    let ids: Vec<PlayerId> = ids.iter().copied().map(PlayerId).collect();
    players::find_players(&state.db, &ids)
        .await
        .map_err(store_error)
}

/// The `userId` of load and save requests must name the caller
fn check_user_id(auth: &AuthUser, user_id: Option<&str>) -> Result<(), ApiError> {
    let user_id = user_id.map(str::trim).unwrap_or_default();
    if user_id.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "USER_ID_REQUIRED",
            "User ID required",
        ));
    }

    match Uuid::parse_str(user_id) {
        Ok(id) if id == auth.user_id => Ok(()),
        _ => {
            warn!(
                "User {} tried to access the team of {}",
                auth.user_id, user_id
            );
            Err(api_error(
                StatusCode::FORBIDDEN,
                "FORBIDDEN_USER",
                "You can only access your own team",
            ))
        }
    }
}

fn starting_xi(players: &[Player]) -> &[Player] {
    &players[..players.len().min(rules::STARTING_XI)]
}

// ============================================================================
// System
// ============================================================================

/// Health check
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (status, catalog_players) = match players::count_players(&state.db).await {
        Ok(count) => ("ok", count),
        Err(e) => {
            warn!("Health check could not reach the database: {}", e);
            ("degraded", 0)
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        catalog_players,
    })
}

// ============================================================================
// Player Catalog
// ============================================================================

/// List catalog players, ordered by position then name
#[utoipa::path(
    get,
    path = "/api/players",
    params(
        ("position" = Option<String>, Query, description = "GK, DEF, MID or FWD"),
        ("club" = Option<String>, Query, description = "Exact club name")
    ),
    responses(
        (status = 200, description = "Catalog players", body = PlayerList),
        (status = 400, description = "Unknown position", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn list_players(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<PlayerQuery>,
) -> Result<Json<PlayerList>, ApiError> {
    debug!("Listing players: {:?}", query);

    let position = query
        .position
        .as_deref()
        .map(str::parse::<Position>)
        .transpose()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, "INVALID_POSITION", e.to_string()))?;

    let filter = PlayerFilter {
        position,
        club: query.club.filter(|c| !c.trim().is_empty()),
    };

    let players: Vec<PlayerView> = players::list_players(&state.db, &filter)
        .await
        .map_err(store_error)?
        .iter()
        .map(PlayerView::from)
        .collect();

    Ok(Json(PlayerList {
        success: true,
        total: players.len(),
        players,
    }))
}

/// Get one catalog player
#[utoipa::path(
    get,
    path = "/api/players/{id}",
    params(
        ("id" = i32, Path, description = "Catalog player id")
    ),
    responses(
        (status = 200, description = "Player found", body = PlayerView),
        (status = 404, description = "Player not found", body = ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn get_player(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<PlayerView>, ApiError> {
    let player = players::find_player(&state.db, PlayerId(id))
        .await
        .map_err(store_error)?
        .ok_or_else(|| {
            api_error(
                StatusCode::NOT_FOUND,
                "UNKNOWN_PLAYER",
                format!("Player {} not found", id),
            )
        })?;

    Ok(Json(PlayerView::from(&player)))
}

/// Squad-building rules
#[utoipa::path(
    get,
    path = "/api/rules",
    responses(
        (status = 200, description = "Budget, quotas and line-up minimums", body = RulesResponse)
    ),
    tag = "catalog"
)]
pub async fn get_rules() -> Json<RulesResponse> {
    Json(RulesResponse {
        budget: rules::BUDGET.as_millions(),
        squad_size: rules::SQUAD_SIZE,
        starting_xi: rules::STARTING_XI,
        max_per_club: rules::MAX_PER_CLUB,
        position_quotas: Position::ALL
            .iter()
            .map(|p| (p.code().to_string(), p.squad_quota()))
            .collect(),
        starting_goalkeepers: rules::STARTING_GOALKEEPERS,
        min_starting_defenders: rules::MIN_STARTING_DEFENDERS,
        min_starting_forwards: rules::MIN_STARTING_FORWARDS,
    })
}

/// Replace the catalog with the bundled 2025/26 season
#[utoipa::path(
    post,
    path = "/api/admin/seed-players",
    responses(
        (status = 200, description = "Catalog replaced", body = SeedResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn seed_players(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<SeedResponse>, ApiError> {
    if !auth.is_admin() {
        return Err(api_error(
            StatusCode::FORBIDDEN,
            "ADMIN_REQUIRED",
            "Only administrators can reseed the player catalog",
        ));
    }

    let catalog = squadup_catalog::season_2025().map_err(|e| {
        error!("Bundled catalog is unusable: {}", e);
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "CATALOG_ERROR",
            "Bundled player data could not be read",
        )
    })?;

    let report = players::replace_catalog(&state.db, &catalog.players)
        .await
        .map_err(store_error)?;

    info!(
        "Catalog reseeded by {} from season {}",
        auth.email, catalog.season
    );

    Ok(Json(SeedResponse {
        success: true,
        message: format!(
            "Seeded {} players from {} clubs",
            catalog.len(),
            catalog.clubs().len()
        ),
        season: catalog.season,
        inserted: report.inserted,
        updated: report.updated,
        unchanged: report.unchanged,
        removed: report.removed,
        retained: report.retained,
    }))
}

// ============================================================================
// Squad Builder
// ============================================================================

/// Can a player join the current selection?
#[utoipa::path(
    post,
    path = "/api/squad/check",
    request_body = CheckRequest,
    responses(
        (status = 200, description = "Every rule the candidate breaks", body = CheckResponse),
        (status = 404, description = "Unknown player", body = ErrorResponse)
    ),
    tag = "squad"
)]
pub async fn check_player(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CheckRequest>,
) -> Result<Json<CheckResponse>, ApiError> {
    let candidate = players::find_player(&state.db, PlayerId(req.candidate_id))
        .await
        .map_err(store_error)?
        .ok_or_else(|| {
            api_error(
                StatusCode::NOT_FOUND,
                "UNKNOWN_PLAYER",
                format!("Player {} not found", req.candidate_id),
            )
        })?;
    let selection = resolve_players(&state, &req.player_ids).await?;

    let errors = match can_add(&candidate, &selection) {
        Ok(()) => Vec::new(),
        Err(rejection) => rejection.messages(),
    };

    Ok(Json(CheckResponse {
        success: true,
        allowed: errors.is_empty(),
        errors,
    }))
}

/// Cost, remaining budget and counts for a selection
#[utoipa::path(
    post,
    path = "/api/squad/stats",
    request_body = SelectionRequest,
    responses(
        (status = 200, description = "Selection statistics", body = StatsResponse),
        (status = 404, description = "Unknown player", body = ErrorResponse)
    ),
    tag = "squad"
)]
pub async fn squad_stats(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SelectionRequest>,
) -> Result<Json<StatsResponse>, ApiError> {
    let selection = resolve_players(&state, &req.player_ids).await?;
    Ok(Json(stats(&selection).into()))
}

/// Validate the starting XI of a selection
#[utoipa::path(
    post,
    path = "/api/squad/formation",
    request_body = SelectionRequest,
    responses(
        (status = 200, description = "Formation and broken line-up rules", body = FormationResponse),
        (status = 404, description = "Unknown player", body = ErrorResponse)
    ),
    tag = "squad"
)]
pub async fn squad_formation(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SelectionRequest>,
) -> Result<Json<FormationResponse>, ApiError> {
    let selection = resolve_players(&state, &req.player_ids).await?;
    let starting = starting_xi(&selection);
    let violations = validate_formation(starting);

    Ok(Json(FormationResponse {
        success: true,
        valid: violations.is_empty(),
        formation: formation(starting).to_string(),
        violations: violations.iter().map(ViolationView::from).collect(),
    }))
}

/// Swap bench players in until the starting XI is legal
#[utoipa::path(
    post,
    path = "/api/squad/auto-fix",
    request_body = SelectionRequest,
    responses(
        (status = 200, description = "Repartitioned selection", body = AutoFixResponse),
        (status = 404, description = "Unknown player", body = ErrorResponse)
    ),
    tag = "squad"
)]
pub async fn squad_auto_fix(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SelectionRequest>,
) -> Result<Json<AutoFixResponse>, ApiError> {
    let selection = resolve_players(&state, &req.player_ids).await?;
    let outcome = auto_fix_formation(&selection);

    Ok(Json(AutoFixResponse {
        success: true,
        player_ids: outcome.players.iter().map(|p| p.id.0).collect(),
        swaps: outcome.swaps.iter().map(SwapView::from).collect(),
        formation: formation(outcome.starting()).to_string(),
        remaining: outcome.remaining.iter().map(ViolationView::from).collect(),
    }))
}

// ============================================================================
// Saved Teams
// ============================================================================

/// Load the caller's saved team
#[utoipa::path(
    get,
    path = "/api/load-team",
    params(
        ("userId" = Option<String>, Query, description = "Must be the signed-in user's id")
    ),
    responses(
        (status = 200, description = "Saved team, or null when none was saved", body = LoadTeamResponse),
        (status = 400, description = "User ID missing", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Another user's team", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn load_team(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    ApiQuery(query): ApiQuery<LoadTeamQuery>,
) -> Result<Json<LoadTeamResponse>, ApiError> {
    check_user_id(&auth, query.user_id.as_deref())?;

    let Some(saved) = squads::load_squad(&state.db, auth.user_id)
        .await
        .map_err(store_error)?
    else {
        return Ok(Json(LoadTeamResponse {
            success: true,
            team: None,
            message: Some("No team found".to_string()),
        }));
    };

    let starters: Vec<Player> = saved
        .squad
        .players()
        .take(rules::STARTING_XI)
        .cloned()
        .collect();

    Ok(Json(LoadTeamResponse {
        success: true,
        team: Some(TeamView {
            id: saved.id.to_string(),
            user_id: saved.user_id.to_string(),
            team_name: saved.team_name,
            created_at: saved.created_at,
            updated_at: saved.updated_at,
            players: saved.squad.entries().iter().map(TeamPlayer::from).collect(),
            formation: formation(&starters).to_string(),
        }),
        message: None,
    }))
}

/// Save the caller's 15-player squad, replacing any previous one
///
/// Players are re-read from the catalog, checked against the squad rules
/// and the starting XI is repaired from the bench before anything is
/// written.
#[utoipa::path(
    post,
    path = "/api/save-team",
    request_body = SaveTeamRequest,
    responses(
        (status = 200, description = "Team saved", body = SaveTeamResponse),
        (status = 400, description = "Squad breaks the rules", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Another user's team", body = ErrorResponse),
        (status = 404, description = "Unknown player", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn save_team(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(req): ApiJson<SaveTeamRequest>,
) -> Result<Json<SaveTeamResponse>, ApiError> {
    check_user_id(&auth, req.user_id.as_deref())?;

    if req.players.len() != rules::SQUAD_SIZE {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "INVALID_SQUAD_SIZE",
            format!("Team must have exactly {} players", rules::SQUAD_SIZE),
        ));
    }

    let team_name = req
        .team_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(rules::DEFAULT_TEAM_NAME)
        .to_string();
    if team_name.chars().count() > 255 {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "INVALID_TEAM_NAME",
            "Team name must be at most 255 characters",
        ));
    }

    let ids: Vec<i32> = req.players.iter().map(|p| p.id).collect();
    let selection = resolve_players(&state, &ids).await?;

    validate_squad(&selection).map_err(|violations| {
        rules_error("INVALID_SQUAD", "Team breaks the squad rules", &violations)
    })?;

    let outcome = auto_fix_formation(&selection);
    if !outcome.is_valid() {
        return Err(rules_error(
            "INVALID_FORMATION",
            "No legal starting XI can be picked from this squad",
            &outcome.remaining,
        ));
    }

    let (captain, vice_captain) = armbands(&req.players);
    let entries = outcome.players.iter().cloned().map(SquadEntry::new).collect();
    let mut squad = Squad::from_entries(entries);
    if let Some(id) = captain {
        squad = squad.set_captain(id).map_err(|e| {
            api_error(StatusCode::BAD_REQUEST, "INVALID_CAPTAIN", e.to_string())
        })?;
    }
    if let Some(id) = vice_captain {
        squad = squad.set_vice_captain(id).map_err(|e| {
            api_error(StatusCode::BAD_REQUEST, "INVALID_CAPTAIN", e.to_string())
        })?;
    }

    let team_id = squads::save_squad(&state.db, auth.user_id, &team_name, &squad)
        .await
        .map_err(store_error)?;

    debug!(
        "Team {} saved with {} bench swaps",
        team_id,
        outcome.swaps.len()
    );

    Ok(Json(SaveTeamResponse {
        success: true,
        message: "Team saved successfully".to_string(),
        team_id: team_id.to_string(),
        swaps: outcome.swaps.iter().map(SwapView::from).collect(),
    }))
}

/// Captain and vice-captain from the request flags, or the first two
/// players when no flag is set
fn armbands(players: &[SaveTeamPlayer]) -> (Option<PlayerId>, Option<PlayerId>) {
    let flagged = players
        .iter()
        .any(|p| p.is_captain.unwrap_or(false) || p.is_vice_captain.unwrap_or(false));

    if !flagged {
        return (
            players.first().map(|p| PlayerId(p.id)),
            players.get(1).map(|p| PlayerId(p.id)),
        );
    }

    let captain = players
        .iter()
        .find(|p| p.is_captain.unwrap_or(false))
        .map(|p| PlayerId(p.id));
    let vice_captain = players
        .iter()
        .filter(|p| Some(PlayerId(p.id)) != captain)
        .find(|p| p.is_vice_captain.unwrap_or(false))
        .map(|p| PlayerId(p.id));

    (captain, vice_captain)
}

// ============================================================================
// Authentication
// ============================================================================

/// Register a new account and start a session
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, session cookie set", body = SessionResponse),
        (status = 400, description = "Invalid email or weak password", body = ErrorResponse),
        (status = 403, description = "Sign-up disabled", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Response, ApiError> {
    debug!("Registration attempt for {}", req.email);

    let grant = state
        .auth
        .sign_up(&req.email, &req.password, req.full_name)
        .await
        .map_err(auth_error)?;

    Ok(session_response(&state, StatusCode::CREATED, grant))
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in, session cookie set", body = SessionResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let grant = state
        .auth
        .sign_in(&req.email, &req.password)
        .await
        .map_err(auth_error)?;

    info!("User signed in: {}", grant.user.email);
    Ok(session_response(&state, StatusCode::OK, grant))
}

/// Sign out and clear the session cookie
///
/// Always succeeds; an unknown or expired token has nothing to revoke.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Signed out", body = LogoutResponse)
    ),
    tag = "auth"
)]
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Ok(Some(token)) = extract_token(&headers) {
        if let Err(e) = state.auth.sign_out(&token).await {
            debug!("Logout with unusable token: {}", e);
        }
    }

    let cookie = session_cookie("", 0, state.secure_cookies);
    let body = LogoutResponse {
        success: true,
        message: "Signed out".to_string(),
    };

    ([(header::SET_COOKIE, cookie)], Json(body)).into_response()
}

/// The signed-in user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = CurrentUserResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<CurrentUserResponse>, ApiError> {
    let user = state
        .auth
        .find_user(auth.user_id)
        .await
        .map_err(auth_error)?
        .ok_or_else(|| {
            api_error(
                StatusCode::UNAUTHORIZED,
                "USER_NOT_FOUND",
                "Account no longer exists",
            )
        })?;

    Ok(Json(CurrentUserResponse {
        success: true,
        message: format!("Signed in as {}", user.email),
        user: user.into(),
    }))
}

/// Session changes of the signed-in user as Server-Sent Events
#[utoipa::path(
    get,
    path = "/api/auth/events",
    responses(
        (status = 200, description = "text/event-stream of session events for the caller")
    ),
    tag = "auth"
)]
pub async fn session_events(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("Session event stream opened by {}", auth.user_id);

    let user_id = auth.user_id;
    let stream = BroadcastStream::new(state.auth.subscribe()).filter_map(move |result| {
        // lagged receivers just skip what they missed
        let event = result.ok()?;
        if event.user_id() != user_id {
            return None;
        }
        let json = serde_json::to_string(&event).ok()?;
        Some(Ok(Event::default().event("session").data(json)))
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i32, captain: Option<bool>, vice: Option<bool>) -> SaveTeamPlayer {
        SaveTeamPlayer {
            id,
            is_captain: captain,
            is_vice_captain: vice,
        }
    }

    #[test]
    fn test_armbands_default_to_first_two() {
        let players: Vec<_> = (1..=15).map(|id| entry(id, None, None)).collect();
        assert_eq!(armbands(&players), (Some(PlayerId(1)), Some(PlayerId(2))));
    }

    #[test]
    fn test_armbands_follow_flags() {
        let mut players: Vec<_> = (1..=15).map(|id| entry(id, Some(false), None)).collect();
        players[7].is_captain = Some(true);
        players[3].is_vice_captain = Some(true);
        assert_eq!(armbands(&players), (Some(PlayerId(8)), Some(PlayerId(4))));
    }

    #[test]
    fn test_armbands_never_doubles_up() {
        let mut players: Vec<_> = (1..=15).map(|id| entry(id, None, None)).collect();
        players[5].is_captain = Some(true);
        players[5].is_vice_captain = Some(true);
        assert_eq!(armbands(&players), (Some(PlayerId(6)), None));
    }

    #[test]
    fn test_session_cookie() {
        let cookie = session_cookie("abc", 3600, false);
        assert_eq!(
            cookie,
            "session_token=abc; HttpOnly; SameSite=Lax; Path=/; Max-Age=3600"
        );
        assert!(session_cookie("", -5, true).ends_with("Max-Age=0; Secure"));
    }

    #[test]
    fn test_check_user_id() {
        let auth = AuthUser {
            user_id: Uuid::new_v4(),
            email: "me@example.com".to_string(),
            role: "user".to_string(),
            session_id: Uuid::new_v4(),
        };

        assert!(check_user_id(&auth, Some(&auth.user_id.to_string())).is_ok());

        let (status, Json(body)) = check_user_id(&auth, None).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "User ID required");

        let (status, _) = check_user_id(&auth, Some("  ")).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let other = Uuid::new_v4().to_string();
        let (status, Json(body)) = check_user_id(&auth, Some(&other)).unwrap_err();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.code.as_deref(), Some("FORBIDDEN_USER"));
    }
}
