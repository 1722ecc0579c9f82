//! HTTP surface for SquadUp
//!
//! Public catalog and squad-building endpoints, session authentication and
//! the saved-team endpoints, documented with OpenAPI.

pub mod auth_gateway;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use auth_gateway::{AuthError, AuthGateway, AuthUser, SessionEvent, SessionGrant};

/// Application state shared across handlers
pub struct AppState {
    pub db: DatabaseConnection,
    pub auth: Arc<AuthGateway>,
    /// Add `Secure` to the session cookie (serve over HTTPS)
    pub secure_cookies: bool,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SquadUp API",
        version = "0.1.0",
        description = "Fantasy football squad builder: player catalog, squad rules and saved teams",
        contact(
            name = "SquadUp Team",
            email = "team@squadup.dev"
        )
    ),
    paths(
        handlers::health_check,
        handlers::list_players,
        handlers::get_player,
        handlers::get_rules,
        handlers::seed_players,
        handlers::check_player,
        handlers::squad_stats,
        handlers::squad_formation,
        handlers::squad_auto_fix,
        handlers::load_team,
        handlers::save_team,
        handlers::register,
        handlers::login,
        handlers::logout,
        handlers::get_current_user,
        handlers::session_events,
    ),
    components(
        schemas(
            models::HealthResponse,
            models::ErrorResponse,
            models::PositionCode,
            models::PlayerView,
            models::PlayerList,
            models::PlayerQuery,
            models::RulesResponse,
            models::SeedResponse,
            models::SelectionRequest,
            models::CheckRequest,
            models::CheckResponse,
            models::StatsResponse,
            models::ViolationView,
            models::FormationResponse,
            models::SwapView,
            models::AutoFixResponse,
            models::LoadTeamQuery,
            models::TeamPlayer,
            models::TeamView,
            models::LoadTeamResponse,
            models::SaveTeamPlayer,
            models::SaveTeamRequest,
            models::SaveTeamResponse,
            models::RegisterRequest,
            models::LoginRequest,
            models::SessionResponse,
            models::LogoutResponse,
            models::UserRole,
            models::User,
            models::CurrentUserResponse,
        )
    ),
    tags(
        (name = "catalog", description = "Player catalog and seeding endpoints"),
        (name = "squad", description = "Stateless squad-building rule checks"),
        (name = "teams", description = "Saved team endpoints"),
        (name = "auth", description = "Authentication and session endpoints"),
        (name = "system", description = "System health and info endpoints")
    )
)]
pub struct ApiDoc;

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS for local development origins
    pub enable_cors: bool,
    /// Mark the session cookie `Secure`
    pub secure_cookies: bool,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            enable_cors: true,
            secure_cookies: false,
        }
    }
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(config: ApiServerConfig, db: DatabaseConnection, auth: Arc<AuthGateway>) -> Self {
        let state = Arc::new(AppState {
            db,
            auth,
            secure_cookies: config.secure_cookies,
        });

        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let api_doc = ApiDoc::openapi();

        // Build PUBLIC routes (no authentication required)
        let public_router = Router::new()
            .route("/api/health", get(handlers::health_check))
            .route("/api/auth/register", post(handlers::register))
            .route("/api/auth/login", post(handlers::login))
            .route("/api/auth/logout", post(handlers::logout))
            .route("/api/players", get(handlers::list_players))
            .route("/api/players/{id}", get(handlers::get_player))
            .route("/api/rules", get(handlers::get_rules))
            .route("/api/squad/check", post(handlers::check_player))
            .route("/api/squad/stats", post(handlers::squad_stats))
            .route("/api/squad/formation", post(handlers::squad_formation))
            .route("/api/squad/auto-fix", post(handlers::squad_auto_fix))
            .with_state(self.state.clone());

        // Build PROTECTED routes (require session token authentication)
        let protected_router = Router::new()
            .route("/api/auth/me", get(handlers::get_current_user))
            .route("/api/auth/events", get(handlers::session_events))
            .route("/api/load-team", get(handlers::load_team))
            .route("/api/save-team", post(handlers::save_team))
            .route("/api/admin/seed-players", post(handlers::seed_players))
            .with_state(self.state.clone())
            .layer(axum_middleware::from_fn_with_state(
                self.state.auth.clone(),
                middleware::require_auth,
            ));

        let router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", api_doc))
            .merge(public_router)
            .merge(protected_router)
            .layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            use tower_http::cors::AllowOrigin;

            // Cookies need credentials, and credentials rule out a wildcard origin
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
                    is_local_origin(origin.to_str().unwrap_or(""))
                }));

            router.layer(cors)
        } else {
            router
        }
    }

    /// Start the API server
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let router = self.build_router();

        info!("Starting API server on {}", self.config.bind_addr);
        info!(
            "OpenAPI spec: http://{}/api/openapi.json",
            self.config.bind_addr
        );
        info!("Swagger UI: http://{}/swagger-ui", self.config.bind_addr);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        info!("API server stopped");
        Ok(())
    }
}

fn is_local_origin(origin: &str) -> bool {
    ["http://localhost", "http://127.0.0.1", "https://localhost", "https://127.0.0.1"]
        .iter()
        .any(|base| {
            origin
                .strip_prefix(base)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(':'))
        })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().unwrap();
        assert!(json.contains("/api/save-team"));
        assert!(json.contains("/api/load-team"));
    }

    #[test]
    fn test_local_origins() {
        assert!(is_local_origin("http://localhost:3000"));
        assert!(is_local_origin("http://127.0.0.1:5173"));
        assert!(is_local_origin("https://localhost"));
        assert!(!is_local_origin("http://localhost.evil.com"));
        assert!(!is_local_origin("https://example.com"));
    }
}
