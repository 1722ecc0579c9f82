//! SquadUp - fantasy football squad builder server
//!
//! Serves the HTTP API, seeds the player catalog and issues session tokens
//! for scripted access.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use squadup_api::{ApiServer, ApiServerConfig, AuthGateway};
use squadup_db::{players, users, DatabaseConnection};

/// SquadUp - build a fifteen-player fantasy squad within budget
#[derive(Parser, Debug)]
#[command(name = "squadup")]
#[command(about = "SquadUp - fantasy football squad builder")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ", built ", env!("BUILD_TIME"), ")"))]
struct Cli {
    /// Database URL (postgres://... or sqlite://...)
    #[arg(
        long,
        global = true,
        env = "DATABASE_URL",
        default_value = "sqlite://./squadup.db?mode=rwc"
    )]
    database_url: String,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct SessionArgs {
    /// Secret used to sign session tokens
    #[arg(long, env = "SQUADUP_JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// Session lifetime in hours
    #[arg(long, env = "SQUADUP_SESSION_HOURS", default_value = "24")]
    session_hours: i64,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    #[command(long_about = r#"
Run the HTTP API: player catalog, squad rule checks, saved teams and
session authentication. Migrations run on startup.

EXAMPLES:
  # Local development with SQLite
  squadup serve --jwt-secret dev-secret --seed-on-start

  # PostgreSQL with an administrator account
  squadup serve --database-url postgres://squadup@localhost/squadup \
    --jwt-secret $SECRET --admin-email ops@example.com

ENVIRONMENT VARIABLES:
  DATABASE_URL           Database connection URL
  SQUADUP_BIND           Address to bind
  SQUADUP_JWT_SECRET     Session token signing secret
  SQUADUP_ADMIN_EMAILS   Comma-separated administrator emails
    "#)]
    Serve {
        /// Address to bind the API server
        #[arg(long, env = "SQUADUP_BIND", default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        #[command(flatten)]
        session: SessionArgs,

        /// Disable public registration
        #[arg(long)]
        no_signup: bool,

        /// Accounts given the admin role (may reseed the catalog)
        #[arg(long = "admin-email", env = "SQUADUP_ADMIN_EMAILS", value_delimiter = ',')]
        admin_emails: Vec<String>,

        /// Replace the catalog with the bundled season before serving
        #[arg(long)]
        seed_on_start: bool,

        /// Disable CORS for local development origins
        #[arg(long)]
        no_cors: bool,

        /// Mark the session cookie Secure (when served over HTTPS)
        #[arg(long)]
        secure_cookies: bool,
    },

    /// Replace the player catalog with the bundled 2025/26 season
    Seed,

    /// Issue a session token for an existing account
    GenerateToken {
        /// Email of the account
        #[arg(long)]
        email: String,

        #[command(flatten)]
        session: SessionArgs,
    },
}

/// Setup logging; RUST_LOG overrides the given level
fn setup_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

async fn open_database(url: &str) -> Result<DatabaseConnection> {
    let db = squadup_db::connect(url)
        .await
        .with_context(|| format!("Failed to connect to database {}", url))?;
    squadup_db::migrate(&db)
        .await
        .context("Failed to run database migrations")?;
    Ok(db)
}

async fn seed_catalog(db: &DatabaseConnection) -> Result<()> {
    let catalog = squadup_catalog::season_2025().context("Bundled player data is invalid")?;
    let report = players::replace_catalog(db, &catalog.players)
        .await
        .context("Failed to replace the player catalog")?;

    info!(
        "Seeded season {}: {} players from {} clubs ({} inserted, {} updated, {} unchanged, {} removed, {} retained)",
        catalog.season,
        catalog.len(),
        catalog.clubs().len(),
        report.inserted,
        report.updated,
        report.unchanged,
        report.removed,
        report.retained
    );
    Ok(())
}

fn gateway(db: DatabaseConnection, session: &SessionArgs) -> Result<AuthGateway> {
    if session.jwt_secret.len() < 16 {
        warn!("JWT secret is shorter than 16 bytes; use a long random value in production");
    }
    anyhow::ensure!(session.session_hours > 0, "--session-hours must be positive");

    Ok(AuthGateway::new(
        db,
        session.jwt_secret.as_bytes(),
        chrono::Duration::hours(session.session_hours),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli.log_level);

    let db = open_database(&cli.database_url).await?;

    match cli.command {
        Commands::Serve {
            bind,
            session,
            no_signup,
            admin_emails,
            seed_on_start,
            no_cors,
            secure_cookies,
        } => {
            info!("SquadUp starting...");

            let purged = users::purge_expired_sessions(&db, chrono::Utc::now())
                .await
                .context("Failed to purge stale sessions")?;
            if purged > 0 {
                info!("Removed {} revoked or expired sessions", purged);
            }

            if seed_on_start {
                seed_catalog(&db).await?;
            } else if players::count_players(&db).await? == 0 {
                warn!("Player catalog is empty; run `squadup seed` or pass --seed-on-start");
            }

            if no_signup {
                info!("Public registration disabled");
            }
            for email in &admin_emails {
                info!("Administrator: {}", email);
            }

            let auth = gateway(db.clone(), &session)?
                .with_signup(!no_signup)
                .with_admin_emails(&admin_emails);

            let config = ApiServerConfig {
                bind_addr: bind,
                enable_cors: !no_cors,
                secure_cookies,
            };

            ApiServer::new(config, db, Arc::new(auth)).start().await?;

            info!("SquadUp stopped");
            Ok(())
        }

        Commands::Seed => seed_catalog(&db).await,

        Commands::GenerateToken { email, session } => {
            let grant = gateway(db, &session)?
                .issue_token_for(&email)
                .await
                .with_context(|| format!("Failed to issue a token for {}", email))?;

            info!(
                "Session {} for {} expires at {}",
                grant.session_id, grant.user.email, grant.expires_at
            );
            println!("{}", grant.token);
            Ok(())
        }
    }
}
