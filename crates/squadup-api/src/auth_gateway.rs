//! Auth Gateway
//!
//! Accounts, password sign-in and JWT session tokens backed by the
//! `sessions` table. A token is only honoured while its session row is
//! active, so signing out takes effect immediately even though the JWT
//! itself has not expired.

use chrono::{DateTime, Duration, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

use squadup_auth::{
    check_password_strength, hash_password, verify_password, JwtClaims, JwtError, JwtValidator,
    PasswordError, SESSION_TOKEN_TYPE,
};
use squadup_db::entities::user::{self, UserRole};
use squadup_db::{users, StoreError};

const ISSUER: &str = "squadup";
const AUDIENCE: &str = "squadup-web";
const EVENT_CAPACITY: usize = 64;

/// Identity resolved from a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    /// admin or user
    pub role: String,
    /// The `sessions` row backing the token
    pub session_id: Uuid,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin.as_str()
    }
}

/// Session changes, broadcast to every subscriber
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    SignedUp { user_id: Uuid },
    SignedIn { user_id: Uuid, session_id: Uuid },
    SignedOut { user_id: Uuid, session_id: Uuid },
}

impl SessionEvent {
    pub fn user_id(&self) -> Uuid {
        match self {
            SessionEvent::SignedUp { user_id }
            | SessionEvent::SignedIn { user_id, .. }
            | SessionEvent::SignedOut { user_id, .. } => *user_id,
        }
    }
}

/// A freshly issued session token
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub user: user::Model,
    pub token: String,
    pub session_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Sign-up is disabled on this server")]
    SignupDisabled,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("{0}")]
    WeakPassword(String),

    #[error("Email already registered")]
    EmailExists,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("No user registered as {0}")]
    UnknownUser(String),

    #[error("Invalid or expired token: {0}")]
    Token(#[from] JwtError),

    #[error("Invalid token type '{0}'. Expected 'session' token for API access")]
    WrongTokenType(String),

    #[error("Token missing 'token_type' claim")]
    MissingTokenType,

    #[error("Token missing 'user_id' claim")]
    MissingUserId,

    #[error("Session has been signed out or has expired")]
    SessionRevoked,

    #[error("Password hashing failed: {0}")]
    Password(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::SignupDisabled => "SIGNUP_DISABLED",
            AuthError::InvalidEmail => "INVALID_EMAIL",
            AuthError::WeakPassword(_) => "WEAK_PASSWORD",
            AuthError::EmailExists => "EMAIL_EXISTS",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::AccountDisabled => "ACCOUNT_DISABLED",
            AuthError::UnknownUser(_) => "UNKNOWN_USER",
            AuthError::Token(_) => "INVALID_TOKEN",
            AuthError::WrongTokenType(_) => "INVALID_TOKEN_TYPE",
            AuthError::MissingTokenType => "MISSING_TOKEN_TYPE",
            AuthError::MissingUserId => "MISSING_USER_ID",
            AuthError::SessionRevoked => "SESSION_REVOKED",
            AuthError::Password(_) | AuthError::Store(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort { .. } => AuthError::WeakPassword(err.to_string()),
            other => AuthError::Password(other.to_string()),
        }
    }
}

/// Sign-up, sign-in and session checks for the HTTP surface
///
/// Built once at startup and shared through `Arc`.
pub struct AuthGateway {
    db: DatabaseConnection,
    jwt_secret: Vec<u8>,
    validator: JwtValidator,
    session_ttl: Duration,
    allow_signup: bool,
    admin_emails: HashSet<String>,
    events: broadcast::Sender<SessionEvent>,
}

impl AuthGateway {
    pub fn new(db: DatabaseConnection, jwt_secret: &[u8], session_ttl: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            db,
            jwt_secret: jwt_secret.to_vec(),
            validator: JwtValidator::new(jwt_secret)
                .with_issuer(ISSUER.to_string())
                .with_audience(AUDIENCE.to_string()),
            session_ttl,
            allow_signup: true,
            admin_emails: HashSet::new(),
            events,
        }
    }

    pub fn with_signup(mut self, allow_signup: bool) -> Self {
        self.allow_signup = allow_signup;
        self
    }

    /// Accounts with these emails are given the admin role when they sign
    /// up or sign in
    pub fn with_admin_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.admin_emails = emails
            .into_iter()
            .map(|e| users::normalize_email(e.as_ref()))
            .collect();
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<String>,
    ) -> Result<SessionGrant, AuthError> {
        if !self.allow_signup {
            return Err(AuthError::SignupDisabled);
        }
        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        check_password_strength(password)?;

        if users::find_user_by_email(&self.db, email).await?.is_some() {
            return Err(AuthError::EmailExists);
        }

        let password_hash = hash_password(password)?;
        let role = self.role_for(email);
        let user = users::create_user(&self.db, email, &password_hash, full_name, role)
            .await
            .map_err(sign_up_error)?;

        info!("User registered: {} ({})", user.email, user.id);
        self.emit(SessionEvent::SignedUp { user_id: user.id });

        self.issue_session(user).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionGrant, AuthError> {
        let Some(user) = users::find_user_by_email(&self.db, email).await? else {
            debug!("Sign-in for unknown email {}", email);
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            debug!("Wrong password for {}", user.email);
            return Err(AuthError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        let user = if self.role_for(&user.email) == UserRole::Admin {
            users::set_user_role(&self.db, user, UserRole::Admin).await?
        } else {
            user
        };

        self.issue_session(user).await
    }

    /// Revoke the session behind `token`; false when it was already gone
    pub async fn sign_out(&self, token: &str) -> Result<bool, AuthError> {
        let claims = self.validator.validate(token)?;
        let session_id = Uuid::parse_str(&claims.jti).map_err(|_| JwtError::InvalidToken)?;

        let revoked = users::revoke_session(&self.db, session_id).await?;
        if revoked {
            if let Some(user_id) = claims.user_id.as_deref().and_then(|id| Uuid::parse_str(id).ok())
            {
                info!("User {} signed out", user_id);
                self.emit(SessionEvent::SignedOut {
                    user_id,
                    session_id,
                });
            }
        }

        Ok(revoked)
    }

    /// Resolve a session token into the identity it was issued for
    pub async fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = self.validator.validate(token)?;

        match claims.token_type.as_deref() {
            Some(SESSION_TOKEN_TYPE) => {}
            Some(other) => return Err(AuthError::WrongTokenType(other.to_string())),
            None => return Err(AuthError::MissingTokenType),
        }

        let user_id = claims
            .user_id
            .as_deref()
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or(AuthError::MissingUserId)?;
        let session_id = Uuid::parse_str(&claims.jti).map_err(|_| JwtError::InvalidToken)?;

        if !users::is_session_active(&self.db, session_id).await? {
            return Err(AuthError::SessionRevoked);
        }

        Ok(AuthUser {
            user_id,
            email: claims.email.unwrap_or_default(),
            role: claims
                .user_role
                .unwrap_or_else(|| UserRole::User.as_str().to_string()),
            session_id,
        })
    }

    /// The signed-in user, or `None` for a missing, expired or revoked session
    pub async fn current_user(&self, token: &str) -> Result<Option<user::Model>, AuthError> {
        match self.authenticate(token).await {
            Ok(auth) => Ok(users::find_user(&self.db, auth.user_id).await?),
            Err(AuthError::Store(e)) => Err(AuthError::Store(e)),
            Err(e) => {
                debug!("No current user: {}", e);
                Ok(None)
            }
        }
    }

    pub async fn find_user(&self, user_id: Uuid) -> Result<Option<user::Model>, AuthError> {
        Ok(users::find_user(&self.db, user_id).await?)
    }

    /// Issue a session for an existing account without its password
    pub async fn issue_token_for(&self, email: &str) -> Result<SessionGrant, AuthError> {
        let user = users::find_user_by_email(&self.db, email)
            .await?
            .ok_or_else(|| AuthError::UnknownUser(users::normalize_email(email)))?;

        self.issue_session(user).await
    }

    async fn issue_session(&self, user: user::Model) -> Result<SessionGrant, AuthError> {
        let expires_at = Utc::now() + self.session_ttl;
        let session = users::create_session(&self.db, user.id, expires_at).await?;

        let claims = JwtClaims::new(
            user.id.to_string(),
            ISSUER.to_string(),
            AUDIENCE.to_string(),
            self.session_ttl,
        )
        .with_token_id(session.id.to_string())
        .with_user_id(user.id.to_string())
        .with_email(user.email.clone())
        .with_user_role(user.role.as_str().to_string())
        .with_token_type(SESSION_TOKEN_TYPE.to_string());

        let token = JwtValidator::encode(&self.jwt_secret, &claims)?;

        self.emit(SessionEvent::SignedIn {
            user_id: user.id,
            session_id: session.id,
        });

        Ok(SessionGrant {
            user,
            token,
            session_id: session.id,
            expires_at: claims.expires_at(),
        })
    }

    fn role_for(&self, email: &str) -> UserRole {
        if self.admin_emails.contains(&users::normalize_email(email)) {
            UserRole::Admin
        } else {
            UserRole::User
        }
    }

    fn emit(&self, event: SessionEvent) {
        // no subscribers is fine
        if self.events.send(event).is_err() {
            debug!("Session event dropped: no subscribers");
        }
    }
}

/// The unique index catches a concurrent sign-up that passed the lookup
fn sign_up_error(err: StoreError) -> AuthError {
    match err {
        StoreError::DuplicateEmail(_) => AuthError::EmailExists,
        other => AuthError::Store(other),
    }
}

fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squadup_db::{connect, migrate};

    const SECRET: &[u8] = b"gateway-test-secret";

    async fn gateway() -> AuthGateway {
        let db = connect("sqlite::memory:").await.unwrap();
        migrate(&db).await.unwrap();
        AuthGateway::new(db, SECRET, Duration::hours(1))
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("manager@example.com"));
        assert!(is_valid_email("  first.last@club.co.uk "));
        assert!(!is_valid_email("manager"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("manager@localhost"));
        assert!(!is_valid_email("a b@example.com"));
        assert!(!is_valid_email("a@b@example.com"));
    }

    #[tokio::test]
    async fn test_sign_up_then_authenticate() {
        let gateway = gateway().await;

        let grant = gateway
            .sign_up("Manager@Example.com", "correct-horse", Some("Pep".to_string()))
            .await
            .unwrap();
        assert_eq!(grant.user.email, "manager@example.com");
        assert_eq!(grant.user.role, UserRole::User);

        let auth = gateway.authenticate(&grant.token).await.unwrap();
        assert_eq!(auth.user_id, grant.user.id);
        assert_eq!(auth.session_id, grant.session_id);
        assert_eq!(auth.email, "manager@example.com");
        assert!(!auth.is_admin());
    }

    #[tokio::test]
    async fn test_sign_up_rejections() {
        let gateway = gateway().await;
        gateway
            .sign_up("taken@example.com", "password123", None)
            .await
            .unwrap();

        let cases = [
            ("not-an-email", "password123", "INVALID_EMAIL"),
            ("short@example.com", "short", "WEAK_PASSWORD"),
            ("TAKEN@example.com", "password123", "EMAIL_EXISTS"),
        ];
        for (email, password, code) in cases {
            let err = gateway.sign_up(email, password, None).await.unwrap_err();
            assert_eq!(err.code(), code, "{} / {}", email, password);
        }

        let closed = gateway.with_signup(false);
        let err = closed
            .sign_up("new@example.com", "password123", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::SignupDisabled));
    }

    #[tokio::test]
    async fn test_sign_in_checks_password() {
        let gateway = gateway().await;
        gateway
            .sign_up("keeper@example.com", "clean-sheet", None)
            .await
            .unwrap();

        assert!(gateway.sign_in("keeper@example.com", "clean-sheet").await.is_ok());

        let wrong = gateway.sign_in("keeper@example.com", "own-goal!").await;
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));

        let unknown = gateway.sign_in("nobody@example.com", "clean-sheet").await;
        assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_admin_emails_get_admin_role() {
        let gateway = gateway().await.with_admin_emails(["Boss@Example.com"]);

        let grant = gateway
            .sign_up("boss@example.com", "password123", None)
            .await
            .unwrap();
        assert_eq!(grant.user.role, UserRole::Admin);
        assert!(gateway.authenticate(&grant.token).await.unwrap().is_admin());
    }

    #[tokio::test]
    async fn test_sign_out_revokes_session() {
        let gateway = gateway().await;
        let grant = gateway
            .sign_up("leaver@example.com", "password123", None)
            .await
            .unwrap();

        assert!(gateway.sign_out(&grant.token).await.unwrap());
        assert!(!gateway.sign_out(&grant.token).await.unwrap());

        let err = gateway.authenticate(&grant.token).await.unwrap_err();
        assert_eq!(err.code(), "SESSION_REVOKED");
        assert!(gateway.current_user(&grant.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_current_user() {
        let gateway = gateway().await;
        let grant = gateway
            .sign_up("present@example.com", "password123", None)
            .await
            .unwrap();

        let user = gateway.current_user(&grant.token).await.unwrap().unwrap();
        assert_eq!(user.id, grant.user.id);
        assert!(gateway.current_user("garbage").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_foreign_token_types() {
        let gateway = gateway().await;

        let claims = JwtClaims::new(
            "someone".to_string(),
            ISSUER.to_string(),
            AUDIENCE.to_string(),
            Duration::hours(1),
        )
        .with_user_id(Uuid::new_v4().to_string())
        .with_token_type("api".to_string());
        let token = JwtValidator::encode(SECRET, &claims).unwrap();
        let err = gateway.authenticate(&token).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_TOKEN_TYPE");

        let forged = JwtValidator::encode(b"other-secret", &claims).unwrap();
        let err = gateway.authenticate(&forged).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn test_events_are_broadcast() {
        let gateway = gateway().await;
        let mut events = gateway.subscribe();

        let grant = gateway
            .sign_up("watched@example.com", "password123", None)
            .await
            .unwrap();
        gateway.sign_out(&grant.token).await.unwrap();

        let user_id = grant.user.id;
        let session_id = grant.session_id;
        assert_eq!(events.recv().await.unwrap(), SessionEvent::SignedUp { user_id });
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::SignedIn {
                user_id,
                session_id
            }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::SignedOut {
                user_id,
                session_id
            }
        );
    }

    #[tokio::test]
    async fn test_issue_token_for_existing_user() {
        let gateway = gateway().await;
        gateway
            .sign_up("cli@example.com", "password123", None)
            .await
            .unwrap();

        let grant = gateway.issue_token_for("CLI@example.com").await.unwrap();
        assert!(gateway.authenticate(&grant.token).await.is_ok());

        let err = gateway.issue_token_for("ghost@example.com").await.unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_USER");
    }

    #[tokio::test]
    async fn test_sign_up_without_full_name() {
        let gateway = gateway().await;

        let grant = gateway
            .sign_up("anon@example.com", "password123", None)
            .await
            .unwrap();
        assert_eq!(grant.user.full_name, None);

        let stored = gateway.find_user(grant.user.id).await.unwrap().unwrap();
        assert_eq!(stored.full_name, None);
    }

    #[test]
    fn test_duplicate_insert_maps_to_email_exists() {
        let err = sign_up_error(StoreError::DuplicateEmail("race@example.com".to_string()));
        assert_eq!(err.code(), "EMAIL_EXISTS");

        let err = sign_up_error(StoreError::Corrupt("bad row".to_string()));
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }
}
