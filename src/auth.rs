// src/auth.rs
use crate::core::Database;
use crate::error::AppError;
use crate::models::{Authority, User};
use crate::repository::UserRepository;
use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // user login
    pub auth: String, // comma separated authorities
    pub exp: usize,
    pub iat: usize,
}

pub struct AuthConfig {
    secret: String,
    pub token_validity_hours: i64,
}

impl AuthConfig {
    pub fn new(secret: impl Into<String>, token_validity_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            token_validity_hours,
        }
    }

    /// Signed HS256 bearer token for `user`
    pub fn issue_token(&self, user: &User) -> Result<String> {
        self.issue_token_for(user, Duration::hours(self.token_validity_hours))
    }

    pub fn issue_token_for(&self, user: &User, validity: Duration) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.login.clone(),
            auth: user.authorities.clone(),
            iat: now.timestamp().max(0) as usize,
            exp: (now + validity).timestamp().max(0) as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )?;
        Ok(data.claims)
    }
}

/// Activated account behind a valid bearer token
pub struct AuthenticatedUser {
    pub user: User,
}

impl AuthenticatedUser {
    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn require_admin(&self) -> Result<&User, AppError> {
        if self.user.is_admin() {
            Ok(&self.user)
        } else {
            warn!("User {} attempted an admin operation", self.user.login);
            Err(AppError::Forbidden("administrator role required".to_string()))
        }
    }

    /// Employers and admins may manage advertisements
    pub fn require_employer(&self) -> Result<&User, AppError> {
        if self.user.is_admin() || self.user.has_authority(Authority::Employer) {
            Ok(&self.user)
        } else {
            Err(AppError::Forbidden("employer role required".to_string()))
        }
    }
}

/// Why authentication failed for the current request; read by the 401 catcher
pub struct AuthFailure(pub Option<&'static str>);

fn reject(req: &Request<'_>, status: Status, reason: AuthError) -> Outcome<AuthenticatedUser, AuthError> {
    req.local_cache(|| AuthFailure(Some(reason.message())));
    Outcome::Error((status, reason))
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let auth_config = match req.guard::<&State<AuthConfig>>().await {
            Outcome::Success(config) => config,
            Outcome::Error((status, _)) => return Outcome::Error((status, AuthError::DatabaseError)),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let db = match req.guard::<&State<Database>>().await {
            Outcome::Success(db) => db,
            Outcome::Error((status, _)) => return Outcome::Error((status, AuthError::DatabaseError)),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let token = match req.headers().get_one("Authorization") {
            Some(header) => match header.strip_prefix("Bearer ") {
                Some(token) => token.trim(),
                None => {
                    warn!("Invalid Authorization header format");
                    return reject(req, Status::Unauthorized, AuthError::InvalidToken);
                }
            },
            None => {
                return reject(req, Status::Unauthorized, AuthError::MissingToken);
            }
        };

        let claims = match auth_config.verify(token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!("Token verification failed: {}", e);
                return reject(req, Status::Unauthorized, AuthError::TokenVerificationFailed);
            }
        };

        let user = match UserRepository::find_by_login(db.pool(), &claims.sub).await {
            Ok(Some(user)) if user.activated => user,
            Ok(_) => {
                warn!("Token for unknown or deactivated user {}", claims.sub);
                return reject(req, Status::Unauthorized, AuthError::NotAuthorized);
            }
            Err(e) => {
                error!("Failed to load user {}: {}", claims.sub, e);
                return reject(req, Status::InternalServerError, AuthError::DatabaseError);
            }
        };

        info!("User {} authenticated", user.login);
        Outcome::Success(AuthenticatedUser { user })
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    TokenVerificationFailed,
    NotAuthorized,
    DatabaseError,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Authorization token required",
            AuthError::InvalidToken => "Invalid authorization token format",
            AuthError::TokenVerificationFailed => "Token verification failed",
            AuthError::NotAuthorized => "Account unknown or not activated",
            AuthError::DatabaseError => "Database error occurred",
        }
    }
}

// Optional auth guard that doesn't fail if no auth is provided
pub struct OptionalAuth {
    pub user: Option<AuthenticatedUser>,
}

impl OptionalAuth {
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref().map(AuthenticatedUser::user)
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for OptionalAuth {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match AuthenticatedUser::from_request(req).await {
            Outcome::Success(auth) => Outcome::Success(OptionalAuth { user: Some(auth) }),
            _ => Outcome::Success(OptionalAuth { user: None }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employer() -> User {
        User {
            id: 7,
            login: "acme".to_string(),
            email: None,
            authorities: "ROLE_EMPLOYER".to_string(),
            activated: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issued_token_verifies() {
        let config = AuthConfig::new("a-test-secret", 2);
        let token = config.issue_token(&employer()).unwrap();
        let claims = config.verify(&token).unwrap();
        assert_eq!(claims.sub, "acme");
        assert_eq!(claims.auth, "ROLE_EMPLOYER");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_foreign_or_expired_tokens_are_rejected() {
        let config = AuthConfig::new("a-test-secret", 2);
        let other = AuthConfig::new("another-secret", 2);
        let token = other.issue_token(&employer()).unwrap();
        assert!(config.verify(&token).is_err());

        let expired = config
            .issue_token_for(&employer(), Duration::hours(-3))
            .unwrap();
        assert!(config.verify(&expired).is_err());
        assert!(config.verify("not.a.token").is_err());
    }

    #[test]
    fn test_require_admin() {
        let mut user = employer();
        let auth = AuthenticatedUser { user: user.clone() };
        assert!(matches!(auth.require_admin(), Err(AppError::Forbidden(_))));
        assert!(auth.require_employer().is_ok());

        user.authorities = "ROLE_ADMIN".to_string();
        let admin = AuthenticatedUser { user: user.clone() };
        assert_eq!(admin.require_admin().unwrap().login, "acme");
        assert!(admin.require_employer().is_ok());

        user.authorities = String::new();
        let nobody = AuthenticatedUser { user };
        assert!(matches!(nobody.require_employer(), Err(AppError::Forbidden(_))));
    }
}
