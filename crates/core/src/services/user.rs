//! User service.

use std::time::Duration;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use framez_common::{AppError, AppResult, IdGenerator};
use framez_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Maximum attempts when waiting for a just-created user row to become
/// visible (absorbs replication lag at the identity-provider boundary).
const MAX_LOOKUP_ATTEMPTS: u32 = 3;

/// Fixed delay between visibility lookup attempts.
const LOOKUP_RETRY_DELAY: Duration = Duration::from_millis(200);

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for registering a new account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Input for creating or updating a user profile.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertProfileInput {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    #[validate(length(min = 3, max = 128))]
    pub handle: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(max = 1024))]
    pub avatar_url: Option<String>,

    #[validate(length(max = 2048))]
    pub bio: Option<String>,
}

/// Public profile fields attached to posts, comments, and edge listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    pub id: String,
    pub name: Option<String>,
    pub handle: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<user::Model> for UserSnapshot {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            handle: u.handle,
            avatar_url: u.avatar_url,
        }
    }
}

/// Result of a handle/email availability probe.
///
/// Advisory only: the commit-time uniqueness check is the actual guarantee.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub available: bool,
    pub message: String,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account.
    ///
    /// This is the identity-provider boundary: it creates the shell user row
    /// with an access token. Profile fields are filled in later via
    /// [`Self::upsert_profile`].
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let user_id = self.id_gen.generate();
        let token = self.id_gen.generate_token();

        let model = user::ActiveModel {
            id: Set(user_id.clone()),
            email: Set(input.email),
            password_hash: Set(password_hash),
            token: Set(Some(token)),
            ..Default::default()
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, "Registered new account");
        Ok(user)
    }

    /// Authenticate a user by email and password.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Authenticate a user by access token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Wait for a just-created user row to become visible.
    ///
    /// Bounded retry with a short fixed delay between attempts, used at the
    /// boundary between account creation and profile reads.
    pub async fn await_visible(&self, user_id: &str) -> AppResult<user::Model> {
        for attempt in 1..=MAX_LOOKUP_ATTEMPTS {
            if let Some(user) = self.user_repo.find_by_id(user_id).await? {
                return Ok(user);
            }

            tracing::debug!(user_id = %user_id, attempt, "User row not yet visible");
            if attempt < MAX_LOOKUP_ATTEMPTS {
                tokio::time::sleep(LOOKUP_RETRY_DELAY).await;
            }
        }

        Err(AppError::UserNotFound(user_id.to_string()))
    }

    /// Get a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        self.user_repo.find_by_id(id).await
    }

    /// Get a user by handle (case-sensitive exact match).
    pub async fn find_by_handle(&self, handle: &str) -> AppResult<Option<user::Model>> {
        self.user_repo.find_by_handle(handle).await
    }

    /// Create or update the caller's profile.
    ///
    /// Fails with `Conflict` when the handle or email is owned by a different
    /// user. Engagement counters are never touched here: they are initialized
    /// at row creation and only move via follow toggles.
    pub async fn upsert_profile(
        &self,
        caller_id: &str,
        input: UpsertProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        if let Some(existing) = self.user_repo.find_by_handle(&input.handle).await? {
            if existing.id != caller_id {
                return Err(AppError::Conflict("Handle already taken".to_string()));
            }
        }

        if let Some(existing) = self.user_repo.find_by_email(&input.email).await? {
            if existing.id != caller_id {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
        }

        let user = self.user_repo.get_by_id(caller_id).await?;

        let mut active: user::ActiveModel = user.into();
        active.name = Set(Some(input.name));
        active.handle = Set(Some(input.handle));
        active.email = Set(input.email);
        active.avatar_url = Set(input.avatar_url);
        active.bio = Set(input.bio);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let updated = self.user_repo.update(active).await?;
        tracing::debug!(user_id = %updated.id, "Updated profile");
        Ok(updated)
    }

    /// Check whether a handle is free to claim.
    ///
    /// Pure read with no side effects; a concurrent signup can still win the
    /// handle between this probe and the commit.
    pub async fn check_handle_available(&self, handle: &str) -> AppResult<Availability> {
        if handle.len() < 3 {
            return Ok(Availability {
                available: false,
                message: "Handle must be at least 3 characters".to_string(),
            });
        }

        let existing = self.user_repo.find_by_handle(handle).await?;
        Ok(Availability {
            available: existing.is_none(),
            message: if existing.is_some() {
                "Handle already taken".to_string()
            } else {
                "Handle available".to_string()
            },
        })
    }

    /// Check whether an email is free to register.
    pub async fn check_email_available(&self, email: &str) -> AppResult<Availability> {
        let existing = self.user_repo.find_by_email(email).await?;
        Ok(Availability {
            available: existing.is_none(),
            message: if existing.is_some() {
                "Email already registered".to_string()
            } else {
                "Email available".to_string()
            },
        })
    }
}

/// Hash a password with Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against an Argon2 hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
