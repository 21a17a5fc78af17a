//! Registration and login.

use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::{CredentialVerificationCache, ProfileAssemblyCache};
use crate::error::{AppError, Result};
use crate::models::UserProfile;
use crate::source::{NewUser, PasswordVerifier, UserStore};

/// Name that can never be registered.
pub const RESERVED_USERNAME: &str = "pipe";

const INVALID_CREDENTIALS: &str = "invalid username or password";

/// Fields of a new account, password still in plaintext.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub password: String,
    pub dark_mode: bool,
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    verifier: Arc<dyn PasswordVerifier>,
    credentials: Arc<CredentialVerificationCache>,
    profiles: Arc<ProfileAssemblyCache>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        verifier: Arc<dyn PasswordVerifier>,
        credentials: Arc<CredentialVerificationCache>,
        profiles: Arc<ProfileAssemblyCache>,
    ) -> Self {
        Self {
            users,
            verifier,
            credentials,
            profiles,
        }
    }

    // == Register ==
    /// Hashes the password, stores user and theme, and returns the assembled
    /// profile. The profile cache is not populated here.
    pub async fn register(&self, registration: Registration) -> Result<UserProfile> {
        if registration.name.is_empty() {
            return Err(AppError::InvalidRequest("username cannot be empty".to_string()));
        }
        if registration.name == RESERVED_USERNAME {
            return Err(AppError::InvalidRequest(format!(
                "the username '{}' is reserved",
                RESERVED_USERNAME
            )));
        }

        let verifier = Arc::clone(&self.verifier);
        let password = registration.password;
        let hashed_password = tokio::task::spawn_blocking(move || verifier.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)))??;

        let row = self.users.insert_user(NewUser {
            name: registration.name,
            display_name: registration.display_name,
            description: registration.description,
            hashed_password,
            dark_mode: registration.dark_mode,
        })?;
        info!("Registered user {} ({})", row.id, row.name);

        self.profiles.assemble(row)
    }

    // == Login ==
    /// Checks credentials and returns the user id.
    ///
    /// Unknown users and wrong passwords are indistinguishable to the caller.
    pub async fn login(&self, name: &str, password: &str) -> Result<i64> {
        let user = match self.users.find_user_by_name(name) {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => {
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))
            }
            Err(e) => return Err(e),
        };

        let matched = self
            .credentials
            .verify_with(&user.hashed_password, password, Arc::clone(&self.verifier))
            .await?;
        if !matched {
            warn!("Rejected login for user {}", user.id);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        Ok(user.id)
    }
}
