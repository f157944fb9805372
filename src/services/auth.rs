//! HTTP Basic credential checking for write operations

use std::{collections::HashMap, sync::Arc};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
};

/// Fixed allow-list of accounts, keyed by username, holding argon2 hashes.
#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<HashMap<String, String>>,
}

impl AuthService {
    /// Build the gate from already hashed credentials (username -> PHC string)
    pub fn new(credentials: HashMap<String, String>) -> AppResult<Self> {
        for (username, hash) in &credentials {
            PasswordHash::new(hash).map_err(|e| {
                AppError::Internal(format!("Invalid password hash for user {}: {}", username, e))
            })?;
        }
        Ok(Self {
            credentials: Arc::new(credentials),
        })
    }

    /// Build the gate from configuration, hashing any plaintext passwords
    pub fn from_config(config: &AuthConfig) -> AppResult<Self> {
        let mut credentials = HashMap::with_capacity(config.users.len());
        for user in &config.users {
            let hash = match (&user.password_hash, &user.password) {
                (Some(hash), _) => hash.clone(),
                (None, Some(password)) => hash_password(password)?,
                (None, None) => {
                    return Err(AppError::Internal(format!(
                        "No password configured for user {}",
                        user.username
                    )))
                }
            };
            credentials.insert(user.username.clone(), hash);
        }
        if credentials.is_empty() {
            tracing::warn!("No users configured, all write operations will be rejected");
        }
        Self::new(credentials)
    }

    /// Check a username/password pair against the allow-list
    pub fn verify(&self, username: &str, password: &str) -> AppResult<()> {
        let hash = self
            .credentials
            .get(username)
            .ok_or_else(|| AppError::Authentication(format!("Unknown user {}", username)))?;

        let parsed_hash = PasswordHash::new(hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AppError::Authentication(format!("Wrong password for user {}", username)))
    }

    /// Validate a raw `Authorization` header value, returning the username on success
    pub fn authenticate(&self, header: Option<&str>) -> AppResult<String> {
        let header =
            header.ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;
        let (username, password) = parse_basic_credentials(header).ok_or_else(|| {
            AppError::Authentication("Invalid authorization header format".to_string())
        })?;
        self.verify(&username, &password)?;
        Ok(username)
    }
}

/// Decode `Basic base64(user:pass)`. The password may itself contain colons.
pub fn parse_basic_credentials(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}
