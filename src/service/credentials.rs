// service/credentials.rs
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::service::error::ServiceError;

/// How stored passwords are produced and checked.
pub trait CredentialVerifier: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, ServiceError>;

    fn verify(&self, password: &str, stored: &str) -> Result<bool, ServiceError>;

    fn name(&self) -> &'static str;
}

/// Stores passwords as given and compares them verbatim.
///
/// Kept as the default so existing accounts keep working. Not safe for any
/// deployment that holds real credentials; set `CREDENTIAL_STRATEGY=argon2`.
#[derive(Debug, Default, Clone)]
pub struct PlaintextVerifier;

impl CredentialVerifier for PlaintextVerifier {
    fn hash(&self, password: &str) -> Result<String, ServiceError> {
        Ok(password.to_string())
    }

    fn verify(&self, password: &str, stored: &str) -> Result<bool, ServiceError> {
        Ok(password == stored)
    }

    fn name(&self) -> &'static str {
        "plaintext"
    }
}

#[derive(Debug, Default, Clone)]
pub struct Argon2Verifier;

impl CredentialVerifier for Argon2Verifier {
    fn hash(&self, password: &str) -> Result<String, ServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ServiceError::Internal(format!("Error while hashing password: {}", e)))
    }

    fn verify(&self, password: &str, stored: &str) -> Result<bool, ServiceError> {
        // A stored value that is not a PHC string can never match
        let Ok(parsed) = PasswordHash::new(stored) else {
            return Ok(false);
        };

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    fn name(&self) -> &'static str {
        "argon2"
    }
}

pub fn from_strategy(strategy: &str) -> Box<dyn CredentialVerifier> {
    match strategy.trim().to_ascii_lowercase().as_str() {
        "argon2" => Box::new(Argon2Verifier),
        "plaintext" => Box::new(PlaintextVerifier),
        other => {
            tracing::warn!("unknown credential strategy '{}', using plaintext", other);
            Box::new(PlaintextVerifier)
        }
    }
}
