//! bcrypt-backed password verification.

use tracing::warn;

use super::PasswordVerifier;
use crate::error::{AppError, Result};

/// Password verifier using bcrypt at a fixed cost.
#[derive(Debug, Clone, Copy)]
pub struct BcryptVerifier {
    cost: u32,
}

impl BcryptVerifier {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl PasswordVerifier for BcryptVerifier {
    fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        bcrypt::verify(password, hash).map_err(|e| {
            warn!("bcrypt verification failed: {}", e);
            AppError::Internal(format!("Password verification failed: {}", e))
        })
    }

    fn hash(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let verifier = BcryptVerifier::new(4);
        let hash = verifier.hash("s3cret").unwrap();

        assert!(verifier.verify("s3cret", &hash).unwrap());
        assert!(!verifier.verify("wrong", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_error() {
        let verifier = BcryptVerifier::new(4);
        let result = verifier.verify("s3cret", "not-a-bcrypt-hash");

        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
