/// Password hashing with Argon2id
use crate::error::{PlatformError, PlatformResult};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

/// Memory cost in KiB (19 MiB)
const MEMORY_COST_KIB: u32 = 19_456;

/// One-way password hasher with a configurable iteration cost
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create a hasher running `cost` Argon2id iterations
    pub fn new(cost: u32) -> PlatformResult<Self> {
        let params = Params::new(MEMORY_COST_KIB, cost, 1, None)
            .map_err(|e| PlatformError::Validation(format!("Invalid password hash cost: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a password into a PHC string
    pub fn hash(&self, password: &str) -> PlatformResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PlatformError::Internal(format!("Password hashing failed: {}", e)))?;

        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash.
    ///
    /// The parameters embedded in the stored hash are used, so hashes created
    /// under an older cost keep verifying after the cost changes.
    pub fn verify(&self, password: &str, hash: &str) -> PlatformResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| PlatformError::Internal(format!("Invalid password hash: {}", e)))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PlatformError::Internal(format!(
                "Password verification failed: {}",
                e
            ))),
        }
    }
}
