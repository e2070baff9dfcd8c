//! Password hashing
//!
//! bcrypt with the salt and cost embedded in the stored string
//! (`$2b$<cost>$...`). Both calls are CPU-bound; async callers run them on
//! the blocking pool.

pub use bcrypt::BcryptError as PasswordError;

/// bcrypt work factor for new hashes
pub const PASSWORD_COST: u32 = 10;

pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    bcrypt::hash(password, PASSWORD_COST)
}

/// `false` for a wrong password and for a malformed stored hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    bcrypt::verify(password, stored).unwrap_or(false)
}
