//! One-way password hashing with bcrypt.

/// bcrypt work factor for stored passwords.
pub const HASH_COST: u32 = 10;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, HASH_COST)
}

/// Check a password against a stored bcrypt hash. A malformed hash never matches.
pub fn verify_password(password: &str, stored: &str) -> bool {
    bcrypt::verify(password, stored).unwrap_or(false)
}
