//! Password hashing and verification, shared by the store (which
//! hashes on account creation) and the authenticator (which verifies
//! at sign-in).
//!
//! Argon2id with the OWASP-recommended cost profile: 19 MiB of memory,
//! 2 iterations, 1 lane. The per-hash salt travels inside the PHC
//! string. An optional pepper is mixed into the password on both
//! sides; a hash made with a pepper never verifies without it.

use std::borrow::Cow;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};

use crate::error::{WardenError, WardenResult};

const MEMORY_KIB: u32 = 19_456;
const ITERATIONS: u32 = 2;
const LANES: u32 = 1;

fn tuned_argon2() -> WardenResult<Argon2<'static>> {
    let params = Params::new(MEMORY_KIB, ITERATIONS, LANES, None)
        .map_err(|e| WardenError::Crypto(format!("argon2 params: {e}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

fn with_pepper<'a>(password: &'a str, pepper: Option<&str>) -> Cow<'a, [u8]> {
    match pepper {
        Some(p) => Cow::Owned(format!("{p}{password}").into_bytes()),
        None => Cow::Borrowed(password.as_bytes()),
    }
}

/// Hash a password into a PHC-format string with a fresh random salt.
pub fn hash_password(password: &str, pepper: Option<&str>) -> WardenResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = tuned_argon2()?
        .hash_password(&with_pepper(password, pepper), &salt)
        .map_err(|e| WardenError::Crypto(format!("password hash: {e}")))?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC string.
///
/// `Ok(false)` is a plain mismatch. `Err(Crypto)` means the stored
/// hash is malformed or verification itself failed, which is a server
/// problem rather than a caller one.
pub fn verify_password(password: &str, hash: &str, pepper: Option<&str>) -> WardenResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| WardenError::Crypto(format!("stored hash is malformed: {e}")))?;

    // Cost parameters come from the PHC string, so older hashes keep
    // verifying after a profile change.
    match Argon2::default().verify_password(&with_pepper(password, pepper), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(WardenError::Crypto(format!("password verify: {e}"))),
    }
}
