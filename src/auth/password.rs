// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing and e-mail normalization.
//!
//! Hashes are PBKDF2-HMAC-SHA256 with a random 16-byte salt, encoded as
//! `pbkdf2-sha256$<iterations>$<salt b64>$<hash b64>` so the iteration count
//! can be raised later without invalidating stored accounts.

use std::num::NonZeroU32;

use base64ct::{Base64, Encoding};
use ring::{
    digest, pbkdf2,
    rand::{SecureRandom, SystemRandom},
};
use unicode_normalization::UnicodeNormalization;

static ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;
const SCHEME: &str = "pbkdf2-sha256";
const ITERATIONS: NonZeroU32 = NonZeroU32::new(100_000).unwrap();
const SALT_LEN: usize = 16;
const HASH_LEN: usize = digest::SHA256_OUTPUT_LEN;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("system random source failed")]
    Random,

    #[error("stored password hash is malformed")]
    MalformedHash,
}

/// Hash `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let mut salt = [0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| PasswordError::Random)?;

    let mut hash = [0u8; HASH_LEN];
    pbkdf2::derive(ALGORITHM, ITERATIONS, &salt, password.as_bytes(), &mut hash);

    Ok(format!(
        "{SCHEME}${}${}${}",
        ITERATIONS,
        Base64::encode_string(&salt),
        Base64::encode_string(&hash)
    ))
}

/// Check `password` against a hash produced by [`hash_password`].
pub fn verify_password(password: &str, encoded: &str) -> Result<bool, PasswordError> {
    let mut parts = encoded.split('$');
    let (Some(SCHEME), Some(iterations), Some(salt), Some(hash), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(PasswordError::MalformedHash);
    };

    let iterations = iterations
        .parse::<u32>()
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or(PasswordError::MalformedHash)?;
    let salt = Base64::decode_vec(salt).map_err(|_| PasswordError::MalformedHash)?;
    let hash = Base64::decode_vec(hash).map_err(|_| PasswordError::MalformedHash)?;

    Ok(pbkdf2::verify(ALGORITHM, iterations, &salt, password.as_bytes(), &hash).is_ok())
}

/// Canonical form of an e-mail address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.nfkc().collect::<String>().trim().to_lowercase()
}
