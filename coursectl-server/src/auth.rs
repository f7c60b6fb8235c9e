//! Password digests and session tokens

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Hex-encoded SHA-256 digest of a plaintext password.
pub fn hash_password(plain: &str) -> String {
    let digest = Sha256::digest(plain.as_bytes());
    hex::encode(digest)
}

/// Compare a plaintext password against a stored digest.
pub fn verify_password(plain: &str, stored_hash: &str) -> bool {
    hash_password(plain).eq_ignore_ascii_case(stored_hash)
}

/// Fresh opaque session token.
pub fn new_session_token() -> String {
    Uuid::new_v4().simple().to_string()
}
