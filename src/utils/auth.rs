use sha2::{Digest, Sha256};

/// Compare an admin key in constant time.
///
/// Both sides are hashed first so the comparison runs over equal-length digests
/// and does not leak the expected key's length.
pub fn api_key_matches(provided: Option<&str>, expected: &str) -> bool {
    let Some(provided) = provided else {
        return false;
    };

    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());

    provided
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
