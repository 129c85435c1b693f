use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of the raw password, the format stored in
/// `users.password_hash`.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Compare a candidate password against a stored digest.
///
/// The digests are compared byte for byte over their full length, so the
/// time taken does not depend on where they first differ.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(stored) = hex::decode(stored_hash) else {
        return false;
    };
    let candidate = Sha256::digest(password.as_bytes());
    if stored.len() != candidate.len() {
        return false;
    }
    candidate
        .iter()
        .zip(&stored)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest() {
        assert_eq!(
            hash_password("password"),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
    }

    #[test]
    fn verify_rejects_other_passwords() {
        let stored = hash_password("hunter2");
        assert!(verify_password("hunter2", &stored));
        assert!(!verify_password("hunter3", &stored));
        assert!(!verify_password("", &stored));
    }

    #[test]
    fn verify_accepts_uppercase_digests_and_rejects_malformed_ones() {
        let stored = hash_password("hunter2");
        assert!(verify_password("hunter2", &stored.to_uppercase()));
        assert!(!verify_password("hunter2", &stored[..32]));
        assert!(!verify_password("hunter2", "not hex"));
        assert!(!verify_password("hunter2", ""));
    }
}
