use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Digest;
use sha2::Sha256;

use super::errors::ResetTokenError;

/// Single-use password-reset token.
///
/// Carries both forms of the secret: the hex plaintext handed to the user out
/// of band, and the SHA-256 digest that is the only form ever persisted. The
/// input is 256 bits from the OS RNG, so the digest needs no salt.
#[derive(Debug, Clone)]
pub struct ResetToken {
    plaintext: String,
    digest: String,
}

impl ResetToken {
    /// Generate a fresh reset token.
    ///
    /// # Errors
    /// * `GenerationFailed` - The OS RNG could not be read
    pub fn generate() -> Result<Self, ResetTokenError> {
        let mut bytes = [0u8; 32]; // 256 bits of entropy
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|_| ResetTokenError::GenerationFailed)?;

        let plaintext = hex::encode(bytes);
        let digest = digest_hex(&plaintext);

        Ok(Self { plaintext, digest })
    }

    /// The secret value to deliver to the user. Never persist this.
    pub fn plaintext(&self) -> &str {
        &self.plaintext
    }

    /// The hex SHA-256 digest of the plaintext, safe to persist.
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

/// Digest a presented plaintext token the same way `generate` does, for
/// looking up the stored digest during redemption.
pub fn digest_hex(plaintext: &str) -> String {
    hex::encode(Sha256::digest(plaintext.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_produces_distinct_tokens() {
        let first = ResetToken::generate().expect("Failed to generate token");
        let second = ResetToken::generate().expect("Failed to generate token");

        assert_ne!(first.plaintext(), second.plaintext());
        assert_ne!(first.digest(), second.digest());
    }

    #[test]
    fn test_plaintext_is_256_bits_hex() {
        let token = ResetToken::generate().expect("Failed to generate token");

        assert_eq!(token.plaintext().len(), 64);
        assert!(token.plaintext().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_digest_matches_plaintext() {
        let token = ResetToken::generate().expect("Failed to generate token");

        assert_eq!(digest_hex(token.plaintext()), token.digest());
        // The digest never equals the plaintext it was derived from
        assert_ne!(token.plaintext(), token.digest());
    }

    #[test]
    fn test_digest_is_deterministic() {
        assert_eq!(digest_hex("abc123"), digest_hex("abc123"));
        assert_ne!(digest_hex("abc123"), digest_hex("abc124"));
    }
}
