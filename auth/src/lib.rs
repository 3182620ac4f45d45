//! Credential primitives library
//!
//! Provides the cryptographic building blocks for the account service:
//! - Password hashing (Argon2id)
//! - Bearer token encoding and validation (JWS, HS256)
//! - Single-use password-reset tokens (random value, stored as digest)
//!
//! The service defines its own claims type and orchestration on top of these
//! primitives. Nothing in this crate touches storage: rules that need the
//! credential store (stale-token rejection, reset redemption) live in the
//! service's domain layer.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let digest = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &digest).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Bearer Tokens
//! ```
//! use auth::JwtHandler;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Claims { sub: String, exp: i64 }
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let claims = Claims { sub: "user123".into(), exp: i64::MAX };
//! let token = handler.encode(&claims).unwrap();
//! let decoded: Claims = handler.decode(&token).unwrap();
//! ```
//!
//! ## Reset Tokens
//! ```
//! use auth::{reset, ResetToken};
//!
//! let token = ResetToken::generate().unwrap();
//! // The plaintext goes out of band; only the digest is stored.
//! assert_eq!(reset::digest_hex(token.plaintext()), token.digest());
//! ```

pub mod jwt;
pub mod password;
pub mod reset;

// Re-export commonly used items
pub use jwt::JwtHandler;
pub use jwt::TokenError;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use reset::ResetToken;
pub use reset::ResetTokenError;
