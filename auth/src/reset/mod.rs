pub mod errors;
pub mod token;

pub use errors::ResetTokenError;
pub use token::digest_hex;
pub use token::ResetToken;
