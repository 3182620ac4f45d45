pub mod errors;
pub mod handler;

pub use errors::TokenError;
pub use handler::JwtHandler;
