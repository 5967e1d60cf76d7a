// Bearer-token authentication: argon2 password hashes, opaque tokens stored
// as SHA-256 digests, and the `AuthUser` extractor guarding write routes.

pub mod extractor;
pub mod handlers;
pub mod password;
pub mod token;

pub use extractor::AuthUser;
