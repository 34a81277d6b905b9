//! Warden Auth — password authentication, JWT token pairs, and
//! tenant-scoped permission resolution.

pub mod authorize;
pub mod config;
pub mod error;
pub mod service;
pub mod token;

pub use authorize::Authorizer;
pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{AuthService, SignInInput, SignInOutput, SignUpInput};
pub use token::{Claims, TokenPair, ValidatedClaims};
