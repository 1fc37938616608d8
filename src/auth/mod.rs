mod claims;
pub(crate) mod extractors;
mod jwt;
mod password;
pub mod services;

pub use extractors::{AuthUser, MaybeAuthUser};
pub use services::CredentialManager;
