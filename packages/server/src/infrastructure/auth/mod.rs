//! Authentication provider implementations.

pub mod token;

pub use token::{CredentialParseError, TokenAuthenticator, UserCredential};
