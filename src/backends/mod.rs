//! Secret backend implementations
//!
//! This module provides the store abstraction the patch flow runs against and
//! its HashiCorp Vault implementation.

mod secret_backend;
mod vault;

pub use secret_backend::{SecretBackend, SecretData};
pub use vault::VaultClient;
