//! vault-patch library
//!
//! Reads a secret from HashiCorp Vault, merges new key/value pairs over it
//! and writes the result back.

pub mod backends;
pub mod cli;
pub mod config;
pub mod error;
pub mod kv;
pub mod patch;

pub use backends::{SecretBackend, SecretData, VaultClient};
pub use config::Config;
pub use kv::{parse_tokens, PatchSet};
pub use patch::{merge, patch_secret, PatchOutcome};
