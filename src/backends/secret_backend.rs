use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::StoreError;

/// Key/value contents of a secret as stored
pub type SecretData = BTreeMap<String, Value>;

/// Trait for secret stores that can be patched
#[async_trait::async_trait]
pub trait SecretBackend: Send + Sync {
    /// Read a secret; `Ok(None)` means nothing is stored at `path`
    async fn read_secret(&self, path: &str) -> Result<Option<SecretData>, StoreError>;

    /// Replace the secret at `path` with `data`
    async fn write_secret(&self, path: &str, data: &SecretData) -> Result<(), StoreError>;

    /// Get the backend type name for display purposes
    fn backend_type(&self) -> &'static str;
}
