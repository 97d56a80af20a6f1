use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::backends::{SecretBackend, SecretData};
use crate::kv::PatchSet;

/// Confirmation of a successful patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    pub path: String,
    /// Nothing was stored at the path before this write
    pub created: bool,
    pub updated_keys: Vec<String>,
}

impl PatchOutcome {
    /// One-line confirmation for the log
    pub fn summary(&self) -> String {
        let kind = if self.created { "created" } else { "updated" };
        format!(
            "Data successfully written to key {:?} ({} secret, fields: {})",
            self.path,
            kind,
            self.updated_keys.join(", ")
        )
    }
}

/// Merge `patch` over `base`; patched keys win and no key is removed
pub fn merge(mut base: SecretData, patch: PatchSet) -> SecretData {
    base.extend(patch);
    base
}

/// Read the secret at `path`, merge `patch` into it and write it back
pub async fn patch_secret(
    backend: &dyn SecretBackend,
    path: &str,
    patch: PatchSet,
) -> Result<PatchOutcome> {
    info!("Patching secret at {} ({})", path, backend.backend_type());

    let existing = backend
        .read_secret(path)
        .await
        .with_context(|| format!("Could not read key {:?}", path))?;

    let created = existing.is_none();
    let base = existing.unwrap_or_else(|| {
        debug!("No data at {}, starting from an empty secret", path);
        SecretData::new()
    });

    let updated_keys: Vec<String> = patch.keys().cloned().collect();
    let merged = merge(base, patch);

    backend
        .write_secret(path, &merged)
        .await
        .with_context(|| format!("Could not write data to key {:?}", path))?;

    Ok(PatchOutcome {
        path: path.to_string(),
        created,
        updated_keys,
    })
}
