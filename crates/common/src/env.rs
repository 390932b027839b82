//! Environment/runtime helpers
//!
//! Sanity checks to ensure the storage layout exists at startup.

use std::path::Path;

/// Ensure the parent directory of the backing data file exists.
pub async fn ensure_data_dir(data_file: &str) -> anyhow::Result<()> {
    if let Some(parent) = Path::new(data_file).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
