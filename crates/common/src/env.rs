//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::debug;

/// Ensure the parent directory of the store file exists.
pub async fn ensure_data_dir(store_file: &Path) -> anyhow::Result<()> {
    let Some(dir) = store_file.parent().filter(|d| !d.as_os_str().is_empty()) else {
        return Ok(());
    };
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", dir.display()))?;
    debug!(dir = %dir.display(), "data directory ready");
    Ok(())
}
