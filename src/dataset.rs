use crate::http::Fetch;
use anyhow::{Context, Result};
use sha2::{Digest, Sha512};
use std::fs;
use std::path::Path;
use tracing::info;

pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha512::digest(bytes))
}

/// Fetches the dump and stores it at `path` if it differs from the local copy.
///
/// Returns `false` when upstream is unchanged; the file is left untouched.
pub fn update_dataset(fetcher: &impl Fetch, url: &str, path: &Path) -> Result<bool> {
    let body = fetcher
        .get(url)
        .context("Failed to download lexicon dump")?;
    store_if_changed(path, &body)
}

pub fn store_if_changed(path: &Path, body: &[u8]) -> Result<bool> {
    let new_hash = content_hash(body);

    if path.exists() {
        let current = fs::read(path)
            .with_context(|| format!("Failed to read existing dump: {}", path.display()))?;
        let old_hash = content_hash(&current);
        if old_hash == new_hash {
            info!(hash = %&new_hash[..16], "Dump unchanged");
            return Ok(false);
        }
        info!(old = %&old_hash[..16], new = %&new_hash[..16], "Dump changed");
    }

    fs::write(path, body)
        .with_context(|| format!("Failed to write dump: {}", path.display()))?;
    info!(bytes = body.len(), path = %path.display(), "Dump saved");
    Ok(true)
}
