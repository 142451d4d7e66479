use crate::config::PICTURE_DIR;
use crate::http::Fetch;
use crate::models::{Entry, LexiconDump};
use crate::normalize::{encode_asset_path, normalize_filename};
use crate::stats::AssetStats;
use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Component, Path};
use tracing::{debug, info, warn};

/// Cache path (relative to the work dir) for a remote picture name
pub fn local_picture_path(remote: &str) -> String {
    format!("{}/{}", PICTURE_DIR, normalize_filename(remote))
}

/// Downloads every picture not already cached under `work_dir` and returns
/// a copy of the dump whose picture references point at the local files.
///
/// Videos are left as remote references. Pictures are fetched one by one.
pub fn fetch_assets(
    dump: &LexiconDump,
    work_dir: &Path,
    fetcher: &impl Fetch,
    base_url: &str,
    verbose: bool,
) -> Result<(LexiconDump, AssetStats)> {
    let pb = if verbose {
        ProgressBar::hidden()
    } else {
        make_progress_bar(dump.len() as u64)?
    };
    let mut stats = AssetStats::default();
    let mut entries = Vec::with_capacity(dump.len());

    for entry in &dump.entries {
        if verbose {
            println!("{}", entry.headword());
        }
        entries.push(localize_entry(entry, work_dir, fetcher, base_url, &mut stats)?);
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(
        total = stats.total(),
        downloaded = stats.downloaded,
        cached = stats.cached,
        "Pictures up to date"
    );

    Ok((LexiconDump { entries }, stats))
}

fn localize_entry(
    entry: &Entry,
    work_dir: &Path,
    fetcher: &impl Fetch,
    base_url: &str,
    stats: &mut AssetStats,
) -> Result<Entry> {
    let mut entry = entry.clone();
    let id = entry.id.clone();

    for asset in entry.assets.iter_mut().flatten() {
        if asset.tag != "picture" {
            continue;
        }
        if asset.text.is_empty() {
            warn!(id = %id, "Empty picture reference");
            continue;
        }

        if Path::new(&asset.text)
            .components()
            .any(|c| c == Component::ParentDir)
        {
            bail!(
                "Entry {} has a picture reference outside the cache: {}",
                id,
                asset.text
            );
        }

        let local = local_picture_path(&asset.text);
        let target = work_dir.join(&local);

        if target.exists() {
            debug!(path = %local, "Picture cached");
            stats.cached += 1;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            let url = format!("{}{}", base_url, encode_asset_path(&asset.text));
            let body = fetcher
                .get(&url)
                .with_context(|| format!("Failed to download picture for entry {}", id))?;
            fs::write(&target, &body)
                .with_context(|| format!("Failed to write picture: {}", target.display()))?;
            debug!(path = %local, bytes = body.len(), "Picture downloaded");
            stats.downloaded += 1;
        }

        asset.text = local;
    }

    Ok(entry)
}

fn make_progress_bar(len: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template("{spinner} Pictures [{bar:40}] {pos}/{len} ({eta})")
            .context("Invalid progress template")?
            .progress_chars("=> "),
    );
    Ok(pb)
}
