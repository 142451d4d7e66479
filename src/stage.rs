use crate::config::{
    ANDROID_DB_DIR, ANDROID_IMAGES_DIR, ASSETS_DIR, DATABASE_FILE, DUMP_FILE, FLAT_FILE,
    IOS_DATA_DIR, IOS_PICTURE_DIR, PICTURE_DIR, PLACEHOLDER_FILE,
};
use crate::images::{list_files, recreate_dir};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

/// Replaces the contents of `dest_dir` with every file from `assets_dir`,
/// plus an empty placeholder so the directory survives in version control.
pub fn replace_images(assets_dir: &Path, dest_dir: &Path, verbose: bool) -> Result<u64> {
    recreate_dir(dest_dir)?;
    File::create(dest_dir.join(PLACEHOLDER_FILE))
        .with_context(|| format!("Failed to create placeholder in {}", dest_dir.display()))?;

    let mut copied = 0;
    for file in list_files(assets_dir)? {
        let Some(name) = file.file_name() else {
            continue;
        };
        let dest = dest_dir.join(name);
        if verbose {
            println!(" - Running: cp {} {}", file.display(), dest_dir.display());
        }
        fs::copy(&file, &dest)
            .with_context(|| format!("Failed to copy {} to {}", file.display(), dest.display()))?;
        copied += 1;
    }

    info!(copied, dest = %dest_dir.display(), "Images staged");
    Ok(copied)
}

/// Copies `file` into `dest_dir`, creating the directory if needed.
pub fn copy_into(file: &Path, dest_dir: &Path) -> Result<()> {
    let name = file
        .file_name()
        .with_context(|| format!("Not a file path: {}", file.display()))?;
    fs::create_dir_all(dest_dir)
        .with_context(|| format!("Failed to create directory: {}", dest_dir.display()))?;
    let dest = dest_dir.join(name);
    fs::copy(file, &dest)
        .with_context(|| format!("Failed to copy {} to {}", file.display(), dest.display()))?;
    info!(file = %dest.display(), "File staged");
    Ok(())
}

pub fn stage_ios_images(assets_dir: &Path, ios_root: &Path, verbose: bool) -> Result<u64> {
    replace_images(assets_dir, &ios_root.join(IOS_PICTURE_DIR), verbose)
}

pub fn stage_ios_database(database: &Path, ios_root: &Path) -> Result<()> {
    copy_into(database, &ios_root.join(IOS_DATA_DIR))
}

pub fn stage_android_images(assets_dir: &Path, android_root: &Path, verbose: bool) -> Result<u64> {
    replace_images(assets_dir, &android_root.join(ANDROID_IMAGES_DIR), verbose)
}

pub fn stage_android_data(flat_file: &Path, android_root: &Path) -> Result<()> {
    copy_into(flat_file, &android_root.join(ANDROID_DB_DIR))
}

/// Deletes the dump, both data files and the intermediate image folders.
pub fn cleanup(work_dir: &Path) -> Result<()> {
    for name in [DUMP_FILE, FLAT_FILE, DATABASE_FILE] {
        let path = work_dir.join(name);
        match fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "Removed"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Already gone")
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to remove {}", path.display()))
            }
        }
    }
    for name in [PICTURE_DIR, ASSETS_DIR] {
        let path = work_dir.join(name);
        if path.is_dir() {
            fs::remove_dir_all(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
    }
    Ok(())
}
