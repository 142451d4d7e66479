use crate::config::{IMAGE_COLORS, MAX_IMAGE_DIMENSION, THUMBNAIL_HEIGHT, THUMBNAIL_PREFIX};
use anyhow::{bail, Context, Result};
use std::env;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Regular files directly inside `dir`, sorted by name. A missing directory
/// lists as empty.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "Directory does not exist, nothing to list");
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Removes `dir` if present and creates it empty.
pub fn recreate_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        fs::remove_dir_all(dir)
            .with_context(|| format!("Failed to remove directory: {}", dir.display()))?;
    }
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))
}

/// Flattens `picture/<entry>/<name>.png` into a freshly recreated assets folder.
pub fn merge_pictures(picture_dir: &Path, assets_dir: &Path) -> Result<u64> {
    recreate_dir(assets_dir)?;

    if !picture_dir.is_dir() {
        warn!(dir = %picture_dir.display(), "No picture cache to merge");
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(picture_dir)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to walk {}", picture_dir.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension() != Some(OsStr::new("png")) {
            continue;
        }
        let dest = assets_dir.join(entry.file_name());
        fs::copy(path, &dest)
            .with_context(|| format!("Failed to copy {} to {}", path.display(), dest.display()))?;
        copied += 1;
    }

    debug!(copied, "Pictures merged");
    Ok(copied)
}

/// Runs the ImageMagick and optipng invocations, one process per file.
pub struct ImageTools {
    verbose: bool,
    /// `PATH` handed to every tool; `None` inherits ours
    search_path: Option<OsString>,
}

impl ImageTools {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            search_path: None,
        }
    }

    /// Looks tools up in `dir` before the inherited `PATH`.
    pub fn with_tool_dir(mut self, dir: &Path) -> Result<Self> {
        let mut dirs = vec![dir.to_path_buf()];
        if let Some(path) = env::var_os("PATH") {
            dirs.extend(env::split_paths(&path));
        }
        let joined = env::join_paths(dirs)
            .with_context(|| format!("Invalid tool directory: {}", dir.display()))?;
        self.search_path = Some(joined);
        Ok(self)
    }

    fn run(&self, program: &str, args: &[&OsStr]) -> Result<()> {
        if self.verbose {
            let rendered: Vec<_> = args.iter().map(|a| a.to_string_lossy()).collect();
            println!(" - Running: {} {}", program, rendered.join(" "));
        }

        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(path) = &self.search_path {
            cmd.env("PATH", path);
        }
        let output = cmd
            .output()
            .with_context(|| format!("Failed to start '{}'", program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let target = args.last().map(|a| a.to_string_lossy()).unwrap_or_default();
            bail!(
                "'{}' failed on {} ({}):\n{}",
                program,
                target,
                output.status,
                stderr.trim()
            );
        }
        Ok(())
    }

    /// Trims the 1px border and writes a `50.`-prefixed thumbnail next to each image.
    pub fn generate_thumbnails(&self, assets_dir: &Path) -> Result<u64> {
        let files = list_files(assets_dir)?;
        let resize = format!("x{}", THUMBNAIL_HEIGHT);

        for file in &files {
            self.run("mogrify", &[OsStr::new("-shave"), OsStr::new("1x1"), file.as_os_str()])?;

            let thumbnail = thumbnail_path(file)?;
            self.run(
                "convert",
                &[
                    OsStr::new("-resize"),
                    OsStr::new(&resize),
                    file.as_os_str(),
                    thumbnail.as_os_str(),
                ],
            )?;
        }
        Ok(files.len() as u64)
    }

    /// Shrinks oversized images, cuts the palette and optimizes, in place.
    pub fn shrink_for_distribution(&self, assets_dir: &Path) -> Result<u64> {
        let resize = format!("{0}x{0}>", MAX_IMAGE_DIMENSION);
        let colors = IMAGE_COLORS.to_string();

        for file in list_files(assets_dir)? {
            self.run("mogrify", &[OsStr::new("-resize"), OsStr::new(&resize), file.as_os_str()])?;
        }
        for file in list_files(assets_dir)? {
            self.run(
                "convert",
                &[
                    OsStr::new("-colors"),
                    OsStr::new(&colors),
                    file.as_os_str(),
                    file.as_os_str(),
                ],
            )?;
        }
        let files = list_files(assets_dir)?;
        for file in &files {
            self.run("optipng", &[OsStr::new("-quiet"), file.as_os_str()])?;
        }
        Ok(files.len() as u64)
    }
}

fn thumbnail_path(file: &Path) -> Result<PathBuf> {
    let name = file
        .file_name()
        .with_context(|| format!("Not a file path: {}", file.display()))?;
    let mut prefixed = OsString::from(THUMBNAIL_PREFIX);
    prefixed.push(name);
    Ok(file.with_file_name(prefixed))
}
