use crate::assets::fetch_assets;
use crate::config::{
    ASSETS_DIR, ASSET_BASE_URL, DATABASE_FILE, DUMP_FILE, DUMP_URL, FLAT_FILE, PICTURE_DIR,
};
use crate::dataset::update_dataset;
use crate::export::{write_database, write_flat_file};
use crate::extract::count_missing_fields;
use crate::http::Fetch;
use crate::images::{merge_pictures, ImageTools};
use crate::parser::read_dump;
use crate::stage;
use crate::stats::RunStats;
use anyhow::Result;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Pipeline steps, identified on the command line by their number.
///
/// Sub-steps (`6a`, `7b`, ...) only run when their parent step runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    FetchDump,
    FetchAssets,
    WriteFlatFile,
    WriteDatabase,
    ProcessImages,
    Thumbnails,
    Shrink,
    StageIos,
    IosImages,
    IosDatabase,
    StageAndroid,
    AndroidImages,
    AndroidData,
}

impl Step {
    pub const ALL: [Step; 13] = [
        Step::FetchDump,
        Step::FetchAssets,
        Step::WriteFlatFile,
        Step::WriteDatabase,
        Step::ProcessImages,
        Step::Thumbnails,
        Step::Shrink,
        Step::StageIos,
        Step::IosImages,
        Step::IosDatabase,
        Step::StageAndroid,
        Step::AndroidImages,
        Step::AndroidData,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Step::FetchDump => "1",
            Step::FetchAssets => "2",
            Step::WriteFlatFile => "4",
            Step::WriteDatabase => "5",
            Step::ProcessImages => "6",
            Step::Thumbnails => "6a",
            Step::Shrink => "6b",
            Step::StageIos => "7",
            Step::IosImages => "7a",
            Step::IosDatabase => "7b",
            Step::StageAndroid => "8",
            Step::AndroidImages => "8a",
            Step::AndroidData => "8b",
        }
    }

    pub fn from_id(id: &str) -> Option<Step> {
        Step::ALL.into_iter().find(|s| s.id() == id)
    }
}

/// Steps the user asked to skip (`--skip 1,6b`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipList(BTreeSet<String>);

impl SkipList {
    pub fn parse(list: &str) -> Self {
        let ids: BTreeSet<String> = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        for id in &ids {
            if Step::from_id(id).is_none() {
                warn!(step = %id, "Unknown step id in skip list");
            }
        }
        Self(ids)
    }

    pub fn skips(&self, step: Step) -> bool {
        self.0.contains(step.id())
    }

    pub fn runs(&self, step: Step) -> bool {
        !self.skips(step)
    }
}

/// Everything a run needs; built once from the CLI and passed down.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub work_dir: PathBuf,
    pub ios: Option<PathBuf>,
    pub android: Option<PathBuf>,
    pub cleanup: bool,
    pub verbose: bool,
    pub skip: SkipList,
    pub dump_url: String,
    pub asset_base_url: String,
    pub tool_dir: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            ios: None,
            android: None,
            cleanup: false,
            verbose: false,
            skip: SkipList::default(),
            dump_url: DUMP_URL.to_string(),
            asset_base_url: ASSET_BASE_URL.to_string(),
            tool_dir: None,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.work_dir.join(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Upstream dump unchanged; nothing was done
    UpToDate,
    Completed(RunStats),
}

fn banner(msg: &str) {
    println!("==> {}", msg);
}

/// Runs every step not skipped, in order.
pub fn run(config: &PipelineConfig, fetcher: &impl Fetch) -> Result<Outcome> {
    let skip = &config.skip;
    let mut stats = RunStats::new();
    let dump_path = config.path(DUMP_FILE);
    let flat_path = config.path(FLAT_FILE);
    let db_path = config.path(DATABASE_FILE);
    let assets_dir = config.path(ASSETS_DIR);

    if skip.runs(Step::FetchDump) {
        banner("Step 1: Fetching the latest signs from Freelex");
        if !update_dataset(fetcher, &config.dump_url, &dump_path)? {
            return Ok(Outcome::UpToDate);
        }
    }

    let mut dump = read_dump(&dump_path)?;
    stats.entries_parsed = dump.len() as u64;

    if skip.runs(Step::FetchAssets) {
        banner("Step 2: Fetching images from Freelex");
        let (localized, asset_stats) = fetch_assets(
            &dump,
            &config.work_dir,
            fetcher,
            &config.asset_base_url,
            config.verbose,
        )?;
        dump = localized;
        stats.add_assets(&asset_stats);
    }

    if skip.runs(Step::WriteFlatFile) {
        banner("Step 4: Write out nzsl.dat for Android");
        stats.flat_rows_written = write_flat_file(&dump, &flat_path)? as u64;
    }

    if skip.runs(Step::WriteDatabase) {
        banner("Step 5: Write out sqlite nzsl.db for iOS");
        stats.database_rows_written = write_database(&dump, &db_path)? as u64;
    }

    if skip.runs(Step::WriteFlatFile) || skip.runs(Step::WriteDatabase) {
        stats.missing_fields = count_missing_fields(&dump);
    }

    if skip.runs(Step::ProcessImages) {
        process_images(config, &assets_dir, &mut stats)?;
    }

    if let Some(ios) = config.ios.as_deref().filter(|_| skip.runs(Step::StageIos)) {
        stage_ios(config, ios, &assets_dir, &db_path, &mut stats)?;
    }

    if let Some(android) = config.android.as_deref().filter(|_| skip.runs(Step::StageAndroid)) {
        stage_android(config, android, &assets_dir, &flat_path, &mut stats)?;
    }

    if config.cleanup {
        banner("Step 9: Cleanup");
        stage::cleanup(&config.work_dir)?;
    } else {
        println!("Skipping cleanup (see --help for how to enable it)");
    }

    Ok(Outcome::Completed(stats))
}

fn process_images(config: &PipelineConfig, assets_dir: &Path, stats: &mut RunStats) -> Result<()> {
    let skip = &config.skip;
    let mut tools = ImageTools::new(config.verbose);
    if let Some(dir) = &config.tool_dir {
        tools = tools.with_tool_dir(dir)?;
    }

    banner("Step 6: Merge images together into one folder");
    stats.images_merged = merge_pictures(&config.path(PICTURE_DIR), assets_dir)?;

    if skip.runs(Step::Thumbnails) {
        banner("Step 6a: Generate search thumbnails");
        stats.images_processed += tools.generate_thumbnails(assets_dir)?;
    }

    if skip.runs(Step::Shrink) {
        banner("Step 6b: Shrink images for distribution");
        stats.images_processed += tools.shrink_for_distribution(assets_dir)?;
    }
    Ok(())
}

fn stage_ios(
    config: &PipelineConfig,
    ios: &Path,
    assets_dir: &Path,
    db_path: &Path,
    stats: &mut RunStats,
) -> Result<()> {
    if config.skip.runs(Step::IosImages) {
        banner("Step 7a: Update iOS app images");
        stats.files_staged += stage::stage_ios_images(assets_dir, ios, config.verbose)?;
    }
    if config.skip.runs(Step::IosDatabase) {
        banner("Step 7b: Update iOS app nzsl.db");
        stage::stage_ios_database(db_path, ios)?;
        stats.files_staged += 1;
    }
    Ok(())
}

fn stage_android(
    config: &PipelineConfig,
    android: &Path,
    assets_dir: &Path,
    flat_path: &Path,
    stats: &mut RunStats,
) -> Result<()> {
    if config.skip.runs(Step::AndroidImages) {
        banner("Step 8a: Update Android app images");
        stats.files_staged += stage::stage_android_images(assets_dir, android, config.verbose)?;
    }
    if config.skip.runs(Step::AndroidData) {
        banner("Step 8b: Update Android app nzsl.dat");
        stage::stage_android_data(flat_path, android)?;
        stats.files_staged += 1;
    }
    Ok(())
}
