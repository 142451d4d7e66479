/// Counters collected over one pipeline run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub entries_parsed: u64,
    pub pictures_downloaded: u64,
    pub pictures_cached: u64,
    pub flat_rows_written: u64,
    pub database_rows_written: u64,
    pub missing_fields: u64,
    pub images_merged: u64,
    pub images_processed: u64,
    pub files_staged: u64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_assets(&mut self, assets: &AssetStats) {
        self.pictures_downloaded += assets.downloaded;
        self.pictures_cached += assets.cached;
    }

    pub fn print_summary(&self) {
        println!();
        println!("=== Summary ===");
        println!("Entries parsed:      {}", self.entries_parsed);
        println!("Pictures downloaded: {}", self.pictures_downloaded);
        println!("Pictures cached:     {}", self.pictures_cached);
        println!("Flat file rows:      {}", self.flat_rows_written);
        println!("Database rows:       {}", self.database_rows_written);
        println!("Missing fields:      {}", self.missing_fields);
        println!("Images merged:       {}", self.images_merged);
        println!("Images processed:    {}", self.images_processed);
        println!("Files staged:        {}", self.files_staged);
    }
}

/// Outcome of one asset fetch pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AssetStats {
    pub downloaded: u64,
    pub cached: u64,
}

impl AssetStats {
    pub fn total(&self) -> u64 {
        self.downloaded + self.cached
    }
}
