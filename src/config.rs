/// Freelex XML dump of the whole lexicon
pub const DUMP_URL: &str = "http://freelex.nzsl.vuw.ac.nz/dnzsl/freelex/publicsearch?xmldump=1";

/// Per-file asset endpoint; the asset filename is appended
pub const ASSET_BASE_URL: &str = "http://freelex.nzsl.vuw.ac.nz/dnzsl/freelex/assets/";

/// Raw dump snapshot, kept between runs for change detection
pub const DUMP_FILE: &str = "dnzsl-xmldump.xml";

/// Tab-separated data file shipped with the Android app
pub const FLAT_FILE: &str = "nzsl.dat";

/// SQLite database shipped with the iOS app
pub const DATABASE_FILE: &str = "nzsl.db";

/// Per-entry picture cache (`picture/<entry dir>/<file>.png`)
pub const PICTURE_DIR: &str = "picture";

/// Flat folder of merged and processed images
pub const ASSETS_DIR: &str = "assets";

/// Empty marker that keeps an emptied image directory under version control
pub const PLACEHOLDER_FILE: &str = ".gitkeep";

pub const IOS_DATA_DIR: &str = "Data";
pub const IOS_PICTURE_DIR: &str = "Data/picture";
pub const ANDROID_IMAGES_DIR: &str = "app/src/main/assets/images/signs";
pub const ANDROID_DB_DIR: &str = "app/src/main/assets/db";

/// Filename prefix of search thumbnails
pub const THUMBNAIL_PREFIX: &str = "50.";

/// Search thumbnail height in pixels (width follows aspect ratio)
pub const THUMBNAIL_HEIGHT: u32 = 92;

/// Images larger than this (either side) are shrunk for distribution
pub const MAX_IMAGE_DIMENSION: u32 = 600;

/// Palette size for distributed images
pub const IMAGE_COLORS: u32 = 4;
