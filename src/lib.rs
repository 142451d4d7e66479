//! Freelex: NZSL lexicon export pipeline
//!
//! Pulls the New Zealand Sign Language dictionary from the Freelex XML dump,
//! downloads the sign pictures and produces the data files and image folders
//! shipped with the iOS and Android apps.
//!
//! 1. **Fetch** -- Download the XML dump; stop early if its SHA-512 matches the
//!    local snapshot
//! 2. **Pictures** -- Download every picture not already in the on-disk cache
//! 3. **Export** -- Normalize each entry and write `nzsl.dat` (tab-separated)
//!    and `nzsl.db` (SQLite, single `words` table)
//! 4. **Images** -- Merge pictures into one folder, make search thumbnails and
//!    shrink everything with ImageMagick and optipng
//! 5. **Stage** -- Copy images and data files into the app trees
//!
//! Everything runs sequentially on one thread. Each step can be skipped by
//! its number (see [`pipeline::Step`]).
//!
//! # Key Modules
//!
//! - [`parser`] -- Dump sanitization and XML parsing into [`models::LexiconDump`]
//! - [`extract`] -- Field mapping and normalized [`models::Record`] construction
//! - [`normalize`] -- Diacritic folding, tokenization, filename normalization
//! - [`dataset`] -- Change detection for the dump snapshot
//! - [`assets`] -- Picture cache
//! - [`export`] -- Flat file and SQLite writers
//! - [`images`] -- Picture merging and external image tools
//! - [`stage`] -- App tree staging and cleanup
//! - [`pipeline`] -- Step ordering, skip list and run configuration
//!
//! # Example Usage
//!
//! ```bash
//! # Full run, staging into both apps and removing intermediates
//! freelex --ios ../nzsl-ios --android ../nzsl-android -c
//!
//! # Re-export data files from the existing dump without touching images
//! freelex --skip 1,2,6,7a,8a -i ../nzsl-ios -a ../nzsl-android
//! ```

pub mod assets;
pub mod config;
pub mod dataset;
pub mod export;
pub mod extract;
pub mod http;
pub mod images;
pub mod models;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod stage;
pub mod stats;
