use crate::extract::extract;
use crate::models::{LexiconDump, Record};
use anyhow::{Context, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// One line of the Android data file. Field order is the column order.
#[derive(Serialize)]
struct FlatRow<'a> {
    glossmain: &'a str,
    sec: &'a str,
    maori: &'a str,
    picture: &'a str,
    video: &'a str,
    handshape: &'a str,
    location: &'a str,
    categories: &'a str,
    norm_glossmain: &'a str,
    norm_words_glossmain: &'a str,
    norm_sec: &'a str,
    norm_words_sec: &'a str,
    norm_maori: &'a str,
    norm_words_maori: &'a str,
}

impl<'a> From<&'a Record> for FlatRow<'a> {
    fn from(r: &'a Record) -> Self {
        Self {
            glossmain: &r.glossmain,
            sec: &r.sec,
            maori: &r.maori,
            picture: &r.picture,
            video: &r.video,
            handshape: &r.handshape,
            location: &r.location,
            categories: &r.categories,
            norm_glossmain: &r.norm_glossmain,
            norm_words_glossmain: &r.norm_words_glossmain,
            norm_sec: &r.norm_sec,
            norm_words_sec: &r.norm_words_sec,
            norm_maori: &r.norm_maori,
            norm_words_maori: &r.norm_words_maori,
        }
    }
}

/// Writes the tab-separated flat file, one unquoted 14-column line per entry.
pub fn write_flat_file(dump: &LexiconDump, path: &Path) -> Result<usize> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create flat file: {}", path.display()))?;
    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(BufWriter::with_capacity(128 * 1024, file));

    let mut rows = 0;
    for entry in &dump.entries {
        let record = extract(entry)?;
        writer
            .serialize(FlatRow::from(&record))
            .with_context(|| format!("Failed to write row for entry {}", entry.id))?;
        rows += 1;
    }
    writer.flush()?;

    info!(rows, path = %path.display(), "Flat file written");
    Ok(rows)
}

/// Recreates the SQLite database with a single `words` table.
pub fn write_database(dump: &LexiconDump, path: &Path) -> Result<usize> {
    if path.exists() {
        fs::remove_file(path)
            .with_context(|| format!("Failed to remove old database: {}", path.display()))?;
    }

    let mut conn = Connection::open(path)
        .with_context(|| format!("Failed to open database: {}", path.display()))?;
    conn.execute(
        "CREATE TABLE words (gloss, minor, maori, picture, video, handshape, location, categories, target)",
        [],
    )
    .context("Failed to create words table")?;

    let tx = conn.transaction()?;
    let mut rows = 0;
    {
        let mut insert = tx.prepare("INSERT INTO words VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)")?;
        for entry in &dump.entries {
            let r = extract(entry)?;
            insert
                .execute(params![
                    r.glossmain,
                    r.sec,
                    r.maori,
                    r.picture,
                    r.video,
                    r.handshape,
                    r.location,
                    r.categories,
                    r.target,
                ])
                .with_context(|| format!("Failed to insert entry {}", entry.id))?;
            rows += 1;
        }
    }
    tx.commit().context("Failed to commit words")?;

    info!(rows, path = %path.display(), "Database written");
    Ok(rows)
}
