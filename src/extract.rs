use crate::config::ASSET_BASE_URL;
use crate::models::{Entry, LexiconDump, Record};
use crate::normalize::{build_target, normalize, split_categories, tokenize_list, tokenize_words};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::warn;

/// Logical record field -> element path inside an `<entry>`
pub const FIELD_MAPPING: &[(&str, &str)] = &[
    ("glossmain", "glossmain"),
    ("sec", "glosssecondary"),
    ("maori", "glossmaori"),
    ("picture", "ASSET/picture"),
    ("video", "ASSET/glossmain"),
    ("handshape", "handshape"),
    ("location", "location"),
    ("categories", "HEADWORDTAGS"),
];

/// Fields that many entries legitimately lack
pub const OPTIONAL_FIELDS: &[&str] = &["sec", "maori"];

/// Mapped fields absent from `entry` that are expected to be there.
pub fn missing_fields(entry: &Entry) -> Vec<&'static str> {
    FIELD_MAPPING
        .iter()
        .filter(|(key, path)| entry.find(path).is_none() && !OPTIONAL_FIELDS.contains(key))
        .map(|(key, _)| *key)
        .collect()
}

/// Total of [`missing_fields`] over every entry, i.e. warnings per export pass
pub fn count_missing_fields(dump: &LexiconDump) -> u64 {
    dump.entries
        .iter()
        .map(|entry| missing_fields(entry).len() as u64)
        .sum()
}

/// Builds the normalized record for one entry.
///
/// Missing non-optional fields are logged and replaced by `""`. Fails if the
/// search target would contain anything but printable ASCII.
pub fn extract(entry: &Entry) -> Result<Record> {
    for field in missing_fields(entry) {
        warn!(
            id = %entry.id,
            headword = entry.headword(),
            field,
            "Entry is missing a field"
        );
    }

    let field = |key: &str| -> String {
        FIELD_MAPPING
            .iter()
            .find(|(k, _)| *k == key)
            .and_then(|(_, path)| entry.find(path))
            .unwrap_or("")
            .to_string()
    };

    let glossmain = field("glossmain");
    let sec = field("sec");
    let maori = field("maori");

    let norm_glossmain = normalize(&glossmain);
    let norm_sec = normalize(&sec);
    let norm_maori = normalize(&maori);

    let target = build_target(&norm_glossmain, &norm_sec, &norm_maori)
        .with_context(|| format!("Entry {} ({})", entry.id, entry.headword()))?;

    Ok(Record {
        picture: picture_name(&field("picture")),
        video: video_url(&field("video")),
        handshape: field("handshape"),
        location: field("location"),
        categories: split_categories(&normalize(&field("categories"))),
        norm_words_glossmain: tokenize_words(&norm_glossmain),
        norm_words_sec: tokenize_list(&norm_sec),
        norm_words_maori: tokenize_list(&norm_maori),
        glossmain,
        sec,
        maori,
        norm_glossmain,
        norm_sec,
        norm_maori,
        target,
    })
}

/// Directory-independent picture name
fn picture_name(picture: &str) -> String {
    Path::new(picture)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Absolute URL of the mp4 rendition of a video asset
fn video_url(video: &str) -> String {
    if video.is_empty() {
        return String::new();
    }
    format!("{}{}", ASSET_BASE_URL, video.replace(".webm", ".mp4"))
}
