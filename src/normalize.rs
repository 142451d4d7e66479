use anyhow::{ensure, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w']+").unwrap());

/// Lowercases and folds the macronized/accented vowels used in the lexicon.
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| match c {
            'ā' => 'a',
            'ē' | 'é' => 'e',
            'ī' => 'i',
            'ō' => 'o',
            'ū' => 'u',
            other => other,
        })
        .collect()
}

/// Replaces every run of non-word, non-apostrophe characters with `|`.
pub fn tokenize_words(s: &str) -> String {
    NON_WORD_REGEX
        .replace_all(s, "|")
        .trim_matches('|')
        .to_string()
}

/// Splits a `", "`-separated gloss list. Other delimiters are left alone.
pub fn tokenize_list(s: &str) -> String {
    s.replace(", ", "|")
}

/// Turns list-separator commas (no space after them) into `|`.
///
/// `"animals,pets, mammals"` becomes `"animals|pets, mammals"`: a comma
/// followed by a space belongs to a category label.
pub fn split_categories(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            (',', Some(next)) if *next != ' ' => out.push('|'),
            _ => out.push(c),
        }
    }
    out
}

/// Builds the search target and rejects anything outside printable ASCII.
pub fn build_target(glossmain: &str, sec: &str, maori: &str) -> Result<String> {
    let target = [glossmain, sec, maori].join("|");
    ensure!(
        target.chars().all(|c| (' '..='~').contains(&c)),
        "Non-ASCII character in search target: {:?}",
        target
    );
    Ok(target)
}

/// Local cache name for a remote asset: `-` becomes `_`, lowercased, and
/// every `.` but the last becomes `_`.
pub fn normalize_filename(name: &str) -> String {
    let lowered = name.replace('-', "_").to_lowercase();
    match lowered.rfind('.') {
        Some(last) => {
            let (stem, ext) = lowered.split_at(last);
            format!("{}{}", stem.replace('.', "_"), ext)
        }
        None => lowered,
    }
}

/// Percent-encodes a relative asset path, keeping `/` separators intact.
pub fn encode_asset_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
