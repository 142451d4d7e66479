/// One typed child of an entry's `ASSET` group, e.g. `<picture>` or `<glossmain>` (video)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub tag: String,
    pub text: String,
}

/// A lexicon entry as it appears in the Freelex dump.
///
/// Leaf children are kept in document order so lookups behave like a
/// first-match element search; duplicate children are preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub id: String,
    pub fields: Vec<(String, String)>,
    /// `None` when the entry has no `ASSET` group at all
    pub assets: Option<Vec<Asset>>,
}

impl Entry {
    /// Resolves `name` against direct children and `ASSET/tag` against the asset group.
    pub fn find(&self, path: &str) -> Option<&str> {
        match path.split_once('/') {
            Some(("ASSET", tag)) => self
                .assets
                .as_ref()?
                .iter()
                .find(|a| a.tag == tag)
                .map(|a| a.text.as_str()),
            Some(_) => None,
            None => self
                .fields
                .iter()
                .find(|(name, _)| name == path)
                .map(|(_, text)| text.as_str()),
        }
    }

    pub fn headword(&self) -> &str {
        self.find("headword").unwrap_or("")
    }
}

/// The parsed dump; owns every entry for the duration of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexiconDump {
    pub entries: Vec<Entry>,
}

impl LexiconDump {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Normalized projection of an [`Entry`], the unit both exporters write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub glossmain: String,
    pub sec: String,
    pub maori: String,
    pub picture: String,
    pub video: String,
    pub handshape: String,
    pub location: String,
    pub categories: String,
    pub norm_glossmain: String,
    pub norm_words_glossmain: String,
    pub norm_sec: String,
    pub norm_words_sec: String,
    pub norm_maori: String,
    pub norm_words_maori: String,
    /// ASCII-only search index: normalized glosses joined by `|`
    pub target: String,
}
