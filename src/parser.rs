use crate::models::{Asset, Entry, LexiconDump};
use anyhow::{bail, Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Cleans up known defects in the Freelex dump so it parses as XML.
///
/// Drops the stray `\x05` control byte and literal `<->` tokens, folds
/// `\r\n` and lone `\r` line breaks to `\n`, and escapes every `&` that does
/// not start a numeric character reference.
pub fn sanitize(raw: &str) -> String {
    let cleaned = raw
        .replace('\u{5}', "")
        .replace("<->", "")
        .replace("\r\n", "\n")
        .replace('\r', "\n");
    let mut out = String::with_capacity(cleaned.len());
    let mut chars = cleaned.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('&', Some(next)) if *next != '#' => out.push_str("&#038;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reads, sanitizes and parses a dump snapshot from disk.
pub fn read_dump(path: &Path) -> Result<LexiconDump> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read dump file: {}", path.display()))?;
    let dump = parse_dump(&sanitize(&raw))
        .with_context(|| format!("Failed to parse dump file: {}", path.display()))?;
    info!(entries = dump.len(), "Dump parsed");
    Ok(dump)
}

/// Parses already-sanitized dump XML.
pub fn parse_dump(xml: &str) -> Result<LexiconDump> {
    let mut reader = Reader::from_str(xml);
    let mut state = DumpParser::default();

    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("XML error at byte {}", reader.buffer_position()))?;
        match event {
            Event::Start(ref e) => state.start(e)?,
            Event::Empty(ref e) => {
                state.start(e)?;
                state.end();
            }
            Event::Text(ref e) => {
                if state.capturing_text() {
                    let text = e.unescape().context("Invalid text content")?;
                    state.push_text(&text);
                }
            }
            Event::CData(ref e) => {
                if state.capturing_text() {
                    state.push_text(&String::from_utf8_lossy(e));
                }
            }
            Event::End(_) => state.end(),
            Event::Eof => break,
            _ => {}
        }
    }

    debug!(entries = state.entries.len(), "Finished reading entries");
    Ok(LexiconDump {
        entries: state.entries,
    })
}

enum Target {
    Field(String),
    Asset(String),
}

struct Capture {
    target: Target,
    depth: usize,
    text: String,
    /// Set once a nested element opens; later text is that child's tail
    sealed: bool,
}

#[derive(Default)]
struct DumpParser {
    depth: usize,
    entries: Vec<Entry>,
    current: Option<(Entry, usize)>,
    asset_depth: Option<usize>,
    capture: Option<Capture>,
}

impl DumpParser {
    fn start(&mut self, e: &BytesStart) -> Result<()> {
        self.depth += 1;
        let depth = self.depth;
        let name = String::from_utf8_lossy(e.name().as_ref()).to_string();

        if let Some(capture) = self.capture.as_mut() {
            capture.sealed = true;
            return Ok(());
        }

        if self.current.is_none() {
            if name == "entry" {
                let id = match e.try_get_attribute("id").context("Invalid entry attribute")? {
                    Some(attr) => attr
                        .unescape_value()
                        .context("Invalid entry id")?
                        .to_string(),
                    None => bail!(
                        "Entry without an id attribute (entry #{})",
                        self.entries.len() + 1
                    ),
                };
                self.current = Some((
                    Entry {
                        id,
                        ..Entry::default()
                    },
                    depth,
                ));
            }
            return Ok(());
        }

        let Some((entry, entry_depth)) = self.current.as_mut() else {
            return Ok(());
        };

        if depth == *entry_depth + 1 {
            if name == "ASSET" {
                entry.assets.get_or_insert_with(Vec::new);
                self.asset_depth = Some(depth);
            } else {
                self.capture = Some(Capture {
                    target: Target::Field(name),
                    depth,
                    text: String::new(),
                    sealed: false,
                });
            }
        } else if self.asset_depth == Some(depth - 1) {
            self.capture = Some(Capture {
                target: Target::Asset(name),
                depth,
                text: String::new(),
                sealed: false,
            });
        }
        Ok(())
    }

    fn capturing_text(&self) -> bool {
        matches!(&self.capture, Some(c) if c.depth == self.depth && !c.sealed)
    }

    fn push_text(&mut self, text: &str) {
        if let Some(capture) = self.capture.as_mut() {
            capture.text.push_str(text);
        }
    }

    fn end(&mut self) {
        let depth = self.depth;
        self.depth = self.depth.saturating_sub(1);

        if self.capture.as_ref().is_some_and(|c| c.depth == depth) {
            if let (Some(capture), Some((entry, _))) = (self.capture.take(), self.current.as_mut())
            {
                match capture.target {
                    Target::Field(name) => entry.fields.push((name, capture.text)),
                    Target::Asset(tag) => {
                        entry.assets.get_or_insert_with(Vec::new).push(Asset {
                            tag,
                            text: capture.text,
                        })
                    }
                }
            }
            return;
        }

        if self.asset_depth == Some(depth) {
            self.asset_depth = None;
            return;
        }

        if self.current.as_ref().is_some_and(|(_, d)| *d == depth) {
            if let Some((entry, _)) = self.current.take() {
                self.entries.push(entry);
            }
        }
    }
}
