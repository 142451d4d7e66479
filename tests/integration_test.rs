//! End-to-end tests for the Freelex export pipeline.
//!
//! A fake [`Fetch`] implementation serves the dump and picture bytes from
//! memory, so the whole pipeline runs against temp directories without any
//! network access. Image tool steps (`6a`, `6b`) are always skipped because
//! they need ImageMagick and optipng on the host.
//!
//! The sample dump reproduces the defects the parser has to clean up: a stray
//! `\x05` byte, a literal `<->` token and a bare ampersand.

use anyhow::{bail, Result};
use freelex::export::write_flat_file;
use freelex::extract::missing_fields;
use freelex::http::Fetch;
use freelex::parser::{parse_dump, sanitize};
use freelex::pipeline::{run, Outcome, PipelineConfig, SkipList};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const DUMP_URL: &str = "http://freelex.test/publicsearch?xmldump=1";
const ASSET_URL: &str = "http://freelex.test/assets/";

fn sample_xml() -> &'static str {
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<dnzsl>
  <entry id=\"1001\">
    <headword>hello</headword>
    <glossmain>hello, hi</glossmain>
    <glosssecondary>greetings</glosssecondary>
    <glossmaori>kia ora</glossmaori>
    <handshape>1.1.1</handshape>
    <location>in front of face</location>
    <HEADWORDTAGS>greetings,everyday</HEADWORDTAGS>
    <ASSET>
      <glossmain>1001/hello.webm</glossmain>
      <picture>1001/Hello-Sign.PNG</picture>
    </ASSET>
  </entry>
  <entry id=\"1002\">
    <headword>family\u{5}</headword>
    <glossmain>family & wh\u{101}nau<-></glossmain>
    <glossmaori>wh\u{101}nau</glossmaori>
    <handshape>2.3.1</handshape>
    <location>chest</location>
    <HEADWORDTAGS>people,family, friends</HEADWORDTAGS>
    <ASSET>
      <glossmain>1002/family.webm</glossmain>
      <picture>1002/family.v2.png</picture>
    </ASSET>
  </entry>
</dnzsl>"
}

/// Serves canned bodies by URL and records every request.
#[derive(Default)]
struct FakeFreelex {
    bodies: HashMap<String, Vec<u8>>,
    requests: RefCell<Vec<String>>,
}

impl FakeFreelex {
    fn new(dump: &str) -> Self {
        let mut bodies = HashMap::new();
        bodies.insert(DUMP_URL.to_string(), dump.as_bytes().to_vec());
        bodies.insert(
            format!("{}1001/Hello-Sign.PNG", ASSET_URL),
            b"png-hello".to_vec(),
        );
        bodies.insert(
            format!("{}1002/family.v2.png", ASSET_URL),
            b"png-family".to_vec(),
        );
        Self {
            bodies,
            requests: RefCell::new(Vec::new()),
        }
    }

    fn asset_requests(&self) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|u| u.starts_with(ASSET_URL))
            .count()
    }
}

impl Fetch for FakeFreelex {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.borrow_mut().push(url.to_string());
        match self.bodies.get(url) {
            Some(body) => Ok(body.clone()),
            None => bail!("404 Not Found: {}", url),
        }
    }
}

struct Fixture {
    work: TempDir,
    ios: TempDir,
    android: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            work: TempDir::new().unwrap(),
            ios: TempDir::new().unwrap(),
            android: TempDir::new().unwrap(),
        }
    }

    fn config(&self, skip: &str) -> PipelineConfig {
        let mut config = PipelineConfig::new(self.work.path());
        config.ios = Some(self.ios.path().to_path_buf());
        config.android = Some(self.android.path().to_path_buf());
        config.skip = SkipList::parse(skip);
        config.dump_url = DUMP_URL.to_string();
        config.asset_base_url = ASSET_URL.to_string();
        config
    }

    fn work(&self, rel: &str) -> std::path::PathBuf {
        self.work.path().join(rel)
    }
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| l.split('\t').map(str::to_string).collect())
        .collect()
}

// ---------------------------------------------------------------------------
// Extraction + flat file
// ---------------------------------------------------------------------------

#[test]
fn two_entry_dump_exports_two_rows() {
    let dump = parse_dump(&sanitize(sample_xml())).unwrap();
    assert_eq!(dump.len(), 2);

    // second entry lacks glosssecondary, which is optional
    for entry in &dump.entries {
        assert!(missing_fields(entry).is_empty());
    }

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nzsl.dat");
    write_flat_file(&dump, &path).unwrap();

    let rows = read_rows(&path);
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.len() == 14));

    let second = &rows[1];
    assert_eq!(second[0], "family & wh\u{101}nau");
    assert_eq!(second[1], "");
    assert_eq!(second[10], "");
    assert_eq!(second[11], "");
    assert_eq!(second[8], "family & whanau");
    assert_eq!(second[9], "family|whanau");
    assert_eq!(second[7], "people|family, friends");
}

#[test]
fn unfolded_unicode_aborts_export() {
    let xml = "<d><entry id=\"9\"><headword>x</headword><glossmain>caf\u{e7}</glossmain></entry></d>";
    let dump = parse_dump(xml).unwrap();

    let dir = TempDir::new().unwrap();
    let err = write_flat_file(&dump, &dir.path().join("nzsl.dat")).unwrap_err();
    assert!(format!("{:#}", err).contains("Non-ASCII"));
}

// ---------------------------------------------------------------------------
// Full pipeline
// ---------------------------------------------------------------------------

#[test]
fn full_run_exports_and_stages() {
    let fx = Fixture::new();
    let freelex = FakeFreelex::new(sample_xml());

    let outcome = run(&fx.config("6a,6b"), &freelex).unwrap();
    let Outcome::Completed(stats) = outcome else {
        panic!("expected a completed run");
    };

    assert_eq!(stats.entries_parsed, 2);
    assert_eq!(stats.pictures_downloaded, 2);
    assert_eq!(stats.flat_rows_written, 2);
    assert_eq!(stats.database_rows_written, 2);
    assert_eq!(stats.images_merged, 2);

    // picture cache uses normalized names
    assert_eq!(fs::read(fx.work("picture/1001/hello_sign.png")).unwrap(), b"png-hello");
    assert_eq!(fs::read(fx.work("picture/1002/family_v2.png")).unwrap(), b"png-family");

    // flat file sees the local picture names
    let rows = read_rows(&fx.work("nzsl.dat"));
    assert_eq!(rows[0][3], "hello_sign.png");
    assert_eq!(rows[1][3], "family_v2.png");
    assert_eq!(rows[0][4], format!("{}1001/hello.mp4", freelex::config::ASSET_BASE_URL));

    // iOS tree
    let ios_pictures = fx.ios.path().join("Data/picture");
    assert!(ios_pictures.join(".gitkeep").exists());
    assert!(ios_pictures.join("hello_sign.png").exists());
    assert!(ios_pictures.join("family_v2.png").exists());
    assert_eq!(
        fs::read(fx.ios.path().join("Data/nzsl.db")).unwrap(),
        fs::read(fx.work("nzsl.db")).unwrap()
    );

    // Android tree
    let android_assets = fx.android.path().join("app/src/main/assets");
    assert!(android_assets.join("images/signs/.gitkeep").exists());
    assert!(android_assets.join("images/signs/family_v2.png").exists());
    assert_eq!(
        fs::read_to_string(android_assets.join("db/nzsl.dat")).unwrap(),
        fs::read_to_string(fx.work("nzsl.dat")).unwrap()
    );

    // intermediates are kept without -c
    assert!(fx.work("dnzsl-xmldump.xml").exists());
    assert!(fx.work("assets").is_dir());
}

#[test]
fn missing_fields_are_counted() {
    let fx = Fixture::new();
    let xml = sample_xml().replace("<handshape>2.3.1</handshape>", "");
    let freelex = FakeFreelex::new(&xml);

    let Outcome::Completed(stats) = run(&fx.config("6a,6b,7,8"), &freelex).unwrap() else {
        panic!("expected a completed run");
    };
    assert_eq!(stats.missing_fields, 1);
    assert_eq!(stats.flat_rows_written, 2);
    assert_eq!(read_rows(&fx.work("nzsl.dat"))[1][5], "");
}

#[test]
fn unchanged_dump_short_circuits() {
    let fx = Fixture::new();
    let freelex = FakeFreelex::new(sample_xml());

    run(&fx.config("6a,6b"), &freelex).unwrap();
    let snapshot = fs::read(fx.work("dnzsl-xmldump.xml")).unwrap();
    let requests = freelex.requests.borrow().len();

    let outcome = run(&fx.config("6a,6b"), &freelex).unwrap();
    assert_eq!(outcome, Outcome::UpToDate);
    assert_eq!(fs::read(fx.work("dnzsl-xmldump.xml")).unwrap(), snapshot);
    // only the dump itself was requested again
    assert_eq!(freelex.requests.borrow().len(), requests + 1);
}

#[test]
fn cached_pictures_are_reused() {
    let fx = Fixture::new();
    let freelex = FakeFreelex::new(sample_xml());

    run(&fx.config("6a,6b,7,8"), &freelex).unwrap();
    assert_eq!(freelex.asset_requests(), 2);

    // skipping the dump fetch forces a second export over the same cache
    let outcome = run(&fx.config("1,6a,6b,7,8"), &freelex).unwrap();
    let Outcome::Completed(stats) = outcome else {
        panic!("expected a completed run");
    };
    assert_eq!(stats.pictures_cached, 2);
    assert_eq!(stats.pictures_downloaded, 0);
    assert_eq!(freelex.asset_requests(), 2);
}

#[test]
fn skipping_asset_fetch_keeps_remote_names() {
    let fx = Fixture::new();
    fs::write(fx.work("dnzsl-xmldump.xml"), sample_xml()).unwrap();
    let freelex = FakeFreelex::new(sample_xml());

    run(&fx.config("1,2,5,6,7,8"), &freelex).unwrap();

    assert!(freelex.requests.borrow().is_empty());
    assert!(!fx.work("nzsl.db").exists());
    let rows = read_rows(&fx.work("nzsl.dat"));
    assert_eq!(rows[0][3], "Hello-Sign.PNG");
}

#[test]
fn staging_skipped_without_app_roots() {
    let fx = Fixture::new();
    let freelex = FakeFreelex::new(sample_xml());
    let mut config = fx.config("6a,6b");
    config.ios = None;
    config.android = None;

    let Outcome::Completed(stats) = run(&config, &freelex).unwrap() else {
        panic!("expected a completed run");
    };
    assert_eq!(stats.files_staged, 0);
    assert!(fs::read_dir(fx.ios.path()).unwrap().next().is_none());
    assert!(fs::read_dir(fx.android.path()).unwrap().next().is_none());
}

#[test]
fn cleanup_removes_intermediates() {
    let fx = Fixture::new();
    let freelex = FakeFreelex::new(sample_xml());
    let mut config = fx.config("6a,6b");
    config.cleanup = true;

    run(&config, &freelex).unwrap();

    for name in ["dnzsl-xmldump.xml", "nzsl.dat", "nzsl.db", "picture", "assets"] {
        assert!(!fx.work(name).exists(), "{} should be removed", name);
    }
    // staged copies survive
    assert!(fx.ios.path().join("Data/nzsl.db").exists());
}

#[test]
fn dump_fetch_failure_aborts() {
    let fx = Fixture::new();
    let freelex = FakeFreelex::default();

    assert!(run(&fx.config(""), &freelex).is_err());
    assert!(!fx.work("dnzsl-xmldump.xml").exists());
}

#[test]
fn missing_picture_aborts() {
    let fx = Fixture::new();
    let mut freelex = FakeFreelex::new(sample_xml());
    freelex
        .bodies
        .remove(&format!("{}1002/family.v2.png", ASSET_URL));

    let err = run(&fx.config("6a,6b"), &freelex).unwrap_err();
    assert!(format!("{:#}", err).contains("1002"));
    assert!(!fx.work("nzsl.dat").exists());
}
