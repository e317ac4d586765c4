//! Export archive reading

use crate::error::Result;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};
use zip::ZipArchive;

const WATCH_HISTORY: &str = "watch-history.json";

/// The JSON document found inside an export archive
#[derive(Debug)]
pub struct ExportDocument {
    pub entry_name: String,
    pub value: Value,
}

/// Open a `.zip` export and parse its history document.
///
/// `watch-history.json` (in any directory) wins; otherwise the first `.json`
/// entry is used. Returns `None` when the archive holds no JSON at all.
pub fn read_export(path: &Path) -> Result<Option<ExportDocument>> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if !entry.is_dir() {
            names.push(entry.name().to_string());
        }
    }

    let Some(entry_name) = select_entry(&names) else {
        warn!("No JSON file found in {}", path.display());
        return Ok(None);
    };

    if !is_watch_history(&entry_name) {
        info!("{} not found, falling back to {}", WATCH_HISTORY, entry_name);
    }

    let entry = archive.by_name(&entry_name)?;
    let value: Value = serde_json::from_reader(BufReader::new(entry))?;
    Ok(Some(ExportDocument { entry_name, value }))
}

fn is_watch_history(name: &str) -> bool {
    name.rsplit('/').next() == Some(WATCH_HISTORY)
}

fn select_entry(names: &[String]) -> Option<String> {
    names
        .iter()
        .find(|n| is_watch_history(n))
        .or_else(|| names.iter().find(|n| n.ends_with(".json")))
        .cloned()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::CompressionMethod;

    pub(crate) fn write_zip(dir: &Path, name: &str, entries: &[(&str, &str)]) -> std::path::PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (entry, body) in entries {
            zip.start_file(*entry, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        path
    }

    #[test]
    fn test_prefers_watch_history() {
        let tmp = TempDir::new().unwrap();
        let path = write_zip(
            tmp.path(),
            "takeout.zip",
            &[
                ("Takeout/other.json", "{}"),
                ("Takeout/YouTube/history/watch-history.json", "[]"),
            ],
        );

        let doc = read_export(&path).unwrap().unwrap();
        assert_eq!(doc.entry_name, "Takeout/YouTube/history/watch-history.json");
        assert!(doc.value.is_array());
    }

    #[test]
    fn test_falls_back_to_first_json() {
        let tmp = TempDir::new().unwrap();
        let path = write_zip(
            tmp.path(),
            "scraped.zip",
            &[("readme.txt", "hi"), ("data.json", r#"{"tweets": []}"#)],
        );

        let doc = read_export(&path).unwrap().unwrap();
        assert_eq!(doc.entry_name, "data.json");
    }

    #[test]
    fn test_no_json_entry() {
        let tmp = TempDir::new().unwrap();
        let path = write_zip(tmp.path(), "empty.zip", &[("notes.txt", "nothing")]);
        assert!(read_export(&path).unwrap().is_none());
    }

    #[test]
    fn test_invalid_json_propagates() {
        let tmp = TempDir::new().unwrap();
        let path = write_zip(tmp.path(), "bad.zip", &[("watch-history.json", "[{")]);
        assert!(read_export(&path).is_err());
    }

    #[test]
    fn test_not_a_zip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("fake.zip");
        std::fs::write(&path, b"plain text").unwrap();
        assert!(read_export(&path).is_err());
    }
}
