//! Record loading from JSON data sources.
//!
//! Each source is a local JSON file or an `http(s)` URL fetched with a
//! blocking GET. Sources are read in configured order and their records
//! concatenated:
//!
//! ```text
//! [ {...}, {...} ]   -> every element is a record
//! { ... }            -> the object itself is the single record
//! ```
//!
//! Array elements that are not objects cannot carry fields and are skipped
//! with a warning.

use crate::{log, taxonomy::Record};
use serde_json::Value;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use url::Url;

/// Data source errors. All of them abort the run.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error when reading data source `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to fetch data source `{0}`")]
    Http(String, #[source] ureq::Error),

    #[error("data source `{0}` is not valid JSON")]
    Json(PathBuf, #[source] serde_json::Error),
}

/// Parse a source as a remote URL. Only `http` and `https` count.
///
/// `data/x.json`, `./x.json` and `C:\data\x.json` are local paths.
pub fn remote_url(source: &Path) -> Option<Url> {
    let url = Url::parse(source.to_str()?).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// Records loaded from all sources, plus how many elements were dropped.
#[derive(Debug, Default)]
pub struct LoadedRecords {
    pub records: Vec<Record>,
    pub skipped: usize,
}

/// Load and concatenate records from every source path.
pub fn load_records(sources: &[PathBuf]) -> Result<LoadedRecords, DataError> {
    let mut loaded = LoadedRecords::default();
    for source in sources {
        let value = read_json(source)?;
        let count = loaded.records.len();
        append_records(value, source, &mut loaded);
        crate::debug!("data"; "{}: {} records", source.display(), loaded.records.len() - count);
    }
    Ok(loaded)
}

fn read_json(path: &Path) -> Result<Value, DataError> {
    let content = match remote_url(path) {
        Some(url) => fetch(&url)?,
        None => fs::read_to_string(path).map_err(|err| DataError::Io(path.to_path_buf(), err))?,
    };
    serde_json::from_str(&content).map_err(|err| DataError::Json(path.to_path_buf(), err))
}

/// GET a remote source. Error statuses fail like unreadable files.
fn fetch(url: &Url) -> Result<String, DataError> {
    crate::debug!("data"; "fetching {}", url);
    let http_err = |err| DataError::Http(url.to_string(), err);
    ureq::get(url.as_str())
        .call()
        .map_err(http_err)?
        .into_body()
        .read_to_string()
        .map_err(http_err)
}

/// Flatten a decoded source into records.
fn append_records(value: Value, source: &Path, loaded: &mut LoadedRecords) {
    match value {
        Value::Array(items) => {
            for (i, item) in items.into_iter().enumerate() {
                match item {
                    Value::Object(map) => loaded.records.push(map),
                    other => {
                        log!("warning"; "{}: element {} is not an object, skipping: {}",
                            source.display(), i, other);
                        loaded.skipped += 1;
                    }
                }
            }
        }
        Value::Object(map) => loaded.records.push(map),
        other => {
            log!("warning"; "{}: root is not an object or array, skipping: {}",
                source.display(), other);
            loaded.skipped += 1;
        }
    }
}
