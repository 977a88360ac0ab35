use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Instant;

use serde_json::Value;
use tracing::{error, info};

use crate::domain::FvError;
use crate::engine::DatasetEngine;

/// Where the record array comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Path(PathBuf),
    Url(String),
}

impl Source {
    pub fn parse(s: &str) -> Source {
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Source::Url(s.to_string());
        }
        let expanded = shellexpand::full(s)
            .map(|p| p.into_owned())
            .unwrap_or_else(|_| s.to_string());
        Source::Path(PathBuf::from(expanded))
    }

    pub fn name(&self) -> String {
        match self {
            Source::Path(path) => path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("???")
                .to_string(),
            Source::Url(url) => url.clone(),
        }
    }

    /// Reads and parses the document without interpreting its shape.
    pub fn fetch(&self) -> Result<Value, FvError> {
        let text = match self {
            Source::Path(path) => read_file(path)?,
            Source::Url(url) => fetch_url(url)?,
        };
        Ok(serde_json::from_str(&text)?)
    }
}

fn read_file(path: &PathBuf) -> Result<String, FvError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => FvError::FileNotFound,
        ErrorKind::PermissionDenied => FvError::PermissionDenied,
        _ => FvError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(FvError::LoadingFailed("Not a file!".into()));
    }
    Ok(fs::read_to_string(path)?)
}

fn fetch_url(url: &str) -> Result<String, FvError> {
    let response = reqwest::blocking::get(url)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FvError::HttpStatus(status.as_u16()));
    }
    Ok(response.text()?)
}

/// Loads `source` into the engine. A failed fetch is logged and the engine
/// falls back to an empty dataset; the returned error is informational.
pub fn load_into(engine: &mut DatasetEngine, source: &Source) -> Result<usize, FvError> {
    let start_time = Instant::now();
    match source.fetch() {
        Ok(data) => {
            engine.load(data);
            info!(
                "Loaded {} records from {} in {}ms",
                engine.total(),
                source.name(),
                start_time.elapsed().as_millis()
            );
            Ok(engine.total())
        }
        Err(e) => {
            error!("Error fetching or parsing data from {:?}: {e}", source);
            engine.load(Value::Array(Vec::new()));
            Err(e)
        }
    }
}
