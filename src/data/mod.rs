use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub mod gen;
pub mod run;

pub use run::{run, Report, ReportEntry};

/// Reads a JSON value from the reader.
///
/// # Errors
/// - If the reader fails or the content is not a valid value.
pub fn deserialize<T: DeserializeOwned>(reader: &mut impl BufRead) -> Result<T> {
    Ok(serde_json::from_reader(reader)?)
}

/// Writes a value as pretty JSON.
///
/// # Errors
/// - If the value cannot be represented as JSON.
pub fn to_string<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Reads a JSON value from a file.
///
/// # Errors
/// - If the file cannot be opened or does not hold a valid value.
pub fn read_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    deserialize(&mut BufReader::new(file)).with_context(|| format!("cannot parse {}", path.display()))
}

/// Writes a value as pretty JSON to a file, creating missing parent directories.
///
/// # Errors
/// - If the directories or the file cannot be written.
pub fn write_file<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_string(value)?).with_context(|| format!("cannot write {}", path.display()))
}
