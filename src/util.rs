use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::AppError;

/// Deserialize a string into an enum variant using serde's own rules.
/// Single source of truth: uses the same rename/rename_all config as normal deserialization.
pub fn from_serde_str<T: for<'de> serde::Deserialize<'de>>(s: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(s.to_string())).ok()
}

/// Parse a choice id into its enum, naming the option on failure.
pub fn parse_choice<T: for<'de> serde::Deserialize<'de>>(option: &str, id: &str) -> Result<T, AppError> {
    from_serde_str(id)
        .ok_or_else(|| AppError::validation(format!("Option '{option}' has no choice '{id}'")))
}

/// Atomically write bytes to a file using write-to-temp-then-rename.
///
/// The data goes to a `.tmp` sibling, is fsynced, and is then renamed over
/// the target, so a crash mid-write never leaves a truncated file behind.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<(), AppError> {
    let file_name = path.file_name().unwrap_or_default();
    let mut tmp_name = OsString::from(file_name);
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(&tmp_name);

    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(value)?;
    atomic_write(path, json.as_bytes())
}

pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let data = fs::read_to_string(path)?;
    let value = serde_json::from_str(&data)?;
    Ok(value)
}
