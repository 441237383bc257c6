//! Loading filter configuration from YAML or JSON files.

use std::path::Path;

use common::FileFormat;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Reads a configuration file, picking the format from its extension.
///
/// Missing fields take their default values.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = FileFormat::from_file_name(&path.to_string_lossy())?;
    let text = std::fs::read_to_string(path).map_err(|e| Error::ReadConfig {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(common::deserialize(&text, format)?)
}

/// Writes a configuration file in the format implied by its extension.
pub fn save_config<T: serde::Serialize>(value: &T, path: &Path) -> Result<()> {
    let format = FileFormat::from_file_name(&path.to_string_lossy())?;
    let text = common::serialize(value, format)?;
    std::fs::write(path, text).map_err(|e| Error::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}
