use std::path::Path;

use anyhow::{Result, anyhow};
use serde::de::DeserializeOwned;

/// Parse a fixture file, naming the file and the JSON path of the first
/// offending value on failure.
pub fn from_str_with_path<T: DeserializeOwned>(file: &Path, src: &str) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        anyhow!("{}: at JSON path {path} → {}", file.display(), err.into_inner())
    })
}
