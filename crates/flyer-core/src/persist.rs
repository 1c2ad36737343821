//! Atomic JSON artifact persistence.
//!
//! Every component saves its state as one JSON file under the data
//! directory. Writes go to a sibling temp file and are renamed into place
//! so a crash mid-write never leaves a partial artifact. Corrupt or
//! missing files at load time are non-fatal: the component logs a warning
//! and starts from defaults.

use std::fs;
use std::io;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::errors::PersistError;

fn io_err(path: &Path, err: io::Error) -> PersistError {
    PersistError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Serialize `value` and atomically replace `path` with it.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let json = serde_json::to_vec_pretty(value).map_err(|e| PersistError::Malformed {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    tmp_name.push_str(".tmp");
    let tmp = path.with_file_name(tmp_name);

    fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
    Ok(())
}

/// Load an artifact. `Ok(None)` when the file does not exist.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PersistError> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(path).map_err(|e| io_err(path, e))?;
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| PersistError::Malformed {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Load an artifact, degrading to `T::default()` on a missing or corrupt
/// file. Corruption is logged, never raised.
pub fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match load_json(path) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "failed to load persisted artifact, starting from defaults"
            );
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        count: u32,
        name: String,
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sample.json");
        let value = Sample {
            count: 7,
            name: "walmart".into(),
        };

        save_json(&path, &value).unwrap();
        let loaded: Sample = load_json(&path).unwrap().unwrap();
        assert_eq!(loaded, value);
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded: Option<Sample> = load_json(&dir.path().join("absent.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn corrupt_file_degrades_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, b"{not json").unwrap();

        let loaded: Sample = load_json_or_default(&path);
        assert_eq!(loaded, Sample::default());
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        save_json(&path, &Sample::default()).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries, vec!["state.json"]);
    }
}
