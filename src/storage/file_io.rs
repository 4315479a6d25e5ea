//! JSON file access for the repositories
//!
//! Reads treat a missing file as empty. Writes go through a sibling temp file
//! and a rename, so a crash mid-write leaves the previous version in place.

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::GoalPlanError;

fn storage_error(action: &str, path: &Path, e: impl Display) -> GoalPlanError {
    GoalPlanError::Storage(format!("Failed to {} {}: {}", action, path.display(), e))
}

/// Temp file next to `path`, unique per process so two writers never share one
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

/// Load a data file; a file that was never written loads as `T::default()`
pub fn read_json<T, P>(path: P) -> Result<T, GoalPlanError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path).map_err(|e| storage_error("open", path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| storage_error("parse", path, e))
}

/// Replace a data file with `data` in one step
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), GoalPlanError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| storage_error("create directory", parent, e))?;
    }

    let temp_path = temp_path_for(path);
    let written = File::create(&temp_path)
        .map_err(|e| storage_error("create", &temp_path, e))
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, data)
                .map_err(|e| storage_error("serialize", path, e))?;
            writer.flush().map_err(|e| storage_error("flush", &temp_path, e))?;
            writer
                .get_ref()
                .sync_all()
                .map_err(|e| storage_error("sync", &temp_path, e))
        })
        .and_then(|()| fs::rename(&temp_path, path).map_err(|e| storage_error("replace", path, e)));

    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written
}
