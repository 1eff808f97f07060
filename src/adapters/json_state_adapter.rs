//! JSON file persistence for treasury and learnings state.
//!
//! Each save serializes the whole document to a sibling temp file and renames
//! it over the target, so a crash mid-write leaves the previous version.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::config::StatePaths;
use crate::domain::error::TreasuryError;
use crate::domain::learning::LearningsState;
use crate::domain::ledger::TreasuryState;
use crate::ports::state_port::StatePort;

pub struct JsonStateAdapter {
    treasury_file: PathBuf,
    learnings_file: PathBuf,
}

impl JsonStateAdapter {
    pub fn new(treasury_file: PathBuf, learnings_file: PathBuf) -> Self {
        Self {
            treasury_file,
            learnings_file,
        }
    }

    pub fn from_paths(paths: &StatePaths) -> Self {
        Self::new(paths.treasury_file.clone(), paths.learnings_file.clone())
    }

    pub fn treasury_file(&self) -> &Path {
        &self.treasury_file
    }

    pub fn learnings_file(&self) -> &Path {
        &self.learnings_file
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, TreasuryError> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(TreasuryError::Io(e)),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| TreasuryError::StateCorrupt {
            file: path.display().to_string(),
            reason: e.to_string(),
        })
}

/// Write `value` as pretty JSON via temp file + rename.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), TreasuryError> {
    let persist_err = |reason: String| TreasuryError::Persist {
        file: path.display().to_string(),
        reason,
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| persist_err(e.to_string()))?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|e| persist_err(e.to_string()))?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, json).map_err(|e| persist_err(e.to_string()))?;
    fs::rename(&tmp, path).map_err(|e| persist_err(e.to_string()))?;
    Ok(())
}

fn remove_if_present(path: &Path) -> Result<(), TreasuryError> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed state file");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(TreasuryError::Io(e)),
    }
}

impl StatePort for JsonStateAdapter {
    fn load_treasury(&self) -> Result<Option<TreasuryState>, TreasuryError> {
        read_json(&self.treasury_file)
    }

    fn save_treasury(&self, state: &TreasuryState) -> Result<(), TreasuryError> {
        write_json_atomic(&self.treasury_file, state)
    }

    fn load_learnings(&self) -> Result<Option<LearningsState>, TreasuryError> {
        read_json(&self.learnings_file)
    }

    fn save_learnings(&self, state: &LearningsState) -> Result<(), TreasuryError> {
        write_json_atomic(&self.learnings_file, state)
    }

    fn reset(&self) -> Result<(), TreasuryError> {
        remove_if_present(&self.treasury_file)?;
        remove_if_present(&self.learnings_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn adapter(dir: &TempDir) -> JsonStateAdapter {
        JsonStateAdapter::new(
            dir.path().join("state/treasury.json"),
            dir.path().join("state/learnings.json"),
        )
    }

    fn sample_state() -> TreasuryState {
        TreasuryState::new(300.0, Utc.with_ymd_and_hms(2026, 3, 4, 9, 0, 0).unwrap())
    }

    #[test]
    fn missing_files_load_as_none() {
        let dir = TempDir::new().unwrap();
        let a = adapter(&dir);
        assert!(a.load_treasury().unwrap().is_none());
        assert!(a.load_learnings().unwrap().is_none());
    }

    #[test]
    fn save_creates_parent_dirs_and_reloads() {
        let dir = TempDir::new().unwrap();
        let a = adapter(&dir);
        let state = sample_state();
        a.save_treasury(&state).unwrap();
        assert!(a.treasury_file().exists());
        assert_eq!(a.load_treasury().unwrap(), Some(state));
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let a = adapter(&dir);
        a.save_treasury(&sample_state()).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path().join("state"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["treasury.json".to_string()]);
    }

    #[test]
    fn garbage_is_state_corrupt() {
        let dir = TempDir::new().unwrap();
        let a = adapter(&dir);
        fs::create_dir_all(dir.path().join("state")).unwrap();
        fs::write(a.treasury_file(), "{ not json").unwrap();
        let err = a.load_treasury().unwrap_err();
        assert!(matches!(err, TreasuryError::StateCorrupt { .. }));
    }

    #[test]
    fn missing_field_is_state_corrupt() {
        let dir = TempDir::new().unwrap();
        let a = adapter(&dir);
        fs::create_dir_all(dir.path().join("state")).unwrap();
        fs::write(a.treasury_file(), r#"{"balances": {"total": 300.0}}"#).unwrap();
        let err = a.load_treasury().unwrap_err();
        assert!(matches!(err, TreasuryError::StateCorrupt { reason, .. } if reason.contains("missing field")));
    }

    #[test]
    fn reset_removes_both_files() {
        let dir = TempDir::new().unwrap();
        let a = adapter(&dir);
        a.save_treasury(&sample_state()).unwrap();
        a.save_learnings(&LearningsState::new(Utc::now())).unwrap();
        a.reset().unwrap();
        assert!(!a.treasury_file().exists());
        assert!(!a.learnings_file().exists());
    }

    #[test]
    fn reset_without_files_is_ok() {
        let dir = TempDir::new().unwrap();
        assert!(adapter(&dir).reset().is_ok());
    }

    #[test]
    fn unwritable_target_is_persist_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();
        let a = JsonStateAdapter::new(blocker.join("treasury.json"), blocker.join("learnings.json"));
        let err = a.save_treasury(&sample_state()).unwrap_err();
        assert!(matches!(err, TreasuryError::Persist { .. }));
    }
}
