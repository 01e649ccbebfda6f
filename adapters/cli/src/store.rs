use std::{fs, io::ErrorKind, path::PathBuf};

use pond_snap_core::{HighScoreStore, PersistenceError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
struct HighScoreFile {
    high_score: u32,
}

/// Persists the high score as a small JSON document on disk.
///
/// A missing file reads as zero; every other failure maps onto
/// [`PersistenceError`] and the engine carries on with the in-memory score.
#[derive(Debug)]
pub(crate) struct FileHighScoreStore {
    path: PathBuf,
}

impl FileHighScoreStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn load(&mut self) -> Result<u32, PersistenceError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(0),
            Err(error) => return Err(PersistenceError::Unavailable(error.to_string())),
        };

        let file: HighScoreFile = serde_json::from_str(&contents)
            .map_err(|error| PersistenceError::Malformed(error.to_string()))?;
        Ok(file.high_score)
    }

    fn save(&mut self, score: u32) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(&HighScoreFile { high_score: score })
            .map_err(|error| PersistenceError::Unavailable(error.to_string()))?;
        fs::write(&self.path, json).map_err(|error| PersistenceError::Unavailable(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pond-snap-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn missing_file_reads_as_zero() {
        let mut store = FileHighScoreStore::new(scratch_path("missing"));
        assert_eq!(store.load().expect("load"), 0);
    }

    #[test]
    fn saved_scores_read_back() {
        let path = scratch_path("round-trip");
        let mut store = FileHighScoreStore::new(path.clone());

        store.save(42).expect("save");
        assert_eq!(store.load().expect("load"), 42);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn corrupt_files_surface_as_malformed() {
        let path = scratch_path("corrupt");
        fs::write(&path, "not json").expect("write fixture");

        let mut store = FileHighScoreStore::new(path.clone());
        assert!(matches!(
            store.load(),
            Err(PersistenceError::Malformed(_))
        ));

        let _ = fs::remove_file(path);
    }
}
