use std::fs;
use std::path::{Path, PathBuf};

use super::domain::UserProfile;

/// Failure while reading a profile seed file.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("seed file {path} is not a JSON array of profiles: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read a JSON array of profile documents.
pub fn load_profiles(path: impl AsRef<Path>) -> Result<Vec<UserProfile>, SeedError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_profiles(&raw).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_profiles(raw: &str) -> Result<Vec<UserProfile>, serde_json::Error> {
    serde_json::from_str(raw)
}
