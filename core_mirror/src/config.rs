use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

pub const BUILTIN_MIRROR_CONFIG: &str = include_str!("data/mirror_config.json");

/// Client-side knobs for the mirror. Contract parameters come from the chain;
/// these only shape how the local index is assembled.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct MirrorConfig {
    /// Drop cached touched-planet ids and revealed coords before building.
    /// Useful where one contract address is redeployed repeatedly and local
    /// storage still holds ids from old universes.
    #[serde(default)]
    pub ignore_cached_world: bool,
    /// Fetch burned-coordinate deltas from the chain. The interface slot is
    /// reserved; the collection is served from cache only while disabled.
    #[serde(default)]
    pub fetch_burned_coords: bool,
    /// Same as `fetch_burned_coords` for kardashev coordinates.
    #[serde(default)]
    pub fetch_kardashev_coords: bool,
}

#[derive(Debug, Error)]
pub enum MirrorConfigError {
    #[error("failed to parse mirror config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read mirror config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Loads the mirror config from `MIRROR_CONFIG_PATH`, falling back to the
/// builtin defaults when the override is absent or unreadable.
pub fn load_mirror_config_from_env() -> MirrorConfig {
    if let Some(path) = env::var("MIRROR_CONFIG_PATH").ok().map(PathBuf::from) {
        match read_mirror_config_from_file(&path) {
            Ok(config) => return config,
            Err(err) => {
                tracing::warn!(
                    target: "chain_mirror::config",
                    path = %path.display(),
                    error = %err,
                    "mirror_config.load_failed"
                );
            }
        }
    }

    read_mirror_config_from_str(BUILTIN_MIRROR_CONFIG)
        .expect("builtin mirror config should parse")
}

fn read_mirror_config_from_file(path: &Path) -> Result<MirrorConfig, MirrorConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| MirrorConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    read_mirror_config_from_str(&contents)
}

fn read_mirror_config_from_str(data: &str) -> Result<MirrorConfig, MirrorConfigError> {
    Ok(serde_json::from_str(data)?)
}
