use std::fs;
use std::path::Path;

/// Manifest entry whose destination contents are replaced by the runtime
/// configuration bundle when one is available.
pub const RUNTIME_CONFIG_KEY: &str = "runtimeConfig.json";
pub const DEFAULT_MANIFEST_PATH: &str = "webapp-manifest.json";

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("manifest must be a JSON array of relative keys: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Ordered list of website asset keys, relative to the source prefix and to
/// the destination bucket root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    keys: Vec<String>,
}

impl Manifest {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ManifestError> {
        let keys: Vec<String> = serde_json::from_slice(bytes)?;
        Ok(Self { keys })
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let bytes = fs::read(path).map_err(|source| ManifestError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_slice(&bytes)
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
