//! File-based credential source (YAML)

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::source::{CredentialSource, CredentialSourceError, CredentialSourceResult};
use crate::types::ProviderCredentialRecord;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(default)]
    credentials: Vec<ProviderCredentialRecord>,
}

/// Reads credential records from a YAML file on every call
///
/// ```yaml
/// credentials:
///   - provider: googleai
///     encrypted_key: "..."
///     is_active: true
/// ```
///
/// A missing file is unavailable, not empty: the store then falls back to the
/// environment for every provider.
#[derive(Debug, Clone)]
pub struct FileCredentialSource {
    path: PathBuf,
}

impl FileCredentialSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialSource for FileCredentialSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn active_records(&self) -> CredentialSourceResult<Vec<ProviderCredentialRecord>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CredentialSourceError::Unavailable(format!(
                    "{} does not exist",
                    self.path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let file: CredentialFile = serde_yaml::from_str(&content)
            .map_err(|e| CredentialSourceError::Parse(e.to_string()))?;

        Ok(file.credentials.into_iter().filter(|r| r.is_active).collect())
    }
}
