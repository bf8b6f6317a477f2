//! Repository factory, mirroring the teacher's `db::factory` pattern: an
//! explicit config struct selects a backend, and the factory returns a
//! trait object so callers never depend on the concrete type.

use super::{InMemoryRepository, SchedulingRepository};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which backend to construct. Only `local-repo` ships in this crate (spec
/// §1 treats persistence mechanics as an external collaborator); the enum
/// still enumerates the shape a full deployment would pick from, matching
/// the teacher's config surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositoryBackend {
    Local,
}

impl Default for RepositoryBackend {
    fn default() -> Self {
        RepositoryBackend::Local
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default)]
    pub backend: RepositoryBackend,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            backend: RepositoryBackend::default(),
        }
    }
}

/// Builds the configured repository backend.
pub fn build(config: &RepositoryConfig) -> Arc<dyn SchedulingRepository> {
    match config.backend {
        RepositoryBackend::Local => Arc::new(InMemoryRepository::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_selects_local_backend() {
        let config = RepositoryConfig::default();
        assert_eq!(config.backend, RepositoryBackend::Local);
    }
}
