//! CLI command implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use academy_client::{AcademyConfig, HttpCertificateIssuer, HttpProgressStore};
use academy_core::key::ModuleKey;
use academy_core::model::Curriculum;
use academy_sync::{ProgressCache, ProgressTracker};

pub mod certificates;
pub mod init;
pub mod quiz;
pub mod status;
pub mod sync;
pub mod validate;
pub mod watch;

/// Load the configured curriculum, with a pointer to `academy init` when
/// it is missing.
pub fn load_curriculum(config: &AcademyConfig) -> Result<Curriculum> {
    let path = config.curriculum_path();
    if !path.exists() {
        anyhow::bail!(
            "curriculum not found at {} (run `academy init` to create a starter one)",
            path.display()
        );
    }
    academy_core::parser::load_curriculum(&path)
}

pub fn load_config(path: Option<&Path>) -> Result<AcademyConfig> {
    academy_client::load_config_from(path).context("failed to load configuration")
}

/// Assemble the session tracker from configuration.
pub fn build_tracker(config: &AcademyConfig) -> Result<ProgressTracker> {
    let curriculum = load_curriculum(config)?;
    let cache_path: PathBuf = config.cache_path();
    let cache = ProgressCache::load(&cache_path);

    let store = Arc::new(HttpProgressStore::with_timeout(
        &config.server.base_url,
        &config.server.token,
        config.server.timeout_secs,
    ));
    let issuer = Arc::new(HttpCertificateIssuer::with_timeout(
        &config.server.base_url,
        &config.server.token,
        config.server.timeout_secs,
    ));

    Ok(ProgressTracker::new(
        curriculum, cache, cache_path, store, issuer,
    ))
}

pub fn module_key(level: &str, chapter: &str, subject: &str) -> ModuleKey {
    ModuleKey::new(level, chapter, subject)
}
