//! Client configuration loading.
//!
//! `academy.toml` in the current directory, falling back to
//! `~/.config/academy/config.toml`, with `${VAR}` references resolved from
//! the environment and `ACADEMY_TOKEN`/`ACADEMY_BASE_URL` overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use academy_core::traits::Session;

/// Connection settings for the academy server.
///
/// Note: Custom Debug impl masks the token to prevent accidental exposure
/// in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token for the session; `${VAR}` references are resolved.
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("base_url", &self.base_url)
            .field("token", &"***")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Top-level academy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcademyConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Session identity; trusted unconditionally.
    #[serde(default = "default_session")]
    pub session: Session,
    /// Directory holding the local progress cache.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Curriculum file; relative paths resolve against `data_dir`.
    #[serde(default = "default_curriculum")]
    pub curriculum: PathBuf,
}

fn default_session() -> Session {
    Session {
        user_id: "local".to_string(),
        email: "local@academy.invalid".to_string(),
        display_name: None,
    }
}

fn default_data_dir() -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(".local").join("share").join("academy"))
        .unwrap_or_else(|_| PathBuf::from("./academy-data"))
}

fn default_curriculum() -> PathBuf {
    PathBuf::from("curriculum.toml")
}

impl Default for AcademyConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            session: default_session(),
            data_dir: default_data_dir(),
            curriculum: default_curriculum(),
        }
    }
}

impl AcademyConfig {
    /// Curriculum file path, resolved against `data_dir` when relative.
    pub fn curriculum_path(&self) -> PathBuf {
        if self.curriculum.is_absolute() {
            self.curriculum.clone()
        } else {
            self.data_dir.join(&self.curriculum)
        }
    }

    /// Local progress cache file path.
    pub fn cache_path(&self) -> PathBuf {
        self.data_dir.join("progress.json")
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `academy.toml` in the current directory
/// 2. `~/.config/academy/config.toml`
///
/// Environment variable overrides: `ACADEMY_TOKEN`, `ACADEMY_BASE_URL`.
pub fn load_config() -> Result<AcademyConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<AcademyConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("academy.toml");
        if local.exists() {
            Some(local)
        } else if let Some(dir) = config_dir() {
            let global = dir.join("config.toml");
            global.exists().then_some(global)
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<AcademyConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => AcademyConfig::default(),
    };

    config.server.token = resolve_env_vars(&config.server.token);
    config.server.base_url = resolve_env_vars(&config.server.base_url);

    if let Ok(token) = std::env::var("ACADEMY_TOKEN") {
        config.server.token = token;
    }
    if let Ok(base_url) = std::env::var("ACADEMY_BASE_URL") {
        config.server.base_url = base_url;
    }

    Ok(config)
}

fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("academy"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_ACADEMY_TEST_VAR", "secret");
        assert_eq!(resolve_env_vars("${_ACADEMY_TEST_VAR}"), "secret");
        assert_eq!(
            resolve_env_vars("prefix_${_ACADEMY_TEST_VAR}_suffix"),
            "prefix_secret_suffix"
        );
        std::env::remove_var("_ACADEMY_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = AcademyConfig::default();
        assert_eq!(config.server.base_url, "http://localhost:3000");
        assert_eq!(config.server.timeout_secs, 30);
        assert_eq!(config.session.user_id, "local");
        assert_eq!(config.curriculum, PathBuf::from("curriculum.toml"));
    }

    #[test]
    fn parse_config_file() {
        let toml_str = r#"
data_dir = "/tmp/academy"
curriculum = "niveau1.toml"

[server]
base_url = "https://academy.example.com"
token = "tok-123"
timeout_secs = 10

[session]
user_id = "u42"
email = "u42@example.com"
display_name = "User 42"
"#;
        let config: AcademyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.base_url, "https://academy.example.com");
        assert_eq!(config.server.token, "tok-123");
        assert_eq!(config.session.user_id, "u42");
        assert_eq!(
            config.curriculum_path(),
            PathBuf::from("/tmp/academy/niveau1.toml")
        );
        assert_eq!(config.cache_path(), PathBuf::from("/tmp/academy/progress.json"));
    }

    #[test]
    fn load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("academy.toml");
        std::fs::write(&path, "[server]\nbase_url = \"http://test:9\"\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.server.base_url, "http://test:9");

        assert!(load_config_from(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn debug_masks_token() {
        let config = ServerConfig {
            token: "very-secret".into(),
            ..ServerConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("***"));
    }
}
