//! Service configuration.
//!
//! Layers, lowest precedence first: built-in defaults, an optional TOML file,
//! then `SUBCHECK_*` environment variables. Binaries apply CLI flags on top and
//! hand the finished value to the components that need it.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SubcheckError};
use crate::policy::ExtractPolicy;
use crate::search::SearchConfig;

pub const ENV_CONFIG: &str = "SUBCHECK_CONFIG";
pub const ENV_API_KEY: &str = "SUBCHECK_SEARCH_API_KEY";
pub const ENV_ENGINE_ID: &str = "SUBCHECK_SEARCH_ENGINE_ID";
pub const ENV_ENDPOINT: &str = "SUBCHECK_SEARCH_ENDPOINT";
pub const ENV_BIND: &str = "SUBCHECK_BIND";
pub const ENV_REQUIREMENTS: &str = "SUBCHECK_REQUIREMENTS";

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_extract_dir() -> PathBuf {
    PathBuf::from("extracted_files")
}

fn default_max_upload_bytes() -> usize {
    64 * 1024 * 1024
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    #[serde(default = "default_extract_dir")]
    pub extract_dir: PathBuf,
    /// External requirements table; the embedded one is used when unset.
    #[serde(default)]
    pub requirements_path: Option<PathBuf>,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub extract: ExtractPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            upload_dir: default_upload_dir(),
            extract_dir: default_extract_dir(),
            requirements_path: None,
            max_upload_bytes: default_max_upload_bytes(),
            search: SearchConfig::default(),
            extract: ExtractPolicy::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| SubcheckError::Config(format!("config decode: {e}")))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| SubcheckError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// File (explicit path, else `SUBCHECK_CONFIG`, else defaults) plus process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::load_with_env(path, &env)
    }

    pub fn load_with_env(path: Option<&Path>, env: &HashMap<String, String>) -> Result<Self> {
        let file = path
            .map(Path::to_path_buf)
            .or_else(|| env.get(ENV_CONFIG).map(PathBuf::from));
        let mut cfg = match file {
            Some(p) => Self::load_from(&p)?,
            None => Self::default(),
        };
        cfg.apply_env(env);
        Ok(cfg)
    }

    pub fn apply_env(&mut self, env: &HashMap<String, String>) {
        let get = |k: &str| env.get(k).filter(|v| !v.trim().is_empty()).cloned();
        if let Some(v) = get(ENV_API_KEY) {
            self.search.api_key = v;
        }
        if let Some(v) = get(ENV_ENGINE_ID) {
            self.search.engine_id = v;
        }
        if let Some(v) = get(ENV_ENDPOINT) {
            self.search.endpoint = v;
        }
        if let Some(v) = get(ENV_BIND) {
            self.bind = v;
        }
        if let Some(v) = get(ENV_REQUIREMENTS) {
            self.requirements_path = Some(PathBuf::from(v));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_leave_search_unconfigured() {
        let cfg = AppConfig::load_with_env(None, &env(&[])).unwrap();
        assert_eq!(cfg.bind, "127.0.0.1:5000");
        assert_eq!(cfg.upload_dir, PathBuf::from("uploads"));
        assert_eq!(cfg.extract_dir, PathBuf::from("extracted_files"));
        assert!(!cfg.search.is_configured());
        assert_eq!(cfg.search.request_interval_ms, 1_000);
    }

    #[test]
    fn file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("subcheck.toml");
        fs::write(
            &p,
            r#"
bind = "0.0.0.0:8080"
max_upload_bytes = 1024

[search]
api_key = "from-file"
engine_id = "cx-file"
request_interval_ms = 50

[extract]
max_entries = 10
"#,
        )
        .unwrap();

        let cfg = AppConfig::load_with_env(
            None,
            &env(&[
                (ENV_CONFIG, p.to_str().unwrap()),
                (ENV_API_KEY, "from-env"),
                (ENV_ENGINE_ID, ""),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.bind, "0.0.0.0:8080");
        assert_eq!(cfg.max_upload_bytes, 1024);
        assert_eq!(cfg.search.api_key, "from-env");
        assert_eq!(cfg.search.engine_id, "cx-file");
        assert_eq!(cfg.search.request_interval_ms, 50);
        assert_eq!(cfg.extract.max_entries, Some(10));
        assert!(cfg.extract.skip_resource_forks);
        assert!(cfg.search.is_configured());
    }

    #[test]
    fn bad_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("broken.toml");
        fs::write(&p, "bind = [").unwrap();
        assert!(matches!(
            AppConfig::load_from(&p),
            Err(SubcheckError::Config(_))
        ));
        assert!(AppConfig::load_from(&dir.path().join("absent.toml")).is_err());
    }
}
