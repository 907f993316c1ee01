//! Configuration: backend location and console behavior.
//!
//! Loaded from TOML with project config taking priority over the user-level
//! file; every field has a default so an empty file (or none at all) works.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A validation error in the configuration
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.field, self.message)
    }
}

/// Where the catalog backend lives and how its resources are addressed.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path of the product collection. The backend exposes it in the
    /// singular, hence the odd default.
    #[serde(default = "default_products_path")]
    pub products_path: String,
    #[serde(default = "default_users_path")]
    pub users_path: String,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_products_path() -> String {
    "product".to_string()
}

fn default_users_path() -> String {
    "users".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            products_path: default_products_path(),
            users_path: default_users_path(),
        }
    }
}

/// Console behavior knobs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsoleConfig {
    /// Ask before delete/toggle. `--yes` overrides this at runtime.
    #[serde(default = "default_true")]
    pub confirm_destructive: bool,
    #[serde(default)]
    pub history_file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            confirm_destructive: true,
            history_file: None,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
}

impl Config {
    /// Load configuration from default paths.
    /// Priority: project (.shopctl/config.toml) > user (~/.shopctl/config.toml) > defaults
    pub fn load() -> Result<Self> {
        let project = Path::new(".shopctl").join("config.toml");
        if project.exists() {
            return Self::load_from(&project);
        }
        if let Some(home) = dirs::home_dir() {
            let user = home.join(".shopctl").join("config.toml");
            if user.exists() {
                return Self::load_from(&user);
            }
        }
        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// The history file the REPL should use.
    pub fn history_path(&self) -> PathBuf {
        self.console
            .history_file
            .clone()
            .unwrap_or_else(|| Path::new(".shopctl").join("history"))
    }

    /// Structural validation; collects every problem instead of stopping at
    /// the first.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            errors.push(ValidationError {
                field: "api.base_url".to_string(),
                message: format!(
                    "Must start with http:// or https://, got '{}'",
                    self.api.base_url
                ),
            });
        }

        for (field, value) in [
            ("api.products_path", &self.api.products_path),
            ("api.users_path", &self.api.users_path),
        ] {
            if value.trim_matches('/').is_empty() {
                errors.push(ValidationError {
                    field: field.to_string(),
                    message: "Resource path must not be empty".to_string(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:3000");
        assert_eq!(config.api.products_path, "product");
        assert_eq!(config.api.users_path, "users");
        assert!(config.console.confirm_destructive);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"https://shop.example.com\"\n\n[console]\nconfirm_destructive = false"
        )
        .unwrap();
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.api.base_url, "https://shop.example.com");
        // Unset fields keep their defaults.
        assert_eq!(config.api.products_path, "product");
        assert!(!config.console.confirm_destructive);
    }

    #[test]
    fn test_empty_file_is_all_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_validation_error_display() {
        let error = ValidationError {
            field: "api.base_url".to_string(),
            message: "Must start with http:// or https://".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "[api.base_url]: Must start with http:// or https://"
        );
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.api.base_url = "localhost:3000".to_string();
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].field.contains("base_url"));
    }

    #[test]
    fn test_validate_rejects_empty_paths() {
        let mut config = Config::default();
        config.api.products_path = "/".to_string();
        config.api.users_path = String::new();
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_history_path_override() {
        let mut config = Config::default();
        assert_eq!(config.history_path(), Path::new(".shopctl").join("history"));
        config.console.history_file = Some(PathBuf::from("/tmp/h"));
        assert_eq!(config.history_path(), PathBuf::from("/tmp/h"));
    }
}
