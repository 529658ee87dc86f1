// src/core/config_manager.rs
//! Configuration loading: `config.yaml` per environment, then env overrides

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment_name: String,
    pub environment: EnvironmentConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub database_path: PathBuf,
    pub port: u16,
    pub jwt_secret: String,
    pub token_validity_hours: i64,
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub log_path: Option<PathBuf>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("jobposting.db"),
            port: 8080,
            jwt_secret: "change-me-in-config-yaml".to_string(),
            token_validity_hours: 24,
            default_page_size: 20,
            max_page_size: 100,
            log_path: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: EnvironmentConfig,
    #[serde(default)]
    production: EnvironmentConfig,
}

impl ConfigManager {
    /// Load the configuration for the current environment
    pub fn load() -> Result<Self> {
        let environment_name = Self::environment_name();
        info!("Loading configuration for environment: {}", environment_name);

        let config_path = PathBuf::from(CONFIG_FILE);
        let mut environment = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            Self::from_yaml_str(&content, &environment_name)?
        } else {
            info!("{} not found, using built-in defaults", CONFIG_FILE);
            EnvironmentConfig::default()
        };

        environment.apply_env_overrides()?;
        environment.database_path = resolve_path(&environment.database_path)?;
        if let Some(log_path) = environment.log_path.take() {
            environment.log_path = Some(resolve_path(&log_path)?);
        }

        Ok(Self {
            environment_name,
            environment,
        })
    }

    fn environment_name() -> String {
        std::env::var("JOBPOSTING_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    /// Pick the section matching `environment` out of a YAML document
    pub fn from_yaml_str(content: &str, environment: &str) -> Result<EnvironmentConfig> {
        let file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse config.yaml")?;

        let config = match environment {
            "production" => file.production,
            _ => file.local,
        };
        config.validate()?;
        Ok(config)
    }

    /// Ensure the database directory exists
    pub async fn ensure_directories(&self) -> Result<()> {
        if let Some(db_parent) = self.environment.database_path.parent() {
            tokio::fs::create_dir_all(db_parent).await.with_context(|| {
                format!("Failed to create database directory: {}", db_parent.display())
            })?;
        }
        if let Some(log_parent) = self.environment.log_path.as_ref().and_then(|p| p.parent()) {
            tokio::fs::create_dir_all(log_parent).await.with_context(|| {
                format!("Failed to create log directory: {}", log_parent.display())
            })?;
        }
        Ok(())
    }
}

impl EnvironmentConfig {
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("DATABASE_PATH") {
            self.database_path = PathBuf::from(path);
        }
        if let Ok(port) = std::env::var("ROCKET_PORT") {
            self.port = port
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("ROCKET_PORT must be a valid port number"))?;
        }
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            self.jwt_secret = secret;
        }
        if let Ok(path) = std::env::var("LOG_PATH") {
            self.log_path = Some(PathBuf::from(path));
        }
        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            anyhow::bail!("jwt_secret must not be empty");
        }
        if self.default_page_size == 0 || self.max_page_size == 0 {
            anyhow::bail!("page sizes must be positive");
        }
        if self.default_page_size > self.max_page_size {
            anyhow::bail!(
                "default_page_size ({}) exceeds max_page_size ({})",
                self.default_page_size,
                self.max_page_size
            );
        }
        if self.token_validity_hours <= 0 {
            anyhow::bail!("token_validity_hours must be positive");
        }
        Ok(())
    }
}

fn resolve_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(current_dir.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
local:
  database_path: data/local.db
  port: 9000
  jwt_secret: local-secret
production:
  database_path: /var/lib/jobposting/prod.db
  jwt_secret: prod-secret
  default_page_size: 50
  max_page_size: 200
  log_path: /var/log/jobposting/api.log
"#;

    #[test]
    fn test_selects_local_section_by_default() {
        let config = ConfigManager::from_yaml_str(SAMPLE, "staging").unwrap();
        assert_eq!(config.database_path, PathBuf::from("data/local.db"));
        assert_eq!(config.port, 9000);
        assert_eq!(config.jwt_secret, "local-secret");
        assert_eq!(config.default_page_size, 20);
        assert!(config.log_path.is_none());
    }

    #[test]
    fn test_selects_production_section() {
        let config = ConfigManager::from_yaml_str(SAMPLE, "production").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.default_page_size, 50);
        assert_eq!(config.max_page_size, 200);
        assert_eq!(
            config.log_path,
            Some(PathBuf::from("/var/log/jobposting/api.log"))
        );
    }

    #[test]
    fn test_rejects_inconsistent_page_sizes() {
        let yaml = "local:\n  default_page_size: 500\n  max_page_size: 100\n";
        assert!(ConfigManager::from_yaml_str(yaml, "local").is_err());
    }

    #[test]
    fn test_rejects_blank_secret() {
        let yaml = "local:\n  jwt_secret: \"  \"\n";
        assert!(ConfigManager::from_yaml_str(yaml, "local").is_err());
    }
}
