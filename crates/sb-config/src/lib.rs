//! sns-briefing/crates/sb-config/src/lib.rs
//!
//! Layered configuration: `config/default.toml` (optional), an explicit
//! file (optional), then `SB_*` environment variables with `__` between
//! nested keys, e.g. `SB_FIREBASE__PROJECT_ID`.

use config::{Config, Environment, File, FileFormat};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "config/default";
pub const ENV_PREFIX: &str = "SB";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Web connection descriptor of the Firebase project.
#[derive(Debug, Deserialize)]
pub struct FirebaseConfig {
    #[serde(default = "empty_secret")]
    pub api_key: SecretString,
    #[serde(default)]
    pub auth_domain: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub storage_bucket: String,
    #[serde(default)]
    pub messaging_sender_id: String,
    #[serde(default)]
    pub app_id: String,
    pub measurement_id: Option<String>,
    /// Overrides the public Firestore endpoint (emulators, proxies)
    pub base_url: Option<String>,
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            api_key: empty_secret(),
            auth_domain: String::new(),
            project_id: String::new(),
            storage_bucket: String::new(),
            messaging_sender_id: String::new(),
            app_id: String::new(),
            measurement_id: None,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub output_dir: PathBuf,
    pub posts_per_page: usize,
    pub briefings_per_page: usize,
    pub runs_limit: usize,
    /// Upper bound on pages written per paginated series
    pub max_pages: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "SNS Briefing".to_string(),
            output_dir: PathBuf::from("site"),
            posts_per_page: 50,
            briefings_per_page: 20,
            runs_limit: 10,
            max_pages: 50,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub firebase: FirebaseConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

impl AppConfig {
    /// Loads `.env` and the layered sources, then validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = Self::load_unchecked(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Same as [`AppConfig::load`] but only the site section is validated.
    /// For rendering from a local snapshot, where no project is needed.
    pub fn load_unchecked(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Ok(env_file) = dotenvy::dotenv() {
            tracing::debug!(path = %env_file.display(), "loaded .env");
        }

        let mut builder = Config::builder()
            .add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false));
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate_site()?;
        tracing::info!(
            project_id = %config.firebase.project_id,
            output_dir = %config.site.output_dir.display(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Parses a TOML document without touching files or the environment.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_firebase()?;
        self.validate_site()
    }

    pub fn validate_firebase(&self) -> Result<(), ConfigError> {
        if self.firebase.project_id.trim().is_empty() {
            return Err(ConfigError::Invalid("firebase.project_id is required".into()));
        }
        if self.firebase.api_key.expose_secret().trim().is_empty() {
            return Err(ConfigError::Invalid("firebase.api_key is required".into()));
        }
        Ok(())
    }

    pub fn validate_site(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("site.posts_per_page", self.site.posts_per_page),
            ("site.briefings_per_page", self.site.briefings_per_page),
            ("site.runs_limit", self.site.runs_limit),
            ("site.max_pages", self.site.max_pages),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive")));
            }
        }
        Ok(())
    }
}
