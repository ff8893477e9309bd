//! TOML-based configuration.
//!
//! Example configuration:
//! ```toml
//! [transport]
//! host = "my123456.crm.ondemand.com"
//! protocol = "https"
//! port = 443
//! username = "${ODATA_USER}"
//! password = "${ODATA_PASSWORD}"
//! timeout_seconds = 30
//!
//! [services.c4c]
//! endpoint = "/sap/c4c/odata/v1/c4codataapi"
//! lazy_load = true
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP session settings.
    pub transport: TransportSettings,

    /// Named OData services.
    pub services: HashMap<String, ServiceSettings>,
}

/// HTTP session settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Host name of the source system, without scheme or port.
    pub host: String,

    /// `http` or `https`.
    pub protocol: String,

    pub port: u16,

    /// Basic-auth user (supports ${ENV_VAR} expansion).
    pub username: Option<String>,

    /// Basic-auth password (supports ${ENV_VAR} expansion).
    pub password: Option<String>,

    /// Per-request timeout.
    pub timeout_seconds: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            protocol: "https".to_string(),
            port: 443,
            username: None,
            password: None,
            timeout_seconds: 30,
        }
    }
}

impl TransportSettings {
    /// `<protocol>://<host>:<port>`
    pub fn base_url(&self) -> Result<String, SettingsError> {
        if self.host.trim().is_empty() {
            return Err(SettingsError::InvalidConfig(
                "transport.host is not set".to_string(),
            ));
        }
        match self.protocol.as_str() {
            "http" | "https" => {}
            other => {
                return Err(SettingsError::InvalidConfig(format!(
                    "unsupported protocol '{}', expected http or https",
                    other
                )))
            }
        }
        Ok(format!("{}://{}:{}", self.protocol, self.host, self.port))
    }

    /// Credentials with environment variables expanded, if a user is configured.
    pub fn resolved_credentials(&self) -> Result<Option<(String, String)>, SettingsError> {
        let Some(username) = &self.username else {
            return Ok(None);
        };
        let password = match &self.password {
            Some(p) => expand_env_vars(p)?,
            None => String::new(),
        };
        Ok(Some((expand_env_vars(username)?, password)))
    }
}

/// A registered OData service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceSettings {
    /// Service root path, e.g. `/sap/opu/odata/sap/API_BUSINESS_PARTNER`.
    pub endpoint: String,

    /// Keep entity metadata compressed until first use.
    #[serde(default = "default_lazy_load")]
    pub lazy_load: bool,
}

fn default_lazy_load() -> bool {
    true
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `ODATA_ORM_CONFIG`
    /// 2. `./odata-orm.toml`
    /// 3. `~/.config/odata-orm/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("ODATA_ORM_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("odata-orm.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("odata-orm").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Get a service by name.
    pub fn get_service(&self, name: &str) -> Result<&ServiceSettings, SettingsError> {
        self.services
            .get(name)
            .ok_or_else(|| SettingsError::ServiceNotFound(name.to_string()))
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            let name: String = std::iter::from_fn(|| chars.next_if(|&ch| ch != '}')).collect();
            chars.next(); // consume '}'
            name
        } else {
            std::iter::from_fn(|| chars.next_if(|&ch| ch.is_alphanumeric() || ch == '_')).collect()
        };

        if var_name.is_empty() {
            // Lone $, keep it
            result.push('$');
            continue;
        }

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}
