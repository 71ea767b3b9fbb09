//! # Router Configuration Module
//!
//! Defaults for route registration plus logging settings, read from a YAML
//! file and overridden by environment variables.
//!
//! ## Example Configuration
//!
//! ```yaml
//! resource_id_param: slug
//! default_methods: [GET, POST]
//! log:
//!   log_level: debug
//!   format: json
//! ```
//!
//! ## Environment Variables
//!
//! ### `SWITCHYARD_RESOURCE_PARAM`
//!
//! Placeholder name used for the id segment of resource routes
//! (`/photos/:id`). Default: `id`.
//!
//! The `SWITCHYARD_LOG_*` variables are described in [`crate::logging`].
//!
//! ## Usage
//!
//! ```rust
//! use switchyard::config::RouterConfig;
//! use switchyard::router::RouteBuilder;
//!
//! let config = RouterConfig::from_env();
//! let builder = RouteBuilder::new().with_config(&config);
//! # let _ = builder;
//! ```

use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::logging::LogConfig;
use crate::router::{DEFAULT_METHODS, DEFAULT_RESOURCE_PARAM};

/// Registration defaults and logging settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Placeholder name of the resource id segment
    pub resource_id_param: String,
    /// Methods used by `bind`, `on` and `controller` when no method list is given
    pub default_methods: Vec<String>,
    pub log: LogConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            resource_id_param: DEFAULT_RESOURCE_PARAM.to_string(),
            default_methods: DEFAULT_METHODS.iter().map(|m| (*m).to_string()).collect(),
            log: LogConfig::default(),
        }
    }
}

impl RouterConfig {
    /// Defaults with environment overrides applied
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Read a YAML file; missing keys keep their defaults.
    ///
    /// Environment overrides are not applied, call [`apply_env`](Self::apply_env).
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not valid YAML for this shape.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// # Errors
    ///
    /// Fails when `content` is not valid YAML for this shape.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: RouterConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Override fields whose environment variable is set
    #[must_use]
    pub fn apply_env(self) -> Self {
        self.apply_vars(|key| env::var(key).ok())
    }

    fn apply_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(param) = var("SWITCHYARD_RESOURCE_PARAM").filter(|p| !p.trim().is_empty()) {
            self.resource_id_param = param.trim().to_string();
        }
        self.log = self.log.apply_vars(&var);
        self
    }
}
