//! Service config loader (strict parsing).

use std::fs;
use std::io::ErrorKind;

use serde::Deserialize;

use chassis_web::{Result, WebError};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    #[serde(default = "default_port")]
    pub port: String,

    /// Diagnostic listener port; empty disables it.
    #[serde(default)]
    pub debug_port: String,

    #[serde(default)]
    pub metrics: MetricsBackend,

    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricsBackend {
    #[default]
    Pull,
    Push,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSection {
    /// Structured JSON log output.
    #[serde(default)]
    pub json: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            debug_port: String::new(),
            metrics: MetricsBackend::default(),
            log: LogSection::default(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.port.parse::<u16>().is_err() {
            return Err(WebError::InvalidConfig(format!(
                "port must be a valid port number, got {:?}",
                self.port
            )));
        }
        if !self.debug_port.is_empty() && self.debug_port.parse::<u16>().is_err() {
            return Err(WebError::InvalidConfig(format!(
                "debug_port must be a valid port number, got {:?}",
                self.debug_port
            )));
        }
        Ok(())
    }

    /// Environment overrides for the documented process inputs.
    pub fn apply_env(&mut self) {
        if let Ok(port) = std::env::var("CHASSIS_PORT") {
            self.port = port;
        }
        if let Ok(port) = std::env::var("CHASSIS_DEBUG_PORT") {
            self.debug_port = port;
        }
    }
}

fn default_port() -> String {
    "8080".into()
}

/// A missing config file is not an error; the defaults apply.
pub fn load_from_file(path: &str) -> Result<ServiceConfig> {
    match fs::read_to_string(path) {
        Ok(s) => load_from_str(&s),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(ServiceConfig::default()),
        Err(e) => Err(WebError::InvalidConfig(format!("read config failed: {e}"))),
    }
}

pub fn load_from_str(s: &str) -> Result<ServiceConfig> {
    let cfg: ServiceConfig =
        serde_yaml::from_str(s).map_err(|e| WebError::InvalidConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
