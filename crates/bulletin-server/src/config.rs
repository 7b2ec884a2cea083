use std::path::PathBuf;

use anyhow::{Context, Result};

use bulletin_api::diagnostics::{Diagnostics, LogType, TraceModules};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub seed_demo: bool,
    pub diagnostics: Diagnostics,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("BULLETIN_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("BULLETIN_PORT")
            .unwrap_or_else(|| "5000".into())
            .parse()
            .context("BULLETIN_PORT must be a port number")?;
        let db_path: PathBuf = lookup("BULLETIN_DB_PATH")
            .unwrap_or_else(|| "bulletin.db".into())
            .into();
        let seed_demo = match lookup("BULLETIN_SEED_DEMO") {
            Some(v) => parse_flag(&v).context("BULLETIN_SEED_DEMO must be true/false")?,
            None => false,
        };

        let modules: TraceModules = match lookup("BULLETIN_TRACE_MODULES") {
            Some(v) => v.parse()?,
            None => TraceModules::NONE,
        };
        let log_type: LogType = match lookup("BULLETIN_TRACE_TYPE") {
            Some(v) => v.parse()?,
            None => LogType::Both,
        };

        Ok(Self {
            host,
            port,
            db_path,
            seed_demo,
            diagnostics: Diagnostics::new(modules, log_type),
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.db_path, PathBuf::from("bulletin.db"));
        assert!(!cfg.seed_demo);
        assert_eq!(cfg.diagnostics, Diagnostics::new(TraceModules::NONE, LogType::Both));
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("BULLETIN_PORT", "8080"),
            ("BULLETIN_DB_PATH", "/tmp/messages.db"),
            ("BULLETIN_SEED_DEMO", "true"),
            ("BULLETIN_TRACE_MODULES", "public_messages"),
            ("BULLETIN_TRACE_TYPE", "performance"),
        ])
        .unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/messages.db"));
        assert!(cfg.seed_demo);
        assert!(cfg.diagnostics.performance_enabled(TraceModules::PUBLIC_MESSAGES));
        assert!(!cfg.diagnostics.debug_enabled(TraceModules::PUBLIC_MESSAGES));
    }

    #[test]
    fn test_invalid_values_fail() {
        assert!(config(&[("BULLETIN_PORT", "eighty")]).is_err());
        assert!(config(&[("BULLETIN_SEED_DEMO", "maybe")]).is_err());
        assert!(config(&[("BULLETIN_TRACE_MODULES", "writeback")]).is_err());
        assert!(config(&[("BULLETIN_TRACE_TYPE", "loud")]).is_err());
    }
}
