use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Env var naming an optional JSON config file.
pub const CONFIG_ENV: &str = "DELIVERY_ETA_CONFIG";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub meta_path: Option<PathBuf>,
    pub assets_dir: PathBuf,
    pub bind_addr: String,
    pub port: u16,
    pub log_predictions: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("random_forest_model.json"),
            meta_path: None,
            assets_dir: PathBuf::from("assets"),
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            log_predictions: false,
        }
    }
}

impl AppConfig {
    pub fn load(path: &str) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("config file not found at {}", path))?;
        serde_json::from_str(&data).with_context(|| format!("invalid config JSON in {}", path))
    }

    /// File named by `DELIVERY_ETA_CONFIG` (if any), then env overrides.
    pub fn from_env() -> Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::load(&path)?,
            Err(_) => Self::default(),
        };
        cfg.apply_overrides(|k| std::env::var(k).ok());
        Ok(cfg)
    }

    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(p) = var("MODEL_PATH") {
            self.model_path = p.into();
        }
        if let Some(p) = var("META_PATH") {
            self.meta_path = Some(p.into());
        }
        if let Some(p) = var("ASSETS_DIR") {
            self.assets_dir = p.into();
        }
        if let Some(a) = var("BIND_ADDR") {
            self.bind_addr = a;
        }
        match var("PORT").map(|s| s.parse::<u16>()) {
            Some(Ok(port)) => self.port = port,
            Some(Err(e)) => tracing::warn!("ignoring PORT: {}", e),
            None => {}
        }
        if let Some(flag) = var("LOG_PRED") {
            self.log_predictions = flag == "1";
        }
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eta.json");
        fs::write(&path, r#"{"model_path": "models/rf.json", "port": 9000}"#).unwrap();

        let cfg = AppConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.model_path, PathBuf::from("models/rf.json"));
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.assets_dir, PathBuf::from("assets"));
        assert!(cfg.meta_path.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eta.json");
        fs::write(&path, "{ port: ").unwrap();
        assert!(AppConfig::load(path.to_str().unwrap()).is_err());
        assert!(AppConfig::load("/definitely/not/here.json").is_err());
    }

    #[test]
    fn env_overrides_win_and_bad_port_is_ignored() {
        let env: HashMap<&str, &str> = [
            ("MODEL_PATH", "/srv/rf.json"),
            ("META_PATH", "/srv/meta.json"),
            ("PORT", "not-a-port"),
            ("LOG_PRED", "1"),
        ]
        .into_iter()
        .collect();

        let mut cfg = AppConfig::default();
        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.model_path, PathBuf::from("/srv/rf.json"));
        assert_eq!(cfg.meta_path, Some(PathBuf::from("/srv/meta.json")));
        assert_eq!(cfg.port, 8080);
        assert!(cfg.log_predictions);
        assert_eq!(cfg.socket_addr(), "0.0.0.0:8080");
    }
}
