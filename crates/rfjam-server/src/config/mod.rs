// SPDX-License-Identifier: Apache-2.0

use rfjam_inference::{DEFAULT_MODEL_FILE, DEFAULT_SCALER_FILE};
use rfjam_store::DEFAULT_DATABASE_URL;
use serde::Serialize;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PREDICT_PORT: u16 = 5000;
pub const DEFAULT_RECORDS_PORT: u16 = 5001;
pub const DEFAULT_DB_SERVICE_URL: &str = "http://backend:5001";
pub const DEFAULT_MLFLOW_TRACKING_URI: &str = "http://mlflow:5000";
pub const DEFAULT_MLFLOW_EXPERIMENT: &str = "rf_jamming_docker";
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024;
pub const DEFAULT_FORWARD_TIMEOUT: Duration = Duration::from_secs(2);

pub fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.trim() {
            "1" | "true" | "TRUE" | "True" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "False" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

pub fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

pub fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

pub fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u16>().ok())
        .unwrap_or(default)
}

pub fn env_duration_ms(name: &str, default: Duration) -> Duration {
    Duration::from_millis(env_u64(
        name,
        u64::try_from(default.as_millis()).unwrap_or(u64::MAX),
    ))
}

pub fn env_string(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn project_root() -> PathBuf {
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictServiceConfig {
    pub bind_host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub db_service_url: String,
    pub forward_timeout: Duration,
    pub max_body_bytes: usize,
}

impl Default for PredictServiceConfig {
    fn default() -> Self {
        Self::with_root(Path::new("."))
    }
}

impl PredictServiceConfig {
    #[must_use]
    pub fn with_root(root: &Path) -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: DEFAULT_PREDICT_PORT,
            model_path: root.join(DEFAULT_MODEL_FILE),
            scaler_path: root.join(DEFAULT_SCALER_FILE),
            db_service_url: DEFAULT_DB_SERVICE_URL.to_string(),
            forward_timeout: DEFAULT_FORWARD_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::with_root(&project_root());
        Self {
            bind_host: env_string("BIND_HOST", &defaults.bind_host),
            port: env_u16("PORT", defaults.port),
            model_path: env::var_os("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            scaler_path: env::var_os("SCALER_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.scaler_path),
            db_service_url: env_string("DB_SERVICE_URL", &defaults.db_service_url),
            forward_timeout: env_duration_ms("FORWARD_TIMEOUT_MS", defaults.forward_timeout),
            max_body_bytes: env_usize("MAX_BODY_BYTES", defaults.max_body_bytes),
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, String> {
        bind_addr(&self.bind_host, self.port)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordServiceConfig {
    pub bind_host: String,
    pub port: u16,
    pub database_url: String,
    pub mlflow_enabled: bool,
    pub mlflow_tracking_uri: String,
    pub mlflow_experiment: String,
    pub tracking_timeout: Duration,
    pub max_body_bytes: usize,
}

impl Default for RecordServiceConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: DEFAULT_RECORDS_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            mlflow_enabled: true,
            mlflow_tracking_uri: DEFAULT_MLFLOW_TRACKING_URI.to_string(),
            mlflow_experiment: DEFAULT_MLFLOW_EXPERIMENT.to_string(),
            tracking_timeout: Duration::from_secs(5),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl RecordServiceConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_host: env_string("BIND_HOST", &defaults.bind_host),
            port: env_u16("PORT", defaults.port),
            database_url: env_string("DATABASE_URL", &defaults.database_url),
            mlflow_enabled: env_bool("MLFLOW_ENABLED", defaults.mlflow_enabled),
            mlflow_tracking_uri: env_string("MLFLOW_TRACKING_URI", &defaults.mlflow_tracking_uri),
            mlflow_experiment: env_string("MLFLOW_EXPERIMENT", &defaults.mlflow_experiment),
            tracking_timeout: env_duration_ms("MLFLOW_TIMEOUT_MS", defaults.tracking_timeout),
            max_body_bytes: env_usize("MAX_BODY_BYTES", defaults.max_body_bytes),
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, String> {
        bind_addr(&self.bind_host, self.port)
    }
}

fn bind_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let ip: IpAddr = host
        .parse()
        .map_err(|e| format!("invalid BIND_HOST {host}: {e}"))?;
    Ok(SocketAddr::new(ip, port))
}

fn require_http_url(name: &str, value: &str) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{name} must not be empty"));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(format!("{name} must be an http(s) url, got `{trimmed}`"));
    }
    Ok(())
}

pub fn validate_predict_config(cfg: &PredictServiceConfig) -> Result<(), String> {
    if cfg.port == 0 {
        return Err("PORT must be > 0".to_string());
    }
    if cfg.max_body_bytes == 0 {
        return Err("MAX_BODY_BYTES must be > 0".to_string());
    }
    if cfg.forward_timeout.is_zero() {
        return Err("FORWARD_TIMEOUT_MS must be > 0".to_string());
    }
    require_http_url("DB_SERVICE_URL", &cfg.db_service_url)?;
    cfg.bind_addr()?;
    Ok(())
}

pub fn validate_records_config(cfg: &RecordServiceConfig) -> Result<(), String> {
    if cfg.port == 0 {
        return Err("PORT must be > 0".to_string());
    }
    if cfg.max_body_bytes == 0 {
        return Err("MAX_BODY_BYTES must be > 0".to_string());
    }
    if cfg.database_url.trim().is_empty() {
        return Err("DATABASE_URL must not be empty".to_string());
    }
    if cfg.mlflow_enabled {
        require_http_url("MLFLOW_TRACKING_URI", &cfg.mlflow_tracking_uri)?;
        if cfg.mlflow_experiment.trim().is_empty() {
            return Err("MLFLOW_EXPERIMENT must not be empty".to_string());
        }
        if cfg.tracking_timeout.is_zero() {
            return Err("MLFLOW_TIMEOUT_MS must be > 0".to_string());
        }
    }
    cfg.bind_addr()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_startup_validation() {
        validate_predict_config(&PredictServiceConfig::default()).expect("predict defaults");
        validate_records_config(&RecordServiceConfig::default()).expect("records defaults");
        assert_eq!(PredictServiceConfig::default().port, 5000);
        assert_eq!(RecordServiceConfig::default().port, 5001);
        assert_eq!(
            PredictServiceConfig::default().forward_timeout,
            Duration::from_secs(2)
        );
    }

    #[test]
    fn predict_config_rejects_zero_limits_and_bad_urls() {
        let cfg = PredictServiceConfig {
            forward_timeout: Duration::ZERO,
            ..PredictServiceConfig::default()
        };
        let err = validate_predict_config(&cfg).expect_err("zero timeout");
        assert!(err.contains("FORWARD_TIMEOUT_MS"));

        let cfg = PredictServiceConfig {
            db_service_url: "backend:5001".to_string(),
            ..PredictServiceConfig::default()
        };
        let err = validate_predict_config(&cfg).expect_err("no scheme");
        assert!(err.contains("DB_SERVICE_URL"));

        let cfg = PredictServiceConfig {
            bind_host: "not-an-ip".to_string(),
            ..PredictServiceConfig::default()
        };
        assert!(validate_predict_config(&cfg).is_err());
    }

    #[test]
    fn records_config_only_checks_tracking_when_enabled() {
        let mut cfg = RecordServiceConfig {
            mlflow_tracking_uri: String::new(),
            ..RecordServiceConfig::default()
        };
        let err = validate_records_config(&cfg).expect_err("empty tracking uri");
        assert!(err.contains("MLFLOW_TRACKING_URI"));
        cfg.mlflow_enabled = false;
        validate_records_config(&cfg).expect("tracking disabled");

        cfg.database_url = " ".to_string();
        let err = validate_records_config(&cfg).expect_err("empty database url");
        assert!(err.contains("DATABASE_URL"));
    }

    #[test]
    fn artifact_paths_resolve_against_root() {
        let cfg = PredictServiceConfig::with_root(Path::new("/srv/rfjam"));
        assert_eq!(cfg.model_path, Path::new("/srv/rfjam/rf_jamming_model.json"));
        assert_eq!(cfg.scaler_path, Path::new("/srv/rfjam/scaler.json"));
    }
}
