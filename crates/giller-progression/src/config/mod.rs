use std::env;
use std::fmt;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::progression::{
    LedgerConfig, PolicyError, ProgressionPolicy, DEFAULT_MAX_COMMIT_ATTEMPTS,
};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub progression: ProgressionConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let max_commit_attempts = match env::var("LEDGER_MAX_COMMIT_ATTEMPTS") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|attempts| *attempts > 0)
                .ok_or(ConfigError::InvalidCommitAttempts)?,
            Err(_) => DEFAULT_MAX_COMMIT_ATTEMPTS,
        };

        let policy_path = env::var("PROGRESSION_POLICY_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            progression: ProgressionConfig {
                ledger: LedgerConfig {
                    max_commit_attempts,
                },
                policy_path,
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Ledger tuning and the optional benefits table override.
#[derive(Debug, Clone)]
pub struct ProgressionConfig {
    pub ledger: LedgerConfig,
    pub policy_path: Option<PathBuf>,
}

impl ProgressionConfig {
    /// The JSON policy at `policy_path`, or the standard table when none is configured.
    pub fn policy(&self) -> Result<ProgressionPolicy, ConfigError> {
        let Some(path) = &self.policy_path else {
            return Ok(ProgressionPolicy::standard());
        };

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::PolicyRead {
            path: path.clone(),
            source,
        })?;
        let policy: ProgressionPolicy =
            serde_json::from_str(&raw).map_err(|source| ConfigError::PolicyParse {
                path: path.clone(),
                source,
            })?;
        policy.validate().map_err(ConfigError::PolicyInvalid)?;

        Ok(policy)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidCommitAttempts,
    PolicyRead {
        path: PathBuf,
        source: std::io::Error,
    },
    PolicyParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    PolicyInvalid(PolicyError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCommitAttempts => {
                write!(f, "LEDGER_MAX_COMMIT_ATTEMPTS must be a positive integer")
            }
            ConfigError::PolicyRead { path, .. } => {
                write!(f, "unable to read progression policy {}", path.display())
            }
            ConfigError::PolicyParse { path, .. } => {
                write!(f, "progression policy {} is not valid JSON", path.display())
            }
            ConfigError::PolicyInvalid(err) => write!(f, "progression policy rejected: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidCommitAttempts => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::PolicyRead { source, .. } => Some(source),
            ConfigError::PolicyParse { source, .. } => Some(source),
            ConfigError::PolicyInvalid(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("LEDGER_MAX_COMMIT_ATTEMPTS");
        env::remove_var("PROGRESSION_POLICY_PATH");
    }

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!(
            "giller-progression-{}-{name}",
            std::process::id()
        ));
        fs::write(&path, contents).expect("write scratch policy");
        path
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(
            config.progression.ledger.max_commit_attempts,
            DEFAULT_MAX_COMMIT_ATTEMPTS
        );
        assert!(config.progression.policy_path.is_none());
        assert_eq!(
            config.progression.policy().expect("standard policy"),
            ProgressionPolicy::standard()
        );
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn rejects_zero_commit_attempts() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LEDGER_MAX_COMMIT_ATTEMPTS", "0");
        let result = AppConfig::load();
        reset_env();
        assert!(matches!(result, Err(ConfigError::InvalidCommitAttempts)));
    }

    #[test]
    fn loads_policy_override_from_json() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let mut policy = ProgressionPolicy::standard();
        policy.master.rate_bonus_percent = 12.5;
        let path = scratch_file(
            "override.json",
            &serde_json::to_string(&policy).expect("policy serializes"),
        );
        env::set_var("PROGRESSION_POLICY_PATH", &path);

        let config = AppConfig::load().expect("config loads");
        let loaded = config.progression.policy().expect("policy loads");
        reset_env();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded.master.rate_bonus_percent, 12.5);
        assert_eq!(loaded.newcomer, ProgressionPolicy::standard().newcomer);
    }

    #[test]
    fn rejects_policy_that_demotes_higher_grades() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let mut policy = ProgressionPolicy::standard();
        policy.expert.max_daily_deliveries = 1;
        let path = scratch_file(
            "demoting.json",
            &serde_json::to_string(&policy).expect("policy serializes"),
        );

        let config = ProgressionConfig {
            ledger: LedgerConfig::default(),
            policy_path: Some(path.clone()),
        };
        let result = config.policy();
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(ConfigError::PolicyInvalid(_))));
    }

    #[test]
    fn reports_unreadable_policy_path() {
        let config = ProgressionConfig {
            ledger: LedgerConfig::default(),
            policy_path: Some(PathBuf::from("/nonexistent/giller/policy.json")),
        };

        match config.policy() {
            Err(ConfigError::PolicyRead { path, .. }) => {
                assert!(path.ends_with("policy.json"));
            }
            other => panic!("expected read failure, got {other:?}"),
        }
    }
}
