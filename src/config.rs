use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub attendance: AttendanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceConfig {
    /// Branch label stamped onto students registered without one. Legacy
    /// records predate the branch field entirely.
    #[serde(default = "default_branch")]
    pub default_branch: String,
    /// Remaining-lesson count at or below which a session student is flagged
    /// as needing payment soon.
    #[serde(default = "default_imminent_threshold")]
    pub imminent_threshold: i32,
    /// How often the background payment-due scan runs.
    #[serde(default = "default_due_scan_interval_secs")]
    pub due_scan_interval_secs: u64,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_imminent_threshold() -> i32 {
    2
}

fn default_due_scan_interval_secs() -> u64 {
    24 * 3600
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            default_branch: default_branch(),
            imminent_threshold: default_imminent_threshold(),
            due_scan_interval_secs: default_due_scan_interval_secs(),
        }
    }
}

impl Config {
    pub fn from_toml() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => toml::from_str(&config_str)
                .map_err(|e| anyhow::anyhow!("failed to parse {config_path}: {e}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // No config file: build entirely from env vars and defaults.
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                Config {
                    server: ServerConfig {
                        host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    attendance: AttendanceConfig::default(),
                }
            }
            Err(e) => {
                return Err(anyhow::anyhow!("failed to read {config_path}: {e}"));
            }
        };

        // Env overrides win even when the file exists.
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DEFAULT_BRANCH") {
            config.attendance.default_branch = v;
        }
        if let Ok(v) = env::var("IMMINENT_THRESHOLD")
            && let Ok(n) = v.parse()
        {
            config.attendance.imminent_threshold = n;
        }
        if let Ok(v) = env::var("DUE_SCAN_INTERVAL_SECS")
            && let Ok(n) = v.parse()
        {
            config.attendance.due_scan_interval_secs = n;
        }

        Ok(config)
    }
}
