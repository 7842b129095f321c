//! Configuration management for proxymanager.
//!
//! ```yaml
//! devMode: false
//! loadBalancer:
//!   hostsFile: /etc/hosts
//!   lockFile: /var/run/proxymanager.lock
//! reload:
//!   validateCommand: [nginx, -t]
//!   restartCommand: [systemctl, restart, nginx]
//!   timeoutSecs: 30
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::cmd_abstraction::args_to_strings;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/proxymanager.yml";
/// Config path used in dev mode, relative to the working directory.
pub const DEV_CONFIG_PATH: &str = "etc/proxymanager.yml";
pub const CONFIG_PATH_ENV: &str = "PROXYMANAGER_CONFIG_PATH";
pub const DEV_MODE_ENV: &str = "PROXYMANAGER_DEV_MODE";

/// Upper bound for a single reload command.
const MAX_TIMEOUT_SECS: u64 = 600;

/// True when `PROXYMANAGER_DEV_MODE=true`.
pub fn dev_mode_from_env() -> bool {
    env::var(DEV_MODE_ENV).map(|v| v == "true").unwrap_or(false)
}

/// Pick the config file: `--config`, then the environment, then the dev
/// mode path, then the system default.
pub fn resolve_config_path(cli_override: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_override {
        return path.to_path_buf();
    }
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }
    if dev_mode_from_env() {
        if let Ok(cwd) = env::current_dir() {
            return cwd.join(DEV_CONFIG_PATH);
        }
    }
    PathBuf::from(DEFAULT_CONFIG_PATH)
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Skip the root check and never touch nginx.
    pub dev_mode: bool,

    pub load_balancer: LoadBalancerSettings,

    pub reload: ReloadSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoadBalancerSettings {
    /// File holding the cluster blocks.
    pub hosts_file: PathBuf,

    /// Advisory lock taken by commands that modify the hosts file.
    pub lock_file: PathBuf,
}

impl Default for LoadBalancerSettings {
    fn default() -> Self {
        Self {
            hosts_file: PathBuf::from("/etc/hosts"),
            lock_file: PathBuf::from("/var/run/proxymanager.lock"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReloadSettings {
    pub validate_command: Vec<String>,
    pub restart_command: Vec<String>,
    /// Per-command timeout; a timeout counts as a failed reload.
    pub timeout_secs: u64,
}

impl Default for ReloadSettings {
    fn default() -> Self {
        Self {
            validate_command: args_to_strings(&["nginx", "-t"]),
            restart_command: args_to_strings(&["systemctl", "restart", "nginx"]),
            timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;

        settings.validate()?;

        Ok(settings)
    }

    /// Load `path` if it exists, defaults otherwise, then apply the
    /// dev mode environment override.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut settings = if path.as_ref().exists() {
            Self::load(path)?
        } else {
            Self::default()
        };

        if dev_mode_from_env() {
            settings.dev_mode = true;
        }

        Ok(settings)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.load_balancer.hosts_file.as_os_str().is_empty() {
            anyhow::bail!("loadBalancer.hostsFile cannot be empty");
        }

        if self.load_balancer.lock_file.as_os_str().is_empty() {
            anyhow::bail!("loadBalancer.lockFile cannot be empty");
        }

        if self.reload.validate_command.is_empty() {
            anyhow::bail!("reload.validateCommand cannot be empty");
        }

        if self.reload.restart_command.is_empty() {
            anyhow::bail!("reload.restartCommand cannot be empty");
        }

        if self.reload.timeout_secs == 0 || self.reload.timeout_secs > MAX_TIMEOUT_SECS {
            anyhow::bail!(
                "Invalid reload.timeoutSecs '{}'. Must be between 1 and {}",
                self.reload.timeout_secs,
                MAX_TIMEOUT_SECS
            );
        }

        Ok(())
    }
}
