//! Nginx validation and restart after the hosts file changes.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use crate::cmd_abstraction::CommandExecutor;
use crate::config::ReloadSettings;
use crate::error::LbError;

#[cfg(test)]
use mockall::automock;

/// Consumer of the hosts file that must accept every committed change.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Reloader: Send + Sync {
    /// Check that the new configuration is accepted (`nginx -t`).
    async fn validate_config(&self) -> Result<(), LbError>;

    /// Apply the new configuration (`systemctl restart nginx`).
    async fn reload(&self) -> Result<(), LbError>;
}

/// Validate, then reload only if validation passed.
pub async fn validate_and_reload(reloader: &dyn Reloader) -> Result<(), LbError> {
    reloader.validate_config().await?;
    reloader.reload().await
}

/// Runs the configured nginx commands through a [`CommandExecutor`].
pub struct NginxReloader<E> {
    executor: E,
    validate_command: Vec<String>,
    restart_command: Vec<String>,
    timeout: Duration,
}

impl<E: CommandExecutor> NginxReloader<E> {
    pub fn new(executor: E, settings: &ReloadSettings) -> Self {
        Self {
            executor,
            validate_command: settings.validate_command.clone(),
            restart_command: settings.restart_command.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    async fn run(&self, command: &[String]) -> Result<(), LbError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| LbError::Reload("empty reload command".to_string()))?;

        debug!("Running {} {}", program, args.join(" "));
        let output = self
            .executor
            .execute(program, args, self.timeout)
            .await
            .map_err(|e| LbError::Reload(format!("{:#}", e)))?;

        if !output.success {
            return Err(LbError::Reload(output.failure_summary(program)));
        }
        Ok(())
    }
}

#[async_trait]
impl<E: CommandExecutor> Reloader for NginxReloader<E> {
    async fn validate_config(&self) -> Result<(), LbError> {
        self.run(&self.validate_command).await
    }

    async fn reload(&self) -> Result<(), LbError> {
        self.run(&self.restart_command).await?;
        info!("nginx restarted");
        Ok(())
    }
}

/// Reloader used in dev mode: nginx is never touched.
#[derive(Debug, Default, Clone, Copy)]
pub struct DevModeReloader;

#[async_trait]
impl Reloader for DevModeReloader {
    async fn validate_config(&self) -> Result<(), LbError> {
        debug!("Dev mode: skipping nginx config test");
        Ok(())
    }

    async fn reload(&self) -> Result<(), LbError> {
        debug!("Dev mode: skipping nginx restart");
        Ok(())
    }
}
