//! SSH-backed remote command transport

use crate::error::{EngineError, EngineResult};
use crate::traits::RemoteExecutor;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Runs commands on one host through the system ssh client
///
/// Exit code 255 is ssh's own failure code and is reported as a
/// transport error; every other exit code belongs to the remote command
/// and is passed through.
pub struct SshExecutor {
    host: String,
    user: Option<String>,
    connect_timeout: Duration,
}

impl SshExecutor {
    pub fn new(host: impl Into<String>, user: Option<String>) -> Self {
        Self {
            host: host.into(),
            user,
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Configure the ssh connect timeout (fluent API)
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    fn target(&self) -> String {
        match &self.user {
            Some(user) => format!("{}@{}", user, self.host),
            None => self.host.clone(),
        }
    }
}

#[async_trait]
impl RemoteExecutor for SshExecutor {
    async fn run_command(&self, command: &str) -> EngineResult<i32> {
        let output = Command::new("ssh")
            .arg("-o")
            .arg("BatchMode=yes")
            .arg("-o")
            .arg(format!("ConnectTimeout={}", self.connect_timeout.as_secs()))
            .arg(self.target())
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                EngineError::transport(&self.host, format!("failed to spawn ssh: {}", e))
            })?;

        match output.status.code() {
            Some(255) => Err(EngineError::transport(
                &self.host,
                format!(
                    "ssh session failed: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            )),
            Some(code) => Ok(code),
            None => Err(EngineError::transport(
                &self.host,
                "ssh terminated by signal",
            )),
        }
    }
}
