//! Remote process handles
//!
//! A handle is the capability through which the engine issues lifecycle
//! commands to one service instance on one host. Each action maps to a
//! shell command resolved at construction time: a per-action override
//! from configuration when present, otherwise a sysv-style default.
//! Kill and terminate default to signals delivered to the pid read from
//! the configured pid file.

use crate::error::{EngineError, EngineResult};
use crate::traits::RemoteExecutor;
use shared::{Action, InitEntry};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Full command set for one handle, resolved once at construction
#[derive(Debug, Clone)]
struct CommandSet {
    start: String,
    stop: String,
    restart: String,
    status: String,
    terminate: String,
    kill: String,
    exists: String,
}

impl CommandSet {
    fn build(
        service: &str,
        host: &str,
        pid_path: Option<&str>,
        init: &InitEntry,
    ) -> EngineResult<Self> {
        let sysv = |verb: &str| format!("service {} {}", service, verb);
        let pick = |verb: &str, default: String| {
            init.overrides.get(verb).cloned().unwrap_or(default)
        };

        // Signal delivery needs a pid to target; without a pid file the
        // action must be overridden with a custom command.
        let signal = |verb: &str, sig: &str| -> EngineResult<String> {
            if let Some(cmd) = init.overrides.get(verb) {
                return Ok(cmd.clone());
            }
            match pid_path {
                Some(pid) => Ok(format!("kill -s {} $(cat {})", sig, pid)),
                None => Err(EngineError::config(format!(
                    "service {} on {} has no pidPath and no {} override",
                    service, host, verb
                ))),
            }
        };

        Ok(CommandSet {
            start: pick("start", sysv("start")),
            stop: pick("stop", sysv("stop")),
            restart: pick("restart", sysv("restart")),
            status: pick("status", sysv("status")),
            terminate: signal("terminate", "TERM")?,
            kill: signal("kill", "KILL")?,
            exists: pick("exists", format!("test -e /etc/init.d/{}", service)),
        })
    }
}

/// Capability-typed handle to one service instance on one host
///
/// Immutable after construction. The registry owns every handle and
/// shares them out as `Arc`s to the executor, scheduler, and aggregator.
pub struct RemoteProcessHandle {
    service: String,
    host: String,
    commands: CommandSet,
    executor: Arc<dyn RemoteExecutor>,
}

impl fmt::Debug for RemoteProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteProcessHandle")
            .field("service", &self.service)
            .field("host", &self.host)
            .finish()
    }
}

impl RemoteProcessHandle {
    pub fn new(
        service: impl Into<String>,
        host: impl Into<String>,
        pid_path: Option<&str>,
        init: &InitEntry,
        executor: Arc<dyn RemoteExecutor>,
    ) -> EngineResult<Self> {
        let service = service.into();
        let host = host.into();
        let commands = CommandSet::build(&service, &host, pid_path, init)?;

        Ok(Self {
            service,
            host,
            commands,
            executor,
        })
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Run an arbitrary command on this handle's host
    pub async fn run_command(&self, command: &str) -> EngineResult<i32> {
        self.executor.run_command(command).await
    }

    /// Run one lifecycle command; `Ok(true)` means it exited 0
    async fn exec(&self, command: &str) -> EngineResult<bool> {
        let code = self.executor.run_command(command).await?;
        if code != 0 {
            debug!(
                service = %self.service,
                host = %self.host,
                command,
                code,
                "lifecycle command exited non-zero"
            );
        }
        Ok(code == 0)
    }

    pub async fn start(&self) -> EngineResult<bool> {
        self.exec(&self.commands.start).await
    }

    pub async fn stop(&self) -> EngineResult<bool> {
        self.exec(&self.commands.stop).await
    }

    pub async fn restart(&self) -> EngineResult<bool> {
        self.exec(&self.commands.restart).await
    }

    /// SIGTERM by default, override-driven otherwise
    pub async fn terminate(&self) -> EngineResult<bool> {
        self.exec(&self.commands.terminate).await
    }

    /// SIGKILL by default, override-driven otherwise
    pub async fn kill(&self) -> EngineResult<bool> {
        self.exec(&self.commands.kill).await
    }

    pub async fn is_running(&self) -> EngineResult<bool> {
        Ok(self.executor.run_command(&self.commands.status).await? == 0)
    }

    /// Whether the service is installed on this host at all
    pub async fn exists(&self) -> EngineResult<bool> {
        Ok(self.executor.run_command(&self.commands.exists).await? == 0)
    }

    /// Dispatch one of the per-handle disruptions
    ///
    /// Rolling restart operates on an ordered list, not a single handle,
    /// and is rejected here.
    pub async fn apply(&self, action: Action) -> EngineResult<bool> {
        match action {
            Action::Start => self.start().await,
            Action::Stop => self.stop().await,
            Action::Restart => self.restart().await,
            Action::Terminate => self.terminate().await,
            Action::Kill => self.kill().await,
            Action::RollingRestart => Err(EngineError::invalid_state(
                "rolling-restart is not a per-handle action",
            )),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_handle(service: &str, host: &str) -> Arc<RemoteProcessHandle> {
    use crate::traits::MockRemoteExecutor;

    let mut init = InitEntry::default();
    init.overrides.insert("kill".into(), "true".into());
    init.overrides.insert("terminate".into(), "true".into());

    Arc::new(
        RemoteProcessHandle::new(service, host, None, &init, Arc::new(MockRemoteExecutor::new()))
            .unwrap(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockRemoteExecutor;

    fn executor_expecting(command: &'static str, code: i32) -> Arc<MockRemoteExecutor> {
        let mut executor = MockRemoteExecutor::new();
        executor
            .expect_run_command()
            .withf(move |cmd| cmd == command)
            .times(1)
            .returning(move |_| Ok(code));
        Arc::new(executor)
    }

    fn sysv_handle(executor: Arc<MockRemoteExecutor>) -> RemoteProcessHandle {
        RemoteProcessHandle::new(
            "datanode",
            "10.0.0.5",
            Some("/var/run/datanode.pid"),
            &InitEntry::default(),
            executor,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn sysv_defaults_issue_service_commands() {
        let handle = sysv_handle(executor_expecting("service datanode stop", 0));
        assert!(handle.stop().await.unwrap());

        let handle = sysv_handle(executor_expecting("service datanode start", 0));
        assert!(handle.start().await.unwrap());

        let handle = sysv_handle(executor_expecting("service datanode restart", 0));
        assert!(handle.restart().await.unwrap());
    }

    #[tokio::test]
    async fn kill_and_terminate_signal_the_pid_file() {
        let handle = sysv_handle(executor_expecting(
            "kill -s KILL $(cat /var/run/datanode.pid)",
            0,
        ));
        assert!(handle.kill().await.unwrap());

        let handle = sysv_handle(executor_expecting(
            "kill -s TERM $(cat /var/run/datanode.pid)",
            0,
        ));
        assert!(handle.terminate().await.unwrap());
    }

    #[tokio::test]
    async fn status_exit_code_maps_to_running() {
        let handle = sysv_handle(executor_expecting("service datanode status", 0));
        assert!(handle.is_running().await.unwrap());

        let handle = sysv_handle(executor_expecting("service datanode status", 3));
        assert!(!handle.is_running().await.unwrap());
    }

    #[tokio::test]
    async fn exists_probes_the_init_script_by_default() {
        let handle = sysv_handle(executor_expecting("test -e /etc/init.d/datanode", 0));
        assert!(handle.exists().await.unwrap());

        let handle = sysv_handle(executor_expecting("test -e /etc/init.d/datanode", 1));
        assert!(!handle.exists().await.unwrap());
    }

    #[tokio::test]
    async fn exists_override_replaces_the_probe() {
        let mut init = InitEntry::default();
        init.overrides
            .insert("exists".into(), "which datanoded".into());

        let handle = RemoteProcessHandle::new(
            "datanode",
            "10.0.0.5",
            Some("/var/run/datanode.pid"),
            &init,
            executor_expecting("which datanoded", 0),
        )
        .unwrap();
        assert!(handle.exists().await.unwrap());
    }

    #[tokio::test]
    async fn overrides_replace_defaults() {
        let mut init = InitEntry::default();
        init.overrides
            .insert("stop".into(), "svcctl halt datanode".into());

        let handle = RemoteProcessHandle::new(
            "datanode",
            "10.0.0.5",
            Some("/var/run/datanode.pid"),
            &init,
            executor_expecting("svcctl halt datanode", 0),
        )
        .unwrap();
        assert!(handle.stop().await.unwrap());
    }

    #[tokio::test]
    async fn non_zero_exit_is_reported_not_raised() {
        let handle = sysv_handle(executor_expecting("service datanode stop", 1));
        assert!(!handle.stop().await.unwrap());
    }

    #[test]
    fn missing_pid_path_without_override_is_fatal() {
        let err = RemoteProcessHandle::new(
            "datanode",
            "10.0.0.5",
            None,
            &InitEntry::default(),
            Arc::new(MockRemoteExecutor::new()),
        )
        .unwrap_err();

        assert!(matches!(err, EngineError::Config { .. }));
        assert!(err.to_string().contains("pidPath"));
    }

    #[test]
    fn overrides_stand_in_for_missing_pid_path() {
        let mut init = InitEntry::default();
        init.overrides.insert("kill".into(), "pkill -9 -f datanode".into());
        init.overrides
            .insert("terminate".into(), "pkill -f datanode".into());

        let handle = RemoteProcessHandle::new(
            "datanode",
            "10.0.0.5",
            None,
            &init,
            Arc::new(MockRemoteExecutor::new()),
        );
        assert!(handle.is_ok());
    }
}
