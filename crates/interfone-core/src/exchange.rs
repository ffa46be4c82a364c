// ── Exchange control interface ──
//
// The exchange's command surface, modeled as a capability: run a
// control command, get its text back or an explicit failure. Every
// invocation carries a bounded timeout -- a timeout is a failed call
// with no partial result, never a hang.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::ExchangeError;

/// Reload requests issued after artifacts are written.
pub const RELOAD_COMMANDS: [&str; 2] = ["pjsip reload", "dialplan reload"];

/// Fallback when a reload fails.
pub const RESTART_COMMAND: &str = "core restart now";

/// Cheap probe used to decide whether the exchange is up at all.
const VERSION_PROBE: &str = "core show version";

/// Read/write access to the exchange control surface.
///
/// `run` is the only primitive; reload/restart/online are defined on
/// top of it so fakes in tests only implement one method.
#[async_trait]
pub trait ControlInterface: Send + Sync {
    /// Execute one control command, returning its combined output.
    async fn run(&self, command: &str) -> Result<String, ExchangeError>;

    /// Ask the exchange to pick up freshly written artifacts.
    async fn reload(&self) -> Result<String, ExchangeError> {
        let mut combined = String::new();
        for command in RELOAD_COMMANDS {
            let output = self.run(command).await?;
            if !combined.is_empty() {
                combined.push('\n');
            }
            combined.push_str(output.trim());
        }
        Ok(combined)
    }

    /// Full restart -- the one fallback when a reload fails.
    async fn restart(&self) -> Result<String, ExchangeError> {
        self.run(RESTART_COMMAND).await
    }

    /// Whether the exchange currently answers control commands.
    async fn online(&self) -> bool {
        self.run(VERSION_PROBE).await.is_ok()
    }
}

/// Control interface backed by the `asterisk -rx` remote console.
#[derive(Debug, Clone)]
pub struct AsteriskControl {
    binary: PathBuf,
    timeout: Duration,
}

impl AsteriskControl {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ControlInterface for AsteriskControl {
    async fn run(&self, command: &str) -> Result<String, ExchangeError> {
        debug!(%command, "control command");
        let output = Command::new(&self.binary)
            .arg("-rx")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, output)
            .await
            .map_err(|_| ExchangeError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            })?
            .map_err(ExchangeError::Spawn)?;

        let mut text = String::from_utf8_lossy(&output.stdout).trim().to_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(stderr.trim());
        }

        if output.status.success() {
            Ok(text)
        } else {
            Err(ExchangeError::CommandFailed {
                code: output.status.code().unwrap_or(-1),
                output: text,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Fake control that scripts per-command responses and records calls.
    struct ScriptedControl {
        calls: Mutex<Vec<String>>,
        respond: fn(&str) -> Result<String, ExchangeError>,
    }

    #[async_trait]
    impl ControlInterface for ScriptedControl {
        async fn run(&self, command: &str) -> Result<String, ExchangeError> {
            self.calls.lock().unwrap().push(command.to_owned());
            (self.respond)(command)
        }
    }

    #[tokio::test]
    async fn reload_runs_both_reload_commands() {
        let control = ScriptedControl {
            calls: Mutex::new(Vec::new()),
            respond: |_| Ok("done".into()),
        };
        let combined = control.reload().await.unwrap();
        assert_eq!(combined, "done\ndone");
        assert_eq!(*control.calls.lock().unwrap(), RELOAD_COMMANDS);
    }

    #[tokio::test]
    async fn reload_stops_at_first_failure() {
        let control = ScriptedControl {
            calls: Mutex::new(Vec::new()),
            respond: |cmd| {
                if cmd == "pjsip reload" {
                    Err(ExchangeError::CommandFailed {
                        code: 1,
                        output: "no such command".into(),
                    })
                } else {
                    Ok(String::new())
                }
            },
        };
        assert!(control.reload().await.is_err());
        assert_eq!(control.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn online_reflects_probe_outcome() {
        let up = ScriptedControl {
            calls: Mutex::new(Vec::new()),
            respond: |_| Ok("Asterisk 20.5.0".into()),
        };
        assert!(up.online().await);

        let down = ScriptedControl {
            calls: Mutex::new(Vec::new()),
            respond: |_| Err(ExchangeError::Spawn(std::io::Error::other("gone"))),
        };
        assert!(!down.online().await);
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let control = AsteriskControl::new("/nonexistent/asterisk", Duration::from_secs(1));
        let err = control.run("core show version").await.unwrap_err();
        assert!(matches!(err, ExchangeError::Spawn(_)));
    }
}
