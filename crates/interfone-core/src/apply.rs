// ── Apply controller ──
//
// Drives one synthesize → write → reload cycle as an explicit state
// machine. Writing is atomic across both artifacts: both are staged to
// tempfiles before either rename, so a failed cycle leaves the
// previously applied files untouched. Reload failure gets exactly one
// restart fallback, never a retry loop.

use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::{ApplyError, ExchangeError};
use crate::exchange::ControlInterface;
use crate::model::Apartment;
use crate::synth::{Artifacts, SynthOptions, synthesize};

#[cfg(unix)]
const ARTIFACT_FILE_MODE: u32 = 0o640;

// ── State machine ───────────────────────────────────────────────────

/// Phases of one apply cycle. `Applied`, `WriteFailed`, and
/// `RestartFailed` are terminal per invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApplyPhase {
    #[default]
    Idle,
    Synthesizing,
    Writing,
    Reloading,
    Applied,
    WriteFailed,
    ReloadFailed,
    RestartAttempted,
    RestartFailed,
}

/// Terminal result of one apply cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Artifacts written and picked up, directly or via the restart
    /// fallback.
    Applied { via_restart: bool },
    /// Staging or renaming an artifact failed; the live files are
    /// unchanged and no reload was requested.
    WriteFailed { reason: String },
    /// Reload failed and the single restart fallback failed too.
    RestartFailed {
        reload_error: String,
        restart_error: String,
    },
}

/// What the operator sees after an apply cycle.
#[derive(Debug, Clone)]
pub struct ApplyReport {
    pub outcome: ApplyOutcome,
    /// Control-interface output from the reload/restart, if any ran.
    pub detail: String,
}

impl ApplyReport {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, ApplyOutcome::Applied { .. })
    }
}

// ── Artifact writer ─────────────────────────────────────────────────

/// Writes both artifacts with rename discipline: stage everything
/// first, rename only once every staging write has succeeded.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    endpoints_path: PathBuf,
    dialplan_path: PathBuf,
}

impl ArtifactWriter {
    pub fn new(endpoints_path: impl Into<PathBuf>, dialplan_path: impl Into<PathBuf>) -> Self {
        Self {
            endpoints_path: endpoints_path.into(),
            dialplan_path: dialplan_path.into(),
        }
    }

    pub fn write(&self, artifacts: &Artifacts) -> io::Result<()> {
        let endpoints = stage(&self.endpoints_path, &artifacts.endpoints)?;
        let dialplan = stage(&self.dialplan_path, &artifacts.dialplan)?;
        endpoints
            .persist(&self.endpoints_path)
            .map_err(|err| err.error)?;
        dialplan
            .persist(&self.dialplan_path)
            .map_err(|err| err.error)?;
        Ok(())
    }
}

fn stage(target: &Path, content: &str) -> io::Result<NamedTempFile> {
    let parent = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staged = NamedTempFile::new_in(parent)?;
    staged.write_all(content.as_bytes())?;
    staged.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        staged
            .as_file()
            .set_permissions(std::fs::Permissions::from_mode(ARTIFACT_FILE_MODE))?;
    }

    Ok(staged)
}

// ── Controller ──────────────────────────────────────────────────────

/// Orchestrates apply cycles and publishes the current phase.
///
/// Not re-entrant: while a cycle is in flight a second request fails
/// with [`ApplyError::InProgress`] -- concurrent synthesis against a
/// directory being mutated would produce artifacts inconsistent with
/// the persisted state.
pub struct ApplyController {
    writer: ArtifactWriter,
    options: SynthOptions,
    busy: tokio::sync::Mutex<()>,
    phase: watch::Sender<ApplyPhase>,
}

impl ApplyController {
    pub fn new(writer: ArtifactWriter, options: SynthOptions) -> Self {
        let (phase, _) = watch::channel(ApplyPhase::Idle);
        Self {
            writer,
            options,
            busy: tokio::sync::Mutex::new(()),
            phase,
        }
    }

    /// Observe phase transitions (e.g. for a progress display).
    pub fn phase(&self) -> watch::Receiver<ApplyPhase> {
        self.phase.subscribe()
    }

    /// Run one full apply cycle over a consistent directory snapshot.
    pub async fn run(
        &self,
        apartments: &[Apartment],
        control: &dyn ControlInterface,
    ) -> Result<ApplyReport, ApplyError> {
        let Ok(_busy) = self.busy.try_lock() else {
            return Err(ApplyError::InProgress);
        };

        self.set(ApplyPhase::Synthesizing);
        let artifacts = synthesize(apartments, &self.options);

        self.set(ApplyPhase::Writing);
        if let Err(err) = self.writer.write(&artifacts) {
            self.set(ApplyPhase::WriteFailed);
            error!(error = %err, "artifact write failed; previous artifacts left in place");
            return Ok(ApplyReport {
                outcome: ApplyOutcome::WriteFailed {
                    reason: err.to_string(),
                },
                detail: String::new(),
            });
        }

        self.set(ApplyPhase::Reloading);
        match control.reload().await {
            Ok(detail) => {
                self.set(ApplyPhase::Applied);
                info!("apply complete via reload");
                Ok(ApplyReport {
                    outcome: ApplyOutcome::Applied { via_restart: false },
                    detail,
                })
            }
            Err(reload_err) => {
                self.set(ApplyPhase::ReloadFailed);
                warn!(error = %reload_err, "reload failed; attempting restart");
                self.set(ApplyPhase::RestartAttempted);
                self.finish_via_restart(control, &reload_err).await
            }
        }
    }

    async fn finish_via_restart(
        &self,
        control: &dyn ControlInterface,
        reload_err: &ExchangeError,
    ) -> Result<ApplyReport, ApplyError> {
        match control.restart().await {
            Ok(detail) => {
                self.set(ApplyPhase::Applied);
                info!("apply complete via restart fallback");
                Ok(ApplyReport {
                    outcome: ApplyOutcome::Applied { via_restart: true },
                    detail,
                })
            }
            Err(restart_err) => {
                self.set(ApplyPhase::RestartFailed);
                error!(error = %restart_err, "restart fallback failed; apply abandoned");
                Ok(ApplyReport {
                    outcome: ApplyOutcome::RestartFailed {
                        reload_error: reload_err.to_string(),
                        restart_error: restart_err.to_string(),
                    },
                    detail: String::new(),
                })
            }
        }
    }

    fn set(&self, phase: ApplyPhase) {
        self.phase.send_replace(phase);
    }
}
