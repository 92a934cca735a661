//! Append-only JSON-lines audit log
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use crate::error::{AuditError, AuditResult};
use crate::events::{AuditEvent, Severity};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Durable, ordered recorder of security events.
///
/// Each event becomes one JSON line. Writes are serialized by a mutex and
/// synced before it is released, so the file order is a valid ordering of
/// the calls and no line is ever interleaved with another.
pub struct AuditLogger {
    path: PathBuf,
    /// `None` when audit logging is disabled
    file: Option<Mutex<File>>,
}

impl AuditLogger {
    /// Open the audit log at `path` in append mode.
    ///
    /// When `enabled` is false nothing is touched on disk and every
    /// [`log_event`](Self::log_event) call is a no-op.
    pub async fn open<P: AsRef<Path>>(path: P, enabled: bool) -> AuditResult<Self> {
        let path = path.as_ref().to_path_buf();

        if !enabled {
            debug!("Audit logging disabled");
            return Ok(Self { path, file: None });
        }

        let open_error = |e: std::io::Error| AuditError::Open(format!("{}: {}", path.display(), e));

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                let mut builder = fs::DirBuilder::new();
                builder.recursive(true);
                #[cfg(unix)]
                builder.mode(0o750);
                builder.create(parent).await.map_err(open_error)?;
            }
        }

        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        options.mode(0o640);
        let file = options.open(&path).await.map_err(open_error)?;

        info!(path = %path.display(), "Audit log opened");

        Ok(Self {
            path,
            file: Some(Mutex::new(file)),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `event` to the log and mirror it to the tracing stream.
    pub async fn log_event(&self, mut event: AuditEvent) -> AuditResult<()> {
        let Some(file) = &self.file else {
            return Ok(());
        };

        event.fill_defaults();
        let mut line = event.to_json_line()?;
        line.push('\n');

        {
            let mut file = file.lock().await;
            file.write_all(line.as_bytes())
                .await
                .map_err(AuditError::Write)?;
            file.flush().await.map_err(AuditError::Write)?;
            file.sync_data().await.map_err(AuditError::Write)?;
        }

        emit(&event);
        Ok(())
    }
}

fn emit(event: &AuditEvent) {
    let id = event.id.as_deref().unwrap_or_default();
    if event.severity == Severity::High {
        warn!(
            target: "audit",
            event_id = id,
            event_type = %event.event_type,
            user = %event.user,
            resource = %event.resource,
            action = %event.action,
            result = %event.result,
            severity = %event.severity,
            "Security event"
        );
    } else {
        info!(
            target: "audit",
            event_id = id,
            event_type = %event.event_type,
            user = %event.user,
            resource = %event.resource,
            action = %event.action,
            result = %event.result,
            severity = %event.severity,
            "Security event"
        );
    }
}
