use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::Context as _;
use crossbeam_channel::{Receiver, bounded};

use crate::export::graph;
use crate::foundation::error::{StitchError, StitchResult};
use crate::timeline::builder::Timeline;

/// How often an in-flight export re-checks its cancellation flag.
const CANCEL_POLL: Duration = Duration::from_millis(50);

/// Cooperative cancellation flag shared with an in-flight export.
///
/// Cloning shares the flag. Requesting cancellation after the export has
/// finished is a harmless no-op.
#[derive(Clone, Debug)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A fresh, unset flag.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Ask the export to stop at its next check.
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Default for CancelFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle on an in-flight export. Completion is single-shot: [`wait`]
/// consumes the handle, so an outcome can never be observed twice.
///
/// [`wait`]: ExportHandle::wait
pub struct ExportHandle {
    rx: Receiver<StitchResult<PathBuf>>,
    cancel: CancelFlag,
    worker: Option<thread::JoinHandle<()>>,
}

impl ExportHandle {
    /// A clone of the cancellation flag, usable from any thread.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Request cooperative cancellation.
    pub fn cancel(&self) {
        self.cancel.request();
    }

    /// Block until the export reaches a terminal state and return the
    /// outcome. A worker that died without reporting maps to
    /// [`StitchError::ExportUnknown`].
    pub fn wait(mut self) -> StitchResult<PathBuf> {
        let result = self.rx.recv().map_err(|_| StitchError::ExportUnknown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        result?
    }
}

/// Removes the temporary encode target unless disarmed.
struct TempOutputGuard(Option<PathBuf>);

impl TempOutputGuard {
    fn disarm(&mut self) {
        self.0 = None;
    }
}

impl Drop for TempOutputGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Create the parent directory of `path` if it is missing.
pub fn ensure_parent_dir(path: &Path) -> StitchResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory '{}'", parent.display())
            })?;
        }
    }
    Ok(())
}

fn temp_output_path(out_path: &Path) -> PathBuf {
    let stem = out_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    out_path.with_file_name(format!("{stem}.partial-{}.mp4", std::process::id()))
}

/// Start encoding a sealed timeline to `out_path` on a worker thread.
///
/// Any file already at the output path is removed before encoding starts.
/// The encode itself writes to a temporary sibling and is renamed into place
/// only on success, so no terminal state ever leaves a partial file at the
/// output path.
#[tracing::instrument(skip(timeline))]
pub fn begin_export(timeline: &Timeline, out_path: &Path) -> StitchResult<ExportHandle> {
    ensure_parent_dir(out_path)?;
    if out_path.exists() {
        std::fs::remove_file(out_path).with_context(|| {
            format!(
                "failed to remove existing output '{}'",
                out_path.display()
            )
        })?;
        tracing::debug!(out = %out_path.display(), "Removed pre-existing output");
    }

    let temp_path = temp_output_path(out_path);
    let args = graph::export_args(timeline, &temp_path);
    tracing::debug!(args = ?args, "Prepared ffmpeg invocation");

    let cancel = CancelFlag::new();
    let flag = cancel.clone();
    let final_path = out_path.to_path_buf();
    let segments = timeline.segment_count();
    let (tx, rx) = bounded(1);
    let worker = thread::spawn(move || {
        let result = run_ffmpeg(&args, &temp_path, &final_path, &flag);
        match &result {
            Ok(path) => {
                tracing::info!(out = %path.display(), segments, "Export completed");
            }
            Err(err) => {
                tracing::info!(error = %err, "Export did not complete");
            }
        }
        let _ = tx.send(result);
    });

    Ok(ExportHandle {
        rx,
        cancel,
        worker: Some(worker),
    })
}

/// Run an export to completion on the calling thread.
pub fn export_blocking(timeline: &Timeline, out_path: &Path) -> StitchResult<PathBuf> {
    begin_export(timeline, out_path)?.wait()
}

enum RunEnd {
    Exited(ExitStatus),
    Cancelled,
    WaitFailed,
}

fn run_ffmpeg(
    args: &[String],
    temp_path: &Path,
    final_path: &Path,
    cancel: &CancelFlag,
) -> StitchResult<PathBuf> {
    let mut guard = TempOutputGuard(Some(temp_path.to_path_buf()));

    if cancel.is_cancelled() {
        return Err(StitchError::export_failed("cancelled"));
    }

    let mut child = Command::new("ffmpeg")
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            StitchError::export_failed(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

    let mut stderr_pipe = child.stderr.take();
    let stderr_drain = thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(pipe) = stderr_pipe.as_mut() {
            use std::io::Read as _;
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    });

    let end = loop {
        match child.try_wait() {
            Ok(Some(status)) => break RunEnd::Exited(status),
            Ok(None) => {
                if cancel.is_cancelled() {
                    let _ = child.kill();
                    let _ = child.wait();
                    break RunEnd::Cancelled;
                }
                thread::sleep(CANCEL_POLL);
            }
            Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
                break RunEnd::WaitFailed;
            }
        }
    };
    let stderr_buf = stderr_drain.join().unwrap_or_default();

    match end {
        RunEnd::Exited(status) if status.success() => {
            std::fs::rename(temp_path, final_path).with_context(|| {
                format!(
                    "failed to move finished export into '{}'",
                    final_path.display()
                )
            })?;
            guard.disarm();
            Ok(final_path.to_path_buf())
        }
        RunEnd::Exited(status) => match status.code() {
            Some(code) => Err(StitchError::export_failed(format!(
                "ffmpeg exited with status {code}: {}",
                stderr_tail(&stderr_buf)
            ))),
            // Terminated by something other than us, with no exit code to
            // report: neither success nor a failure we can describe.
            None => Err(StitchError::ExportUnknown),
        },
        RunEnd::Cancelled => Err(StitchError::export_failed("cancelled")),
        RunEnd::WaitFailed => Err(StitchError::ExportUnknown),
    }
}

/// Last few stderr lines, enough to say why ffmpeg failed without dumping
/// its whole transcript into the error.
fn stderr_tail(buf: &[u8]) -> String {
    let text = String::from_utf8_lossy(buf);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "(no stderr output)".to_string();
    }
    let lines: Vec<&str> = trimmed.lines().collect();
    let start = lines.len().saturating_sub(4);
    lines[start..].join(" | ")
}

#[cfg(test)]
#[path = "../../tests/unit/export/session.rs"]
mod tests;
