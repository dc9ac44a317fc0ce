use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{info, warn};

use super::Presenter;

/// How long a copy notice stays visible.
pub const NOTICE_DISMISS_AFTER: Duration = Duration::from_secs(3);

/// Destination for copied text.
pub trait ClipboardSink {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Failure,
}

/// Transient, non-blocking message about a copy action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub dismiss_after: Duration,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
            dismiss_after: NOTICE_DISMISS_AFTER,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Failure,
            message: message.into(),
            dismiss_after: NOTICE_DISMISS_AFTER,
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == NoticeKind::Success
    }
}

/// Copy what `presenter` currently shows into `sink`.
/// A failing sink is reported through the notice, never as an error.
pub fn copy_grid<P, S>(presenter: &P, sink: &mut S) -> Notice
where
    P: Presenter + ?Sized,
    S: ClipboardSink + ?Sized,
{
    let text = presenter.serialize();
    let rows = text.lines().count();
    match sink.write_text(&text) {
        Ok(()) => {
            info!(rows, bytes = text.len(), "copied table");
            Notice::success(format!("Copied {} row(s)", rows))
        }
        Err(e) => {
            warn!("copy failed: {:#}", e);
            Notice::failure(format!("Copy failed: {:#}", e))
        }
    }
}

/// Writes copied text to a file, replacing its contents.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ClipboardSink for FileSink {
    fn write_text(&mut self, text: &str) -> Result<()> {
        fs::write(&self.path, text).with_context(|| format!("writing {:?}", self.path))
    }
}

/// Keeps the last copied text in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub contents: Option<String>,
}

impl ClipboardSink for MemorySink {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}
