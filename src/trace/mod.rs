use anyhow::{Result, anyhow, bail};
use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use time::OffsetDateTime;

const TRACE_DIR_NAME: &str = "codepad_ai/traces";
const EMPTY_TEXT: &str = "<empty>";

/// Category of a trace line, rendered as a padded label after the timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceKind {
    Session,
    ChatIn,
    ChatOut,
    ChatErr,
    Command,
    Files,
    HttpIn,
    HttpOut,
    HttpErr,
}

impl TraceKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::ChatIn => "chat.in",
            Self::ChatOut => "chat.out",
            Self::ChatErr => "chat.err",
            Self::Command => "cmd",
            Self::Files => "files",
            Self::HttpIn => "ai.http.in",
            Self::HttpOut => "ai.http.out",
            Self::HttpErr => "ai.http.err",
        }
    }
}

/// Append-only log of one session: chat turns, workspace changes and the
/// (redacted) HTTP exchanges with the provider.
///
/// Clones share the same file. Write failures are reported once on stderr
/// and never interrupt the session.
#[derive(Clone)]
pub struct SessionTrace {
    inner: Arc<TraceInner>,
}

struct TraceInner {
    writer: Mutex<BufWriter<File>>,
    file_path: PathBuf,
    write_failed: AtomicBool,
}

impl SessionTrace {
    pub fn create(session_id: &str) -> Result<Self> {
        let trace_dir = resolve_trace_dir_from_env()?;
        Self::create_in_dir(session_id, &trace_dir)
    }

    /// Creates `session-<id>-<unix secs>.log` in `trace_dir` and writes the
    /// session header line.
    pub fn create_in_dir(session_id: &str, trace_dir: &Path) -> Result<Self> {
        fs::create_dir_all(trace_dir).map_err(|err| {
            anyhow!(
                "Failed to create trace directory {}: {err}",
                trace_dir.display()
            )
        })?;

        let started = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| duration.as_secs());
        let file_path = trace_dir.join(format!("session-{session_id}-{started}.log"));
        let file = create_trace_file(&file_path)
            .map_err(|err| anyhow!("Failed to create trace file {}: {err}", file_path.display()))?;

        let trace = Self {
            inner: Arc::new(TraceInner {
                writer: Mutex::new(BufWriter::new(file)),
                file_path,
                write_failed: AtomicBool::new(false),
            }),
        };
        trace.record(
            TraceKind::Session,
            &format!("codepad {} session {session_id}", env!("CARGO_PKG_VERSION")),
        );
        Ok(trace)
    }

    pub fn file_path(&self) -> &Path {
        &self.inner.file_path
    }

    /// Writes one trace line per line of `text`.
    pub fn record(&self, kind: TraceKind, text: &str) {
        if text.is_empty() {
            self.write_line(kind, EMPTY_TEXT);
            return;
        }

        for line in text.lines() {
            self.write_line(kind, line);
        }
    }

    pub fn record_all(&self, kind: TraceKind, lines: &[String]) {
        for line in lines {
            self.write_line(kind, line);
        }
    }

    fn write_line(&self, kind: TraceKind, text: &str) {
        let line = format!("[{}] [{:<11}] {text}\n", current_timestamp(), kind.label());
        let Ok(mut writer) = self.inner.writer.lock() else {
            self.report_write_failure("failed to acquire trace writer lock");
            return;
        };

        if writer.write_all(line.as_bytes()).is_err() || writer.flush().is_err() {
            self.report_write_failure("failed to write to trace file");
        }
    }

    fn report_write_failure(&self, message: &str) {
        if !self.inner.write_failed.swap(true, Ordering::Relaxed) {
            eprintln!("codepad trace warning: {message}");
        }
    }
}

#[cfg(unix)]
fn create_trace_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_trace_file(path: &Path) -> std::io::Result<File> {
    File::create(path)
}

fn current_timestamp() -> String {
    let now = OffsetDateTime::now_utc();
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        now.year(),
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute(),
        now.second(),
        now.millisecond()
    )
}

pub fn resolve_trace_dir_from_env() -> Result<PathBuf> {
    let xdg_state = env::var("XDG_STATE_HOME").ok();
    let home = dirs::home_dir();
    resolve_trace_dir(xdg_state.as_deref(), home.as_deref())
}

fn resolve_trace_dir(xdg_state_home: Option<&str>, home_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(xdg) = xdg_state_home {
        let trimmed = xdg.trim();
        if trimmed.is_empty() {
            bail!("Failed to resolve trace path: XDG_STATE_HOME is set but empty");
        }
        return Ok(PathBuf::from(trimmed).join(TRACE_DIR_NAME));
    }

    let home = home_dir
        .ok_or_else(|| anyhow!("Failed to resolve trace path: HOME directory is unavailable"))?;
    Ok(home.join(".local/state").join(TRACE_DIR_NAME))
}
