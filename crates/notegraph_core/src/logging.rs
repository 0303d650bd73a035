//! Core logging bootstrap and safety policy.
//!
//! # Responsibility
//! - Initialize file-based rolling logs exactly once per process.
//! - Provide the message sanitizer used before user-influenced text is logged.
//!
//! # Invariants
//! - Logging init is idempotent for the same level and directory.
//! - Re-initialization with a different level or directory is rejected.
//! - Logging initialization must not panic.
//! - Log events carry metadata only: never note bodies, never API keys.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "notegraph";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;
pub(crate) const MAX_LOGGED_ERROR_CHARS: usize = 240;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    log_dir: PathBuf,
    _logger: LoggerHandle,
}

/// Logging bootstrap failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    UnsupportedLevel(String),
    EmptyDirectory,
    RelativeDirectory(String),
    CreateDirectory { dir: PathBuf, message: String },
    Backend(String),
    LevelConflict { active: &'static str, requested: &'static str },
    DirectoryConflict { active: PathBuf, requested: PathBuf },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::EmptyDirectory => write!(f, "log_dir cannot be empty"),
            Self::RelativeDirectory(dir) => {
                write!(f, "log_dir must be an absolute path, got `{dir}`")
            }
            Self::CreateDirectory { dir, message } => write!(
                f,
                "failed to create log directory `{}`: {message}",
                dir.display()
            ),
            Self::Backend(message) => write!(f, "failed to start logger: {message}"),
            Self::LevelConflict { active, requested } => write!(
                f,
                "logging already initialized with level `{active}`; refusing to switch to `{requested}`"
            ),
            Self::DirectoryConflict { active, requested } => write!(
                f,
                "logging already initialized at `{}`; refusing to switch to `{}`",
                active.display(),
                requested.display()
            ),
        }
    }
}

impl Error for LoggingError {}

/// Initializes core logging with level and directory.
///
/// # Errors
/// - `UnsupportedLevel` for levels outside `trace|debug|info|warn|error`.
/// - `EmptyDirectory` / `RelativeDirectory` for unusable `log_dir` values.
/// - `CreateDirectory` / `Backend` when the file logger cannot start.
/// - `LevelConflict` / `DirectoryConflict` when already initialized
///   differently.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), LoggingError> {
    let level = normalize_level(level)?;
    let log_dir = normalize_log_dir(log_dir)?;

    let state = LOGGING_STATE.get_or_try_init(|| start_logger(level, &log_dir))?;
    if state.log_dir != log_dir {
        return Err(LoggingError::DirectoryConflict {
            active: state.log_dir.clone(),
            requested: log_dir,
        });
    }
    if state.level != level {
        return Err(LoggingError::LevelConflict {
            active: state.level,
            requested: level,
        });
    }

    Ok(())
}

fn start_logger(level: &'static str, log_dir: &Path) -> Result<LoggingState, LoggingError> {
    std::fs::create_dir_all(log_dir).map_err(|err| LoggingError::CreateDirectory {
        dir: log_dir.to_path_buf(),
        message: err.to_string(),
    })?;

    let logger = Logger::try_with_str(level)
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        // Format: [YYYY-MM-DD HH:MM:SS.ffffff TZ] LEVEL [module] file:line: message
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    install_panic_hook_once();

    info!(
        "event=app_start module=core status=ok platform={} build_mode={} version={}",
        std::env::consts::OS,
        build_mode(),
        env!("CARGO_PKG_VERSION")
    );
    info!(
        "event=core_init module=core status=ok level={} log_dir={}",
        level,
        log_dir.display()
    );

    Ok(LoggingState {
        level,
        log_dir: log_dir.to_path_buf(),
        _logger: logger,
    })
}

/// Returns `(level, log_dir)` when logging is active.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.level, state.log_dir.clone()))
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LoggingError::UnsupportedLevel(other.to_string())),
    }
}

fn normalize_log_dir(log_dir: &str) -> Result<PathBuf, LoggingError> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err(LoggingError::EmptyDirectory);
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(LoggingError::RelativeDirectory(trimmed.to_string()));
    }
    Ok(path.to_path_buf())
}

fn build_mode() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.set(()).is_err() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_payload_summary(panic_info);
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location, payload
        );
        previous_hook(panic_info);
    }));
}

fn panic_payload_summary(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = if let Some(message) = info.payload().downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };

    sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
}

/// Flattens newlines and caps length so one event stays on one log line.
pub(crate) fn sanitize_message(value: &str, max_chars: usize) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated = normalized.chars().take(max_chars).collect::<String>();
    if normalized.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}
