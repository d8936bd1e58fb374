//! Tracing setup for the binary.
//!
//! One stdout layer (compact, or JSON with `--json`) and, when a log file is configured and safe
//! to open, a second non-blocking file layer in the same format. Verbosity comes from `LogLevel`
//! only; `RUST_LOG` is not consulted.

use anyhow::Result;
use chrono::Local;
use sortmedia::output as out;
use sortmedia::platform::open_log_file_secure_append;
use sortmedia::{LogLevel, default_log_path, path_has_symlink_ancestor};
use std::fmt;
use std::path::Path;
use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt as tsfmt, registry};

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Local wall-clock stamp, `DD/MM/YY HH:MM:SS`.
struct LocalStamp;

impl FormatTime for LocalStamp {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Local::now().format("%d/%m/%y %H:%M:%S"))
    }
}

/// Each level shows one step more than its name suggests: `normal` already logs per-file info.
fn level_filter(lvl: &LogLevel) -> LevelFilter {
    match lvl {
        LogLevel::Quiet => LevelFilter::ERROR,
        LogLevel::Normal => LevelFilter::INFO,
        LogLevel::Info => LevelFilter::DEBUG,
        LogLevel::Debug => LevelFilter::TRACE,
    }
}

fn stdout_layer<S>(json: bool) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    if json {
        tsfmt::layer()
            .event_format(tsfmt::format().json())
            .with_timer(LocalStamp)
            .with_target(true)
            .with_thread_names(true)
            .boxed()
    } else {
        tsfmt::layer()
            .with_timer(LocalStamp)
            .with_target(false)
            .with_thread_names(true)
            .compact()
            .boxed()
    }
}

fn file_layer<S>(json: bool, writer: NonBlocking) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    if json {
        tsfmt::layer()
            .event_format(tsfmt::format().json())
            .with_timer(LocalStamp)
            .with_thread_names(true)
            .with_writer(writer)
            .boxed()
    } else {
        tsfmt::layer()
            .with_timer(LocalStamp)
            .with_thread_names(true)
            .with_ansi(false)
            .compact()
            .with_writer(writer)
            .boxed()
    }
}

/// Open `path` for appending through a background writer thread.
/// Returns None (after saying why on stderr) when the path is unsafe or cannot be opened.
fn open_file_writer(path: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    match path_has_symlink_ancestor(path) {
        Ok(false) => {}
        Ok(true) => {
            eprintln!(
                "Not logging to {}: one of its parent directories is a symlink.",
                path.display()
            );
            return None;
        }
        Err(e) => {
            eprintln!("Not logging to {}: could not inspect its parents: {e}", path.display());
            return None;
        }
    }
    match open_log_file_secure_append(path) {
        Ok(file) => Some(tracing_appender::non_blocking(file)),
        Err(e) => {
            eprintln!("Not logging to {}: {e}", path.display());
            None
        }
    }
}

/// Install the global subscriber. The returned guard flushes the file layer when dropped and
/// must be held until the process is about to exit.
pub fn init_tracing(
    lvl: &LogLevel,
    log_file: Option<&Path>,
    json: bool,
) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::new(level_filter(lvl).to_string());

    let file = log_file.and_then(|path| {
        let opened = open_file_writer(path);
        if opened.is_none() {
            out::print_warn(&format!(
                "File logging to '{}' is disabled for this run; logs go to stdout only.",
                path.display()
            ));
            if let Ok(def) = default_log_path() {
                out::print_info(&format!("The default log location is {}", def.display()));
            }
        }
        opened
    });
    let (writer, guard) = match file {
        Some((writer, guard)) => (Some(writer), Some(guard)),
        None => (None, None),
    };

    registry()
        .with(filter)
        .with(stdout_layer(json))
        .with(writer.map(|w| file_layer(json, w)))
        .try_init()?;
    Ok(guard)
}
