//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the Ctrl-C handler, locates exiftool and
//! runs the requested command.

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

use sortmedia::cli::{Args, Command, ProcessArgs, VerifyArgs};
use sortmedia::config::{CONFIG_ENV_VAR, config_path, load_config, load_config_from_xml_path};
use sortmedia::engine::{CancelToken, Engine, FileState, RunContext, TransferOutcome};
use sortmedia::media::{ExifTool, ExifToolProvider, ExifToolWriter, MetadataWriter, NoopWriter};
use sortmedia::output as out;
use sortmedia::verify::{Verifier, VerifyOutcome};
use sortmedia::{Config, SortError};

use crate::logging::init_tracing;

/// Exit status used when the user interrupted the run.
const EXIT_INTERRUPTED: u8 = 130;

/// Run the CLI application.
pub fn run(args: Args) -> Result<ExitCode> {
    // Handle --print-config before logging init
    if args.print_config {
        print_config_location(&args);
        return Ok(ExitCode::SUCCESS);
    }
    let Some(command) = args.command.clone() else {
        bail!("no command given; run with --help for usage");
    };

    // Build config (may read XML). CLI args override config values.
    let (mut cfg, cfg_source) = match &args.config {
        Some(path) => (load_config_from_xml_path(path)?, Some(path.clone())),
        None => load_config()?,
    };
    args.apply_overrides(&mut cfg);

    // Initialize logging and capture the guard so we can drop it on signal
    let guard_opt = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {}", e));
        e
    })?;
    cfg.validate()?;
    debug!(config = ?cfg_source, ?cfg, "configuration loaded");

    // Guard needs to be dropped on SIGINT to flush logs
    let cancel = CancelToken::new();
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            if cancel.is_cancelled() {
                // Second interrupt: stop waiting for running files.
                if let Ok(mut g) = guard_slot.lock() {
                    let _ = g.take();
                }
                std::process::exit(EXIT_INTERRUPTED as i32);
            }
            cancel.cancel();
            out::print_warn("Received interrupt; finishing files in progress...");
        })
        .context("failed to install signal handler")?;
    }

    let result = match &command {
        Command::Process(p) => run_process(p, &cfg, cancel),
        Command::Verify(v) => run_verify(v, &cfg, &cancel),
    };

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }

    result
}

fn print_config_location(args: &Args) {
    if let Some(p) = &args.config {
        out::print_info(&format!("Using --config (explicit):\n  {}\n", p.display()));
        return;
    }
    if let Ok(cfg_env) = std::env::var(CONFIG_ENV_VAR) {
        out::print_info(&format!("Using {CONFIG_ENV_VAR} (explicit):\n  {}\n", cfg_env));
        out::print_info(&format!("To override, unset {CONFIG_ENV_VAR} or set it to another file."));
        return;
    }
    match config_path() {
        Ok(p) => {
            out::print_info(&format!("Default sortmedia config path:\n  {}\n", p.display()));
            if p.exists() {
                out::print_info("A config file exists at that location.");
            } else {
                out::print_info("No config file exists there yet; built-in defaults are used.");
            }
        }
        Err(e) => out::print_error(&format!("Could not determine a default config path: {e}")),
    }
}

/// Find exiftool or refuse to start; nothing has been touched at this point.
fn locate_exiftool() -> Result<ExifTool> {
    ExifTool::locate().map_err(|e| {
        error!(code = e.code(), kind = e.kind(), error = %e, "cannot start");
        e.into()
    })
}

fn interrupted() -> ExitCode {
    let e = SortError::Interrupted;
    error!(code = e.code(), kind = e.kind(), "run aborted by user");
    ExitCode::from(EXIT_INTERRUPTED)
}

fn run_process(p: &ProcessArgs, cfg: &Config, cancel: CancelToken) -> Result<ExitCode> {
    let opts = p.run_options(cfg)?;
    opts.validate()?;
    let tool = locate_exiftool()?;
    let provider = ExifToolProvider::new(tool.clone());
    let exif_writer = ExifToolWriter::new(tool);
    let writer: &dyn MetadataWriter = if cfg.write_tags {
        &exif_writer
    } else {
        &NoopWriter
    };

    let ctx = RunContext::with_cancel(cancel);
    let engine = Engine::new(&opts, &provider, writer);
    let report = engine.run_with(&ctx, |outcome| report_outcome(outcome, opts.mode.as_str()))?;
    out::print_run_summary(&report, opts.dry_run);

    if report.cancelled {
        return Ok(interrupted());
    }
    if p.fail_on_error && report.stats.errors > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn report_outcome(outcome: &TransferOutcome, mode: &str) {
    let dest = outcome
        .destination
        .as_deref()
        .map(|d| d.display().to_string())
        .unwrap_or_default();
    match outcome.state {
        FileState::Transferred if outcome.dry_run => out::print_user(&format!(
            "Dry-run: would {mode} '{}' -> '{}'",
            outcome.source.display(),
            dest
        )),
        FileState::Failed => {
            if let Some(e) = &outcome.error {
                out::print_error(&format!("{}: {e}", outcome.source.display()));
            }
        }
        _ => {}
    }
}

fn run_verify(v: &VerifyArgs, cfg: &Config, cancel: &CancelToken) -> Result<ExitCode> {
    let opts = v.verify_options(cfg);
    opts.validate()?;
    let provider = ExifToolProvider::new(locate_exiftool()?);
    let verifier = Verifier::new(&opts, &provider);
    let snap = verifier.run_with(cancel, report_verify)?;
    out::print_verify_summary(&snap);

    if cancel.is_cancelled() {
        return Ok(interrupted());
    }
    Ok(ExitCode::SUCCESS)
}

fn report_verify(outcome: &VerifyOutcome) {
    let show = |p: &PathBuf| p.display().to_string();
    match outcome {
        VerifyOutcome::Matched(_) => {}
        VerifyOutcome::Mismatch { current, expected } => {
            out::print_user(&format!("MISMATCH {} (expected {})", show(current), show(expected)))
        }
        VerifyOutcome::Fixed { from, to } => {
            out::print_user(&format!("FIXED {} -> {}", show(from), show(to)))
        }
        VerifyOutcome::DuplicateOf { current, occupant } => out::print_user(&format!(
            "DUPLICATE {} (same content as {})",
            show(current),
            show(occupant)
        )),
        VerifyOutcome::Failed { path, error } => {
            out::print_error(&format!("{}: {error}", show(path)))
        }
    }
}
