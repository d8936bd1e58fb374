//! User-facing terminal output.
//! Small wrapper around stdout/stderr printing to provide consistent, colored messages.
//! Colors are enabled only when output is a TTY.

use owo_colors::OwoColorize;

use crate::engine::RunReport;
use crate::fs_ops::format_bytes;
use crate::verify::VerifySnapshot;

fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

pub fn print_info(msg: &str) {
    if is_tty() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {}", msg);
    }
}

pub fn print_warn(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {}", msg);
    }
}

pub fn print_error(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

pub fn print_success(msg: &str) {
    if is_tty() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {}", msg);
    }
}

/// Print a plain user-facing line (no prefix). Use this for primary outputs
/// such as "src -> dest" which users may script against.
pub fn print_user(msg: &str) {
    println!("{}", msg);
}

pub fn run_summary(report: &RunReport, dry_run: bool) -> String {
    let s = &report.stats;
    let verb = if dry_run { "would transfer" } else { "transferred" };
    format!(
        "{} {} files ({}), {} duplicates, {} skipped, {} errors in {:.1}s",
        verb,
        s.processed,
        format_bytes(s.bytes),
        s.duplicates,
        s.skipped,
        s.errors,
        report.elapsed.as_secs_f64()
    )
}

/// Print the end-of-run summary; errors turn it into a warning line.
pub fn print_run_summary(report: &RunReport, dry_run: bool) {
    let line = run_summary(report, dry_run);
    if report.cancelled {
        print_warn(&format!("interrupted: {line}"));
    } else if report.stats.errors > 0 {
        print_warn(&line);
    } else {
        print_success(&line);
    }
}

pub fn verify_summary(snap: &VerifySnapshot) -> String {
    format!(
        "verified {} files: {} ok, {} mismatched, {} fixed, {} errors",
        snap.verified, snap.matched, snap.mismatches, snap.fixed, snap.errors
    )
}

pub fn print_verify_summary(snap: &VerifySnapshot) {
    let line = verify_summary(snap);
    if snap.errors > 0 || snap.mismatches > snap.fixed {
        print_warn(&line);
    } else {
        print_success(&line);
    }
}
