//! Command-line parsing and how flags land on the config.

use clap::Parser;
use sortmedia::cli::{Args, Command};
use sortmedia::engine::{AlbumSource, TransferMode};
use sortmedia::{Config, LogLevel};
use std::path::PathBuf;

fn parse(argv: &[&str]) -> Args {
    Args::try_parse_from(argv).expect("valid command line")
}

#[test]
fn process_takes_many_sources_and_one_destination() {
    let args = parse(&["sortmedia", "process", "-c", "a", "b", "c", "/archive"]);
    let Some(Command::Process(p)) = &args.command else {
        panic!("expected process");
    };
    assert_eq!(p.sources, vec![PathBuf::from("a"), PathBuf::from("b"), PathBuf::from("c")]);
    assert_eq!(p.destination, PathBuf::from("/archive"));
    assert_eq!(p.mode(), TransferMode::Copy);
}

#[test]
fn exactly_one_mode_is_required() {
    assert!(Args::try_parse_from(["sortmedia", "process", "a", "/archive"]).is_err());
    assert!(Args::try_parse_from(["sortmedia", "process", "-c", "-m", "a", "/archive"]).is_err());
    let args = parse(&["sortmedia", "process", "--move", "a", "/archive"]);
    let Some(Command::Process(p)) = &args.command else {
        panic!("expected process");
    };
    assert_eq!(p.mode(), TransferMode::Move);
}

#[test]
fn pretend_is_an_alias_for_dry_run() {
    let args = parse(&["sortmedia", "process", "-c", "--pretend", "a", "/archive"]);
    let Some(Command::Process(p)) = &args.command else {
        panic!("expected process");
    };
    assert!(p.dry_run);
}

#[test]
fn overrides_apply_over_config() {
    let args = parse(&[
        "sortmedia",
        "-d",
        "process",
        "-c",
        "-w",
        "3",
        "-p",
        "2",
        "--old-naming",
        "--raw-path",
        "/raw",
        "--no-tags",
        "a",
        "/archive",
    ]);
    let mut cfg = Config::default();
    args.apply_overrides(&mut cfg);
    assert_eq!(cfg.log_level, LogLevel::Debug);
    assert_eq!(cfg.workers, 3);
    assert_eq!(cfg.precision, 2);
    assert!(cfg.old_naming);
    assert_eq!(cfg.raw_path, Some(PathBuf::from("/raw")));
    assert!(!cfg.write_tags);
    assert_eq!(cfg.effective_queue_depth(), 6);
}

#[test]
fn unset_flags_keep_config_values() {
    let args = parse(&["sortmedia", "process", "-c", "a", "/archive"]);
    let mut cfg = Config {
        workers: 7,
        precision: 3,
        write_tags: false,
        ..Config::default()
    };
    let before = cfg.clone();
    args.apply_overrides(&mut cfg);
    assert_eq!(cfg, before);
}

#[test]
fn run_options_carry_adjustments_album_and_tags() {
    let args = parse(&[
        "sortmedia",
        "process",
        "-m",
        "-r",
        "--time-adjust",
        "-01:30:00",
        "--day-adjust",
        "-2",
        "--album",
        "Trip",
        "-t",
        "family",
        "--tag",
        "beach",
        "a",
        "/archive",
    ]);
    let Some(Command::Process(p)) = &args.command else {
        panic!("expected process");
    };
    let opts = p.run_options(&Config::default()).unwrap();
    assert!(opts.recursive);
    assert_eq!(opts.mode, TransferMode::Move);
    assert_eq!(opts.album, AlbumSource::Fixed("Trip".into()));
    assert_eq!(opts.tags, vec!["family".to_string(), "beach".to_string()]);
    assert_eq!(
        opts.adjust.offset(),
        -(chrono::TimeDelta::days(2) + chrono::TimeDelta::minutes(90))
    );
}

#[test]
fn bad_time_adjust_is_an_error() {
    let args = parse(&["sortmedia", "process", "-c", "--time-adjust", "1h", "a", "/archive"]);
    let Some(Command::Process(p)) = &args.command else {
        panic!("expected process");
    };
    assert!(p.run_options(&Config::default()).is_err());
}

#[test]
fn album_flags_conflict() {
    assert!(
        Args::try_parse_from([
            "sortmedia",
            "process",
            "-c",
            "--album",
            "x",
            "--album-from-directory",
            "a",
            "/archive"
        ])
        .is_err()
    );
}

#[test]
fn verify_subcommand() {
    let args = parse(&["sortmedia", "verify", "--fix", "-p", "3", "/archive"]);
    let Some(Command::Verify(v)) = &args.command else {
        panic!("expected verify");
    };
    let mut cfg = Config::default();
    args.apply_overrides(&mut cfg);
    let opts = v.verify_options(&cfg);
    assert!(opts.fix);
    assert_eq!(opts.naming.precision(), 3);
    assert_eq!(opts.dirs, vec![PathBuf::from("/archive")]);
}
