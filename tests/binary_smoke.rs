use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn binary_help_succeeds() {
    let me = assert_cmd::cargo::cargo_bin!("sortmedia");
    let out = Command::new(me).arg("--help").output().expect("spawn binary");
    assert!(out.status.success(), "binary should succeed with --help");
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("process"));
    assert!(text.contains("verify"));
}

#[test]
fn binary_print_config_succeeds() {
    let td = tempdir().unwrap();
    let cfg = td.path().join("config.xml");
    fs::write(&cfg, "<config/>").unwrap();
    let me = assert_cmd::cargo::cargo_bin!("sortmedia");
    let out = Command::new(me)
        .env("SORTMEDIA_CONFIG", &cfg)
        .arg("--print-config")
        .output()
        .expect("spawn binary");
    assert!(out.status.success(), "binary should succeed with --print-config");
    assert!(String::from_utf8_lossy(&out.stdout).contains(&cfg.display().to_string()));
}

#[test]
fn binary_rejects_missing_mode() {
    let me = assert_cmd::cargo::cargo_bin!("sortmedia");
    let out = Command::new(me)
        .args(["process", "a", "b"])
        .output()
        .expect("spawn binary");
    assert!(!out.status.success());
}
