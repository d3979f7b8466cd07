use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::tempdir;

fn write_finished_scan(dir: &Path) -> String {
    fs::write(
        dir.join("scan-resume.dat"),
        "F\n80 900 1 2\n-1.0 0.02\nF\n0\nT 0 0 2\n0.001 -1.0 0.02\n",
    )
    .expect("resume");
    fs::write(dir.join("scan-phys_live.points"), "0.5 -1.0 1\n0.6 -1.2 1\n").expect("phys");
    fs::write(dir.join("scan-live.points"), "0.5 -1.0\n0.6 -1.2\n").expect("live");
    format!("{}/scan-", dir.display())
}

fn mnprobe() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mnprobe"))
}

#[test]
fn check_emits_json() {
    let dir = tempdir().expect("tempdir");
    let root = write_finished_scan(dir.path());
    let output = mnprobe()
        .args(["check", &root, "--json", "--tol", "0.5"])
        .output()
        .expect("run mnprobe check");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["global"]["stop"], true);
    assert_eq!(value["global"]["tol"], 0.5);
    assert_eq!(value["modes"]["0"]["n_live"], 2);
}

#[test]
fn check_fails_on_missing_files() {
    let dir = tempdir().expect("tempdir");
    let root = format!("{}/absent-", dir.path().display());
    let output = mnprobe().args(["check", &root]).output().expect("run");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("absent-resume.dat"));
}

#[test]
fn watch_exits_once_scan_stopped() {
    let dir = tempdir().expect("tempdir");
    let root = write_finished_scan(dir.path());
    let output = mnprobe()
        .args(["watch", &root, "--interval", "0", "--count", "3"])
        .output()
        .expect("run mnprobe watch");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("mode 0: ln_delta_max="));
    assert_eq!(stdout.matches("n_rejected=80").count(), 1);
}

#[test]
fn version_prints_package_version() {
    let output = mnprobe().arg("version").output().expect("run");
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        env!("CARGO_PKG_VERSION")
    );
}
