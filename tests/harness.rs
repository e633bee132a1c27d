use std::fs;
use std::process::Command;

use kvbench::{run_all, Config, EngineKind, Phase};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn report_lines(out: &[u8]) -> Vec<String> {
    String::from_utf8(out.to_vec())
        .unwrap()
        .lines()
        .filter(|l| l.contains(" benchmark: "))
        .map(str::to_string)
        .collect()
}

#[test]
fn all_engines_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        nops: 100,
        lkv: 8,
        data_dir: dir.path().to_path_buf(),
        ..Config::default()
    };

    let mut out = Vec::new();
    let summary = run_all(&config, &mut StdRng::seed_from_u64(2024), &mut out).unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.reports.len(), 4);
    for (report, kind) in summary.reports.iter().zip(EngineKind::ALL) {
        assert_eq!(report.engine, kind);
        let phases: Vec<Phase> = report.phases.iter().map(|p| p.phase).collect();
        assert_eq!(phases, Phase::ALL.to_vec());
    }

    let lines = report_lines(&out);
    assert_eq!(lines.len(), 12);
    for (line, kind) in lines.chunks(3).zip(EngineKind::ALL) {
        assert!(line[0].starts_with(&format!("{} Write benchmark: ", kind.label())));
        assert!(line[1].starts_with(&format!("{} Read benchmark: ", kind.label())));
        assert!(line[2].starts_with(&format!("{} Delete benchmark: ", kind.label())));
    }

    // every artifact directory is gone
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn empty_workload_completes() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        nops: 0,
        data_dir: dir.path().to_path_buf(),
        ..Config::default()
    };

    let mut out = Vec::new();
    let summary = run_all(&config, &mut StdRng::seed_from_u64(1), &mut out).unwrap();

    assert_eq!(summary.reports.len(), 4);
    assert!(summary.reports.iter().all(|r| r.phases.len() == 3));
    assert_eq!(report_lines(&out).len(), 12);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn binary_runs_with_flags() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_kvbench"))
        .current_dir(dir.path())
        .env("RUST_LOG", "info")
        .args(["--nops", "20", "--lkv", "4", "--seed", "7"])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("Running benchmarks with 20 operations and key-value length of 4"));
    assert_eq!(report_lines(stdout.as_bytes()).len(), 12);
    // engines are separated by a single blank line each
    assert_eq!(stdout.matches("\n\n").count(), 4);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn binary_exits_nonzero_on_open_failure() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"not a directory").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_kvbench"))
        .current_dir(dir.path())
        .env("RUST_LOG", "info")
        .args(["--nops", "5", "--engines", "sqlite,sled"])
        .arg("--data-dir")
        .arg(&blocker)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("SQLite: failed to open storage"), "stderr: {}", stderr);
    // fail-fast: the second engine never starts
    assert!(!stderr.contains("Running Sled benchmark"));
    assert_eq!(report_lines(&output.stdout).len(), 0);
}

#[test]
fn binary_rejects_keys_too_long_for_lmdb() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_kvbench"))
        .current_dir(dir.path())
        .args(["--nops", "5", "--lkv", "600", "--engines", "sled,lmdb"])
        .arg("--data-dir")
        .arg(dir.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("LMDB accepts at most 511"), "stderr: {}", stderr);
    // rejected before any engine starts
    assert!(output.stdout.is_empty());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
