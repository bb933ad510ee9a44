use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::tempdir;

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("workspace root")
        .to_path_buf()
}

fn cli_command() -> Command {
    if let Some(bin) = option_env!("CARGO_BIN_EXE_wheelsmith_cli") {
        Command::new(bin)
    } else {
        let mut cmd = Command::new("cargo");
        cmd.args(["run", "-p", "wheelsmith_cli", "--"]);
        cmd
    }
}

#[test]
fn cli_reduces_explicit_pool_and_exports_csv() {
    let temp_dir = tempdir().expect("temp output dir");
    let output_dir = temp_dir.path().join("wheel_output");

    let status = cli_command()
        .args([
            "wheel",
            "--numbers",
            "1,2,3,4,5,6,7",
            "--k",
            "4",
            "--fixed",
            "1",
            "--guarantee",
            "2",
            "--seed",
            "7",
            "--quiet",
            "--output-dir",
            output_dir.to_str().expect("output"),
        ])
        .current_dir(workspace_root())
        .status()
        .expect("failed to spawn wheelsmith_cli");

    assert!(status.success(), "wheelsmith_cli exited with {status:?}");

    let csv = output_dir.join("wheel.csv");
    let text = fs::read_to_string(&csv).expect("wheel.csv readable");
    assert!(text.contains("# status: complete"));
    assert!(text.contains("N1,N2,N3,N4"));
    let rows: Vec<&str> = text
        .lines()
        .filter(|line| !line.starts_with('#') && !line.starts_with('N'))
        .collect();
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|row| row.starts_with("1,")));
    assert!(output_dir.join("wheel_manifest.json").exists());
    assert!(output_dir.join("wheelsmith.log").exists());
}

#[test]
fn cli_rejects_conflicting_pool_sources() {
    let temp_dir = tempdir().expect("temp output dir");
    let status = cli_command()
        .args([
            "wheel",
            "--numbers",
            "1,2,3",
            "--pool-size",
            "10",
            "--k",
            "2",
            "--no-file-log",
            "--output-dir",
            temp_dir.path().to_str().expect("output"),
        ])
        .current_dir(workspace_root())
        .status()
        .expect("failed to spawn wheelsmith_cli");

    assert!(!status.success());
}
