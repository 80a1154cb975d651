use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "maze-escape"])
        .status()
        .expect("failed to invoke cargo check for maze-escape CLI binary");

    assert!(status.success(), "cargo check --bin maze-escape should succeed");
}

#[test]
fn corridor_script_escapes() {
    let output = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args([
            "run",
            "--quiet",
            "--bin",
            "maze-escape",
            "--",
            "--builtin",
            "corridor",
            "--script",
            "1R wait:500 1R wait:500 1R",
        ])
        .output()
        .expect("failed to run maze-escape CLI binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("LevelEscaped"), "unexpected output: {stdout}");
}
