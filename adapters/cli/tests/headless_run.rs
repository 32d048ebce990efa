use std::{fs, process::Command};

fn olive_grove() -> Command {
    Command::new(env!("CARGO_BIN_EXE_olive-grove"))
}

#[test]
fn short_session_reports_a_final_score() {
    let output = olive_grove()
        .args(["--seconds", "3", "--seed", "11"])
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to launch olive-grove");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("final score: "), "unexpected output: {stdout}");
}

#[test]
fn same_seed_prints_the_same_summary() {
    let run = || {
        olive_grove()
            .args(["--seconds", "20", "--seed", "3"])
            .env("RUST_LOG", "off")
            .output()
            .expect("failed to launch olive-grove")
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn configuration_file_is_applied() {
    let path = std::env::temp_dir().join(format!("olive-grove-{}.toml", std::process::id()));
    fs::write(&path, "session_duration_ms = 1000\ncolumns = 4\nrows = 4\n")
        .expect("write config");

    let output = olive_grove()
        .arg("--config")
        .arg(&path)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to launch olive-grove");
    let _ = fs::remove_file(&path);

    assert!(output.status.success(), "{output:?}");
    assert!(String::from_utf8_lossy(&output.stdout).contains("60 frames"));
}

#[test]
fn invalid_configuration_fails_with_context() {
    let output = olive_grove()
        .args(["--seconds", "0"])
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to launch olive-grove");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid session configuration"), "{stderr}");
}

#[test]
fn missing_configuration_file_is_reported() {
    let output = olive_grove()
        .args(["--config", "/definitely/not/here.toml"])
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to launch olive-grove");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read config file"));
}
