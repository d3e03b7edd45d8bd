use std::{fs, process::Command};

fn cybermaze() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_cybermaze"));
    let _ = command.env_remove("RUST_LOG");
    command
}

#[test]
fn prints_the_generated_map_and_session_report() {
    let output = cybermaze()
        .args(["--seed", "7", "--ticks", "50", "--log", "warn"])
        .output()
        .expect("binary runs");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("session: "));
    assert!(stdout.contains("seed: 7"));
    let map: Vec<&str> = stdout.lines().filter(|line| line.starts_with('#')).collect();
    assert_eq!(map.len(), 23);
    assert!(map.iter().all(|line| line.len() == 41));
}

#[test]
fn same_seed_prints_the_same_map() {
    let run = || {
        cybermaze()
            .args(["--seed", "11", "--columns", "21", "--rows", "15"])
            .output()
            .expect("binary runs")
            .stdout
    };

    assert_eq!(run(), run());
}

#[test]
fn exports_the_level_as_json() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let path = dir.path().join("level.json");
    let output = cybermaze()
        .args(["--seed", "3", "--quiet", "--export"])
        .arg(&path)
        .output()
        .expect("binary runs");

    assert!(output.status.success(), "{output:?}");
    let json = fs::read_to_string(&path).expect("export written");
    let value: serde_json::Value = serde_json::from_str(&json).expect("export is json");
    assert_eq!(value["seed"], 3);
    assert_eq!(value["grid"]["cells"].as_array().map(Vec::len), Some(41 * 23));
}

#[test]
fn reads_settings_from_a_config_file() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let path = dir.path().join("cybermaze.toml");
    fs::write(&path, "[level]\ncolumns = 15\nrows = 11\ncorridor_width = 1\n")
        .expect("config written");

    let output = cybermaze()
        .args(["--seed", "5", "--config"])
        .arg(&path)
        .output()
        .expect("binary runs");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let map: Vec<&str> = stdout.lines().filter(|line| line.starts_with('#')).collect();
    assert_eq!(map.len(), 11);
    assert!(map.iter().all(|line| line.len() == 15));
}

#[test]
fn rejects_an_undersized_level() {
    let output = cybermaze()
        .args(["--columns", "4", "--rows", "4"])
        .output()
        .expect("binary runs");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid level configuration"));
}
