//! Tests for the `city-weather` binary

use std::process::Command;

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_city-weather"))
}

#[test]
fn test_cli_help() {
    let output = binary()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("city-weather"));
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("lookup"));
}

#[test]
fn test_lookup_blank_city_fails() {
    let output = binary()
        .args(["lookup", "  "])
        .env_remove("REDIS_ADDR")
        .stdin(std::process::Stdio::null())
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid City name"));
}

#[test]
fn test_lookup_unknown_city_reports_not_found() {
    let output = binary()
        .args(["lookup", "Nowhereville"])
        .env_remove("REDIS_ADDR")
        .env("CITY_WEATHER_DATA__LOCATIONS_PATH", concat!(env!("CARGO_MANIFEST_DIR"), "/data/cities.json"))
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("city not found"));
}
