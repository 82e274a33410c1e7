//! Configuration parsing tests
//!
//! These tests verify TOML config parsing works correctly.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn breakpoint() -> Command {
    let mut cmd = Command::cargo_bin("breakpoint").unwrap();
    cmd.env_remove("BASE_URL").env_remove("DETECTED_ROUTES");
    cmd
}

mod basic_config {
    use super::*;

    #[test]
    fn full_config_validates() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("config.toml");

        fs::write(
            &config,
            r#"
[target]
base_url = "http://127.0.0.1:4000"
routes = ["/api/users", "/api/status/health"]
timeout = "3s"

[load]
duration = "5s"
rps = 25

[stress]
max_concurrency = 40
increment = 20
error_threshold = 15.0
"#,
        )
        .unwrap();

        breakpoint()
            .args(["all", "-f", config.to_str().unwrap(), "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Target URL:       http://127.0.0.1:4000/api/status/health",
            ))
            .stdout(predicate::str::contains("25 req/s for 5s"))
            .stdout(predicate::str::contains("+20 per wave up to 40"));
    }

    #[test]
    fn cli_overrides_config() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("config.toml");

        fs::write(
            &config,
            r#"
[target]
base_url = "http://127.0.0.1:4000"

[load]
rps = 25
"#,
        )
        .unwrap();

        breakpoint()
            .args([
                "load",
                "http://localhost:5000",
                "-f",
                config.to_str().unwrap(),
                "--rps",
                "3",
                "--dry-run",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("http://localhost:5000/api/health"))
            .stdout(predicate::str::contains("3 req/s"));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("config.toml");
        fs::write(&config, "").unwrap();

        breakpoint()
            .args(["all", "-f", config.to_str().unwrap(), "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains("http://localhost:3001/api/health"))
            .stdout(predicate::str::contains("10 req/s for 10s"))
            .stdout(predicate::str::contains("+10 per wave up to 100, threshold 30%"));
    }
}

mod env_vars {
    use super::*;

    #[test]
    fn interpolates_env_var() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("config.toml");

        fs::write(
            &config,
            r#"
[target]
base_url = "http://localhost:${BREAKPOINT_IT_PORT}"
"#,
        )
        .unwrap();

        breakpoint()
            .env("BREAKPOINT_IT_PORT", "7777")
            .args(["load", "-f", config.to_str().unwrap(), "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains("http://localhost:7777/api/health"));
    }

    #[test]
    fn missing_env_var_fails() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("config.toml");

        fs::write(
            &config,
            r#"
[target]
base_url = "${BREAKPOINT_IT_MISSING_URL}"
"#,
        )
        .unwrap();

        breakpoint()
            .env_remove("BREAKPOINT_IT_MISSING_URL")
            .args(["load", "-f", config.to_str().unwrap(), "--dry-run"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("BREAKPOINT_IT_MISSING_URL"));
    }
}

mod invalid_config {
    use super::*;

    #[test]
    fn zero_rps_in_file_fails() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("config.toml");

        fs::write(
            &config,
            r#"
[load]
rps = 0
"#,
        )
        .unwrap();

        breakpoint()
            .args(["load", "-f", config.to_str().unwrap(), "--dry-run"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("rps"));
    }

    #[test]
    fn malformed_toml_fails() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("config.toml");
        fs::write(&config, "[load\nrps = ").unwrap();

        breakpoint()
            .args(["load", "-f", config.to_str().unwrap(), "--dry-run"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("failed to parse config file"));
    }

    #[test]
    fn missing_file_fails() {
        breakpoint()
            .args(["load", "-f", "/nonexistent/breakpoint.toml", "--dry-run"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("failed to read config file"));
    }
}
