//! Integration tests for CLI argument handling
//!
//! Runs the binary with arguments that exit before the TUI starts.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_apodsaver"))
        .args(args)
        .output()
        .expect("Failed to execute apodsaver")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("apodsaver"), "Help should mention apodsaver");
    assert!(stdout.contains("--api-key"), "Help should mention --api-key");
    assert!(stdout.contains("--log-file"), "Help should mention --log-file");
}

#[test]
fn test_version_flag_exits_successfully() {
    let output = run_cli(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_zero_retries_prints_error_and_exits() {
    let output = run_cli(&["--retries", "0"]);
    assert!(!output.status.success(), "Expected zero retries to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("retry"),
        "Should print error message about the retry count: {}",
        stderr
    );
}

#[test]
fn test_invalid_api_url_prints_error_and_exits() {
    let output = run_cli(&["--api-url", "ftp://example.com"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid API URL"), "unexpected stderr: {}", stderr);
}

#[test]
fn test_unknown_flag_is_rejected() {
    let output = run_cli(&["--plan"]);
    assert!(!output.status.success());
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use apodsaver::cli::{Cli, CliError, StartupConfig};
    use clap::Parser;
    use std::time::Duration;

    #[test]
    fn test_startup_config_uses_flags() {
        let cli = Cli::parse_from([
            "apodsaver",
            "--api-key",
            "abc123",
            "--api-url",
            "https://example.com/apod",
            "--hit-delay-ms",
            "0",
        ]);
        let config = StartupConfig::from_cli(&cli).unwrap();

        assert_eq!(config.client.api_key, "abc123");
        assert_eq!(config.client.base_url, "https://example.com/apod");
        assert_eq!(config.cache.hit_delay, Duration::ZERO);
    }

    #[test]
    fn test_startup_config_invalid_url() {
        let cli = Cli::parse_from(["apodsaver", "--api-key", "k", "--api-url", "nope"]);
        let result = StartupConfig::from_cli(&cli);
        assert!(matches!(result, Err(CliError::InvalidApiUrl(_))));
    }
}
