//! Integration tests for the oceanctl binary

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use assert_cmd::Command;
use predicates::prelude::*;

fn oceanctl() -> Command {
    let mut cmd = Command::cargo_bin("oceanctl").expect("binary");
    cmd.env_remove("OCEAN_ACCESS_TOKEN")
        .env_remove("OCEAN_API_URL")
        .env_remove("OCEAN_TRACE")
        .env_remove("RUST_LOG");
    cmd
}

/// Answers `connections` requests with the same JSON body, one per connection.
fn serve_json(connections: usize, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    thread::spawn(move || {
        for stream in listener.incoming().take(connections) {
            let mut stream = stream.expect("accept");
            let mut raw = Vec::new();
            let mut buf = [0_u8; 1024];
            while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).expect("read");
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
            }
            write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .expect("write");
        }
    });
    format!("http://{addr}")
}

const COMPLETED: &str = r#"{"action":{"id":5,"status":"completed","type":"create","started_at":"2024-05-01T10:00:00Z","completed_at":"2024-05-01T10:05:00Z","resource_id":42,"resource_type":"droplet","region_slug":"nyc3"}}"#;

#[test]
fn test_cli_help() {
    oceanctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("action"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_action_help_lists_subcommands() {
    oceanctl()
        .args(["action", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("wait"));
}

#[test]
fn test_cli_version() {
    oceanctl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("oceanctl"));
}

#[test]
fn test_missing_token_is_reported() {
    oceanctl()
        .args(["action", "get", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Error: access token is required. (hint: export OCEAN_ACCESS_TOKEN or pass --access-token)",
        ));
}

#[test]
fn test_non_numeric_id_is_a_usage_error() {
    oceanctl()
        .args(["-t", "tok", "action", "get", "five"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_zero_poll_timeout_is_rejected() {
    oceanctl()
        .args(["-t", "tok", "action", "wait", "5", "--poll-timeout", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("poll interval must be a positive number"))
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_malformed_bound_is_rejected() {
    oceanctl()
        .args(["-t", "tok", "action", "list", "--after", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid after timestamp"));
}

#[test]
fn test_get_against_local_api() {
    let base = serve_json(1, COMPLETED);

    oceanctl()
        .args(["-t", "tok", "-u", &base, "-o", "json", "action", "get", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""status": "completed""#));
}

#[test]
fn test_wait_against_local_api() {
    let base = serve_json(1, COMPLETED);

    oceanctl()
        .args(["-t", "tok", "-u", &base, "action", "wait", "5", "--poll-timeout", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("completed"))
        .stdout(predicate::str::contains("droplet"));
}

#[test]
fn test_trace_logs_round_trip_without_token() {
    let base = serve_json(1, COMPLETED);

    oceanctl()
        .args(["-t", "s3cr3t-token", "-u", &base, "--trace", "action", "get", "5"])
        .assert()
        .success()
        .stderr(predicate::str::contains("-> \"GET /v2/actions/5 HTTP/1.1"))
        .stderr(predicate::str::contains("<- \"HTTP/1.1 200 OK"))
        .stderr(predicate::str::contains("s3cr3t-token").not());
}
