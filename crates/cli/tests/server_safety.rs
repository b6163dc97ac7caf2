use assert_cmd::prelude::*;
use std::process::Command;

#[test]
fn serve_http_refuses_non_loopback_without_public() {
    Command::new(assert_cmd::cargo::cargo_bin!("tally"))
        .env_remove("TALLY_AUTH_TOKEN")
        .args(["serve-http", "--bind", "0.0.0.0:0"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Refusing to bind"));
}

#[test]
fn serve_http_public_requires_auth_token() {
    Command::new(assert_cmd::cargo::cargo_bin!("tally"))
        .env_remove("TALLY_AUTH_TOKEN")
        .args(["serve-http", "--public", "--bind", "0.0.0.0:0"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("--public requires an auth token"));
}

#[test]
fn serve_http_rejects_blank_env_token() {
    Command::new(assert_cmd::cargo::cargo_bin!("tally"))
        .env("TALLY_AUTH_TOKEN", "   ")
        .args(["serve-http", "--bind", "127.0.0.1:0"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("auth token must be non-empty"));
}
