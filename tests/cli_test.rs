//! Integration tests for the stencil binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn stencil() -> Command {
    let mut cmd = Command::new(cargo_bin("stencil"));
    // Keep the host's Vault/Consul settings out of the tests
    for var in [
        "VAULT_ADDR",
        "VAULT_TOKEN",
        "VAULT_TOKEN_FILE",
        "VAULT_AUTH_USERNAME",
        "VAULT_AUTH_PASSWORD",
        "VAULT_ROLE_ID",
        "VAULT_SECRET_ID",
        "CONSUL_HTTP_ADDR",
        "CONSUL_HTTP_TOKEN",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    stencil()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("--input-dir"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    stencil()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn inline_template_renders_to_stdout() -> Result<(), Box<dyn std::error::Error>> {
    stencil()
        .args(["-i", "hello from stencil"])
        .assert()
        .success()
        .stdout("hello from stencil");
    Ok(())
}

#[test]
fn stdin_renders_to_stdout_by_default() -> Result<(), Box<dyn std::error::Error>> {
    stencil()
        .arg("render")
        .write_stdin("piped template")
        .assert()
        .success()
        .stdout("piped template");
    Ok(())
}

#[test]
fn input_dir_mirrors_into_output_dir() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let input = temp.path().join("in");
    fs::create_dir_all(input.join("b"))?;
    fs::write(input.join("a.txt"), "A")?;
    fs::write(input.join("b/c.txt"), "C")?;
    fs::write(input.join("skip.bak"), "S")?;

    stencil()
        .current_dir(temp.path())
        .args([
            "--input-dir",
            "in",
            "--output-dir",
            "out",
            "--exclude",
            "in/*.bak",
        ])
        .assert()
        .success();

    let out = temp.path().join("out");
    assert_eq!(fs::read_to_string(out.join("a.txt"))?, "A");
    assert_eq!(fs::read_to_string(out.join("b/c.txt"))?, "C");
    assert!(!out.join("skip.bak").exists());
    Ok(())
}

#[test]
fn input_dir_without_output_dir_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    fs::create_dir_all(temp.path().join("in"))?;
    fs::write(temp.path().join("in/a.txt"), "A")?;

    stencil()
        .current_dir(temp.path())
        .args(["--input-dir", "in"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--output-dir"));
    Ok(())
}

#[test]
fn missing_template_names_path() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;

    stencil()
        .current_dir(temp.path())
        .args(["-f", "nope.tmpl", "-o", "out.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.tmpl"));

    assert!(!temp.path().join("out.txt").exists());
    Ok(())
}

#[test]
fn fetch_reads_file_datasource() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    fs::write(temp.path().join("config.json"), r#"{"port":8080}"#)?;

    stencil()
        .current_dir(temp.path())
        .args(["fetch", "-d", "config.json", "config"])
        .assert()
        .success()
        .stdout(r#"{"port":8080}"#);
    Ok(())
}

#[test]
fn fetch_reads_consul_key() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v1/kv/foo");
        then.status(200).body("bar");
    });

    stencil()
        .args([
            "fetch",
            "-d",
            &format!("kv=consul+http://{}/", server.address()),
            "kv",
            "foo",
        ])
        .assert()
        .success()
        .stdout("bar");

    mock.assert();
    Ok(())
}

#[test]
fn fetch_missing_vault_secret_exits_nonzero() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/secret/bar");
        then.status(404).body(r#"{"errors":[]}"#);
    });

    stencil()
        .env("VAULT_ADDR", server.base_url())
        .env("VAULT_TOKEN", "s.root")
        .args(["fetch", "-d", "vault=vault:///secret", "vault", "bar"])
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains(
            "No value found for [bar] from datasource 'vault'",
        ));
    Ok(())
}

#[test]
fn fetch_unknown_alias_fails() -> Result<(), Box<dyn std::error::Error>> {
    stencil()
        .args(["fetch", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing"));
    Ok(())
}

#[test]
fn completions_generate_script() -> Result<(), Box<dyn std::error::Error>> {
    stencil()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stencil"));
    Ok(())
}
