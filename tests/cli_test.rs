use anyhow::Result;
use std::process::{Command, Output};

fn run_cli(args: &[&str]) -> Result<Output> {
    let output = Command::new(env!("CARGO_BIN_EXE_f3dat-gen"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .env_remove("APP_ENV")
        .env("RUST_LOG", "f3dat_gen=debug")
        .env("GEOMETRY_DIR", "/srv/geometry")
        .args(["--session", "demos/session.toml", "--verbose"])
        .args(args)
        .output()?;
    assert!(
        output.status.success(),
        "f3dat-gen failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(output)
}

#[test]
fn test_stdout_carries_only_the_script() -> Result<()> {
    let output = run_cli(&["--stdout"])?;
    let stdout = String::from_utf8(output.stdout)?;
    let stderr = String::from_utf8(output.stderr)?;

    assert!(stdout.starts_with("; Generated by f3dat-gen"));
    assert!(stdout.contains("fish set @Stoping_File= 'stopes.stl'"));
    assert!(!stdout.contains("Configuration Summary"));
    assert!(!stdout.contains("Loading session"));

    assert!(stderr.contains("Configuration Summary"));
    assert!(stderr.contains("Loading session"));
    Ok(())
}

#[test]
fn test_json_output_parses_and_writes_no_script() -> Result<()> {
    let output = run_cli(&["--json", "--output-dir", "target/cli-json-never-written"])?;

    let preview: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(preview["project"]["name"], "North Block Expansion");
    assert!(!std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("target/cli-json-never-written")
        .exists());
    Ok(())
}
