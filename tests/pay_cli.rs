use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;

const BASE_USDC: &str = "nep141:base-0x833589fcd6edb6e08f4c7c32d4f71b54bda02913.omft.near";

#[test]
fn assets_by_id_prints_the_registry_entry() -> Result<()> {
    let output = Command::cargo_bin("pay_cli")?
        .args(["assets", "--id", BASE_USDC])
        .output()?;
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["id"], BASE_USDC);
    assert_eq!(json["chain"], "base");
    assert_eq!(json["symbol"], "USDC");
    assert_eq!(json["decimals"], 6);
    Ok(())
}

#[test]
fn assets_filtered_by_chain_and_symbol() -> Result<()> {
    let output = Command::cargo_bin("pay_cli")?
        .args(["assets", "--chain", "base", "--symbol", "usdc"])
        .output()?;
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let assets = json["assets"].as_array().cloned().unwrap_or_default();
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0]["id"], BASE_USDC);
    assert!(
        json["chains"]
            .as_array()
            .is_some_and(|c| c.contains(&serde_json::json!("near")))
    );
    Ok(())
}

#[test]
fn unknown_asset_fails() -> Result<()> {
    Command::cargo_bin("pay_cli")?
        .args(["assets", "--id", "nep141:nope.near"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("asset not found"));
    Ok(())
}

#[test]
fn add_rejects_an_unknown_frequency() -> Result<()> {
    Command::cargo_bin("pay_cli")?
        .args([
            "add",
            "--recipient",
            "0xabc",
            "--amount",
            "100000",
            "--token",
            "USDC",
            "--chain",
            "base",
            "--frequency",
            "daily",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown frequency"));
    Ok(())
}

#[test]
fn server_exposes_the_dry_run_toggle() -> Result<()> {
    Command::cargo_bin("pay_server")?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run").and(predicate::str::contains("SIMULATE")));
    Ok(())
}
