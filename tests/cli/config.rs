//! Profile selection through the binary.

use crate::support::*;

#[test]
fn test_unknown_profile_fails() {
    let t = Test::new();
    t.write_config(CONFIG);
    t.write("plain.sls", PLAIN_PILLAR);

    let output = t.run(&["--profile", "staging", "decrypt", "all", "-f", "plain.sls"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "profile not found: staging");
}

#[test]
fn test_profile_from_env() {
    let t = Test::new();
    t.write_config(CONFIG);
    t.write("plain.sls", PLAIN_PILLAR);

    let output = t
        .cmd()
        .env("SECURE_PILLAR_PROFILE", "staging")
        .args(["decrypt", "all", "-f", "plain.sls"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "profile not found");
}

#[test]
fn test_key_flag_ignores_profiles() {
    let t = Test::new();
    t.write_config(CONFIG);
    t.write("plain.sls", PLAIN_PILLAR);

    let output = t.run(&[
        "--profile", "staging", "-k", "Salt Master", "decrypt", "all", "-f", "plain.sls",
    ]);
    assert_success(&output);
}

#[test]
fn test_default_profile_supplies_key() {
    let t = Test::new();
    t.write_config(CONFIG);
    t.write("plain.sls", PLAIN_PILLAR);

    // The key exists in no keyring, so this still fails, but past key selection.
    let output = t.encrypt_in_place("plain.sls");
    assert_failure(&output);
    assert!(!stderr(&output).contains("no PGP key given"));
    assert_eq!(t.read("plain.sls"), PLAIN_PILLAR);
}

#[test]
fn test_explicit_config_file() {
    let t = Test::new();
    let config = t.write("custom.toml", CONFIG);
    t.write("plain.sls", PLAIN_PILLAR);

    let config = config.to_string_lossy().to_string();
    let output = t.run(&[
        "--config", &config, "--profile", "prod", "decrypt", "all", "-f", "plain.sls",
    ]);
    assert_success(&output);
}

#[test]
fn test_malformed_config_fails() {
    let t = Test::new();
    t.write_config("[[profiles]\nname = ");
    t.write("plain.sls", PLAIN_PILLAR);

    let output = t.decrypt_all("plain.sls");
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to parse config file");
}
