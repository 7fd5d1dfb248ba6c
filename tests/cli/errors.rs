//! Tests for error handling and CLI flags.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_help() {
    let t = Test::new();

    let output = t.run(&["--help"]);
    assert_success(&output);
    assert_stdout_contains(&output, "secure-pillar");
    assert_stdout_contains(&output, "include directives");
}

#[test]
fn test_version() {
    let t = Test::new();

    let output = t.run(&["--version"]);
    assert_success(&output);
    assert_stdout_contains(&output, env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();
    assert_failure(&t.run(&["unknown-command"]));
}

#[test]
fn test_verbose_flag_accepted() {
    let t = Test::new();
    t.write("plain.sls", PLAIN_PILLAR);

    let output = t.run(&["--verbose", "decrypt", "all", "-f", "plain.sls"]);
    assert_success(&output);
}

#[test]
fn test_include_rejected_and_untouched() {
    let t = Test::new();
    t.write("top.sls", INCLUDE_PILLAR);

    let output = t.encrypt_in_place("top.sls");
    assert_failure(&output);
    assert_stderr_contains(&output, "contains include directives");
    assert_stderr_contains(&output, "→");
    assert_eq!(t.read("top.sls"), INCLUDE_PILLAR);
}

#[test]
fn test_encrypt_without_key_fails_with_hint() {
    let t = Test::new();
    t.write("plain.sls", PLAIN_PILLAR);

    let output = t.encrypt_in_place("plain.sls");
    assert_failure(&output);
    assert_stderr_contains(&output, "no PGP key given");
    assert_stderr_contains(&output, "-k");
    assert_eq!(t.read("plain.sls"), PLAIN_PILLAR);
}

#[test]
fn test_malformed_yaml_fails() {
    let t = Test::new();
    t.write("bad.sls", "key: [unclosed\n");

    let output = t.decrypt_all("bad.sls");
    assert_failure(&output);
    assert_stderr_contains(&output, "unable to parse bad.sls");
}

#[test]
fn test_top_level_sequence_fails() {
    let t = Test::new();
    t.write("list.sls", "- a\n- b\n");

    let output = t.decrypt_all("list.sls");
    assert_failure(&output);
    assert_stderr_contains(&output, "unable to parse");
}

#[test]
fn test_missing_input_is_created_then_empty() {
    let t = Test::new();

    let output = t.decrypt_all("new/dir/missing.sls");
    assert_failure(&output);
    assert_stderr_contains(&output, "has no values to format");
    assert!(t.path("new/dir/missing.sls").is_file());
}

#[test]
fn test_directory_as_input_fails() {
    let t = Test::new();
    std::fs::create_dir_all(t.path("pillar")).unwrap();

    let output = t.decrypt_all("pillar");
    assert_failure(&output);
    assert_stderr_contains(&output, "is a directory");
}

#[test]
fn test_rotate_requires_file_or_dir() {
    let t = Test::new();
    assert_failure(&t.run(&["rotate"]));
    assert_failure(&t.run(&["rotate", "-f", "a.sls", "-d", "."]));
}

#[test]
fn test_completions() {
    let t = Test::new();

    t.cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("secure-pillar"));

    t.cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("#compdef secure-pillar"));
}

#[test]
fn test_subcommand_aliases() {
    let t = Test::new();
    t.write("plain.sls", PLAIN_PILLAR);

    t.cmd()
        .args(["d", "all", "-f", "plain.sls"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("#!yaml|gpg"));

    t.cmd()
        .args(["k", "all", "-f", "plain.sls"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
