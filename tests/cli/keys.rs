//! keys command through the binary.

use crate::support::*;

#[test]
fn test_keys_all_plaintext_reports_nothing() {
    let t = Test::new();
    t.write("plain.sls", PLAIN_PILLAR);

    let output = t.keys_all("plain.sls");
    assert_success(&output);
    assert!(stdout(&output).is_empty());
    assert_stderr_contains(&output, "no encrypted values");
}

#[test]
fn test_keys_path_plaintext_is_an_error() {
    let t = Test::new();
    t.write("plain.sls", PLAIN_PILLAR);

    let output = t.run(&["keys", "path", "-p", "secure_vars:db_password", "-f", "plain.sls"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "value is not encrypted");

    let output = t.run(&["keys", "path", "-p", "public_vars:replicas", "-f", "plain.sls"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "value is not encrypted");
}

#[test]
fn test_keys_path_missing() {
    let t = Test::new();
    t.write("plain.sls", PLAIN_PILLAR);

    let output = t.run(&["keys", "path", "-p", "nope:nothing", "-f", "plain.sls"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "no value at path");
}

#[test]
fn test_keys_include_rejected() {
    let t = Test::new();
    t.write("top.sls", INCLUDE_PILLAR);

    let output = t.keys_all("top.sls");
    assert_failure(&output);
    assert_stderr_contains(&output, "contains include directives");
}

#[test]
fn test_keys_recurse_plaintext() {
    let t = Test::new();
    t.write("pillar/a.sls", PLAIN_PILLAR);
    t.write("pillar/b/c.sls", "x: y\n");

    let output = t.run(&["keys", "recurse", "-d", "pillar", "--json"]);
    assert_success(&output);
    assert!(stdout(&output).is_empty());
    // Identify never rewrites.
    assert_eq!(t.read("pillar/a.sls"), PLAIN_PILLAR);
}
