//! create and update through the binary.

use crate::support::*;

#[test]
fn test_create_requires_name() {
    let t = Test::new();
    assert_failure(&t.run(&["create", "-s", "value", "-o", "new.sls"]));
}

#[test]
fn test_create_without_key_writes_nothing() {
    let t = Test::new();

    let output = t.run(&["create", "-n", "secret_name1", "-s", "secret_value1", "-o", "new.sls"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "no PGP key given");
    assert!(!t.path("new.sls").exists());
}

#[test]
fn test_update_without_key_leaves_file() {
    let t = Test::new();
    t.write("plain.sls", PLAIN_PILLAR);

    let output = t.run(&["update", "-n", "secure_vars:new", "-s", "v", "-f", "plain.sls"]);
    assert_failure(&output);
    assert_eq!(t.read("plain.sls"), PLAIN_PILLAR);
}

#[test]
fn test_update_include_rejected() {
    let t = Test::new();
    t.write("top.sls", INCLUDE_PILLAR);

    let output = t.run(&["-k", "Salt Master", "update", "-n", "a", "-s", "b", "-f", "top.sls"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "contains include directives");
    assert_eq!(t.read("top.sls"), INCLUDE_PILLAR);
}

#[test]
fn test_create_into_include_file_rejected() {
    let t = Test::new();
    t.write("top.sls", INCLUDE_PILLAR);

    let output = t.run(&["-k", "Salt Master", "create", "-n", "a", "-s", "b", "-o", "top.sls"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "contains include directives");
    assert_eq!(t.read("top.sls"), INCLUDE_PILLAR);
}
