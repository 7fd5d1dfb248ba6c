//! encrypt, decrypt and rotate through the binary.

use crate::support::*;

#[test]
fn test_decrypt_plaintext_passes_through() {
    let t = Test::new();
    t.write("plain.sls", PLAIN_PILLAR);

    let output = t.decrypt_all("plain.sls");
    assert_success(&output);

    let out = stdout(&output);
    assert_rendered(&out);
    assert_eq!(parse_yaml(&out), parse_yaml(PLAIN_PILLAR));
    // Nothing but the document on stdout.
    assert!(!out.contains("wrote out"));
}

#[test]
fn test_decrypt_from_stdin() {
    let t = Test::new();

    let output = t
        .cmd()
        .args(["decrypt", "all"])
        .write_stdin(PLAIN_PILLAR)
        .output()
        .unwrap();
    assert_success(&output);
    assert_rendered(&stdout(&output));
    assert_stdout_contains(&output, "hunter2");
}

#[test]
fn test_decrypt_to_outfile() {
    let t = Test::new();
    t.write("plain.sls", PLAIN_PILLAR);

    let output = t.run(&["decrypt", "all", "-f", "plain.sls", "-o", "out/plain.sls"]);
    assert_success(&output);
    assert!(stdout(&output).is_empty());
    assert_stderr_contains(&output, "wrote out to file");

    let written = t.read("out/plain.sls");
    assert_rendered(&written);
    assert_eq!(parse_yaml(&written), parse_yaml(PLAIN_PILLAR));
    // Source untouched.
    assert_eq!(t.read("plain.sls"), PLAIN_PILLAR);
}

#[cfg(unix)]
#[test]
fn test_written_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let t = Test::new();
    t.write("plain.sls", PLAIN_PILLAR);

    let output = t.run(&["decrypt", "all", "-f", "plain.sls", "-u"]);
    assert_success(&output);

    let mode = std::fs::metadata(t.path("plain.sls")).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
}

#[test]
fn test_encrypt_leaves_ciphertext_alone() {
    let t = Test::new();
    let pillar = encrypted_pillar();
    t.write("enc.sls", &pillar);

    // No plaintext strings, so no key is needed.
    let output = t.run(&["encrypt", "all", "-f", "enc.sls"]);
    assert_success(&output);
    assert_eq!(parse_yaml(&stdout(&output)), parse_yaml(&pillar));
}

#[test]
fn test_element_scope_skips_other_keys() {
    let t = Test::new();
    let pillar = "secure_vars:\n  password: hunter2\nlimits:\n  max: 10\n  enabled: true\n";
    t.write("mixed.sls", pillar);

    // Encrypting secure_vars needs a key; limits has no strings to encrypt.
    let output = t.run(&["-e", "secure_vars", "encrypt", "all", "-f", "mixed.sls"]);
    assert_failure(&output);

    let output = t.run(&["-e", "limits", "encrypt", "all", "-f", "mixed.sls"]);
    assert_success(&output);
    assert_eq!(parse_yaml(&stdout(&output)), parse_yaml(pillar));

    let output = t.run(&["-e", "missing", "encrypt", "all", "-f", "mixed.sls"]);
    assert_success(&output);
    assert_eq!(parse_yaml(&stdout(&output)), parse_yaml(pillar));
}

#[test]
fn test_path_scope_errors() {
    let t = Test::new();
    t.write("plain.sls", PLAIN_PILLAR);

    let output = t.run(&["decrypt", "path", "-p", "secure_vars:nope", "-f", "plain.sls"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "no value at path 'secure_vars:nope'");

    let output = t.run(&["decrypt", "path", "-p", "secure_vars:admins", "-f", "plain.sls"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "is not a string");
}

#[test]
fn test_decrypt_path_plaintext_unchanged() {
    let t = Test::new();
    t.write("plain.sls", PLAIN_PILLAR);

    let output = t.run(&["decrypt", "path", "-p", "secure_vars:db_password", "-f", "plain.sls"]);
    assert_success(&output);
    assert_eq!(parse_yaml(&stdout(&output)), parse_yaml(PLAIN_PILLAR));
}

#[test]
fn test_recurse_continues_past_bad_files() {
    let t = Test::new();
    t.write("pillar/a.sls", PLAIN_PILLAR);
    t.write("pillar/nested/b.sls", "app:\n  name: demo\n");
    t.write("pillar/nested/top.sls", INCLUDE_PILLAR);
    t.write("pillar/nested/empty.sls", "");
    t.write("pillar/readme.txt", "not: pillar\n");

    let output = t.run(&["decrypt", "recurse", "-d", "pillar"]);
    assert_success(&output);
    assert_stderr_contains(&output, "contains include directives");

    assert_rendered(&t.read("pillar/a.sls"));
    assert_rendered(&t.read("pillar/nested/b.sls"));
    assert_eq!(t.read("pillar/nested/top.sls"), INCLUDE_PILLAR);
    assert_eq!(t.read("pillar/nested/empty.sls"), "");
    assert_eq!(t.read("pillar/readme.txt"), "not: pillar\n");
}

#[test]
fn test_recurse_missing_dir_fails() {
    let t = Test::new();

    let output = t.run(&["decrypt", "recurse", "-d", "nowhere"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "is not a directory");
}

#[test]
fn test_rotate_without_key_fails() {
    let t = Test::new();
    t.write("plain.sls", PLAIN_PILLAR);

    let output = t.run(&["rotate", "-f", "plain.sls", "-u"]);
    assert_failure(&output);
    assert_eq!(t.read("plain.sls"), PLAIN_PILLAR);
}
