//! Test fixtures and constants.

/// A typical plaintext pillar.
pub const PLAIN_PILLAR: &str = "\
secure_vars:
  db_password: hunter2
  api_key: sk-test-12345
  ports:
    - 8080
    - 8443
  admins:
    - alice
    - bob
public_vars:
  region: us-east-1
  replicas: 3
  debug: false
";

/// A pillar that pulls in other files.
pub const INCLUDE_PILLAR: &str = "\
include:
  - common.secrets
secure_vars:
  token: abc123
";

/// An armored value as it appears in an encrypted pillar.
pub const ARMORED_VALUE: &str = "\
-----BEGIN PGP MESSAGE-----

hQEMA0xbFlVhZ2FZAQf+opaque
=abcd
-----END PGP MESSAGE-----
";

/// A pillar whose only string value is already encrypted.
pub fn encrypted_pillar() -> String {
    let indented: String = ARMORED_VALUE
        .lines()
        .map(|line| format!("    {}\n", line))
        .collect();
    format!("secure_vars:\n  password: |\n{}  retries: 3\n", indented)
}

/// Config with two profiles; `dev` is the default.
pub const CONFIG: &str = r#"
[[profiles]]
name = "dev"
default = true
default_key = "Dev Salt Master"

[[profiles]]
name = "prod"
default_key = "Prod Salt Master"
gnupg_home = "/nonexistent/prod-gnupg"
"#;
