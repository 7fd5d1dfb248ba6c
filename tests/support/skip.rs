/// Skip a test if the gpg CLI is not installed.
#[macro_export]
macro_rules! skip_without_gpg {
    () => {
        if which::which("gpg").is_err() {
            eprintln!("SKIPPED: gpg not found on PATH");
            return;
        }
    };
}
