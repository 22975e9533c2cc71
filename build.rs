use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs");

    let version = describe_head().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());
    println!("cargo:rustc-env=SIMPLEAUDIO_VERSION={version}");
}

/// `git describe` output with the leading `v` stripped, or None outside a git checkout.
fn describe_head() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--always", "--dirty", "--tags", "--match", "v[0-9]*"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let raw = String::from_utf8(output.stdout).ok()?;
    let raw = raw.trim();
    match raw {
        "" => None,
        tagged if tagged.starts_with('v') => Some(tagged.trim_start_matches('v').to_string()),
        // Untagged history: bare commit hash.
        hash => Some(format!("{}-g{hash}", env!("CARGO_PKG_VERSION"))),
    }
}
