use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

/// Version reported by `--version` and the HTTP user agent.
///
/// A clean tag checkout yields the bare tag; anything else gets a build
/// timestamp so two local builds are distinguishable.
fn describe() -> String {
    let described = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().trim_start_matches('v').to_string());

    match described {
        Some(tag) if !tag.is_empty() && !tag.ends_with("-dirty") => tag,
        Some(tag) if !tag.is_empty() => format!("{tag}-{}", build_time()),
        _ => format!("{}-dev.{}", env!("CARGO_PKG_VERSION"), build_time()),
    }
}

fn build_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rustc-env=PACKWIZ_UTIL_VERSION={}", describe());
}
