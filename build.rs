use std::process::Command;

fn main() {
    // Base version from Cargo
    let base = env!("CARGO_PKG_VERSION");

    // Determine if this is a nightly build via env flag
    let is_nightly = std::env::var("ENERGYMUFFIN_NIGHTLY")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let version = if is_nightly {
        match git_short_sha() {
            Some(s) => format!("{}-nightly+{}", base, s),
            None => format!("{}-nightly", base),
        }
    } else {
        base.to_string()
    };

    println!("cargo:rustc-env=APP_VERSION={}", version);

    println!("cargo:rerun-if-env-changed=ENERGYMUFFIN_NIGHTLY");
    println!("cargo:rerun-if-env-changed=GIT_SHA");
    println!("cargo:rerun-if-changed=.git/HEAD");
}

fn git_short_sha() -> Option<String> {
    if let Ok(output) = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        && output.status.success()
    {
        let s = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !s.is_empty() {
            return Some(s);
        }
    }
    // CI builds without a checkout pass the sha explicitly
    std::env::var("GIT_SHA").ok().filter(|s| !s.is_empty())
}
