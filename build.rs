use std::process::Command;

fn command_output(program: &str, args: &[&str]) -> String {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");

    println!(
        "cargo:rustc-env=BUILD_DATE={}",
        chrono::Utc::now().format("%Y-%m-%d")
    );
    println!(
        "cargo:rustc-env=GIT_SHA={}",
        command_output("git", &["rev-parse", "--short", "HEAD"])
    );
    println!(
        "cargo:rustc-env=RUST_VERSION={}",
        command_output("rustc", &["--version"])
    );
}
