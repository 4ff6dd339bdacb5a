use std::process::Command;

fn command_stdout(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout).ok().map(|s| s.trim().to_string())
}

fn main() {
    let date = command_stdout("date", &["+%Y-%m-%d %H:%M:%S"]).unwrap_or_else(|| "unknown-date".to_string());
    let commit = command_stdout("git", &["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "none".to_string());
    println!("cargo:rustc-env=BUILD_DATE={}", date);
    println!("cargo:rustc-env=GIT_COMMIT={}", commit);
    println!("cargo:rerun-if-changed=build.rs");
}
