use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

/// `outfit` run from the workspace root, so `./data` is the sample tree.
pub fn outfit_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_outfit"));
    cmd.current_dir(workspace_root());
    cmd.env_remove("OUTFIT_DATA_DIR");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Run outfit, assert exit code, return parsed JSON stdout.
#[allow(dead_code)]
pub fn outfit_json(args: &[&str], expected_exit: i32) -> Value {
    let out = outfit_bin().args(args).output().expect("failed to run outfit");
    let code = out.status.code().unwrap_or(-1);
    assert_eq!(
        code,
        expected_exit,
        "exit mismatch for: outfit {}\nstdout: {}\nstderr: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).unwrap_or_else(|e| {
        panic!(
            "invalid JSON from: outfit {}\n{e}\nstdout: {}",
            args.join(" "),
            String::from_utf8_lossy(&out.stdout)
        )
    })
}

/// Run outfit, return stdout as string (exit 0 expected).
#[allow(dead_code)]
pub fn outfit_stdout(args: &[&str]) -> String {
    let out = outfit_bin().args(args).output().expect("failed to run outfit");
    assert!(
        out.status.success(),
        "outfit {} failed with exit {}\nstderr: {}",
        args.join(" "),
        out.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).to_string()
}

/// Run outfit, return (exit code, stderr).
#[allow(dead_code)]
pub fn outfit_fail(args: &[&str]) -> (i32, String) {
    let out = outfit_bin().args(args).output().expect("failed to run outfit");
    (
        out.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&out.stderr).to_string(),
    )
}
