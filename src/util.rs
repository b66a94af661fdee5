//! Shared utilities for the enhance-prompt codebase

use anyhow::{bail, Context, Result};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::time::Duration;

/// Force-stop a query that overran its budget.
#[cfg(unix)]
fn kill_process(pid: u32) {
    let _ = Command::new("kill")
        .arg("-9")
        .arg(pid.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
}

#[cfg(not(unix))]
fn kill_process(pid: u32) {
    let _ = Command::new("taskkill")
        .args(["/F", "/PID", &pid.to_string()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
}

/// Capture the output of a short external query such as `docker ps`.
///
/// The child gets no stdin, so a runtime that prompts cannot stall the run.
/// It is killed once `timeout` passes.
pub fn run_cmd_with_timeout(mut cmd: Command, timeout: Duration) -> Result<std::process::Output> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to spawn {}", program))?;

    let pid = child.id();
    let (sender, receiver) = mpsc::channel();

    std::thread::spawn(move || {
        let result = child.wait_with_output();
        let _ = sender.send(result);
    });

    match receiver.recv_timeout(timeout) {
        Ok(result) => result.with_context(|| format!("Failed to run {}", program)),
        Err(_) => {
            kill_process(pid);
            bail!("{} timed out after {:?}", program, timeout)
        }
    }
}

/// Case-insensitive substring test against an already lower-cased haystack.
pub fn contains_lower(haystack_lower: &str, needle: &str) -> bool {
    haystack_lower.contains(&needle.to_lowercase())
}
