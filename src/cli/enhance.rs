use anyhow::Result;
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::enhancer::Enhancer;
use crate::orchestrator::{HttpOrchestrator, OfflineOrchestrator, OrchestratorClient};

pub const EXIT_MISSING_INPUT: i32 = 1;

#[derive(Debug, Serialize)]
pub struct MissingInput {
    pub error: &'static str,
    pub usage: &'static str,
}

impl Default for MissingInput {
    fn default() -> Self {
        Self {
            error: "No prompt provided",
            usage: "enhance-prompt 'your prompt here'",
        }
    }
}

/// Join the positional words, or read all of `stdin` when there are none.
/// Stdin is decoded lossily; invalid UTF-8 becomes U+FFFD.
/// Returns `None` when the trimmed request is empty.
pub fn resolve_request<R: Read>(words: &[String], mut stdin: R) -> io::Result<Option<String>> {
    let raw = if words.is_empty() {
        let mut buf = Vec::new();
        stdin.read_to_end(&mut buf)?;
        String::from_utf8_lossy(&buf).into_owned()
    } else {
        words.join(" ")
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

/// Pretty-print `value` as one JSON document. A closed reader (`| head`)
/// is not an error.
pub fn write_json<W: Write, T: Serialize>(mut out: W, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match writeln!(out, "{}", json).and_then(|_| out.flush()) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other.map_err(Into::into),
    }
}

/// Returns the process exit code.
pub async fn run(
    words: Vec<String>,
    root: String,
    config_path: Option<String>,
    orchestrator_url: Option<String>,
    offline: bool,
    no_forward: bool,
    no_save: bool,
) -> Result<i32> {
    let Some(request) = resolve_request(&words, std::io::stdin())? else {
        write_json(io::stdout().lock(), &MissingInput::default())?;
        return Ok(EXIT_MISSING_INPUT);
    };

    let mut config = Config::load_with_path(config_path)?;

    if let Some(ref url) = orchestrator_url {
        info!("CLI override: orchestrator base_url = {}", url);
        config.orchestrator.base_url = url.clone();
    }
    if no_forward {
        info!("CLI override: forwarding disabled");
        config.orchestrator.forward = false;
    }
    if no_save {
        info!("CLI override: not saving result");
        config.output.save = false;
    }

    let orchestrator: Box<dyn OrchestratorClient> = if offline {
        info!("Offline mode: skipping orchestrator health check");
        Box::new(OfflineOrchestrator::new())
    } else {
        Box::new(HttpOrchestrator::from_config(&config.orchestrator)?)
    };

    let enhancer = Enhancer::new(Path::new(&root), config, orchestrator);
    let outcome = enhancer.execute(&request).await;

    write_json(io::stdout().lock(), &outcome)?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_words_are_joined() {
        let request = resolve_request(&words(&["fix", "the", "build"]), std::io::empty()).unwrap();
        assert_eq!(request.as_deref(), Some("fix the build"));
    }

    #[test]
    fn test_stdin_used_without_words() {
        let request = resolve_request(&[], "  deploy the api\n".as_bytes()).unwrap();
        assert_eq!(request.as_deref(), Some("deploy the api"));
    }

    #[test]
    fn test_words_take_precedence_over_stdin() {
        let request = resolve_request(&words(&["test"]), "ignored".as_bytes()).unwrap();
        assert_eq!(request.as_deref(), Some("test"));
    }

    #[test]
    fn test_blank_input_is_missing() {
        assert!(resolve_request(&[], "".as_bytes()).unwrap().is_none());
        assert!(resolve_request(&[], " \n\t ".as_bytes()).unwrap().is_none());
        assert!(resolve_request(&words(&["  ", ""]), std::io::empty())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_invalid_utf8_stdin_is_decoded() {
        let request = resolve_request(&[], &b"fix the build \xff\xfe"[..]).unwrap();
        let request = request.expect("request should be present");
        assert!(request.starts_with("fix the build "));
        assert!(request.contains('\u{FFFD}'));
    }

    #[test]
    fn test_invalid_utf8_only_is_still_a_request() {
        let request = resolve_request(&[], &b"\xff"[..]).unwrap();
        assert_eq!(request.as_deref(), Some("\u{FFFD}"));
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_json_tolerates_closed_reader() {
        assert!(write_json(ClosedPipe, &MissingInput::default()).is_ok());
    }

    #[test]
    fn test_write_json_reports_other_errors() {
        assert!(write_json(FullDisk, &MissingInput::default()).is_err());
    }

    #[test]
    fn test_write_json_output() {
        let mut out = Vec::new();
        write_json(&mut out, &MissingInput::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("}\n"));
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["error"], "No prompt provided");
    }

    #[test]
    fn test_missing_input_object() {
        let json = serde_json::to_value(MissingInput::default()).unwrap();
        assert_eq!(json["error"], "No prompt provided");
        assert!(json["usage"].as_str().unwrap().contains("enhance-prompt"));
    }
}
