use std::fs;
use std::path::Path;
use tracing::debug;

use crate::config::IntegrationMarker;

/// Labels for every marker found in any of the env files under `root`.
///
/// Only marker presence is checked; values never leave this function.
/// Labels keep marker order and appear once even if several files match.
pub fn scan_integrations(
    root: &Path,
    env_files: &[String],
    markers: &[IntegrationMarker],
) -> Vec<String> {
    let contents: Vec<String> = env_files
        .iter()
        .filter_map(|name| {
            let path = root.join(name);
            if !path.is_file() {
                return None;
            }
            match fs::read(&path) {
                Ok(bytes) => {
                    debug!("Scanning {} for integration markers", path.display());
                    Some(String::from_utf8_lossy(&bytes).into_owned())
                }
                Err(e) => {
                    debug!("Skipping unreadable env file {}: {}", path.display(), e);
                    None
                }
            }
        })
        .collect();

    markers
        .iter()
        .filter(|m| contents.iter().any(|c| c.contains(&m.marker)))
        .map(|m| m.label.clone())
        .collect()
}
