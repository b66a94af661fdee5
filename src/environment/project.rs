use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::config::ProjectConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFiles {
    /// Configured critical paths that exist, in configured order
    pub critical_files: Vec<String>,
    /// Route files under the API directory, relative to the project root
    pub api_endpoints: Vec<String>,
}

pub fn scan_project(root: &Path, config: &ProjectConfig) -> ProjectFiles {
    let critical_files = config
        .critical_paths
        .iter()
        .filter(|p| root.join(p).exists())
        .cloned()
        .collect();

    ProjectFiles {
        critical_files,
        api_endpoints: find_api_endpoints(root, &config.api_dir, &config.api_extensions),
    }
}

/// Walk `api_dir` and collect every file with one of `extensions`.
/// Ignore files are not honored; every file under the directory counts.
fn find_api_endpoints(root: &Path, api_dir: &str, extensions: &[String]) -> Vec<String> {
    let dir = root.join(api_dir);
    if !dir.is_dir() {
        return Vec::new();
    }

    let walker = WalkBuilder::new(&dir)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut endpoints = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!("Error walking API directory: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        if !extensions.iter().any(|e| *e == ext) {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        endpoints.push(relative.to_string_lossy().replace('\\', "/"));
    }

    debug!("Found {} API route files under {}", endpoints.len(), dir.display());
    endpoints
}
