//! The enhancement pipeline: capture, analyze, build the directive,
//! optionally forward it to the orchestrator, then persist the result.

use anyhow::Result;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::analysis::{self, DiscretionAnalysis};
use crate::config::{Config, ProjectConfig};
use crate::directive::build_directive;
use crate::environment::{self, EnvironmentSnapshot};
use crate::error::EnhanceError;
use crate::orchestrator::{OrchestratorClient, ProcessRequest};

pub const SECURITY_CONSIDERATIONS: &str = "Vercel .env protected, API keys secure";
pub const REAL_DATA_APPROACH: &str = "Using real APIs and verified data sources";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancementResult {
    pub original_request: String,
    pub original_intent_preserved: bool,
    pub discretion_analysis: DiscretionAnalysis,
    pub enhanced_prompt: String,
    pub security_considerations: String,
    pub real_data_approach: String,
    pub api_integrations: Vec<String>,
    pub environment: EnvironmentSnapshot,
    pub compliance_score: u32,
    pub timestamp: String,
    pub orchestrator_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orchestrator_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orchestrator_request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orchestrator_error: Option<String>,
    /// Where this result was persisted, if it was
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_to: Option<String>,
}

/// Minimal result reported when the pipeline itself failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackResult {
    pub error: String,
    pub fallback_prompt: String,
    pub timestamp: String,
}

impl FallbackResult {
    pub fn new(request: &str, error: &anyhow::Error) -> Self {
        Self {
            error: format!("Enhancement failed: {:#}", error),
            fallback_prompt: format!("Execute with strict compliance: {}", request),
            timestamp: Local::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Enhanced(Box<EnhancementResult>),
    Fallback(FallbackResult),
}

impl Outcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Outcome::Fallback(_))
    }
}

/// Analyze `request` and build the directive against an already captured snapshot.
/// No I/O; orchestrator fields are left unset.
pub fn enhance(
    request: &str,
    environment: &EnvironmentSnapshot,
    project: &ProjectConfig,
) -> EnhancementResult {
    let analysis = analysis::analyze_request(request);
    let enhanced_prompt = build_directive(request, &analysis, environment, project);

    EnhancementResult {
        original_request: request.to_string(),
        original_intent_preserved: analysis.intent_preserved(),
        compliance_score: analysis.discretion_score,
        discretion_analysis: analysis,
        enhanced_prompt,
        security_considerations: SECURITY_CONSIDERATIONS.to_string(),
        real_data_approach: REAL_DATA_APPROACH.to_string(),
        api_integrations: environment.integrations.clone(),
        environment: environment.clone(),
        timestamp: Local::now().to_rfc3339(),
        orchestrator_available: false,
        orchestrator_endpoint: None,
        orchestrator_request_id: None,
        orchestrator_error: None,
        saved_to: None,
    }
}

pub struct Enhancer {
    root: PathBuf,
    config: Config,
    orchestrator: Box<dyn OrchestratorClient>,
}

impl Enhancer {
    pub fn new(
        root: impl Into<PathBuf>,
        config: Config,
        orchestrator: Box<dyn OrchestratorClient>,
    ) -> Self {
        Self {
            root: root.into(),
            config,
            orchestrator,
        }
    }

    /// Run the whole pipeline once. Never fails: any error becomes a fallback.
    pub async fn execute(&self, request: &str) -> Outcome {
        match self.try_execute(request).await {
            Ok(result) => Outcome::Enhanced(Box::new(result)),
            Err(e) => {
                warn!("Enhancement failed: {:#}", e);
                Outcome::Fallback(FallbackResult::new(request, &e))
            }
        }
    }

    async fn try_execute(&self, request: &str) -> Result<EnhancementResult> {
        let environment =
            environment::capture(&self.root, &self.config, self.orchestrator.as_ref()).await;

        let mut result = enhance(request, &environment, &self.config.project);
        info!("Compliance score: {}%", result.compliance_score);

        if let Some(endpoint) = &environment.orchestrator_endpoint {
            self.forward(&mut result, endpoint).await;
        }

        if !result.original_intent_preserved {
            warn!(
                "Original intent may have been modified (compliance score {}%)",
                result.compliance_score
            );
        }

        if self.config.output.save {
            let path = self.persist(&mut result)?;
            info!("Saved enhancement to {}", path.display());
        }

        Ok(result)
    }

    async fn forward(&self, result: &mut EnhancementResult, endpoint: &str) {
        result.orchestrator_available = true;
        result.orchestrator_endpoint = Some(endpoint.to_string());

        if !self.config.orchestrator.forward {
            debug!("Forwarding disabled; not submitting directive");
            return;
        }

        let request = ProcessRequest::analyze(
            &result.enhanced_prompt,
            self.config.orchestrator.priority,
            result.compliance_score,
            &result.original_request,
        );

        match self.orchestrator.submit(&request).await {
            Ok(Some(id)) => {
                info!("Orchestrator accepted directive as {}", id);
                result.orchestrator_request_id = Some(id);
            }
            Ok(None) => debug!("Orchestrator response carried no requestId"),
            Err(e) => {
                warn!("Orchestrator submission failed: {:#}", e);
                result.orchestrator_error = Some(format!("{:#}", e));
            }
        }
    }

    fn cache_dir(&self) -> PathBuf {
        // Joining an absolute path replaces the root
        self.root.join(&self.config.output.cache_dir)
    }

    /// Write `result` to a new `enhancement_<timestamp>.json` file.
    /// Existing artifacts are never overwritten; a numeric suffix is added instead.
    /// The result is serialized before the file is claimed, and a failed write
    /// removes the claimed file, so the cache never holds a partial artifact.
    fn persist(&self, result: &mut EnhancementResult) -> Result<PathBuf, EnhanceError> {
        let dir = self.cache_dir();
        fs::create_dir_all(&dir).map_err(|source| EnhanceError::CacheDir {
            path: dir.clone(),
            source,
        })?;

        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let mut attempt = 0u32;
        loop {
            let path = artifact_path(&dir, &stamp, attempt);
            result.saved_to = Some(path.display().to_string());
            let json = match serde_json::to_string_pretty(&*result) {
                Ok(json) => json,
                Err(e) => {
                    result.saved_to = None;
                    return Err(e.into());
                }
            };

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    if let Err(e) = write_claimed(&path, file, &json) {
                        result.saved_to = None;
                        return Err(e);
                    }
                    return Ok(path);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                Err(source) => {
                    result.saved_to = None;
                    return Err(EnhanceError::Persist { path, source });
                }
            }
        }
    }
}

/// Write `json` into a file just created at `path`; remove it if the write fails.
fn write_claimed<W: Write>(path: &Path, mut file: W, json: &str) -> Result<(), EnhanceError> {
    match file.write_all(json.as_bytes()).and_then(|_| file.flush()) {
        Ok(()) => Ok(()),
        Err(source) => {
            drop(file);
            if let Err(e) = fs::remove_file(path) {
                warn!("Failed to remove partial artifact {}: {}", path.display(), e);
            }
            Err(EnhanceError::Persist {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

fn artifact_path(dir: &Path, stamp: &str, attempt: u32) -> PathBuf {
    if attempt == 0 {
        dir.join(format!("enhancement_{}.json", stamp))
    } else {
        dir.join(format!("enhancement_{}_{}.json", stamp, attempt))
    }
}
