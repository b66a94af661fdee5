//! enhance-prompt - Annotate a request with project context and a compliance score
//!
//! Captures a snapshot of the local project (env-file integrations, critical
//! files, API routes, orchestrator health), scores the request against fixed
//! discretion keyword tables, and renders a strict-compliance directive. The
//! directive is optionally forwarded to a local orchestrator and every result
//! is persisted as a timestamped JSON artifact.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod directive;
pub mod enhancer;
pub mod environment;
pub mod error;
pub mod orchestrator;
pub mod util;
