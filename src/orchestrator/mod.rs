pub mod client;
pub mod client_impl;

pub use client::{OfflineOrchestrator, OrchestratorClient, ProcessContext, ProcessRequest};
pub use client_impl::HttpOrchestrator;
