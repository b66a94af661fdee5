// Directive template handed to the downstream assistant

use crate::analysis::DiscretionAnalysis;
use crate::config::ProjectConfig;
use crate::environment::EnvironmentSnapshot;

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return "- None detected".to_string();
    }
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn running(flag: bool) -> &'static str {
    if flag {
        "RUNNING"
    } else {
        "NOT RUNNING"
    }
}

pub fn build_directive(
    request: &str,
    analysis: &DiscretionAnalysis,
    environment: &EnvironmentSnapshot,
    project: &ProjectConfig,
) -> String {
    let exact = &analysis.exact_request;
    let endpoint_line = environment
        .orchestrator_endpoint
        .as_ref()
        .map(|e| format!("- Endpoint: {}", e))
        .unwrap_or_default();

    format!(
        r#"
CRITICAL INSTRUCTION COMPLIANCE DIRECTIVE:
========================================
YOU MUST FOLLOW THE HUMAN'S EXACT INSTRUCTIONS WITHOUT ADDING YOUR OWN DISCRETION.

ORIGINAL HUMAN REQUEST (EXECUTE EXACTLY):
"{request}"

DISCRETION ANALYSIS RESULTS:
- Compliance Score: {score}%
- Exact Actions Required: {verbs}
- Specific Targets: {targets}
- Method to Use: {method}
- Format Required: {format}

PROJECT CONTEXT (USE BUT DON'T CHANGE REQUEST):
================================================
Project: {project_type}
Security: {security}
Deployment: {deployment}

Available APIs (in Vercel .env):
{apis}

Docker Orchestrator Status:
- Orchestrator: {orchestrator}
- Redis: {redis}
- API: {api}
{endpoint_line}

Critical Files Present:
{files}

STRICT COMPLIANCE REQUIREMENTS:
================================
1. DO EXACTLY what the human asked - nothing more, nothing less
2. USE the exact method/approach they specified
3. MAINTAIN the exact format they requested
4. DO NOT add features or improvements unless explicitly asked
5. DO NOT change their approach to a "better" one
6. DO NOT interpret or assume intent beyond explicit instructions

REAL DATA REQUIREMENTS:
=======================
- ALL data must be real and verifiable (no mock/placeholder)
- Use APIs from Vercel .env for data collection
- ElevenLabs for voice narration (API key available)
- Financial data from realistic-financial-projections.ts
- Australian disaster statistics from real sources

SECURITY REQUIREMENTS:
======================
- NEVER expose API keys from .env files
- Use environment variables properly
- Maintain production-grade security
- Follow Vercel deployment best practices

EXECUTION DIRECTIVE:
====================
Execute the human's EXACT request with the project context and requirements above.
If they asked for X in method Y with format Z, deliver EXACTLY that.
No additions, no improvements, no discretion - just exact compliance.
"#,
        request = request,
        score = analysis.discretion_score,
        verbs = exact.action_verbs.join(", "),
        targets = exact.specific_targets.join(", "),
        method = exact.method_specified,
        format = exact.format_requirements,
        project_type = project.project_type,
        security = project.security_level,
        deployment = project.deployment_target,
        apis = bullet_list(&environment.integrations),
        orchestrator = running(environment.orchestrator_running()),
        redis = running(environment.redis_running()),
        api = if environment.api_healthy() {
            "HEALTHY"
        } else {
            "NOT HEALTHY"
        },
        endpoint_line = endpoint_line,
        files = bullet_list(&environment.critical_files),
    )
}
