//! Discretion analysis: fixed keyword tables matched against the request text.
//!
//! Every rule lives in a `const` table below so the scoring stays auditable.
//! Matching is case-insensitive substring containment, nothing more.

use serde::{Deserialize, Serialize};

use crate::util::contains_lower;

/// Points removed from the score for each check that matched an indicator.
pub const PENALTY: u32 = 25;

pub const PERFECT_SCORE: u32 = 100;

/// Results scoring below this are reported as possibly drifting from the request.
pub const PRESERVED_THRESHOLD: u32 = 75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    TaskScope,
    MethodCompliance,
    FormatAdherence,
    UnauthorizedAdditions,
}

pub struct DiscretionRule {
    pub kind: CheckKind,
    pub question: &'static str,
    pub indicators: &'static [&'static str],
}

pub const DISCRETION_RULES: &[DiscretionRule] = &[
    DiscretionRule {
        kind: CheckKind::TaskScope,
        question: "Is the LLM trying to do more than requested?",
        indicators: &["also", "additionally", "furthermore", "let me also"],
    },
    DiscretionRule {
        kind: CheckKind::MethodCompliance,
        question: "Is the specific method/approach being followed?",
        indicators: &["instead", "better way", "alternatively", "different approach"],
    },
    DiscretionRule {
        kind: CheckKind::FormatAdherence,
        question: "Is the output in the exact format requested?",
        indicators: &["modified", "enhanced version", "improved format"],
    },
    DiscretionRule {
        kind: CheckKind::UnauthorizedAdditions,
        question: "Are there unauthorized additions to the task?",
        indicators: &["added", "included extra", "bonus", "also created"],
    },
];

pub const ACTION_VERBS: &[&str] = &[
    "create",
    "fix",
    "update",
    "implement",
    "setup",
    "configure",
    "analyze",
    "generate",
    "build",
    "deploy",
    "test",
    "run",
];

pub const TARGET_KEYWORDS: &[&str] = &[
    "pitch deck",
    "audio",
    "narration",
    "orchestrator",
    "docker",
    "api",
    "real data",
    "investor",
    "presentation",
    "agents",
];

/// (keyword, declared format), first match wins.
pub const FORMAT_RULES: &[(&str, &str)] = &[
    ("json", "JSON"),
    ("yaml", "YAML"),
    ("python", "Python"),
    ("typescript", "TypeScript"),
];

pub const FORMAT_NOT_SPECIFIED: &str = "Not specified";

/// (keyword, declared method), first match wins.
pub const METHOD_RULES: &[(&str, &str)] = &[
    ("docker", "Docker-based implementation"),
    ("api", "API integration"),
    ("orchestrator", "Orchestrator-driven"),
];

pub const DEFAULT_METHOD: &str = "Standard implementation";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactRequest {
    pub raw_request: String,
    pub action_verbs: Vec<String>,
    pub specific_targets: Vec<String>,
    pub format_requirements: String,
    pub method_specified: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assumption {
    #[serde(rename = "type")]
    pub kind: CheckKind,
    pub concern: String,
    pub detected: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceCheck {
    pub check: CheckKind,
    pub passed: bool,
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscretionAnalysis {
    pub exact_request: ExactRequest,
    pub identified_assumptions: Vec<Assumption>,
    pub compliance_checks: Vec<ComplianceCheck>,
    pub discretion_score: u32,
}

impl DiscretionAnalysis {
    pub fn failed_checks(&self) -> impl Iterator<Item = &ComplianceCheck> {
        self.compliance_checks.iter().filter(|c| !c.passed)
    }

    pub fn intent_preserved(&self) -> bool {
        self.discretion_score >= PRESERVED_THRESHOLD
    }
}

/// Score a request against the discretion tables.
///
/// Each check that matches at least one indicator fails once and costs
/// [`PENALTY`]; every matched indicator is still listed as an assumption.
/// The score saturates at zero.
pub fn analyze_request(request: &str) -> DiscretionAnalysis {
    let lower = request.to_lowercase();
    let mut identified_assumptions = Vec::new();
    let mut compliance_checks = Vec::with_capacity(DISCRETION_RULES.len());
    let mut score = PERFECT_SCORE;

    for rule in DISCRETION_RULES {
        let mut passed = true;
        for indicator in rule.indicators {
            if contains_lower(&lower, indicator) {
                passed = false;
                identified_assumptions.push(Assumption {
                    kind: rule.kind,
                    concern: rule.question.to_string(),
                    detected: indicator.to_string(),
                });
            }
        }
        if !passed {
            score = score.saturating_sub(PENALTY);
        }
        compliance_checks.push(ComplianceCheck {
            check: rule.kind,
            passed,
            question: rule.question.to_string(),
        });
    }

    DiscretionAnalysis {
        exact_request: ExactRequest {
            raw_request: request.to_string(),
            action_verbs: matching_keywords(&lower, ACTION_VERBS),
            specific_targets: matching_keywords(&lower, TARGET_KEYWORDS),
            format_requirements: first_match(&lower, FORMAT_RULES, FORMAT_NOT_SPECIFIED),
            method_specified: first_match(&lower, METHOD_RULES, DEFAULT_METHOD),
        },
        identified_assumptions,
        compliance_checks,
        discretion_score: score,
    }
}

fn matching_keywords(lower: &str, table: &[&str]) -> Vec<String> {
    table
        .iter()
        .filter(|kw| contains_lower(lower, kw))
        .map(|kw| kw.to_string())
        .collect()
}

fn first_match(lower: &str, table: &[(&str, &str)], default: &str) -> String {
    table
        .iter()
        .find(|(kw, _)| contains_lower(lower, kw))
        .map(|(_, value)| *value)
        .unwrap_or(default)
        .to_string()
}
