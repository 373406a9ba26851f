//! Core types shared across the protocol

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a chat message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry in a session's conversation log.
/// Append-only: never mutated after creation, cleared only wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: String,
}

/// A user-defined evaluation dimension attached to an analysis request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomFeature {
    pub name: String,
    pub description: String,
}

/// Self-assessed sub-scores submitted with an analysis request.
/// Each is nominally 1-10; missing values default to the midpoint (5)
/// when the composite score is computed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScoreSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research_gap: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub future_potential: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitors: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_strength: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech_novelty: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_demand: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_potential: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<u8>,
}

/// The startup-description form submitted for analysis
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartupForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_market: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitive_advantage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding: Option<String>,
    #[serde(flatten)]
    pub scores: ScoreSet,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_features: Vec<CustomFeature>,
}

impl StartupForm {
    /// Names of required fields that are missing or blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let blank = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).is_none();
        let mut missing = Vec::new();
        if blank(&self.name) {
            missing.push("name");
        }
        if blank(&self.problem) {
            missing.push("problem");
        }
        if blank(&self.solution) {
            missing.push("solution");
        }
        missing
    }
}

/// Result of a startup analysis.
///
/// The LLM is asked for a JSON object embedded in its reply; when that parse
/// succeeds the structured value is returned as-is, otherwise the raw text is
/// kept together with a best-effort score extracted from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisReply {
    Unstructured { text: String, score: u32 },
    Structured(Value),
}

/// A patent record from the search collaborator.
/// Field casing follows the search provider's GraphQL schema so records can
/// be relayed to clients without re-mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatentRecord {
    pub id: String,
    pub title: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(default)]
    pub inventors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,
    #[serde(default)]
    pub similarity_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patent_number: Option<String>,
}

/// A publication record from the search collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationRecord {
    pub id: String,
    pub title: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,
    #[serde(default)]
    pub similarity_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
}

/// Research-gap analysis result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapAnalysis {
    pub related_patents: Vec<PatentRecord>,
    pub related_publications: Vec<PublicationRecord>,
    pub research_gap: u8,
    pub recommendations: Vec<String>,
}

/// Connectivity labels reported by the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConnectivity {
    pub llm: String,
    pub speech: String,
    pub search: String,
    pub websocket: String,
}

/// Fixed-shape health report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    pub timestamp: String,
    pub services: ServiceConnectivity,
}

/// Payload of a successful HTTP text-analysis response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisData {
    pub composite_score: f64,
    pub scores: ScoreSet,
    pub ai_analysis: AnalysisReply,
    pub timestamp: String,
}
