//! AI feature data models
//!
//! Request and response contracts of the embedding, scoring, email, project and
//! profile processing endpoints

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request payload for generating embeddings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedRequest {
    /// Text inputs to embed
    pub texts: Vec<String>,
    /// Whether to L2-normalize the embeddings
    #[serde(default = "default_true")]
    pub normalize: bool,
}

/// Response payload containing generated embeddings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedResponse {
    /// Embedding vectors matching the order of input texts
    pub embeddings: Vec<Vec<f32>>,
    /// Identifier of the embedding model used
    pub model: String,
}

/// Activity indicators extracted by the scrapers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileActivitySignals {
    pub recent_publications: Option<Vec<String>>,
    pub news_mentions: Option<Vec<String>>,
    pub hiring: Option<bool>,
    /// ISO timestamp of the latest profile update if available
    pub last_updated: Option<String>,
}

/// Researcher profile as received from the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileInput {
    pub profile_id: String,
    pub name: String,
    /// Academic title or role
    pub title: Option<String>,
    pub department: Option<String>,
    /// Free-form summary of the research focus
    pub summary: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub activity_signals: Option<ProfileActivitySignals>,
}

/// Breakdown of the match scoring components, each within `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawScoreBreakdown")]
pub struct ScoreBreakdown {
    semantic: f64,
    compatibility: f64,
    feasibility: f64,
    final_score: f64,
}

#[derive(Deserialize)]
struct RawScoreBreakdown {
    semantic: f64,
    compatibility: f64,
    feasibility: f64,
    final_score: f64,
}

impl TryFrom<RawScoreBreakdown> for ScoreBreakdown {
    type Error = String;

    fn try_from(raw: RawScoreBreakdown) -> Result<Self, Self::Error> {
        Self::new(raw.semantic, raw.compatibility, raw.feasibility, raw.final_score)
    }
}

impl ScoreBreakdown {
    pub fn new(semantic: f64, compatibility: f64, feasibility: f64, final_score: f64) -> Result<Self, String> {
        for (name, value) in [
            ("semantic", semantic),
            ("compatibility", compatibility),
            ("feasibility", feasibility),
            ("final_score", final_score),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be between 0.0 and 1.0, got {}", name, value));
            }
        }

        Ok(Self {
            semantic,
            compatibility,
            feasibility,
            final_score,
        })
    }

    pub fn semantic(&self) -> f64 {
        self.semantic
    }

    pub fn compatibility(&self) -> f64 {
        self.compatibility
    }

    pub fn feasibility(&self) -> f64 {
        self.feasibility
    }

    pub fn final_score(&self) -> f64 {
        self.final_score
    }
}

/// Score output for a single profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    pub profile: ProfileInput,
    pub scores: ScoreBreakdown,
    /// Optional structured rationale explaining the score components
    #[serde(default)]
    pub rationale: HashMap<String, serde_json::Value>,
}

/// Rerank hint for the scoring pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RerankStrategy {
    Semantic,
    #[default]
    Hybrid,
}

/// Request payload for match scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    /// Original user intent text
    pub user_query: String,
    pub profiles: Vec<ProfileInput>,
    #[serde(default)]
    pub rerank_strategy: RerankStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub results: Vec<ScoreResult>,
}

/// Tone of a generated outreach email
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailTone {
    #[default]
    Friendly,
    Formal,
    Enthusiastic,
}

/// Request payload for email generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRequest {
    pub profile: ProfileInput,
    /// Information about the student or sender
    pub user_background: String,
    #[serde(default)]
    pub tone: EmailTone,
}

/// Generated cold outreach email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailResponse {
    pub subject: String,
    pub body: String,
}

/// Expected timeframe of a collaboration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollaborationHorizon {
    Short,
    #[default]
    Medium,
    Long,
}

/// Request payload for project idea generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRequest {
    pub profile: ProfileInput,
    /// Skills the user brings to the collaboration
    pub user_skills: Vec<String>,
    #[serde(default)]
    pub collaboration_horizon: CollaborationHorizon,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectIdea {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub expected_outcomes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectResponse {
    pub ideas: Vec<ProjectIdea>,
}

/// Request payload for profile normalization and enrichment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessProfileRequest {
    pub profile: ProfileInput,
}

/// Profile returned after enrichment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedProfile {
    pub profile: ProfileInput,
    #[serde(default)]
    pub extracted_methods: Vec<String>,
    #[serde(default)]
    pub extracted_topics: Vec<String>,
    pub research_summary: Option<String>,
    /// Communication or collaboration preferences inferred from the profile
    #[serde(default)]
    pub love_languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessProfileResponse {
    pub processed: ProcessedProfile,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_breakdown_bounds() {
        assert!(ScoreBreakdown::new(0.0, 0.5, 1.0, 0.75).is_ok());
        assert!(ScoreBreakdown::new(1.1, 0.5, 0.5, 0.5).is_err());
        assert!(ScoreBreakdown::new(0.5, -0.1, 0.5, 0.5).is_err());
        assert!(ScoreBreakdown::new(0.5, 0.5, 0.5, f64::NAN).is_err());
    }

    #[test]
    fn test_score_breakdown_deserialization_is_checked() {
        let ok = r#"{"semantic":0.9,"compatibility":0.4,"feasibility":0.7,"final_score":0.66}"#;
        let breakdown: ScoreBreakdown = serde_json::from_str(ok).unwrap();
        assert_eq!(breakdown.final_score(), 0.66);

        let bad = r#"{"semantic":0.9,"compatibility":0.4,"feasibility":7.0,"final_score":0.66}"#;
        let err = serde_json::from_str::<ScoreBreakdown>(bad).unwrap_err();
        assert!(err.to_string().contains("feasibility"));
    }

    #[test]
    fn test_request_defaults() {
        let embed: EmbedRequest = serde_json::from_str(r#"{"texts":["a","b"]}"#).unwrap();
        assert!(embed.normalize);

        let score: ScoreRequest = serde_json::from_str(r#"{"user_query":"ml","profiles":[]}"#).unwrap();
        assert_eq!(score.rerank_strategy, RerankStrategy::Hybrid);
    }
}
