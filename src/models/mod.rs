// SignalCheck Data Models
// Shared by the detection engine, the profile store and the request boundary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============ Segmentation ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceSpan {
    pub text: String,
    /// UTF-8 byte offset (0-based) into the analyzed text.
    pub start: usize,
    /// UTF-8 byte offset (0-based, end-exclusive) into the analyzed text.
    pub end: usize,
}

impl SentenceSpan {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

// ============ Features ============

/// Per-sentence sub-features. Every field lies in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceFeatures {
    pub rep: f64,
    pub vocab_diversity: f64,
    pub generic_flag: f64,
    pub transition_density: f64,
    pub length_uniformity: f64,
}

/// Document-level stylistic summary, the sentence means of [`SentenceFeatures`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureVector {
    pub avg_repetition: f64,
    pub avg_vocab_diversity: f64,
    pub generic_rate: f64,
    pub transition_rate: f64,
    pub uniformity: f64,
}

impl FeatureVector {
    pub fn components(&self) -> [f64; 5] {
        [
            self.avg_repetition,
            self.avg_vocab_diversity,
            self.generic_rate,
            self.transition_rate,
            self.uniformity,
        ]
    }
}

// ============ Scoring ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceScore {
    pub span: SentenceSpan,
    pub score: f64,
    pub reasons: Vec<String>,
    pub raw_subfeatures: SentenceFeatures,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResult {
    pub overall_score: f64,
    pub threshold: f64,
    pub avg_sentence_length: f64,
    pub sentence_count: usize,
    pub features: FeatureVector,
    pub flagged_sentences: Vec<SentenceScore>,
}

// ============ Calibration ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileLabel {
    Human,
    Ai,
}

impl ProfileLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileLabel::Human => "human",
            ProfileLabel::Ai => "ai",
        }
    }

    pub fn parse(val: &str) -> Option<Self> {
        match val.trim().to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "ai" => Some(Self::Ai),
            _ => None,
        }
    }
}

impl fmt::Display for ProfileLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceProfile {
    pub label: ProfileLabel,
    pub features: FeatureVector,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationLabel {
    Human,
    Ai,
    Uncertain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub label: ClassificationLabel,
    pub confidence: f64,
    pub distance_to_human: Option<f64>,
    #[serde(rename = "distanceToAI")]
    pub distance_to_ai: Option<f64>,
    pub note: String,
}

// ============ Citation Issues ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationIssueType {
    MissingCitation,
    NeedsQuote,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationIssue {
    #[serde(rename = "type")]
    pub issue_type: CitationIssueType,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

// ============ Request Boundary ============

/// Placeholder for source-matching results. Always empty until an external
/// matching service is wired in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlagiarismMatch {
    pub source: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub request_id: String,
    pub version: String,
    /// The text the offsets in `ai` refer to (after optional normalization).
    pub text: String,
    pub ai: DocumentResult,
    pub citation_issues: Vec<CitationIssue>,
    pub plagiarism: Vec<PlagiarismMatch>,
    pub classification: ClassificationResult,
}
