// Request Boundary
// Validates incoming payloads and wires the detection engine, citation checks
// and calibration profiles into one response.

use chrono::Utc;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{
    AnalyzeResponse, ClassificationResult, FeatureVector, ProfileLabel, ReferenceProfile,
};
use crate::services::detection::{analyze_document, classify, detect_citation_issues};
use crate::services::profile_store::{ProfileStore, StoreError};
use crate::services::text_processor::normalize_punctuation;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request is missing the \"text\" field")]
    MissingText,
    #[error("The \"text\" field must be a string")]
    InvalidTextType,
    #[error("The \"text\" field is empty")]
    EmptyText,
    #[error("Unknown profile label: {0} (expected \"human\" or \"ai\")")]
    InvalidLabel(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    /// True for errors caused by the request itself.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ApiError::Store(_))
    }
}

/// Options applied to every analysis request.
#[derive(Debug, Clone, Copy)]
pub struct AnalyzeOptions {
    pub threshold: f64,
    pub normalize_punctuation: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            threshold: crate::services::detection::aggregation::DEFAULT_THRESHOLD,
            normalize_punctuation: true,
        }
    }
}

/// Pull a non-blank `text` string out of a `{ "text": ... }` payload.
pub fn extract_text_field(payload: &Value) -> Result<&str, ApiError> {
    let text = match payload.get("text") {
        None | Some(Value::Null) => return Err(ApiError::MissingText),
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err(ApiError::InvalidTextType),
    };
    if text.trim().is_empty() {
        return Err(ApiError::EmptyText);
    }
    Ok(text)
}

/// Handle an analyze request payload.
pub fn analyze_request(
    payload: &Value,
    options: AnalyzeOptions,
    profiles: &dyn ProfileStore,
) -> Result<AnalyzeResponse, ApiError> {
    let text = extract_text_field(payload).map_err(|e| {
        warn!("[API] Rejected analyze request: {}", e);
        e
    })?;
    Ok(analyze_text(text, options, profiles))
}

/// Analyze already-validated text.
pub fn analyze_text(text: &str, options: AnalyzeOptions, profiles: &dyn ProfileStore) -> AnalyzeResponse {
    let request_id = uuid::Uuid::new_v4().to_string();
    let text = if options.normalize_punctuation {
        normalize_punctuation(text)
    } else {
        text.to_string()
    };

    let ai = analyze_document(&text, options.threshold);
    let citation_issues = detect_citation_issues(&text);
    let classification = classify_with_store(&ai.features, profiles);

    info!(
        "[API] request_id={} sentences={} overall={:.4} flagged={} citation_issues={} label={:?}",
        request_id,
        ai.sentence_count,
        ai.overall_score,
        ai.flagged_sentences.len(),
        citation_issues.len(),
        classification.label
    );

    AnalyzeResponse {
        request_id,
        version: env!("CARGO_PKG_VERSION").to_string(),
        text,
        ai,
        citation_issues,
        plagiarism: Vec::new(),
        classification,
    }
}

/// Load both reference profiles and classify `features` against them.
pub fn classify_with_store(features: &FeatureVector, profiles: &dyn ProfileStore) -> ClassificationResult {
    let human = profiles.load(ProfileLabel::Human);
    let ai = profiles.load(ProfileLabel::Ai);
    classify(features, human.as_ref(), ai.as_ref())
}

/// Run the pipeline on a calibration sample and store its features under `label`.
pub fn calibrate(
    label: &str,
    text: &str,
    options: AnalyzeOptions,
    profiles: &dyn ProfileStore,
) -> Result<ReferenceProfile, ApiError> {
    let label = ProfileLabel::parse(label).ok_or_else(|| ApiError::InvalidLabel(label.to_string()))?;
    if text.trim().is_empty() {
        return Err(ApiError::EmptyText);
    }
    let text = if options.normalize_punctuation {
        normalize_punctuation(text)
    } else {
        text.to_string()
    };
    let result = analyze_document(&text, options.threshold);
    let profile = profiles.save(label, result.features, Utc::now())?;
    info!(
        "[API] Calibrated {} profile from {} sentences",
        label, result.sentence_count
    );
    Ok(profile)
}

pub fn clear_profiles(profiles: &dyn ProfileStore) -> Result<(), ApiError> {
    profiles.clear()?;
    Ok(())
}
