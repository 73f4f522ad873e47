// Detection Module
// Stylistic AI-likelihood engine organized into specialized submodules:
// - lexicon: phrase and transition-word tables
// - features: per-sentence sub-features
// - scoring: weighted sentence scores and reasons
// - aggregation: document score, feature vector and flagged sentences
// - calibration: distance classifier against reference profiles
// - citation: rule-based citation hints (independent of the AI signal)
// - pipeline: end-to-end document and batch analysis

pub mod lexicon;
pub mod features;
pub mod scoring;
pub mod aggregation;
pub mod calibration;
pub mod citation;
pub mod pipeline;

// Re-export commonly used functions
pub use lexicon::Lexicon;
pub use features::{average_sentence_length, extract};
pub use scoring::score;
pub use aggregation::{aggregate, sanitize_threshold, DEFAULT_THRESHOLD};
pub use calibration::{classify, euclidean_distance};
pub use citation::detect_citation_issues;
pub use pipeline::{analyze_batch, analyze_document, analyze_document_with, score_sentences};
