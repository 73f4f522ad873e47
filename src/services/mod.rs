// SignalCheck Core Services

pub mod text_processor;
pub mod config_store;
pub mod profile_store;
pub mod document_loader;
pub mod detection;

pub use text_processor::*;
pub use config_store::*;
pub use profile_store::*;
pub use document_loader::*;

// Re-export detection module functions
pub use detection::{
    aggregate,
    analyze_batch,
    analyze_document,
    analyze_document_with,
    classify,
    detect_citation_issues,
    euclidean_distance,
    extract,
    score,
    Lexicon,
};
