// Detection Pipeline
// segment -> extract -> score -> aggregate, plus a concurrent batch runner

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::models::{DocumentResult, SentenceScore};
use crate::services::text_processor::segment;

use super::aggregation::aggregate;
use super::features::{average_sentence_length, extract};
use super::lexicon::Lexicon;
use super::scoring::score;

/// Upper bound on documents analyzed at once by [`analyze_batch`].
pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;

fn default_lexicon() -> &'static Lexicon {
    static LEXICON: OnceLock<Lexicon> = OnceLock::new();
    LEXICON.get_or_init(Lexicon::default)
}

/// Segment `text` and score every sentence.
pub fn score_sentences(text: &str, lexicon: &Lexicon) -> Vec<SentenceScore> {
    let spans = segment(text);
    let avg_len = average_sentence_length(&spans);

    spans
        .into_iter()
        .map(|span| {
            let features = extract(&span.text, avg_len, lexicon);
            let (score, reasons) = score(&features);
            SentenceScore {
                span,
                score,
                reasons,
                raw_subfeatures: features,
            }
        })
        .collect()
}

/// Analyze a document with the built-in word tables.
pub fn analyze_document(text: &str, threshold: f64) -> DocumentResult {
    analyze_document_with(text, threshold, default_lexicon())
}

pub fn analyze_document_with(text: &str, threshold: f64, lexicon: &Lexicon) -> DocumentResult {
    let scores = score_sentences(text, lexicon);
    let result = aggregate(&scores, threshold);
    debug!(
        "[PIPELINE] sentences={} flagged={} overall={:.4} threshold={}",
        result.sentence_count,
        result.flagged_sentences.len(),
        result.overall_score,
        result.threshold
    );
    result
}

/// Analyze several documents concurrently. Results come back in input order.
///
/// Each document runs on the blocking pool; `max_concurrency` bounds how many
/// run at once. A document whose task fails yields the empty-document result.
pub async fn analyze_batch(
    texts: Vec<String>,
    threshold: f64,
    max_concurrency: usize,
) -> Vec<DocumentResult> {
    let started = Instant::now();
    let total = texts.len();
    info!("[PIPELINE] Starting batch analysis for {} documents", total);

    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let mut join_set: JoinSet<(usize, DocumentResult)> = JoinSet::new();

    for (index, text) in texts.into_iter().enumerate() {
        let semaphore = semaphore.clone();
        join_set.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            let result = tokio::task::spawn_blocking(move || analyze_document(&text, threshold))
                .await
                .unwrap_or_else(|e| {
                    warn!("[PIPELINE] Document {} analysis task failed: {}", index, e);
                    aggregate(&[], threshold)
                });
            (index, result)
        });
    }

    let mut slots: Vec<Option<DocumentResult>> = vec![None; total];
    while let Some(res) = join_set.join_next().await {
        match res {
            Ok((index, result)) => slots[index] = Some(result),
            Err(e) => warn!("[PIPELINE] Batch task failed: {}", e),
        }
    }

    let results: Vec<DocumentResult> = slots
        .into_iter()
        .map(|r| r.unwrap_or_else(|| aggregate(&[], threshold)))
        .collect();

    info!(
        "[PIPELINE] Batch analysis done: documents={}, elapsed_ms={}",
        total,
        started.elapsed().as_millis()
    );
    results
}
