use signalcheck_lib::models::SentenceSpan;
use signalcheck_lib::services::detection::pipeline::score_sentences;
use signalcheck_lib::services::detection::Lexicon;
use signalcheck_lib::services::text_processor::{normalize_punctuation, segment};
use signalcheck_lib::services::load_document;
use serde::Serialize;

fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn main() -> Result<(), String> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage:\n  cargo run --bin segment_text -- <path> [--sentences <n>] [--scores] [--raw] [--out <json_path>]\n\nNotes:\n  - Offsets are UTF-8 byte positions into the (normalized) text.\n  - `--scores` also prints the per-sentence score and reasons.\n  - `--raw` skips punctuation normalization."
        );
        return Ok(());
    }

    let path = args[1].clone();
    let sentences_n: usize = parse_arg_value(&args, "--sentences")
        .and_then(|s| s.parse().ok())
        .unwrap_or(50);
    let with_scores = has_flag(&args, "--scores");
    let raw = has_flag(&args, "--raw");
    let out_path = parse_arg_value(&args, "--out");

    let extracted = load_document(std::path::Path::new(&path)).map_err(|e| e.to_string())?;
    let text = if raw { extracted } else { normalize_punctuation(&extracted) };

    println!("File: {}", path);
    println!("Extracted: {} chars ({} bytes)", text.chars().count(), text.len());
    println!();

    let spans = segment(&text);
    let scores = if with_scores {
        score_sentences(&text, &Lexicon::default())
    } else {
        Vec::new()
    };

    println!("Sentences: {}", spans.len());
    for (i, s) in spans.iter().take(sentences_n).enumerate() {
        print!(
            "[S{:04}] bytes=[{},{}] chars={}",
            i,
            s.start,
            s.end,
            s.char_len()
        );
        if let Some(sc) = scores.get(i) {
            print!(" score={:.3} reasons={:?}", sc.score, sc.reasons);
        }
        println!("  {}", preview(&s.text, 120));
    }
    if spans.len() > sentences_n {
        println!("... ({} more sentences)", spans.len() - sentences_n);
    }

    if let Some(out_path) = out_path {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Output {
            file: String,
            normalized: bool,
            extracted_chars: usize,
            extracted_bytes: usize,
            sentences: Vec<SentenceSpan>,
        }

        let out = Output {
            file: path.clone(),
            normalized: !raw,
            extracted_chars: text.chars().count(),
            extracted_bytes: text.len(),
            sentences: spans,
        };

        let json = serde_json::to_string_pretty(&out).map_err(|e| e.to_string())?;
        std::fs::write(&out_path, json).map_err(|e| format!("write out failed: {}", e))?;
        println!();
        println!("Wrote JSON: {}", out_path);
    }

    Ok(())
}
