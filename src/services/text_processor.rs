// Text Processing Service
// Punctuation normalization, sentence segmentation and tokenization

use crate::models::SentenceSpan;
use regex::Regex;
use std::sync::OnceLock;

fn space_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\u{3000}\u{00A0}\u{2009}\u{202F}]").expect("space regex"))
}

fn token_split_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\p{L}\p{N}']+").expect("token split regex"))
}

/// Normalize punctuation in text.
///
/// Smart quotes become ASCII quotes, exotic spaces become plain spaces and
/// line endings become `\n`. Sentence boundaries are never moved, so the
/// segmenter sees the same sentences before and after.
pub fn normalize_punctuation(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut s = text
        .replace(['\u{201c}', '\u{201d}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    s = space_re().replace_all(&s, " ").to_string();

    s.replace("\r\n", "\n").replace('\r', "\n")
}

fn is_terminator(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?')
}

fn is_closer(ch: char) -> bool {
    matches!(ch, '"' | '\'' | ')' | ']' | '\u{201d}' | '\u{2019}' | '\u{00bb}')
}

/// A '.' sitting between two digits ("3.5") does not end a sentence.
fn is_decimal_point(chars: &[(usize, char)], i: usize) -> bool {
    chars[i].1 == '.'
        && i > 0
        && i + 1 < chars.len()
        && chars[i - 1].1.is_ascii_digit()
        && chars[i + 1].1.is_ascii_digit()
}

fn push_trimmed(text: &str, start: usize, end: usize, out: &mut Vec<SentenceSpan>) {
    let raw = &text[start..end];
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    let lead = raw.len() - raw.trim_start().len();
    let span_start = start + lead;
    out.push(SentenceSpan {
        text: trimmed.to_string(),
        start: span_start,
        end: span_start + trimmed.len(),
    });
}

/// Split text into sentence spans.
///
/// Splits after each run of `.`, `!` or `?`, keeping the terminators and any
/// closing quotes or brackets that directly follow them on the sentence they close. A trailing fragment with no terminator becomes the last
/// sentence. Spans are trimmed; whitespace-only pieces are dropped. Offsets are
/// UTF-8 byte positions into `text`, so `&text[span.start..span.end] == span.text`.
pub fn segment(text: &str) -> Vec<SentenceSpan> {
    let mut spans = Vec::new();
    if text.is_empty() {
        return spans;
    }

    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut seg_start = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        if is_terminator(chars[i].1) && !is_decimal_point(&chars, i) {
            let mut j = i + 1;
            while j < chars.len() && (is_terminator(chars[j].1) || is_closer(chars[j].1)) {
                j += 1;
            }
            let seg_end = chars.get(j).map(|(b, _)| *b).unwrap_or(text.len());
            push_trimmed(text, seg_start, seg_end, &mut spans);
            seg_start = seg_end;
            i = j;
            continue;
        }
        i += 1;
    }

    if seg_start < text.len() {
        push_trimmed(text, seg_start, text.len(), &mut spans);
    }

    spans
}

/// Lower-case and split on runs of anything that is not a letter, digit or apostrophe.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    token_split_re()
        .split(&lower)
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_punctuation() {
        let input = "He said \u{201c}hi\u{201d}\r\nit\u{2019}s\u{00A0}fine";
        let output = normalize_punctuation(input);
        assert_eq!(output, "He said \"hi\"\nit's fine");
    }

    #[test]
    fn test_segment_keeps_terminators() {
        let spans = segment("First one. Second one! Third one?");
        let texts: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["First one.", "Second one!", "Third one?"]);
    }

    #[test]
    fn test_segment_closing_quote_stays_with_sentence() {
        let text = "He said \"Stop.\" Then he left. (See note.) Done?\u{201d} Yes";
        let spans = segment(text);
        let texts: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["He said \"Stop.\"", "Then he left.", "(See note.)", "Done?\u{201d}", "Yes"]
        );
        for s in &spans {
            assert_eq!(&text[s.start..s.end], s.text);
        }
    }

    #[test]
    fn test_segment_trailing_fragment_is_kept() {
        let spans = segment("Done here. and then some");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].text, "and then some");
    }

    #[test]
    fn test_segment_offsets_point_into_source() {
        let text = "  Alpha beta.   Gamma?!  Delta";
        let spans = segment(text);
        assert_eq!(spans.len(), 3);
        for s in &spans {
            assert_eq!(&text[s.start..s.end], s.text);
            assert!(s.start < s.end);
        }
        assert_eq!(spans[1].text, "Gamma?!");
        assert!(spans.windows(2).all(|w| w[0].end <= w[1].start));
    }

    #[test]
    fn test_segment_drops_whitespace_only() {
        assert!(segment("").is_empty());
        assert!(segment("   \n\t ").is_empty());
        let spans = segment("One.   \n  ");
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn test_segment_decimal_does_not_split() {
        let spans = segment("Growth was 3.5 percent. It slowed.");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Growth was 3.5 percent.");
    }

    #[test]
    fn test_segment_multibyte_offsets() {
        let text = "Café au lait… is good. Naïve idea!";
        let spans = segment(text);
        assert_eq!(spans.len(), 2);
        assert_eq!(&text[spans[1].start..spans[1].end], "Naïve idea!");
    }

    #[test]
    fn test_segment_is_deterministic() {
        let text = "A b c. D e f! G h";
        assert_eq!(segment(text), segment(text));
    }

    #[test]
    fn test_tokenize() {
        let tokens = tokenize("It's a Test -- of THE tokenizer, 2024!");
        assert_eq!(tokens, vec!["it's", "a", "test", "of", "the", "tokenizer", "2024"]);
        assert!(tokenize("...!!").is_empty());
    }
}
