// Citation Checks
// Line-based rules for missing reference sections, uncited statistics and uncited quotations

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::{CitationIssue, CitationIssueType};

const PREVIEW_CHARS: usize = 80;

fn references_heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*#*\s*(references|reference list|works cited|bibliography)\s*:?\s*$")
            .expect("references heading regex")
    })
}

fn year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(1[0-9]|20)\d{2}\b").expect("year regex"))
}

fn statistic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\d+(\.\d+)?\s*(%|percent\b|per cent\b)|\b\d+(\.\d+)?\s+(million|billion|thousand)\b")
            .expect("statistic regex")
    })
}

// Bare counts ("300 students", "12,000"). Case-sensitive so headings like
// "Chapter 12 Results" stay out.
fn quantity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b\d{2,}(\.\d+)?\s+[a-z]|\b\d{1,3}(,\d{3})+\b").expect("quantity regex")
    })
}

fn citation_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(\[[0-9]{1,3}(\s*[,\u{2013}-]\s*[0-9]{1,3})*\])|(\([A-Z][A-Za-z\s\.&'-]+,?\s*\d{4}[a-z]?(,\s*pp?\.\s*\d+([-\u{2013}]\d+)?)?\))",
        )
        .expect("citation marker regex")
    })
}

fn quotation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#""[^"\n]{10,}"|\u{201c}[^\u{201d}\n]{10,}\u{201d}"#).expect("quotation regex")
    })
}

fn preview(line: &str) -> String {
    let trimmed = line.trim();
    let mut out: String = trimmed.chars().take(PREVIEW_CHARS).collect();
    if trimmed.chars().count() > PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}

fn has_citation_marker(line: &str) -> bool {
    citation_marker_re().is_match(line)
}

fn is_statistic_line(line: &str) -> bool {
    year_re().is_match(line) || statistic_re().is_match(line) || quantity_re().is_match(line)
}

/// Scan text for citation problems.
///
/// Returns issues in document order with the missing-section issue first, each
/// message at most once. Lines from the references heading onwards are not
/// checked for statistics or quotations.
pub fn detect_citation_issues(text: &str) -> Vec<CitationIssue> {
    let mut issues = Vec::new();
    if text.trim().is_empty() {
        return issues;
    }

    let lines: Vec<&str> = text.lines().collect();
    let heading_at = lines.iter().position(|l| references_heading_re().is_match(l));

    if heading_at.is_none() {
        issues.push(CitationIssue {
            issue_type: CitationIssueType::MissingCitation,
            message: "No references or works cited section found.".to_string(),
            suggestion: Some("Add a References or Works Cited section listing your sources.".to_string()),
        });
    }

    let body = &lines[..heading_at.unwrap_or(lines.len())];
    for line in body.iter().filter(|l| !l.trim().is_empty()) {
        if has_citation_marker(line) {
            continue;
        }
        if is_statistic_line(line) {
            issues.push(CitationIssue {
                issue_type: CitationIssueType::MissingCitation,
                message: format!("Statistic or dated claim without a citation: \"{}\"", preview(line)),
                suggestion: Some("Add an in-text citation such as (Author, 2020) or [1].".to_string()),
            });
        }
        if quotation_re().is_match(line) {
            issues.push(CitationIssue {
                issue_type: CitationIssueType::NeedsQuote,
                message: format!("Quotation without a citation: \"{}\"", preview(line)),
                suggestion: Some("Attribute the quotation with an in-text citation.".to_string()),
            });
        }
    }

    let mut seen = HashSet::new();
    issues.retain(|i| seen.insert(i.message.clone()));
    issues
}
