//! Scoring and parsing policies.
//!
//! Pure functions: the composite weighted score, the research-gap heuristic,
//! and best-effort recovery of structured output from free-text LLM replies.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use venturescope_protocol::{AnalysisReply, PatentRecord, PublicationRecord, ScoreSet};

/// Midpoint used for any sub-score the caller did not supply
const DEFAULT_SUB_SCORE: f64 = 5.0;
/// Score reported when free-text extraction finds no pattern at all
const DEFAULT_EXTRACTED_SCORE: u32 = 75;

/// Weighted composite over the 8 named sub-scores. Weights sum to 1.0;
/// competition is inverted (`11 - raw`) so lower competition contributes
/// more. Missing sub-scores default to the midpoint. Rounded to 2 decimals.
pub fn composite_score(scores: &ScoreSet) -> f64 {
    let value = |v: Option<u8>| v.map_or(DEFAULT_SUB_SCORE, f64::from);

    let weighted = value(scores.research_gap) * 0.12
        + value(scores.future_potential) * 0.16
        + (11.0 - value(scores.competitors)) * 0.10
        + value(scores.team_strength) * 0.16
        + value(scores.tech_novelty) * 0.16
        + value(scores.market_demand) * 0.12
        + value(scores.market_potential) * 0.10
        + value(scores.revenue) * 0.08;

    (weighted * 100.0).round() / 100.0
}

fn keyword_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn overlap_ratio(description_keywords: &HashSet<String>, title: &str, abstract_text: &str) -> f64 {
    if description_keywords.is_empty() {
        return 0.0;
    }
    let document = keyword_set(&format!("{title} {abstract_text}"));
    let shared = description_keywords
        .iter()
        .filter(|word| document.contains(*word))
        .count();
    shared as f64 / description_keywords.len() as f64
}

/// Heuristic research-gap score: start from a ceiling of 10 and subtract a
/// penalty per related document proportional to its keyword overlap with the
/// description (patents up to 3 points, publications up to 2). Clamped to
/// [1, 10]; exactly 10 when nothing related exists.
pub fn research_gap_score(
    description: &str,
    patents: &[PatentRecord],
    publications: &[PublicationRecord],
) -> u8 {
    let keywords = keyword_set(description);
    let mut gap = 10.0_f64;

    for patent in patents {
        gap -= overlap_ratio(&keywords, &patent.title, &patent.abstract_text) * 3.0;
    }
    for publication in publications {
        gap -= overlap_ratio(&keywords, &publication.title, &publication.abstract_text) * 2.0;
    }

    gap.round().clamp(1.0, 10.0) as u8
}

/// Recommendations derived from what the gap search found
pub fn gap_recommendations(
    patents: &[PatentRecord],
    publications: &[PublicationRecord],
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if !patents.is_empty() {
        recommendations
            .push("Consider patent landscape analysis to identify freedom to operate".to_string());
        recommendations.push("Evaluate potential patent infringement risks".to_string());
    }
    if !publications.is_empty() {
        recommendations
            .push("Review recent academic publications for state-of-the-art".to_string());
        recommendations
            .push("Consider collaboration opportunities with research institutions".to_string());
    }
    if patents.is_empty() && publications.is_empty() {
        recommendations.push("Limited existing research - high innovation potential".to_string());
        recommendations
            .push("Consider early patent filing to protect intellectual property".to_string());
    }

    recommendations
}

fn score_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(\d+)\s*/\s*100|score[:\s]*(\d+)").expect("valid score pattern")
    })
}

/// Best-effort numeric score from free text: "82/100" or "score: 82",
/// falling back to 75 when neither appears.
pub fn extract_score(text: &str) -> u32 {
    score_pattern()
        .captures(text)
        .and_then(|captures| captures.get(1).or_else(|| captures.get(2)))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(DEFAULT_EXTRACTED_SCORE)
}

/// Recover a structured analysis from an LLM reply: parse the first `{` to
/// the last `}` as JSON, falling back to the raw text with an extracted
/// score. Never fails.
pub fn parse_analysis_reply(text: &str) -> AnalysisReply {
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str(&text[start..=end]) {
                return AnalysisReply::Structured(value);
            }
        }
    }

    AnalysisReply::Unstructured {
        text: text.to_string(),
        score: extract_score(text),
    }
}
