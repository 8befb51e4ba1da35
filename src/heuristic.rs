//! Local document analysis used when the AI analyzer is unavailable.
//!
//! DESIGN
//! ======
//! Pure text statistics, no network and no allocation beyond the result.
//! The checks are deliberately simple (sentence length, passive-voice hints,
//! doubled words, paragraph length) and feed a 0..=100 score that starts at
//! 100 and loses points per finding. Results carry `AnalysisSource::Heuristic`
//! so the UI can label them as reduced-capability output.

use serde::{Deserialize, Serialize};

/// Sentences longer than this many words are flagged.
pub const LONG_SENTENCE_WORDS: usize = 35;

/// Paragraphs longer than this many words are flagged.
pub const LONG_PARAGRAPH_WORDS: usize = 200;

/// Average sentence length above which readability is penalized.
const DENSE_AVERAGE_WORDS: f64 = 25.0;

const MAX_ISSUES: usize = 50;
const EXCERPT_CHARS: usize = 60;

const BE_VERBS: &[&str] = &["is", "are", "was", "were", "be", "been", "being"];

// =============================================================================
// RESULT TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    Ai,
    Heuristic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    LongSentence,
    PassiveVoice,
    RepeatedWord,
    LongParagraph,
    DenseProse,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisIssue {
    pub kind: IssueKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

/// Analysis result shared by the AI and heuristic paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub score: u8,
    pub summary: String,
    #[serde(default)]
    pub issues: Vec<AnalysisIssue>,
    #[serde(default)]
    pub word_count: usize,
    #[serde(default)]
    pub sentence_count: usize,
    #[serde(default)]
    pub paragraph_count: usize,
    #[serde(default)]
    pub avg_sentence_words: f64,
    #[serde(default = "ai_source")]
    pub source: AnalysisSource,
}

fn ai_source() -> AnalysisSource {
    AnalysisSource::Ai
}

// =============================================================================
// ANALYSIS
// =============================================================================

/// Analyze `content` locally.
#[must_use]
pub fn analyze(content: &str) -> DocumentAnalysis {
    let paragraphs = split_paragraphs(content);
    let sentences = split_sentences(content);
    let word_count = content.split_whitespace().count();

    if word_count == 0 {
        return DocumentAnalysis {
            score: 0,
            summary: "No text to analyze.".to_string(),
            issues: Vec::new(),
            word_count: 0,
            sentence_count: 0,
            paragraph_count: 0,
            avg_sentence_words: 0.0,
            source: AnalysisSource::Heuristic,
        };
    }

    #[allow(clippy::cast_precision_loss)]
    let avg_sentence_words =
        if sentences.is_empty() { word_count as f64 } else { word_count as f64 / sentences.len() as f64 };

    let mut issues = Vec::new();
    let mut penalty: u32 = 0;

    for sentence in &sentences {
        let words = sentence.split_whitespace().count();
        if words > LONG_SENTENCE_WORDS {
            penalty += 5;
            issues.push(AnalysisIssue {
                kind: IssueKind::LongSentence,
                message: format!("Sentence has {words} words; consider splitting it."),
                excerpt: Some(excerpt(sentence)),
            });
        }
        if has_passive_hint(sentence) {
            penalty += 2;
            issues.push(AnalysisIssue {
                kind: IssueKind::PassiveVoice,
                message: "Possible passive voice.".to_string(),
                excerpt: Some(excerpt(sentence)),
            });
        }
    }

    for word in repeated_words(content) {
        penalty += 3;
        issues.push(AnalysisIssue {
            kind: IssueKind::RepeatedWord,
            message: format!("Repeated word \"{word}\"."),
            excerpt: Some(format!("{word} {word}")),
        });
    }

    for paragraph in &paragraphs {
        let words = paragraph.split_whitespace().count();
        if words > LONG_PARAGRAPH_WORDS {
            penalty += 4;
            issues.push(AnalysisIssue {
                kind: IssueKind::LongParagraph,
                message: format!("Paragraph has {words} words; consider breaking it up."),
                excerpt: Some(excerpt(paragraph)),
            });
        }
    }

    if avg_sentence_words > DENSE_AVERAGE_WORDS {
        penalty += 10;
        issues.push(AnalysisIssue {
            kind: IssueKind::DenseProse,
            message: format!("Average sentence length is {avg_sentence_words:.1} words."),
            excerpt: None,
        });
    }

    let found = issues.len();
    issues.truncate(MAX_ISSUES);
    let score = u8::try_from(100u32.saturating_sub(penalty)).unwrap_or(0);

    DocumentAnalysis {
        score,
        summary: format!(
            "{word_count} words in {} sentences across {} paragraphs; {found} potential issues found (offline analysis).",
            sentences.len(),
            paragraphs.len()
        ),
        issues,
        word_count,
        sentence_count: sentences.len(),
        paragraph_count: paragraphs.len(),
        avg_sentence_words,
        source: AnalysisSource::Heuristic,
    }
}

fn split_paragraphs(content: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.trim().is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
            current.clear();
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(line.trim());
        }
    }
    if !current.trim().is_empty() {
        paragraphs.push(current);
    }
    paragraphs
}

fn split_sentences(content: &str) -> Vec<&str> {
    content
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.split_whitespace().next().is_some())
        .collect()
}

fn normalize(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase()
}

fn has_passive_hint(sentence: &str) -> bool {
    let words: Vec<String> = sentence.split_whitespace().map(normalize).collect();
    words
        .windows(2)
        .any(|pair| BE_VERBS.contains(&pair[0].as_str()) && pair[1].len() > 3 && pair[1].ends_with("ed"))
}

fn repeated_words(content: &str) -> Vec<String> {
    let words: Vec<String> = content
        .split_whitespace()
        .map(normalize)
        .filter(|w| !w.is_empty())
        .collect();
    words
        .windows(2)
        .filter(|pair| pair[0] == pair[1] && pair[0].chars().any(char::is_alphabetic))
        .map(|pair| pair[0].clone())
        .collect()
}

fn excerpt(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(EXCERPT_CHARS).collect();
    if chars.next().is_some() { format!("{head}...") } else { head }
}
