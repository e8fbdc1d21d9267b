//! Keyword extraction and overlap scoring for tailoring applications

use crate::error::{QuickApplyError, Result};
use aho_corasick::AhoCorasick;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use unicode_segmentation::UnicodeSegmentation;

pub struct TextProcessor {
    stop_words: HashSet<&'static str>,
    word_regex: Regex,
    phrase_regex: Regex,
}

/// Job-description keywords split by whether the résumé mentions them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordCoverage {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProcessor {
    pub fn new() -> Self {
        let word_regex = Regex::new(r"\b[a-z]{4,}\b").expect("Invalid word regex");
        let phrase_regex = Regex::new(r"[A-Z][a-zA-Z0-9 \-]{4,50}").expect("Invalid phrase regex");

        Self {
            stop_words: Self::create_stop_words(),
            word_regex,
            phrase_regex,
        }
    }

    /// Lowercased words of four or more letters, in order.
    pub fn words(&self, text: &str) -> Vec<String> {
        let lowered = normalize_unicode(text).to_lowercase();
        self.word_regex
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Like [`words`](Self::words) but without stop words.
    pub fn significant_words(&self, text: &str) -> Vec<String> {
        self.words(text)
            .into_iter()
            .filter(|w| !self.stop_words.contains(w.as_str()))
            .collect()
    }

    /// Most frequent significant words; ties keep first-appearance order.
    pub fn top_keywords(&self, text: &str, max_keywords: usize) -> Vec<String> {
        let words = self.significant_words(text);

        let mut freq: HashMap<&str, (usize, usize)> = HashMap::new();
        for (position, word) in words.iter().enumerate() {
            freq.entry(word.as_str()).or_insert((0, position)).0 += 1;
        }

        let mut ranked: Vec<(&str, usize, usize)> = freq
            .into_iter()
            .map(|(word, (count, first))| (word, count, first))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        ranked
            .into_iter()
            .take(max_keywords)
            .map(|(word, _, _)| word.to_string())
            .collect()
    }

    /// Capitalized phrases used as bullet points in the template email.
    pub fn key_phrases(&self, text: &str, max_phrases: usize) -> Vec<String> {
        self.phrase_regex
            .find_iter(text)
            .map(|m| m.as_str().trim().to_string())
            .filter(|p| !p.is_empty())
            .take(max_phrases)
            .collect()
    }

    /// Percentage of distinct job-description words that the résumé also uses.
    pub fn ats_score(&self, job_description: &str, resume_text: &str) -> u8 {
        let job_words: HashSet<String> = self.words(job_description).into_iter().collect();
        if job_words.is_empty() {
            return 0;
        }

        let resume_words: HashSet<String> = self.words(resume_text).into_iter().collect();
        let overlap = job_words.intersection(&resume_words).count();

        ((100 * overlap) / job_words.len()) as u8
    }

    /// Which `keywords` occur anywhere in `text`, case-insensitively.
    pub fn keyword_coverage(&self, keywords: &[String], text: &str) -> Result<KeywordCoverage> {
        if keywords.is_empty() {
            return Ok(KeywordCoverage::default());
        }

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(keywords)
            .map_err(|e| QuickApplyError::InvalidInput(format!("Failed to build keyword matcher: {}", e)))?;

        let found: HashSet<usize> = matcher
            .find_overlapping_iter(text)
            .map(|m| m.pattern().as_usize())
            .collect();

        let (matched, missing): (Vec<_>, Vec<_>) = keywords
            .iter()
            .enumerate()
            .partition(|(idx, _)| found.contains(idx));

        Ok(KeywordCoverage {
            matched: matched.into_iter().map(|(_, k)| k.clone()).collect(),
            missing: missing.into_iter().map(|(_, k)| k.clone()).collect(),
        })
    }

    /// At most `max_chars` characters of `text`, never splitting a grapheme.
    pub fn truncate(&self, text: &str, max_chars: usize) -> String {
        let mut out = String::new();
        let mut count = 0;
        for grapheme in text.graphemes(true) {
            let len = grapheme.chars().count();
            if count + len > max_chars {
                break;
            }
            out.push_str(grapheme);
            count += len;
        }
        out
    }

    fn create_stop_words() -> HashSet<&'static str> {
        [
            "about", "above", "after", "again", "also", "been", "before", "being", "both", "could",
            "does", "doing", "down", "each", "from", "further", "have", "having", "here", "into",
            "just", "more", "most", "must", "only", "other", "ought", "over", "same", "shall",
            "should", "some", "such", "than", "that", "their", "them", "then", "there", "these",
            "they", "this", "those", "through", "under", "until", "very", "were", "what", "when",
            "where", "which", "while", "will", "with", "within", "would", "your", "yours", "able",
            "role", "team", "work", "working", "including", "etc",
        ]
        .into_iter()
        .collect()
    }
}

/// Map typographic punctuation to ASCII.
pub fn normalize_unicode(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2026}' => '.',
            _ => c,
        })
        .collect()
}
