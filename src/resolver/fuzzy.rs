//! Fuzzy recruiter-name matching against known contacts

use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactEntry {
    pub name: String,
    pub email: String,
    normalized: String,
}

/// A recruiter name that matched a known contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameMatch {
    pub name: String,
    pub email: String,
    pub similarity: f64,
}

/// Known recruiter name → email mappings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceTable {
    entries: Vec<ContactEntry>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, email: &str) {
        let normalized = normalize_name(name);
        if normalized.is_empty() {
            return;
        }
        self.entries.push(ContactEntry {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            normalized,
        });
    }

    pub fn extend(&mut self, other: ReferenceTable) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ContactEntry] {
        &self.entries
    }

    /// Closest contact to `name`, regardless of threshold. Earlier rows win ties.
    pub fn best_match(&self, name: &str) -> Option<NameMatch> {
        let query = normalize_name(name);
        if query.is_empty() {
            return None;
        }

        let mut best: Option<(&ContactEntry, f64)> = None;
        for entry in &self.entries {
            let score = similarity(&query, &entry.normalized);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((entry, score));
            }
        }

        best.map(|(entry, similarity)| NameMatch {
            name: entry.name.clone(),
            email: entry.email.clone(),
            similarity,
        })
    }

    /// Closest contact whose similarity reaches `threshold`.
    pub fn lookup(&self, name: &str, threshold: f64) -> Option<NameMatch> {
        self.best_match(name).filter(|m| m.similarity >= threshold)
    }
}

/// Lowercase, trim and collapse inner whitespace.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Edit-distance similarity in `[0, 1]`, 1.0 for identical strings.
pub fn similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ReferenceTable {
        let mut table = ReferenceTable::new();
        table.insert("Jane Doe", "jane.doe@acme.com");
        table.insert("John Smith", "jsmith@globex.com");
        table.insert("Priya Raman", "priya@initech.io");
        table
    }

    #[test]
    fn test_exact_match_ignores_case_and_spacing() {
        let m = table().lookup("  JANE   doe ", 0.6).unwrap();
        assert_eq!(m.email, "jane.doe@acme.com");
        assert_eq!(m.similarity, 1.0);
    }

    #[test]
    fn test_close_spelling_matches() {
        let m = table().lookup("Jon Smith", 0.6).unwrap();
        assert_eq!(m.email, "jsmith@globex.com");
        assert!(m.similarity >= 0.6);
    }

    #[test]
    fn test_below_threshold_is_rejected() {
        let table = table();
        assert!(table.lookup("Zed Quill", 0.6).is_none());

        let best = table.best_match("Zed Quill").unwrap();
        assert!(best.similarity < 0.6);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(table().lookup("   ", 0.6).is_none());
        assert!(ReferenceTable::new().lookup("Jane Doe", 0.6).is_none());

        let mut table = ReferenceTable::new();
        table.insert("  ", "x@y.com");
        assert!(table.is_empty());
    }

    #[test]
    fn test_ties_prefer_earlier_rows() {
        let mut table = ReferenceTable::new();
        table.insert("Jane Doe", "first@acme.com");
        table.insert("jane doe", "second@acme.com");
        assert_eq!(table.lookup("Jane Doe", 0.6).unwrap().email, "first@acme.com");
    }
}
