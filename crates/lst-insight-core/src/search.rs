//! Keyword and substring scoring for document retrieval.
//!
//! # Scoring
//!
//! 1. Lower-case the query.
//! 2. Tokenize on whitespace; drop tokens of three characters or fewer;
//!    strip non-alphanumeric characters from the rest (tokens left empty
//!    are dropped).
//! 3. `+10` if the document's `project` metadata (lower-cased) occurs in
//!    the normalized query, `+5` likewise for `chain`.
//! 4. `+1` for every token that is a substring of any document keyword.
//!
//! Ranking is a stable descending sort on score, so equal scores keep
//! insertion order. There is no minimum score: callers should read a score
//! of `0` as "no real match".

use serde::Serialize;

use crate::models::Document;

pub const PROJECT_MATCH_SCORE: u32 = 10;
pub const CHAIN_MATCH_SCORE: u32 = 5;
pub const KEYWORD_MATCH_SCORE: u32 = 1;

/// A ranked document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub document: Document,
    pub score: u32,
}

/// A query normalized once and scored against many documents.
#[derive(Debug, Clone)]
pub struct ParsedQuery {
    pub normalized: String,
    pub tokens: Vec<String>,
}

impl ParsedQuery {
    pub fn parse(query: &str) -> Self {
        let normalized = query.to_lowercase();
        let tokens = normalized
            .split_whitespace()
            .filter(|word| word.chars().count() > 3)
            .map(|word| word.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
            .filter(|word| !word.is_empty())
            .collect();
        Self { normalized, tokens }
    }

    pub fn score(&self, doc: &Document) -> u32 {
        let mut score = 0;

        if let Some(project) = doc.metadata.project.as_deref() {
            if !project.is_empty() && self.normalized.contains(&project.to_lowercase()) {
                score += PROJECT_MATCH_SCORE;
            }
        }

        if let Some(chain) = doc.metadata.chain.as_deref() {
            if !chain.is_empty() && self.normalized.contains(&chain.to_lowercase()) {
                score += CHAIN_MATCH_SCORE;
            }
        }

        for token in &self.tokens {
            if doc.keywords.iter().any(|kw| kw.contains(token.as_str())) {
                score += KEYWORD_MATCH_SCORE;
            }
        }

        score
    }
}

/// Score a single document against a raw query.
pub fn score_document(doc: &Document, query: &str) -> u32 {
    ParsedQuery::parse(query).score(doc)
}

/// Rank `docs` against `query` and return the first `k`.
pub fn rank<'a, I>(docs: I, query: &str, k: usize) -> Vec<SearchHit>
where
    I: IntoIterator<Item = &'a Document>,
{
    let parsed = ParsedQuery::parse(query);
    let mut scored: Vec<(u32, &Document)> = docs
        .into_iter()
        .map(|doc| (parsed.score(doc), doc))
        .collect();
    // `sort_by` is stable: ties keep insertion order.
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
        .into_iter()
        .take(k)
        .map(|(score, doc)| SearchHit {
            document: doc.clone(),
            score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentKind, DocumentMetadata};

    fn doc(id: &str, project: Option<&str>, chain: Option<&str>, keywords: &[&str]) -> Document {
        let mut metadata = DocumentMetadata::of_kind(DocumentKind::Protocol);
        metadata.project = project.map(str::to_string);
        metadata.chain = chain.map(str::to_string);
        Document {
            id: id.to_string(),
            content: String::new(),
            metadata,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn test_tokenization() {
        let q = ParsedQuery::parse("Tell me about LIDO's yields, ok?");
        assert_eq!(q.normalized, "tell me about lido's yields, ok?");
        assert_eq!(q.tokens, vec!["tell", "about", "lidos", "yields"]);
    }

    #[test]
    fn test_punctuation_only_tokens_are_dropped() {
        let q = ParsedQuery::parse("???? !!!!! apy");
        assert!(q.tokens.is_empty());
    }

    #[test]
    fn test_project_substring_scores_ten_plus_keywords() {
        let d = doc(
            "protocol-lido-ethereum",
            Some("lido"),
            Some("ethereum"),
            &["lido", "steth", "ethereum", "yield", "staking"],
        );
        let score = score_document(&d, "tell me about lido yields");
        // +10 project; "lido" matches a keyword; "yields" does not occur in "yield"
        assert_eq!(score, 11);
        assert!(score >= PROJECT_MATCH_SCORE);
    }

    #[test]
    fn test_chain_scores_five() {
        let d = doc("chain-Solana", None, Some("Solana"), &["solana", "chain"]);
        assert_eq!(score_document(&d, "pools on solana"), 5 + 1);
    }

    #[test]
    fn test_no_overlap_scores_zero() {
        let d = doc("x", Some("lido"), Some("ethereum"), &["lido", "ethereum"]);
        assert_eq!(score_document(&d, "asdkjasdk"), 0);
    }

    #[test]
    fn test_rank_is_stable_and_truncates() {
        let docs = vec![
            doc("a", None, None, &["alpha"]),
            doc("b", Some("lido"), None, &[]),
            doc("c", None, None, &["alpha"]),
            doc("d", None, None, &[]),
        ];
        let hits = rank(&docs, "lido alpha", 3);
        let ids: Vec<&str> = hits.iter().map(|h| h.document.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(hits[0].score, 10);
        assert_eq!(hits[1].score, 1);
    }

    #[test]
    fn test_rank_returns_zero_scores_when_nothing_matches() {
        let docs = vec![doc("a", None, None, &[]), doc("b", None, None, &[])];
        let hits = rank(&docs, "nothing here", 5);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.score == 0));
    }
}
