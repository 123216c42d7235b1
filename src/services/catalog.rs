//! Endpoint catalog
//!
//! Lookup of candidate operations for a query. Ranking is opaque to the rest of
//! the pipeline; only the order of the returned candidates matters.

use crate::config::CatalogFile;
use crate::models::catalog::EndpointCandidate;
use crate::services::resolver::{looks_like_id, tokenize, ACTION_VOCABULARY};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use tracing::debug;

/// Source of candidate operations for a natural-language query
#[async_trait]
pub trait EndpointCatalog: Send + Sync {
    /// Candidates ordered best first
    async fn lookup(&self, query: &str) -> Result<Vec<EndpointCandidate>>;

    /// Number of operations known to the catalog
    fn endpoint_count(&self) -> usize;
}

/// In-memory catalog loaded from the catalog file
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    endpoints: Vec<EndpointCandidate>,
}

impl StaticCatalog {
    pub fn new(endpoints: Vec<EndpointCandidate>) -> Self {
        Self { endpoints }
    }

    pub fn from_file(file: CatalogFile) -> Self {
        Self::new(file.endpoints)
    }

    /// Relevance of one candidate; 0 means unrelated
    fn score(&self, candidate: &EndpointCandidate, query_words: &HashSet<String>, wants_id: bool) -> u32 {
        let mut text = candidate.path_template.clone();
        if let Some(summary) = &candidate.summary {
            text.push(' ');
            text.push_str(summary);
        }
        let candidate_words: HashSet<String> = tokenize(&text).iter().map(|w| singularize(w)).collect();

        let overlap = query_words
            .iter()
            .filter(|word| word.chars().count() > 2 && candidate_words.contains(*word))
            .count() as u32;

        if overlap == 0 {
            return 0;
        }

        let method_bonus = ACTION_VOCABULARY
            .iter()
            .filter(|rule| rule.keywords.iter().any(|k| query_words.contains(*k)))
            .any(|rule| rule.action.accepts_method(candidate.method));

        let mut score = overlap;
        if method_bonus {
            score += 2;
        }
        if wants_id == !candidate.path_params().is_empty() {
            score += 1;
        }
        score
    }
}

#[async_trait]
impl EndpointCatalog for StaticCatalog {
    async fn lookup(&self, query: &str) -> Result<Vec<EndpointCandidate>> {
        let query_words: HashSet<String> = tokenize(query).iter().map(|w| singularize(w)).collect();
        let wants_id = query.split_whitespace().any(looks_like_id);

        let mut scored: Vec<(u32, &EndpointCandidate)> = self
            .endpoints
            .iter()
            .map(|candidate| (self.score(candidate, &query_words, wants_id), candidate))
            .filter(|(score, _)| *score > 0)
            .collect();

        // Stable sort keeps catalog order among equal scores
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        debug!("Catalog lookup matched {} of {} endpoints", scored.len(), self.endpoints.len());

        Ok(scored.into_iter().map(|(_, candidate)| candidate.clone()).collect())
    }

    fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }
}

/// Crude English singular: categories -> category, products -> product
fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        format!("{}y", stem)
    } else if word.chars().count() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}
