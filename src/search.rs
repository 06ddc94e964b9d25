//! Weighted lexicon search.
//!
//! One pass over the entries: a part-of-speech facet filters first, then each
//! enabled field adds to a relevance score. Results are ranked by score, then
//! alphabetically.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::LexiconEntry;

const EXACT_WEIGHT: u32 = 100;
const START_WEIGHT: u32 = 50;
const PARTIAL_WEIGHT: u32 = 20;
const IPA_WEIGHT: u32 = 15;
const DEFINITION_WEIGHT: u32 = 10;
const ETYMOLOGY_WEIGHT: u32 = 5;

/// How an entry matched the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    Exact,
    Start,
    Partial,
    Definition,
    Related,
}

/// Part-of-speech facet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PosFilter {
    #[default]
    All,
    Only(String),
}

impl PosFilter {
    /// `None`, empty and `"ALL"` mean no filter.
    pub fn from_option(pos: Option<&str>) -> Self {
        match pos.map(str::trim) {
            None | Some("") => PosFilter::All,
            Some(p) if p.eq_ignore_ascii_case("all") => PosFilter::All,
            Some(p) => PosFilter::Only(p.to_string()),
        }
    }

    fn accepts(&self, pos: &str) -> bool {
        match self {
            PosFilter::All => true,
            PosFilter::Only(wanted) => wanted == pos,
        }
    }
}

/// Which fields participate in scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchFields {
    pub word: bool,
    pub definition: bool,
    pub etymology: bool,
    pub ipa: bool,
}

impl Default for SearchFields {
    fn default() -> Self {
        Self {
            word: true,
            definition: true,
            etymology: false,
            ipa: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchConfig {
    pub query: String,
    pub pos: PosFilter,
    pub fields: SearchFields,
}

impl SearchConfig {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_pos(mut self, pos: PosFilter) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_fields(mut self, fields: SearchFields) -> Self {
        self.fields = fields;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(flatten)]
    pub entry: LexiconEntry,
    pub relevance_score: u32,
    pub match_type: MatchType,
}

/// Rank `entries` against `config`.
///
/// An empty query with no part-of-speech filter returns nothing. With a
/// filter but no query, every entry of that part of speech matches with
/// score 1.
pub fn search_lexicon(entries: &[LexiconEntry], config: &SearchConfig) -> Vec<SearchResult> {
    let query = config.query.trim().to_lowercase();
    if query.is_empty() && config.pos == PosFilter::All {
        return Vec::new();
    }

    let mut results: Vec<SearchResult> = entries
        .iter()
        .filter(|entry| config.pos.accepts(&entry.pos))
        .filter_map(|entry| {
            if query.is_empty() {
                return Some(SearchResult {
                    entry: entry.clone(),
                    relevance_score: 1,
                    match_type: MatchType::Partial,
                });
            }
            let (score, match_type) = score_entry(entry, &query, config.fields);
            (score > 0).then(|| SearchResult {
                entry: entry.clone(),
                relevance_score: score,
                match_type,
            })
        })
        .collect();

    results.sort_by(|a, b| match b.relevance_score.cmp(&a.relevance_score) {
        Ordering::Equal => a.entry.word.to_lowercase().cmp(&b.entry.word.to_lowercase()),
        other => other,
    });
    results
}

fn score_entry(entry: &LexiconEntry, query: &str, fields: SearchFields) -> (u32, MatchType) {
    let mut score = 0;
    let mut match_type = MatchType::Related;

    if fields.word {
        let word = entry.word.to_lowercase();
        if word == query {
            score += EXACT_WEIGHT;
            match_type = MatchType::Exact;
        } else if word.starts_with(query) {
            score += START_WEIGHT;
            match_type = MatchType::Start;
        } else if word.contains(query) {
            score += PARTIAL_WEIGHT;
            match_type = MatchType::Partial;
        }
    }

    if fields.ipa && entry.ipa.to_lowercase().contains(query) {
        score += IPA_WEIGHT;
    }

    if fields.definition && entry.definition.to_lowercase().contains(query) {
        score += DEFINITION_WEIGHT;
        // Only when the spelling itself did not match.
        if score < PARTIAL_WEIGHT {
            match_type = MatchType::Definition;
        }
    }

    if fields.etymology
        && entry
            .etymology
            .as_deref()
            .is_some_and(|e| e.to_lowercase().contains(query))
    {
        score += ETYMOLOGY_WEIGHT;
    }

    (score, match_type)
}
