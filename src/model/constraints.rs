//! Lexicon constraints and word conformance.
//!
//! Constraints are project policy for what counts as a well-formed word.
//! The store never re-validates existing entries when constraints change;
//! `check_word` is what editors call when an entry is displayed or added.

use log::warn;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

use crate::model::lenient;
use crate::model::project::{LexiconEntry, PhonologyConfig};

/// Vowels assumed when the phonology inventory does not list a character.
const FALLBACK_VOWELS: &str = "aeiouàáèéìíòóùú";

/// A (target, optional part-of-speech) pair restricting word edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConstraintRule {
    /// Substring, or `C` / `V` for any consonant / vowel.
    #[serde(deserialize_with = "lenient::or_default")]
    pub target: String,

    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub condition_pos: Option<String>,
}

impl ConstraintRule {
    pub fn new(target: impl Into<String>, condition_pos: Option<String>) -> Self {
        Self {
            target: target.into(),
            condition_pos,
        }
    }

    /// A rule with no condition applies to every part of speech.
    pub fn applies_to(&self, pos: &str) -> bool {
        match &self.condition_pos {
            None => true,
            Some(cond) => cond == pos,
        }
    }
}

/// Which edge list a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleEdge {
    Start,
    End,
}

/// Validation policy for lexicon entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectConstraints {
    pub allow_duplicates: bool,
    pub case_sensitive: bool,
    #[serde(deserialize_with = "lenient::seq")]
    pub banned_sequences: Vec<String>,

    /// Character-class body, matched as `^['<allowed>]+$`.
    pub allowed_graphemes: String,

    /// Regex over the word's C/V pattern.
    pub phonotactic_structure: String,

    #[serde(deserialize_with = "lenient::seq")]
    pub must_start_with: Vec<ConstraintRule>,
    #[serde(deserialize_with = "lenient::seq")]
    pub must_end_with: Vec<ConstraintRule>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_sorting_order: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorting_locale: Option<String>,
}

impl Default for ProjectConstraints {
    fn default() -> Self {
        Self {
            allow_duplicates: true,
            case_sensitive: false,
            banned_sequences: Vec::new(),
            allowed_graphemes: String::new(),
            phonotactic_structure: String::new(),
            must_start_with: Vec::new(),
            must_end_with: Vec::new(),
            custom_sorting_order: None,
            sorting_locale: None,
        }
    }
}

/// A reason a word fails the project constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    BannedSequence(String),
    InvalidCharacters { allowed: String },
    MustStartWith,
    MustEndWith,
    StructureMismatch { pattern: String },
    Duplicate(String),
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::BannedSequence(seq) => write!(f, "contains banned sequence \"{}\"", seq),
            Violation::InvalidCharacters { allowed } => {
                write!(f, "uses characters outside [{}]", allowed)
            }
            Violation::MustStartWith => write!(f, "does not start with a required onset"),
            Violation::MustEndWith => write!(f, "does not end with a required coda"),
            Violation::StructureMismatch { pattern } => {
                write!(f, "structure {} does not match the phonotactics", pattern)
            }
            Violation::Duplicate(word) => write!(f, "duplicate of \"{}\"", word),
        }
    }
}

impl ProjectConstraints {
    fn rules_mut(&mut self, edge: RuleEdge) -> &mut Vec<ConstraintRule> {
        match edge {
            RuleEdge::Start => &mut self.must_start_with,
            RuleEdge::End => &mut self.must_end_with,
        }
    }

    /// Insert an edge rule unless an equal (target, condition) pair exists.
    ///
    /// The target is trimmed and an empty condition means "no condition".
    /// Returns true if the rule was inserted.
    pub fn add_rule(&mut self, edge: RuleEdge, rule: ConstraintRule) -> bool {
        let target = rule.target.trim().to_string();
        if target.is_empty() {
            return false;
        }
        let condition_pos = rule.condition_pos.filter(|c| !c.is_empty());
        let rule = ConstraintRule {
            target,
            condition_pos,
        };

        let rules = self.rules_mut(edge);
        if rules.contains(&rule) {
            return false;
        }
        rules.push(rule);
        true
    }

    /// Remove the rule at `index`; out-of-range indices are ignored.
    pub fn remove_rule(&mut self, edge: RuleEdge, index: usize) -> Option<ConstraintRule> {
        let rules = self.rules_mut(edge);
        (index < rules.len()).then(|| rules.remove(index))
    }

    /// Add a banned sequence unless blank or already present.
    pub fn add_banned_sequence(&mut self, sequence: &str) -> bool {
        let sequence = sequence.trim();
        if sequence.is_empty() || self.banned_sequences.iter().any(|s| s == sequence) {
            return false;
        }
        self.banned_sequences.push(sequence.to_string());
        true
    }

    pub fn remove_banned_sequence(&mut self, sequence: &str) {
        self.banned_sequences.retain(|s| s != sequence);
    }

    fn fold(&self, s: &str) -> String {
        if self.case_sensitive {
            s.to_string()
        } else {
            s.to_lowercase()
        }
    }

    /// Check a word against every constraint except duplication.
    pub fn check_word(&self, word: &str, pos: &str, phonology: &PhonologyConfig) -> Vec<Violation> {
        let mut violations = Vec::new();
        let raw = word.trim();
        if raw.is_empty() {
            return violations;
        }
        let folded = self.fold(raw);

        for seq in &self.banned_sequences {
            if folded.contains(&self.fold(seq)) {
                violations.push(Violation::BannedSequence(seq.clone()));
            }
        }

        if !self.allowed_graphemes.is_empty() {
            let pattern = format!("^['{}]+$", self.allowed_graphemes);
            match RegexBuilder::new(&pattern)
                .case_insensitive(!self.case_sensitive)
                .build()
            {
                Ok(re) if !re.is_match(raw) => violations.push(Violation::InvalidCharacters {
                    allowed: self.allowed_graphemes.clone(),
                }),
                Ok(_) => {}
                Err(e) => warn!("Invalid allowed-graphemes pattern '{}': {}", pattern, e),
            }
        }

        let first = raw.chars().next();
        let last = raw.chars().last();
        if !edge_satisfied(&self.must_start_with, pos, raw, first, phonology, |w, t| w.starts_with(t)) {
            violations.push(Violation::MustStartWith);
        }
        if !edge_satisfied(&self.must_end_with, pos, raw, last, phonology, |w, t| w.ends_with(t)) {
            violations.push(Violation::MustEndWith);
        }

        if !self.phonotactic_structure.is_empty() {
            let pattern = cv_pattern(raw, phonology);
            match RegexBuilder::new(&self.phonotactic_structure).build() {
                Ok(re) if !re.is_match(&pattern) => {
                    violations.push(Violation::StructureMismatch { pattern })
                }
                Ok(_) => {}
                Err(e) => warn!(
                    "Invalid phonotactic structure '{}': {}",
                    self.phonotactic_structure, e
                ),
            }
        }

        violations
    }

    /// Find an existing entry spelled like `word`, skipping `exclude_id`.
    pub fn find_duplicate<'a>(
        &self,
        lexicon: &'a [LexiconEntry],
        word: &str,
        exclude_id: Option<&str>,
    ) -> Option<&'a LexiconEntry> {
        if self.allow_duplicates {
            return None;
        }
        let wanted = self.fold(word.trim());
        if wanted.is_empty() {
            return None;
        }
        lexicon
            .iter()
            .filter(|e| Some(e.id.as_str()) != exclude_id)
            .find(|e| self.fold(&e.word) == wanted)
    }
}

fn edge_satisfied(
    rules: &[ConstraintRule],
    pos: &str,
    word: &str,
    edge_char: Option<char>,
    phonology: &PhonologyConfig,
    matches: fn(&str, &str) -> bool,
) -> bool {
    let mut applicable = rules.iter().filter(|r| r.applies_to(pos)).peekable();
    if applicable.peek().is_none() {
        return true;
    }
    applicable.any(|rule| match rule.target.as_str() {
        "C" => edge_char.is_some_and(|c| segment_class(c, phonology) == 'C'),
        "V" => edge_char.is_some_and(|c| segment_class(c, phonology) == 'V'),
        target => matches(word, target),
    })
}

fn segment_class(c: char, phonology: &PhonologyConfig) -> char {
    let symbol = c.to_string();
    if phonology.is_vowel(&symbol) {
        'V'
    } else if phonology.is_consonant(&symbol) {
        'C'
    } else if c.to_lowercase().any(|l| FALLBACK_VOWELS.contains(l)) {
        'V'
    } else {
        'C'
    }
}

/// Map each character of a word to `C` or `V`.
pub fn cv_pattern(word: &str, phonology: &PhonologyConfig) -> String {
    word.chars().map(|c| segment_class(c, phonology)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::project::Phoneme;

    fn entry(id: &str, word: &str) -> LexiconEntry {
        LexiconEntry {
            id: id.to_string(),
            word: word.to_string(),
            ..LexiconEntry::default()
        }
    }

    #[test]
    fn test_add_rule_deduplicates() {
        let mut c = ProjectConstraints::default();
        assert!(c.add_rule(RuleEdge::Start, ConstraintRule::new("ka", None)));
        assert!(!c.add_rule(RuleEdge::Start, ConstraintRule::new("ka", None)));
        assert_eq!(c.must_start_with.len(), 1);
    }

    #[test]
    fn test_add_rule_distinguishes_condition() {
        let mut c = ProjectConstraints::default();
        assert!(c.add_rule(RuleEdge::End, ConstraintRule::new("a", None)));
        assert!(c.add_rule(RuleEdge::End, ConstraintRule::new("a", Some("Noun".into()))));
        assert!(!c.add_rule(RuleEdge::End, ConstraintRule::new(" a ", Some(String::new()))));
        assert_eq!(c.must_end_with.len(), 2);
    }

    #[test]
    fn test_blank_rule_ignored() {
        let mut c = ProjectConstraints::default();
        assert!(!c.add_rule(RuleEdge::Start, ConstraintRule::new("   ", None)));
        assert!(c.must_start_with.is_empty());
    }

    #[test]
    fn test_remove_rule_out_of_range() {
        let mut c = ProjectConstraints::default();
        c.add_rule(RuleEdge::Start, ConstraintRule::new("ka", None));
        assert!(c.remove_rule(RuleEdge::Start, 3).is_none());
        assert_eq!(c.remove_rule(RuleEdge::Start, 0).unwrap().target, "ka");
    }

    #[test]
    fn test_banned_sequence_case_folding() {
        let mut c = ProjectConstraints::default();
        c.add_banned_sequence("QX");
        let v = c.check_word("aqxa", "Noun", &PhonologyConfig::default());
        assert_eq!(v, vec![Violation::BannedSequence("QX".to_string())]);

        c.case_sensitive = true;
        assert!(c.check_word("aqxa", "Noun", &PhonologyConfig::default()).is_empty());
    }

    #[test]
    fn test_allowed_graphemes() {
        let c = ProjectConstraints {
            allowed_graphemes: "a-z".to_string(),
            ..ProjectConstraints::default()
        };
        let phon = PhonologyConfig::default();
        assert!(c.check_word("Mellon", "Noun", &phon).is_empty());
        assert!(matches!(
            c.check_word("mel1on", "Noun", &phon)[0],
            Violation::InvalidCharacters { .. }
        ));
    }

    #[test]
    fn test_invalid_grapheme_pattern_is_skipped() {
        let c = ProjectConstraints {
            allowed_graphemes: "[".to_string(),
            ..ProjectConstraints::default()
        };
        assert!(c.check_word("abc", "Noun", &PhonologyConfig::default()).is_empty());
    }

    #[test]
    fn test_edge_rules_respect_pos_condition() {
        let mut c = ProjectConstraints::default();
        c.add_rule(RuleEdge::Start, ConstraintRule::new("ka", Some("Verb".into())));
        let phon = PhonologyConfig::default();

        assert!(c.check_word("tama", "Noun", &phon).is_empty());
        assert_eq!(c.check_word("tama", "Verb", &phon), vec![Violation::MustStartWith]);
        assert!(c.check_word("kama", "Verb", &phon).is_empty());
    }

    #[test]
    fn test_edge_rules_with_segment_classes() {
        let mut c = ProjectConstraints::default();
        c.add_rule(RuleEdge::End, ConstraintRule::new("V", None));
        let mut phon = PhonologyConfig::default();
        phon.vowels.push(Phoneme::vowel("y"));

        assert!(c.check_word("tany", "Noun", &phon).is_empty());
        assert!(c.check_word("tana", "Noun", &phon).is_empty());
        assert_eq!(c.check_word("tan", "Noun", &phon), vec![Violation::MustEndWith]);
    }

    #[test]
    fn test_phonotactic_structure() {
        let c = ProjectConstraints {
            phonotactic_structure: "^(CV)+$".to_string(),
            ..ProjectConstraints::default()
        };
        let phon = PhonologyConfig::default();
        assert!(c.check_word("tala", "Noun", &phon).is_empty());
        assert_eq!(
            c.check_word("tral", "Noun", &phon),
            vec![Violation::StructureMismatch {
                pattern: "CCVC".to_string()
            }]
        );
    }

    #[test]
    fn test_find_duplicate() {
        let lexicon = vec![entry("1", "Aran"), entry("2", "galad")];
        let mut c = ProjectConstraints::default();
        assert!(c.find_duplicate(&lexicon, "aran", None).is_none());

        c.allow_duplicates = false;
        assert_eq!(c.find_duplicate(&lexicon, "aran", None).unwrap().id, "1");
        assert!(c.find_duplicate(&lexicon, "aran", Some("1")).is_none());

        c.case_sensitive = true;
        assert!(c.find_duplicate(&lexicon, "aran", None).is_none());
    }
}
