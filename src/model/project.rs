//! Project Document Schema
//!
//! The project document is the unit of persistence and exchange: the same
//! JSON shape is written to durable storage, exported to files, imported from
//! files and bundled as the starter seed.
//!
//! Reading is tolerant. Every top-level field is decoded on its own, list
//! fields element by element and nested records key by key; a missing,
//! `null` or ill-typed value falls back to its default and the rest of the
//! document still loads.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{Result, StudioError};
use crate::model::constraints::ProjectConstraints;
use crate::model::lenient::{self, json_kind, take_field, take_overlay, take_seq};
use crate::model::script::ScriptConfig;

/// Format version stamped on every snapshot.
pub const DOCUMENT_VERSION: &str = "1.1";

/// Name given to projects that carry none.
pub const DEFAULT_PROJECT_NAME: &str = "Untitled";

/// Author given to projects that carry none.
pub const DEFAULT_AUTHOR: &str = "Unknown";

/// Characters replaced by '-' in export file names.
const UNSAFE_FILE_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Name of the phonology record created for fresh projects.
pub const DEFAULT_PHONOLOGY_NAME: &str = "Default Phonology";

/// The full serializable state of one conlang project.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    /// Format version tag; inspected by migrations only.
    pub version: String,

    pub name: String,
    pub author: String,
    pub description: String,

    /// Dictionary entries in display order.
    pub lexicon: Vec<LexiconEntry>,

    /// Free-form grammar notes.
    pub grammar: String,

    pub morphology: MorphologyState,
    pub phonology: PhonologyConfig,

    /// Sound changes, applied in sequence order.
    pub evolution_rules: Vec<SoundChangeRule>,

    pub constraints: ProjectConstraints,
    pub script_config: ScriptConfig,
    pub notebook: String,

    /// Milliseconds since the Unix epoch.
    pub last_modified: i64,

    /// Top-level keys this version does not know, kept for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for ProjectDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            name: DEFAULT_PROJECT_NAME.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            description: String::new(),
            lexicon: Vec::new(),
            grammar: String::new(),
            morphology: MorphologyState::default(),
            phonology: PhonologyConfig::default(),
            evolution_rules: Vec::new(),
            constraints: ProjectConstraints::default(),
            script_config: ScriptConfig::default(),
            notebook: String::new(),
            last_modified: 0,
            extra: BTreeMap::new(),
        }
    }
}

/// Name, author and description for a fresh project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectSeed {
    pub name: String,
    pub author: String,
    pub description: String,

    /// Constraint overrides chosen in the project wizard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<ProjectConstraints>,
}

/// A single dictionary entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LexiconEntry {
    #[serde(deserialize_with = "lenient::or_default")]
    pub id: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub word: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub ipa: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub pos: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub definition: String,

    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub etymology: Option<String>,

    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub derived_from: Option<String>,

    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub notes: Option<String>,
}

/// Whether a phoneme is a consonant or a vowel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhonemeKind {
    #[default]
    Consonant,
    Vowel,
}

/// One segment of the phoneme inventory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Phoneme {
    #[serde(deserialize_with = "lenient::or_default")]
    pub symbol: String,

    #[serde(rename = "type", deserialize_with = "lenient::or_default")]
    pub kind: PhonemeKind,

    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub manner: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub place: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub voiced: Option<bool>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub height: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub backness: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub rounded: Option<bool>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub description: Option<String>,
}

impl Phoneme {
    pub fn consonant(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            kind: PhonemeKind::Consonant,
            ..Self::default()
        }
    }

    pub fn vowel(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            kind: PhonemeKind::Vowel,
            ..Self::default()
        }
    }
}

/// Consonant and vowel inventories plus syllable-level restrictions.
///
/// Decoded key by key over the defaults (see [`lenient::overlay`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhonologyConfig {
    pub name: String,
    pub description: String,
    #[serde(deserialize_with = "lenient::seq")]
    pub consonants: Vec<Phoneme>,
    #[serde(deserialize_with = "lenient::seq")]
    pub vowels: Vec<Phoneme>,
    pub syllable_structure: String,
    #[serde(deserialize_with = "lenient::seq")]
    pub banned_combinations: Vec<String>,
}

impl Default for PhonologyConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_PHONOLOGY_NAME.to_string(),
            description: String::new(),
            consonants: Vec::new(),
            vowels: Vec::new(),
            syllable_structure: String::new(),
            banned_combinations: Vec::new(),
        }
    }
}

impl PhonologyConfig {
    /// The inventory a phoneme of this kind belongs to.
    pub fn inventory(&self, kind: PhonemeKind) -> &Vec<Phoneme> {
        match kind {
            PhonemeKind::Consonant => &self.consonants,
            PhonemeKind::Vowel => &self.vowels,
        }
    }

    pub fn inventory_mut(&mut self, kind: PhonemeKind) -> &mut Vec<Phoneme> {
        match kind {
            PhonemeKind::Consonant => &mut self.consonants,
            PhonemeKind::Vowel => &mut self.vowels,
        }
    }

    /// Find a phoneme by symbol in either inventory.
    pub fn find(&self, symbol: &str) -> Option<&Phoneme> {
        self.consonants
            .iter()
            .chain(self.vowels.iter())
            .find(|p| p.symbol == symbol)
    }

    pub fn is_vowel(&self, symbol: &str) -> bool {
        self.vowels.iter().any(|p| p.symbol == symbol)
    }

    pub fn is_consonant(&self, symbol: &str) -> bool {
        self.consonants.iter().any(|p| p.symbol == symbol)
    }
}

/// A sound change such as `p > f / V_V`. Evaluation happens elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundChangeRule {
    #[serde(deserialize_with = "lenient::or_default")]
    pub id: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub rule: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub description: String,
}

/// Inflectional dimensions and the paradigms built from them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphologyState {
    #[serde(deserialize_with = "lenient::seq")]
    pub dimensions: Vec<MorphDimension>,
    #[serde(deserialize_with = "lenient::seq")]
    pub paradigms: Vec<MorphParadigm>,
}

/// An inflectional category, e.g. "Number" with values singular/plural.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphDimension {
    #[serde(deserialize_with = "lenient::or_default")]
    pub id: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub name: String,
    #[serde(deserialize_with = "lenient::seq")]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphParadigm {
    #[serde(deserialize_with = "lenient::or_default")]
    pub id: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub name: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub pos: String,
    /// Ids of the dimensions this paradigm spans.
    #[serde(deserialize_with = "lenient::seq")]
    pub dimensions: Vec<String>,
    #[serde(deserialize_with = "lenient::seq")]
    pub rules: Vec<InflectionRule>,
}

/// One cell of a paradigm: the affix used at a coordinate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InflectionRule {
    /// Dimension id to value.
    #[serde(deserialize_with = "lenient::or_default")]
    pub coordinates: BTreeMap<String, String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub affix: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub is_prefix: bool,

    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub logic: Option<InflectionLogic>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InflectionLogic {
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub pos: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub regex: Option<String>,
}

// ============================================================================
// Tolerant decoding
// ============================================================================

/// Known top-level keys; everything else lands in `extra`.
const KNOWN_FIELDS: &[&str] = &[
    "version",
    "name",
    "author",
    "description",
    "lexicon",
    "grammar",
    "morphology",
    "phonology",
    "evolutionRules",
    "constraints",
    "scriptConfig",
    "notebook",
    "lastModified",
];

/// Strings where empty means "not set".
fn non_empty(value: Option<String>, fallback: &str) -> String {
    match value {
        Some(s) if !s.trim().is_empty() => s,
        _ => fallback.to_string(),
    }
}

impl ProjectDocument {
    /// Decode a document from an already-parsed JSON value.
    ///
    /// Only a non-object top level is an error; every field defaults
    /// independently otherwise.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut obj = match value {
            Value::Object(obj) => obj,
            other => {
                return Err(StudioError::InvalidDocument {
                    reason: format!("expected a JSON object, found {}", json_kind(&other)),
                })
            }
        };

        let version = take_field::<String>(&mut obj, "version")
            .unwrap_or_else(|| DOCUMENT_VERSION.to_string());
        let name = non_empty(take_field(&mut obj, "name"), DEFAULT_PROJECT_NAME);
        let author = non_empty(take_field(&mut obj, "author"), DEFAULT_AUTHOR);

        let document = Self {
            version,
            name,
            author,
            description: take_field(&mut obj, "description").unwrap_or_default(),
            lexicon: take_seq(&mut obj, "lexicon"),
            grammar: take_field(&mut obj, "grammar").unwrap_or_default(),
            morphology: take_overlay(&mut obj, "morphology"),
            phonology: take_overlay(&mut obj, "phonology"),
            evolution_rules: take_seq(&mut obj, "evolutionRules"),
            constraints: take_overlay(&mut obj, "constraints"),
            script_config: take_overlay(&mut obj, "scriptConfig"),
            notebook: take_field(&mut obj, "notebook").unwrap_or_default(),
            last_modified: take_field(&mut obj, "lastModified").unwrap_or_default(),
            extra: obj
                .into_iter()
                .filter(|(k, _)| !KNOWN_FIELDS.contains(&k.as_str()))
                .collect(),
        };

        Ok(document)
    }

    /// Parse a document from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Serialize as pretty-printed JSON, the export format.
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Copy with a fresh modification stamp and the current format version.
    pub fn stamped(&self) -> Self {
        let mut doc = self.clone();
        doc.version = DOCUMENT_VERSION.to_string();
        doc.last_modified = Utc::now().timestamp_millis();
        doc
    }

    /// Blank project carrying the wizard's name, author and description.
    pub fn from_seed(seed: ProjectSeed) -> Self {
        let mut doc = Self {
            name: non_empty(Some(seed.name), DEFAULT_PROJECT_NAME),
            author: non_empty(Some(seed.author), DEFAULT_AUTHOR),
            description: seed.description,
            ..Self::default()
        };
        if let Some(constraints) = seed.constraints {
            doc.constraints = constraints;
        }
        doc
    }

    /// File name used when exporting: lowercase, whitespace replaced by '-'.
    ///
    /// Path separators and other characters that are unsafe in file names
    /// also become '-'. Runs of dots collapse and leading dots or dashes are
    /// dropped, so the name always stays inside the target directory.
    pub fn export_file_name(&self) -> String {
        let mut slug = String::with_capacity(self.name.len());
        for c in self.name.to_lowercase().chars() {
            let c = if c.is_whitespace() || c.is_control() || UNSAFE_FILE_CHARS.contains(&c) {
                '-'
            } else {
                c
            };
            if c == '.' && slug.ends_with('.') {
                continue;
            }
            slug.push(c);
        }

        let slug = slug
            .trim_start_matches(|c: char| c == '.' || c == '-')
            .trim_end_matches('.');
        if slug.is_empty() {
            format!("{}.json", DEFAULT_PROJECT_NAME.to_lowercase())
        } else {
            format!("{}.json", slug)
        }
    }

    /// SHA-256 over the document content, ignoring the modification stamp.
    pub fn fingerprint(&self) -> Result<String> {
        let mut doc = self.clone();
        doc.last_modified = 0;
        let bytes = serde_json::to_vec(&doc)?;
        Ok(format!("{:x}", Sha256::digest(&bytes)))
    }

    /// Find an entry by id.
    pub fn entry(&self, id: &str) -> Option<&LexiconEntry> {
        self.lexicon.iter().find(|e| e.id == id)
    }
}

impl<'de> Deserialize<'de> for ProjectDocument {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        ProjectDocument::from_value(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::script::TextDirection;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn test_missing_fields_take_defaults() {
        let doc = ProjectDocument::from_value(json!({ "name": "Quenya" })).unwrap();
        assert_eq!(doc.name, "Quenya");
        assert_eq!(doc.author, DEFAULT_AUTHOR);
        assert!(doc.lexicon.is_empty());
        assert_eq!(doc.constraints, ProjectConstraints::default());
        assert_eq!(doc.phonology.name, DEFAULT_PHONOLOGY_NAME);
        assert_eq!(doc.script_config.direction, TextDirection::Ltr);
    }

    #[test]
    fn test_empty_name_becomes_untitled() {
        let doc = ProjectDocument::from_value(json!({ "name": "  ", "author": "" })).unwrap();
        assert_eq!(doc.name, DEFAULT_PROJECT_NAME);
        assert_eq!(doc.author, DEFAULT_AUTHOR);
    }

    #[test]
    fn test_malformed_field_does_not_poison_document() {
        let doc = ProjectDocument::from_value(json!({
            "name": "Adûnaic",
            "lexicon": "not a list",
            "phonology": null,
            "grammar": "SOV"
        }))
        .unwrap();
        assert_eq!(doc.name, "Adûnaic");
        assert!(doc.lexicon.is_empty());
        assert_eq!(doc.phonology, PhonologyConfig::default());
        assert_eq!(doc.grammar, "SOV");
    }

    #[test]
    fn test_bad_element_costs_only_that_element() {
        let doc = ProjectDocument::from_value(json!({
            "lexicon": [
                { "id": "1", "word": "elen", "ipa": null, "pos": "Noun", "definition": "star" },
                42,
                { "id": "2", "word": "galad", "ipa": "ˈgalad", "pos": 7, "definition": "light" }
            ],
            "phonology": {
                "name": null,
                "consonants": [{ "symbol": "p", "type": "consonant" }, { "symbol": "x", "type": "click" }],
                "vowels": "aeiou",
                "syllableStructure": "CV"
            }
        }))
        .unwrap();

        let words: Vec<&str> = doc.lexicon.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(words, vec!["elen", "galad"]);
        assert_eq!(doc.lexicon[0].ipa, "");
        assert_eq!(doc.lexicon[1].pos, "");

        assert_eq!(doc.phonology.name, DEFAULT_PHONOLOGY_NAME);
        assert_eq!(doc.phonology.consonants.len(), 2);
        assert_eq!(doc.phonology.consonants[1].kind, PhonemeKind::Consonant);
        assert!(doc.phonology.vowels.is_empty());
        assert_eq!(doc.phonology.syllable_structure, "CV");
    }

    #[test]
    fn test_null_constraint_flag_keeps_its_default() {
        let doc = ProjectDocument::from_value(json!({
            "constraints": {
                "allowDuplicates": null,
                "caseSensitive": "sometimes",
                "mustStartWith": [{ "target": "k" }, { "target": null, "conditionPos": "Verb" }]
            }
        }))
        .unwrap();
        assert!(doc.constraints.allow_duplicates);
        assert!(!doc.constraints.case_sensitive);
        assert_eq!(doc.constraints.must_start_with.len(), 2);
        assert_eq!(doc.constraints.must_start_with[1].target, "");
    }

    #[test]
    fn test_partial_constraints_merge_with_defaults() {
        let doc = ProjectDocument::from_value(json!({
            "constraints": { "allowDuplicates": false, "bannedSequences": ["xx"] }
        }))
        .unwrap();
        assert!(!doc.constraints.allow_duplicates);
        assert!(!doc.constraints.case_sensitive);
        assert_eq!(doc.constraints.banned_sequences, vec!["xx".to_string()]);
        assert!(doc.constraints.must_start_with.is_empty());
    }

    #[test]
    fn test_non_object_is_rejected() {
        let err = ProjectDocument::from_value(json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DOCUMENT");
        assert!(ProjectDocument::from_json("{ not json").is_err());
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let doc = ProjectDocument::from_value(json!({
            "name": "Khuzdul",
            "glossingStyle": { "abbrev": true }
        }))
        .unwrap();
        assert_eq!(doc.extra.get("glossingStyle"), Some(&json!({ "abbrev": true })));

        let text = serde_json::to_string(&doc).unwrap();
        let back: ProjectDocument = serde_json::from_str(&text).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_serialized_field_names_are_camel_case() {
        let value = serde_json::to_value(ProjectDocument::default()).unwrap();
        for key in KNOWN_FIELDS {
            assert!(value.get(*key).is_some(), "missing key {}", key);
        }
    }

    #[test_case("High Valyrian Draft", "high-valyrian-draft.json" ; "whitespace becomes dash")]
    #[test_case("../../etc/evil", "etc-evil.json" ; "parent directories removed")]
    #[test_case("C:\\Users\\me", "c--users-me.json" ; "windows separators")]
    #[test_case("..", "untitled.json" ; "only dots")]
    #[test_case("Quenya v1..2", "quenya-v1.2.json" ; "dot runs collapse")]
    #[test_case(".hidden", "hidden.json" ; "no hidden files")]
    fn test_export_file_name(name: &str, expected: &str) {
        let doc = ProjectDocument {
            name: name.to_string(),
            ..ProjectDocument::default()
        };
        assert_eq!(doc.export_file_name(), expected);
    }

    #[test]
    fn test_fingerprint_ignores_timestamp() {
        let a = ProjectDocument::default();
        let b = a.stamped();
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn test_from_seed() {
        let doc = ProjectDocument::from_seed(ProjectSeed {
            name: "Toki".to_string(),
            author: "".to_string(),
            description: "minimal".to_string(),
            constraints: None,
        });
        assert_eq!(doc.name, "Toki");
        assert_eq!(doc.author, DEFAULT_AUTHOR);
        assert_eq!(doc.description, "minimal");
    }
}
