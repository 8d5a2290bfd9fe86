//! Keyword tables that drive stage grouping and classification.
//!
//! The upstream API phrases stage names in Polish, so the built-in
//! vocabulary is Polish. Grouping quality depends entirely on these
//! keywords matching the API's wording; other sources should ship their
//! own `vocabulary.yaml`.

use crate::errors::ConfigError;
use crate::schema::{Institution, SymbolShape};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Matches lowercased text containing any of `any`, and, when `and_any` is
/// non-empty, also any of `and_any`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub any: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub and_any: Vec<String>,
}

impl KeywordMatch {
    pub fn new(any: &[&str], and_any: &[&str]) -> Self {
        Self {
            any: lowered(any.iter().copied()),
            and_any: lowered(and_any.iter().copied()),
        }
    }

    /// `text` must already be lowercased.
    pub fn matches(&self, text: &str) -> bool {
        contains_any(text, &self.any)
            && (self.and_any.is_empty() || contains_any(text, &self.and_any))
    }

    fn normalized(self) -> Self {
        Self {
            any: lowered(self.any.iter().map(String::as_str)),
            and_any: lowered(self.and_any.iter().map(String::as_str)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub shape: SymbolShape,
    pub institution: Institution,
}

/// Narrows a matched rule when the text also mentions something more specific.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refinement {
    pub when: KeywordMatch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<SymbolShape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<Institution>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub when: KeywordMatch,
    pub shape: SymbolShape,
    pub institution: Institution,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refine: Vec<Refinement>,
}

impl ClassificationRule {
    /// Applies the first matching refinement, if any.
    pub fn resolve(&self, text: &str) -> Classification {
        let mut result = Classification {
            shape: self.shape,
            institution: self.institution,
        };
        if let Some(refinement) = self.refine.iter().find(|r| r.when.matches(text)) {
            result.shape = refinement.shape.unwrap_or(result.shape);
            result.institution = refinement.institution.unwrap_or(result.institution);
        }
        result
    }
}

/// Markers on the last stage that tell whether a process ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeMarkers {
    pub finished: Vec<String>,
    pub rejected: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DocumentReference {
    pattern: Regex,
    prefix: String,
}

impl DocumentReference {
    pub fn new(pattern: &str, prefix: impl Into<String>) -> Result<Self, ConfigError> {
        let regex = Regex::new(pattern).map_err(|source| ConfigError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        if regex.captures_len() < 2 {
            return Err(ConfigError::MissingCapture(pattern.to_string()));
        }
        Ok(Self {
            pattern: regex,
            prefix: prefix.into(),
        })
    }

    /// The print number of the first reference in `text`.
    pub fn find_number<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|number| number.as_str())
    }

    pub fn format(&self, number: &str) -> String {
        format!("{}{number}", self.prefix)
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl PartialEq for DocumentReference {
    fn eq(&self, other: &Self) -> bool {
        self.pattern.as_str() == other.pattern.as_str() && self.prefix == other.prefix
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    pub boundaries: Vec<KeywordMatch>,
    pub rules: Vec<ClassificationRule>,
    pub fallback: Classification,
    pub outcome: OutcomeMarkers,
    pub document_reference: DocumentReference,
}

/// On-disk form of [`Vocabulary`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyFile {
    pub boundaries: Vec<KeywordMatch>,
    pub rules: Vec<ClassificationRule>,
    pub fallback: Classification,
    pub outcome: OutcomeMarkers,
    pub document_reference: DocumentReferenceFile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReferenceFile {
    pub pattern: String,
    pub prefix: String,
}

impl Vocabulary {
    /// The vocabulary of the Sejm API.
    pub fn polish() -> &'static Vocabulary {
        &POLISH
    }

    pub fn from_file(file: VocabularyFile) -> Result<Self, ConfigError> {
        let DocumentReferenceFile { pattern, prefix } = file.document_reference;
        let document_reference = DocumentReference::new(&pattern, prefix)?;
        let rules = file
            .rules
            .into_iter()
            .map(|rule| ClassificationRule {
                when: rule.when.normalized(),
                refine: rule
                    .refine
                    .into_iter()
                    .map(|refinement| Refinement {
                        when: refinement.when.normalized(),
                        ..refinement
                    })
                    .collect(),
                ..rule
            })
            .collect();
        Ok(Self {
            boundaries: file.boundaries.into_iter().map(KeywordMatch::normalized).collect(),
            rules,
            fallback: file.fallback,
            outcome: OutcomeMarkers {
                finished: lowered(file.outcome.finished.iter().map(String::as_str)),
                rejected: lowered(file.outcome.rejected.iter().map(String::as_str)),
            },
            document_reference,
        })
    }

    pub fn to_file(&self) -> VocabularyFile {
        VocabularyFile {
            boundaries: self.boundaries.clone(),
            rules: self.rules.clone(),
            fallback: self.fallback,
            outcome: self.outcome.clone(),
            document_reference: DocumentReferenceFile {
                pattern: self.document_reference.pattern().to_string(),
                prefix: self.document_reference.prefix().to_string(),
            },
        }
    }

    /// `text` must already be lowercased.
    pub fn is_boundary(&self, text: &str) -> bool {
        self.boundaries.iter().any(|boundary| boundary.matches(text))
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::polish().clone()
    }
}

pub(crate) fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword.as_str()))
}

fn lowered<'a>(words: impl Iterator<Item = &'a str>) -> Vec<String> {
    words.map(str::to_lowercase).collect()
}

struct RuleRow {
    any: &'static [&'static str],
    shape: SymbolShape,
    institution: Institution,
    refine: &'static [RefineRow],
}

struct RefineRow {
    any: &'static [&'static str],
    shape: Option<SymbolShape>,
    institution: Option<Institution>,
}

const BOUNDARIES: &[(&[&str], &[&str])] = &[
    (&["wpłynął"], &[]),
    (&["czytanie"], &[]),
    (&["senat"], &["uchwała", "stanowisko"]),
    (&["prezydent"], &[]),
    (&["ogłoszo"], &[]),
    (&["odrzu"], &[]),
];

const RULES: &[RuleRow] = &[
    RuleRow {
        any: &["wpłynął", "inicjatywa"],
        shape: SymbolShape::Circle,
        institution: Institution::LowerHouse,
        refine: &[],
    },
    RuleRow {
        any: &["czytanie"],
        shape: SymbolShape::Rectangle,
        institution: Institution::LowerHouse,
        refine: &[RefineRow {
            any: &["głosowanie"],
            shape: Some(SymbolShape::Diamond),
            institution: None,
        }],
    },
    RuleRow {
        any: &["komis"],
        shape: SymbolShape::RoundedRect,
        institution: Institution::LowerHouse,
        refine: &[RefineRow {
            any: &["senac"],
            shape: None,
            institution: Some(Institution::UpperHouse),
        }],
    },
    RuleRow {
        any: &["senat"],
        shape: SymbolShape::Rectangle,
        institution: Institution::UpperHouse,
        refine: &[RefineRow {
            any: &["stanowisko", "uchwała"],
            shape: Some(SymbolShape::Diamond),
            institution: None,
        }],
    },
    RuleRow {
        any: &["prezydent"],
        shape: SymbolShape::Diamond,
        institution: Institution::President,
        refine: &[],
    },
    RuleRow {
        any: &["trybunał"],
        shape: SymbolShape::RoundedRect,
        institution: Institution::ConstitutionalCourt,
        refine: &[],
    },
    RuleRow {
        any: &["ogłoszo", "publikac"],
        shape: SymbolShape::DoubleCircle,
        institution: Institution::Publication,
        refine: &[],
    },
    RuleRow {
        any: &["odrzu", "wycof"],
        shape: SymbolShape::CircleX,
        institution: Institution::LowerHouse,
        refine: &[],
    },
];

const FINISHED_MARKERS: &[&str] = &["ogłoszona", "podpisał"];
const REJECTED_MARKERS: &[&str] = &["odrzuc"];

const PRINT_PATTERN: &str = r"(?i)druk(?:u)?\s+nr\s+(\d+(?:-[A-Z]+)?)";
const PRINT_PREFIX: &str = "Druk nr ";

static POLISH: LazyLock<Vocabulary> = LazyLock::new(|| Vocabulary {
    boundaries: BOUNDARIES
        .iter()
        .map(|(any, and_any)| KeywordMatch::new(any, and_any))
        .collect(),
    rules: RULES
        .iter()
        .map(|row| ClassificationRule {
            when: KeywordMatch::new(row.any, &[]),
            shape: row.shape,
            institution: row.institution,
            refine: row
                .refine
                .iter()
                .map(|refine| Refinement {
                    when: KeywordMatch::new(refine.any, &[]),
                    shape: refine.shape,
                    institution: refine.institution,
                })
                .collect(),
        })
        .collect(),
    fallback: Classification {
        shape: SymbolShape::RoundedRect,
        institution: Institution::LowerHouse,
    },
    outcome: OutcomeMarkers {
        finished: lowered(FINISHED_MARKERS.iter().copied()),
        rejected: lowered(REJECTED_MARKERS.iter().copied()),
    },
    document_reference: DocumentReference {
        pattern: Regex::new(PRINT_PATTERN).expect("built-in print pattern compiles"),
        prefix: PRINT_PREFIX.to_string(),
    },
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_match_requires_both_groups() {
        let senate_vote = KeywordMatch::new(&["senat"], &["uchwała", "stanowisko"]);
        assert!(senate_vote.matches("uchwała senatu bez poprawek"));
        assert!(!senate_vote.matches("senat otrzymał ustawę"));
        assert!(!senate_vote.matches("stanowisko rządu"));
    }

    #[test]
    fn keywords_are_lowercased_on_construction() {
        let m = KeywordMatch::new(&["Czytanie"], &[]);
        assert_eq!(m.any, vec!["czytanie".to_string()]);
    }

    #[test]
    fn document_pattern_without_capture_is_rejected() {
        let err = DocumentReference::new(r"druk nr \d+", "Druk nr ").unwrap_err();
        assert!(matches!(err, ConfigError::MissingCapture(_)));
    }

    #[test]
    fn invalid_document_pattern_is_rejected() {
        let err = DocumentReference::new(r"druk nr (\d+", "Druk nr ").unwrap_err();
        assert!(matches!(err, ConfigError::Pattern { .. }));
    }

    #[test]
    fn file_form_round_trips_the_built_in_vocabulary() {
        let file = Vocabulary::polish().to_file();
        let rebuilt = Vocabulary::from_file(file).unwrap();
        assert_eq!(&rebuilt, Vocabulary::polish());
    }

    #[test]
    fn rule_refinement_overrides_only_given_fields() {
        let committee = &Vocabulary::polish().rules[2];
        let resolved = committee.resolve("posiedzenie komisji senackiej");
        assert_eq!(resolved.shape, SymbolShape::RoundedRect);
        assert_eq!(resolved.institution, Institution::UpperHouse);
    }
}
