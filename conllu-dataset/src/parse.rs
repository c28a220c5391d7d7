//! Parsing and validation of CoNLL-U lines.

use std::convert::TryFrom;

use depgraph::token::{WordBuilder, WordId, WordRecord, EMPTY_TOKEN};

use crate::config::{known_or_empty, DatasetConfig, Vocabulary};
use crate::display::ConlluFeatures;
use crate::error::ParseError;

/// Number of fields in a CoNLL-U line.
pub const N_FIELDS: usize = 10;

const FIELD_NAMES: [&str; N_FIELDS] = [
    "ID", "FORM", "LEMMA", "UPOS", "XPOS", "FEATS", "HEAD", "DEPREL", "DEPS", "MISC",
];

/// Parser for CoNLL-U lines.
///
/// Lines are checked against a vocabulary. By default only universal
/// part-of-speech tags are validated; in strict mode the dependency
/// relations and feature names have to be known as well.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LineParser {
    vocabulary: Vocabulary,
    strict: bool,
}

impl LineParser {
    pub fn new(vocabulary: Vocabulary) -> Self {
        LineParser {
            vocabulary,
            strict: false,
        }
    }

    /// Enable or disable validation of relations and feature names.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Parse a line, without the line terminator.
    pub fn parse_line(&self, line: &str) -> Result<WordRecord, ParseError> {
        let fields = split_fields(line)?;

        let id = parse_identifier_field(fields[0])?;

        if !known_or_empty(fields[3], |upos| self.vocabulary.is_upos(upos)) {
            return Err(ParseError::UnknownUpos {
                value: fields[3].to_owned(),
            });
        }

        let features = ConlluFeatures::try_from(fields[5])?.into_owned();
        let head = parse_head_field(fields[6])?;

        if self.strict {
            if !known_or_empty(fields[7], |deprel| self.vocabulary.is_deprel(deprel)) {
                return Err(ParseError::UnknownDeprel {
                    value: fields[7].to_owned(),
                });
            }

            if let Some(feature) = features.keys().find(|f| !self.vocabulary.is_feature(f)) {
                return Err(ParseError::UnknownFeature {
                    value: feature.clone(),
                });
            }
        }

        Ok(WordBuilder::new(id, fields[1])
            .lemma(fields[2])
            .upos(fields[3])
            .xpos(fields[4])
            .features(features)
            .head(head)
            .deprel(fields[7])
            .deps(fields[8])
            .misc(fields[9])
            .into())
    }
}

impl<'a> From<&'a DatasetConfig> for LineParser {
    fn from(config: &'a DatasetConfig) -> Self {
        LineParser::new(config.vocabulary().clone()).strict(config.strict())
    }
}

/// Parse a line, validating only the universal part-of-speech tag.
pub fn parse_line(line: &str, vocabulary: &Vocabulary) -> Result<WordRecord, ParseError> {
    LineParser::new(vocabulary.clone()).parse_line(line)
}

/// Check that a word can be written as a CoNLL-U line that parses back
/// to the same word.
pub fn check_word(word: &WordRecord) -> Result<(), ParseError> {
    check_identifier(word.id())?;

    let fields = [
        (FIELD_NAMES[1], word.form()),
        (FIELD_NAMES[2], word.lemma()),
        (FIELD_NAMES[3], word.upos()),
        (FIELD_NAMES[4], word.xpos()),
        (FIELD_NAMES[7], word.deprel()),
        (FIELD_NAMES[8], word.deps()),
        (FIELD_NAMES[9], word.misc()),
    ];

    for &(field, value) in &fields {
        check_field(field, value)?;
    }

    for (feature, values) in word.features().iter() {
        let malformed = feature.is_empty()
            || feature.contains(|c: char| c == '=' || c == '|')
            || values
                .iter()
                .any(|v| v.is_empty() || v.contains(|c: char| c == '=' || c == ',' || c == '|'));
        if malformed {
            return Err(ParseError::IncorrectFeatureField {
                value: feature.clone(),
            });
        }

        for value in values {
            check_field(FIELD_NAMES[5], value)?;
        }
        check_field(FIELD_NAMES[5], feature)?;
    }

    Ok(())
}

/// Check that an identifier is accepted by `parse_identifier_field`.
fn check_identifier(id: WordId) -> Result<(), ParseError> {
    let valid = match id {
        WordId::Token(idx) => idx > 0,
        WordId::Multiword(first, last) => first > 0 && last > first,
        WordId::Empty(_, minor) => minor > 0,
    };

    if valid {
        Ok(())
    } else {
        Err(ParseError::ParseIdentifierField {
            value: id.to_string(),
        })
    }
}

fn check_field(field: &'static str, value: &str) -> Result<(), ParseError> {
    if value.is_empty() {
        return Err(ParseError::EmptyField { field });
    }

    // Lines are trimmed when they are read.
    if value.contains(|c: char| c == '\t' || c == '\n' || c == '\r')
        || value.trim() != value
    {
        return Err(ParseError::IllegalCharacter {
            field,
            value: value.to_owned(),
        });
    }

    Ok(())
}

fn split_fields(line: &str) -> Result<Vec<&str>, ParseError> {
    let fields = line.split('\t').collect::<Vec<_>>();

    if fields.len() != N_FIELDS {
        return Err(ParseError::FieldCount {
            count: fields.len(),
        });
    }

    if let Some(idx) = fields.iter().position(|field| field.is_empty()) {
        return Err(ParseError::EmptyField {
            field: FIELD_NAMES[idx],
        });
    }

    Ok(fields)
}

/// Parse an identifier: `n`, `n-m` or `n.m`.
pub(crate) fn parse_identifier_field(field: &str) -> Result<WordId, ParseError> {
    let invalid = || ParseError::ParseIdentifierField {
        value: field.to_owned(),
    };

    if let Some(idx) = field.find('-') {
        let first = parse_digits(&field[..idx]).ok_or_else(invalid)?;
        let last = parse_digits(&field[idx + 1..]).ok_or_else(invalid)?;
        if first == 0 || last <= first {
            return Err(invalid());
        }

        Ok(WordId::Multiword(first, last))
    } else if let Some(idx) = field.find('.') {
        let major = parse_digits(&field[..idx]).ok_or_else(invalid)?;
        let minor = parse_digits(&field[idx + 1..]).ok_or_else(invalid)?;
        if minor == 0 {
            return Err(invalid());
        }

        Ok(WordId::Empty(major, minor))
    } else {
        match parse_digits(field) {
            Some(idx) if idx > 0 => Ok(WordId::Token(idx)),
            _ => Err(invalid()),
        }
    }
}

fn parse_head_field(field: &str) -> Result<Option<usize>, ParseError> {
    if field == EMPTY_TOKEN {
        return Ok(None);
    }

    parse_digits(field)
        .map(Some)
        .ok_or_else(|| ParseError::ParseIntField {
            value: field.to_owned(),
        })
}

/// Parse a non-empty run of ASCII digits.
fn parse_digits(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    s.parse().ok()
}
