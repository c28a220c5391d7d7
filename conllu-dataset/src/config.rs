//! Dataset configuration.

use std::collections::BTreeSet;
use std::convert::TryFrom;
use std::str::FromStr;

use depgraph::token::{WordRecord, EMPTY_TOKEN};

use crate::error::ConfigError;

const UPOS_V1: &[&str] = &[
    "ADJ", "ADP", "ADV", "AUX", "CONJ", "DET", "INTJ", "NOUN", "NUM", "PART", "PRON", "PROPN",
    "PUNCT", "SCONJ", "SYM", "VERB", "X",
];

const UPOS_V2: &[&str] = &[
    "ADJ", "ADP", "ADV", "AUX", "CCONJ", "DET", "INTJ", "NOUN", "NUM", "PART", "PRON", "PROPN",
    "PUNCT", "SCONJ", "SYM", "VERB", "X",
];

const DEPRELS_V1: &[&str] = &[
    "acl", "advcl", "advmod", "amod", "appos", "aux", "auxpass", "case", "cc", "ccomp",
    "compound", "conj", "cop", "csubj", "csubjpass", "dep", "det", "discourse", "dislocated",
    "dobj", "expl", "foreign", "goeswith", "iobj", "list", "mark", "mwe", "name", "neg", "nmod",
    "nsubj", "nsubjpass", "nummod", "parataxis", "punct", "remnant", "reparandum", "root",
    "vocative", "xcomp",
];

const DEPRELS_V2: &[&str] = &[
    "acl", "advcl", "advmod", "amod", "appos", "aux", "case", "cc", "ccomp", "clf", "compound",
    "conj", "cop", "csubj", "dep", "det", "discourse", "dislocated", "expl", "fixed", "flat",
    "goeswith", "iobj", "list", "mark", "nmod", "nsubj", "nummod", "obj", "obl", "orphan",
    "parataxis", "punct", "reparandum", "root", "vocative", "xcomp",
];

const FEATURES_V1: &[&str] = &[
    "PronType", "NumType", "Poss", "Reflex", "Foreign", "Abbr", "Gender", "Animacy", "Number",
    "Case", "Definite", "Degree", "VerbForm", "Mood", "Tense", "Aspect", "Voice", "Evident",
    "Negative", "Person",
];

const FEATURES_V2: &[&str] = &[
    "PronType", "NumType", "Poss", "Reflex", "Foreign", "Abbr", "Typo", "Gender", "Animacy",
    "NounClass", "Number", "Case", "Definite", "Degree", "VerbForm", "Mood", "Tense", "Aspect",
    "Voice", "Evident", "Polarity", "Person", "Polite", "Clusivity",
];

/// Tag inventories against which tokens are validated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Vocabulary {
    upos: BTreeSet<String>,
    deprels: BTreeSet<String>,
    features: BTreeSet<String>,
}

impl Vocabulary {
    /// Construct a vocabulary from universal part-of-speech tags,
    /// universal dependency relations and feature names.
    pub fn new<U, D, F>(upos: U, deprels: D, features: F) -> Self
    where
        U: IntoIterator,
        U::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Vocabulary {
            upos: upos.into_iter().map(Into::into).collect(),
            deprels: deprels.into_iter().map(Into::into).collect(),
            features: features.into_iter().map(Into::into).collect(),
        }
    }

    /// The Universal Dependencies v1 inventories.
    pub fn ud_v1() -> Self {
        Vocabulary::new(
            UPOS_V1.iter().copied(),
            DEPRELS_V1.iter().copied(),
            FEATURES_V1.iter().copied(),
        )
    }

    /// The Universal Dependencies v2 inventories.
    pub fn ud_v2() -> Self {
        Vocabulary::new(
            UPOS_V2.iter().copied(),
            DEPRELS_V2.iter().copied(),
            FEATURES_V2.iter().copied(),
        )
    }

    /// Returns `true` if `upos` is a known universal part-of-speech tag.
    pub fn is_upos(&self, upos: &str) -> bool {
        self.upos.contains(upos)
    }

    /// Returns `true` if `deprel` is a known dependency relation.
    ///
    /// Language-specific subtypes (`nmod:poss`) are accepted when their
    /// universal part is known.
    pub fn is_deprel(&self, deprel: &str) -> bool {
        let universal = deprel.split(':').next().unwrap_or(deprel);
        self.deprels.contains(universal)
    }

    /// Returns `true` if `feature` is a known feature name.
    ///
    /// Layered features (`Gender[psor]`) are accepted when their base
    /// name is known.
    pub fn is_feature(&self, feature: &str) -> bool {
        let base = feature.split('[').next().unwrap_or(feature);
        self.features.contains(base)
    }

    /// Get the universal part-of-speech tags.
    pub fn upos_tags(&self) -> impl Iterator<Item = &str> {
        self.upos.iter().map(String::as_str)
    }

    /// Get the dependency relations.
    pub fn deprels(&self) -> impl Iterator<Item = &str> {
        self.deprels.iter().map(String::as_str)
    }

    /// Get the feature names.
    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(String::as_str)
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Vocabulary::ud_v2()
    }
}

/// Universal Dependencies format version.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UdVersion {
    V1,
    V2,
}

impl UdVersion {
    /// Get the tag inventories of this version.
    pub fn vocabulary(self) -> Vocabulary {
        match self {
            UdVersion::V1 => Vocabulary::ud_v1(),
            UdVersion::V2 => Vocabulary::ud_v2(),
        }
    }
}

impl Default for UdVersion {
    fn default() -> Self {
        UdVersion::V2
    }
}

impl TryFrom<u8> for UdVersion {
    type Error = ConfigError;

    fn try_from(version: u8) -> Result<Self, Self::Error> {
        match version {
            1 => Ok(UdVersion::V1),
            2 => Ok(UdVersion::V2),
            v => Err(ConfigError::UnknownUdVersion(v)),
        }
    }
}

/// Token field that is used as the label of graph nodes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NodeLabels {
    Form,
    Lemma,
    Pos,
}

impl NodeLabels {
    /// Get the label of a word.
    pub fn label(self, word: &WordRecord) -> &str {
        match self {
            NodeLabels::Form => word.form(),
            NodeLabels::Lemma => word.lemma(),
            NodeLabels::Pos => word.upos(),
        }
    }
}

impl Default for NodeLabels {
    fn default() -> Self {
        NodeLabels::Form
    }
}

impl FromStr for NodeLabels {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FORM" => Ok(NodeLabels::Form),
            "LEMMA" => Ok(NodeLabels::Lemma),
            "POS" => Ok(NodeLabels::Pos),
            other => Err(ConfigError::UnknownNodeLabels(other.to_owned())),
        }
    }
}

/// Default marker of document identifier comments.
pub const DOC_ID_PREFIX: &str = "# newdoc id = ";

/// Default marker of sentence identifier comments.
pub const SENT_ID_PREFIX: &str = "# sent_id = ";

/// A builder for `DatasetConfig`s.
pub struct DatasetConfigBuilder {
    config: DatasetConfig,
}

impl DatasetConfigBuilder {
    /// Create a builder that validates against the given UD version.
    pub fn new(version: UdVersion) -> Self {
        DatasetConfigBuilder {
            config: DatasetConfig {
                vocabulary: version.vocabulary(),
                doc_id_prefix: DOC_ID_PREFIX.to_owned(),
                sent_id_prefix: SENT_ID_PREFIX.to_owned(),
                node_labels: NodeLabels::default(),
                strict: false,
            },
        }
    }

    /// Replace the tag inventories.
    pub fn vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.config.vocabulary = vocabulary;
        self
    }

    /// Set the marker of document identifier comments.
    pub fn doc_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.doc_id_prefix = prefix.into();
        self
    }

    /// Set the marker of sentence identifier comments.
    pub fn sent_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.sent_id_prefix = prefix.into();
        self
    }

    /// Set the token field that is used as the graph node label.
    pub fn node_labels(mut self, node_labels: NodeLabels) -> Self {
        self.config.node_labels = node_labels;
        self
    }

    /// Also validate dependency relations and feature names.
    pub fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }
}

impl From<DatasetConfigBuilder> for DatasetConfig {
    fn from(builder: DatasetConfigBuilder) -> Self {
        builder.config
    }
}

/// Configuration of a dataset.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DatasetConfig {
    vocabulary: Vocabulary,
    doc_id_prefix: String,
    sent_id_prefix: String,
    node_labels: NodeLabels,
    strict: bool,
}

impl DatasetConfig {
    /// Get the tag inventories.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Get the marker of document identifier comments.
    pub fn doc_id_prefix(&self) -> &str {
        &self.doc_id_prefix
    }

    /// Get the marker of sentence identifier comments.
    pub fn sent_id_prefix(&self) -> &str {
        &self.sent_id_prefix
    }

    /// Get the token field that is used as the graph node label.
    pub fn node_labels(&self) -> NodeLabels {
        self.node_labels
    }

    /// Returns `true` if relations and feature names are validated.
    pub fn strict(&self) -> bool {
        self.strict
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        DatasetConfigBuilder::new(UdVersion::default()).into()
    }
}

/// Returns `true` if `value` is the placeholder or accepted by `known`.
pub(crate) fn known_or_empty(value: &str, known: impl FnOnce(&str) -> bool) -> bool {
    value == EMPTY_TOKEN || known(value)
}
