//! Word records: the rows of a CoNLL-U sentence.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::iter::FromIterator;
use std::ops::Deref;

/// Placeholder for an unset field.
pub const EMPTY_TOKEN: &str = "_";

/// Identifier of a CoNLL-U row.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum WordId {
    /// A syntactic word, numbered from 1.
    Token(usize),

    /// A multiword token covering the words `first-last`.
    Multiword(usize, usize),

    /// An empty node `major.minor`.
    Empty(usize, usize),
}

impl WordId {
    /// Returns `true` if the identifier is a plain integer.
    pub fn is_token(&self) -> bool {
        matches!(self, WordId::Token(_))
    }

    /// Get the integer of a plain token identifier.
    pub fn token(&self) -> Option<usize> {
        match *self {
            WordId::Token(idx) => Some(idx),
            _ => None,
        }
    }

    /// Get the leading integer component of the identifier.
    ///
    /// For multiword tokens this is the first word of the span, for empty
    /// nodes the word after which the node is inserted.
    pub fn anchor(&self) -> usize {
        match *self {
            WordId::Token(idx) | WordId::Multiword(idx, _) | WordId::Empty(idx, _) => idx,
        }
    }
}

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            WordId::Token(idx) => write!(f, "{}", idx),
            WordId::Multiword(first, last) => write!(f, "{}-{}", first, last),
            WordId::Empty(major, minor) => write!(f, "{}.{}", major, minor),
        }
    }
}

/// Morphological features.
///
/// Each feature name maps to a non-empty set of values. Both levels are
/// ordered, so iteration always yields the canonical CoNLL-U order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Features {
    inner: BTreeMap<String, BTreeSet<String>>,
}

impl Features {
    /// Construct an empty set of features.
    pub fn new() -> Self {
        Features {
            inner: BTreeMap::new(),
        }
    }

    /// Add a value to a feature.
    ///
    /// Returns `false` if the feature already had this value.
    pub fn insert(&mut self, feature: impl Into<String>, value: impl Into<String>) -> bool {
        self.inner
            .entry(feature.into())
            .or_insert_with(BTreeSet::new)
            .insert(value.into())
    }

    /// Unwrap the contained feature map.
    pub fn into_inner(self) -> BTreeMap<String, BTreeSet<String>> {
        self.inner
    }
}

impl Deref for Features {
    type Target = BTreeMap<String, BTreeSet<String>>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<BTreeMap<String, BTreeSet<String>>> for Features {
    fn from(mut feature_map: BTreeMap<String, BTreeSet<String>>) -> Self {
        feature_map.retain(|_, values| !values.is_empty());
        Features { inner: feature_map }
    }
}

impl<S, T> FromIterator<(S, T)> for Features
where
    S: Into<String>,
    T: Into<String>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
    {
        let mut features = Features::new();
        for (feature, value) in iter {
            features.insert(feature, value);
        }
        features
    }
}

/// A builder for `WordRecord`s.
///
/// A CoNLL-U row has ten fields, most of which are placeholders in
/// practice. This builder provides a fluent interface that starts from
/// a record where every field besides the identifier and form is `_`.
pub struct WordBuilder {
    word: WordRecord,
}

impl WordBuilder {
    /// Create a builder with all non-form fields set to the placeholder.
    pub fn new(id: WordId, form: impl Into<String>) -> WordBuilder {
        WordBuilder {
            word: WordRecord {
                id,
                form: form.into(),
                lemma: EMPTY_TOKEN.to_owned(),
                upos: EMPTY_TOKEN.to_owned(),
                xpos: EMPTY_TOKEN.to_owned(),
                features: Features::new(),
                head: None,
                deprel: EMPTY_TOKEN.to_owned(),
                deps: EMPTY_TOKEN.to_owned(),
                misc: EMPTY_TOKEN.to_owned(),
            },
        }
    }

    /// Set the row identifier.
    pub fn id(mut self, id: WordId) -> WordBuilder {
        self.word.id = id;
        self
    }

    /// Set the word form or punctuation symbol.
    pub fn form(mut self, form: impl Into<String>) -> WordBuilder {
        self.word.form = form.into();
        self
    }

    /// Set the lemma or stem of the word form.
    pub fn lemma(mut self, lemma: impl Into<String>) -> WordBuilder {
        self.word.lemma = lemma.into();
        self
    }

    /// Set the universal part-of-speech tag.
    pub fn upos(mut self, upos: impl Into<String>) -> WordBuilder {
        self.word.upos = upos.into();
        self
    }

    /// Set the language-specific part-of-speech tag.
    pub fn xpos(mut self, xpos: impl Into<String>) -> WordBuilder {
        self.word.xpos = xpos.into();
        self
    }

    /// Set the morphological features.
    pub fn features(mut self, features: Features) -> WordBuilder {
        self.word.features = features;
        self
    }

    /// Set the head, `None` for the placeholder.
    pub fn head(mut self, head: Option<usize>) -> WordBuilder {
        self.word.head = head;
        self
    }

    /// Set the relation to the head.
    pub fn deprel(mut self, deprel: impl Into<String>) -> WordBuilder {
        self.word.deprel = deprel.into();
        self
    }

    /// Set the enhanced dependencies.
    pub fn deps(mut self, deps: impl Into<String>) -> WordBuilder {
        self.word.deps = deps.into();
        self
    }

    /// Set miscellaneous annotations.
    pub fn misc(mut self, misc: impl Into<String>) -> WordBuilder {
        self.word.misc = misc.into();
        self
    }
}

impl From<WordRecord> for WordBuilder {
    fn from(word: WordRecord) -> Self {
        WordBuilder { word }
    }
}

impl From<WordBuilder> for WordRecord {
    fn from(builder: WordBuilder) -> Self {
        builder.word
    }
}

/// A single CoNLL-U row.
///
/// Records are values: they are compared structurally and are not
/// modified after construction. Use `WordBuilder::from` to derive a
/// changed copy.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WordRecord {
    id: WordId,
    form: String,
    lemma: String,
    upos: String,
    xpos: String,
    features: Features,
    head: Option<usize>,
    deprel: String,
    deps: String,
    misc: String,
}

impl WordRecord {
    /// Get the row identifier.
    pub fn id(&self) -> WordId {
        self.id
    }

    /// Returns `true` if the row is a syntactic word rather than a
    /// multiword token or empty node.
    pub fn is_token(&self) -> bool {
        self.id.is_token()
    }

    /// Get the word form or punctuation symbol.
    pub fn form(&self) -> &str {
        &self.form
    }

    /// Get the lemma or stem of the word form.
    pub fn lemma(&self) -> &str {
        &self.lemma
    }

    /// Get the universal part-of-speech tag.
    pub fn upos(&self) -> &str {
        &self.upos
    }

    /// Get the language-specific part-of-speech tag.
    pub fn xpos(&self) -> &str {
        &self.xpos
    }

    /// Get the morphological features.
    pub fn features(&self) -> &Features {
        &self.features
    }

    /// Get the head, `None` if the head is the placeholder.
    pub fn head(&self) -> Option<usize> {
        self.head
    }

    /// Get the relation to the head.
    pub fn deprel(&self) -> &str {
        &self.deprel
    }

    /// Get the enhanced dependencies.
    pub fn deps(&self) -> &str {
        &self.deps
    }

    /// Get miscellaneous annotations.
    pub fn misc(&self) -> &str {
        &self.misc
    }
}
