//! Dependency graphs.

use std::collections::BTreeMap;
use std::mem;

use crate::token::{Features, WordRecord};

/// Key of the artificial root node.
pub const ROOT: &str = "0";

/// Label of the artificial root node.
///
/// A non-breaking space, which can never be the form, lemma or tag of a
/// CoNLL-U token.
pub const ROOT_LABEL: &str = "\u{a0}";

/// A builder for `Token`s.
///
/// All attributes of a token node are optional, this builder provides a
/// fluent interface for setting the ones that are present.
pub struct TokenBuilder {
    token: Token,
}

impl TokenBuilder {
    /// Create a `Token` builder with all non-form attributes absent.
    pub fn new(form: impl Into<String>) -> TokenBuilder {
        TokenBuilder {
            token: Token {
                form: Some(form.into()),
                ..Token::default()
            },
        }
    }

    /// Set the lemma or stem of the word form.
    pub fn lemma(mut self, lemma: impl Into<String>) -> TokenBuilder {
        self.token.set_lemma(Some(lemma));
        self
    }

    /// Set the universal part-of-speech tag.
    pub fn upos(mut self, upos: impl Into<String>) -> TokenBuilder {
        self.token.set_upos(Some(upos));
        self
    }

    /// Set the language-specific part-of-speech tag.
    pub fn xpos(mut self, xpos: impl Into<String>) -> TokenBuilder {
        self.token.set_xpos(Some(xpos));
        self
    }

    /// Set the morphological features of the token.
    pub fn features(mut self, features: Features) -> TokenBuilder {
        self.token.set_features(features);
        self
    }

    /// Set enhanced dependencies.
    pub fn deps(mut self, deps: impl Into<String>) -> TokenBuilder {
        self.token.set_deps(Some(deps));
        self
    }

    /// Set miscellaneous annotations.
    pub fn misc(mut self, misc: impl Into<String>) -> TokenBuilder {
        self.token.set_misc(Some(misc));
        self
    }
}

impl From<Token> for TokenBuilder {
    fn from(token: Token) -> Self {
        TokenBuilder { token }
    }
}

impl From<TokenBuilder> for Token {
    fn from(builder: TokenBuilder) -> Self {
        builder.token
    }
}

/// Attributes of a token node.
///
/// Graphs can be constructed by hand, so every attribute may be absent.
/// Writing a graph as CoNLL-U requires at least the form, lemma and
/// universal part-of-speech tag.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Token {
    form: Option<String>,
    lemma: Option<String>,
    upos: Option<String>,
    xpos: Option<String>,
    features: Features,
    deps: Option<String>,
    misc: Option<String>,
}

impl Token {
    /// Get the word form or punctuation symbol.
    pub fn form(&self) -> Option<&str> {
        self.form.as_deref()
    }

    /// Get the lemma or stem of the word form.
    pub fn lemma(&self) -> Option<&str> {
        self.lemma.as_deref()
    }

    /// Get the universal part-of-speech tag.
    pub fn upos(&self) -> Option<&str> {
        self.upos.as_deref()
    }

    /// Get the language-specific part-of-speech tag.
    pub fn xpos(&self) -> Option<&str> {
        self.xpos.as_deref()
    }

    /// Get the morphological features of the token.
    pub fn features(&self) -> &Features {
        &self.features
    }

    /// Get enhanced dependencies.
    pub fn deps(&self) -> Option<&str> {
        self.deps.as_deref()
    }

    /// Get miscellaneous annotations.
    pub fn misc(&self) -> Option<&str> {
        self.misc.as_deref()
    }

    /// Set the word form or punctuation symbol.
    ///
    /// Returns the form that is replaced.
    pub fn set_form<S>(&mut self, form: Option<S>) -> Option<String>
    where
        S: Into<String>,
    {
        mem::replace(&mut self.form, form.map(Into::into))
    }

    /// Set the lemma or stem of the word form.
    ///
    /// Returns the lemma that is replaced.
    pub fn set_lemma<S>(&mut self, lemma: Option<S>) -> Option<String>
    where
        S: Into<String>,
    {
        mem::replace(&mut self.lemma, lemma.map(Into::into))
    }

    /// Set the universal part-of-speech tag.
    ///
    /// Returns the universal part-of-speech tag that is replaced.
    pub fn set_upos<S>(&mut self, upos: Option<S>) -> Option<String>
    where
        S: Into<String>,
    {
        mem::replace(&mut self.upos, upos.map(Into::into))
    }

    /// Set the language-specific part-of-speech tag.
    ///
    /// Returns the language-specific part-of-speech tag that is replaced.
    pub fn set_xpos<S>(&mut self, xpos: Option<S>) -> Option<String>
    where
        S: Into<String>,
    {
        mem::replace(&mut self.xpos, xpos.map(Into::into))
    }

    /// Set the morphological features of the token.
    ///
    /// Returns the features that are replaced.
    pub fn set_features(&mut self, features: Features) -> Features {
        mem::replace(&mut self.features, features)
    }

    /// Set enhanced dependencies.
    pub fn set_deps<S>(&mut self, deps: Option<S>) -> Option<String>
    where
        S: Into<String>,
    {
        mem::replace(&mut self.deps, deps.map(Into::into))
    }

    /// Set miscellaneous annotations.
    pub fn set_misc<S>(&mut self, misc: Option<S>) -> Option<String>
    where
        S: Into<String>,
    {
        mem::replace(&mut self.misc, misc.map(Into::into))
    }
}

impl<'a> From<&'a WordRecord> for Token {
    fn from(word: &'a WordRecord) -> Self {
        TokenBuilder::new(word.form())
            .lemma(word.lemma())
            .upos(word.upos())
            .xpos(word.xpos())
            .features(word.features().clone())
            .deps(word.deps())
            .misc(word.misc())
            .into()
    }
}

/// Dependency graph node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Node {
    label: String,
    token: Token,
}

impl Node {
    /// Construct a token node.
    pub fn new(label: impl Into<String>, token: Token) -> Self {
        Node {
            label: label.into(),
            token,
        }
    }

    /// Construct the root node.
    pub fn root() -> Self {
        Node::new(ROOT_LABEL, Token::default())
    }

    /// Returns `true` if this is a root node.
    pub fn is_root(&self) -> bool {
        self.label == ROOT_LABEL && self.token == Token::default()
    }

    /// Get the node label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Replace the node label.
    ///
    /// Returns the label that is replaced.
    pub fn set_label(&mut self, label: impl Into<String>) -> String {
        mem::replace(&mut self.label, label.into())
    }

    /// Get the token attributes.
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Get the token attributes mutably.
    pub fn token_mut(&mut self) -> &mut Token {
        &mut self.token
    }
}

/// A dependency triple.
///
/// A dependency triple consists of: a head key; a dependent key; and
/// an optional dependency label.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct DepTriple {
    head: String,
    dependent: String,
    relation: Option<String>,
}

impl DepTriple {
    /// Construct a new dependency triple.
    pub fn new<S>(head: impl Into<String>, relation: Option<S>, dependent: impl Into<String>) -> Self
    where
        S: Into<String>,
    {
        DepTriple {
            head: head.into(),
            dependent: dependent.into(),
            relation: relation.map(Into::into),
        }
    }

    /// Get the dependent.
    pub fn dependent(&self) -> &str {
        &self.dependent
    }

    /// Get the head.
    pub fn head(&self) -> &str {
        &self.head
    }

    /// Get the dependency relation.
    pub fn relation(&self) -> Option<&str> {
        self.relation.as_deref()
    }
}

/// The dependency graph of a sentence.
///
/// The graph consists of three tables:
///
/// * nodes, keyed by the stringified token identifier, with `"0"` reserved
///   for the root;
/// * edges from head to dependent, labeled with the dependency relation;
/// * side annotations: multiword tokens and empty nodes, keyed by their
///   identifier. These are not part of the tree, but are kept so that the
///   sentence can be written back in full.
///
/// The graph does not enforce single-headedness on `add_edge`, so that
/// malformed graphs can be represented and rejected when they are
/// written. Use `set_head` to replace the head of a node instead.
///
/// Writing a graph as a sentence only requires every node to have one
/// head. Call `check_tree` before writing graphs that were edited, to also
/// reject cycles and edges to nodes that are not in the graph.
#[derive(Clone, Debug)]
pub struct DependencyGraph {
    nodes: BTreeMap<String, Node>,
    edges: Vec<DepTriple>,
    annotations: BTreeMap<String, WordRecord>,
}

impl DependencyGraph {
    /// Construct a graph that only contains the root node.
    ///
    /// ```
    /// use depgraph::graph::{DependencyGraph, ROOT, ROOT_LABEL};
    ///
    /// let graph = DependencyGraph::new();
    /// assert_eq!(graph.node(ROOT).map(|n| n.label()), Some(ROOT_LABEL));
    /// ```
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(ROOT.to_owned(), Node::root());
        DependencyGraph {
            nodes,
            edges: Vec::new(),
            annotations: BTreeMap::new(),
        }
    }

    /// Add a node to the graph.
    ///
    /// Returns the node that was previously stored under `key`, if any.
    pub fn add_node(&mut self, key: impl Into<String>, node: Node) -> Option<Node> {
        self.nodes.insert(key.into(), node)
    }

    /// Get a node.
    pub fn node(&self, key: &str) -> Option<&Node> {
        self.nodes.get(key)
    }

    /// Get a node mutably.
    pub fn node_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.nodes.get_mut(key)
    }

    /// Returns `true` if the graph has a node with the given key.
    pub fn contains_node(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Get an iterator over the nodes, including the root.
    ///
    /// Nodes are returned in lexicographic key order.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.nodes.iter().map(|(key, node)| (key.as_str(), node))
    }

    /// Get the number of nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Add an edge.
    ///
    /// The edge is added regardless of existing edges or nodes.
    pub fn add_edge(&mut self, triple: DepTriple) {
        self.edges.push(triple);
    }

    /// Attach `dependent` to a head.
    ///
    /// Existing head relations of the dependent are removed to ensure
    /// single-headedness. Returns the removed relations.
    pub fn set_head(&mut self, triple: DepTriple) -> Vec<DepTriple> {
        let removed = self.remove_head_rels(triple.dependent());
        self.edges.push(triple);
        removed
    }

    /// Remove the relations of a node to its heads.
    pub fn remove_head_rels(&mut self, dependent: &str) -> Vec<DepTriple> {
        let (removed, kept): (Vec<_>, Vec<_>) = mem::take(&mut self.edges)
            .into_iter()
            .partition(|e| e.dependent() == dependent);
        self.edges = kept;
        removed
    }

    /// Get the edges in insertion order.
    pub fn edges(&self) -> &[DepTriple] {
        &self.edges
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Return an iterator over the incoming edges of `dependent`.
    ///
    /// A well-formed graph has exactly one incoming edge for every node
    /// except the root.
    pub fn heads<'a>(&'a self, dependent: &'a str) -> impl Iterator<Item = &'a DepTriple> + 'a {
        self.edges.iter().filter(move |e| e.dependent() == dependent)
    }

    /// Return the first head relation of `dependent`, if any.
    pub fn head(&self, dependent: &str) -> Option<&DepTriple> {
        self.edges.iter().find(|e| e.dependent() == dependent)
    }

    /// Return an iterator over the dependents of `head`.
    pub fn dependents<'a>(&'a self, head: &'a str) -> impl Iterator<Item = &'a DepTriple> + 'a {
        self.edges.iter().filter(move |e| e.head() == head)
    }

    /// Store a multiword token or empty node.
    ///
    /// The record is keyed by its identifier. Returns the record that was
    /// previously stored under the same key, if any.
    pub fn add_side_annotation(&mut self, word: WordRecord) -> Option<WordRecord> {
        self.annotations.insert(word.id().to_string(), word)
    }

    /// Get a side annotation by its identifier.
    pub fn side_annotation(&self, key: &str) -> Option<&WordRecord> {
        self.annotations.get(key)
    }

    /// Get an iterator over the side annotations.
    pub fn side_annotations(&self) -> impl Iterator<Item = (&str, &WordRecord)> {
        self.annotations
            .iter()
            .map(|(key, word)| (key.as_str(), word))
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        DependencyGraph::new()
    }
}

impl Eq for DependencyGraph {}

impl PartialEq for DependencyGraph {
    fn eq(&self, other: &Self) -> bool {
        // Cheap checks
        if self.nodes.len() != other.nodes.len() || self.edges.len() != other.edges.len() {
            return false;
        }

        if self.nodes != other.nodes || self.annotations != other.annotations {
            return false;
        }

        // Edge order is insignificant.
        let mut edges = self.edges.iter().collect::<Vec<_>>();
        let mut other_edges = other.edges.iter().collect::<Vec<_>>();
        edges.sort();
        other_edges.sort();

        edges == other_edges
    }
}
