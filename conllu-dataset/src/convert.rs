//! Conversion between sentences and dependency graphs.

use std::collections::{BTreeSet, HashMap};

use depgraph::graph::{DepTriple, DependencyGraph, Node, Token, ROOT};
use depgraph::token::{WordBuilder, WordId, WordRecord, EMPTY_TOKEN};
use itertools::Itertools;

use crate::config::NodeLabels;
use crate::error::{Error, ParseError};
use crate::io::{ReadSentence, Sentences};

/// Builder of dependency graphs from sentences.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GraphBuilder {
    labels: NodeLabels,
    edgeless: bool,
}

impl GraphBuilder {
    /// Construct a builder that labels nodes with the given token field.
    pub fn new(labels: NodeLabels) -> Self {
        GraphBuilder {
            labels,
            edgeless: false,
        }
    }

    /// Only add nodes, no dependency relations.
    pub fn edgeless(mut self, edgeless: bool) -> Self {
        self.edgeless = edgeless;
        self
    }

    /// Build the graph of a sentence.
    ///
    /// Every token becomes a node keyed by its identifier and every
    /// head becomes an edge. Multiword tokens and empty nodes are stored as
    /// side annotations. The words are not validated.
    pub fn build(&self, words: &[WordRecord]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();

        for word in words {
            let idx = match word.id().token() {
                Some(idx) => idx,
                None => {
                    graph.add_side_annotation(word.clone());
                    continue;
                }
            };

            let key = idx.to_string();
            graph.add_node(
                key.as_str(),
                Node::new(self.labels.label(word), Token::from(word)),
            );

            if self.edgeless {
                continue;
            }

            if let Some(head) = word.head() {
                let relation = Some(word.deprel()).filter(|&deprel| deprel != EMPTY_TOKEN);
                graph.add_edge(DepTriple::new(head.to_string(), relation, key));
            }
        }

        graph
    }
}

/// Build the graph of a sentence, including its dependency relations.
pub fn sentence_to_graph(words: &[WordRecord], labels: NodeLabels) -> DependencyGraph {
    GraphBuilder::new(labels).build(words)
}

/// Convert a dependency graph back into a sentence.
///
/// Tokens are returned in identifier order. Multiword tokens are placed
/// before their first word, empty nodes after the word that they follow.
///
/// Every node except the root must have exactly one head and a form,
/// lemma and universal part-of-speech tag. Otherwise, a
/// `ParseError::MalformedGraph` error is returned.
pub fn graph_to_sentence(graph: &DependencyGraph) -> Result<Vec<WordRecord>, ParseError> {
    let mut tokens = Vec::with_capacity(graph.node_count());
    for (key, node) in graph.nodes() {
        if key == ROOT {
            continue;
        }

        let idx = parse_key(key)
            .filter(|&idx| idx > 0)
            .ok_or_else(|| malformed(format!("node key {:?} is not a token identifier", key)))?;
        tokens.push((idx, key, node));
    }

    // Keys are ordered as strings in the graph.
    tokens.sort_by_key(|&(idx, _, _)| idx);

    let words = tokens
        .into_iter()
        .map(|(idx, key, node)| node_to_word(graph, idx, key, node))
        .collect::<Result<Vec<_>, _>>()?;

    splice_side_annotations(graph, words)
}

fn node_to_word(
    graph: &DependencyGraph,
    idx: usize,
    key: &str,
    node: &Node,
) -> Result<WordRecord, ParseError> {
    let edge = match graph.heads(key).collect::<Vec<_>>().as_slice() {
        [edge] => *edge,
        [] => return Err(malformed(format!("node {} does not have a head", key))),
        edges => {
            return Err(malformed(format!(
                "node {} has {} heads",
                key,
                edges.len()
            )))
        }
    };

    let head = parse_key(edge.head())
        .filter(|_| graph.contains_node(edge.head()))
        .ok_or_else(|| {
            malformed(format!(
                "head {:?} of node {} is not a node of the graph",
                edge.head(),
                key
            ))
        })?;

    let token = node.token();
    let required = |value: Option<&str>, attr: &str| {
        value
            .map(ToOwned::to_owned)
            .ok_or_else(|| malformed(format!("node {} does not have a {}", key, attr)))
    };
    let form = required(token.form(), "form")?;
    let lemma = required(token.lemma(), "lemma")?;
    let upos = required(token.upos(), "universal part-of-speech tag")?;

    Ok(WordBuilder::new(WordId::Token(idx), form)
        .lemma(lemma)
        .upos(upos)
        .xpos(token.xpos().unwrap_or(EMPTY_TOKEN))
        .features(token.features().clone())
        .head(Some(head))
        .deprel(edge.relation().unwrap_or(EMPTY_TOKEN))
        .deps(token.deps().unwrap_or(EMPTY_TOKEN))
        .misc(token.misc().unwrap_or(EMPTY_TOKEN))
        .into())
}

/// Insert multiword tokens and empty nodes into a sequence of tokens.
fn splice_side_annotations(
    graph: &DependencyGraph,
    words: Vec<WordRecord>,
) -> Result<Vec<WordRecord>, ParseError> {
    let anchors = words
        .iter()
        .filter_map(|word| word.id().token())
        .collect::<BTreeSet<_>>();

    let mut before = Vec::new();
    let mut after = Vec::new();
    for (key, annotation) in graph.side_annotations() {
        let id = annotation.id();
        if key != id.to_string() {
            return Err(malformed(format!(
                "side annotation {} is stored under key {:?}",
                id, key
            )));
        }

        let anchor = id.anchor();
        match id {
            WordId::Multiword(..) if anchors.contains(&anchor) => before.push((anchor, annotation)),
            WordId::Empty(..) if anchor == 0 || anchors.contains(&anchor) => {
                after.push((anchor, annotation))
            }
            WordId::Token(_) => {
                return Err(malformed(format!(
                    "side annotation {} is a token",
                    id
                )))
            }
            _ => {
                return Err(malformed(format!(
                    "side annotation {} does not have an anchor token {}",
                    id, anchor
                )))
            }
        }
    }

    let n_words = words.len() + before.len() + after.len();
    let mut before = group_by_anchor(before);
    let mut after = group_by_anchor(after);

    let mut sentence = Vec::with_capacity(n_words);
    sentence.extend(after.remove(&0).unwrap_or_default());

    for word in words {
        let anchor = word.id().anchor();
        sentence.extend(before.remove(&anchor).unwrap_or_default());
        sentence.push(word);
        sentence.extend(after.remove(&anchor).unwrap_or_default());
    }

    Ok(sentence)
}

fn group_by_anchor(annotations: Vec<(usize, &WordRecord)>) -> HashMap<usize, Vec<WordRecord>> {
    annotations
        .into_iter()
        .into_group_map()
        .into_iter()
        .map(|(anchor, mut group)| {
            group.sort_by_key(|word| word.id());
            (anchor, group.into_iter().cloned().collect())
        })
        .collect()
}

/// Parse a node key, only accepting the canonical integer notation.
fn parse_key(key: &str) -> Option<usize> {
    key.parse::<usize>()
        .ok()
        .filter(|idx| idx.to_string() == key)
}

fn malformed(reason: String) -> ParseError {
    ParseError::MalformedGraph { reason }
}

/// An iterator over the dependency graphs of the sentences in a reader.
pub struct Graphs<R>
where
    R: ReadSentence,
{
    sentences: Sentences<R>,
    builder: GraphBuilder,
}

impl<R> Graphs<R>
where
    R: ReadSentence,
{
    pub fn new(sentences: Sentences<R>, builder: GraphBuilder) -> Self {
        Graphs { sentences, builder }
    }
}

impl<R> Iterator for Graphs<R>
where
    R: ReadSentence,
{
    type Item = Result<(String, DependencyGraph), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let builder = self.builder;
        self.sentences
            .next()
            .map(|sentence| sentence.map(|(name, words)| (name, builder.build(&words))))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use depgraph::graph::{DepTriple, DependencyGraph, Node, TokenBuilder, ROOT_LABEL};
    use depgraph::token::{WordBuilder, WordId, WordRecord};
    use depgraph::GraphError;

    use super::{graph_to_sentence, sentence_to_graph, GraphBuilder, Graphs};
    use crate::config::{NodeLabels, Vocabulary};
    use crate::error::ParseError;
    use crate::io::{ReadSentence, Reader};
    use crate::parse::parse_line;
    use crate::tests::{read_sentences, read_sentences_with_multiwords};

    static BASIC: &str = "testdata/basic.conllu";

    static MULTIWORD: &str = "testdata/multiword.conllu";

    fn parse_sentence(lines: &[&str]) -> Vec<WordRecord> {
        lines
            .iter()
            .map(|line| parse_line(line, &Vocabulary::ud_v2()).unwrap())
            .collect()
    }

    fn the_dog() -> Vec<WordRecord> {
        parse_sentence(&[
            "1\tThe\tthe\tDET\t_\t_\t2\tdet\t_\t_",
            "2\tdog\tdog\tNOUN\t_\t_\t0\troot\t_\t_",
        ])
    }

    fn token_node(form: &str) -> Node {
        Node::new(
            form,
            TokenBuilder::new(form).lemma(form).upos("X").into(),
        )
    }

    fn assert_malformed(graph: &DependencyGraph) {
        match graph_to_sentence(graph) {
            Err(ParseError::MalformedGraph { .. }) => (),
            other => panic!("expected malformed graph error, got: {:?}", other),
        }
    }

    #[test]
    fn the_dog_graph() {
        let graph = sentence_to_graph(&the_dog(), NodeLabels::Form);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.node("0").unwrap().label(), ROOT_LABEL);
        assert_eq!(graph.node("1").unwrap().label(), "The");
        assert_eq!(graph.node("2").unwrap().label(), "dog");
        assert_eq!(graph.node("2").unwrap().token().lemma(), Some("dog"));

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.head("2"), Some(&DepTriple::new("0", Some("root"), "2")));
        assert_eq!(graph.head("1"), Some(&DepTriple::new("2", Some("det"), "1")));

        assert_eq!(graph_to_sentence(&graph).unwrap(), the_dog());
    }

    #[test]
    fn node_labels() {
        let graph = sentence_to_graph(&the_dog(), NodeLabels::Pos);
        assert_eq!(graph.node("1").unwrap().label(), "DET");

        let graph = sentence_to_graph(&the_dog(), NodeLabels::Lemma);
        assert_eq!(graph.node("1").unwrap().label(), "the");
    }

    #[test]
    fn edgeless_graph() {
        let graph = GraphBuilder::new(NodeLabels::Form)
            .edgeless(true)
            .build(&the_dog());

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 0);
        assert_malformed(&graph);
    }

    #[test]
    fn placeholder_relation_is_unlabeled() {
        let words = parse_sentence(&["1\tHi\thi\tINTJ\t_\t_\t0\t_\t_\t_"]);
        let graph = sentence_to_graph(&words, NodeLabels::Form);

        assert_eq!(graph.head("1").unwrap().relation(), None);
        assert_eq!(graph_to_sentence(&graph).unwrap(), words);
    }

    #[test]
    fn multiword_is_inserted_before_first_word() {
        let words = parse_sentence(&[
            "1\tI\tI\tPRON\t_\t_\t3\tnsubj\t_\t_",
            "2\t'm\tbe\tAUX\t_\t_\t3\taux\t_\t_",
            "3-4\tgonna\t_\t_\t_\t_\t_\t_\t_\t_",
            "3\tgon\tgo\tVERB\t_\t_\t0\troot\t_\t_",
            "4\tna\tto\tPART\t_\t_\t5\tmark\t_\t_",
            "5\tleave\tleave\tVERB\t_\t_\t3\txcomp\t_\t_",
        ]);

        let graph = sentence_to_graph(&words, NodeLabels::Form);
        assert_eq!(graph.node_count(), 6);
        assert!(!graph.contains_node("3-4"));
        assert_eq!(graph.side_annotation("3-4").unwrap().form(), "gonna");

        let sentence = graph_to_sentence(&graph).unwrap();
        assert_eq!(sentence[2].id(), WordId::Multiword(3, 4));
        assert_eq!(sentence[3].id(), WordId::Token(3));
        assert_eq!(sentence, words);
    }

    #[test]
    fn empty_nodes_follow_their_anchor() {
        let words = parse_sentence(&[
            "0.1\tsays\tsay\tVERB\t_\t_\t_\t_\t0:root\t_",
            "1\tSue\tSue\tPROPN\t_\t_\t0\troot\t_\t_",
            "1.2\tgoes\tgo\tVERB\t_\t_\t_\t_\t1:conj\t_",
            "1.1\tlikes\tlike\tVERB\t_\t_\t_\t_\t1:conj\t_",
            "2\ttea\ttea\tNOUN\t_\t_\t1\tobj\t_\t_",
        ]);

        let graph = sentence_to_graph(&words, NodeLabels::Form);
        let ids = graph_to_sentence(&graph)
            .unwrap()
            .iter()
            .map(|word| word.id().to_string())
            .collect::<Vec<_>>();

        assert_eq!(ids, vec!["0.1", "1", "1.1", "1.2", "2"]);
    }

    #[test]
    fn rejects_node_without_head() {
        let mut graph = DependencyGraph::new();
        graph.add_node("1", token_node("a"));
        graph.add_node("2", token_node("b"));
        graph.add_edge(DepTriple::new("0", Some("root"), "1"));

        assert_eq!(
            graph_to_sentence(&graph),
            Err(ParseError::MalformedGraph {
                reason: "node 2 does not have a head".to_string()
            })
        );
    }

    #[test]
    fn rejects_node_with_two_heads() {
        let mut graph = DependencyGraph::new();
        graph.add_node("1", token_node("a"));
        graph.add_node("2", token_node("b"));
        graph.add_edge(DepTriple::new("0", Some("root"), "1"));
        graph.add_edge(DepTriple::new("1", Some("obj"), "2"));
        graph.add_edge(DepTriple::new("0", Some("root"), "2"));

        assert_eq!(
            graph_to_sentence(&graph),
            Err(ParseError::MalformedGraph {
                reason: "node 2 has 2 heads".to_string()
            })
        );
    }

    #[test]
    fn rejects_missing_attributes() {
        let mut graph = DependencyGraph::new();
        graph.add_node(
            "1",
            Node::new("a", TokenBuilder::new("a").upos("X").into()),
        );
        graph.add_edge(DepTriple::new("0", Some("root"), "1"));

        assert_eq!(
            graph_to_sentence(&graph),
            Err(ParseError::MalformedGraph {
                reason: "node 1 does not have a lemma".to_string()
            })
        );
    }

    #[test]
    fn rejects_bad_keys_and_heads() {
        let mut graph = DependencyGraph::new();
        graph.add_node("01", token_node("a"));
        graph.add_edge(DepTriple::new("0", Some("root"), "01"));
        assert_malformed(&graph);

        let mut graph = DependencyGraph::new();
        graph.add_node("1", token_node("a"));
        graph.add_edge(DepTriple::new("7", Some("root"), "1"));
        assert_malformed(&graph);
    }

    #[test]
    fn tree_check_catches_cycles_that_serialize() {
        let mut graph = DependencyGraph::new();
        graph.add_node("1", token_node("a"));
        graph.add_node("2", token_node("b"));
        graph.add_node("3", token_node("c"));
        graph.add_edge(DepTriple::new("0", Some("root"), "1"));
        graph.add_edge(DepTriple::new("3", Some("dep"), "2"));
        graph.add_edge(DepTriple::new("2", Some("dep"), "3"));

        // Every node has one head, so the graph can be written...
        assert_eq!(graph_to_sentence(&graph).unwrap().len(), 3);

        // ...but it is not a tree.
        assert!(matches!(graph.check_tree(), Err(GraphError::Cycle { .. })));
    }

    #[test]
    fn rejects_side_annotation_without_anchor() {
        let mut graph = sentence_to_graph(&the_dog(), NodeLabels::Form);
        graph.add_side_annotation(WordBuilder::new(WordId::Multiword(3, 4), "gonna").into());

        assert_eq!(
            graph_to_sentence(&graph),
            Err(ParseError::MalformedGraph {
                reason: "side annotation 3-4 does not have an anchor token 3".to_string()
            })
        );

        let mut graph = sentence_to_graph(&the_dog(), NodeLabels::Form);
        graph.add_side_annotation(WordBuilder::new(WordId::Empty(5, 1), "gone").into());
        assert_malformed(&graph);
    }

    #[test]
    fn rejects_token_side_annotation() {
        let mut graph = sentence_to_graph(&the_dog(), NodeLabels::Form);
        graph.add_side_annotation(WordBuilder::new(WordId::Token(1), "The").into());
        assert_malformed(&graph);
    }

    #[test]
    fn serializes_nodes_in_numeric_order() {
        let words = (1..=11)
            .map(|idx| {
                WordBuilder::new(WordId::Token(idx), format!("w{}", idx))
                    .lemma("w")
                    .upos("X")
                    .head(Some(if idx == 1 { 0 } else { 1 }))
                    .deprel(if idx == 1 { "root" } else { "dep" })
                    .into()
            })
            .collect::<Vec<WordRecord>>();

        let graph = sentence_to_graph(&words, NodeLabels::Form);
        assert_eq!(graph_to_sentence(&graph).unwrap(), words);
    }

    #[test]
    fn graph_round_trip() {
        for (_, words) in read_sentences(BASIC) {
            let graph = sentence_to_graph(&words, NodeLabels::Form);
            assert_eq!(graph_to_sentence(&graph).unwrap(), words);
        }

        for (_, words) in read_sentences_with_multiwords(MULTIWORD) {
            let graph = sentence_to_graph(&words, NodeLabels::Lemma);
            assert_eq!(graph_to_sentence(&graph).unwrap(), words);
        }
    }

    #[test]
    fn graphs_iterator() {
        let data = "1\tThe\tthe\tDET\t_\t_\t2\tdet\t_\t_\n\
                    2\tdog\tdog\tNOUN\t_\t_\t0\troot\t_\t_\n\n\
                    1\tBark\tbark\tVERB\t_\t_\t0\troot\t_\t_\n\n";
        let sentences = Reader::new(Cursor::new(data)).sentences();

        let graphs = Graphs::new(sentences, GraphBuilder::new(NodeLabels::Form))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(graphs.len(), 2);
        assert_eq!(graphs[0].0, "0_0");
        assert_eq!(graphs[0].1, sentence_to_graph(&the_dog(), NodeLabels::Form));
        assert_eq!(graphs[1].0, "0_1");
        assert_eq!(graphs[1].1.node_count(), 2);
    }
}
