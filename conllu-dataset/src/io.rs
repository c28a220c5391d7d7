//! CoNLL-U format reader and writers.

use std::io;
use std::path::PathBuf;

use depgraph::graph::DependencyGraph;
use depgraph::token::WordRecord;
use tracing::trace;

use crate::config::DatasetConfig;
use crate::convert::graph_to_sentence;
use crate::display::ConlluSentence;
use crate::error::{Error, ParseError};
use crate::parse::{check_word, LineParser};

/// A sentence name with the words of the sentence.
pub type NamedSentence = (String, Vec<WordRecord>);

/// A trait for objects that can read CoNLL-U sentences.
pub trait ReadSentence {
    /// Read a sentence from this object.
    ///
    /// Returns `None` when there are no more sentences.
    ///
    /// # Errors
    ///
    /// A call to `read_sentence` may generate an error to indicate that
    /// the operation could not be completed.
    fn read_sentence(&mut self) -> Result<Option<NamedSentence>, Error>;

    /// Get an iterator over the sentences in this reader.
    fn sentences(self) -> Sentences<Self>
    where
        Self: Sized,
    {
        Sentences {
            reader: self,
            failed: false,
        }
    }
}

/// A reader for CoNLL-U sentences.
///
/// Sentences are named `doc_sent`. The document and sentence parts are
/// taken from comments that contain the configured identifier prefixes.
/// Without such comments, the document part is the number of the document
/// and the sentence part the number of the sentence within the document,
/// both counting from zero.
pub struct Reader<R> {
    read: R,
    parser: LineParser,
    doc_id_prefix: String,
    sent_id_prefix: String,
    include_multiwords: bool,
    path: Option<PathBuf>,

    line_no: usize,
    doc_id: Option<String>,
    doc_counter: usize,
    sent_counter: usize,
}

impl<R: io::BufRead> Reader<R> {
    /// Construct a new reader from an object that implements the
    /// `io::BufRead` trait, using the default configuration.
    pub fn new(read: R) -> Reader<R> {
        Reader::with_config(read, &DatasetConfig::default())
    }

    /// Construct a new reader with the given configuration.
    pub fn with_config(read: R, config: &DatasetConfig) -> Reader<R> {
        Reader {
            read,
            parser: LineParser::from(config),
            doc_id_prefix: config.doc_id_prefix().to_owned(),
            sent_id_prefix: config.sent_id_prefix().to_owned(),
            include_multiwords: false,
            path: None,
            line_no: 0,
            doc_id: None,
            doc_counter: 0,
            sent_counter: 0,
        }
    }

    /// Also return multiword tokens and empty nodes.
    pub fn include_multiwords(mut self, include_multiwords: bool) -> Self {
        self.include_multiwords = include_multiwords;
        self
    }

    /// Set the path that is reported in errors.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    fn parse_comment(&mut self, comment: &str, sent_id: &mut Option<String>) {
        if let Some(doc_id) = strip_marker(comment, &self.doc_id_prefix) {
            // A new document restarts sentence numbering.
            if self.doc_id.is_some() || self.sent_counter != 0 {
                self.doc_counter += 1;
            }
            self.doc_id = Some(doc_id.to_owned());
            self.sent_counter = 0;
        } else if let Some(id) = strip_marker(comment, &self.sent_id_prefix) {
            *sent_id = Some(id.to_owned());
        }
    }

    fn finish_sentence(&mut self, sent_id: Option<String>, words: Vec<WordRecord>) -> NamedSentence {
        let doc = match &self.doc_id {
            Some(doc_id) => doc_id.clone(),
            None => self.doc_counter.to_string(),
        };
        let sent = sent_id.unwrap_or_else(|| self.sent_counter.to_string());
        self.sent_counter += 1;

        let name = format!("{}_{}", doc, sent);
        trace!(name = %name, words = words.len(), "read sentence");

        (name, words)
    }

    fn io_error(&self, err: io::Error, line_no: usize) -> Error {
        if err.kind() == io::ErrorKind::InvalidData {
            self.format_error(ParseError::Encoding, line_no)
        } else {
            Error::IO {
                path: self.path.clone(),
                source: err,
            }
        }
    }

    fn format_error(&self, err: ParseError, line_no: usize) -> Error {
        Error::Format {
            path: self.path.clone(),
            line: Some(line_no),
            source: err,
        }
    }
}

impl<R: io::BufRead> IntoIterator for Reader<R> {
    type Item = Result<NamedSentence, Error>;
    type IntoIter = Sentences<Reader<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.sentences()
    }
}

impl<R: io::BufRead> ReadSentence for Reader<R> {
    fn read_sentence(&mut self) -> Result<Option<NamedSentence>, Error> {
        let mut line = String::new();
        let mut words = Vec::new();
        let mut sent_id = None;
        let mut has_data = false;

        loop {
            line.clear();
            let line_no = self.line_no;

            // End of reader.
            if self
                .read
                .read_line(&mut line)
                .map_err(|err| self.io_error(err, line_no))?
                == 0
            {
                if !has_data {
                    return Ok(None);
                }

                return Ok(Some(self.finish_sentence(sent_id, words)));
            }

            self.line_no += 1;

            let trimmed = line.trim();

            // The blank line is a sentence separator. We want to be robust
            // in the case a CoNLL-U file is malformed and has two newlines as
            // a separator.
            if trimmed.is_empty() {
                if !has_data {
                    continue;
                }

                return Ok(Some(self.finish_sentence(sent_id, words)));
            }

            if trimmed.starts_with('#') {
                self.parse_comment(trimmed, &mut sent_id);
                continue;
            }

            has_data = true;

            let word = self
                .parser
                .parse_line(trimmed)
                .map_err(|err| self.format_error(err, line_no))?;

            if self.include_multiwords || word.is_token() {
                words.push(word);
            }
        }
    }
}

/// Get the text after `marker` in a comment.
fn strip_marker<'a>(comment: &'a str, marker: &str) -> Option<&'a str> {
    if marker.is_empty() {
        return None;
    }

    comment
        .find(marker)
        .map(|idx| comment[idx + marker.len()..].trim())
}

/// An iterator over the sentences in a `Reader`.
///
/// The iterator stops after the first error.
pub struct Sentences<R>
where
    R: ReadSentence,
{
    reader: R,
    failed: bool,
}

impl<R> Iterator for Sentences<R>
where
    R: ReadSentence,
{
    type Item = Result<NamedSentence, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.reader.read_sentence() {
            Ok(None) => None,
            Ok(Some(sent)) => Some(Ok(sent)),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// A trait for objects that can write CoNLL-U sentences.
pub trait WriteSentence {
    /// Write a sentence into this object.
    ///
    /// # Errors
    ///
    /// A call to `write_sentence` may generate an error to indicate that
    /// the operation could not be completed.
    fn write_sentence(&mut self, words: &[WordRecord]) -> Result<(), Error>;

    /// Write the sentence that is represented by a dependency graph.
    fn write_graph(&mut self, graph: &DependencyGraph) -> Result<(), Error> {
        let words = graph_to_sentence(graph)?;
        self.write_sentence(&words)
    }
}

/// A writer for CoNLL-U sentences.
///
/// This writer will write sentences to the embedded writer in CoNLL-U
/// tabular format. Every sentence is terminated by an empty line.
pub struct Writer<W> {
    write: W,
    n_sentences: usize,
}

impl<W: io::Write> Writer<W> {
    /// Construct a new writer from an object that implements the `io::Write`
    /// trait.
    pub fn new(write: W) -> Writer<W> {
        Writer {
            write,
            n_sentences: 0,
        }
    }

    /// Borrow the embedded writer. Getting the underlying writer is often
    /// useful when the writer writes to a memory object.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::str;
    ///
    /// use conllu_dataset::io::{Writer, WriteSentence};
    /// use depgraph::token::{WordBuilder, WordId, WordRecord};
    ///
    /// let output = Vec::new();
    /// let mut writer = Writer::new(output);
    /// let sent: Vec<WordRecord> = vec![
    ///     WordBuilder::new(WordId::Token(1), "hello").into(),
    ///     WordBuilder::new(WordId::Token(2), "world").into(),
    /// ];
    ///
    /// writer.write_sentence(&sent).unwrap();
    ///
    /// println!("Output:\n{}", str::from_utf8(writer.get_ref()).unwrap());
    /// ```
    pub fn get_ref(&self) -> &W {
        &self.write
    }

    /// Unwrap the embedded writer.
    pub fn into_inner(self) -> W {
        self.write
    }

    /// Get the number of sentences that were written.
    pub fn n_sentences(&self) -> usize {
        self.n_sentences
    }

    /// Flush the embedded writer.
    pub fn flush(&mut self) -> Result<(), Error> {
        self.write.flush()?;
        Ok(())
    }
}

impl<W: io::Write> WriteSentence for Writer<W> {
    fn write_sentence(&mut self, words: &[WordRecord]) -> Result<(), Error> {
        if words.is_empty() {
            return Err(ParseError::EmptySentence.into());
        }

        for word in words {
            check_word(word)?;
        }

        write!(self.write, "{}", ConlluSentence(words))?;

        self.n_sentences += 1;
        trace!(sentence = self.n_sentences, words = words.len(), "wrote sentence");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, Cursor};
    use std::str;

    use depgraph::graph::{DepTriple, DependencyGraph, Node, TokenBuilder};
    use depgraph::token::{WordBuilder, WordId, WordRecord};

    use super::{ReadSentence, Reader, WriteSentence, Writer};
    use crate::config::{DatasetConfig, DatasetConfigBuilder, UdVersion};
    use crate::error::ParseError;
    use crate::tests::{read_file, read_sentences, TEST_SENTENCES};

    static BASIC: &str = "testdata/basic.conllu";

    static NO_IDS: &str = "testdata/no-ids.conllu";

    static BAD_UPOS: &str = "testdata/bad-upos.conllu";

    fn string_reader(s: &str) -> Box<dyn BufRead> {
        Box::new(Cursor::new(s.as_bytes().to_owned()))
    }

    fn names(data: &str) -> Vec<String> {
        Reader::new(string_reader(data))
            .sentences()
            .map(|s| s.unwrap().0)
            .collect()
    }

    #[test]
    fn reader() {
        assert_eq!(read_sentences(BASIC), *TEST_SENTENCES);
    }

    #[test]
    fn reader_names_without_comments() {
        let sentences = read_sentences(NO_IDS);
        let names = sentences.iter().map(|s| s.0.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["0_0", "0_1", "0_2"]);
    }

    #[test]
    fn reader_robust_to_double_newline_and_missing_final_newline() {
        let sentences = read_sentences(NO_IDS);
        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[2].1[0].form(), "Again");
    }

    #[test]
    fn the_dog_example() {
        let mut reader = Reader::new(string_reader(
            "1\tThe\tthe\tDET\t_\t_\t2\tdet\t_\t_\n2\tdog\tdog\tNOUN\t_\t_\t0\troot\t_\t_\n\n",
        ));

        let (name, words) = reader.read_sentence().unwrap().unwrap();
        assert_eq!(name, "0_0");
        assert_eq!(words.len(), 2);
        assert_eq!(words[1].head(), Some(0));
        assert!(reader.read_sentence().unwrap().is_none());
    }

    #[test]
    fn sentence_ids_from_comments() {
        let data = "# newdoc id = d1\n# sent_id = s1\n1\ta\ta\tX\t_\t_\t0\troot\t_\t_\n\n\
                    1\tb\tb\tX\t_\t_\t0\troot\t_\t_\n\n\
                    # newdoc id = d2\n1\tc\tc\tX\t_\t_\t0\troot\t_\t_\n\n\
                    # sent_id = last\n1\td\td\tX\t_\t_\t0\troot\t_\t_\n\n";

        assert_eq!(names(data), vec!["d1_s1", "d1_1", "d2_0", "d2_last"]);
    }

    #[test]
    fn custom_id_prefixes() {
        let config: DatasetConfig = DatasetConfigBuilder::new(UdVersion::V2)
            .doc_id_prefix("# doc: ")
            .sent_id_prefix("# id: ")
            .into();
        let data = "# doc: news\n# id: 7\n1\ta\ta\tX\t_\t_\t0\troot\t_\t_\n\n";

        let sentences = Reader::with_config(string_reader(data), &config)
            .sentences()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(sentences[0].0, "news_7");
    }

    #[test]
    fn multiwords_are_skipped_by_default() {
        let data = "1-2\tdu\t_\t_\t_\t_\t_\t_\t_\t_\n\
                    1\tde\tde\tADP\t_\t_\t2\tcase\t_\t_\n\
                    2\tle\tle\tDET\t_\t_\t0\troot\t_\t_\n\n";

        let (_, words) = Reader::new(string_reader(data))
            .read_sentence()
            .unwrap()
            .unwrap();
        assert_eq!(words.len(), 2);

        let (_, words) = Reader::new(string_reader(data))
            .include_multiwords(true)
            .read_sentence()
            .unwrap()
            .unwrap();
        assert_eq!(words.len(), 3);
        assert_eq!(words[0].id(), WordId::Multiword(1, 2));
    }

    #[test]
    fn error_carries_path_and_line() {
        let data = read_file(BAD_UPOS);
        let mut sentences = Reader::new(string_reader(&data)).path(BAD_UPOS).sentences();

        assert!(sentences.next().unwrap().is_ok());

        let err = sentences.next().unwrap().unwrap_err();
        assert!(err.is_format());
        assert_eq!(err.line(), Some(5));
        assert_eq!(err.path().and_then(|p| p.to_str()), Some(BAD_UPOS));
        assert_eq!(
            err.parse_error(),
            Some(&ParseError::UnknownUpos {
                value: "FOO".to_string()
            })
        );

        // The iterator is exhausted after an error.
        assert!(sentences.next().is_none());
    }

    #[test]
    #[should_panic(expected = "FieldCount")]
    fn reader_rejects_nine_fields() {
        let mut reader = Reader::new(string_reader("1\ttest\t_\t_\t_\t_\t0\troot\t_\n"));
        reader.read_sentence().unwrap();
    }

    #[test]
    #[should_panic(expected = "ParseIdentifierField")]
    fn reader_rejects_underscore_id() {
        let mut reader = Reader::new(string_reader("_\ttest\t_\t_\t_\t_\t0\troot\t_\t_\n"));
        reader.read_sentence().unwrap();
    }

    #[test]
    fn reader_rejects_invalid_utf8() {
        let data: &[u8] = b"1\t\xff\t_\t_\t_\t_\t0\troot\t_\t_\n";
        let mut reader = Reader::new(Cursor::new(data));

        let err = reader.read_sentence().unwrap_err();
        assert_eq!(err.parse_error(), Some(&ParseError::Encoding));
        assert_eq!(err.line(), Some(0));
    }

    #[test]
    fn empty_input_has_no_sentences() {
        assert!(names("").is_empty());
        assert!(names("\n\n# just a comment\n").is_empty());
    }

    #[test]
    fn writer() {
        let mut writer = Writer::new(Vec::new());

        for (_, sentence) in &*TEST_SENTENCES {
            writer.write_sentence(sentence).unwrap();
        }

        assert_eq!(writer.n_sentences(), 2);
        assert_eq!(
            read_file("testdata/basic-nocomments.conllu"),
            str::from_utf8(writer.get_ref()).unwrap()
        );
    }

    #[test]
    fn writer_rejects_unwritable_word() {
        let mut writer = Writer::new(Vec::new());
        let words: Vec<WordRecord> = vec![WordBuilder::new(WordId::Token(1), "").into()];

        let err = writer.write_sentence(&words).unwrap_err();
        assert_eq!(
            err.parse_error(),
            Some(&ParseError::EmptyField { field: "FORM" })
        );
        assert!(writer.get_ref().is_empty());
    }

    #[test]
    fn writer_rejects_empty_sentence() {
        let mut writer = Writer::new(Vec::new());
        let empty: &[WordRecord] = &[];

        let err = writer.write_sentence(empty).unwrap_err();
        assert_eq!(err.parse_error(), Some(&ParseError::EmptySentence));
        assert_eq!(writer.n_sentences(), 0);
        assert!(writer.get_ref().is_empty());
    }

    #[test]
    fn written_sentences_read_back() {
        let mut writer = Writer::new(Vec::new());
        let unreadable: Vec<Vec<WordRecord>> = vec![
            vec![WordBuilder::new(WordId::Token(1), "a").misc(" ").into()],
            vec![WordBuilder::new(WordId::Token(0), "a").into()],
        ];

        for words in &unreadable {
            assert!(writer.write_sentence(words).unwrap_err().is_format());
        }

        for (_, words) in &*TEST_SENTENCES {
            writer.write_sentence(words).unwrap();
        }

        let data = String::from_utf8(writer.into_inner()).unwrap();
        let read_back = Reader::new(string_reader(&data))
            .sentences()
            .map(|s| s.unwrap().1)
            .collect::<Vec<_>>();
        let expected = TEST_SENTENCES
            .iter()
            .map(|(_, words)| words.clone())
            .collect::<Vec<_>>();
        assert_eq!(read_back, expected);
    }

    #[test]
    fn write_graph() {
        let mut graph = DependencyGraph::new();
        graph.add_node(
            "1",
            Node::new("Hi", TokenBuilder::new("Hi").lemma("hi").upos("INTJ").into()),
        );
        graph.add_edge(DepTriple::new("0", Some("root"), "1"));

        let mut writer = Writer::new(Vec::new());
        writer.write_graph(&graph).unwrap();

        assert_eq!(
            str::from_utf8(&writer.into_inner()).unwrap(),
            "1\tHi\thi\tINTJ\t_\t_\t0\troot\t_\t_\n\n"
        );
    }
}
