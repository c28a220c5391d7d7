//! CoNLL-U datasets on disk.

use std::borrow::Borrow;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use depgraph::graph::DependencyGraph;
use depgraph::token::WordRecord;
use tracing::debug;

use crate::config::DatasetConfig;
use crate::convert::{GraphBuilder, Graphs};
use crate::error::Error;
use crate::io::{ReadSentence, Reader, Sentences, WriteSentence, Writer};

/// A CoNLL-U file together with the configuration that is used to read
/// and write it.
///
/// Every call to `sentences` or `graphs` opens the file anew. The file is
/// closed when the returned iterator is dropped.
#[derive(Clone, Debug)]
pub struct Dataset {
    path: PathBuf,
    config: DatasetConfig,
}

impl Dataset {
    pub fn new(path: impl Into<PathBuf>, config: DatasetConfig) -> Self {
        Dataset {
            path: path.into(),
            config,
        }
    }

    /// Get the path of the dataset.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the dataset configuration.
    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// Read the sentences of the dataset.
    ///
    /// Multiword tokens and empty nodes are only returned when
    /// `include_multiwords` is `true`.
    pub fn sentences(
        &self,
        include_multiwords: bool,
    ) -> Result<Sentences<Reader<BufReader<File>>>, Error> {
        Ok(self
            .reader()?
            .include_multiwords(include_multiwords)
            .sentences())
    }

    /// Read the dependency graphs of the dataset.
    ///
    /// Nodes are labeled as configured. If `edgeless` is `true`, the graphs
    /// do not contain dependency relations.
    pub fn graphs(&self, edgeless: bool) -> Result<Graphs<Reader<BufReader<File>>>, Error> {
        let sentences = self.reader()?.include_multiwords(true).sentences();
        let builder = GraphBuilder::new(self.config.node_labels()).edgeless(edgeless);
        Ok(Graphs::new(sentences, builder))
    }

    /// Write sentences to the dataset, replacing its contents.
    pub fn write_sentences<I, S>(&self, sentences: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[WordRecord]>,
    {
        self.write_with(sentences, |writer, sentence| {
            writer.write_sentence(sentence.as_ref())
        })
    }

    /// Write dependency graphs to the dataset, replacing its contents.
    pub fn write_graphs<I, G>(&self, graphs: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = G>,
        G: Borrow<DependencyGraph>,
    {
        self.write_with(graphs, |writer, graph| writer.write_graph(graph.borrow()))
    }

    fn reader(&self) -> Result<Reader<BufReader<File>>, Error> {
        debug!(path = %self.path.display(), "opening dataset for reading");

        let file = File::open(&self.path).map_err(|err| Error::from(err).with_path(&self.path))?;

        Ok(Reader::with_config(BufReader::new(file), &self.config).path(&self.path))
    }

    fn write_with<I, F>(&self, items: I, write: F) -> Result<(), Error>
    where
        I: IntoIterator,
        F: FnMut(&mut Writer<BufWriter<File>>, I::Item) -> Result<(), Error>,
    {
        debug!(path = %self.path.display(), "opening dataset for writing");

        self.write_items(items, write)
            .map_err(|err| err.with_path(&self.path))
    }

    fn write_items<I, F>(&self, items: I, mut write: F) -> Result<(), Error>
    where
        I: IntoIterator,
        F: FnMut(&mut Writer<BufWriter<File>>, I::Item) -> Result<(), Error>,
    {
        let mut writer = Writer::new(BufWriter::new(File::create(&self.path)?));

        for item in items {
            write(&mut writer, item)?;
        }

        writer.flush()?;

        debug!(
            path = %self.path.display(),
            sentences = writer.n_sentences(),
            "finished writing dataset"
        );

        Ok(())
    }
}
