//! CoNLL-U rendering of words and sentences.

use std::borrow::Cow;
use std::convert::TryFrom;
use std::fmt;
use std::ops::Deref;

use depgraph::token::{Features, WordRecord, EMPTY_TOKEN};
use itertools::Itertools;

use crate::error::ParseError;

/// CoNLL-U representation of morphological features.
///
/// Features are written in canonical order: sorted by name, with the
/// values of a feature sorted as well.
#[derive(Debug, Eq, PartialEq)]
pub struct ConlluFeatures<'a>(pub Cow<'a, Features>);

impl<'a> ConlluFeatures<'a> {
    pub fn borrowed(features: &'a Features) -> Self {
        ConlluFeatures(Cow::Borrowed(features))
    }

    pub fn into_owned(self) -> Features {
        self.0.into_owned()
    }
}

impl ConlluFeatures<'static> {
    pub fn owned(features: Features) -> Self {
        ConlluFeatures(Cow::Owned(features))
    }

    fn parse_features(feature_string: impl AsRef<str>) -> Result<Self, ParseError> {
        let feature_string = feature_string.as_ref();

        if feature_string == EMPTY_TOKEN {
            return Ok(ConlluFeatures::owned(Features::new()));
        }

        let mut features = Features::new();

        for fv in feature_string.split('|') {
            let incorrect = || ParseError::IncorrectFeatureField {
                value: fv.to_owned(),
            };

            let (feature, values) = match fv.split('=').collect::<Vec<_>>().as_slice() {
                &[feature, values] => (feature, values),
                _ => return Err(incorrect()),
            };
            if feature.is_empty() || values.is_empty() {
                return Err(incorrect());
            }

            for value in values.split(',') {
                if value.is_empty() {
                    return Err(incorrect());
                }

                features.insert(feature, value);
            }
        }

        Ok(ConlluFeatures::owned(features))
    }
}

impl<'a> Deref for ConlluFeatures<'a> {
    type Target = Features;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> fmt::Display for ConlluFeatures<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "{}", EMPTY_TOKEN)
        } else {
            let features_str = self
                .0
                .iter()
                .map(|(k, v)| format!("{}={}", k, v.iter().join(",")))
                .join("|");
            write!(f, "{}", features_str)
        }
    }
}

impl TryFrom<&str> for ConlluFeatures<'static> {
    type Error = ParseError;

    fn try_from(feature_string: &str) -> Result<Self, Self::Error> {
        Self::parse_features(feature_string)
    }
}

/// CoNLL-U representation of a single word, without line terminator.
pub struct ConlluWord<'a>(pub &'a WordRecord);

impl<'a> fmt::Display for ConlluWord<'a> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let word = self.0;

        write!(
            fmt,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            word.id(),
            word.form(),
            word.lemma(),
            word.upos(),
            word.xpos(),
            ConlluFeatures::borrowed(word.features()),
            word.head()
                .map(|head| Cow::Owned(head.to_string()))
                .unwrap_or(Cow::Borrowed(EMPTY_TOKEN)),
            word.deprel(),
            word.deps(),
            word.misc()
        )
    }
}

/// CoNLL-U representation of a sentence.
///
/// Every word is written on its own line and the sentence is terminated
/// by an empty line.
pub struct ConlluSentence<'a>(pub &'a [WordRecord]);

impl<'a> fmt::Display for ConlluSentence<'a> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        for word in self.0 {
            writeln!(fmt, "{}", ConlluWord(word))?;
        }

        writeln!(fmt)
    }
}

/// Format a word as a CoNLL-U line, excluding the line terminator.
pub fn format_word(word: &WordRecord) -> String {
    ConlluWord(word).to_string()
}

/// Format a sentence as CoNLL-U lines, including the empty line that
/// terminates the sentence.
pub fn format_sentence(words: &[WordRecord]) -> String {
    ConlluSentence(words).to_string()
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;
    use std::iter::FromIterator;

    use depgraph::token::{Features, WordBuilder, WordId, WordRecord};
    use maplit::btreeset;

    use super::{format_sentence, format_word, ConlluFeatures};
    use crate::error::ParseError;

    #[test]
    fn features_from_iter_as_string() {
        let features = Features::from_iter(vec![
            ("feature2", "y"),
            ("feature1", "x"),
            ("feature2", "a"),
        ]);
        let features_string = ConlluFeatures::borrowed(&features).to_string();

        assert_eq!(features_string, "feature1=x|feature2=a,y");

        assert_eq!(ConlluFeatures::owned(Features::new()).to_string(), "_");
    }

    #[test]
    fn features_with_multiple_values() {
        let features = ConlluFeatures::try_from("PronType=Rel,Int|Case=Nom").unwrap();
        assert_eq!(
            features.get("PronType").unwrap(),
            &btreeset! { "Int".to_string(), "Rel".to_string() }
        );
        assert_eq!(features.to_string(), "Case=Nom|PronType=Int,Rel");
    }

    #[test]
    fn features_with_equals_in_value() {
        assert_eq!(
            ConlluFeatures::try_from("Some=feature=with|additional=equals"),
            Err(ParseError::IncorrectFeatureField {
                value: "Some=feature=with".to_string()
            })
        );
        assert_eq!(
            ConlluFeatures::try_from("a=b|c=="),
            Err(ParseError::IncorrectFeatureField {
                value: "c==".to_string()
            })
        );
    }

    #[test]
    fn feature_without_value_results_in_error() {
        assert_eq!(
            ConlluFeatures::try_from("c=d|a"),
            Err(ParseError::IncorrectFeatureField {
                value: "a".to_string()
            })
        );
        assert_eq!(
            ConlluFeatures::try_from("a="),
            Err(ParseError::IncorrectFeatureField {
                value: "a=".to_string()
            })
        );
        assert_eq!(
            ConlluFeatures::try_from("=b"),
            Err(ParseError::IncorrectFeatureField {
                value: "=b".to_string()
            })
        );
        assert!(ConlluFeatures::try_from("a=b,,c").is_err());
    }

    #[test]
    fn parse_empty_features() {
        assert_eq!(
            ConlluFeatures::try_from("_").unwrap().into_owned(),
            Features::new()
        );
    }

    #[test]
    fn format_words() {
        let word: WordRecord = WordBuilder::new(WordId::Token(1), "The")
            .lemma("the")
            .upos("DET")
            .features(ConlluFeatures::try_from("PronType=Art|Definite=Def").unwrap().into_owned())
            .head(Some(2))
            .deprel("det")
            .into();
        assert_eq!(
            format_word(&word),
            "1\tThe\tthe\tDET\t_\tDefinite=Def|PronType=Art\t2\tdet\t_\t_"
        );

        let span: WordRecord = WordBuilder::new(WordId::Multiword(3, 4), "gonna").into();
        assert_eq!(format_word(&span), "3-4\tgonna\t_\t_\t_\t_\t_\t_\t_\t_");
    }

    #[test]
    fn format_sentence_ends_with_empty_line() {
        let words: Vec<WordRecord> = vec![
            WordBuilder::new(WordId::Token(1), "Hi").head(Some(0)).deprel("root").into(),
            WordBuilder::new(WordId::Token(2), "!").head(Some(1)).deprel("punct").into(),
        ];

        assert_eq!(
            format_sentence(&words),
            "1\tHi\t_\t_\t_\t_\t0\troot\t_\t_\n2\t!\t_\t_\t_\t_\t1\tpunct\t_\t_\n\n"
        );
        assert_eq!(format_sentence(&[]), "\n");
    }
}
