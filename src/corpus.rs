use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

use crate::error::{Error, Result};

/// One `word/tag` observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Surface form as written in the corpus.
    pub form: String,
    /// Case-folded form used for training and decoding.
    pub word: String,
    /// Primary tag with any `|` sub-tag removed. Ground truth in test data.
    pub tag: String,
}

impl Token {
    /// Parses `word/tag` or `word/tag|subtag`. The split happens at the last `/`.
    pub fn parse(s: &str) -> Option<Self> {
        let (form, tag) = s.rsplit_once('/')?;
        let tag = match tag.split_once('|') {
            Some((primary, _)) => primary,
            None => tag,
        };
        if form.is_empty() || tag.is_empty() {
            return None;
        }
        Some(Self { form: form.to_string(), word: form.to_lowercase(), tag: tag.to_string() })
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub tokens: Vec<Token>,
}

impl Sentence {
    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn words(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.word.as_str()).collect()
    }

    pub fn tags(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.tag.as_str()).collect()
    }

    /// Parses one corpus line. `lineno` is only used for error reporting.
    pub fn parse_line(line: &str, lineno: usize) -> Result<Self> {
        let mut seq = Sentence::default();
        for s in line.split_whitespace() {
            let token = Token::parse(s).ok_or_else(|| Error::MalformedToken { line: lineno, token: s.to_string() })?;
            seq.push(token);
        }
        Ok(seq)
    }
}

/// Sentences in corpus order, one per non-blank line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Corpus {
    pub sentences: Vec<Sentence>,
}

impl Corpus {
    pub fn parse_lines<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut corpus = Corpus::default();
        for (i, line) in lines.into_iter().enumerate() {
            let seq = Sentence::parse_line(line.as_ref(), i + 1)?;
            if !seq.is_empty() {
                corpus.sentences.push(seq);
            }
        }
        Ok(corpus)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut corpus = Corpus::default();
        for (i, line) in BufReader::new(reader).lines().enumerate() {
            let seq = Sentence::parse_line(&line?, i + 1)?;
            if !seq.is_empty() {
                corpus.sentences.push(seq);
            }
        }
        Ok(corpus)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::try_from(File::open(path)?)
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn max_length(&self) -> usize {
        self.sentences.iter().map(|x| x.len()).max().unwrap_or_default()
    }

    pub fn total_items(&self) -> usize {
        self.sentences.iter().map(|x| x.len()).sum()
    }
}

impl TryFrom<File> for Corpus {
    type Error = Error;

    fn try_from(value: File) -> Result<Self> {
        Self::from_reader(value)
    }
}
