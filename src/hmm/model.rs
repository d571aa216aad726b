use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    quark::{Quark, StringTable},
};

use super::{estimator::Estimator, BOS, BOUNDARY};
use crate::corpus::Corpus;

/// Trained bigram HMM. Built once from a corpus and read-only afterwards.
///
/// Tag ids follow first-seen order in the training data with the boundary
/// tag fixed at id [`BOS`]. Missing table entries mean "never observed" and
/// read back as probability 0.
#[derive(Debug, Clone, PartialEq)]
pub struct HmmModel {
    pub(crate) tags: Quark,
    pub(crate) words: Quark,
    /// Indexed by tag id.
    pub(crate) freq: Vec<u64>,
    /// (prev, cur) -> P(cur | prev)
    pub(crate) bigram: HashMap<(usize, usize), f64>,
    /// (tag, word) -> P(word | tag)
    pub(crate) lexical: HashMap<(usize, usize), f64>,
}

impl HmmModel {
    pub fn train(corpus: &Corpus) -> Self {
        let mut estimator = Estimator::new();
        for seq in &corpus.sentences {
            estimator.add(seq);
        }
        estimator.finish()
    }

    /// Trains directly from raw corpus lines.
    pub fn from_lines<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self::train(&Corpus::parse_lines(lines)?))
    }

    pub fn tags(&self) -> &Quark {
        &self.tags
    }

    pub fn words(&self) -> &Quark {
        &self.words
    }

    /// Number of tags including the boundary tag.
    pub fn num_tags(&self) -> usize {
        self.tags.len()
    }

    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    pub fn frequency(&self, tag: &str) -> u64 {
        self.tags.to_id(tag).map_or(0, |t| self.freq[t])
    }

    pub fn bigram(&self, prev: &str, cur: &str) -> f64 {
        match (self.tags.to_id(prev), self.tags.to_id(cur)) {
            (Some(i), Some(j)) => self.transition(i, j),
            _ => 0.0,
        }
    }

    pub fn lexical(&self, tag: &str, word: &str) -> f64 {
        match self.tags.to_id(tag) {
            Some(t) => self.emission(t, self.words.to_id(word)),
            None => 0.0,
        }
    }

    #[inline]
    pub(crate) fn transition(&self, prev: usize, cur: usize) -> f64 {
        self.bigram.get(&(prev, cur)).copied().unwrap_or(0.0)
    }

    /// `word` is `None` for words never seen in training.
    #[inline]
    pub(crate) fn emission(&self, tag: usize, word: Option<usize>) -> f64 {
        match word {
            Some(w) => self.lexical.get(&(tag, w)).copied().unwrap_or(0.0),
            None => 0.0,
        }
    }

    /// Number of training tokens, i.e. occurrences of non-boundary tags.
    pub fn num_items(&self) -> u64 {
        self.freq.iter().skip(BOS + 1).sum()
    }

    /// Tag emitting the most distinct words, the mark of an open word class.
    /// Ties go to the more frequent tag, then to the first seen.
    pub fn open_class_tag(&self) -> Option<&str> {
        let mut types = vec![0usize; self.num_tags()];
        for &(t, _) in self.lexical.keys() {
            types[t] += 1;
        }
        let mut best: Option<(usize, (usize, u64))> = None;
        for t in BOS + 1..self.num_tags() {
            let key = (types[t], self.freq[t]);
            if best.map_or(true, |(_, k)| key > k) {
                best = Some((t, key));
            }
        }
        best.and_then(|(t, _)| self.tags.to_str(t))
    }

    /// Most frequent non-boundary tag; the first seen wins a tie.
    pub fn most_frequent_tag(&self) -> Option<&str> {
        let mut best: Option<(usize, u64)> = None;
        for (t, &n) in self.freq.iter().enumerate().skip(BOS + 1) {
            if best.map_or(true, |(_, m)| n > m) {
                best = Some((t, n));
            }
        }
        best.and_then(|(t, _)| self.tags.to_str(t))
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, &ModelFile::from(self))?;
        Ok(())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let file: ModelFile = serde_json::from_reader(reader)?;
        Self::from_file(file)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        self.to_writer(&mut w)?;
        w.flush()?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }
}

/// On-disk JSON layout. Entries are sorted by id so the output is stable.
#[derive(Debug, Serialize, Deserialize)]
struct ModelFile {
    tags: Quark,
    words: Quark,
    frequencies: Vec<u64>,
    bigrams: Vec<(usize, usize, f64)>,
    lexicon: Vec<(usize, usize, f64)>,
}

impl From<&HmmModel> for ModelFile {
    fn from(m: &HmmModel) -> Self {
        let mut bigrams: Vec<_> = m.bigram.iter().map(|(&(i, j), &p)| (i, j, p)).collect();
        bigrams.sort_by_key(|&(i, j, _)| (i, j));
        let mut lexicon: Vec<_> = m.lexical.iter().map(|(&(t, w), &p)| (t, w, p)).collect();
        lexicon.sort_by_key(|&(t, w, _)| (t, w));
        Self { tags: m.tags.clone(), words: m.words.clone(), frequencies: m.freq.clone(), bigrams, lexicon }
    }
}

impl HmmModel {
    #[allow(non_snake_case)]
    fn from_file(f: ModelFile) -> Result<Self> {
        let L = f.tags.len();
        let W = f.words.len();
        if !f.tags.is_consistent() || !f.words.is_consistent() {
            return Err(Error::invalid_model("duplicate tag or word"));
        }
        if f.tags.to_id(BOUNDARY) != Some(BOS) {
            return Err(Error::invalid_model(format!("boundary tag {BOUNDARY} must have id {BOS}")));
        }
        if f.frequencies.len() != L {
            return Err(Error::invalid_model(format!("{} frequencies for {} tags", f.frequencies.len(), L)));
        }
        let check = |p: f64| p > 0.0 && p <= 1.0;
        let mut bigram = HashMap::with_capacity(f.bigrams.len());
        for (i, j, p) in f.bigrams {
            if i >= L || j >= L || j == BOS || !check(p) || f.frequencies[i] == 0 {
                return Err(Error::invalid_model(format!("bad bigram entry ({i}, {j}, {p})")));
            }
            bigram.insert((i, j), p);
        }
        let mut lexical = HashMap::with_capacity(f.lexicon.len());
        for (t, w, p) in f.lexicon {
            if t >= L || t == BOS || w >= W || !check(p) || f.frequencies[t] == 0 {
                return Err(Error::invalid_model(format!("bad lexical entry ({t}, {w}, {p})")));
            }
            lexical.insert((t, w), p);
        }
        Ok(Self { tags: f.tags, words: f.words, freq: f.frequencies, bigram, lexical })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> HmmModel {
        HmmModel::from_lines(["the/DT dog/NN runs/VB", "a/DT dog/NN barks/VB|VBZ"]).unwrap()
    }

    #[test]
    fn lookups_default_to_zero() {
        let m = model();
        assert_eq!(m.bigram("VB", "DT"), 0.0);
        assert_eq!(m.bigram("XX", "DT"), 0.0);
        assert_eq!(m.lexical("NN", "cat"), 0.0);
        assert_eq!(m.lexical("XX", "dog"), 0.0);
        assert_eq!(m.frequency("XX"), 0);
    }

    #[test]
    fn most_frequent_tag() {
        let m = HmmModel::from_lines(["a/DT b/NN c/NN d/VB e/VB"]).unwrap();
        // NN and VB tie; NN was seen first.
        assert_eq!(m.most_frequent_tag(), Some("NN"));
        assert_eq!(HmmModel::train(&Corpus::default()).most_frequent_tag(), None);
    }

    #[test]
    fn open_class_tag() {
        let m = HmmModel::from_lines(["the/DT dog/NN", "the/DT cat/NN", "the/DT man/NN", "the/DT runs/VB"]).unwrap();
        assert_eq!(m.num_items(), 8);
        assert_eq!(m.most_frequent_tag(), Some("DT"));
        assert_eq!(m.open_class_tag(), Some("NN"));
        // NN and VB both emit two words; NN occurs more often
        let m = HmmModel::from_lines(["a/DT b/VB c/NN d/NN c/NN e/VB"]).unwrap();
        assert_eq!(m.open_class_tag(), Some("NN"));
        assert_eq!(HmmModel::train(&Corpus::default()).open_class_tag(), None);
    }

    #[test]
    fn json_round_trip() {
        let m = model();
        let mut buf = Vec::new();
        m.to_writer(&mut buf).unwrap();
        let back = HmmModel::from_reader(buf.as_slice()).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn json_rejects_unknown_ids() {
        let json = r#"{"tags":["<s>","NN"],"words":["dog"],"frequencies":[1,1],"bigrams":[[0,5,1.0]],"lexicon":[]}"#;
        assert!(matches!(HmmModel::from_reader(json.as_bytes()), Err(Error::InvalidModel(_))));
        let json = r#"{"tags":["NN","<s>"],"words":[],"frequencies":[1,1],"bigrams":[],"lexicon":[]}"#;
        assert!(matches!(HmmModel::from_reader(json.as_bytes()), Err(Error::InvalidModel(_))));
        let json = r#"{"tags":["<s>","NN"],"words":["dog"],"frequencies":[1,1],"bigrams":[],"lexicon":[[1,0,1.5]]}"#;
        assert!(matches!(HmmModel::from_reader(json.as_bytes()), Err(Error::InvalidModel(_))));
    }
}
