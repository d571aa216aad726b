use std::{collections::HashMap, time::Instant};

use crate::{
    corpus::Sentence,
    quark::{Quark, StringTable, TextVectorizer},
};

use super::{model::HmmModel, BOS, BOUNDARY};

/// Accumulates tag, tag-bigram and (tag, word) counts over training
/// sentences and normalizes them into an [`HmmModel`].
#[derive(Debug)]
pub struct Estimator {
    tags: Quark,
    words: Quark,
    freq: Vec<u64>,
    bigram: HashMap<(usize, usize), u64>,
    lexical: HashMap<(usize, usize), u64>,
    num_sentences: usize,
    begin: Instant,
}

impl Default for Estimator {
    fn default() -> Self {
        Self::new()
    }
}

impl Estimator {
    pub fn new() -> Self {
        let mut tags = Quark::default();
        let bos = tags.find_or_insert(BOUNDARY);
        debug_assert_eq!(bos, BOS);
        Self {
            tags,
            words: Quark::default(),
            freq: vec![0],
            bigram: HashMap::new(),
            lexical: HashMap::new(),
            num_sentences: 0,
            begin: Instant::now(),
        }
    }

    fn tag_id(&mut self, tag: &str) -> usize {
        let t = self.tags.find_or_insert(tag);
        if t == self.freq.len() {
            self.freq.push(0);
        }
        t
    }

    /// Counts one sentence. Empty sentences are ignored.
    pub fn add(&mut self, seq: &Sentence) {
        if seq.is_empty() {
            return;
        }
        self.num_sentences += 1;
        self.freq[BOS] += 1;

        /* The first tag of a sentence follows the boundary tag. */
        let mut prev = BOS;
        for token in &seq.tokens {
            let cur = self.tag_id(&token.tag);
            let w = self.words.find_or_insert(&token.word);
            self.freq[cur] += 1;
            *self.bigram.entry((prev, cur)).or_default() += 1;
            *self.lexical.entry((cur, w)).or_default() += 1;
            prev = cur;
        }
    }

    pub fn num_sentences(&self) -> usize {
        self.num_sentences
    }

    /// Normalizes every count by the frequency of its conditioning tag.
    pub fn finish(self) -> HmmModel {
        let freq = self.freq;
        let bigram: HashMap<_, _> = self
            .bigram
            .into_iter()
            .map(|((i, j), n)| ((i, j), n as f64 / freq[i] as f64))
            .collect();
        let lexical: HashMap<_, _> = self
            .lexical
            .into_iter()
            .map(|((t, w), n)| ((t, w), n as f64 / freq[t] as f64))
            .collect();
        log::info!(
            "trained (N: {}, L: {}, W: {}, bigrams: {}, lexical: {}), time cost: {:?}",
            self.num_sentences,
            self.tags.len(),
            self.words.len(),
            bigram.len(),
            lexical.len(),
            self.begin.elapsed()
        );
        HmmModel { tags: self.tags, words: self.words, freq, bigram, lexical }
    }
}
