use crate::quark::StringTable;

use super::{
    lattice::{cost, Lattice},
    model::HmmModel,
    BOS,
};

pub trait Tagger {
    /// Writes the best tag id sequence for `words` into `labels` and returns
    /// its cost, or `None` when `words` is empty.
    fn viterbi(&mut self, words: &[&str], labels: &mut Vec<usize>) -> Option<f64>;
    /// Name of tag id `id` as produced by [`Tagger::viterbi`].
    fn label(&self, id: usize) -> &str;
    /// Cost of tagging `words` with `path`, `None` if the path uses an
    /// unseen transition or emission.
    fn score(&self, words: &[&str], path: &[usize]) -> Option<f64>;

    fn tag(&mut self, words: &[&str]) -> Vec<String> {
        let mut labels = Vec::with_capacity(words.len());
        self.viterbi(words, &mut labels);
        labels.iter().map(|&i| self.label(i).to_string()).collect()
    }
}

/// Tag used for positions where no trained tag is viable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultTag {
    /// Always this tag, even if training never produced it.
    Fixed(String),
    /// The most frequent tag of the trained model.
    MostFrequent,
    /// The trained tag with the largest vocabulary, see [`HmmModel::open_class_tag`].
    OpenClass,
}

impl Default for DefaultTag {
    fn default() -> Self {
        Self::Fixed(DEFAULT_TAG.to_string())
    }
}

pub const DEFAULT_TAG: &str = "NN";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggerConfig {
    pub default_tag: DefaultTag,
}

/// Viterbi tagger over a borrowed [`HmmModel`]. Each tagger owns its own
/// lattice, so any number of them may decode against one model at once.
pub struct HmmTagger<'a> {
    model: &'a HmmModel,
    /// Tag id of the fallback tag; equals `model.num_tags()` when the tag is
    /// not part of the model.
    fallback: usize,
    fallback_tag: String,
    lattice: Lattice,
    word_ids: Vec<Option<usize>>,
}

impl<'a> HmmTagger<'a> {
    #[allow(non_snake_case)]
    pub fn new(model: &'a HmmModel, config: &TaggerConfig) -> Self {
        let L = model.num_tags();
        let name = match &config.default_tag {
            DefaultTag::Fixed(tag) => tag.as_str(),
            DefaultTag::MostFrequent => model.most_frequent_tag().unwrap_or(DEFAULT_TAG),
            DefaultTag::OpenClass => model.open_class_tag().unwrap_or(DEFAULT_TAG),
        };
        let fallback = match model.tags.to_id(name) {
            Some(id) if id != BOS => id,
            _ => {
                if L > 1 {
                    log::warn!("default tag {name} is not a trained tag");
                }
                L
            }
        };
        let width = if fallback == L { L + 1 } else { L };
        log::info!("tagger (L: {L}, W: {}, fallback: {name})", model.num_words());
        Self { model, fallback, fallback_tag: name.to_string(), lattice: Lattice::new(width), word_ids: Vec::new() }
    }

    pub fn model(&self) -> &HmmModel {
        self.model
    }

    pub fn fallback_tag(&self) -> &str {
        &self.fallback_tag
    }

    fn word_id(&self, word: &str) -> Option<usize> {
        self.model.words.to_id(&word.to_lowercase())
    }
}

impl<'a> Tagger for HmmTagger<'a> {
    fn viterbi(&mut self, words: &[&str], labels: &mut Vec<usize>) -> Option<f64> {
        let mut ids = std::mem::take(&mut self.word_ids);
        ids.clear();
        ids.extend(words.iter().map(|w| self.word_id(w)));
        let c = self.lattice.viterbi(self.model, &ids, self.fallback, labels);
        self.word_ids = ids;
        c
    }

    fn label(&self, id: usize) -> &str {
        if id == self.fallback {
            return &self.fallback_tag;
        }
        self.model.tags.to_str(id).unwrap_or(&self.fallback_tag)
    }

    fn score(&self, words: &[&str], path: &[usize]) -> Option<f64> {
        if words.len() != path.len() {
            return None;
        }
        let mut prev = BOS;
        let mut r = 0.0;
        for (w, &j) in words.iter().zip(path) {
            let tr = self.model.transition(prev, j);
            let e = self.model.emission(j, self.word_id(w));
            if tr <= 0.0 || e <= 0.0 {
                return None;
            }
            r += cost(tr) + cost(e);
            prev = j;
        }
        Some(r)
    }
}
