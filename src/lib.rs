//! Bigram hidden Markov model part-of-speech tagger.
//!
//! Training reads `word/tag` corpus lines into three probability tables
//! (tag frequency, tag bigram, word-given-tag). Decoding runs Viterbi over
//! a per-sentence lattice in the `-log2` cost domain and falls back to a
//! default tag wherever no trained tag is viable.
//!
//! ```
//! use hmmtag::{HmmModel, HmmTagger, Tagger, TaggerConfig};
//!
//! let model = HmmModel::from_lines(["the/DT dog/NN runs/VB"]).unwrap();
//! let mut tagger = HmmTagger::new(&model, &TaggerConfig::default());
//! assert_eq!(tagger.tag(&["the", "dog", "runs"]), ["DT", "NN", "VB"]);
//! ```

pub mod corpus;
pub mod error;
pub mod evaluation;
pub mod hmm;
pub mod output;
pub mod quark;

pub use corpus::{Corpus, Sentence, Token};
pub use error::{Error, Result};
pub use evaluation::{Estimation, Evaluation, LabelMeasure};
pub use hmm::{
    estimator::Estimator,
    lattice::Cell,
    model::HmmModel,
    tagger::{DefaultTag, HmmTagger, Tagger, TaggerConfig},
    BOUNDARY,
};
pub use output::{tag_corpus, TagSink, WriterSink};
