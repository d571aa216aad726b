pub mod estimator;
pub mod lattice;
pub mod model;
pub mod tagger;

/// Sentence-boundary pseudo-tag. Only ever used as the previous tag of the
/// first item of a sentence.
pub const BOUNDARY: &str = "<s>";

/// Tag id of [`BOUNDARY`] in every model.
pub const BOS: usize = 0;
