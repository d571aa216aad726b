use std::io::Write;

use crate::{
    corpus::Corpus,
    error::{Error, Result},
    evaluation::Evaluation,
    hmm::tagger::Tagger,
};

/// Receives decoding results.
pub trait TagSink {
    /// One decoded sentence as (surface form, predicted tag) pairs in order.
    fn sentence(&mut self, tagged: &[(&str, &str)]) -> Result<()>;
    /// Called once after the last sentence.
    fn finish(&mut self, evaluation: &Evaluation) -> Result<()>;
}

/// Writes `form/TAG` tokens, one sentence per line, then the accuracy line.
pub struct WriterSink<W: Write> {
    writer: W,
    quiet: bool,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, quiet: false }
    }

    /// Only the accuracy line is written.
    pub fn quiet(writer: W) -> Self {
        Self { writer, quiet: true }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TagSink for WriterSink<W> {
    fn sentence(&mut self, tagged: &[(&str, &str)]) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        for (i, (form, tag)) in tagged.iter().enumerate() {
            if i > 0 {
                self.writer.write_all(b" ")?;
            }
            write!(self.writer, "{}/{}", form, tag)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn finish(&mut self, evaluation: &Evaluation) -> Result<()> {
        writeln!(self.writer, "{}", evaluation)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Decodes every sentence of `corpus`, scores it against the corpus tags and
/// hands the result to `sink`. A sentence whose prediction has the wrong
/// length is written out but left unscored.
pub fn tag_corpus<T: Tagger, S: TagSink>(tagger: &mut T, corpus: &Corpus, sink: &mut S) -> Result<Evaluation> {
    let mut evaluation = Evaluation::default();
    let mut labels = Vec::with_capacity(corpus.max_length());
    for (n, seq) in corpus.sentences.iter().enumerate() {
        let words = seq.words();
        tagger.viterbi(&words, &mut labels);
        let prediction: Vec<&str> = labels.iter().map(|&i| tagger.label(i)).collect();
        match evaluation.accumulate(&seq.tags(), &prediction) {
            Ok(_) => {}
            Err(Error::LengthMismatch { expected, actual }) => {
                log::warn!("sentence #{n}: {actual} tags predicted for {expected} words, not scored");
            }
            Err(e) => return Err(e),
        }
        let tagged: Vec<(&str, &str)> = seq.tokens.iter().map(|t| t.form.as_str()).zip(prediction.iter().copied()).collect();
        sink.sentence(&tagged)?;
    }
    log::info!("tagged {} sentences, {} items", evaluation.num_sentences(), evaluation.total());
    sink.finish(&evaluation)?;
    Ok(evaluation)
}
