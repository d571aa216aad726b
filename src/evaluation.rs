use std::fmt::{self, Display};

use crate::{
    error::{Error, Result},
    quark::{Quark, StringTable, TextVectorizer},
};

/// Label-wise counts.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LabelMeasure {
    /// Number of correct predictions.
    pub num_correct: usize,
    /// Number of occurrences of the label in the reference data.
    pub num_observation: usize,
    /// Number of predictions.
    pub num_prediction: usize,
}

impl LabelMeasure {
    pub fn precision(&self) -> f64 {
        if self.num_prediction > 0 {
            self.num_correct as f64 / self.num_prediction as f64
        } else {
            0.0
        }
    }

    pub fn recall(&self) -> f64 {
        if self.num_observation > 0 {
            self.num_correct as f64 / self.num_observation as f64
        } else {
            0.0
        }
    }

    pub fn fmeasure(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r > 0.0 {
            p * r * 2.0 / (p + r)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimation {
    pub precision: f64,
    pub recall: f64,
    pub fmeasure: f64,
}

/// Running comparison of predicted tags against reference tags.
#[derive(Debug, Default, Clone)]
pub struct Evaluation {
    labels: Quark,
    tbl: Vec<LabelMeasure>,
    /// Number of correctly predicted items.
    item_total_correct: usize,
    /// Total number of items.
    item_total_num: usize,
    /// Number of sentences predicted without a single error.
    inst_total_correct: usize,
    /// Total number of sentences.
    inst_total_num: usize,
}

impl Evaluation {
    fn measure(&mut self, label: &str) -> &mut LabelMeasure {
        let id = self.labels.find_or_insert(label);
        if id == self.tbl.len() {
            self.tbl.push(LabelMeasure::default());
        }
        &mut self.tbl[id]
    }

    /// Scores one sentence and returns the number of matching positions.
    /// Nothing is recorded when the lengths differ.
    pub fn accumulate<R, P>(&mut self, reference: &[R], prediction: &[P]) -> Result<usize>
    where
        R: AsRef<str>,
        P: AsRef<str>,
    {
        if reference.len() != prediction.len() {
            return Err(Error::LengthMismatch { expected: reference.len(), actual: prediction.len() });
        }
        let mut matched = 0;
        for (r, p) in reference.iter().zip(prediction) {
            let (r, p) = (r.as_ref(), p.as_ref());
            self.measure(r).num_observation += 1;
            self.measure(p).num_prediction += 1;
            if r == p {
                self.measure(r).num_correct += 1;
                matched += 1;
            }
        }
        self.item_total_correct += matched;
        self.item_total_num += reference.len();
        if matched == reference.len() {
            self.inst_total_correct += 1;
        }
        self.inst_total_num += 1;
        Ok(matched)
    }

    /// Adds the counts of `other`, e.g. from another decoding worker.
    pub fn merge(&mut self, other: &Evaluation) {
        for (label, m) in other.labels.iter().zip(&other.tbl) {
            let dst = self.measure(label);
            dst.num_correct += m.num_correct;
            dst.num_observation += m.num_observation;
            dst.num_prediction += m.num_prediction;
        }
        self.item_total_correct += other.item_total_correct;
        self.item_total_num += other.item_total_num;
        self.inst_total_correct += other.inst_total_correct;
        self.inst_total_num += other.inst_total_num;
    }

    pub fn correct(&self) -> usize {
        self.item_total_correct
    }

    pub fn total(&self) -> usize {
        self.item_total_num
    }

    pub fn num_sentences(&self) -> usize {
        self.inst_total_num
    }

    /// Item-level accuracy, `None` until at least one item was scored.
    pub fn accuracy(&self) -> Option<f64> {
        if self.item_total_num == 0 {
            return None;
        }
        Some(self.item_total_correct as f64 / self.item_total_num as f64)
    }

    /// Sentence-level accuracy.
    pub fn instance_accuracy(&self) -> Option<f64> {
        if self.inst_total_num == 0 {
            return None;
        }
        Some(self.inst_total_correct as f64 / self.inst_total_num as f64)
    }

    pub fn label(&self, label: &str) -> Option<&LabelMeasure> {
        self.labels.to_id(label).map(|i| &self.tbl[i])
    }

    /// Macro-averaged precision, recall and F1 over the labels that occur in
    /// the reference data.
    pub fn macro_average(&self) -> Option<Estimation> {
        let observed: Vec<_> = self.tbl.iter().filter(|m| m.num_observation > 0).collect();
        if observed.is_empty() {
            return None;
        }
        let n = observed.len() as f64;
        Some(Estimation {
            precision: observed.iter().map(|m| m.precision()).sum::<f64>() / n,
            recall: observed.iter().map(|m| m.recall()).sum::<f64>() / n,
            fmeasure: observed.iter().map(|m| m.fmeasure()).sum::<f64>() / n,
        })
    }

    /// Per-label table in the order labels were first encountered.
    pub fn report(&self) -> Report<'_> {
        Report(self)
    }
}

impl Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.accuracy() {
            Some(accuracy) => write!(f, "Accuracy: {}", accuracy),
            None => write!(f, "Accuracy not calculated yet"),
        }
    }
}

pub struct Report<'a>(&'a Evaluation);

impl Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ev = self.0;
        writeln!(f, "Performance by label (#match, #model, #ref) (precision, recall, F1):")?;
        for (label, lev) in ev.labels.iter().zip(&ev.tbl) {
            if lev.num_observation == 0 {
                writeln!(f, "\t{}: ({}, {}, {}) (******, ******, ******)", label, lev.num_correct, lev.num_prediction, lev.num_observation)?;
            } else {
                writeln!(
                    f,
                    "\t{}: ({}, {}, {}) ({:.4}, {:.4}, {:.4})",
                    label,
                    lev.num_correct,
                    lev.num_prediction,
                    lev.num_observation,
                    lev.precision(),
                    lev.recall(),
                    lev.fmeasure()
                )?;
            }
        }
        if let Some(est) = ev.macro_average() {
            writeln!(f, "Macro-average precision, recall, F1: ({:.4}, {:.4}, {:.4})", est.precision, est.recall, est.fmeasure)?;
        }
        if let Some(acc) = ev.accuracy() {
            writeln!(f, "Item accuracy: {}/{} => {:.4}", ev.item_total_correct, ev.item_total_num, acc)?;
        }
        if let Some(acc) = ev.instance_accuracy() {
            writeln!(f, "Sequence accuracy: {}/{} => {:.4}", ev.inst_total_correct, ev.inst_total_num, acc)?;
        }
        Ok(())
    }
}
