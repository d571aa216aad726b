use super::{model::HmmModel, BOS};

/// Cost of a probability: `-log2(p)`. Lower is better.
#[inline]
pub(crate) fn cost(p: f64) -> f64 {
    -p.log2()
}

/// One viable (position, tag) node of the lattice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    /// Best predecessor tag at the previous position. `None` at position 0,
    /// where the predecessor is the boundary tag.
    pub prev: Option<usize>,
    pub tag: usize,
    /// Cumulative path cost in bits.
    pub cost: f64,
}

/// Arena of cells laid out as a [T][width] matrix. A `None` slot is a
/// non-viable (position, tag) pair.
#[derive(Debug, Default)]
pub(crate) struct Lattice {
    num_items: usize,
    width: usize,
    cells: Vec<Option<Cell>>,
}

impl Lattice {
    pub fn new(width: usize) -> Self {
        Self { num_items: 0, width, cells: Vec::new() }
    }

    /// Clears the lattice for a sentence of `T` items.
    #[allow(non_snake_case)]
    pub fn reset(&mut self, T: usize) {
        self.num_items = T;
        self.cells.clear();
        self.cells.resize(T * self.width, None);
    }

    #[inline]
    pub fn get(&self, t: usize, j: usize) -> Option<&Cell> {
        self.cells[self.width * t + j].as_ref()
    }

    #[inline]
    fn set(&mut self, t: usize, cell: Cell) {
        self.cells[self.width * t + cell.tag] = Some(cell);
    }

    /// Minimum-cost cell at position `t`; the lowest tag id wins a tie.
    pub fn best(&self, t: usize) -> Option<&Cell> {
        let mut best: Option<&Cell> = None;
        for cell in self.cells[self.width * t..self.width * (t + 1)].iter().flatten() {
            if best.map_or(true, |b| cell.cost < b.cost) {
                best = Some(cell);
            }
        }
        best
    }

    fn viable(&self, t: usize) -> bool {
        self.cells[self.width * t..self.width * (t + 1)].iter().any(Option::is_some)
    }

    /// Fills the lattice for `words` (word ids, `None` for unseen words) and
    /// writes the minimum-cost tag sequence into `labels`.
    ///
    /// Candidate tags are the model tags `1..L`; `fallback` (which may be the
    /// extra column `L`) is used when a position ends up with no viable cell.
    /// The extra column has no bigrams of its own, so the step out of it is
    /// scored with the tag prior `freq(j) / N`.
    /// Returns the cost of the best path, or `None` for an empty sentence.
    #[allow(non_snake_case)]
    pub fn viterbi(&mut self, model: &HmmModel, words: &[Option<usize>], fallback: usize, labels: &mut Vec<usize>) -> Option<f64> {
        let T = words.len();
        let L = model.num_tags();
        let N = model.num_items() as f64;
        debug_assert!(fallback < self.width && fallback != BOS);
        self.reset(T);
        labels.clear();
        if T == 0 {
            return None;
        }

        /* Compute the costs at (0, *). */
        for j in (0..L).filter(|&j| j != BOS) {
            let e = model.emission(j, words[0]);
            let tr = model.transition(BOS, j);
            if e > 0.0 && tr > 0.0 {
                self.set(0, Cell { prev: None, tag: j, cost: cost(e * tr) });
            }
        }
        if !self.viable(0) {
            log::debug!("no viable tag at position 0, falling back to tag #{fallback}");
            self.set(0, Cell { prev: None, tag: fallback, cost: 0.0 });
        }

        /* Compute the costs at (t, *). */
        for t in 1..T {
            for j in (0..L).filter(|&j| j != BOS) {
                let e = model.emission(j, words[t]);
                if e <= 0.0 {
                    continue;
                }
                let mut min_cost = f64::INFINITY;
                let mut argmin = None;
                for i in 0..self.width {
                    /* Transit from (t-1, i) to (t, j). */
                    let prev = match self.get(t - 1, i) {
                        Some(prev) => prev,
                        None => continue,
                    };
                    let tr = if i < L { model.transition(i, j) } else { model.freq[j] as f64 / N };
                    if tr <= 0.0 {
                        continue;
                    }
                    let c = prev.cost + cost(tr);
                    if c < min_cost {
                        min_cost = c;
                        argmin = Some(i);
                    }
                }
                if argmin.is_some() {
                    self.set(t, Cell { prev: argmin, tag: j, cost: min_cost + cost(e) });
                }
            }
            if !self.viable(t) {
                log::debug!("no viable tag at position {t}, falling back to tag #{fallback}");
                let (prev, c) = match self.best(t - 1) {
                    Some(best) => (Some(best.tag), best.cost),
                    None => (None, 0.0),
                };
                self.set(t, Cell { prev, tag: fallback, cost: c });
            }
        }

        self.backtrace(labels)
    }

    /// Walks the backward links from the best final cell.
    #[allow(non_snake_case)]
    fn backtrace(&self, labels: &mut Vec<usize>) -> Option<f64> {
        let T = self.num_items;
        let last = self.best(T - 1)?;
        labels.resize(T, 0);
        labels[T - 1] = last.tag;
        for t in (1..T).rev() {
            labels[t - 1] = self.get(t, labels[t]).and_then(|c| c.prev).unwrap_or(labels[t]);
        }
        Some(last.cost)
    }
}
