use crate::counter::PairCounts;

/// Probabilities at or below this are treated as zero.
pub const EPS: f64 = 1e-8;

/// Scales natural-log entropy into the extensive "bits" unit used for ranking.
const BITS: f64 = -std::f64::consts::LN_2;

/// `p * ln(p)` for `EPS < p < 1`, zero otherwise.
///
/// Values marginally above one can come out of smoothed probabilities and are
/// treated as one.
pub fn entropy(p: f64) -> f64 {
    debug_assert!(p >= 0.0 && p <= 1.0 + EPS, "probability out of range: {p}");
    if p > EPS && p < 1.0 {
        p * p.ln()
    } else {
        0.0
    }
}

/// Smoothed, extensive entropy arithmetic over session counts.
#[derive(Debug, Clone, Copy)]
pub struct EntropyScorer {
    prior: f64,
}

impl EntropyScorer {
    pub fn new(prior: f64) -> Self {
        Self { prior }
    }

    pub fn prior(&self) -> f64 {
        self.prior
    }

    /// Whether the joint entropy must stay below the sum of marginals.
    pub fn is_exact(&self) -> bool {
        self.prior == 0.0
    }

    /// Entropy of one binary feature seen `c1` times present and `c2` times absent.
    pub fn bits2(&self, n: u64, c1: u64, c2: u64) -> f64 {
        debug_assert_eq!(c1 + c2, n);
        self.smoothed(n, &[c1, c2])
    }

    /// Entropy of a 2x2 contingency table.
    pub fn bits4(&self, n: u64, cells: [u64; 4]) -> f64 {
        debug_assert_eq!(cells.iter().sum::<u64>(), n);
        self.smoothed(n, &cells)
    }

    fn smoothed(&self, n: u64, cells: &[u64]) -> f64 {
        if n == 0 {
            return 0.0;
        }
        let n = n as f64;
        let k = 1.0 / (self.prior * cells.len() as f64 + n);
        let sum: f64 = cells
            .iter()
            .map(|&c| entropy(k * (self.prior + c as f64)))
            .sum();
        sum * BITS * n
    }

    /// `E[f]`: entropy of feature `f`'s presence indicator.
    pub fn marginal(&self, counts: &PairCounts, f: usize) -> f64 {
        let c = counts.single(f);
        self.bits2(counts.n(), c, counts.n() - c)
    }

    /// `EE[i][j]`: joint entropy of features `i` and `j`.
    pub fn joint(&self, counts: &PairCounts, i: usize, j: usize) -> f64 {
        self.bits4(counts.n(), counts.pair(i, j))
    }

    /// Information gain `E[i] + E[j] - EE[i][j]`.
    pub fn gain(&self, counts: &PairCounts, i: usize, j: usize) -> f64 {
        self.marginal(counts, i) + self.marginal(counts, j) - self.joint(counts, i, j)
    }
}

impl Default for EntropyScorer {
    fn default() -> Self {
        Self::new(0.5)
    }
}
