use crate::error::{EngineError, Result};
use crate::index::FeatureIndex;
use insights_protocol::{Counters, Realm};

/// Bucket offsets within a pair cell: `{--, -+, +-, ++}`.
pub const BUCKETS: usize = 4;

/// Per-feature and per-pair occurrence counts for one realm.
///
/// Pair counts live in one flat buffer of `F * F * 4` counters, addressed as
/// `(i * F + j) * 4 + bucket` with `bucket = bi * 2 + bj`. Both `[i][j]` and
/// `[j][i]` are filled; the diagonal stays zero.
#[derive(Debug, Clone)]
pub struct PairCounts {
    n: u64,
    features: usize,
    single: Vec<u64>,
    pairs: Vec<u64>,
}

impl PairCounts {
    /// Counts a realm in one pass over its sessions.
    pub fn count(realm: &Realm, index: &FeatureIndex) -> Result<Self> {
        let f = index.feature_count();
        let mut counts = Self {
            n: realm.sessions.len() as u64,
            features: f,
            single: vec![0; f],
            pairs: vec![0; f * f * BUCKETS],
        };

        // Last session that had the feature set; a feature is present in the
        // current session iff its entry equals the session index.
        let mut last_seen = vec![usize::MAX; f];
        for (sid, session) in realm.sessions.iter().enumerate() {
            for name in &session.feature_set {
                let id = index
                    .feature_id(name)
                    .ok_or_else(|| EngineError::UnknownFeature(name.clone()))?;
                last_seen[id] = sid;
            }

            for fi in 0..f {
                let bi = usize::from(last_seen[fi] == sid);
                counts.single[fi] += bi as u64;
                for fj in fi + 1..f {
                    let bj = usize::from(last_seen[fj] == sid);
                    let bucket = bi * 2 + bj;
                    let ij = counts.offset(fi, fj, bucket);
                    let ji = counts.offset(fj, fi, bucket);
                    counts.pairs[ij] += 1;
                    counts.pairs[ji] += 1;
                }
            }
        }

        Ok(counts)
    }

    #[inline]
    fn offset(&self, i: usize, j: usize, bucket: usize) -> usize {
        (i * self.features + j) * BUCKETS + bucket
    }

    /// Number of sessions.
    pub fn n(&self) -> u64 {
        self.n
    }

    pub fn feature_count(&self) -> usize {
        self.features
    }

    /// Sessions having feature `f`.
    pub fn single(&self, f: usize) -> u64 {
        self.single[f]
    }

    /// The `{--, -+, +-, ++}` buckets of pair `(i, j)`.
    pub fn pair(&self, i: usize, j: usize) -> [u64; BUCKETS] {
        let start = self.offset(i, j, 0);
        let mut cell = [0; BUCKETS];
        cell.copy_from_slice(&self.pairs[start..start + BUCKETS]);
        cell
    }

    pub fn counters(&self, i: usize, j: usize) -> Counters {
        Counters::from_buckets(self.n, self.pair(i, j))
    }

    /// Fails on any count that cannot come from a well-formed pass.
    pub fn validate(&self) -> Result<()> {
        for f in 0..self.features {
            if self.single[f] > self.n {
                return Err(EngineError::CounterInvariant(format!(
                    "C[{f}] = {} exceeds N = {}",
                    self.single[f], self.n
                )));
            }
        }
        for i in 0..self.features {
            for j in i + 1..self.features {
                let counters = self.counters(i, j);
                if !counters.is_consistent()
                    || counters.lhs != self.single[i]
                    || counters.rhs != self.single[j]
                {
                    return Err(EngineError::CounterInvariant(format!(
                        "CC[{i}][{j}] = {:?} does not add up to N = {} with C = ({}, {})",
                        self.pair(i, j),
                        self.n,
                        self.single[i],
                        self.single[j]
                    )));
                }
            }
        }
        Ok(())
    }
}
