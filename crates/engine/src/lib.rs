//! # Insights Engine
//!
//! Offline ranking of feature pairs by information gain.
//!
//! ## Architecture
//!
//! ```text
//! Realm
//!     │
//!     ├──> FeatureIndex (dense ids, sorted by name)
//!     │
//!     ├──> PairCounts (one pass over sessions)
//!     │      ├─ C[f]        sessions having feature f
//!     │      └─ CC[i][j]    {--, -+, +-, ++} in a flat F*F*4 buffer
//!     │
//!     ├──> EntropyScorer (smoothed, extensive bits)
//!     │      └─ gain = E[i] + E[j] - EE[i][j]
//!     │
//!     └──> InsightRanker
//!            ├─ keep pairs with gain > threshold
//!            └─ emit MutualInformation insights (Corpus) or TSV
//! ```

mod config;
mod counter;
mod entropy;
mod error;
mod index;
mod ranker;

pub use config::{EngineConfig, RankOrder};
pub use counter::{PairCounts, BUCKETS};
pub use entropy::{entropy, EntropyScorer, EPS};
pub use error::{EngineError, Result};
pub use index::FeatureIndex;
pub use ranker::{write_tsv, Candidate, InsightRanker, RankedRealm};

use insights_protocol::InsightsInput;

/// Ranks every realm of an input document, in input order.
pub fn rank_all(input: &InsightsInput, config: EngineConfig) -> Result<Vec<RankedRealm>> {
    let ranker = InsightRanker::new(config)?;
    input.realms.iter().map(|realm| ranker.rank(realm)).collect()
}
