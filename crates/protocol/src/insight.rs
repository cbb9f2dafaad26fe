use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Contingency counters for a pair of binary features.
///
/// `lhs` and `rhs` are the marginal `+` counts; the four cells are
/// `nn = C[-][-]`, `ny = C[-][+]`, `yn = C[+][-]`, `yy = C[+][+]`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, JsonSchema)]
pub struct Counters {
    /// Total sessions.
    #[serde(rename = "N")]
    pub n: u64,
    pub lhs: u64,
    pub rhs: u64,
    pub nn: u64,
    pub ny: u64,
    pub yn: u64,
    pub yy: u64,
}

impl Counters {
    /// Builds counters from the `{--, -+, +-, ++}` buckets of a pair.
    pub fn from_buckets(n: u64, buckets: [u64; 4]) -> Self {
        let [nn, ny, yn, yy] = buckets;
        Self {
            n,
            lhs: yn + yy,
            rhs: ny + yy,
            nn,
            ny,
            yn,
            yy,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.lhs <= self.n
            && self.rhs <= self.n
            && self.nn + self.ny + self.yn + self.yy == self.n
            && self.yy + self.yn == self.lhs
            && self.yy + self.ny == self.rhs
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct MutualInformation {
    /// Information gain; the higher, the better.
    pub score: f64,
    pub lhs: String,
    pub rhs: String,
    pub counters: Counters,
}

/// A statistically notable relationship between features.
///
/// New kinds of insights are added as variants; `kind` is the wire discriminant.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(tag = "kind")]
pub enum Insight {
    MutualInformation(MutualInformation),
}

impl Insight {
    pub fn score(&self) -> f64 {
        match self {
            Insight::MutualInformation(mi) => mi.score,
        }
    }

    pub fn description(&self) -> String {
        match self {
            Insight::MutualInformation(mi) => {
                format!("Knowing '{}' tells you about '{}'", mi.lhs, mi.rhs)
            }
        }
    }

    /// Feature names the insight is about, in a stable order.
    pub fn features(&self) -> [&str; 2] {
        match self {
            Insight::MutualInformation(mi) => [mi.lhs.as_str(), mi.rhs.as_str()],
        }
    }

    pub fn counters(&self) -> Option<&Counters> {
        match self {
            Insight::MutualInformation(mi) => Some(&mi.counters),
        }
    }
}

impl From<MutualInformation> for Insight {
    fn from(value: MutualInformation) -> Self {
        Insight::MutualInformation(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn counters_from_buckets_are_consistent() {
        let counters = Counters::from_buckets(4, [0, 1, 1, 2]);
        assert_eq!(counters.lhs, 3);
        assert_eq!(counters.rhs, 3);
        assert!(counters.is_consistent());

        let broken = Counters { yy: 5, ..counters };
        assert!(!broken.is_consistent());
    }

    #[test]
    fn insight_serializes_with_kind_discriminant() {
        let insight = Insight::from(MutualInformation {
            score: 0.5,
            lhs: "a".to_string(),
            rhs: "b".to_string(),
            counters: Counters::from_buckets(2, [1, 0, 0, 1]),
        });
        let value = serde_json::to_value(&insight).unwrap();
        assert_eq!(value["kind"], "MutualInformation");
        assert_eq!(value["counters"]["N"], 2);
        assert_eq!(value["lhs"], "a");

        let back: Insight = serde_json::from_value(value).unwrap();
        assert_eq!(back.features(), ["a", "b"]);
    }
}
