use crate::error::{ProtocolError, Result};
use crate::insight::Insight;
use crate::model::{Feature, Tag};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The immutable set of insights served online, together with the
/// tag and feature dictionaries needed to interpret them.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, JsonSchema)]
pub struct Corpus {
    #[serde(alias = "tag", default)]
    pub tags: BTreeMap<String, Tag>,

    #[serde(alias = "feature", default)]
    pub features: BTreeMap<String, Feature>,

    #[serde(alias = "insight", default)]
    pub insights: Vec<Insight>,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.insights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insights.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Insight> {
        self.insights.get(index)
    }

    /// Tags of the insight's features, in feature order (`lhs` first).
    pub fn insight_tags(&self, index: usize) -> Option<[&str; 2]> {
        let [lhs, rhs] = self.insights.get(index)?.features();
        let lhs = self.features.get(lhs)?;
        let rhs = self.features.get(rhs)?;
        Some([lhs.tag.as_str(), rhs.tag.as_str()])
    }

    /// Tag set of the insight; empty for an unknown index.
    pub fn tag_set(&self, index: usize) -> BTreeSet<String> {
        self.insight_tags(index)
            .map(|tags| tags.iter().map(|tag| (*tag).to_string()).collect())
            .unwrap_or_default()
    }

    /// Checks that every insight resolves to exactly two known tags and carries
    /// consistent counters.
    pub fn validate(&self) -> Result<()> {
        for (name, feature) in &self.features {
            if !self.tags.contains_key(&feature.tag) {
                return Err(ProtocolError::UnknownTag {
                    feature: name.clone(),
                    tag: feature.tag.clone(),
                });
            }
        }
        for (index, insight) in self.insights.iter().enumerate() {
            for feature in insight.features() {
                if !self.features.contains_key(feature) {
                    return Err(ProtocolError::UnknownInsightFeature {
                        index,
                        feature: feature.to_string(),
                    });
                }
            }
            let found = self.tag_set(index).len();
            if found != 2 {
                return Err(ProtocolError::InsightTagArity { index, found });
            }
            if insight.counters().is_some_and(|c| !c.is_consistent()) {
                return Err(ProtocolError::InconsistentCounters { index });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::{Counters, MutualInformation};
    use pretty_assertions::assert_eq;

    fn corpus(rhs_tag: &str) -> Corpus {
        let mut corpus = Corpus::default();
        for tag in ["x", "y"] {
            corpus.tags.insert(tag.to_string(), Tag::default());
        }
        corpus.features.insert("a".to_string(), Feature::new("x", "A"));
        corpus.features.insert("b".to_string(), Feature::new(rhs_tag, "B"));
        corpus.insights.push(Insight::from(MutualInformation {
            score: 1.0,
            lhs: "a".to_string(),
            rhs: "b".to_string(),
            counters: Counters::from_buckets(3, [1, 0, 1, 1]),
        }));
        corpus
    }

    #[test]
    fn resolves_tags_in_feature_order() {
        let corpus = corpus("y");
        assert_eq!(corpus.insight_tags(0), Some(["x", "y"]));
        assert_eq!(corpus.insight_tags(1), None);
        assert!(corpus.tag_set(1).is_empty());
        corpus.validate().unwrap();
    }

    #[test]
    fn rejects_insight_within_single_tag() {
        let corpus = corpus("x");
        assert!(matches!(
            corpus.validate(),
            Err(ProtocolError::InsightTagArity { index: 0, found: 1 })
        ));
    }

    #[test]
    fn parses_wire_format() {
        let raw = r#"{
            "tags": {"x": {"name": "X"}, "y": {"name": "Y"}},
            "features": {
                "a": {"tag": "x", "yes": "A"},
                "b": {"tag": "y", "yes": "B", "no": "No B"}
            },
            "insights": [{
                "kind": "MutualInformation",
                "score": 0.25,
                "lhs": "a",
                "rhs": "b",
                "counters": {"N": 4, "lhs": 3, "rhs": 3, "nn": 0, "ny": 1, "yn": 1, "yy": 2}
            }]
        }"#;
        let corpus: Corpus = serde_json::from_str(raw).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.features["b"].no_text(), "No B");
        corpus.validate().unwrap();
    }
}
