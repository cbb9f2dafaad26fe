use crate::config::{EngineConfig, RankOrder};
use crate::counter::PairCounts;
use crate::entropy::{EntropyScorer, EPS};
use crate::error::{EngineError, Result};
use crate::index::FeatureIndex;
use insights_protocol::{Corpus, Counters, Feature, Insight, MutualInformation, Realm, Tag};
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Instant;

/// A feature pair whose information gain cleared the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub gain: f64,
    pub lhs: String,
    pub rhs: String,
    pub counters: Counters,
}

impl From<Candidate> for Insight {
    fn from(candidate: Candidate) -> Self {
        Insight::MutualInformation(MutualInformation {
            score: candidate.gain,
            lhs: candidate.lhs,
            rhs: candidate.rhs,
            counters: candidate.counters,
        })
    }
}

/// Ranking output for one realm.
#[derive(Debug, Clone)]
pub struct RankedRealm {
    pub description: String,
    pub tags: BTreeMap<String, Tag>,
    pub features: BTreeMap<String, Feature>,
    pub candidates: Vec<Candidate>,
}

impl RankedRealm {
    pub fn into_corpus(self) -> Corpus {
        Corpus {
            tags: self.tags,
            features: self.features,
            insights: self.candidates.into_iter().map(Insight::from).collect(),
        }
    }
}

/// Turns a realm into the list of feature pairs worth showing.
pub struct InsightRanker {
    config: EngineConfig,
    scorer: EntropyScorer,
}

impl InsightRanker {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate().map_err(EngineError::InvalidConfig)?;
        let scorer = EntropyScorer::new(config.smoothing_prior);
        Ok(Self { config, scorer })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rank(&self, realm: &Realm) -> Result<RankedRealm> {
        let started = Instant::now();
        realm.validate()?;

        let index = FeatureIndex::build(realm);
        let f = index.feature_count();
        if f > self.config.max_features {
            return Err(EngineError::TooManyFeatures {
                features: f,
                limit: self.config.max_features,
            });
        }
        log::info!(
            "Realm '{}': {} sessions, {} tags, {} features",
            realm.description,
            realm.sessions.len(),
            index.tag_count(),
            f
        );

        let counts = PairCounts::count(realm, &index)?;
        counts.validate()?;

        let marginals: Vec<f64> = (0..f).map(|fi| self.scorer.marginal(&counts, fi)).collect();

        let mut candidates = Vec::new();
        let mut same_tag_skipped = 0usize;
        for fi in 0..f {
            for fj in fi + 1..f {
                let joint = self.scorer.joint(&counts, fi, fj);
                if self.scorer.is_exact() && joint > marginals[fi] + marginals[fj] + EPS {
                    return Err(EngineError::Subadditivity {
                        lhs: index.feature_name(fi).to_string(),
                        rhs: index.feature_name(fj).to_string(),
                        lhs_bits: marginals[fi],
                        rhs_bits: marginals[fj],
                        joint,
                    });
                }
                if self.config.skip_same_tag && index.tag_of(fi) == index.tag_of(fj) {
                    same_tag_skipped += 1;
                    continue;
                }
                let gain = marginals[fi] + marginals[fj] - joint;
                if gain > self.config.gain_threshold {
                    candidates.push(Candidate {
                        gain,
                        lhs: index.feature_name(fi).to_string(),
                        rhs: index.feature_name(fj).to_string(),
                        counters: counts.counters(fi, fj),
                    });
                }
            }
        }

        if self.config.order == RankOrder::Score {
            candidates.sort_by(|a, b| b.gain.total_cmp(&a.gain));
        }

        log::debug!(
            "Realm '{}': {} candidates above {} bits ({} same-tag pairs skipped)",
            realm.description,
            candidates.len(),
            self.config.gain_threshold,
            same_tag_skipped
        );
        log::info!(
            "Realm '{}' ranked in {} ms",
            realm.description,
            started.elapsed().as_millis()
        );

        Ok(RankedRealm {
            description: realm.description.clone(),
            tags: realm.tags.clone(),
            features: realm.features.clone(),
            candidates,
        })
    }
}

/// Writes `gain\tlhs\trhs` lines for human curation.
pub fn write_tsv<W: Write>(candidates: &[Candidate], mut out: W) -> std::io::Result<()> {
    for candidate in candidates {
        writeln!(out, "{}\t{}\t{}", candidate.gain, candidate.lhs, candidate.rhs)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use insights_protocol::Session;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn realm(features: &[(&str, &str)], sessions: &[&[&str]]) -> Realm {
        let mut realm = Realm {
            description: "test".to_string(),
            ..Default::default()
        };
        for (name, tag) in features {
            realm.tags.insert(tag.to_string(), Tag::default());
            realm
                .features
                .insert(name.to_string(), Feature::new(*tag, *name));
        }
        for (sid, present) in sessions.iter().enumerate() {
            realm
                .sessions
                .push(Session::new(format!("s{sid}"), present.iter().copied()));
        }
        realm
    }

    #[test]
    fn keeps_correlated_pair_with_full_counters() {
        let realm = realm(
            &[("a", "x"), ("b", "y")],
            &[&["a"], &["a", "b"], &["a", "b"], &["b"]],
        );
        let ranker = InsightRanker::new(EngineConfig::exact()).unwrap();
        let ranked = ranker.rank(&realm).unwrap();

        assert_eq!(ranked.candidates.len(), 1);
        let candidate = &ranked.candidates[0];
        assert_eq!((candidate.lhs.as_str(), candidate.rhs.as_str()), ("a", "b"));
        assert!((candidate.gain - 0.23553007666916015).abs() < 1e-12);
        assert_eq!(
            candidate.counters,
            Counters {
                n: 4,
                lhs: 3,
                rhs: 3,
                nn: 0,
                ny: 1,
                yn: 1,
                yy: 2
            }
        );

        let corpus = ranked.into_corpus();
        corpus.validate().unwrap();
        assert_eq!(corpus.insights.len(), 1);
    }

    #[test]
    fn threshold_filters_weak_pairs() {
        let realm = realm(
            &[("a", "x"), ("b", "y")],
            &[&["a"], &["a", "b"], &["a", "b"], &["b"]],
        );
        let config = EngineConfig {
            gain_threshold: 0.3,
            ..EngineConfig::exact()
        };
        let ranked = InsightRanker::new(config).unwrap().rank(&realm).unwrap();
        assert!(ranked.candidates.is_empty());
    }

    #[test]
    fn same_tag_pairs_are_skipped_unless_disabled() {
        let sessions: &[&[&str]] = &[&["a", "b"], &["a", "b"], &[], &[]];
        let realm = realm(&[("a", "x"), ("b", "x")], sessions);

        let ranked = InsightRanker::new(EngineConfig::exact())
            .unwrap()
            .rank(&realm)
            .unwrap();
        assert!(ranked.candidates.is_empty());

        let config = EngineConfig {
            skip_same_tag: false,
            ..EngineConfig::exact()
        };
        let ranked = InsightRanker::new(config).unwrap().rank(&realm).unwrap();
        assert_eq!(ranked.candidates.len(), 1);
    }

    #[test]
    fn score_order_sorts_descending() {
        // a~b perfectly correlated, a~c and b~c weaker.
        let realm = realm(
            &[("a", "x"), ("b", "y"), ("c", "z")],
            &[&["a", "b", "c"], &["a", "b"], &[], &["c"], &["a", "b", "c"], &[]],
        );
        let enumeration = InsightRanker::new(EngineConfig {
            gain_threshold: -1.0,
            ..EngineConfig::exact()
        })
        .unwrap()
        .rank(&realm)
        .unwrap();
        let pairs: Vec<_> = enumeration
            .candidates
            .iter()
            .map(|c| (c.lhs.as_str(), c.rhs.as_str()))
            .collect();
        assert_eq!(pairs, vec![("a", "b"), ("a", "c"), ("b", "c")]);

        let scored = InsightRanker::new(EngineConfig {
            gain_threshold: -1.0,
            order: RankOrder::Score,
            ..EngineConfig::exact()
        })
        .unwrap()
        .rank(&realm)
        .unwrap();
        assert!(scored
            .candidates
            .windows(2)
            .all(|w| w[0].gain >= w[1].gain));
        assert_eq!(scored.candidates[0].lhs, "a");
        assert_eq!(scored.candidates[0].rhs, "b");
    }

    #[test]
    fn too_many_features_is_rejected() {
        let realm = realm(&[("a", "x"), ("b", "y"), ("c", "z")], &[]);
        let config = EngineConfig {
            max_features: 2,
            ..Default::default()
        };
        assert!(matches!(
            InsightRanker::new(config).unwrap().rank(&realm),
            Err(EngineError::TooManyFeatures { features: 3, limit: 2 })
        ));
    }

    #[test]
    fn malformed_realm_is_fatal() {
        let mut realm = realm(&[("a", "x")], &[&["a"]]);
        realm.sessions.push(Session::new("bad", ["zzz"]));
        assert!(matches!(
            InsightRanker::new(EngineConfig::default())
                .unwrap()
                .rank(&realm),
            Err(EngineError::MalformedRealm(_))
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EngineConfig {
            smoothing_prior: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            InsightRanker::new(config),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn tsv_lines_carry_gain_and_names() {
        let candidates = vec![Candidate {
            gain: 0.5,
            lhs: "a".to_string(),
            rhs: "b".to_string(),
            counters: Counters::default(),
        }];
        let mut out = Vec::new();
        write_tsv(&candidates, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0.5\ta\tb\n");
    }

    proptest! {
        #[test]
        fn proptest_exact_ranking_is_subadditive_and_symmetric(
            sessions in prop::collection::vec(prop::collection::vec(0usize..5, 0..5), 1..32)
        ) {
            let names = ["f0", "f1", "f2", "f3", "f4"];
            let features: Vec<(&str, &str)> = names.iter().map(|n| (*n, *n)).collect();
            let rows: Vec<Vec<&str>> = sessions
                .iter()
                .map(|s| s.iter().map(|f| names[*f]).collect())
                .collect();
            let row_refs: Vec<&[&str]> = rows.iter().map(Vec::as_slice).collect();
            let realm = realm(&features, &row_refs);

            let index = FeatureIndex::build(&realm);
            let counts = PairCounts::count(&realm, &index).unwrap();
            let scorer = EntropyScorer::new(0.0);
            for i in 0..5 {
                for j in 0..5 {
                    if i == j {
                        continue;
                    }
                    let joint = scorer.joint(&counts, i, j);
                    prop_assert!(
                        joint <= scorer.marginal(&counts, i) + scorer.marginal(&counts, j) + EPS
                    );
                    let forward = scorer.gain(&counts, i, j);
                    let backward = scorer.gain(&counts, j, i);
                    prop_assert!((forward - backward).abs() < 1e-9);
                }
            }

            let ranker = InsightRanker::new(EngineConfig::exact()).unwrap();
            prop_assert!(ranker.rank(&realm).is_ok());
        }
    }
}
