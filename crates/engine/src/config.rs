use serde::{Deserialize, Serialize};

/// Configuration for offline insight ranking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Symmetric additive prior applied to every counter bucket
    pub smoothing_prior: f64,

    /// Minimum information gain (in bits) for a pair to become an insight
    pub gain_threshold: f64,

    /// Order of the emitted insights
    pub order: RankOrder,

    /// Skip pairs whose features share a tag (they cannot be filtered pairwise)
    pub skip_same_tag: bool,

    /// Hard limit on indexed features; the pair table holds `F * F * 4` counters
    pub max_features: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            smoothing_prior: 0.5,
            gain_threshold: 0.1,
            order: RankOrder::Enumeration,
            skip_same_tag: true,
            max_features: 4096,
        }
    }
}

impl EngineConfig {
    /// Unsmoothed configuration, under which subadditivity is enforced
    pub fn exact() -> Self {
        Self {
            smoothing_prior: 0.0,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.smoothing_prior.is_finite() || self.smoothing_prior < 0.0 {
            return Err(format!(
                "smoothing_prior must be a finite non-negative number, got {}",
                self.smoothing_prior
            ));
        }

        if !self.gain_threshold.is_finite() {
            return Err(format!(
                "gain_threshold must be finite, got {}",
                self.gain_threshold
            ));
        }

        if self.max_features == 0 {
            return Err("max_features must be > 0".to_string());
        }

        Ok(())
    }
}

/// Order in which ranked insights are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankOrder {
    /// Feature-pair enumeration order `(i, j)`, `i < j`
    #[default]
    Enumeration,

    /// Descending score; ties keep enumeration order
    Score,
}

impl std::str::FromStr for RankOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enumeration" | "enum" => Ok(Self::Enumeration),
            "score" => Ok(Self::Score),
            other => Err(format!("unknown rank order '{other}' (expected enumeration|score)")),
        }
    }
}
