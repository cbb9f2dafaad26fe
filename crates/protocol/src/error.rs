use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProtocolError>;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Session '{session}' references unknown feature '{feature}'")]
    UnknownSessionFeature { session: String, feature: String },

    #[error("Feature '{feature}' references unknown tag '{tag}'")]
    UnknownTag { feature: String, tag: String },

    #[error("Insight #{index} references unknown feature '{feature}'")]
    UnknownInsightFeature { index: usize, feature: String },

    #[error("Insight #{index} must span exactly two tags, found {found}")]
    InsightTagArity { index: usize, found: usize },

    #[error("Insight #{index} has inconsistent counters")]
    InconsistentCounters { index: usize },
}
