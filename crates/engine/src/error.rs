use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Malformed realm: {0}")]
    MalformedRealm(#[from] insights_protocol::ProtocolError),

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    #[error("Realm has {features} features, above the configured limit of {limit}")]
    TooManyFeatures { features: usize, limit: usize },

    #[error("Counter invariant violated: {0}")]
    CounterInvariant(String),

    #[error(
        "Joint entropy of ({lhs}, {rhs}) exceeds the sum of marginals: {joint} > {lhs_bits} + {rhs_bits}"
    )]
    Subadditivity {
        lhs: String,
        rhs: String,
        lhs_bits: f64,
        rhs_bits: f64,
        joint: f64,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
