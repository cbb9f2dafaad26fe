//! # Insights Protocol
//!
//! Data model shared by the offline ranking engine and the online browser:
//! realms of feature-tagged sessions on the way in, a corpus of ranked
//! insights on the way out.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

mod corpus;
mod error;
mod insight;
mod model;

pub use corpus::Corpus;
pub use error::{ProtocolError, Result};
pub use insight::{Counters, Insight, MutualInformation};
pub use model::{Feature, InsightsInput, Realm, Session, Tag};

pub const CORPUS_SCHEMA_VERSION: u32 = 1;

pub fn parse_json<T: DeserializeOwned>(raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(Into::into)
}

pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).map_err(|source| ProtocolError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_json(&raw)
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

/// JSON schema of the offline input document.
pub fn input_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(InsightsInput)).unwrap_or_default()
}

/// JSON schema of the corpus document served online.
pub fn corpus_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(Corpus)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_json_file_reports_path_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let err = load_json_file::<Corpus>(&path).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn load_json_file_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_json_file::<InsightsInput>(&path),
            Err(ProtocolError::Json(_))
        ));
    }

    #[test]
    fn schemas_describe_top_level_fields() {
        let corpus = corpus_schema();
        assert!(corpus["properties"]["insights"].is_object());
        let input = input_schema();
        assert!(input["properties"]["realms"].is_object());
    }
}
