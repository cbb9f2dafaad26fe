use crate::error::{ProtocolError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Groups related features for bulk filtering.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct Tag {
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
}

/// A binary session property.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct Feature {
    /// Tag used for bulk filtering; must be present in the realm's tag map.
    pub tag: String,

    /// Human-readable text when the feature is present.
    #[serde(rename = "yes", alias = "yes_label")]
    pub yes_label: String,

    /// Human-readable text when the feature is absent.
    #[serde(
        rename = "no",
        alias = "no_label",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub no_label: Option<String>,
}

impl Feature {
    pub fn new(tag: impl Into<String>, yes_label: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            yes_label: yes_label.into(),
            no_label: None,
        }
    }

    pub fn yes_text(&self) -> &str {
        &self.yes_label
    }

    pub fn no_text(&self) -> String {
        match self.no_label.as_deref() {
            Some(no) if !no.is_empty() => no.to_string(),
            _ => format!("Not '{}'", self.yes_label),
        }
    }
}

/// One real-world session, reduced to the set of binary features it exhibits.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct Session {
    /// Key to trace the session back to its source.
    #[serde(default)]
    pub key: String,

    /// Features present in this session. Absence is implicit.
    #[serde(rename = "features", alias = "feature", alias = "feature_set", default)]
    pub feature_set: BTreeSet<String>,
}

impl Session {
    pub fn new<I, S>(key: impl Into<String>, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            feature_set: features.into_iter().map(Into::into).collect(),
        }
    }
}

/// The universe within which sessions are analyzed together.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct Realm {
    #[serde(default)]
    pub description: String,

    #[serde(alias = "tag", default)]
    pub tags: BTreeMap<String, Tag>,

    #[serde(alias = "feature", default)]
    pub features: BTreeMap<String, Feature>,

    #[serde(alias = "session", default)]
    pub sessions: Vec<Session>,
}

impl Realm {
    /// Checks that sessions only reference known features and features only reference known tags.
    pub fn validate(&self) -> Result<()> {
        for (name, feature) in &self.features {
            if !self.tags.contains_key(&feature.tag) {
                return Err(ProtocolError::UnknownTag {
                    feature: name.clone(),
                    tag: feature.tag.clone(),
                });
            }
        }
        for session in &self.sessions {
            if let Some(feature) = session
                .feature_set
                .iter()
                .find(|feature| !self.features.contains_key(*feature))
            {
                return Err(ProtocolError::UnknownSessionFeature {
                    session: session.key.clone(),
                    feature: feature.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Offline input: a collection of independently analyzed realms.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct InsightsInput {
    #[serde(alias = "realm", default)]
    pub realms: Vec<Realm>,
}

impl InsightsInput {
    pub fn validate(&self) -> Result<()> {
        self.realms.iter().try_for_each(Realm::validate)
    }
}
