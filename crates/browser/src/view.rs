use crate::session::SessionSnapshot;
use insights_protocol::{Corpus, Insight};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Summary served at the browser root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopLevelView {
    pub total: usize,
    pub browse_url: String,
    pub browse_all_url: String,
    pub smart_browse_url: String,
}

/// One insight with permalink and sequential navigation (1-based in URLs).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightView {
    pub current_url: String,
    pub previous_url: String,
    pub next_url: String,
    pub tags: BTreeSet<String>,
    pub score: f64,
    pub description: String,
    pub insight: Insight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub text: String,
    pub url: String,
}

/// One step of an adaptive browsing session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmartInsightView {
    pub done: bool,
    pub navigation: Vec<Navigation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight: Option<InsightView>,
    pub sessions: BTreeMap<String, SessionSnapshot>,
}

/// Response of the plain browsing route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IndexResponse<'a> {
    TopLevel(TopLevelView),
    Insight(Box<InsightView>),
    All { insights: &'a [Insight] },
    Everything { everything: &'a Corpus },
}

/// Response of the adaptive browsing route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SmartResponse {
    /// No session id was given; continue at `location` with a fresh one.
    Redirect { location: String },
    Insight(Box<SmartInsightView>),
}
