use crate::config::BrowserConfig;
use crate::error::{BrowserError, Result};
use crate::session::{ActionTokens, Step};
use crate::store::SessionStore;
use crate::view::{
    IndexResponse, InsightView, Navigation, SmartInsightView, SmartResponse, TopLevelView,
};
use insights_protocol::{Corpus, Insight};
use std::sync::Arc;
use url::form_urlencoded;

/// Request-facing façade over a read-only corpus and the session store.
///
/// This is the only place that formats outward-facing links, including the
/// ones that embed action tokens.
#[derive(Clone)]
pub struct InsightBrowser {
    corpus: Arc<Corpus>,
    store: Arc<SessionStore>,
    config: BrowserConfig,
    base_url: String,
}

impl InsightBrowser {
    /// Fails when `store` was built with a token retention other than
    /// `config.action_token_retention`; use [`SessionStore::from_config`].
    pub fn new(corpus: Arc<Corpus>, store: Arc<SessionStore>, config: BrowserConfig) -> Result<Self> {
        config.validate().map_err(BrowserError::InvalidConfig)?;
        if store.retention() != config.action_token_retention {
            return Err(BrowserError::InvalidConfig(format!(
                "session store keeps tokens for {} insights, config asks for {}",
                store.retention(),
                config.action_token_retention
            )));
        }
        corpus.validate()?;
        let base_url = config.base_url();
        Ok(Self {
            corpus,
            store,
            config,
            base_url,
        })
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn create_session(&self) -> String {
        self.store.create_session()
    }

    pub fn top_level(&self) -> TopLevelView {
        let total = self.corpus.len();
        if total == 0 {
            return TopLevelView {
                total,
                browse_url: String::new(),
                browse_all_url: String::new(),
                smart_browse_url: String::new(),
            };
        }
        TopLevelView {
            total,
            browse_url: format!("{}?id=1", self.base_url),
            browse_all_url: format!("{}?id=all", self.base_url),
            smart_browse_url: format!("{}smart", self.base_url),
        }
    }

    /// Insight at a 0-based index.
    pub fn insight(&self, index: usize) -> Option<InsightView> {
        let insight = self.corpus.get(index)?;
        let previous_url = if index > 0 {
            self.permalink(index - 1)
        } else {
            String::new()
        };
        let next_url = if index + 1 < self.corpus.len() {
            self.permalink(index + 1)
        } else {
            String::new()
        };
        Some(InsightView {
            current_url: self.permalink(index),
            previous_url,
            next_url,
            tags: self.corpus.tag_set(index),
            score: insight.score(),
            description: insight.description(),
            insight: insight.clone(),
        })
    }

    /// Insight at a 1-based id, as used in URLs.
    pub fn insight_by_id(&self, id: usize) -> Option<InsightView> {
        id.checked_sub(1).and_then(|index| self.insight(index))
    }

    pub fn list_insights(&self) -> &[Insight] {
        &self.corpus.insights
    }

    pub fn everything(&self) -> &Corpus {
        &self.corpus
    }

    /// Resolves the `id` query parameter of the plain browsing route.
    ///
    /// Anything that is not a valid 1-based id, `all` or `everything` falls
    /// back to the top-level summary.
    pub fn index_query(&self, id: Option<&str>) -> IndexResponse<'_> {
        let id = id.map(str::trim).unwrap_or_default();
        match id {
            "all" => IndexResponse::All {
                insights: self.list_insights(),
            },
            "everything" => IndexResponse::Everything {
                everything: self.everything(),
            },
            _ => id
                .parse::<usize>()
                .ok()
                .and_then(|id| self.insight_by_id(id))
                .map(|view| IndexResponse::Insight(Box::new(view)))
                .unwrap_or_else(|| IndexResponse::TopLevel(self.top_level())),
        }
    }

    /// One step of adaptive browsing.
    ///
    /// Without a session id, a fresh session is created and the caller is
    /// redirected to it. Otherwise the action token (if any) is applied and
    /// the next insight served.
    pub fn smart(&self, session_id: Option<&str>, action: Option<&str>) -> SmartResponse {
        let session_id = session_id.map(str::trim).unwrap_or_default();
        if session_id.is_empty() {
            let fresh = self.create_session();
            return SmartResponse::Redirect {
                location: self.smart_url(&fresh, None),
            };
        }

        let outcome = self.store.take_action(
            &self.corpus,
            session_id,
            action.unwrap_or_default(),
            self.config.expose_sessions,
        );
        let sessions = outcome.sessions.unwrap_or_default();

        let view = match outcome.step {
            Step::Browsing { index, tokens } => SmartInsightView {
                done: false,
                navigation: self.navigation(session_id, index, &tokens),
                insight: self.insight(index),
                sessions,
            },
            Step::Done => SmartInsightView {
                done: true,
                navigation: vec![Navigation {
                    text: "Start over!".to_string(),
                    url: format!("{}smart", self.base_url),
                }],
                insight: None,
                sessions,
            },
        };
        SmartResponse::Insight(Box::new(view))
    }

    fn navigation(&self, session_id: &str, index: usize, tokens: &ActionTokens) -> Vec<Navigation> {
        let [a, b] = self.corpus.insight_tags(index).unwrap_or(["", ""]);
        let link = |text: String, token: Option<&str>| Navigation {
            text,
            url: self.smart_url(session_id, token),
        };
        vec![
            link("Next".to_string(), None),
            link(
                format!("Filter out insights on the same pair ({a}, {b})."),
                Some(tokens.exclude_pair.as_str()),
            ),
            link(
                format!("Filter out insights on A ({a})."),
                Some(tokens.exclude_lhs_tag.as_str()),
            ),
            link(
                format!("Filter out insights on B ({b})."),
                Some(tokens.exclude_rhs_tag.as_str()),
            ),
            link(
                format!("Filter out insights on both A and B ({a} + {b})."),
                Some(tokens.exclude_both.as_str()),
            ),
        ]
    }

    fn permalink(&self, index: usize) -> String {
        format!("{}?id={}", self.base_url, index + 1)
    }

    fn smart_url(&self, session_id: &str, action: Option<&str>) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair(&self.config.session_id_parameter_name, session_id);
        if let Some(action) = action {
            query.append_pair("action", action);
        }
        format!("{}smart?{}", self.base_url, query.finish())
    }
}
