use crate::token::TokenSource;
use insights_protocol::Corpus;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// A set of tags; an insight is excluded when one of these is a subset of its tags.
pub type FilterSet = BTreeSet<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No action taken yet.
    #[default]
    NotStarted,
    /// Currently showing the insight at this index.
    Browsing(usize),
    /// Every insight was either seen or filtered out. Terminal.
    Done,
}

/// Tokens minted for the insight just served, one per exclusion action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionTokens {
    /// Exclude everything mentioning the `lhs` feature's tag.
    pub exclude_lhs_tag: String,
    /// Exclude everything mentioning the `rhs` feature's tag.
    pub exclude_rhs_tag: String,
    /// Exclude insights on exactly this pair of tags.
    pub exclude_pair: String,
    /// Exclude everything mentioning either tag.
    pub exclude_both: String,
}

impl ActionTokens {
    fn all(&self) -> [&str; 4] {
        [
            &self.exclude_lhs_tag,
            &self.exclude_rhs_tag,
            &self.exclude_pair,
            &self.exclude_both,
        ]
    }
}

/// Result of one `take_action` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Browsing { index: usize, tokens: ActionTokens },
    Done,
}

/// Debug view of a session; action tokens are capabilities and never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub history: Vec<usize>,
    pub filters: BTreeSet<FilterSet>,
    pub current_insight_index: Option<usize>,
    pub done: bool,
}

/// Mutable browsing state of one user.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    history: Vec<usize>,
    seen: HashSet<usize>,
    filters: BTreeSet<FilterSet>,
    actions: HashMap<String, BTreeSet<FilterSet>>,
    issued: VecDeque<ActionTokens>,
    retention: usize,
    state: SessionState,
}

impl SessionInfo {
    /// `retention` is the number of most recent insights whose tokens stay valid.
    pub fn new(retention: usize) -> Self {
        Self {
            history: Vec::new(),
            seen: HashSet::new(),
            filters: BTreeSet::new(),
            actions: HashMap::new(),
            issued: VecDeque::new(),
            retention: retention.max(1),
            state: SessionState::NotStarted,
        }
    }

    pub fn history(&self) -> &[usize] {
        &self.history
    }

    pub fn filters(&self) -> &BTreeSet<FilterSet> {
        &self.filters
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            SessionState::Browsing(index) => Some(index),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == SessionState::Done
    }

    /// Number of action tokens currently accepted.
    pub fn live_tokens(&self) -> usize {
        self.actions.len()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            history: self.history.clone(),
            filters: self.filters.clone(),
            current_insight_index: self.current_index(),
            done: self.is_done(),
        }
    }

    /// Whether no registered filter set is a subset of the insight's tags.
    ///
    /// Insights whose tags cannot be resolved never pass.
    pub fn passes_filter(&self, corpus: &Corpus, index: usize) -> bool {
        let Some(tags) = corpus.insight_tags(index) else {
            return false;
        };
        !self
            .filters
            .iter()
            .any(|filter| filter.iter().all(|tag| tags.contains(&tag.as_str())))
    }

    /// Applies the exclusions bound to `token` (unknown or empty tokens apply
    /// nothing), then moves to the first unseen insight that passes the filters.
    ///
    /// The scan restarts from index zero on every call.
    pub fn take_action(
        &mut self,
        corpus: &Corpus,
        token: &str,
        tokens: &mut dyn TokenSource,
    ) -> Step {
        if self.is_done() {
            return Step::Done;
        }

        if let Some(sets) = self.actions.get(token) {
            self.filters.extend(sets.iter().cloned());
        }

        let next = (0..corpus.len())
            .find(|index| !self.seen.contains(index) && self.passes_filter(corpus, *index));

        let Some((index, [lhs_tag, rhs_tag])) =
            next.and_then(|index| corpus.insight_tags(index).map(|tags| (index, tags)))
        else {
            log::debug!(
                "Session done after {} insights with {} filters",
                self.history.len(),
                self.filters.len()
            );
            self.state = SessionState::Done;
            return Step::Done;
        };

        self.history.push(index);
        self.seen.insert(index);
        self.state = SessionState::Browsing(index);

        let lhs: FilterSet = [lhs_tag.to_string()].into();
        let rhs: FilterSet = [rhs_tag.to_string()].into();
        let pair: FilterSet = [lhs_tag.to_string(), rhs_tag.to_string()].into();

        let minted = ActionTokens {
            exclude_lhs_tag: self.register(tokens, [lhs.clone()].into()),
            exclude_rhs_tag: self.register(tokens, [rhs.clone()].into()),
            exclude_pair: self.register(tokens, [pair].into()),
            exclude_both: self.register(tokens, [lhs, rhs].into()),
        };
        self.issued.push_back(minted.clone());
        self.evict_stale_tokens();

        Step::Browsing {
            index,
            tokens: minted,
        }
    }

    fn register(&mut self, tokens: &mut dyn TokenSource, sets: BTreeSet<FilterSet>) -> String {
        let mut token = tokens.next_token();
        while token.is_empty() || self.actions.contains_key(&token) {
            token = tokens.next_token();
        }
        self.actions.insert(token.clone(), sets);
        token
    }

    fn evict_stale_tokens(&mut self) {
        while self.issued.len() > self.retention {
            if let Some(stale) = self.issued.pop_front() {
                for token in stale.all() {
                    self.actions.remove(token);
                }
            }
        }
    }
}
