//! # Insights Browser
//!
//! Adaptive, per-user traversal of a ranked insight corpus.
//!
//! ## Architecture
//!
//! ```text
//! request (session id, action token)
//!     │
//!     └──> InsightBrowser (links, views)
//!            │
//!            └──> SessionStore (one lock for all sessions)
//!                   │
//!                   └──> SessionInfo::take_action
//!                          ├─ merge filters bound to the token
//!                          ├─ first unseen insight passing the filters
//!                          └─ mint exclusion tokens, or Done
//! ```

mod browser;
mod config;
mod error;
mod session;
mod store;
mod token;
mod view;

pub use browser::InsightBrowser;
pub use config::BrowserConfig;
pub use error::{BrowserError, Result};
pub use session::{ActionTokens, FilterSet, SessionInfo, SessionSnapshot, SessionState, Step};
pub use store::{SessionStore, TakeActionOutcome};
pub use token::{RandomTokens, TokenSource, TOKEN_LEN};
pub use view::{
    IndexResponse, InsightView, Navigation, SmartInsightView, SmartResponse, TopLevelView,
};
