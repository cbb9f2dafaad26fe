use serde::{Deserialize, Serialize};

/// Configuration for the online browser
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BrowserConfig {
    /// Scheme and authority prepended to every outward-facing link
    pub url_prefix: String,

    /// Route the browser is mounted on; starts and ends with `/`
    pub route: String,

    /// Query parameter carrying the browsing session id
    pub session_id_parameter_name: String,

    /// Number of most recent insights whose action tokens stay valid per session
    pub action_token_retention: usize,

    /// Include every known session in smart responses (debugging aid)
    pub expose_sessions: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            url_prefix: "http://localhost:3000".to_string(),
            route: "/".to_string(),
            session_id_parameter_name: "you_are_awesome".to_string(),
            action_token_retention: 16,
            expose_sessions: true,
        }
    }
}

impl BrowserConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.route.starts_with('/') || !self.route.ends_with('/') {
            return Err(format!(
                "route must start and end with a slash, got '{}'",
                self.route
            ));
        }

        if self.session_id_parameter_name.trim().is_empty() {
            return Err("session_id_parameter_name must be non-empty".to_string());
        }

        if self.session_id_parameter_name == "action" {
            return Err(format!(
                "session_id_parameter_name '{}' clashes with a reserved parameter",
                self.session_id_parameter_name
            ));
        }

        if self.action_token_retention == 0 {
            return Err("action_token_retention must be > 0".to_string());
        }

        Ok(())
    }

    /// `url_prefix` followed by `route`, the base of every link.
    pub fn base_url(&self) -> String {
        format!("{}{}", self.url_prefix.trim_end_matches('/'), self.route)
    }
}
