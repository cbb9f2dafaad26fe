use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, Response as HttpResponse, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use insights_browser::{InsightBrowser, SmartResponse};
use insights_protocol::serialize_json;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) fn router(browser: Arc<InsightBrowser>) -> Router {
    let route = browser.config().route.clone();
    Router::new()
        .route(&route, get(index_handler))
        .route(&format!("{route}smart"), get(smart_handler))
        .with_state(browser)
}

async fn index_handler(
    State(browser): State<Arc<InsightBrowser>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, StatusCode> {
    let response = browser.index_query(params.get("id").map(String::as_str));
    json_response(&response)
}

async fn smart_handler(
    State(browser): State<Arc<InsightBrowser>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, StatusCode> {
    let id_key = &browser.config().session_id_parameter_name;
    let session_id = params.get(id_key).map(String::as_str);
    let action = params.get("action").map(String::as_str);

    match browser.smart(session_id, action) {
        SmartResponse::Redirect { location } => {
            log::debug!("New browsing session, redirecting to {location}");
            HttpResponse::builder()
                .status(StatusCode::FOUND)
                .header(header::LOCATION, location)
                .body(Body::empty())
                .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
        }
        SmartResponse::Insight(view) => json_response(&view),
    }
}

fn json_response<T: Serialize>(value: &T) -> Result<Response, StatusCode> {
    let bytes = serialize_json(value)
        .map_err(|err| {
            log::error!("Failed to serialize response: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .into_bytes();

    HttpResponse::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(bytes))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use insights_browser::{BrowserConfig, SessionStore};
    use insights_protocol::{Corpus, Counters, Feature, Insight, MutualInformation, Tag};
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn browser() -> Arc<InsightBrowser> {
        let mut corpus = Corpus::default();
        for tag in ["x", "y"] {
            corpus.tags.insert(tag.to_string(), Tag::default());
        }
        corpus.features.insert("A".to_string(), Feature::new("x", "Has A"));
        corpus.features.insert("B".to_string(), Feature::new("y", "Has B"));
        for score in [0.3, 0.2] {
            corpus.insights.push(Insight::from(MutualInformation {
                score,
                lhs: "A".to_string(),
                rhs: "B".to_string(),
                counters: Counters::from_buckets(4, [0, 1, 1, 2]),
            }));
        }
        let config = BrowserConfig {
            session_id_parameter_name: "sid".to_string(),
            ..Default::default()
        };
        let store = Arc::new(SessionStore::from_config(&config));
        Arc::new(InsightBrowser::new(Arc::new(corpus), store, config).unwrap())
    }

    fn query(pairs: &[(&str, &str)]) -> Query<HashMap<String, String>> {
        Query(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn index_serves_top_level_and_single_insights() {
        let browser = browser();

        let top = index_handler(State(browser.clone()), query(&[])).await.unwrap();
        assert_eq!(top.status(), StatusCode::OK);
        let top = body_json(top).await;
        assert_eq!(top["total"], 2);
        assert_eq!(top["smart_browse_url"], "http://localhost:3000/smart");

        let one = index_handler(State(browser.clone()), query(&[("id", "2")]))
            .await
            .unwrap();
        let one = body_json(one).await;
        assert_eq!(one["previous_url"], "http://localhost:3000/?id=1");
        assert_eq!(one["insight"]["kind"], "MutualInformation");

        let all = index_handler(State(browser), query(&[("id", "all")]))
            .await
            .unwrap();
        assert_eq!(body_json(all).await["insights"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn smart_redirects_then_serves_json() {
        let browser = browser();

        let redirect = smart_handler(State(browser.clone()), query(&[])).await.unwrap();
        assert_eq!(redirect.status(), StatusCode::FOUND);
        let location = redirect.headers()[header::LOCATION].to_str().unwrap().to_string();
        let sid = location.rsplit("sid=").next().unwrap().to_string();
        assert!(location.starts_with("http://localhost:3000/smart?sid="));

        let step = smart_handler(State(browser.clone()), query(&[("sid", sid.as_str())]))
            .await
            .unwrap();
        assert_eq!(step.status(), StatusCode::OK);
        let step = body_json(step).await;
        assert_eq!(step["done"], false);
        assert_eq!(step["insight"]["current_url"], "http://localhost:3000/?id=1");
        assert_eq!(step["navigation"].as_array().unwrap().len(), 5);

        let pair_url = step["navigation"][1]["url"].as_str().unwrap();
        let token = pair_url.rsplit("action=").next().unwrap();
        let done = smart_handler(
            State(browser),
            query(&[("sid", sid.as_str()), ("action", token)]),
        )
        .await
        .unwrap();
        let done = body_json(done).await;
        assert_eq!(done["done"], true);
        assert!(done.get("insight").is_none());
    }
}
