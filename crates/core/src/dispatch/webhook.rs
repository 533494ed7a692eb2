use crate::config::Settings;
use crate::dispatch::error::{DispatchError, DispatchStage};
use crate::dispatch::AnalysisClient;
use crate::domain::contract::{AnalysisReply, WebhookResponse};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde_json::Value;

const NGROK_SKIP_WARNING: &str = "ngrok-skip-browser-warning";

#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    endpoint: String,
}

impl WebhookClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Self::new(settings.require_webhook_url()?)
    }

    pub fn new(endpoint: &str) -> anyhow::Result<Self> {
        let endpoint = endpoint.trim();
        anyhow::ensure!(!endpoint.is_empty(), "webhook endpoint must be non-empty");
        reqwest::Url::parse(endpoint)
            .with_context(|| format!("invalid webhook endpoint: {endpoint}"))?;

        // No request timeout: the query runs until the transport reports an outcome.
        let http = reqwest::Client::builder()
            .build()
            .context("failed to build webhook http client")?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(NGROK_SKIP_WARNING, HeaderValue::from_static("true"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    async fn fetch_body(&self, query: &str) -> Result<String, DispatchError> {
        let res = self
            .http
            .get(self.endpoint.as_str())
            .headers(Self::headers())
            .query(&[("query", query)])
            .send()
            .await
            .map_err(|e| DispatchError::new(DispatchStage::Transport, format!("{e:#}")))?;

        let status = res.status();
        tracing::debug!(%status, "webhook responded");

        let text = res.text().await.map_err(|e| {
            DispatchError::new(DispatchStage::Transport, format!("failed to read body: {e:#}"))
                .with_status(status.as_u16())
        })?;

        if !status.is_success() {
            return Err(
                DispatchError::new(DispatchStage::HttpStatus, format!("webhook HTTP {status}"))
                    .with_status(status.as_u16())
                    .with_raw_body(text),
            );
        }

        Ok(text)
    }
}

/// Tunneling proxies answer with an HTML warning page instead of forwarding
/// the request; those bodies must never reach the JSON parser.
pub fn looks_like_html(body: &str) -> bool {
    let lower = body.to_ascii_lowercase();
    lower.contains("<!doctype html") || lower.contains("<html")
}

pub fn parse_reply(body: &str) -> Result<AnalysisReply, DispatchError> {
    if looks_like_html(body) {
        return Err(DispatchError::new(
            DispatchStage::HtmlInterstitial,
            "received HTML instead of JSON; the tunnel may be blocking the request",
        )
        .with_raw_body(body));
    }

    let value = serde_json::from_str::<Value>(body).map_err(|e| {
        DispatchError::new(DispatchStage::JsonParse, format!("invalid JSON from webhook: {e}"))
            .with_raw_body(body)
    })?;

    Ok(WebhookResponse::from_value(value).into_reply())
}

#[async_trait::async_trait]
impl AnalysisClient for WebhookClient {
    fn source_name(&self) -> &'static str {
        "webhook"
    }

    async fn analyze(&self, query: &str) -> anyhow::Result<AnalysisReply> {
        let body = self.fetch_body(query).await?;
        tracing::debug!(body_len = body.len(), raw = %body, "webhook body");
        Ok(parse_reply(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::{RiskLevel, Sentiment};
    use axum::extract::Query;
    use axum::http::{header, HeaderMap as AxumHeaders, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::Router;
    use serde_json::json;
    use std::collections::HashMap;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/webhook/test")
    }

    fn fixed(status: StatusCode, content_type: &'static str, body: String) -> Router {
        Router::new().route(
            "/webhook/test",
            get(move || {
                let body = body.clone();
                async move { (status, [(header::CONTENT_TYPE, content_type)], body) }
            }),
        )
    }

    #[tokio::test]
    async fn sends_query_and_headers_and_maps_success() {
        async fn handler(
            Query(params): Query<HashMap<String, String>>,
            headers: AxumHeaders,
        ) -> impl IntoResponse {
            let skip = headers
                .get("ngrok-skip-browser-warning")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            let accept = headers
                .get(header::ACCEPT)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            if skip != "true" || accept != "application/json" {
                return (StatusCode::BAD_REQUEST, "missing headers".to_string());
            }
            let query = params.get("query").cloned().unwrap_or_default();
            (
                StatusCode::OK,
                json!({
                    "message": format!("echo: {query}"),
                    "analysis": {
                        "symbol": "aapl",
                        "price": 150,
                        "change": 2,
                        "changePercent": 1.35,
                        "volume": "1000",
                        "marketCap": "$2T",
                        "pe": 25,
                        "recommendations": ["r1"],
                        "sentiment": "bullish",
                        "riskLevel": "low"
                    }
                })
                .to_string(),
            )
        }

        let url = serve(Router::new().route("/webhook/test", get(handler))).await;
        let client = WebhookClient::new(&url).unwrap();

        let reply = client.analyze("What about AAPL & co?").await.unwrap();
        assert_eq!(reply.text, "echo: What about AAPL & co?");
        let a = reply.analysis.unwrap();
        assert_eq!(a.symbol, "AAPL");
        assert_eq!(a.sentiment, Sentiment::Bullish);
        assert_eq!(a.risk_level, RiskLevel::Low);
    }

    #[tokio::test]
    async fn missing_analysis_yields_text_only() {
        let url = serve(fixed(
            StatusCode::OK,
            "application/json",
            json!({ "message": "Try a ticker." }).to_string(),
        ))
        .await;
        let reply = WebhookClient::new(&url).unwrap().analyze("hi").await.unwrap();
        assert_eq!(reply.text, "Try a ticker.");
        assert!(reply.analysis.is_none());
    }

    #[tokio::test]
    async fn html_interstitial_is_a_failure() {
        let page = "<!DOCTYPE html><html><body>You are about to visit...</body></html>";
        let url = serve(fixed(StatusCode::OK, "text/html", page.to_string())).await;
        let err = WebhookClient::new(&url).unwrap().analyze("AAPL").await.unwrap_err();
        let diag = err.downcast_ref::<DispatchError>().unwrap();
        assert_eq!(diag.stage, DispatchStage::HtmlInterstitial);
        assert_eq!(diag.raw_body.as_deref(), Some(page));
    }

    #[tokio::test]
    async fn malformed_json_is_a_failure() {
        let url = serve(fixed(StatusCode::OK, "application/json", "{\"message\": ".to_string())).await;
        let err = WebhookClient::new(&url).unwrap().analyze("AAPL").await.unwrap_err();
        let diag = err.downcast_ref::<DispatchError>().unwrap();
        assert_eq!(diag.stage, DispatchStage::JsonParse);
    }

    #[tokio::test]
    async fn non_success_status_is_a_failure() {
        let url = serve(fixed(
            StatusCode::INTERNAL_SERVER_ERROR,
            "application/json",
            json!({ "message": "boom" }).to_string(),
        ))
        .await;
        let err = WebhookClient::new(&url).unwrap().analyze("AAPL").await.unwrap_err();
        let diag = err.downcast_ref::<DispatchError>().unwrap();
        assert_eq!(diag.stage, DispatchStage::HttpStatus);
        assert_eq!(diag.status, Some(500));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = WebhookClient::new(&format!("http://{addr}/webhook/test")).unwrap();
        let err = client.analyze("AAPL").await.unwrap_err();
        let diag = err.downcast_ref::<DispatchError>().unwrap();
        assert_eq!(diag.stage, DispatchStage::Transport);
    }

    #[test]
    fn detects_html_case_insensitively() {
        assert!(looks_like_html("<!doctype html><p>x</p>"));
        assert!(looks_like_html("  <HTML lang=\"en\">"));
        assert!(!looks_like_html("{\"message\": \"<b>bold</b>\"}"));
    }

    #[test]
    fn rejects_empty_endpoint() {
        assert!(WebhookClient::new("   ").is_err());
        assert!(WebhookClient::new("not a url").is_err());
    }
}
