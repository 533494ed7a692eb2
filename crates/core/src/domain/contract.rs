use crate::domain::analysis::{Analysis, RiskLevel, Sentiment};
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_REPLY_TEXT: &str = "Here's my analysis:";
const MISSING: &str = "N/A";

/// Body returned by the analysis webhook. Every field is optional and loosely
/// typed; `into_reply` applies the fallbacks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookResponse {
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub analysis: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAnalysis {
    #[serde(default)]
    pub symbol: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub change: Option<Value>,
    #[serde(default)]
    pub change_percent: Option<Value>,
    #[serde(default)]
    pub volume: Option<Value>,
    #[serde(default)]
    pub market_cap: Option<Value>,
    #[serde(default)]
    pub pe: Option<Value>,
    #[serde(default)]
    pub pe_ratio: Option<Value>,
    #[serde(default)]
    pub recommendations: Option<Value>,
    #[serde(default)]
    pub sentiment: Option<Value>,
    #[serde(default)]
    pub risk_level: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReply {
    pub text: String,
    pub analysis: Option<Analysis>,
}

impl WebhookResponse {
    /// Non-object bodies (arrays, scalars) carry neither text nor analysis.
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_default()
    }

    pub fn into_reply(self) -> AnalysisReply {
        let text = self
            .message
            .as_ref()
            .and_then(non_empty_str)
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_REPLY_TEXT.to_string());

        let analysis = self
            .analysis
            .filter(Value::is_object)
            .and_then(|v| serde_json::from_value::<WebhookAnalysis>(v).ok())
            .map(WebhookAnalysis::into_analysis);

        AnalysisReply { text, analysis }
    }
}

impl WebhookAnalysis {
    pub fn into_analysis(self) -> Analysis {
        let symbol = self
            .symbol
            .as_ref()
            .and_then(non_empty_str)
            .map(|s| s.trim().to_uppercase())
            .unwrap_or_else(|| MISSING.to_string());

        let recommendations = match self.recommendations {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        let sentiment = match self.sentiment.as_ref().and_then(non_empty_str) {
            Some(raw) => Sentiment::parse(raw).unwrap_or_else(|| {
                tracing::debug!(sentiment = raw, "unrecognized sentiment; using neutral");
                Sentiment::default()
            }),
            None => Sentiment::default(),
        };

        let risk_level = match self.risk_level.as_ref().and_then(non_empty_str) {
            Some(raw) => RiskLevel::parse(raw).unwrap_or_else(|| {
                tracing::debug!(risk_level = raw, "unrecognized risk level; using medium");
                RiskLevel::default()
            }),
            None => RiskLevel::default(),
        };

        Analysis {
            symbol,
            price: number_or_zero(self.price.as_ref()),
            change: number_or_zero(self.change.as_ref()),
            change_percent: number_or_zero(self.change_percent.as_ref()),
            volume: display_or_missing(self.volume.as_ref()),
            market_cap: display_or_missing(self.market_cap.as_ref()),
            pe_ratio: number_or_zero(self.pe.as_ref().or(self.pe_ratio.as_ref())),
            recommendations,
            sentiment,
            risk_level,
        }
    }
}

fn non_empty_str(v: &Value) -> Option<&str> {
    v.as_str().filter(|s| !s.trim().is_empty())
}

fn number_or_zero(v: Option<&Value>) -> f64 {
    let n = match v {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite()).unwrap_or(0.0)
}

fn display_or_missing(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => MISSING.to_string(),
    }
}
