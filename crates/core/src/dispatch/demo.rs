use crate::dispatch::AnalysisClient;
use crate::domain::analysis::{Analysis, RiskLevel, Sentiment};
use crate::domain::contract::{AnalysisReply, DEFAULT_REPLY_TEXT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;

const DEFAULT_LATENCY: Duration = Duration::from_millis(900);

const DEMO_RECOMMENDATIONS: [&str; 3] = [
    "Strong fundamentals with consistent revenue growth",
    "Recent market volatility presents buying opportunity",
    "Consider position sizing based on current portfolio allocation",
];

/// Offline analysis source producing random placeholder numbers.
#[derive(Debug)]
pub struct DemoClient {
    rng: Mutex<StdRng>,
    latency: Duration,
}

impl DemoClient {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            latency: DEFAULT_LATENCY,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn generate(&self, query: &str) -> Analysis {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let volume = rng.gen_range(0..10_000_000u64);
        let risk_level = match rng.gen_range(0..3) {
            0 => RiskLevel::Low,
            1 => RiskLevel::Medium,
            _ => RiskLevel::High,
        };

        Analysis {
            symbol: extract_symbol(query).unwrap_or_else(|| "N/A".to_string()),
            price: rng.gen_range(50.0_f64..550.0),
            change: rng.gen_range(-10.0_f64..10.0),
            change_percent: rng.gen_range(-5.0_f64..5.0),
            volume: group_thousands(volume),
            market_cap: format!("${:.1}B", rng.gen_range(50.0_f64..550.0)),
            pe_ratio: rng.gen_range(5.0_f64..35.0),
            recommendations: DEMO_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect(),
            sentiment: if rng.gen_bool(0.5) {
                Sentiment::Bullish
            } else {
                Sentiment::Bearish
            },
            risk_level,
        }
    }
}

impl Default for DemoClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AnalysisClient for DemoClient {
    fn source_name(&self) -> &'static str {
        "demo"
    }

    async fn analyze(&self, query: &str) -> anyhow::Result<AnalysisReply> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(AnalysisReply {
            text: DEFAULT_REPLY_TEXT.to_string(),
            analysis: Some(self.generate(query)),
        })
    }
}

/// Picks a ticker out of free text: the first all-caps word of 1-5 letters,
/// otherwise the last alphabetic word.
pub fn extract_symbol(query: &str) -> Option<String> {
    let words: Vec<&str> = query
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|w| !w.is_empty())
        .collect();

    words
        .iter()
        .find(|w| w.len() <= 5 && w.chars().all(|c| c.is_ascii_uppercase()))
        .or_else(|| words.last())
        .map(|w| w.to_ascii_uppercase())
}

pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
