//! Display-ready view of an [`Analysis`], independent of any rendering backend.

use crate::domain::analysis::{Analysis, RiskLevel, Sentiment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Favorable,
    Unfavorable,
    Neutral,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub label: &'static str,
    pub value: String,
    pub tone: Option<Tone>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub symbol: String,
    pub sentiment_icon: &'static str,
    pub sentiment_label: String,
    pub sentiment_tone: Tone,
    /// Current price, change, volume, market cap.
    pub primary: [Metric; 4],
    /// P/E ratio, risk level.
    pub secondary: [Metric; 2],
    pub recommendations: Vec<String>,
}

pub const RECOMMENDATIONS_HEADING: &str = "AI Recommendations";

impl CardView {
    pub fn from_analysis(a: &Analysis) -> Self {
        Self {
            symbol: a.symbol.clone(),
            sentiment_icon: sentiment_icon(a.sentiment),
            sentiment_label: capitalize(a.sentiment.as_str()),
            sentiment_tone: sentiment_tone(a.sentiment),
            primary: [
                Metric {
                    label: "Current Price",
                    value: format_price(a.price),
                    tone: None,
                },
                Metric {
                    label: "Change",
                    value: format_change(a.change, a.change_percent),
                    tone: Some(change_tone(a.change)),
                },
                Metric {
                    label: "Volume",
                    value: a.volume.clone(),
                    tone: None,
                },
                Metric {
                    label: "Market Cap",
                    value: a.market_cap.clone(),
                    tone: None,
                },
            ],
            secondary: [
                Metric {
                    label: "P/E Ratio",
                    value: format!("{:.2}", a.pe_ratio),
                    tone: None,
                },
                Metric {
                    label: "Risk Level",
                    value: capitalize(a.risk_level.as_str()),
                    tone: Some(risk_tone(a.risk_level)),
                },
            ],
            recommendations: a.recommendations.clone(),
        }
    }
}

pub fn sentiment_tone(s: Sentiment) -> Tone {
    match s {
        Sentiment::Bullish => Tone::Favorable,
        Sentiment::Bearish => Tone::Unfavorable,
        Sentiment::Neutral => Tone::Neutral,
    }
}

pub fn risk_tone(r: RiskLevel) -> Tone {
    match r {
        RiskLevel::Low => Tone::Favorable,
        RiskLevel::High => Tone::Unfavorable,
        RiskLevel::Medium => Tone::Neutral,
    }
}

pub fn change_tone(change: f64) -> Tone {
    if change >= 0.0 {
        Tone::Favorable
    } else {
        Tone::Unfavorable
    }
}

pub fn sentiment_icon(s: Sentiment) -> &'static str {
    match s {
        Sentiment::Bullish => "▲",
        Sentiment::Bearish => "▼",
        Sentiment::Neutral => "■",
    }
}

pub fn format_price(price: f64) -> String {
    format!("${price:.2}")
}

pub fn format_change(change: f64, change_percent: f64) -> String {
    let sign = if change >= 0.0 { "+" } else { "-" };
    format!(
        "{sign}${:.2} ({sign}{:.2}%)",
        change.abs(),
        change_percent.abs()
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Analysis {
        Analysis {
            symbol: "AAPL".to_string(),
            price: 150.0,
            change: 2.0,
            change_percent: 1.35,
            volume: "1000".to_string(),
            market_cap: "$2T".to_string(),
            pe_ratio: 25.0,
            recommendations: vec!["r1".to_string()],
            sentiment: Sentiment::Bullish,
            risk_level: RiskLevel::Low,
        }
    }

    #[test]
    fn builds_card_for_positive_move() {
        let card = CardView::from_analysis(&sample());
        assert_eq!(card.symbol, "AAPL");
        assert_eq!(card.sentiment_icon, "▲");
        assert_eq!(card.sentiment_label, "Bullish");
        assert_eq!(card.sentiment_tone, Tone::Favorable);
        assert_eq!(card.primary[0].value, "$150.00");
        assert_eq!(card.primary[1].value, "+$2.00 (+1.35%)");
        assert_eq!(card.primary[1].tone, Some(Tone::Favorable));
        assert_eq!(card.primary[2].value, "1000");
        assert_eq!(card.primary[3].value, "$2T");
        assert_eq!(card.secondary[0].value, "25.00");
        assert_eq!(card.secondary[1].value, "Low");
        assert_eq!(card.secondary[1].tone, Some(Tone::Favorable));
        assert_eq!(card.recommendations, vec!["r1".to_string()]);
    }

    #[test]
    fn negative_change_and_high_risk_are_unfavorable() {
        let mut a = sample();
        a.change = -3.456;
        a.change_percent = -2.1;
        a.sentiment = Sentiment::Bearish;
        a.risk_level = RiskLevel::High;

        let card = CardView::from_analysis(&a);
        assert_eq!(card.primary[1].value, "-$3.46 (-2.10%)");
        assert_eq!(card.primary[1].tone, Some(Tone::Unfavorable));
        assert_eq!(card.sentiment_icon, "▼");
        assert_eq!(card.sentiment_tone, Tone::Unfavorable);
        assert_eq!(card.secondary[1].tone, Some(Tone::Unfavorable));
    }

    #[test]
    fn neutral_values_get_neutral_tone() {
        let mut a = sample();
        a.sentiment = Sentiment::Neutral;
        a.risk_level = RiskLevel::Medium;
        let card = CardView::from_analysis(&a);
        assert_eq!(card.sentiment_icon, "■");
        assert_eq!(card.sentiment_label, "Neutral");
        assert_eq!(card.sentiment_tone, Tone::Neutral);
        assert_eq!(card.secondary[1].value, "Medium");
        assert_eq!(card.secondary[1].tone, Some(Tone::Neutral));
    }
}
