pub mod dispatch;
pub mod domain;
pub mod present;
pub mod session;
pub mod share;
pub mod store;

pub mod config {
    use anyhow::ensure;

    pub const DEFAULT_WEBHOOK_URL: &str = "https://totally-eternal-shrew.ngrok-free.app/webhook/a0ea8e36-8d95-453d-a776-6dbc9ce49b03";
    pub const DEFAULT_SHARE_URL: &str = "https://totally-eternal-shrew.ngrok-free.app";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub webhook_url: String,
        pub share_url: String,
        pub sentry_dsn: Option<String>,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                webhook_url: DEFAULT_WEBHOOK_URL.to_string(),
                share_url: DEFAULT_SHARE_URL.to_string(),
                sentry_dsn: None,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let defaults = Self::default();
            Ok(Self {
                webhook_url: std::env::var("STOCKSENSE_WEBHOOK_URL")
                    .unwrap_or(defaults.webhook_url),
                share_url: std::env::var("STOCKSENSE_SHARE_URL").unwrap_or(defaults.share_url),
                sentry_dsn: std::env::var("SENTRY_DSN").ok().filter(|s| !s.trim().is_empty()),
            })
        }

        pub fn require_webhook_url(&self) -> anyhow::Result<&str> {
            let url = self.webhook_url.trim();
            ensure!(!url.is_empty(), "STOCKSENSE_WEBHOOK_URL must be non-empty");
            Ok(url)
        }
    }

}
