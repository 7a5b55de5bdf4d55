use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,
    pub telegram_api_url: String,
    pub telegram_webhook_secret: String,

    // Delivery mode
    pub use_polling: bool,
    pub webhook_host: String,
    pub port: u16,

    // Dictionary lookups
    pub lookup_timeout_secs: u64,
    pub max_message_len: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Telegram
            telegram_bot_token: std::env::var("TELEGRAM_BOT_TOKEN")
                .context("TELEGRAM_BOT_TOKEN not set")?,
            telegram_api_url: std::env::var("TELEGRAM_API_URL")
                .unwrap_or_else(|_| "https://api.telegram.org".to_string()),
            telegram_webhook_secret: std::env::var("TELEGRAM_WEBHOOK_SECRET").unwrap_or_default(),

            // Delivery mode
            use_polling: std::env::var("USE_POLLING")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false),
            webhook_host: std::env::var("WEBHOOK_HOST").unwrap_or_default(),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            // Dictionary lookups
            lookup_timeout_secs: std::env::var("LOOKUP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            max_message_len: std::env::var("MAX_MESSAGE_LEN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(crate::chunker::DEFAULT_MAX_MESSAGE_LEN),
        })
    }

    /// Full URL of the Telegram webhook endpoint.
    pub fn webhook_url(&self) -> String {
        format!("{}/webhook", self.webhook_host)
    }
}
