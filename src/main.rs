use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use slovniky_bot::config::Config;
use slovniky_bot::lookup::LookupService;
use slovniky_bot::retry::{with_retry, RetryConfig};
use slovniky_bot::state::ChatPreferences;
use slovniky_bot::{telegram, webhook};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("slovniky_bot=info".parse()?),
        )
        .init();

    info!("Starting slovniky-bot");

    // Load configuration from environment
    let config = Config::from_env()?;
    let prefs = ChatPreferences::new();
    let lookup = LookupService::new(Duration::from_secs(config.lookup_timeout_secs))?;

    // The network may not be up yet right after boot
    let startup_retry = RetryConfig::startup();
    with_retry(&startup_retry, "setMyCommands", || {
        telegram::set_my_commands(&config)
    })
    .await?;

    if config.use_polling {
        // Don't answer old messages
        telegram::delete_webhook(&config, true).await?;
        telegram::run_polling(&config, &prefs, &lookup).await
    } else {
        with_retry(&startup_retry, "setWebhook", || {
            telegram::set_webhook(&config)
        })
        .await?;

        let state = webhook::AppState {
            config: Arc::new(config),
            prefs: Arc::new(prefs),
            lookup: Arc::new(lookup),
        };
        webhook::serve(state).await
    }
}
