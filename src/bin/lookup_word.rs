//! Lookup binary - performs one dictionary lookup and prints the record
//! without sending anything to Telegram
//!
//! Usage:
//!   cargo run --bin lookup -- ucho              # default dictionary
//!   cargo run --bin lookup -- ucho RU-SK        # explicit dictionary

use std::time::Duration;

use anyhow::{bail, Context, Result};

use slovniky_bot::catalog::Dictionary;
use slovniky_bot::lookup::LookupService;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("slovniky_bot=info".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let word = match args.next() {
        Some(word) => word,
        None => bail!("Usage: lookup <word> [DICT-CODE]"),
    };
    let dict = match args.next() {
        Some(code) => Dictionary::from_code(&code).context("Unknown dictionary code")?,
        None => Dictionary::default(),
    };

    let service = LookupService::new(Duration::from_secs(10))?;
    let record = service.lookup(&word, dict).await?;

    if record.senses.is_empty() {
        println!(
            "No translation found in {} {}",
            dict.flag(),
            dict.code()
        );
    } else {
        println!("{} - {}", record.word, record.senses.join(", "));
    }

    if !record.examples.is_empty() {
        println!();
        println!("Examples:");
        for pair in &record.examples {
            println!("  {} - {}", pair.source, pair.target);
        }
    }

    Ok(())
}
