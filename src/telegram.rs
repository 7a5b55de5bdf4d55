//! Telegram Bot API types, calls and the update handler.
//!
//! The bot understands three commands (`/start`, `/help`, `/dict`) and
//! treats any other text message as a word to look up. Examples are sent on
//! demand through an inline button, packed into as few messages as the
//! per-message limit allows.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::Dictionary;
use crate::chunker::chunk_lines;
use crate::config::Config;
use crate::extract::TranslationRecord;
use crate::lookup::LookupService;
use crate::state::ChatPreferences;

/// Callback-data prefix for dictionary selection buttons.
pub const DICTIONARY_CALLBACK: &str = "set_dictionary_";
/// Callback data of the "Show examples" button.
pub const EXAMPLES_CALLBACK: &str = "show_examples";

/// Long-poll timeout for getUpdates, in seconds.
const POLL_TIMEOUT_SECS: u64 = 30;

// Telegram webhook types

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: String,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[allow(dead_code)]
    pub r#type: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest {
    chat_id: String,
    text: String,
    parse_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

/// Escape special characters for Telegram's MarkdownV2 parse mode.
///
/// Per Telegram Bot API docs, MarkdownV2 requires escaping 18 special
/// characters: _ * [ ] ( ) ~ ` > # + - = | { } . !
pub fn escape_markdownv2(text: &str) -> String {
    let special_chars = [
        '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
    ];

    let mut result = String::with_capacity(text.len() * 2);

    for c in text.chars() {
        if special_chars.contains(&c) {
            result.push('\\');
        }
        result.push(c);
    }

    result
}

// ==================== Message Formatting ====================

/// Reply line for a successful lookup: the word in bold, senses comma-joined.
///
/// The word stays the first whitespace-delimited token so the examples
/// callback can recover it from the rendered message later.
pub fn format_summary(record: &TranslationRecord) -> String {
    format!(
        "*{}* \\- {}",
        escape_markdownv2(&record.word),
        escape_markdownv2(&record.senses.join(", "))
    )
}

/// One formatted line per example pair: bold source, plain target.
pub fn format_example_lines(record: &TranslationRecord) -> Vec<String> {
    record
        .examples
        .iter()
        .map(|pair| {
            format!(
                "*{}* \\- {}",
                escape_markdownv2(&pair.source),
                escape_markdownv2(&pair.target)
            )
        })
        .collect()
}

fn no_translation_text(dict: Dictionary) -> String {
    escape_markdownv2(&format!(
        "No translation found in {} {}, try something else 🤔",
        dict.flag(),
        dict.code()
    ))
}

fn failure_text() -> String {
    escape_markdownv2("Sorry, something went wrong 😢")
}

fn start_text(dict: Dictionary) -> String {
    format!(
        "{}\n*{}* {}",
        escape_markdownv2("Hello! Send me a word to translate 😊"),
        escape_markdownv2("Current dictionary:"),
        escape_markdownv2(&format!("{} {}", dict.flag(), dict.code()))
    )
}

fn help_text(dict: Dictionary) -> String {
    let dictionaries = Dictionary::all()
        .iter()
        .map(|d| format!("{} {}", d.flag(), d.code()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "🤖 *{}*\n\n{}\n\n🌐 *{}* {}",
        escape_markdownv2("SlovnikyBot Help"),
        escape_markdownv2(&format!(
            "Here's what I can do:\n\
             • /start – start the bot\n\
             • /help – show this help message\n\
             • /dict – choose the dictionary ({})\n\n\
             Just send me any word and I'll translate it for you!\n\
             If examples are available, tap the button to see them.",
            dictionaries
        )),
        escape_markdownv2("Current dictionary:"),
        escape_markdownv2(&format!("{} {}", dict.flag(), dict.code()))
    )
}

/// Keyboard with one button per catalog dictionary, in catalog order.
fn dictionary_keyboard() -> InlineKeyboardMarkup {
    let buttons = Dictionary::all()
        .iter()
        .map(|dict| {
            vec![InlineKeyboardButton {
                text: format!("{} {}", dict.flag(), dict.code()),
                callback_data: format!("{}{}", DICTIONARY_CALLBACK, dict.code()),
            }]
        })
        .collect();

    InlineKeyboardMarkup {
        inline_keyboard: buttons,
    }
}

fn examples_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![vec![InlineKeyboardButton {
            text: "Show examples".to_string(),
            callback_data: EXAMPLES_CALLBACK.to_string(),
        }]],
    }
}

// ==================== Bot API Calls ====================

fn api_url(config: &Config, method: &str) -> String {
    format!(
        "{}/bot{}/{}",
        config.telegram_api_url, config.telegram_bot_token, method
    )
}

/// Send a Telegram message to a specific chat
pub async fn send_message(config: &Config, chat_id: i64, text: &str) -> Result<()> {
    send_message_with_keyboard(config, chat_id, text, None).await
}

async fn send_message_with_keyboard(
    config: &Config,
    chat_id: i64,
    text: &str,
    reply_markup: Option<InlineKeyboardMarkup>,
) -> Result<()> {
    let client = reqwest::Client::new();

    let request = SendMessageRequest {
        chat_id: chat_id.to_string(),
        text: text.to_string(),
        parse_mode: "MarkdownV2".to_string(),
        reply_markup,
    };

    let response = client
        .post(api_url(config, "sendMessage"))
        .json(&request)
        .send()
        .await
        .context("Failed to send request to Telegram API")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        bail!("Telegram API error ({}): {}", status, body);
    }

    Ok(())
}

/// Acknowledge a callback query so the client stops showing a spinner.
pub async fn answer_callback_query(config: &Config, callback_query_id: &str) -> Result<()> {
    let client = reqwest::Client::new();

    let response = client
        .post(api_url(config, "answerCallbackQuery"))
        .json(&serde_json::json!({ "callback_query_id": callback_query_id }))
        .send()
        .await
        .context("Failed to send request to Telegram API")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        bail!("Telegram API error ({}): {}", status, body);
    }

    Ok(())
}

/// Register the bot's command menu.
pub async fn set_my_commands(config: &Config) -> Result<()> {
    let client = reqwest::Client::new();

    let commands = serde_json::json!({
        "commands": [
            { "command": "start", "description": "Start bot" },
            { "command": "help", "description": "Read help" },
            { "command": "dict", "description": "Choose dictionary" },
        ]
    });

    let response = client
        .post(api_url(config, "setMyCommands"))
        .json(&commands)
        .send()
        .await
        .context("Failed to send request to Telegram API")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        bail!("Telegram API error ({}): {}", status, body);
    }

    Ok(())
}

/// Point Telegram at the webhook endpoint, dropping any backlog.
pub async fn set_webhook(config: &Config) -> Result<()> {
    let client = reqwest::Client::new();

    let mut body = serde_json::json!({
        "url": config.webhook_url(),
        "drop_pending_updates": true,
    });
    if !config.telegram_webhook_secret.is_empty() {
        body["secret_token"] = serde_json::json!(config.telegram_webhook_secret);
    }

    let response = client
        .post(api_url(config, "setWebhook"))
        .json(&body)
        .send()
        .await
        .context("Failed to send request to Telegram API")?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        bail!("Telegram API error ({}): {}", status, text);
    }

    info!("Webhook set to: {}", config.webhook_url());
    Ok(())
}

/// Remove the webhook; with `drop_pending` old updates are discarded too.
pub async fn delete_webhook(config: &Config, drop_pending: bool) -> Result<()> {
    let client = reqwest::Client::new();

    let response = client
        .post(api_url(config, "deleteWebhook"))
        .json(&serde_json::json!({ "drop_pending_updates": drop_pending }))
        .send()
        .await
        .context("Failed to send request to Telegram API")?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        bail!("Telegram API error ({}): {}", status, text);
    }

    Ok(())
}

/// Long-poll for updates past `offset`.
async fn get_updates(config: &Config, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs + 5))
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .post(api_url(config, "getUpdates"))
        .json(&serde_json::json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message", "callback_query"],
        }))
        .send()
        .await
        .context("Failed to send request to Telegram API")?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        bail!("Telegram API error ({}): {}", status, text);
    }

    let updates: UpdatesResponse = response
        .json()
        .await
        .context("Failed to parse getUpdates response")?;

    if !updates.ok {
        bail!("getUpdates returned ok=false");
    }

    Ok(updates.result)
}

/// Long-polling loop: fetch updates and dispatch them until the process is
/// stopped. A failed batch is logged and retried after a short pause.
pub async fn run_polling(
    config: &Config,
    prefs: &ChatPreferences,
    lookup: &LookupService,
) -> Result<()> {
    info!("Starting bot in POLLING mode...");

    let mut offset: i64 = 0;

    loop {
        let updates = match get_updates(config, offset, POLL_TIMEOUT_SECS).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!("getUpdates failed: {:#}", e);
                tokio::time::sleep(std::time::Duration::from_secs(3)).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            if let Err(e) = handle_update(config, prefs, lookup, update).await {
                warn!("Failed to handle update: {:#}", e);
            }
        }
    }
}

// ==================== Update Handling ====================

/// Dispatch one incoming update. Never propagates lookup failures to the
/// caller; the user gets an apology message instead.
pub async fn handle_update(
    config: &Config,
    prefs: &ChatPreferences,
    lookup: &LookupService,
    update: Update,
) -> Result<()> {
    if let Some(callback) = update.callback_query {
        return handle_callback(config, prefs, lookup, callback).await;
    }

    let message = match update.message {
        Some(msg) => msg,
        None => return Ok(()), // Not a message update, ignore
    };

    let text = match message.text {
        Some(t) => t,
        None => return Ok(()), // No text, ignore
    };

    let chat_id = message.chat.id;
    let user_id = message.from.as_ref().map(|u| u.id).unwrap_or_default();

    match text.as_str() {
        "/start" => {
            let dict = prefs.dictionary_for(chat_id);
            send_message(config, chat_id, &start_text(dict)).await?;
        }
        "/help" => {
            let dict = prefs.dictionary_for(chat_id);
            send_message(config, chat_id, &help_text(dict)).await?;
        }
        "/dict" => {
            send_message_with_keyboard(
                config,
                chat_id,
                &escape_markdownv2("Select dictionary:"),
                Some(dictionary_keyboard()),
            )
            .await?;
        }
        other if other.starts_with('/') => {
            debug!("Ignoring unknown command from {}: {}", user_id, other);
        }
        word => {
            info!("User {} requested translation for '{}'", user_id, word);
            handle_word(config, prefs, lookup, chat_id, word).await?;
        }
    }

    Ok(())
}

/// Look a word up and reply with its senses.
async fn handle_word(
    config: &Config,
    prefs: &ChatPreferences,
    lookup: &LookupService,
    chat_id: i64,
    word: &str,
) -> Result<()> {
    let dict = prefs.dictionary_for(chat_id);

    match lookup.lookup(word, dict).await {
        Err(e) => {
            warn!("Lookup failed for '{}' in {}: {}", word, dict.code(), e);
            send_message(config, chat_id, &failure_text()).await
        }
        Ok(record) => {
            // The button is offered whenever examples exist, even when the
            // word itself has no sense list
            let keyboard = if record.examples.is_empty() {
                None
            } else {
                Some(examples_keyboard())
            };

            let text = if record.senses.is_empty() {
                no_translation_text(dict)
            } else {
                format_summary(&record)
            };

            send_message_with_keyboard(config, chat_id, &text, keyboard).await
        }
    }
}

/// Handle a button press: dictionary selection or the examples request.
async fn handle_callback(
    config: &Config,
    prefs: &ChatPreferences,
    lookup: &LookupService,
    callback: CallbackQuery,
) -> Result<()> {
    let data = callback.data.as_deref().unwrap_or_default();

    if let Some(code) = data.strip_prefix(DICTIONARY_CALLBACK) {
        if let Some(message) = &callback.message {
            if let Ok(dict) = Dictionary::from_code(code) {
                prefs.set_dictionary(message.chat.id, dict);
                info!("Chat {} switched dictionary to {}", message.chat.id, code);

                let confirmation = escape_markdownv2(&format!(
                    "✅ Dictionary set to {} {}",
                    dict.flag(),
                    dict.code()
                ));
                send_message(config, message.chat.id, &confirmation).await?;
            }
        }
    } else if data == EXAMPLES_CALLBACK {
        if let Some(message) = &callback.message {
            handle_examples(config, prefs, lookup, message).await?;
        }
    } else {
        debug!("Ignoring unknown callback data: {}", data);
    }

    // Request successfully completed
    answer_callback_query(config, &callback.id).await
}

/// Re-run the lookup for the word the button's message was about and send
/// every example pair, chunked under the message limit.
async fn handle_examples(
    config: &Config,
    prefs: &ChatPreferences,
    lookup: &LookupService,
    message: &Message,
) -> Result<()> {
    // The translated word is the first token of the previous reply
    let word = match message
        .text
        .as_deref()
        .and_then(|t| t.split_whitespace().next())
    {
        Some(word) => word,
        None => return Ok(()),
    };

    let chat_id = message.chat.id;
    info!("Requested examples for '{}'", word);

    let dict = prefs.dictionary_for(chat_id);
    let chunks = match lookup.lookup(word, dict).await {
        Err(e) => {
            warn!("Example lookup failed for '{}': {}", word, e);
            vec![failure_text()]
        }
        Ok(record) if record.examples.is_empty() => {
            vec![escape_markdownv2("No examples found 😢")]
        }
        Ok(record) => chunk_lines(&format_example_lines(&record), config.max_message_len),
    };

    for chunk in chunks {
        send_message(config, chat_id, &chunk).await?;
    }

    Ok(())
}
