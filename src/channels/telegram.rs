//! Telegram channel — long-polls the Bot API for updates.
//!
//! Native Bot API implementation over reqwest: `getUpdates` feeds the
//! inbound [`EventStream`], and the [`Responder`] methods map to
//! `sendMessage`, `editMessageText`, `deleteMessage`, and
//! `answerCallbackQuery`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::channels::responder::{
    CallbackData, EventStream, IncomingMessage, Responder, TelegramEvent,
};
use crate::dispatch::callback::actions;
use crate::error::ChannelError;

/// Telegram channel — connects to the Bot API via long-polling.
pub struct TelegramChannel {
    bot_token: SecretString,
    poll_timeout_secs: u64,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(bot_token: SecretString, poll_timeout_secs: u64) -> Self {
        Self {
            bot_token,
            poll_timeout_secs,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        api_url(self.bot_token.expose_secret(), method)
    }

    /// POST a JSON body to a Bot API method, mapping failures through
    /// `to_err`.
    async fn call(
        &self,
        method: &str,
        body: serde_json::Value,
        to_err: impl Fn(String) -> ChannelError,
    ) -> Result<(), ChannelError> {
        let resp = self
            .client
            .post(self.api_url(method))
            .json(&body)
            .send()
            .await
            .map_err(|e| to_err(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            return Err(to_err(format!("{method} returned {status}: {detail}")));
        }
        Ok(())
    }

    /// Start the long-poll loop and return the inbound event stream.
    pub fn start(&self) -> EventStream {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let bot_token = self.bot_token.clone();
        let client = self.client.clone();
        let poll_timeout_secs = self.poll_timeout_secs;

        tokio::spawn(async move {
            let mut offset: i64 = 0;

            tracing::info!("Telegram channel listening for updates...");

            loop {
                let url = api_url(bot_token.expose_secret(), "getUpdates");
                let body = serde_json::json!({
                    "offset": offset,
                    "timeout": poll_timeout_secs,
                    "allowed_updates": ["message", "callback_query"]
                });

                let resp = match client.post(&url).json(&body).send().await {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                let data: serde_json::Value = match resp.json().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("Telegram parse error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                let Some(results) = data.get("result").and_then(serde_json::Value::as_array)
                else {
                    continue;
                };

                for update in results {
                    if let Some(uid) = update.get("update_id").and_then(serde_json::Value::as_i64)
                    {
                        offset = uid + 1;
                    }

                    let Some(event) = parse_update(update) else {
                        continue;
                    };

                    if tx.send(event).is_err() {
                        tracing::info!("Telegram listener channel closed");
                        return;
                    }
                }
            }
        });

        let stream =
            futures::stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|e| (e, rx)) });
        Box::pin(stream)
    }

    /// Verify the bot token against `getMe`.
    pub async fn health_check(&self) -> Result<(), ChannelError> {
        let resp = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| ChannelError::Http(e.to_string()))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ChannelError::Http(format!("getMe returned {}", resp.status())))
        }
    }
}

fn api_url(token: &str, method: &str) -> String {
    format!("https://api.telegram.org/bot{token}/{method}")
}

/// Reduce one `getUpdates` entry to a [`TelegramEvent`], dropping
/// anything that is neither a text message nor a data callback.
fn parse_update(update: &serde_json::Value) -> Option<TelegramEvent> {
    if let Some(message) = update.get("message") {
        let text = message.get("text")?.as_str()?;
        let user_id = message.get("from")?.get("id")?.as_i64()?;
        let message_id = message.get("message_id")?.as_i64()?;
        return Some(TelegramEvent::Message(IncomingMessage {
            user_id,
            text: text.to_string(),
            message_id,
        }));
    }

    if let Some(callback) = update.get("callback_query") {
        let action = callback.get("data")?.as_str()?;
        let from_id = callback.get("from")?.get("id")?.as_i64()?;
        let message_id = callback.get("message")?.get("message_id")?.as_i64()?;
        let callback_id = callback.get("id")?.as_str()?;
        return Some(TelegramEvent::Callback(CallbackData {
            from_id,
            message_id,
            action: action.to_string(),
            callback_id: callback_id.to_string(),
        }));
    }

    None
}

/// The inline keyboard attached to every editable contact view.
fn edit_contact_keyboard() -> serde_json::Value {
    serde_json::json!({
        "inline_keyboard": [
            [
                { "text": "Change name", "callback_data": actions::CHANGE_CONTACT_NAME },
                { "text": "Change phone", "callback_data": actions::CHANGE_CONTACT_PHONE },
            ],
            [
                { "text": "Change birthday", "callback_data": actions::CHANGE_CONTACT_BIRTHDAY },
                { "text": "Change description", "callback_data": actions::CHANGE_CONTACT_DESCRIPTION },
            ],
            [
                { "text": "Delete contact", "callback_data": actions::DELETE_CONTACT },
            ],
            [
                { "text": "Save", "callback_data": actions::CHANGE_CONTACT_DONE },
            ],
        ]
    })
}

// ── Responder implementation ────────────────────────────────────────

#[async_trait]
impl Responder for TelegramChannel {
    async fn send_message(&self, text: &str, user_id: i64) -> Result<(), ChannelError> {
        let body = serde_json::json!({
            "chat_id": user_id,
            "text": text,
        });
        self.call("sendMessage", body, ChannelError::SendFailed).await
    }

    async fn send_contact_view(&self, text: &str, user_id: i64) -> Result<(), ChannelError> {
        let body = serde_json::json!({
            "chat_id": user_id,
            "text": text,
            "reply_markup": edit_contact_keyboard(),
        });
        self.call("sendMessage", body, ChannelError::SendFailed).await
    }

    async fn edit_contact_view(
        &self,
        text: &str,
        user_id: i64,
        message_id: i64,
    ) -> Result<(), ChannelError> {
        let body = serde_json::json!({
            "chat_id": user_id,
            "message_id": message_id,
            "text": text,
            "reply_markup": edit_contact_keyboard(),
        });
        self.call("editMessageText", body, |reason| ChannelError::EditFailed {
            message_id,
            reason,
        })
        .await
    }

    async fn delete_message(&self, user_id: i64, message_id: i64) -> Result<(), ChannelError> {
        let body = serde_json::json!({
            "chat_id": user_id,
            "message_id": message_id,
        });
        self.call("deleteMessage", body, |reason| ChannelError::DeleteFailed {
            message_id,
            reason,
        })
        .await
    }

    async fn answer_callback(&self, text: &str, callback_id: &str) -> Result<(), ChannelError> {
        let body = serde_json::json!({
            "callback_query_id": callback_id,
            "text": text,
        });
        self.call("answerCallbackQuery", body, |reason| {
            ChannelError::AnswerFailed {
                callback_id: callback_id.to_string(),
                reason,
            }
        })
        .await
    }
}

// ── Tests ───────────────────────────────────────────────────────────
