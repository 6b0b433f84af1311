//! Bot API wire types consumed and produced by the transport.
//!
//! Only the fields the bot reads are modelled; unknown fields are ignored so
//! update kinds other than `message` decode with `message: None`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Hard per-message limit of the Bot API, in characters.
pub const TELEGRAM_MAX_MESSAGE_CHARS: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub chat: TelegramChat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One entry of a `getUpdates` result or one webhook push body.
pub struct TelegramUpdate {
    pub update_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<TelegramMessage>,
}

impl TelegramUpdate {
    /// Extracts the text chat event, or `None` for non-text updates.
    pub fn to_chat_event(&self) -> Option<InboundChatEvent> {
        let message = self.message.as_ref()?;
        let text = message.text.as_ref()?;
        Some(InboundChatEvent {
            update_id: self.update_id,
            chat_id: message.chat.id,
            text: text.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Text message handed to the conversation router.
pub struct InboundChatEvent {
    pub update_id: i64,
    pub chat_id: i64,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
/// Envelope shared by every Bot API response.
pub struct TelegramApiEnvelope<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    #[default]
    Plain,
    Markdown,
    Html,
}

impl ParseMode {
    /// Value of the `parse_mode` request field; plain text omits it.
    pub fn telegram_value(self) -> Option<&'static str> {
        match self {
            Self::Plain => None,
            Self::Markdown => Some("MarkdownV2"),
            Self::Html => Some("HTML"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardButton {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Persistent reply keyboard shown under the input field.
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
}

impl ReplyKeyboardMarkup {
    /// Builds a resized keyboard from rows of button labels.
    pub fn from_rows(rows: &[&[&str]]) -> Self {
        Self {
            keyboard: rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|label| KeyboardButton {
                            text: (*label).to_string(),
                        })
                        .collect()
                })
                .collect(),
            resize_keyboard: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Reply addressed to one chat.
pub struct OutboundMessage {
    pub chat_id: i64,
    pub text: String,
    pub parse_mode: ParseMode,
    pub keyboard: Option<ReplyKeyboardMarkup>,
}

impl OutboundMessage {
    /// JSON body of a `sendMessage` call.
    pub fn send_message_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("chat_id".to_string(), json!(self.chat_id));
        body.insert("text".to_string(), json!(self.text));
        if let Some(parse_mode) = self.parse_mode.telegram_value() {
            body.insert("parse_mode".to_string(), json!(parse_mode));
        }
        if let Some(keyboard) = &self.keyboard {
            body.insert("reply_markup".to_string(), json!(keyboard));
        }
        Value::Object(body)
    }
}
