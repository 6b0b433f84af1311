//! Reply texts, keyboard layouts and search-result rendering.
//!
//! Replies are sent in HTML parse mode, so catalog values are escaped before
//! they are embedded.

use granat_catalog::CatalogRecord;
use granat_telegram::{OutboundMessage, ParseMode, ReplyKeyboardMarkup};

use crate::bot_triggers::{
    StaticTopic, BACK_LABEL, CHANGES_LABEL, FIND_COMPONENT_LABEL, GUIDES_LABEL, ICON_LABEL,
    MOBILE_COMPONENT_LABEL, SUGGEST_LABEL, SUPPORT_LABEL, WEB_COMPONENT_LABEL,
};

/// Largest text a single result message may carry.
pub const REPLY_SPLIT_CHARS: usize = 4000;

pub const WELCOME_TEXT: &str = "Добрый день!\nЯ помощник Дизайн-системы.";
pub const MAIN_MENU_TEXT: &str = "Вы в главном меню:";
pub const CATEGORY_PROMPT_TEXT: &str = "Выберите тип компонента:";
pub const QUERY_PROMPT_TEXT: &str = "Введите название компонента:";

const GUIDES_TEXT: &str = "Хранилище правил и рекомендаций дизайн-системы в Figma: <a href=\"https://www.figma.com/design/5ZYTwB6jw2wutqg60sc4Ff/Granat-Guides-WIP?node-id=181-20673\">Granat Guides</a>";
const SUGGEST_TEXT: &str = "➡️ Нашли баг? Заводите задачу в GitLab.";
const ICON_TEXT: &str = "➡️ Ознакомьтесь с требованиями к иконкам в GitLab.";
const CHANGES_TEXT: &str = "Последние изменения в DS GRANAT: https://t.me/c/1397080567/12194";
const SUPPORT_TEXT: &str = "➡️ Закрытая группа DS Community в Telegram\n\n1. Авторизуйтесь в корпоративном боте\n2. Вступите в группу";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardLayout {
    MainMenu,
    CategoryChoice,
    BackOnly,
}

impl KeyboardLayout {
    pub fn markup(self) -> ReplyKeyboardMarkup {
        match self {
            Self::MainMenu => ReplyKeyboardMarkup::from_rows(&[
                &[FIND_COMPONENT_LABEL],
                &[GUIDES_LABEL, SUGGEST_LABEL],
                &[ICON_LABEL, CHANGES_LABEL],
                &[SUPPORT_LABEL],
            ]),
            Self::CategoryChoice => ReplyKeyboardMarkup::from_rows(&[
                &[MOBILE_COMPONENT_LABEL, WEB_COMPONENT_LABEL],
                &[BACK_LABEL],
            ]),
            Self::BackOnly => ReplyKeyboardMarkup::from_rows(&[&[BACK_LABEL]]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One reply produced by the router.
pub struct OutboundReply {
    pub text: String,
    pub keyboard: Option<KeyboardLayout>,
}

impl OutboundReply {
    pub fn new(text: impl Into<String>, keyboard: Option<KeyboardLayout>) -> Self {
        Self {
            text: text.into(),
            keyboard,
        }
    }

    pub fn to_message(&self, chat_id: i64) -> OutboundMessage {
        OutboundMessage {
            chat_id,
            text: self.text.clone(),
            parse_mode: ParseMode::Html,
            keyboard: self.keyboard.map(KeyboardLayout::markup),
        }
    }
}

pub fn welcome_reply() -> OutboundReply {
    OutboundReply::new(WELCOME_TEXT, Some(KeyboardLayout::MainMenu))
}

pub fn main_menu_reply() -> OutboundReply {
    OutboundReply::new(MAIN_MENU_TEXT, Some(KeyboardLayout::MainMenu))
}

pub fn category_choice_reply() -> OutboundReply {
    OutboundReply::new(CATEGORY_PROMPT_TEXT, Some(KeyboardLayout::CategoryChoice))
}

pub fn query_prompt_reply() -> OutboundReply {
    OutboundReply::new(QUERY_PROMPT_TEXT, Some(KeyboardLayout::BackOnly))
}

pub fn static_info_reply(topic: StaticTopic) -> OutboundReply {
    match topic {
        StaticTopic::Guides => OutboundReply::new(GUIDES_TEXT, Some(KeyboardLayout::BackOnly)),
        StaticTopic::Suggest => OutboundReply::new(SUGGEST_TEXT, Some(KeyboardLayout::BackOnly)),
        StaticTopic::Icon => OutboundReply::new(ICON_TEXT, Some(KeyboardLayout::BackOnly)),
        StaticTopic::Changes => OutboundReply::new(CHANGES_TEXT, None),
        StaticTopic::Support => OutboundReply::new(SUPPORT_TEXT, Some(KeyboardLayout::BackOnly)),
    }
}

/// Escapes text for Telegram HTML parse mode.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub fn format_record_entry(record: &CatalogRecord) -> String {
    format!(
        "<b>{}</b> из <b>{}</b>\n{}",
        escape_html(&record.name),
        escape_html(&record.group),
        escape_html(&record.link)
    )
}

pub fn not_found_reply(query: &str) -> OutboundReply {
    OutboundReply::new(
        format!(
            "Компоненты по запросу \"{}\" не найдены.",
            escape_html(query.trim())
        ),
        None,
    )
}

/// Renders search matches into one or more replies.
///
/// The header always reports the full match count; at most `display_cap`
/// entries are listed and the rest are summarized in a trailing line.
pub fn render_search_replies(
    query: &str,
    matches: &[CatalogRecord],
    display_cap: usize,
) -> Vec<OutboundReply> {
    if matches.is_empty() {
        return vec![not_found_reply(query)];
    }
    let display_cap = display_cap.max(1);
    let mut blocks = Vec::with_capacity(matches.len().min(display_cap) + 2);
    blocks.push(format!("Найдено: {}", matches.len()));
    blocks.extend(matches.iter().take(display_cap).map(format_record_entry));
    if matches.len() > display_cap {
        blocks.push(format!(
            "Показаны первые {display_cap} из {}. Уточните запрос, чтобы увидеть остальные.",
            matches.len()
        ));
    }
    split_blocks(&blocks, REPLY_SPLIT_CHARS)
        .into_iter()
        .map(|text| OutboundReply::new(text, None))
        .collect()
}

/// Packs blocks separated by blank lines into texts of at most `max_chars`.
/// A block longer than the limit is hard-split on character boundaries.
fn split_blocks(blocks: &[String], max_chars: usize) -> Vec<String> {
    const SEPARATOR: &str = "\n\n";
    let separator_chars = SEPARATOR.chars().count();
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for block in blocks {
        for piece in chunk_text(block, max_chars) {
            let piece_chars = piece.chars().count();
            let joined_chars = if current.is_empty() {
                piece_chars
            } else {
                current_chars + separator_chars + piece_chars
            };
            if joined_chars > max_chars && !current.is_empty() {
                parts.push(std::mem::take(&mut current));
                current_chars = 0;
            }
            if !current.is_empty() {
                current.push_str(SEPARATOR);
                current_chars += separator_chars;
            }
            current.push_str(&piece);
            current_chars += piece_chars;
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    if text.is_empty() || max_chars == 0 {
        return Vec::new();
    }
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    for ch in text.chars() {
        current.push(ch);
        current_len = current_len.saturating_add(1);
        if current_len >= max_chars {
            chunks.push(current);
            current = String::new();
            current_len = 0;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
