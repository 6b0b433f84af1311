//! Maps raw chat text to the trigger the transition table understands.
//!
//! Matching is case-insensitive after trimming and whitespace collapse. Menu
//! button labels, slash commands and English aliases are equivalent.

use granat_catalog::CategoryScope;
use granat_core::normalize_text;

pub const FIND_COMPONENT_LABEL: &str = "Найти компонент";
pub const GUIDES_LABEL: &str = "Изучить гайды";
pub const SUGGEST_LABEL: &str = "Предложить доработку";
pub const ICON_LABEL: &str = "Добавить иконку или логотип";
pub const CHANGES_LABEL: &str = "Посмотреть последние изменения";
pub const SUPPORT_LABEL: &str = "Поддержка";
pub const MOBILE_COMPONENT_LABEL: &str = "Мобильный компонент";
pub const WEB_COMPONENT_LABEL: &str = "Веб-компонент";
pub const BACK_LABEL: &str = "Назад";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Informational topics answered with static text.
pub enum StaticTopic {
    Guides,
    Suggest,
    Icon,
    Changes,
    Support,
}

impl StaticTopic {
    pub const ALL: [StaticTopic; 5] = [
        Self::Guides,
        Self::Suggest,
        Self::Icon,
        Self::Changes,
        Self::Support,
    ];

    /// Main-menu button that opens this topic.
    pub fn menu_label(self) -> &'static str {
        match self {
            Self::Guides => GUIDES_LABEL,
            Self::Suggest => SUGGEST_LABEL,
            Self::Icon => ICON_LABEL,
            Self::Changes => CHANGES_LABEL,
            Self::Support => SUPPORT_LABEL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guides => "guides",
            Self::Suggest => "suggest",
            Self::Icon => "icon",
            Self::Changes => "changes",
            Self::Support => "support",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatTrigger {
    Start,
    Back,
    FindComponent,
    Category(CategoryScope),
    StaticInfo(StaticTopic),
    FreeText,
}

/// Classifies one inbound message.
pub fn classify_trigger(text: &str) -> ChatTrigger {
    let normalized = normalize_text(text);
    let key = command_key(&normalized);
    match key {
        "/start" => return ChatTrigger::Start,
        "/search" => return ChatTrigger::FindComponent,
        "/back" | "/menu" => return ChatTrigger::Back,
        "/guides" => return ChatTrigger::StaticInfo(StaticTopic::Guides),
        "/suggest" => return ChatTrigger::StaticInfo(StaticTopic::Suggest),
        "/icon" => return ChatTrigger::StaticInfo(StaticTopic::Icon),
        "/changes" => return ChatTrigger::StaticInfo(StaticTopic::Changes),
        "/support" => return ChatTrigger::StaticInfo(StaticTopic::Support),
        _ => {}
    }

    let matches_label = |label: &str| normalized == normalize_text(label);
    if matches_label(BACK_LABEL) || normalized == "back" {
        ChatTrigger::Back
    } else if matches_label(FIND_COMPONENT_LABEL) || normalized == "find component" {
        ChatTrigger::FindComponent
    } else if matches_label(MOBILE_COMPONENT_LABEL) || normalized == "mobile component" {
        ChatTrigger::Category(CategoryScope::Mobile)
    } else if matches_label(WEB_COMPONENT_LABEL) || normalized == "web component" {
        ChatTrigger::Category(CategoryScope::Web)
    } else if let Some(topic) = StaticTopic::ALL
        .into_iter()
        .find(|topic| matches_label(topic.menu_label()))
    {
        ChatTrigger::StaticInfo(topic)
    } else {
        ChatTrigger::FreeText
    }
}

/// Bare command name: `/start@granat_bot payload` becomes `/start`.
fn command_key(normalized: &str) -> &str {
    if !normalized.starts_with('/') {
        return "";
    }
    let command = normalized.split(' ').next().unwrap_or("");
    command.split('@').next().unwrap_or(command)
}
