//! Per-chat conversation state machine.
//!
//! [`transition`] is the whole table: a pure function from the current
//! session and the classified trigger to the next session and the action to
//! render. [`ConversationRouter`] wires it to the session store and the
//! catalog search.

use std::sync::Arc;

use granat_catalog::{CatalogSearch, CategoryScope};
use granat_session::{ChatId, Session, SessionStore};

use crate::bot_replies::{
    category_choice_reply, main_menu_reply, query_prompt_reply, render_search_replies,
    static_info_reply, welcome_reply, OutboundReply,
};
use crate::bot_triggers::{classify_trigger, ChatTrigger, StaticTopic};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What the router renders after a transition.
pub enum RouterAction {
    Ignore,
    Welcome,
    MainMenu,
    CategoryChoice,
    QueryPrompt(CategoryScope),
    StaticInfo(StaticTopic),
    Search { category: Option<CategoryScope> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: Session,
    pub action: RouterAction,
}

impl Transition {
    fn to(next: Session, action: RouterAction) -> Self {
        Self { next, action }
    }

    fn stay(session: Session) -> Self {
        Self::to(session, RouterAction::Ignore)
    }
}

/// Total transition table.
///
/// Navigation and static-info triggers apply in every state. Category
/// labels only count while a category is awaited, and free text only counts
/// while a query is awaited; anything else leaves the session as it is.
pub fn transition(session: Session, trigger: ChatTrigger) -> Transition {
    match trigger {
        ChatTrigger::Start => Transition::to(Session::Idle, RouterAction::Welcome),
        ChatTrigger::Back => Transition::to(Session::Idle, RouterAction::MainMenu),
        ChatTrigger::FindComponent => {
            Transition::to(Session::AwaitingCategoryChoice, RouterAction::CategoryChoice)
        }
        ChatTrigger::StaticInfo(topic) => {
            Transition::to(Session::Idle, RouterAction::StaticInfo(topic))
        }
        ChatTrigger::Category(scope) => match session {
            Session::AwaitingCategoryChoice if scope != CategoryScope::Any => Transition::to(
                Session::AwaitingQuery {
                    category: Some(scope),
                },
                RouterAction::QueryPrompt(scope),
            ),
            Session::AwaitingQuery { category } => {
                Transition::to(Session::Idle, RouterAction::Search { category })
            }
            _ => Transition::stay(session),
        },
        ChatTrigger::FreeText => match session {
            Session::AwaitingQuery { category } => {
                Transition::to(Session::Idle, RouterAction::Search { category })
            }
            Session::Idle | Session::AwaitingCategoryChoice => Transition::stay(session),
        },
    }
}

/// Stateful front of the transition table.
pub struct ConversationRouter {
    sessions: Arc<dyn SessionStore>,
    search: CatalogSearch,
    result_cap: usize,
}

impl ConversationRouter {
    pub fn new(sessions: Arc<dyn SessionStore>, search: CatalogSearch, result_cap: usize) -> Self {
        Self {
            sessions,
            search,
            result_cap: result_cap.max(1),
        }
    }

    /// Consumes one inbound message and returns the replies to send, in order.
    pub async fn handle(&self, chat_id: ChatId, text: &str) -> Vec<OutboundReply> {
        let current = self.sessions.get(chat_id);
        let trigger = classify_trigger(text);
        let Transition { next, action } = transition(current, trigger);
        if next != current {
            tracing::debug!(
                chat_id,
                from = current.as_str(),
                to = next.as_str(),
                "session transition"
            );
        }
        self.sessions.set(chat_id, next);

        match action {
            RouterAction::Ignore => Vec::new(),
            RouterAction::Welcome => vec![welcome_reply()],
            RouterAction::MainMenu => vec![main_menu_reply()],
            RouterAction::CategoryChoice => vec![category_choice_reply()],
            RouterAction::QueryPrompt(_) => vec![query_prompt_reply()],
            RouterAction::StaticInfo(topic) => vec![static_info_reply(topic)],
            RouterAction::Search { category } => {
                let matches = self.search.search(text, category).await;
                let mut replies = render_search_replies(text, &matches, self.result_cap);
                replies.push(main_menu_reply());
                replies
            }
        }
    }
}
