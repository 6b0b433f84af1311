//! Glue between ingress and the conversation router.

use std::sync::Arc;

use async_trait::async_trait;
use granat_telegram::{ChatEventHandler, DispatchOutcome, InboundChatEvent, ReplyDispatcher};

use crate::conversation_router::ConversationRouter;

/// Routes each inbound message and sends the replies in order.
///
/// Dispatch is awaited one reply at a time, so the next update for any chat
/// is not handled until every reply to the previous one has been attempted.
pub struct BotChatHandler {
    router: ConversationRouter,
    dispatcher: Arc<dyn ReplyDispatcher>,
}

impl BotChatHandler {
    pub fn new(router: ConversationRouter, dispatcher: Arc<dyn ReplyDispatcher>) -> Self {
        Self { router, dispatcher }
    }
}

#[async_trait]
impl ChatEventHandler for BotChatHandler {
    async fn handle_chat_event(&self, event: InboundChatEvent) {
        let replies = self.router.handle(event.chat_id, &event.text).await;
        let mut dropped = 0usize;
        for reply in &replies {
            let outcome = self.dispatcher.dispatch(reply.to_message(event.chat_id)).await;
            if matches!(outcome, DispatchOutcome::Dropped { .. }) {
                dropped = dropped.saturating_add(1);
            }
        }
        tracing::debug!(
            update_id = event.update_id,
            chat_id = event.chat_id,
            replies = replies.len(),
            dropped,
            "chat event handled"
        );
    }
}
