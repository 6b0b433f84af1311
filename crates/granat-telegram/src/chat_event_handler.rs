use async_trait::async_trait;

use crate::delivery_cursor::DeliveryCursor;
use crate::telegram_contract::{InboundChatEvent, TelegramUpdate};

/// Consumer of inbound text events.
///
/// Ingress awaits each call before handing over the next event, so an
/// implementation sees one chat's events strictly in order. Failures must be
/// absorbed inside the handler.
#[async_trait]
pub trait ChatEventHandler: Send + Sync {
    async fn handle_chat_event(&self, event: InboundChatEvent);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateDelivery {
    Handled,
    SkippedDuplicate,
    IgnoredNonText,
}

/// Record of which update ids an ingress has already handed off.
///
/// Long polling uses the monotonic [`DeliveryCursor`]. Webhook ingress uses
/// [`RecentUpdateIds`](crate::recent_update_ids::RecentUpdateIds), since pushed
/// updates and their redeliveries arrive out of order.
pub trait ConsumedUpdates {
    fn is_consumed(&self, update_id: i64) -> bool;

    fn mark_consumed(&mut self, update_id: i64);
}

impl ConsumedUpdates for DeliveryCursor {
    fn is_consumed(&self, update_id: i64) -> bool {
        !self.accepts(update_id)
    }

    fn mark_consumed(&mut self, update_id: i64) {
        self.advance_past(update_id);
    }
}

/// Hands one update to `handler` unless it was already consumed.
///
/// The update is marked consumed only after the handler returns. Non-text
/// updates are marked too so they are not requested again.
pub async fn deliver_update<C>(
    consumed: &mut C,
    handler: &dyn ChatEventHandler,
    update: &TelegramUpdate,
) -> UpdateDelivery
where
    C: ConsumedUpdates + ?Sized,
{
    if consumed.is_consumed(update.update_id) {
        return UpdateDelivery::SkippedDuplicate;
    }
    let delivery = match update.to_chat_event() {
        Some(event) => {
            handler.handle_chat_event(event).await;
            UpdateDelivery::Handled
        }
        None => UpdateDelivery::IgnoredNonText,
    };
    consumed.mark_consumed(update.update_id);
    delivery
}
