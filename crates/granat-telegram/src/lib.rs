//! Telegram Bot API transport for Granat.
//!
//! Two interchangeable ingress strategies feed the same [`ChatEventHandler`]:
//! the long-poll [`TelegramPoller`] and the push-based webhook ingress. Both
//! deliver updates in arrival order and skip ids already consumed. Polling
//! tracks a monotonic [`DeliveryCursor`]; webhook ingress keeps a bounded
//! window of [`RecentUpdateIds`] because pushes can arrive out of order.

pub mod chat_event_handler;
pub mod delivery_cursor;
pub mod recent_update_ids;
pub mod reply_dispatcher;
pub mod telegram_api_client;
pub mod telegram_api_error;
pub mod telegram_contract;
pub mod telegram_poller;
pub mod telegram_webhook;

pub use chat_event_handler::*;
pub use delivery_cursor::*;
pub use recent_update_ids::*;
pub use reply_dispatcher::*;
pub use telegram_api_client::*;
pub use telegram_api_error::*;
pub use telegram_contract::*;
pub use telegram_poller::*;
pub use telegram_webhook::*;
