//! Granat design-system assistant: conversation logic and process wiring.
//!
//! Inbound text is classified into a [`ChatTrigger`], run through the pure
//! [`transition`] table against the chat's [`granat_session::Session`], and
//! rendered into ordered [`OutboundReply`] values that the
//! [`BotChatHandler`] sends through a reply dispatcher.

pub mod bootstrap_helpers;
pub mod bot_config;
pub mod bot_replies;
pub mod bot_runtime;
pub mod bot_triggers;
pub mod conversation_router;
pub mod startup;

pub use bootstrap_helpers::init_tracing;
pub use bot_config::{Cli, IngressMode, DEFAULT_CATALOG_URL};
pub use bot_replies::*;
pub use bot_runtime::BotChatHandler;
pub use bot_triggers::*;
pub use conversation_router::*;
pub use startup::{build_bot_runtime, run_bot, BotRuntime};
