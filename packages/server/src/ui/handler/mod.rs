//! HTTP and WebSocket handlers.

mod http;
mod websocket;

pub use http::{
    get_chat_messages, get_group_detail, health_check, list_groups, push_notification,
    toggle_like,
};
pub use websocket::{chat_handler, live_feed_handler, notifications_handler, post_handler};
