//! Telegram gateway: bot setup, dispatcher schema and action rendering.

pub mod admin;
pub mod bot;
pub mod notifications;
pub mod render;
pub mod schema;

pub use bot::{create_bot, setup_bot_commands, Command};
pub use schema::{schema, HandlerDeps, HandlerError};
